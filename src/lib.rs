// Copyright 2025 The xrt-exporter Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Prometheus exporter for Xilinx XRT accelerator cards.
//!
//! The crate wraps the `xbutil` inspection tool: each scrape of the
//! `/metrics` endpoint reads host and per-device telemetry through a
//! TTL-bounded cache, so the external tool is invoked at most once per
//! cache period regardless of scrape frequency.

pub mod api;
pub mod cli;
pub mod error;
pub mod xrt;

pub use error::{Error, Result};
