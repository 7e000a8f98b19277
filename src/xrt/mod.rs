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

pub mod cache;
pub mod types;
pub mod xbutil;

pub use cache::XrtCache;
pub use types::{DeviceInfo, HostInfo};
pub use xbutil::XbutilAdapter;

use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;

/// Read access to XRT host and device telemetry.
///
/// Implemented by the raw xbutil adapter and by the TTL cache that wraps
/// it, so consumers are indifferent to whether a call hits the tool.
pub trait XrtReader: Send + Sync {
    /// Query tool identity and the discovered device set.
    fn host_info(&self) -> Result<HostInfo>;

    /// Query thermal, electrical and platform reports for one device,
    /// keyed by its BDF.
    fn device_info(&self, bdf: &str) -> Result<DeviceInfo>;
}

/// Configuration consumed by the XRT core, constructed once at startup
/// and injected into the adapter/cache constructors.
#[derive(Debug, Clone)]
pub struct XrtConfig {
    /// XRT installation directory containing `bin/xbutil`.
    pub xrt_path: PathBuf,
    /// How long a fetched snapshot stays valid before a scrape forces a
    /// refresh.
    pub cache_ttl: Duration,
}
