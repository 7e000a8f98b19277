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

//! Error types for xbutil invocation and output decoding.
//!
//! Every variant is terminal for the call that raised it: nothing in this
//! crate retries, and a failed refresh never replaces a previously cached
//! value with a zero-valued snapshot.

use thiserror::Error;

/// The error type for XRT queries.
#[derive(Debug, Error)]
pub enum Error {
    /// The xbutil binary could not be spawned at all.
    #[error("failed to launch '{command}': {source}")]
    ProcessLaunch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// xbutil ran but exited with a non-zero status.
    #[error("command failed: '{command}' (code: {code:?}) stderr: {stderr}")]
    ProcessExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Creating, reading or removing the temporary output file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The output document was malformed or missing required structure.
    #[error("failed to decode xbutil output: {0}")]
    Decode(String),

    /// A detail query succeeded but the requested device was not in the
    /// returned device list.
    #[error("no device with id {0}")]
    NotFound(String),
}

/// A specialized Result type for XRT queries.
pub type Result<T> = std::result::Result<T, Error>;
