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

//! External probe adapter around the `xbutil` inspection tool.
//!
//! Each query runs one `xbutil examine` invocation with JSON output
//! directed at a freshly created temporary file, then parses that file
//! into the domain model. The adapter performs no caching and no retries;
//! every failure is surfaced synchronously to the caller exactly once.
//!
//! No timeout is enforced on the child process beyond what the operating
//! environment enforces, so a hung xbutil blocks the calling scrape.

use std::path::PathBuf;
use std::process::Command;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::xrt::types::{DeviceInfo, HostInfo};
use crate::xrt::{XrtConfig, XrtReader};

/// Adapter that shells out to `<xrt_path>/bin/xbutil`.
pub struct XbutilAdapter {
    xbutil: PathBuf,
}

impl XbutilAdapter {
    pub fn new(config: &XrtConfig) -> Self {
        Self {
            xbutil: config.xrt_path.join("bin").join("xbutil"),
        }
    }

    /// Run `xbutil examine` with the given extra arguments and return the
    /// raw bytes of its JSON output file.
    ///
    /// The temporary output file is owned by this call and removed on
    /// every exit path, success or failure, via `NamedTempFile`'s drop.
    fn examine(&self, extra_args: &[&str]) -> Result<Vec<u8>> {
        let output_file = tempfile::Builder::new()
            .prefix("xbutil-output-")
            .suffix(".json")
            .tempfile()?;
        tracing::debug!(
            file = %output_file.path().display(),
            "created temporary output file"
        );

        let mut args: Vec<String> = vec!["examine".to_string()];
        args.extend(extra_args.iter().map(|s| s.to_string()));
        args.extend([
            "--format".to_string(),
            "json".to_string(),
            "--output".to_string(),
            output_file.path().display().to_string(),
            "--force".to_string(),
        ]);

        let command = self.xbutil.display().to_string();
        tracing::debug!("running command: {command} {}", args.join(" "));

        let output = Command::new(&self.xbutil)
            .args(&args)
            .output()
            .map_err(|source| Error::ProcessLaunch {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(Error::ProcessExit {
                command: format!("{command} {}", args.join(" ")),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(std::fs::read(output_file.path())?)
    }
}

impl XrtReader for XbutilAdapter {
    fn host_info(&self) -> Result<HostInfo> {
        let data = self.examine(&[])?;
        parse_host_info(&data)
    }

    fn device_info(&self, bdf: &str) -> Result<DeviceInfo> {
        let data = self.examine(&[
            "--device",
            bdf,
            "--report",
            "thermal",
            "--report",
            "electrical",
            "--report",
            "platform",
        ])?;
        parse_device_info(&data, bdf)
    }
}

#[derive(Deserialize)]
struct ExamineDoc {
    system: SystemSection,
}

#[derive(Deserialize)]
struct SystemSection {
    host: HostInfo,
}

#[derive(Deserialize)]
struct DeviceListDoc {
    #[serde(default)]
    devices: Vec<DeviceInfo>,
}

/// Parse the top-level host document of a plain `xbutil examine`.
///
/// A missing `system.host` section is a decode failure; an empty device
/// list is a valid empty enumeration.
pub fn parse_host_info(data: &[u8]) -> Result<HostInfo> {
    let doc: ExamineDoc =
        serde_json::from_slice(data).map_err(|e| Error::Decode(e.to_string()))?;
    Ok(doc.system.host)
}

/// Parse a device-detail document and select the entry matching `bdf`.
///
/// Even when the invocation succeeded, an absent match yields `NotFound`.
/// A matched device with zero platform entries is a decode failure because
/// the serial number is sourced from the first platform entry.
pub fn parse_device_info(data: &[u8], bdf: &str) -> Result<DeviceInfo> {
    let doc: DeviceListDoc =
        serde_json::from_slice(data).map_err(|e| Error::Decode(e.to_string()))?;

    let device = doc
        .devices
        .into_iter()
        .find(|d| d.device_id == bdf)
        .ok_or_else(|| Error::NotFound(bdf.to_string()))?;

    if device.platforms.is_empty() {
        return Err(Error::Decode(format!(
            "device {bdf} reported zero platform entries"
        )));
    }

    Ok(device)
}
