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

//! Typed domain model for xbutil's JSON reports.
//!
//! xbutil encodes numeric and boolean leaf values as quoted strings
//! (`"temp_C": "36.0"`, `"is_present": "true"`). The deserializers here
//! accept that string encoding as well as native JSON scalars, because the
//! quoting is a quirk of the tool and not something we control. Unknown
//! fields are ignored throughout.
//!
//! All of these types are immutable snapshots: the adapter constructs them
//! fresh on every invocation and the cache replaces them wholesale.

use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

/// Decode an f64 that may arrive as a quoted string.
fn f64_from_str<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| de::Error::custom(format!("invalid number '{s}': {e}"))),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| de::Error::custom("number not representable as f64")),
        other => Err(de::Error::custom(format!(
            "expected string-encoded number, found {other}"
        ))),
    }
}

/// Decode a bool that may arrive as a quoted string.
fn bool_from_str<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => s
            .trim()
            .parse::<bool>()
            .map_err(|e| de::Error::custom(format!("invalid bool '{s}': {e}"))),
        Value::Bool(b) => Ok(b),
        other => Err(de::Error::custom(format!(
            "expected string-encoded bool, found {other}"
        ))),
    }
}

/// XRT build identity as reported by `xbutil examine`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct XrtIdentity {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub branch: String,
}

/// One entry of the host-level device enumeration.
///
/// `is_ready` gates detail queries: an unready device must never be probed
/// for thermal/electrical/platform reports.
#[derive(Debug, Clone, Deserialize)]
pub struct HostDevice {
    pub bdf: String,
    #[serde(default)]
    pub vbnv: String,
    #[serde(default, deserialize_with = "bool_from_str")]
    pub is_ready: bool,
}

/// Host-level snapshot: tool identity plus the discovered device set.
///
/// A host document with zero devices is a successful empty enumeration,
/// not an error.
#[derive(Debug, Clone, Deserialize)]
pub struct HostInfo {
    pub xrt: XrtIdentity,
    #[serde(default)]
    pub devices: Vec<HostDevice>,
}

/// One temperature sensor reading from the thermal report.
#[derive(Debug, Clone, Deserialize)]
pub struct ThermalReading {
    pub location_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "temp_C", default, deserialize_with = "f64_from_str")]
    pub temp_c: f64,
    #[serde(default, deserialize_with = "bool_from_str")]
    pub is_present: bool,
}

/// Voltage sub-reading of a power rail.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct VoltageReading {
    #[serde(default, deserialize_with = "f64_from_str")]
    pub volts: f64,
    #[serde(default, deserialize_with = "bool_from_str")]
    pub is_present: bool,
}

/// Current sub-reading of a power rail.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CurrentReading {
    #[serde(default, deserialize_with = "f64_from_str")]
    pub amps: f64,
    #[serde(default, deserialize_with = "bool_from_str")]
    pub is_present: bool,
}

/// One power rail from the electrical report.
///
/// The presence flags are authoritative per sub-reading: a missing voltage
/// suppresses only the voltage sample, the current sample on the same rail
/// is still emitted (and vice versa).
#[derive(Debug, Clone, Deserialize)]
pub struct PowerRail {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub voltage: VoltageReading,
    #[serde(default)]
    pub current: CurrentReading,
}

/// Electrical report: rails plus board-level power figures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ElectricalInfo {
    #[serde(default)]
    pub power_rails: Vec<PowerRail>,
    #[serde(default, deserialize_with = "f64_from_str")]
    pub power_consumption_max_watts: f64,
    #[serde(default, deserialize_with = "f64_from_str")]
    pub power_consumption_watts: f64,
    #[serde(default, deserialize_with = "bool_from_str")]
    pub power_consumption_warning: bool,
}

/// Static-region identity of a platform (shell) image.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticRegion {
    #[serde(default)]
    pub vbnv: String,
    #[serde(default)]
    pub logic_uuid: String,
    #[serde(default)]
    pub jtag_idcode: String,
    #[serde(default)]
    pub fpga_name: String,
}

/// Card management controller identity.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardMgmtController {
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub oem_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformController {
    #[serde(default)]
    pub card_mgmt_controller: CardMgmtController,
}

/// One entry of the platform report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformInfo {
    #[serde(default)]
    pub static_region: StaticRegion,
    #[serde(default)]
    pub controller: PlatformController,
}

/// Per-device snapshot combining the thermal, electrical and platform
/// reports of a single `xbutil examine --device` invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub interface_type: String,
    pub device_id: String,
    #[serde(default)]
    pub thermals: Vec<ThermalReading>,
    #[serde(default)]
    pub electrical: ElectricalInfo,
    #[serde(default)]
    pub platforms: Vec<PlatformInfo>,
}

impl DeviceInfo {
    /// Board serial number, sourced from the first platform entry.
    ///
    /// The adapter rejects detail documents with zero platform entries, so
    /// this is only `None` for hand-built values.
    pub fn serial_number(&self) -> Option<&str> {
        self.platforms
            .first()
            .map(|p| p.controller.card_mgmt_controller.serial_number.as_str())
    }

    /// Shell (VBNV) identifier of the first platform entry.
    pub fn shell(&self) -> Option<&str> {
        self.platforms.first().map(|p| p.static_region.vbnv.as_str())
    }
}
