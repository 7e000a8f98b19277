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

//! Prometheus text-format rendering of XRT telemetry.

use crate::xrt::XrtReader;

/// Helper struct to build Prometheus metrics
pub struct MetricBuilder {
    metrics: String,
}

impl MetricBuilder {
    pub fn new() -> Self {
        Self {
            metrics: String::new(),
        }
    }

    /// Add a HELP line
    pub fn help(&mut self, name: &str, description: &str) -> &mut Self {
        self.metrics
            .push_str(&format!("# HELP {name} {description}\n"));
        self
    }

    /// Add a TYPE line
    pub fn type_(&mut self, name: &str, metric_type: &str) -> &mut Self {
        self.metrics
            .push_str(&format!("# TYPE {name} {metric_type}\n"));
        self
    }

    /// Add a metric line with labels
    pub fn metric(
        &mut self,
        name: &str,
        labels: &[(&str, &str)],
        value: impl ToString,
    ) -> &mut Self {
        self.metrics.push_str(name);

        if !labels.is_empty() {
            self.metrics.push('{');
            for (i, (key, value)) in labels.iter().enumerate() {
                if i > 0 {
                    self.metrics.push_str(", ");
                }
                // Escape quotes in values for Prometheus format
                let escaped_value = value.replace('"', "\\\"");
                self.metrics.push_str(&format!("{key}=\"{escaped_value}\""));
            }
            self.metrics.push('}');
        }

        self.metrics.push(' ');
        self.metrics.push_str(&value.to_string());
        self.metrics.push('\n');
        self
    }

    /// Build the final metric string
    pub fn build(self) -> String {
        self.metrics
    }
}

impl Default for MetricBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Walk the reader once and render the full scrape output.
///
/// A host-info failure short-circuits the whole scrape: `xrt_up 0` is the
/// only output and no per-device call is made. A failure on one device is
/// logged and that device is skipped; other devices are still processed,
/// so the failed device simply has no samples this cycle.
pub fn render_metrics<R: XrtReader>(reader: &R) -> String {
    let mut builder = MetricBuilder::new();

    let host = match reader.host_info() {
        Ok(host) => host,
        Err(e) => {
            tracing::error!("failed to retrieve XRT host info: {e}");
            builder
                .help("xrt_up", "Whether the last XRT host query succeeded")
                .type_("xrt_up", "gauge")
                .metric("xrt_up", &[], 0);
            return builder.build();
        }
    };

    builder
        .help("xrt_up", "Whether the last XRT host query succeeded")
        .type_("xrt_up", "gauge")
        .metric("xrt_up", &[], 1);

    builder
        .help("xrt_info", "XRT build information")
        .type_("xrt_info", "info")
        .metric(
            "xrt_info",
            &[
                ("version", &host.xrt.version),
                ("branch", &host.xrt.branch),
            ],
            1,
        );

    // Unready devices must never be probed for detail.
    for device in host.devices.iter().filter(|d| d.is_ready) {
        let info = match reader.device_info(&device.bdf) {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(
                    device = %device.bdf,
                    "failed to retrieve XRT device info: {e}"
                );
                continue;
            }
        };

        let serial = info.serial_number().unwrap_or_default().to_string();
        let device_id = info.device_id.as_str();

        for thermal in &info.thermals {
            if !thermal.is_present {
                continue;
            }
            builder
                .help(
                    "xrt_device_temperature",
                    "Temperature of the device in degrees Celsius",
                )
                .type_("xrt_device_temperature", "gauge")
                .metric(
                    "xrt_device_temperature",
                    &[
                        ("device_id", device_id),
                        ("serial", &serial),
                        ("location_id", &thermal.location_id),
                        ("description", &thermal.description),
                    ],
                    thermal.temp_c,
                );
        }

        for rail in &info.electrical.power_rails {
            if rail.voltage.is_present {
                builder
                    .help("xrt_device_voltage", "Voltage of the device in Volts")
                    .type_("xrt_device_voltage", "gauge")
                    .metric(
                        "xrt_device_voltage",
                        &[
                            ("device_id", device_id),
                            ("serial", &serial),
                            ("location_id", &rail.id),
                            ("description", &rail.description),
                        ],
                        rail.voltage.volts,
                    );
            }

            if rail.current.is_present {
                builder
                    .help("xrt_device_current", "Current of the device in Amperes")
                    .type_("xrt_device_current", "gauge")
                    .metric(
                        "xrt_device_current",
                        &[
                            ("device_id", device_id),
                            ("serial", &serial),
                            ("location_id", &rail.id),
                            ("description", &rail.description),
                        ],
                        rail.current.amps,
                    );
            }
        }

        builder
            .help(
                "xrt_device_power_consumption",
                "Power consumption of the device in Watts",
            )
            .type_("xrt_device_power_consumption", "gauge")
            .metric(
                "xrt_device_power_consumption",
                &[("device_id", device_id), ("serial", &serial)],
                info.electrical.power_consumption_watts,
            );

        builder
            .help(
                "xrt_device_power_consumption_max",
                "Maximum power consumption of the device in Watts",
            )
            .type_("xrt_device_power_consumption_max", "gauge")
            .metric(
                "xrt_device_power_consumption_max",
                &[("device_id", device_id), ("serial", &serial)],
                info.electrical.power_consumption_max_watts,
            );

        builder
            .help(
                "xrt_device_power_consumption_warning",
                "Whether the power consumption of the device has crossed a threshold",
            )
            .type_("xrt_device_power_consumption_warning", "gauge")
            .metric(
                "xrt_device_power_consumption_warning",
                &[("device_id", device_id), ("serial", &serial)],
                u8::from(info.electrical.power_consumption_warning),
            );
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::xrt::types::{DeviceInfo, HostInfo};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Fake reader with a scripted host response and per-BDF device
    /// responses; records which BDFs were probed.
    struct ScriptedReader {
        host: Result<HostInfo>,
        devices: Vec<(String, Result<DeviceInfo>)>,
        device_calls: AtomicUsize,
        probed: Mutex<Vec<String>>,
    }

    impl ScriptedReader {
        fn new(host: Result<HostInfo>) -> Self {
            Self {
                host,
                devices: Vec::new(),
                device_calls: AtomicUsize::new(0),
                probed: Mutex::new(Vec::new()),
            }
        }

        fn with_device(mut self, bdf: &str, response: Result<DeviceInfo>) -> Self {
            self.devices.push((bdf.to_string(), response));
            self
        }

        fn probed(&self) -> Vec<String> {
            self.probed.lock().unwrap().clone()
        }
    }

    fn clone_result<T: Clone>(r: &Result<T>) -> Result<T> {
        match r {
            Ok(v) => Ok(v.clone()),
            Err(e) => Err(Error::Decode(e.to_string())),
        }
    }

    impl XrtReader for ScriptedReader {
        fn host_info(&self) -> Result<HostInfo> {
            clone_result(&self.host)
        }

        fn device_info(&self, bdf: &str) -> Result<DeviceInfo> {
            self.device_calls.fetch_add(1, Ordering::SeqCst);
            self.probed.lock().unwrap().push(bdf.to_string());
            self.devices
                .iter()
                .find(|(id, _)| id == bdf)
                .map(|(_, r)| clone_result(r))
                .unwrap_or_else(|| Err(Error::NotFound(bdf.to_string())))
        }
    }

    fn host_with(devices: &[(&str, bool)]) -> HostInfo {
        serde_json::from_value(serde_json::json!({
            "xrt": { "version": "2.16.204", "branch": "2023.2" },
            "devices": devices
                .iter()
                .map(|(bdf, ready)| serde_json::json!({ "bdf": bdf, "is_ready": *ready }))
                .collect::<Vec<_>>()
        }))
        .unwrap()
    }

    fn device_with_rails(bdf: &str, rails: serde_json::Value) -> DeviceInfo {
        serde_json::from_value(serde_json::json!({
            "device_id": bdf,
            "electrical": {
                "power_rails": rails,
                "power_consumption_watts": "15.3",
                "power_consumption_max_watts": "225",
                "power_consumption_warning": "true"
            },
            "platforms": [
                { "controller": { "card_mgmt_controller": { "serial_number": "SER123" } } }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_metric_builder_escapes_label_quotes() {
        let mut builder = MetricBuilder::new();
        builder.metric("m", &[("d", "12 \"Volts\"")], 1);
        assert_eq!(builder.build(), "m{d=\"12 \\\"Volts\\\"\"} 1\n");
    }

    #[test]
    fn test_host_failure_short_circuits_scrape() {
        let reader = ScriptedReader::new(Err(Error::ProcessExit {
            command: "xbutil examine".to_string(),
            code: Some(1),
            stderr: String::new(),
        }));

        let out = render_metrics(&reader);
        assert!(out.contains("xrt_up 0"));
        assert!(!out.contains("xrt_device_"));
        assert_eq!(reader.device_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_only_ready_devices_are_probed() {
        let host = host_with(&[("0000:01:00.0", true), ("0000:02:00.0", false)]);
        let reader = ScriptedReader::new(Ok(host)).with_device(
            "0000:01:00.0",
            Ok(device_with_rails("0000:01:00.0", serde_json::json!([]))),
        );

        let out = render_metrics(&reader);
        assert!(out.contains("xrt_up 1"));
        assert_eq!(reader.probed(), vec!["0000:01:00.0".to_string()]);
    }

    #[test]
    fn test_device_failure_is_isolated() {
        let host = host_with(&[("0000:01:00.0", true), ("0000:02:00.0", true)]);
        let reader = ScriptedReader::new(Ok(host))
            .with_device(
                "0000:01:00.0",
                Err(Error::ProcessExit {
                    command: "xbutil examine".to_string(),
                    code: Some(1),
                    stderr: String::new(),
                }),
            )
            .with_device(
                "0000:02:00.0",
                Ok(device_with_rails("0000:02:00.0", serde_json::json!([]))),
            );

        let out = render_metrics(&reader);
        // Both were attempted, only the healthy one produced samples.
        assert_eq!(reader.probed().len(), 2);
        assert!(!out.contains("device_id=\"0000:01:00.0\""));
        assert!(out.contains("device_id=\"0000:02:00.0\""));
        assert!(out.contains("xrt_device_power_consumption_warning{device_id=\"0000:02:00.0\", serial=\"SER123\"} 1"));
    }

    #[test]
    fn test_presence_flags_gate_rail_samples() {
        let rails = serde_json::json!([{
            "id": "vccint",
            "description": "Internal FPGA Vcc",
            "voltage": { "volts": "0.85", "is_present": "false" },
            "current": { "amps": "3.5", "is_present": "true" }
        }]);
        let host = host_with(&[("0000:01:00.0", true)]);
        let reader = ScriptedReader::new(Ok(host)).with_device(
            "0000:01:00.0",
            Ok(device_with_rails("0000:01:00.0", rails)),
        );

        let out = render_metrics(&reader);
        let current_lines: Vec<&str> = out
            .lines()
            .filter(|l| l.starts_with("xrt_device_current{"))
            .collect();
        assert_eq!(current_lines.len(), 1);
        assert!(current_lines[0].ends_with(" 3.5"));
        assert!(!out.contains("xrt_device_voltage{"));
    }

    #[test]
    fn test_absent_thermal_reading_not_emitted() {
        let device: DeviceInfo = serde_json::from_value(serde_json::json!({
            "device_id": "0000:01:00.0",
            "thermals": [
                { "location_id": "fpga0", "description": "FPGA", "temp_C": "41", "is_present": "true" },
                { "location_id": "vccint_temp", "description": "Int Vcc", "temp_C": "99", "is_present": "false" }
            ],
            "platforms": [
                { "controller": { "card_mgmt_controller": { "serial_number": "SER123" } } }
            ]
        }))
        .unwrap();

        let host = host_with(&[("0000:01:00.0", true)]);
        let reader = ScriptedReader::new(Ok(host)).with_device("0000:01:00.0", Ok(device));

        let out = render_metrics(&reader);
        assert!(out.contains("location_id=\"fpga0\""));
        // The numeric payload of an absent reading never leaks out.
        assert!(!out.contains("location_id=\"vccint_temp\""));
        assert!(!out.contains(" 99"));
    }

    #[test]
    fn test_info_metric_carries_version_labels() {
        let host = host_with(&[]);
        let reader = ScriptedReader::new(Ok(host));

        let out = render_metrics(&reader);
        assert!(out.contains("xrt_info{version=\"2.16.204\", branch=\"2023.2\"} 1"));
    }
}
