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

//! TTL-bounded read-through cache over an [`XrtReader`].
//!
//! The cache exists to bound the rate of external-process invocations:
//! within the TTL a scrape is served from the stored snapshot, after the
//! TTL the next scrape refreshes synchronously through the wrapped reader
//! and pays the invocation latency itself. There is no background refresh.
//!
//! A failed refresh propagates the error and leaves any previously stored
//! entry untouched, expiry included, so subsequent calls keep re-attempting
//! the reader until one succeeds. Entries are never evicted; the device set
//! is finite and changes rarely.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::xrt::types::{DeviceInfo, HostInfo};
use crate::xrt::XrtReader;

struct Entry<T> {
    value: T,
    expiry: Instant,
}

impl<T> Entry<T> {
    fn is_fresh(&self) -> bool {
        Instant::now() < self.expiry
    }
}

/// Caching wrapper around any [`XrtReader`].
///
/// Holds one slot for host info and one slot per device BDF queried so
/// far. Each slot is guarded by a mutex: fresh reads clone the snapshot,
/// refreshes serialize behind the lock, which is acceptable because they
/// are already rate-limited by the TTL.
pub struct XrtCache<R> {
    reader: R,
    ttl: Duration,
    host: Mutex<Option<Entry<HostInfo>>>,
    devices: Mutex<HashMap<String, Entry<DeviceInfo>>>,
}

impl<R: XrtReader> XrtCache<R> {
    pub fn new(reader: R, ttl: Duration) -> Self {
        Self {
            reader,
            ttl,
            host: Mutex::new(None),
            devices: Mutex::new(HashMap::new()),
        }
    }
}

impl<R: XrtReader> XrtReader for XrtCache<R> {
    fn host_info(&self) -> Result<HostInfo> {
        let mut slot = self.host.lock().unwrap();
        if let Some(entry) = slot.as_ref() {
            if entry.is_fresh() {
                tracing::debug!("using cached host info");
                return Ok(entry.value.clone());
            }
        }

        tracing::debug!("cached host info expired or not set, refreshing");
        let info = self.reader.host_info()?;
        let expiry = Instant::now() + self.ttl;
        *slot = Some(Entry {
            value: info.clone(),
            expiry,
        });
        Ok(info)
    }

    fn device_info(&self, bdf: &str) -> Result<DeviceInfo> {
        let mut entries = self.devices.lock().unwrap();
        if let Some(entry) = entries.get(bdf) {
            if entry.is_fresh() {
                tracing::debug!(device = bdf, "using cached device info");
                return Ok(entry.value.clone());
            }
        }

        tracing::debug!(device = bdf, "cached device info expired or not set, refreshing");
        let info = self.reader.device_info(bdf)?;
        let expiry = Instant::now() + self.ttl;
        entries.insert(
            bdf.to_string(),
            Entry {
                value: info.clone(),
                expiry,
            },
        );
        Ok(info)
    }
}
