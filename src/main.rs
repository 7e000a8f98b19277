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

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use xrt_exporter::api::run_api_mode;
use xrt_exporter::cli::Cli;
use xrt_exporter::xrt::{XbutilAdapter, XrtCache, XrtConfig};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = XrtConfig {
        xrt_path: cli.xrt_path,
        cache_ttl: Duration::from_secs(cli.cache_ttl),
    };

    let adapter = XbutilAdapter::new(&config);
    let cache = Arc::new(XrtCache::new(adapter, config.cache_ttl));

    run_api_mode(cli.port, cache).await;
}
