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

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The port to listen on for the metrics server.
    #[arg(short, long, default_value_t = 9101)]
    pub port: u16,

    /// Path to the XRT installation directory.
    #[arg(long, env = "XILINX_XRT", default_value = "/opt/xilinx/xrt")]
    pub xrt_path: PathBuf,

    /// Time in seconds to cache XRT device information.
    #[arg(long, default_value_t = 5)]
    pub cache_ttl: u64,
}
