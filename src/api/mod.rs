pub mod metrics;
pub mod server;

pub use server::{run_api_mode, SharedCache};
