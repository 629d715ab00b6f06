pub mod bigd_toml;
pub mod config;
pub mod fd_limit;
pub mod logger;

pub use bigd_toml::{BigdToml, apply_file_to_opts, load_bigd_toml, parse_bigd_toml};
pub use config::*;
pub use fd_limit::max_workers_by_fd_limit;
pub use logger::setup_logging;
