//! Engine module: enumeration, transformers, and the CLI driver around the pipeline

pub mod arg_parser;
pub mod cli;
pub mod diagnostics;
pub mod enumerate;
pub mod gzip;
pub mod progress;
pub mod tools;
pub mod transform;

// Re-export commonly used items
pub use arg_parser::Cli;
pub use cli::{handle_run, resolve_opts};
pub use enumerate::{EnumerateOpts, items_in};
pub use gzip::{GzipTransformer, decompress_file};
pub use tools::{glob_match, has_extension, is_os_hidden_file, should_include_item};
pub use transform::{ItemTransformer, Slowed};
