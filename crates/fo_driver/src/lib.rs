pub mod pipeline;

pub use pipeline::{build_file, build_path, run_file, transform_source};
