//! Citation generation: date templating, deterministic paths, image text
//! overlay and the file system sink.

pub mod date_format;
pub mod paths;
pub mod renderer;
pub mod sink;

pub use date_format::{format_date_token, ordinal_indicator};
pub use paths::{folder_name, CitationPaths};
pub use renderer::{ImageCitationRenderer, OutputFormat};
pub use sink::FsArtifactSink;
