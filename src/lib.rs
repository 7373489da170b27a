// src/lib.rs
pub mod ansi;
pub mod config;
pub mod error;
pub mod feed;
pub mod history;
pub mod monitor;
pub mod presets;
pub mod registry;
pub mod render;
pub mod session;
pub mod window;

pub use error::*;

pub use config::{ErrorStrategy, ExtractorSpec, MonitorConfig, RulesFile};
pub use feed::FeedFormat;
pub use monitor::{LogMonitor, MonitorStats};
pub use registry::{Extractor, ExtractorRegistry, Field};
pub use render::{OutputFormat, RenderSink, RowWriter, ScreenSink, WriteSink};
pub use session::{ExtractionRow, ExtractionSession};
pub use window::DisplayWindow;
