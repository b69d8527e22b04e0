// THEORY:
// This file is the main entry point for the `ui_vision` library crate. It follows
// the standard Rust convention of using `lib.rs` to define the public API exposed
// to external consumers (hosts that store, display or export analyses).
//
// The primary goal is to export `UiAnalyzer` and its `AnalysisResult` as the
// clean, high-level interface of the engine, plus `BatchAnalyzer` for hosts that
// analyse many images at once. The individual stages stay reachable through
// `core_modules` for hosts that only need one of them (an edge map, a contrast
// check), but the pipeline is the intended way in.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use config::AnalysisConfig;
pub use core_modules::component::{Component, ComponentType, SemanticRole};
pub use core_modules::geometry::BoundingBox;
pub use core_modules::pixel::pixel::Pixel;
pub use core_modules::pixel_buffer::PixelBuffer;
pub use error::{Result, VisionError};
pub use parallel_pipeline::{BatchAnalyzer, BatchItem, WorkerPool};
pub use pipeline::{AnalysisResult, UiAnalyzer};
