pub mod accessibility;
pub mod component;
pub mod component_classifier;
pub mod edge_detector;
pub mod geometry;
pub mod layout_analyzer;
pub mod pattern_detector;
pub mod pixel;
pub mod pixel_buffer;
pub mod region_segmenter;
pub mod responsiveness;
pub mod structure_analyzer;
pub mod utils;
