pub mod accumulate;
pub mod buffer;
pub mod config;
pub mod loader;
pub mod luminance;
pub mod metrics;
pub mod pfm;
