// Infrastructure layer - Configuration, live feed and rendering adapters
pub mod config;
pub mod feed;
pub mod generator;
pub mod svg_renderer;
