pub mod config;
pub mod context;
pub mod presets;
pub mod stages;
pub mod stream;
