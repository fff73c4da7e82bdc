// Configuration loading

pub mod settings;

pub use settings::{DatabaseSettings, OutputSettings, Overrides, Settings};
