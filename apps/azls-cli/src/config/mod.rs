//! Configuration directory and settings file

mod paths;
mod settings;

pub use paths::ConfigPaths;
pub use settings::Config;
