//! Configuration module for Roomies
//!
//! Path resolution for the data directory and persisted user settings.

pub mod paths;
pub mod settings;

pub use paths::RoomiesPaths;
pub use settings::Settings;
