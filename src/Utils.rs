//! different utility modules used throughout the project
/// tiny module to save plot data into csv file
pub mod logger;
/// simplelog setup: terminal logger, optionally mirrored into a (timestamped) file
pub mod logging;
/// run settings from a flat toml document, with defaults for every key
pub mod settings;
