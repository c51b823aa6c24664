//! Level files and built-in sample levels.

pub mod description;
mod loader;
pub mod samples;

pub use description::LevelDesc;
pub use loader::{LoadError, LoadedLevel, Start, build_level, load_level_file, load_level_str};
