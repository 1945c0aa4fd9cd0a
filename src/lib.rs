//! Common functionality for harboropt.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod emissions;
pub mod finance;
pub mod id;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod profile;
pub mod resource;
pub mod settings;
pub mod simulation;
pub mod storage;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get config dir for program.
///
/// This is a subfolder of the user's standard configuration directory (e.g. `~/.config` on
/// Linux).
pub fn get_harboropt_config_dir() -> PathBuf {
    let Some(mut dir) = dirs::config_dir() else {
        panic!("Configuration directory could not be found for this platform");
    };

    dir.push("harboropt");
    dir
}
