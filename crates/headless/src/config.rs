//! Headless driver configuration.
use std::env;
use std::path::PathBuf;

use crate::scenario::Scenario;

/// Settings for a single headless run.
#[derive(Clone, Debug)]
pub struct HeadlessConfig {
    pub content_dir: Option<PathBuf>,
    pub ticks: u32,
    pub save_path: Option<PathBuf>,
    pub scenario: Scenario,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            content_dir: None,
            ticks: Self::DEFAULT_TICKS,
            save_path: None,
            scenario: Scenario::Fire,
        }
    }
}

impl HeadlessConfig {
    pub const DEFAULT_TICKS: u32 = 60;

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `AXIOM_CONTENT_DIR` - Content root holding `manifest.ron` (default: built-in demo)
    /// - `AXIOM_TICKS` - Number of ticks to simulate (default: 60)
    /// - `AXIOM_SAVE_PATH` - Write, re-read and verify a save blob at this path
    /// - `AXIOM_SCENARIO` - `fire`, `reload` or `sweep` (default: fire)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.content_dir = env::var("AXIOM_CONTENT_DIR").ok().map(PathBuf::from);

        if let Some(ticks) = read_env::<u32>("AXIOM_TICKS") {
            config.ticks = ticks;
        }

        config.save_path = env::var("AXIOM_SAVE_PATH").ok().map(PathBuf::from);

        if let Ok(name) = env::var("AXIOM_SCENARIO") {
            match name.parse() {
                Ok(scenario) => config.scenario = scenario,
                Err(_) => tracing::warn!("Unknown scenario {:?}, using {}", name, config.scenario),
            }
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
