//! Run configuration for the trampoline.

use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugLevel {
    #[default]
    Off,
    Steps,
    Trace,
}

impl FromStr for DebugLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "" => Ok(DebugLevel::Off),
            "steps" => Ok(DebugLevel::Steps),
            "trace" => Ok(DebugLevel::Trace),
            other => Err(format!("unknown debug level: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DebugConfig {
    pub level: DebugLevel,
    pub show_frames: bool,
}

impl DebugConfig {
    pub fn steps() -> Self {
        DebugConfig {
            level: DebugLevel::Steps,
            ..Default::default()
        }
    }

    pub fn trace() -> Self {
        DebugConfig {
            level: DebugLevel::Trace,
            show_frames: true,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.level != DebugLevel::Off
    }
}

pub const DEBUG_ENV: &str = "KONTROL_DEBUG";
pub const MAX_STEPS_ENV: &str = "KONTROL_MAX_STEPS";

/// How a program is driven: diagnostics, step budget and trace recording.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub debug: DebugConfig,
    pub max_steps: Option<u64>,
    pub trace: bool,
}

impl RunConfig {
    pub fn with_debug(mut self, debug: DebugConfig) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Defaults overridden by `KONTROL_DEBUG` and `KONTROL_MAX_STEPS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = RunConfig::default();

        if let Some(raw) = lookup(DEBUG_ENV) {
            match raw.parse::<DebugLevel>() {
                Ok(DebugLevel::Trace) => config.debug = DebugConfig::trace(),
                Ok(level) => config.debug.level = level,
                Err(err) => log::warn!("ignoring {DEBUG_ENV}={raw:?}: {err}"),
            }
        }

        if let Some(raw) = lookup(MAX_STEPS_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(limit) => config.max_steps = Some(limit),
                Err(err) => log::warn!("ignoring {MAX_STEPS_ENV}={raw:?}: {err}"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_debug_level_parse() {
        assert_eq!("Steps".parse::<DebugLevel>().unwrap(), DebugLevel::Steps);
        assert_eq!(" trace ".parse::<DebugLevel>().unwrap(), DebugLevel::Trace);
        assert_eq!("off".parse::<DebugLevel>().unwrap(), DebugLevel::Off);
        assert!("loud".parse::<DebugLevel>().is_err());
    }

    #[test]
    fn test_debug_config_presets() {
        assert!(!DebugConfig::default().is_enabled());
        assert!(DebugConfig::steps().is_enabled());
        assert!(!DebugConfig::steps().show_frames);
        assert!(DebugConfig::trace().show_frames);
    }

    #[test]
    fn test_builder() {
        let config = RunConfig::default()
            .with_max_steps(10)
            .with_trace(true)
            .with_debug(DebugConfig::steps());
        assert_eq!(config.max_steps, Some(10));
        assert!(config.trace);
        assert_eq!(config.debug.level, DebugLevel::Steps);
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let config = RunConfig::from_lookup(lookup(&[(DEBUG_ENV, "trace"), (MAX_STEPS_ENV, "500")]));
        assert_eq!(config.debug.level, DebugLevel::Trace);
        assert!(config.debug.show_frames);
        assert_eq!(config.max_steps, Some(500));
        assert!(!config.trace);
    }

    #[test]
    fn test_from_lookup_ignores_bad_values() {
        let config = RunConfig::from_lookup(lookup(&[(DEBUG_ENV, "verbose"), (MAX_STEPS_ENV, "-3")]));
        assert_eq!(config.debug.level, DebugLevel::Off);
        assert_eq!(config.max_steps, None);
    }
}
