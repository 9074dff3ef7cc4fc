use crate::limits::*;
use crate::validation::DateRules;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampsiteConfig {
    pub window_days: usize,
    pub max_stay_days: i64,
    pub metrics_port: Option<u16>,
}

impl Default for CampsiteConfig {
    fn default() -> Self {
        Self {
            window_days: WINDOW_DAYS,
            max_stay_days: MAX_STAY_DAYS,
            metrics_port: None,
        }
    }
}

impl CampsiteConfig {
    /// Read `CAMPSITE_*` environment variables, keeping defaults for anything
    /// unset or unparsable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let window_days = lookup("CAMPSITE_WINDOW_DAYS")
            .and_then(|s| s.parse().ok())
            .filter(|&days: &usize| days > 0)
            .unwrap_or(defaults.window_days);
        let max_stay_days = lookup("CAMPSITE_MAX_STAY_DAYS")
            .and_then(|s| s.parse().ok())
            .filter(|&days: &i64| days > 0)
            .unwrap_or(defaults.max_stay_days);
        let metrics_port = lookup("CAMPSITE_METRICS_PORT").and_then(|s| s.parse().ok());
        Self {
            window_days,
            max_stay_days,
            metrics_port,
        }
    }

    pub fn date_rules(&self) -> DateRules {
        DateRules {
            window_days: self.window_days,
            max_stay_days: self.max_stay_days,
        }
    }
}
