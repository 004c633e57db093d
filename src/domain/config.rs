use super::enums::WeekStart;
use serde::{Deserialize, Serialize};

/// User settings, stored as a single row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_week_start")]
    pub week_start: WeekStart,
    #[serde(default = "default_auto_rollover")]
    pub auto_rollover: bool,
}

fn default_week_start() -> WeekStart {
    WeekStart::Sunday
}

fn default_auto_rollover() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            week_start: default_week_start(),
            auto_rollover: default_auto_rollover(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.week_start, WeekStart::Sunday);
        assert!(config.auto_rollover);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: Config = serde_json::from_str(r#"{"week_start":"monday"}"#).unwrap();
        assert_eq!(config.week_start, WeekStart::Monday);
        assert!(config.auto_rollover);
    }
}
