//! Configuration loaded from environment variables

use std::str::FromStr;

use crate::capture::RADAR_FILTER;

/// Record output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{}'", other)),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Record output format on stdout
    pub output: OutputFormat,

    /// Coarse libpcap filter for live capture
    pub filter: String,

    /// Live capture snapshot length
    pub snaplen: i32,

    /// Frames buffered between the capture thread and the pipeline
    pub channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: OutputFormat::Text,
            filter: RADAR_FILTER.to_string(),
            snaplen: 65536,
            channel_capacity: 1000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            output: lookup("RADAR_OUTPUT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.output),

            filter: lookup("RADAR_FILTER")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.filter),

            snaplen: lookup("RADAR_SNAPLEN")
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.snaplen),

            channel_capacity: lookup("RADAR_CHANNEL_CAPACITY")
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.channel_capacity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.output, OutputFormat::Text);
        assert_eq!(config.filter, RADAR_FILTER);
        assert_eq!(config.snaplen, 65536);
        assert_eq!(config.channel_capacity, 1000);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("RADAR_OUTPUT", "JSON"),
            ("RADAR_FILTER", "radio[72] == 5"),
            ("RADAR_SNAPLEN", "256"),
            ("RADAR_CHANNEL_CAPACITY", "16"),
        ]);
        assert_eq!(config.output, OutputFormat::Json);
        assert_eq!(config.filter, "radio[72] == 5");
        assert_eq!(config.snaplen, 256);
        assert_eq!(config.channel_capacity, 16);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("RADAR_OUTPUT", "xml"),
            ("RADAR_FILTER", "  "),
            ("RADAR_SNAPLEN", "-1"),
            ("RADAR_CHANNEL_CAPACITY", "lots"),
        ]);
        assert_eq!(config.output, OutputFormat::Text);
        assert_eq!(config.filter, RADAR_FILTER);
        assert_eq!(config.snaplen, 65536);
        assert_eq!(config.channel_capacity, 1000);
    }
}
