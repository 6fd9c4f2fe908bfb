//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid channel topology: {0}")]
    Invalid(String),
}

/// Chat configuration.
///
/// Channel order in the file is significant: it is the registry's iteration
/// order, which decides which default channel a new player starts speaking
/// in and which channel wins deterministic tie-breaks.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Configured channels, in file order.
    #[serde(rename = "channel", default)]
    pub channels: Vec<ChannelDefinition>,
}

/// A single channel definition.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelDefinition {
    /// Stable identifier. Lookups are case-insensitive.
    pub name: String,
    /// Presentation label shown to players. Falls back to `name`.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Capability required to see and join the channel. Absent = open.
    #[serde(default)]
    pub read_permission: Option<String>,
    /// Capability required to speak in the channel. Absent = open.
    #[serde(default)]
    pub write_permission: Option<String>,
    /// Capability required to leave the channel. Absent = open.
    #[serde(default)]
    pub leave_permission: Option<String>,
    /// Default channels are auto-joined on a player's first contact.
    #[serde(default)]
    pub default: bool,
}

impl ChatConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ChatConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

impl ChannelDefinition {
    /// The label shown to players for this channel.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[[channel]]
name = "global"
display_name = "Global"
default = true

[[channel]]
name = "staff"
display_name = "Staff"
read_permission = "chat.staff.read"
write_permission = "chat.staff.write"
"#;

    #[test]
    fn test_parse_channel_definitions() {
        let config: ChatConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(config.channels.len(), 2);

        let global = &config.channels[0];
        assert_eq!(global.name, "global");
        assert!(global.default);
        assert!(global.read_permission.is_none());

        let staff = &config.channels[1];
        assert!(!staff.default);
        assert_eq!(staff.read_permission.as_deref(), Some("chat.staff.read"));
        assert_eq!(staff.leave_permission, None);
    }

    #[test]
    fn test_display_name_falls_back_to_name() {
        let config: ChatConfig = toml::from_str(
            r#"
[[channel]]
name = "trade"
default = true
"#,
        )
        .unwrap();
        assert_eq!(config.channels[0].display_name(), "trade");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = ChatConfig::load(file.path()).unwrap();
        assert_eq!(config.channels.len(), 2);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = ChatConfig::load("/nonexistent/chat.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
