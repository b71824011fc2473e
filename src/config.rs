//! Client configuration.

use crate::action::Action;
use crate::error::ConfigError;
use crate::validation::{validate_channel_name, validate_nickname, validate_text};

/// Default IRC port.
pub const DEFAULT_PORT: u16 = 6667;

/// Everything needed to connect and register.
///
/// ```
/// use slirc_client::ClientConfig;
///
/// let config = ClientConfig::new("irc.example.net", 6667, "alice")
///     .with_user_info("Alice Liddell")
///     .with_default_channel("#general");
/// assert!(config.validate().is_ok());
/// assert_eq!(config.address(), "irc.example.net:6667");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientConfig {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Nickname to register with.
    pub nickname: String,
    /// User info sent with USER. Defaults to the nickname.
    pub user_info: String,
    /// Channel joined right after registration and preferred as active.
    pub default_channel: Option<String>,
}

impl ClientConfig {
    /// Create a configuration whose user info is the nickname.
    pub fn new(host: impl Into<String>, port: u16, nickname: impl Into<String>) -> Self {
        let nickname = nickname.into();
        Self {
            host: host.into(),
            port,
            user_info: nickname.clone(),
            nickname,
            default_channel: None,
        }
    }

    /// Set the user info.
    #[must_use]
    pub fn with_user_info(mut self, user_info: impl Into<String>) -> Self {
        self.user_info = user_info.into();
        self
    }

    /// Set the default channel.
    #[must_use]
    pub fn with_default_channel(mut self, channel: impl Into<String>) -> Self {
        self.default_channel = Some(channel.into());
        self
    }

    /// `host:port` for dialling.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check every field before connecting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        validate_nickname(&self.nickname).map_err(|cause| ConfigError::InvalidNickname {
            nick: self.nickname.clone(),
            cause,
        })?;
        validate_text(&self.user_info).map_err(ConfigError::InvalidUserInfo)?;
        if let Some(channel) = &self.default_channel {
            validate_channel_name(channel).map_err(|cause| ConfigError::InvalidChannel {
                name: channel.clone(),
                cause,
            })?;
        }
        Ok(())
    }

    /// The action that opens the session.
    pub fn register_action(&self) -> Action {
        Action::Register {
            nickname: self.nickname.clone(),
            user_info: self.user_info.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("localhost", DEFAULT_PORT, "bob");
        assert_eq!(config.user_info, "bob");
        assert_eq!(config.default_channel, None);
        assert_eq!(
            config.register_action(),
            Action::Register {
                nickname: "bob".into(),
                user_info: "bob".into()
            }
        );
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let base = ClientConfig::new("localhost", DEFAULT_PORT, "bob");
        assert!(base.validate().is_ok());

        let mut config = base.clone();
        config.host = " ".into();
        assert_eq!(config.validate(), Err(ConfigError::EmptyHost));

        let mut config = base.clone();
        config.port = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidPort));

        let config = ClientConfig::new("localhost", 6667, "9lives");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidNickname { .. })
        ));

        let config = base.clone().with_default_channel("general");
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidChannel {
                name: "general".into(),
                cause: ValidationError::MissingPrefix
            })
        );

        let config = base.with_user_info("evil\r\nQUIT");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidUserInfo(_))
        ));
    }
}
