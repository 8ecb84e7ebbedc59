//! Runtime configuration read from the environment (and `.env` via `dotenv`).

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the bot configuration
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    MissingVar(&'static str),
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub discord_token: String,
    /// Directory holding the JSON documents of the key-value store
    pub data_dir: PathBuf,
    /// Cookie file handed to yt-dlp for videos that require signing in
    pub ytdl_cookie_file: Option<PathBuf>,
    pub ytdlp_path: String,
    /// Register commands in every guild at startup so they show up immediately
    pub fast_sync_per_guild: bool,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let discord_token = lookup("DISCORD_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::MissingVar("DISCORD_TOKEN"))?;

        let data_dir = lookup("DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data"));

        let ytdl_cookie_file = lookup("YTDL_COOKIEFILE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        let ytdlp_path = lookup("YTDLP_PATH")
            .filter(|path| !path.trim().is_empty())
            .unwrap_or_else(|| "yt-dlp".to_string());

        // Anything other than an explicit "off" keeps per-guild sync on
        let fast_sync_per_guild = lookup("FAST_SYNC_PER_GUILD")
            .map(|value| !is_off(&value))
            .unwrap_or(true);

        Ok(Self {
            discord_token,
            data_dir,
            ytdl_cookie_file,
            ytdlp_path,
            fast_sync_per_guild,
        })
    }
}

fn is_off(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "0" | "false" | "no")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use test_case::test_case;

    fn config_from(vars: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_only_token() {
        let config = config_from(&[("DISCORD_TOKEN", "abc")]).unwrap();

        assert_eq!(config.discord_token, "abc");
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.ytdl_cookie_file, None);
        assert_eq!(config.ytdlp_path, "yt-dlp");
        assert!(config.fast_sync_per_guild);
    }

    #[test]
    fn test_missing_token() {
        let err = config_from(&[("DATA_DIR", "/tmp")]).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar("DISCORD_TOKEN"));
    }

    #[test]
    fn test_blank_token_is_missing() {
        let err = config_from(&[("DISCORD_TOKEN", "   ")]).unwrap_err();
        assert_eq!(err, ConfigError::MissingVar("DISCORD_TOKEN"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("DISCORD_TOKEN", "abc"),
            ("DATA_DIR", "/var/lib/maestro"),
            ("YTDL_COOKIEFILE", "/etc/cookies.txt"),
            ("YTDLP_PATH", "/usr/local/bin/yt-dlp"),
        ])
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/var/lib/maestro"));
        assert_eq!(
            config.ytdl_cookie_file,
            Some(PathBuf::from("/etc/cookies.txt"))
        );
        assert_eq!(config.ytdlp_path, "/usr/local/bin/yt-dlp");
    }

    #[test_case("0", false)]
    #[test_case("false", false)]
    #[test_case("No", false)]
    #[test_case("1", true)]
    #[test_case("TRUE", true)]
    #[test_case(" yes ", true)]
    #[test_case("off", true)]
    #[test_case("maybe", true)]
    #[test_case("", true)]
    fn test_fast_sync_flag(value: &str, expected: bool) {
        let config =
            config_from(&[("DISCORD_TOKEN", "abc"), ("FAST_SYNC_PER_GUILD", value)]).unwrap();
        assert_eq!(config.fast_sync_per_guild, expected);
    }
}
