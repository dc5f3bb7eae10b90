use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::state::ensure_pesa_home;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub parser: ParserSection,
    #[serde(default)]
    pub notify: NotifySection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParserSection {
    /// IANA zone message times are written in
    pub timezone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotifySection {
    /// POST alerts here as JSON; when unset they are appended to the outbox file
    pub webhook_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ParserSection {
    fn default() -> Self {
        Self {
            timezone: pesa_core::DEFAULT_TIMEZONE.name().to_string(),
        }
    }
}

impl Default for NotifySection {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn timezone(&self) -> Result<Tz> {
        self.parser
            .timezone
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid timezone in config: {}", self.parser.timezone))
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify.timeout_secs.max(1))
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_pesa_home()?.join("config.toml"))
}

pub fn load_config_from(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).context("parse config.toml")
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

/// Starter `config.toml`: the defaults, with each key explained.
fn config_template() -> String {
    let defaults = Config::default();
    format!(
        r#"# pesa configuration

[parser]
# IANA zone the SMS timestamps are written in.
timezone = "{timezone}"

[notify]
# POST low-balance alerts to this URL as JSON. Leave commented out to append
# them to outbox.jsonl next to this file instead.
# webhook_url = "https://example.com/hooks/pesa"

# Give up on a slow alert channel after this many seconds.
timeout_secs = {timeout}
"#,
        timezone = defaults.parser.timezone,
        timeout = defaults.notify.timeout_secs,
    )
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    fs::write(&p, config_template()).with_context(|| format!("write {}", p.display()))?;
    println!("Wrote {}", p.display());
    println!("Set a budget with: pesa budget set --threshold <amount> --target <address>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timezone_is_nairobi() {
        let cfg = Config::default();
        assert_eq!(cfg.timezone().unwrap(), chrono_tz::Africa::Nairobi);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[notify]\nwebhook_url = \"http://localhost:9000/hook\"\ntimeout_secs = 3\n").unwrap();
        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.parser, ParserSection::default());
        assert_eq!(cfg.notify.webhook_url.as_deref(), Some("http://localhost:9000/hook"));
        assert_eq!(cfg.notify_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_section_with_missing_keys_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("config.toml");
        fs::write(&p, "[parser]\n\n[notify]\nwebhook_url = \"http://localhost:9000/hook\"\n").unwrap();
        let cfg = load_config_from(&p).unwrap();
        assert_eq!(cfg.timezone().unwrap(), chrono_tz::Africa::Nairobi);
        assert_eq!(cfg.notify.webhook_url.as_deref(), Some("http://localhost:9000/hook"));
        assert_eq!(cfg.notify.timeout_secs, NotifySection::default().timeout_secs);
    }

    #[test]
    fn test_template_loads_as_defaults() {
        let cfg: Config = toml::from_str(&config_template()).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_bad_timezone_is_an_error() {
        let mut cfg = Config::default();
        cfg.parser.timezone = "Mars/Olympus".to_string();
        assert!(cfg.timezone().is_err());
    }
}
