use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use harvester_engine::{HarvestSettings, RestSettings};
use serde::Deserialize;

use crate::cli::Cli;

pub const DEFAULT_CONFIG_FILE: &str = "./harvester.ron";
pub const TOKEN_ENV: &str = "HARVESTER_TOKEN";

/// On-disk configuration. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub token: Option<String>,
    pub server_id: Option<String>,
    /// Category ids whose channels are harvested when none are named.
    pub categories: Vec<String>,
    pub download_dir: Option<PathBuf>,
    pub concurrency: Option<usize>,
    pub api_base: Option<String>,
}

impl AppConfig {
    pub fn parse(text: &str) -> Result<Self> {
        ron::from_str(text).context("invalid config")
    }

    /// Read `path`. A missing file is only an error when the path was given
    /// explicitly.
    pub fn load(path: &Path, explicit: bool) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => Self::parse(&text).with_context(|| format!("in {}", path.display())),
            Err(err) if err.kind() == io::ErrorKind::NotFound && !explicit => Ok(Self::default()),
            Err(err) => {
                Err(err).with_context(|| format!("cannot read config {}", path.display()))
            }
        }
    }

    /// Load from the CLI-selected file and apply the token environment override.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let (path, explicit) = match &cli.config {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        let config = Self::load(&path, explicit)?;
        Ok(config.with_token_override(std::env::var(TOKEN_ENV).ok()))
    }

    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|token| !token.trim().is_empty()) {
            self.token = Some(token);
        }
        self
    }

    pub fn harvest_settings(&self, cli: &Cli) -> Result<HarvestSettings> {
        let mut settings = HarvestSettings::default();
        if let Some(dir) = cli.out.as_ref().or(self.download_dir.as_ref()) {
            settings.dest_root = dir.clone();
        }
        if let Some(concurrency) = cli.concurrency.or(self.concurrency) {
            if concurrency == 0 {
                bail!("concurrency must be at least 1");
            }
            settings.concurrency = concurrency;
        }
        Ok(settings)
    }

    pub fn rest_settings(&self) -> Result<RestSettings> {
        let Some(token) = self.token.clone() else {
            bail!("no token configured: set {TOKEN_ENV} or `token` in the config file");
        };
        let mut settings = RestSettings {
            token: Some(token),
            ..RestSettings::default()
        };
        if let Some(api_base) = &self.api_base {
            settings.api_base = api_base.clone();
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn parses_partial_ron() {
        let config = AppConfig::parse(
            r#"(
                token: Some("abc"),
                server_id: Some("42"),
                categories: ["7", "8"],
            )"#,
        )
        .unwrap();
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.categories, vec!["7", "8"]);
        assert_eq!(config.download_dir, None);
    }

    #[test]
    fn missing_default_file_is_empty_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("harvester.ron");
        assert_eq!(AppConfig::load(&path, false).unwrap(), AppConfig::default());
        assert!(AppConfig::load(&path, true).is_err());
    }

    #[test]
    fn environment_token_wins_unless_blank() {
        let config = AppConfig {
            token: Some("file".into()),
            ..AppConfig::default()
        };
        assert_eq!(
            config.clone().with_token_override(Some("env".into())).token.as_deref(),
            Some("env")
        );
        assert_eq!(
            config.with_token_override(Some("  ".into())).token.as_deref(),
            Some("file")
        );
    }

    #[test]
    fn cli_flags_override_file_settings() {
        let config = AppConfig {
            download_dir: Some("from-file".into()),
            concurrency: Some(50),
            ..AppConfig::default()
        };
        let cli = Cli::parse_from(["harvester", "--out", "from-cli"]);
        let settings = config.harvest_settings(&cli).unwrap();
        assert_eq!(settings.dest_root, PathBuf::from("from-cli"));
        assert_eq!(settings.concurrency, 50);
        assert_eq!(settings.photo_cap, 10_000);

        let cli = Cli::parse_from(["harvester", "--concurrency", "0"]);
        assert!(config.harvest_settings(&cli).is_err());
    }

    #[test]
    fn rest_settings_require_a_token() {
        assert!(AppConfig::default().rest_settings().is_err());
        let config = AppConfig {
            token: Some("t".into()),
            api_base: Some("http://localhost:9/api".into()),
            ..AppConfig::default()
        };
        let rest = config.rest_settings().unwrap();
        assert_eq!(rest.api_base, "http://localhost:9/api");
        assert_eq!(rest.token.as_deref(), Some("t"));
    }
}
