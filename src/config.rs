// src/config.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::utils::resolve_path;

pub const CONFIG_FILE: &str = "config.yaml";
const DEFAULT_PORT: u16 = 4002;

/// Paths and server settings for one environment section of `config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub documents_path: PathBuf,
    pub output_path: PathBuf,
    pub templates_path: PathBuf,
    pub database_path: PathBuf,
    pub port: u16,
    /// JSON logs go here when set, otherwise logs are written to stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            documents_path: PathBuf::from("data/documents"),
            output_path: PathBuf::from("out"),
            templates_path: PathBuf::from("templates"),
            database_path: PathBuf::from("data/accounts.db"),
            port: DEFAULT_PORT,
            log_file: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: EnvironmentConfig,
    #[serde(default)]
    production: EnvironmentConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub paths: EnvironmentConfig,
    pub jwt_secret: Option<String>,
    pub render_service_url: Option<String>,
    /// `config.yaml` the paths came from; `None` when defaults were used.
    pub source: Option<PathBuf>,
}

impl AppConfig {
    /// Load `config.yaml` from the current directory, then apply environment overrides.
    ///
    /// Nothing is logged here: tracing is configured from the result.
    pub fn load() -> Result<Self> {
        let base_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::load_from(&base_dir, &Self::get_environment(), |key| std::env::var(key).ok())
    }

    pub fn load_from<F>(base_dir: &Path, environment: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_path = base_dir.join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            let mut config = Self::from_yaml(&content, environment, base_dir)?;
            config.source = Some(config_path);
            config
        } else {
            Self::with_paths(environment, EnvironmentConfig::default(), base_dir)
        };

        config.apply_overrides(lookup)?;
        Ok(config)
    }

    /// Report where the configuration came from, once tracing is up.
    pub fn log_summary(&self) {
        info!("Loaded configuration for environment: {}", self.environment);
        match &self.source {
            Some(path) => info!("Configuration file: {}", path.display()),
            None => info!("{} not found, using defaults", CONFIG_FILE),
        }
    }

    fn get_environment() -> String {
        std::env::var("RESUMECRAFT_ENV")
            .or_else(|_| std::env::var("ENVIRONMENT"))
            .unwrap_or_else(|_| "local".to_string())
    }

    pub fn from_yaml(content: &str, environment: &str, base_dir: &Path) -> Result<Self> {
        let config_file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse config.yaml")?;

        let section = match environment {
            "production" => config_file.production,
            _ => config_file.local,
        };

        Ok(Self::with_paths(environment, section, base_dir))
    }

    fn with_paths(environment: &str, section: EnvironmentConfig, base_dir: &Path) -> Self {
        let paths = EnvironmentConfig {
            documents_path: resolve_path(base_dir, &section.documents_path),
            output_path: resolve_path(base_dir, &section.output_path),
            templates_path: resolve_path(base_dir, &section.templates_path),
            database_path: resolve_path(base_dir, &section.database_path),
            log_file: section.log_file.map(|p| resolve_path(base_dir, &p)),
            port: section.port,
        };

        Self {
            environment: environment.to_string(),
            paths,
            jwt_secret: None,
            render_service_url: None,
            source: None,
        }
    }

    /// Secrets and deployment knobs that never live in the config file.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.jwt_secret = lookup("RESUMECRAFT_JWT_SECRET").filter(|s| !s.is_empty());
        self.render_service_url = lookup("RENDER_SERVICE_URL").filter(|s| !s.is_empty());

        if let Some(port) = lookup("ROCKET_PORT") {
            self.paths.port = port
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("ROCKET_PORT must be a valid port number"))?;
        }

        Ok(())
    }

    pub fn require_jwt_secret(&self) -> Result<&str> {
        self.jwt_secret
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("RESUMECRAFT_JWT_SECRET environment variable not set"))
    }

    /// Scratch space for typst compilation.
    pub fn render_workspace(&self) -> PathBuf {
        self.paths.output_path.join("tmp_workspace")
    }

    /// Ensure all configured directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        let dirs = [
            &self.paths.documents_path,
            &self.paths.output_path,
            &self.paths.templates_path,
        ];

        for dir in dirs {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }

        // Only the parent: sqlite creates the file itself
        if let Some(db_parent) = self.paths.database_path.parent() {
            tokio::fs::create_dir_all(db_parent).await.with_context(|| {
                format!(
                    "Failed to create database directory: {}",
                    db_parent.display()
                )
            })?;
        }

        info!("All configured directories ensured to exist");
        Ok(())
    }
}
