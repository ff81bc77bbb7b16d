//! Configuration management.

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vmtrust::{TrustPaths, DEFAULT_KEYSET};

use crate::output::OutputFormat;

/// CLI configuration.
///
/// Every field is optional; unset fields fall back to platform directories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Trust material root (holds `manifest/uuid` and `keys/`).
    pub trust_dir: Option<PathBuf>,

    /// Credential storage root. Defaults to `<trust_dir>/sudi`.
    pub sudi_dir: Option<PathBuf>,

    /// VM configuration root.
    pub machines_dir: Option<PathBuf>,

    /// Keyset used when `--keyset` is not given.
    pub default_keyset: Option<String>,

    /// Default output format.
    pub output_format: Option<OutputFormat>,
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("io", "project-machine", "machine")
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}

impl Config {
    /// Get the default config file path.
    pub fn default_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("vmtrust.toml"))
    }

    /// Load configuration from file, or defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config file {}: {e}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Keyset to use when none was given on the command line.
    pub fn keyset(&self) -> &str {
        self.default_keyset.as_deref().unwrap_or(DEFAULT_KEYSET)
    }

    /// Resolve the directory layout.
    ///
    /// Explicit values (flags or environment) win over the config file,
    /// which wins over platform directories.
    pub fn resolve_paths(
        &self,
        trust_dir: Option<PathBuf>,
        sudi_dir: Option<PathBuf>,
        machines_dir: Option<PathBuf>,
    ) -> Result<TrustPaths> {
        let trust_dir = match trust_dir.or_else(|| self.trust_dir.clone()) {
            Some(dir) => dir,
            None => project_dirs()?.data_dir().join("trust"),
        };
        let sudi_dir = sudi_dir
            .or_else(|| self.sudi_dir.clone())
            .unwrap_or_else(|| trust_dir.join("sudi"));
        let machines_dir = match machines_dir.or_else(|| self.machines_dir.clone()) {
            Some(dir) => dir,
            None => project_dirs()?.config_dir().join("machines"),
        };

        Ok(TrustPaths::new(trust_dir, sudi_dir, machines_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert!(config.trust_dir.is_none());
        assert_eq!(config.keyset(), "default");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/vmtrust.toml");
        let config = Config {
            trust_dir: Some(PathBuf::from("/srv/trust")),
            default_keyset: Some("snakeoil".into()),
            output_format: Some(OutputFormat::Json),
            ..Config::default()
        };
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.trust_dir, Some(PathBuf::from("/srv/trust")));
        assert_eq!(loaded.keyset(), "snakeoil");
        assert_eq!(loaded.output_format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_resolve_precedence() {
        let config = Config {
            trust_dir: Some(PathBuf::from("/file/trust")),
            machines_dir: Some(PathBuf::from("/file/machines")),
            ..Config::default()
        };

        let paths = config
            .resolve_paths(Some(PathBuf::from("/flag/trust")), None, None)
            .unwrap();
        assert_eq!(paths.trust_dir, PathBuf::from("/flag/trust"));
        assert_eq!(paths.sudi_dir, PathBuf::from("/flag/trust/sudi"));
        assert_eq!(paths.machines_dir, PathBuf::from("/file/machines"));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("vmtrust.toml");
        std::fs::write(&path, "trust_dir = [").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
