//! Options persisted between runs.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

/// Settings remembered across runs, stored as TOML in the user's config directory.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Where fonts are looked up by name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fonts_dir: Option<PathBuf>,
    /// The font used by the last successful render
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_font: Option<String>,
}

impl Options {
    /// `<config dir>/figbanner/options.toml`, if the platform has a config directory.
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("figbanner").join("options.toml"))
    }

    pub fn load() -> Result<Self> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("no config directory, options will not be remembered");
                Ok(Self::default())
            }
        }
    }

    /// Reads the options at `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no options at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("cannot read options from {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("invalid options in {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        match Self::path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    /// Writes to a temporary file next to `path` first, then renames it into place.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create {}", parent.display()))?;
        }
        let contents = toml::to_string(self)?;
        let temp_path = path.with_extension("toml.tmp");
        fs::write(&temp_path, contents)
            .with_context(|| format!("cannot write {}", temp_path.display()))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("cannot replace {}", path.display()))?;
        log::debug!("saved options to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::Options;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let options = Options::load_from(&dir.path().join("options.toml")).unwrap();
        assert_eq!(options, Options::default());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("options.toml");
        let options = Options {
            fonts_dir: Some(PathBuf::from("/usr/share/figlet")),
            last_font: Some("standard".to_owned()),
        };
        options.save_to(&path).unwrap();
        assert!(!path.with_extension("toml.tmp").exists());
        assert_eq!(Options::load_from(&path).unwrap(), options);
    }

    #[test]
    fn partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.toml");
        fs::write(&path, "last_font = \"big\"\n").unwrap();
        let options = Options::load_from(&path).unwrap();
        assert_eq!(options.last_font.as_deref(), Some("big"));
        assert_eq!(options.fonts_dir, None);
    }

    #[test]
    fn invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.toml");
        fs::write(&path, "last_font = [").unwrap();
        assert!(Options::load_from(&path).is_err());
    }
}
