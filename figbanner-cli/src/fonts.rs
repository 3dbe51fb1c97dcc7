//! Locating font files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use walkdir::WalkDir;

const EXTENSION: &str = "flf";

/// A directory of `.flf` files, possibly nested.
///
/// Fonts are identified by their path relative to the root, without the extension, using `/` as
/// separator: `standard`, `contributed/banner3`.
#[derive(Debug, Clone)]
pub struct FontDirectory {
    root: PathBuf,
}

impl FontDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// All font identifiers below the root, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            bail!("fonts directory {} does not exist", self.root.display());
        }
        let mut fonts = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1) {
            let entry = entry.with_context(|| format!("reading {}", self.root.display()))?;
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != EXTENSION) {
                continue;
            }
            let Ok(relative) = path.with_extension("").strip_prefix(&self.root).map(Path::to_owned)
            else {
                continue;
            };
            let identifier = relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            fonts.push(identifier);
        }
        fonts.sort();
        log::debug!("found {} fonts in {}", fonts.len(), self.root.display());
        Ok(fonts)
    }

    pub fn path_of(&self, identifier: &str) -> PathBuf {
        self.root.join(format!("{identifier}.{EXTENSION}"))
    }
}

/// Reads the raw bytes of a font given either as a file path or as an identifier in `directory`.
pub fn read_font(identifier: &str, directory: Option<&FontDirectory>) -> Result<Vec<u8>> {
    let path = Path::new(identifier);
    let path = if path.is_file() {
        path.to_owned()
    } else if let Some(directory) = directory {
        directory.path_of(identifier)
    } else {
        bail!("font {identifier:?} is not a file and no fonts directory is set (see --fonts-dir)");
    };
    log::info!("loading font {}", path.display());
    fs::read(&path).with_context(|| format!("cannot read font {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{FontDirectory, read_font};

    #[test]
    fn lists_fonts_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("standard.flf"), "x").unwrap();
        fs::write(dir.path().join("big.flf"), "x").unwrap();
        fs::write(dir.path().join("README"), "x").unwrap();
        fs::create_dir(dir.path().join("contributed")).unwrap();
        fs::write(dir.path().join("contributed").join("banner3.flf"), "x").unwrap();

        let fonts = FontDirectory::new(dir.path()).list().unwrap();
        assert_eq!(fonts, ["big", "contributed/banner3", "standard"]);
    }

    #[test]
    fn missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FontDirectory::new(dir.path().join("nope")).list().is_err());
    }

    #[test]
    fn reads_by_name_or_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mini.flf");
        fs::write(&path, "flf2a$ 1 1 2 -1 0\n").unwrap();
        let directory = FontDirectory::new(dir.path());

        let by_name = read_font("mini", Some(&directory)).unwrap();
        let by_path = read_font(path.to_str().unwrap(), None).unwrap();
        assert_eq!(by_name, by_path);
        assert!(read_font("other", Some(&directory)).is_err());
        assert!(read_font("mini", None).is_err());
    }
}
