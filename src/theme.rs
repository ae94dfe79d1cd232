//! Light/dark color-mode handling. The active [`ColorMode`] lives in a
//! [`ThemeContext`] that is handed to the page writer explicitly, and the
//! user's preference is persisted through a [`ColorModeStore`].

use log::{debug, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

/// The site's color scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    Light,
    Dark,
}

impl Default for ColorMode {
    fn default() -> Self {
        ColorMode::Light
    }
}

impl ColorMode {
    /// Returns the opposite mode.
    pub fn toggled(self) -> ColorMode {
        match self {
            ColorMode::Light => ColorMode::Dark,
            ColorMode::Dark => ColorMode::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColorMode::Light => "light",
            ColorMode::Dark => "dark",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(ColorMode::Light),
            "dark" => Ok(ColorMode::Dark),
            other => Err(Error::InvalidColorMode(other.to_owned())),
        }
    }
}

/// Persists the preferred [`ColorMode`] between builds.
pub trait ColorModeStore {
    /// Returns the stored preference, if any.
    fn load(&self) -> Result<Option<ColorMode>>;

    /// Replaces the stored preference.
    fn save(&mut self, mode: ColorMode) -> Result<()>;
}

/// Stores the preference as a single word in a file (by default
/// `.folio-color-mode` in the project root).
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub const FILE_NAME: &'static str = ".folio-color-mode";

    pub fn new(path: impl Into<PathBuf>) -> FileStore {
        FileStore { path: path.into() }
    }

    /// Creates a store for the project rooted at `project_root`.
    pub fn in_project(project_root: &Path) -> FileStore {
        FileStore::new(project_root.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ColorModeStore for FileStore {
    fn load(&self) -> Result<Option<ColorMode>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents.parse()?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io {
                path: self.path.clone(),
                err: e,
            }),
        }
    }

    fn save(&mut self, mode: ColorMode) -> Result<()> {
        std::fs::write(&self.path, format!("{}\n", mode)).map_err(|e| {
            Error::Io {
                path: self.path.clone(),
                err: e,
            }
        })
    }
}

/// A store that keeps the preference in memory only.
#[derive(Default)]
pub struct MemoryStore(Option<ColorMode>);

impl ColorModeStore for MemoryStore {
    fn load(&self) -> Result<Option<ColorMode>> {
        Ok(self.0)
    }

    fn save(&mut self, mode: ColorMode) -> Result<()> {
        self.0 = Some(mode);
        Ok(())
    }
}

/// The theme state passed to rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeContext {
    pub mode: ColorMode,
}

impl ThemeContext {
    /// Resolves the active mode: the stored preference wins over the
    /// configured default. A store that can't be read is logged and ignored
    /// so a corrupt preference file never breaks a build.
    pub fn resolve(store: &dyn ColorModeStore, default: ColorMode) -> ThemeContext {
        let mode = match store.load() {
            Ok(Some(mode)) => {
                debug!("using stored color mode `{}`", mode);
                mode
            }
            Ok(None) => default,
            Err(e) => {
                warn!("ignoring stored color mode: {}", e);
                default
            }
        };
        ThemeContext { mode }
    }

    /// The mode a theme's toggle button switches to.
    pub fn alternate(&self) -> ColorMode {
        self.mode.toggled()
    }

    /// Switches to the other mode and persists the result.
    pub fn toggle(&mut self, store: &mut dyn ColorModeStore) -> Result<ColorMode> {
        self.set(self.mode.toggled(), store)
    }

    /// Sets the mode and persists it.
    pub fn set(
        &mut self,
        mode: ColorMode,
        store: &mut dyn ColorModeStore,
    ) -> Result<ColorMode> {
        store.save(mode)?;
        self.mode = mode;
        Ok(mode)
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading or saving the color-mode preference.
#[derive(Debug)]
pub enum Error {
    /// Returned when a string isn't `light` or `dark`.
    InvalidColorMode(String),

    /// Returned for I/O problems with the preference file.
    Io { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidColorMode(s) => write!(
                f,
                "invalid color mode `{}` (expected `light` or `dark`)",
                s
            ),
            Error::Io { path, err } => {
                write!(f, "color mode file '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidColorMode(_) => None,
            Error::Io { path: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() -> Result<()> {
        assert_eq!(ColorMode::Dark, "dark".parse()?);
        assert_eq!(ColorMode::Light, " Light\n".parse()?);
        assert!("sepia".parse::<ColorMode>().is_err());
        Ok(())
    }

    #[test]
    fn test_resolve_prefers_stored_mode() -> Result<()> {
        let mut store = MemoryStore::default();
        assert_eq!(
            ColorMode::Light,
            ThemeContext::resolve(&store, ColorMode::Light).mode
        );

        store.save(ColorMode::Dark)?;
        assert_eq!(
            ColorMode::Dark,
            ThemeContext::resolve(&store, ColorMode::Light).mode
        );
        Ok(())
    }

    #[test]
    fn test_toggle_persists() -> Result<()> {
        let mut store = MemoryStore::default();
        let mut theme = ThemeContext::resolve(&store, ColorMode::Light);
        assert_eq!(ColorMode::Dark, theme.alternate());

        assert_eq!(ColorMode::Dark, theme.toggle(&mut store)?);
        assert_eq!(Some(ColorMode::Dark), store.load()?);
        assert_eq!(ColorMode::Light, theme.toggle(&mut store)?);
        assert_eq!(Some(ColorMode::Light), store.load()?);
        Ok(())
    }

    #[test]
    fn test_file_store() -> Result<()> {
        let dir = tempfile::tempdir().map_err(|err| Error::Io {
            path: PathBuf::new(),
            err,
        })?;
        let mut store = FileStore::in_project(dir.path());
        assert_eq!(None, store.load()?);

        store.save(ColorMode::Dark)?;
        assert_eq!(Some(ColorMode::Dark), store.load()?);
        Ok(())
    }

    #[test]
    fn test_corrupt_file_falls_back_to_default() -> Result<()> {
        let dir = tempfile::tempdir().map_err(|err| Error::Io {
            path: PathBuf::new(),
            err,
        })?;
        let store = FileStore::in_project(dir.path());
        std::fs::write(store.path(), "purple").map_err(|err| Error::Io {
            path: store.path().to_owned(),
            err,
        })?;
        assert_eq!(
            ColorMode::Dark,
            ThemeContext::resolve(&store, ColorMode::Dark).mode
        );
        Ok(())
    }
}
