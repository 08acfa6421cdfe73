//! Editing a strain file in place.
//!
//! Keys keep their order on save. Comments and formatting do not survive a
//! round trip through `serde_yaml`.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use crate::error::BuildError;

/// A strain file opened for editing.
#[derive(Debug, Clone)]
pub struct StrainFile {
    path: PathBuf,
    root: Mapping,
}

impl StrainFile {
    /// Read and parse the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the file cannot be read, is not YAML, or
    /// its root is not a mapping.
    pub fn open(path: &Path) -> Result<Self, BuildError> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| BuildError::Io {
            path: display.clone(),
            source,
        })?;
        let value: Value = serde_yaml::from_str(&content).map_err(|source| BuildError::Yaml {
            path: display.clone(),
            source,
        })?;
        match value {
            Value::Mapping(root) => Ok(Self {
                path: path.to_path_buf(),
                root,
            }),
            _ => Err(BuildError::NotAMapping { path: display }),
        }
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A top-level string value.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.root.get(key).and_then(Value::as_str)
    }

    /// Set a top-level key to a string, replacing any previous value in
    /// place or appending the key at the end.
    pub fn set_string(&mut self, key: &str, value: &str) {
        self.root
            .insert(Value::String(key.to_string()), Value::String(value.to_string()));
    }

    /// Write the mapping back to the file it was opened from.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if serialization or the write fails.
    pub fn save(&self) -> Result<(), BuildError> {
        let display = self.path.display().to_string();
        let content = serde_yaml::to_string(&self.root).map_err(|source| BuildError::Yaml {
            path: display.clone(),
            source,
        })?;
        std::fs::write(&self.path, content).map_err(|source| BuildError::Io {
            path: display,
            source,
        })?;
        tracing::debug!(path = %self.path.display(), "strain file saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_save_preserves_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(
            &path,
            "TUTOR_VERSION: v15.3.0\nDOCKER_IMAGE_OPENEDX: org/openedx:olive\nPICASSO_THEMES_NAME: [bragi]\n",
        )
        .unwrap();

        let mut file = StrainFile::open(&path).unwrap();
        file.set_string("DOCKER_IMAGE_OPENEDX", "org/openedx:olive-1");
        file.set_string("MFE_DOCKER_IMAGE", "org/mfe:olive-1");
        file.save().unwrap();

        let reopened = StrainFile::open(&path).unwrap();
        assert_eq!(reopened.get_str("DOCKER_IMAGE_OPENEDX"), Some("org/openedx:olive-1"));
        assert_eq!(reopened.get_str("MFE_DOCKER_IMAGE"), Some("org/mfe:olive-1"));

        let written = std::fs::read_to_string(&path).unwrap();
        let tutor = written.find("TUTOR_VERSION").unwrap();
        let image = written.find("DOCKER_IMAGE_OPENEDX").unwrap();
        let themes = written.find("PICASSO_THEMES_NAME").unwrap();
        let mfe = written.find("MFE_DOCKER_IMAGE").unwrap();
        assert!(tutor < image && image < themes && themes < mfe, "{written}");
    }

    #[test]
    fn rejects_non_mapping_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "- one\n- two\n").unwrap();
        assert!(matches!(
            StrainFile::open(&path).unwrap_err(),
            BuildError::NotAMapping { .. }
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = StrainFile::open(Path::new("/nonexistent/config.yml")).unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }
}
