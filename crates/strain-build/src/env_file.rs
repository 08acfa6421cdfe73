//! Exporting values to the CI environment file.
//!
//! Single-line values are written as `KEY=value`. Multi-line values use the
//! heredoc form understood by GitHub Actions:
//!
//! ```text
//! KEY<<strain_7d0c...
//! line one
//! line two
//! strain_7d0c...
//! ```

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use uuid::Uuid;

use crate::error::BuildError;

/// Writes environment assignments to a sink.
#[derive(Debug)]
pub struct EnvEmitter<W: Write> {
    out: W,
    label: String,
}

impl EnvEmitter<File> {
    /// Open `path` for appending, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Io`] if the file cannot be opened.
    pub fn append_to(path: &Path) -> Result<Self, BuildError> {
        let out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| BuildError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Self {
            out,
            label: path.display().to_string(),
        })
    }
}

impl<W: Write> EnvEmitter<W> {
    /// Wrap any writer. `label` names it in errors.
    pub fn new(out: W, label: impl Into<String>) -> Self {
        Self {
            out,
            label: label.into(),
        }
    }

    /// Export `key=value`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidEnvKey`] if `key` is not a shell
    /// identifier, or [`BuildError::Io`] if the write fails.
    pub fn emit(&mut self, key: &str, value: &str) -> Result<(), BuildError> {
        if !is_env_key(key) {
            return Err(BuildError::InvalidEnvKey {
                key: key.to_string(),
            });
        }

        let record = if value.contains('\n') {
            let delimiter = format!("strain_{}", Uuid::new_v4().simple());
            format!("{key}<<{delimiter}\n{value}\n{delimiter}\n")
        } else {
            format!("{key}={value}\n")
        };

        self.out
            .write_all(record.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|source| BuildError::Io {
                path: self.label.clone(),
                source,
            })?;
        tracing::debug!(key, sink = %self.label, "exported environment variable");
        Ok(())
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

fn is_env_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_assignment() {
        let mut emitter = EnvEmitter::new(Vec::new(), "buffer");
        emitter
            .emit("DOCKER_IMAGE_OPENEDX", "org/openedx:olive-1")
            .unwrap();
        let out = String::from_utf8(emitter.into_inner()).unwrap();
        assert_eq!(out, "DOCKER_IMAGE_OPENEDX=org/openedx:olive-1\n");
    }

    #[test]
    fn multi_line_uses_heredoc() {
        let mut emitter = EnvEmitter::new(Vec::new(), "buffer");
        emitter.emit("NOTES", "one\ntwo").unwrap();
        let out = String::from_utf8(emitter.into_inner()).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        let delimiter = lines[0].strip_prefix("NOTES<<").unwrap();
        assert!(delimiter.starts_with("strain_"));
        assert_eq!(lines[1..3], ["one", "two"]);
        assert_eq!(lines[3], delimiter);
    }

    #[test]
    fn rejects_bad_keys() {
        let mut emitter = EnvEmitter::new(Vec::new(), "buffer");
        for key in ["", "1ABC", "A-B", "A B", "A=B"] {
            assert!(
                matches!(emitter.emit(key, "x"), Err(BuildError::InvalidEnvKey { .. })),
                "{key:?} accepted"
            );
        }
        assert!(emitter.into_inner().is_empty());
    }

    #[test]
    fn appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_env");
        std::fs::write(&path, "EXISTING=1\n").unwrap();

        let mut emitter = EnvEmitter::append_to(&path).unwrap();
        emitter.emit("STRAIN_NAME", "base").unwrap();
        drop(emitter);

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "EXISTING=1\nSTRAIN_NAME=base\n"
        );
    }
}
