//! Group alias file loader
//!
//! Reads `token = Display Name` lines used to decorate the console status line.
//! A missing file is an empty table. Malformed lines either abort loading
//! (strict) or are skipped with a warning.

use std::collections::HashMap;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors raised while loading an alias file
#[derive(Debug, Error)]
pub enum AliasError {
    #[error("failed to read alias file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("malformed alias line {line} in {path}: '{content}' (expected 'token = name')")]
    Malformed {
        path: String,
        line: usize,
        content: String,
    },
}

/// Mapping from group token to display name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    names: HashMap<String, String>,
}

impl AliasTable {
    pub fn get(&self, token: &str) -> Option<&str> {
        self.names.get(token).map(String::as_str)
    }

    pub fn insert(&mut self, token: impl Into<String>, name: impl Into<String>) {
        self.names.insert(token.into(), name.into());
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Parse alias file contents. Blank lines and `#` comments are ignored.
    pub fn parse(contents: &str, path: &str, strict: bool) -> Result<Self, AliasError> {
        let mut table = AliasTable::default();

        for (idx, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match parse_line(line) {
                Some((token, name)) => table.insert(token, name),
                None if strict => {
                    return Err(AliasError::Malformed {
                        path: path.to_string(),
                        line: idx + 1,
                        content: line.to_string(),
                    });
                }
                None => warn!("Skipping malformed alias line {} in {}: '{}'", idx + 1, path, line),
            }
        }

        Ok(table)
    }

    /// Load the alias file at `path`, if any
    pub fn load(path: Option<&Path>, strict: bool) -> Result<Self, AliasError> {
        let Some(path) = path else {
            debug!("No alias file configured");
            return Ok(AliasTable::default());
        };
        let path_str = path.display().to_string();

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Alias file {} not found, continuing without aliases", path_str);
                return Ok(AliasTable::default());
            }
            Err(source) => return Err(AliasError::Io { path: path_str, source }),
        };

        let table = Self::parse(&contents, &path_str, strict)?;
        info!("Loaded {} group alias(es) from {}", table.len(), path_str);
        Ok(table)
    }
}

fn parse_line(line: &str) -> Option<(&str, &str)> {
    let (token, name) = line.split_once('=')?;
    let (token, name) = (token.trim(), name.trim());
    if token.is_empty() || name.is_empty() {
        return None;
    }
    Some((token, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_trims_and_ignores_blank_lines() {
        let table = AliasTable::parse("s1 = Drums\n\n  m2=Bass  \n# comment\n", "mem", true).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("s1"), Some("Drums"));
        assert_eq!(table.get("m2"), Some("Bass"));
        assert_eq!(table.get("r1"), None);
    }

    #[test]
    fn test_value_may_contain_equals() {
        let table = AliasTable::parse("r3 = A=B", "mem", true).unwrap();
        assert_eq!(table.get("r3"), Some("A=B"));
    }

    #[test]
    fn test_strict_rejects_malformed_line() {
        let err = AliasTable::parse("s1 = Drums\nnonsense\n", "groups.txt", true).unwrap_err();

        match err {
            AliasError::Malformed { line, content, .. } => {
                assert_eq!(line, 2);
                assert_eq!(content, "nonsense");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_lenient_skips_malformed_line() {
        let table = AliasTable::parse("s1 = Drums\nnonsense\n = empty\nm1 = Keys", "mem", false).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("m1"), Some("Keys"));
    }

    #[test]
    fn test_load_without_path_is_empty() {
        assert!(AliasTable::load(None, true).unwrap().is_empty());
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("does-not-exist.txt");

        let table = AliasTable::load(Some(&path), true).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("groups.txt");
        fs::write(&path, "s1 = Drums\nr2 = Vocals\n").unwrap();

        let table = AliasTable::load(Some(&path), false).unwrap();
        assert_eq!(table.get("r2"), Some("Vocals"));
    }
}
