//! Rollback/restore store
//!
//! Copies of files the trust installer is about to overwrite, plus an index
//! mapping each copy back to its original location. The setup procedure only
//! owns the handle; the installer decides what goes in.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

const INDEX_FILE: &str = "sysrestore.index";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Index {
    /// stored name -> original absolute path
    #[serde(default)]
    files: BTreeMap<String, PathBuf>,
}

#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    index: Index,
}

impl FileStore {
    /// Open the store, creating its directory on first use
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create restore store: {}", dir.display()))?;

        let index_path = dir.join(INDEX_FILE);
        let index = if index_path.exists() {
            let contents = fs::read_to_string(&index_path)
                .with_context(|| format!("Failed to read {}", index_path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Corrupt restore index: {}", index_path.display()))?
        } else {
            Index::default()
        };

        Ok(Self { dir, index })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    pub fn has_files(&self) -> bool {
        !self.index.files.is_empty()
    }

    pub fn has_file(&self, path: &Path) -> bool {
        self.index.files.values().any(|p| p == path)
    }

    /// Save a copy of `path`; returns false if it does not exist or is already saved
    pub fn backup_file(&mut self, path: &Path) -> Result<bool> {
        if !path.is_file() || self.has_file(path) {
            return Ok(false);
        }

        let stored = stored_name(path);
        let target = self.dir.join(&stored);
        if self.index.files.contains_key(&stored) || target.exists() {
            bail!(
                "Restore store already holds {} for another file",
                target.display()
            );
        }
        fs::copy(path, &target)
            .with_context(|| format!("Failed to back up {}", path.display()))?;

        self.index.files.insert(stored, path.to_path_buf());
        self.save()?;
        log::debug!("Backed up {} to {}", path.display(), self.dir.display());
        Ok(true)
    }

    /// Put the saved copy of `path` back; returns false if none was saved
    pub fn restore_file(&mut self, path: &Path) -> Result<bool> {
        let Some(stored) = self
            .index
            .files
            .iter()
            .find(|(_, p)| p.as_path() == path)
            .map(|(k, _)| k.clone())
        else {
            return Ok(false);
        };

        let backup = self.dir.join(&stored);
        fs::copy(&backup, path)
            .with_context(|| format!("Failed to restore {}", path.display()))?;
        fs::remove_file(&backup)
            .with_context(|| format!("Failed to remove {}", backup.display()))?;

        self.index.files.remove(&stored);
        self.save()?;
        Ok(true)
    }

    fn save(&self) -> Result<()> {
        let path = self.dir.join(INDEX_FILE);
        let contents =
            toml::to_string_pretty(&self.index).context("Failed to serialize restore index")?;
        fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Flatten an absolute path into one file name
///
/// `%` is escaped before `/`, so distinct paths never share a stored name.
fn stored_name(path: &Path) -> String {
    path.to_string_lossy()
        .trim_start_matches('/')
        .replace('%', "%25")
        .replace('/', "%2F")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_and_restore() {
        let store_dir = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let smb_conf = work.path().join("smb.conf");
        fs::write(&smb_conf, "[global]\nworkgroup = OLD\n").unwrap();

        let mut store = FileStore::open(store_dir.path()).unwrap();
        assert!(!store.has_files());
        assert!(store.backup_file(&smb_conf).unwrap());
        assert!(!store.backup_file(&smb_conf).unwrap());
        assert!(store.has_file(&smb_conf));

        fs::write(&smb_conf, "[global]\nworkgroup = NEW\n").unwrap();
        assert!(store.restore_file(&smb_conf).unwrap());
        assert_eq!(
            fs::read_to_string(&smb_conf).unwrap(),
            "[global]\nworkgroup = OLD\n"
        );
        assert!(!store.has_files());
    }

    #[test]
    fn test_index_survives_reopen() {
        let store_dir = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let krb5_conf = work.path().join("krb5.conf");
        fs::write(&krb5_conf, "[libdefaults]\n").unwrap();

        {
            let mut store = FileStore::open(store_dir.path()).unwrap();
            store.backup_file(&krb5_conf).unwrap();
        }

        let store = FileStore::open(store_dir.path()).unwrap();
        assert!(store.has_file(&krb5_conf));
    }

    #[test]
    fn test_missing_file_is_not_backed_up() {
        let store_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(store_dir.path()).unwrap();
        assert!(!store.backup_file(Path::new("/nonexistent/file.conf")).unwrap());
        assert!(!store.restore_file(Path::new("/nonexistent/file.conf")).unwrap());
    }

    #[test]
    fn test_similar_paths_keep_separate_copies() {
        let store_dir = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        fs::create_dir_all(work.path().join("a")).unwrap();
        fs::create_dir_all(work.path().join("a__b")).unwrap();
        let first = work.path().join("a").join("b__c");
        let second = work.path().join("a__b").join("c");
        fs::write(&first, "first").unwrap();
        fs::write(&second, "second").unwrap();

        let mut store = FileStore::open(store_dir.path()).unwrap();
        assert!(store.backup_file(&first).unwrap());
        assert!(store.backup_file(&second).unwrap());
        assert!(store.has_file(&first));
        assert!(store.has_file(&second));

        fs::write(&first, "CHANGED").unwrap();
        fs::write(&second, "CHANGED").unwrap();
        assert!(store.restore_file(&first).unwrap());
        assert!(store.restore_file(&second).unwrap());
        assert_eq!(fs::read_to_string(&first).unwrap(), "first");
        assert_eq!(fs::read_to_string(&second).unwrap(), "second");
    }

    #[test]
    fn test_stored_names_are_distinct() {
        assert_ne!(
            stored_name(Path::new("/x/a/b__c")),
            stored_name(Path::new("/x/a__b/c"))
        );
        assert_ne!(
            stored_name(Path::new("/x/a%2Fb")),
            stored_name(Path::new("/x/a/b"))
        );
    }

    #[test]
    fn test_stray_copy_is_not_overwritten() {
        let store_dir = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let smb_conf = work.path().join("smb.conf");
        fs::write(&smb_conf, "[global]\n").unwrap();

        let stray = store_dir.path().join(stored_name(&smb_conf));
        fs::write(&stray, "older copy").unwrap();

        let mut store = FileStore::open(store_dir.path()).unwrap();
        assert!(store.backup_file(&smb_conf).is_err());
        assert_eq!(fs::read_to_string(&stray).unwrap(), "older copy");
        assert!(!store.has_file(&smb_conf));
    }
}
