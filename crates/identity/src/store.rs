use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::Identity;

/// Errors from mutating the local identity store.
///
/// Only the write path surfaces errors. Reads degrade silently: a corrupt
/// record must never block resolution against the real provider.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store file could not be written or removed.
    #[error("failed to update identity store: {0}")]
    Io(#[from] io::Error),

    /// The identity record could not be serialized.
    #[error("failed to serialize identity record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File-backed store holding at most one synthesized identity record,
/// persisted as JSON under a fixed path.
#[derive(Debug, Clone)]
pub struct IdentityStore {
    path: PathBuf,
}

impl IdentityStore {
    /// Create a store over the given file path. The file is only created
    /// once an identity is written.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored identity.
    ///
    /// A missing, unreadable, or unparseable record is treated as absent.
    pub fn read(&self) -> Option<Identity> {
        let content = fs::read_to_string(&self.path).ok()?;

        match serde_json::from_str::<Identity>(&content) {
            Ok(identity) if identity.user_id.is_empty() => {
                log::debug!("discarding stored identity record with an empty user id");
                None
            }
            Ok(identity) => Some(identity),
            Err(e) => {
                log::debug!("discarding unparseable identity record: {e}");
                None
            }
        }
    }

    /// Write the identity record, replacing any previous one.
    pub fn write(&self, identity: &Identity) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, serde_json::to_vec_pretty(identity)?)?;

        Ok(())
    }

    /// Remove the stored identity. Clearing an absent record is not an error.
    pub fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::IdentityStore;
    use crate::{Claim, Identity};

    fn identity() -> Identity {
        Identity {
            user_id: "user-42".to_string(),
            display_name: "Ada Lovelace".to_string(),
            provider: "github".to_string(),
            claims: vec![Claim::new("name", "Ada Lovelace")],
        }
    }

    #[test]
    fn absent_record_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = IdentityStore::new(dir.path().join("identity.json"));

        assert_eq!(store.read(), None);
    }

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = IdentityStore::new(dir.path().join("nested").join("identity.json"));

        store.write(&identity()).unwrap();

        assert_eq!(store.read(), Some(identity()));
    }

    #[test]
    fn corrupt_record_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identity.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert_eq!(IdentityStore::new(&path).read(), None);
    }

    #[test]
    fn record_with_empty_user_id_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identity.json");
        std::fs::write(
            &path,
            r#"{ "userId": "", "displayName": "x", "provider": "github", "claims": [] }"#,
        )
        .unwrap();

        assert_eq!(IdentityStore::new(&path).read(), None);
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = IdentityStore::new(dir.path().join("identity.json"));

        store.write(&identity()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();

        assert_eq!(store.read(), None);
    }
}
