//! Durable session state: the operator profile and the basic-auth pair, each
//! in its own JSON file.

use std::{fs, io::ErrorKind, path::Path};

use crate::{
    domain::session::{Credentials, Session},
    infra::{error::AppError, storage_layout::StorageLayout},
};

#[derive(Debug, Clone)]
pub struct SessionStore {
    layout: StorageLayout,
}

/// Both files restored together, or nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSession {
    pub session: Session,
    pub credentials: Credentials,
}

impl SessionStore {
    pub fn open() -> Result<Self, AppError> {
        let layout = StorageLayout::resolve()?;
        layout.ensure_dirs()?;
        Ok(Self { layout })
    }

    pub fn with_layout(layout: StorageLayout) -> Self {
        Self { layout }
    }

    /// Loads the persisted session, if both files exist and parse. A partial
    /// or corrupt pair is cleared and reported as absent: a profile without
    /// credentials cannot be revalidated.
    pub fn load(&self) -> Result<Option<PersistedSession>, AppError> {
        let session = self.read_json::<Session>(&self.layout.profile_file())?;
        let credentials = self.read_json::<Credentials>(&self.layout.credentials_file())?;

        match (session, credentials) {
            (Some(session), Some(credentials)) => Ok(Some(PersistedSession {
                session,
                credentials,
            })),
            (None, None) => Ok(None),
            _ => {
                tracing::warn!("incomplete persisted session state, clearing");
                self.clear()?;
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: &Session, credentials: &Credentials) -> Result<(), AppError> {
        self.write_json(&self.layout.profile_file(), session)?;
        self.write_json(&self.layout.credentials_file(), credentials)
    }

    /// Removes both files; missing files are fine.
    pub fn clear(&self) -> Result<(), AppError> {
        for path in [self.layout.profile_file(), self.layout.credentials_file()] {
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(source) if source.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(AppError::SessionWrite { path, source }),
            }
        }

        Ok(())
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, path: &Path) -> Result<Option<T>, AppError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(AppError::SessionRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(source) => {
                tracing::warn!(path = %path.display(), error = %source, "discarding unparseable session state");
                Ok(None)
            }
        }
    }

    fn write_json<T: serde::Serialize>(&self, path: &Path, value: &T) -> Result<(), AppError> {
        let raw = serde_json::to_string_pretty(value).map_err(AppError::SessionEncode)?;
        fs::write(path, raw).map_err(|source| AppError::SessionWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::Role;

    fn store_in(dir: &Path) -> SessionStore {
        let layout = StorageLayout {
            config_dir: dir.to_path_buf(),
            state_dir: dir.join("state"),
        };
        layout.ensure_dirs().expect("dirs should be created");
        SessionStore::with_layout(layout)
    }

    fn sample() -> PersistedSession {
        PersistedSession {
            session: Session::for_login("admin", "1700000000000".to_owned()),
            credentials: Credentials {
                username: "admin".to_owned(),
                password: "s3cret".to_owned(),
            },
        }
    }

    #[test]
    fn load_returns_none_when_nothing_is_persisted() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(dir.path());

        assert_eq!(store.load().expect("load should succeed"), None);
    }

    #[test]
    fn save_then_load_round_trips_username_and_role() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(dir.path());
        let persisted = sample();

        store
            .save(&persisted.session, &persisted.credentials)
            .expect("save should succeed");

        let restored = store
            .load()
            .expect("load should succeed")
            .expect("session should be present");
        assert_eq!(restored.session.username, "admin");
        assert_eq!(restored.session.role, Role::Admin);
        assert_eq!(restored.credentials, persisted.credentials);
    }

    #[test]
    fn clear_removes_both_files_and_is_idempotent() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(dir.path());
        let persisted = sample();
        store
            .save(&persisted.session, &persisted.credentials)
            .expect("save should succeed");

        store.clear().expect("clear should succeed");
        store.clear().expect("second clear should succeed");

        assert_eq!(store.load().expect("load should succeed"), None);
    }

    #[test]
    fn profile_without_credentials_is_cleared_on_load() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(dir.path());
        let persisted = sample();
        store
            .save(&persisted.session, &persisted.credentials)
            .expect("save should succeed");
        fs::remove_file(store.layout.credentials_file()).expect("credentials file removed");

        assert_eq!(store.load().expect("load should succeed"), None);
        assert!(!store.layout.profile_file().exists());
    }

    #[test]
    fn corrupt_profile_json_is_treated_as_absent() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(dir.path());
        fs::write(store.layout.profile_file(), "{not json").expect("corrupt profile written");

        assert_eq!(store.load().expect("load should succeed"), None);
    }
}
