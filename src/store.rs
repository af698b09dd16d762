use std::{fs, io::Write, path::PathBuf, sync::RwLock};

use crate::{model::Embedding, Error, Result};

/// A registered user: identity embedding plus the label supplied at
/// enrollment. In-memory entries are append-only for the life of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct KnownIdentity {
    pub name: String,
    pub embedding: Embedding,
}

// On-disk element. `id` is the entry's list position at save time and is
// re-derived on every rewrite; load ignores it.
#[derive(serde::Serialize, serde::Deserialize)]
struct StoredIdentity {
    id: usize,
    name: String,
    encoding: Vec<f32>,
}

/// Persisted list of registered users, mirrored to a JSON file that is
/// rewritten wholesale on every append.
pub struct IdentityStore {
    path: PathBuf,
    entries: RwLock<Vec<KnownIdentity>>,
}

impl IdentityStore {
    /// Loads the persisted store once at startup. Fails fast when the file is
    /// missing or unreadable; a malformed file is refused outright rather than
    /// partially loaded.
    #[tracing::instrument(name = "Loading identity store", err)]
    pub fn load(path: PathBuf) -> Result<Self> {
        let raw = fs::read_to_string(&path).map_err(Error::StoreLoadError)?;
        let stored: Vec<StoredIdentity> =
            serde_json::from_str(&raw).map_err(Error::StoreCorruptError)?;

        let entries = stored
            .into_iter()
            .map(|user| KnownIdentity {
                name: user.name,
                embedding: Embedding::from(user.encoding),
            })
            .collect();

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Writes an empty store file and returns the store backed by it.
    /// First-run bootstrap; `load` keeps its strict contract.
    pub fn create(path: PathBuf) -> Result<Self> {
        let store = Self {
            path,
            entries: RwLock::new(Vec::new()),
        };
        store.save(&[])?;
        Ok(store)
    }

    pub fn snapshot(&self) -> Result<Vec<KnownIdentity>> {
        Ok(self.entries.read().map_err(Error::as_guard_error)?.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends in memory, then rewrites the whole file. The in-memory entry
    /// is kept even when the rewrite fails; callers observe the failure as a
    /// `PersistenceError` and decide what to do with it.
    pub fn append(&self, identity: KnownIdentity) -> Result<()> {
        let mut entries = self.entries.write().map_err(Error::as_guard_error)?;
        entries.push(identity);
        self.save(&entries)
    }

    fn save(&self, entries: &[KnownIdentity]) -> Result<()> {
        let stored: Vec<StoredIdentity> = entries
            .iter()
            .enumerate()
            .map(|(id, entry)| StoredIdentity {
                id,
                name: entry.name.clone(),
                encoding: entry.embedding.to_vec(),
            })
            .collect();

        let serialized = serde_json::to_string(&stored).map_err(Error::as_persistence_error)?;
        fs::File::create(&self.path)
            .map_err(Error::as_persistence_error)?
            .write_all(serialized.as_bytes())
            .map_err(Error::as_persistence_error)
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[cfg(test)]
mod test {
    use super::{IdentityStore, KnownIdentity};
    use crate::{model::Embedding, Error};

    fn identity(name: &str, values: Vec<f32>) -> KnownIdentity {
        KnownIdentity {
            name: name.to_string(),
            embedding: Embedding::from(values),
        }
    }

    #[test]
    fn round_trips_identities() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("registered_user.json");

        let store = IdentityStore::create(path.clone()).expect("Failed to create store");
        store
            .append(identity("ada", vec![0.1, 0.2, 0.3]))
            .expect("Failed to append");
        store
            .append(identity("grace", vec![0.9, 0.8, 0.7]))
            .expect("Failed to append");

        let reloaded = IdentityStore::load(path).expect("Failed to reload store");
        assert_eq!(
            reloaded.snapshot().expect("Failed to snapshot"),
            store.snapshot().expect("Failed to snapshot"),
        );
    }

    #[test]
    fn missing_file_fails_fast() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let result = IdentityStore::load(dir.path().join("absent.json"));
        assert!(matches!(result, Err(Error::StoreLoadError(_))));
    }

    #[test]
    fn malformed_file_is_refused() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("registered_user.json");
        std::fs::write(&path, "{not json").expect("Failed to write file");
        assert!(matches!(
            IdentityStore::load(path),
            Err(Error::StoreCorruptError(_))
        ));
    }

    #[test]
    fn ids_are_list_positions() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("registered_user.json");

        let store = IdentityStore::create(path.clone()).expect("Failed to create store");
        store
            .append(identity("ada", vec![0.1]))
            .expect("Failed to append");
        store
            .append(identity("grace", vec![0.2]))
            .expect("Failed to append");

        let raw = std::fs::read_to_string(&path).expect("Failed to read file");
        let users: Vec<serde_json::Value> =
            serde_json::from_str(&raw).expect("Failed to parse file");
        let ids: Vec<u64> = users.iter().filter_map(|u| u["id"].as_u64()).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn failed_write_keeps_the_memory_entry() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        // the path is a directory, so every save fails
        let store = IdentityStore {
            path: dir.path().to_path_buf(),
            entries: std::sync::RwLock::new(Vec::new()),
        };

        let result = store.append(identity("ada", vec![0.1]));
        assert!(matches!(result, Err(Error::PersistenceError(_))));
        assert_eq!(store.len(), 1);
    }
}
