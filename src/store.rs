use serde::Serialize;
use serde::de::DeserializeOwned;

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::io::Write as _;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

pub(crate) const SESSION_KEY: &str = "civic_session_v1";
pub(crate) const ISSUES_KEY: &str = "civic_issues_v1";

/// Whole-document JSON store over a data directory. Each key maps to one
/// `<key>.json` file; every read fetches the full document and every write
/// replaces it.
#[derive(Clone)]
pub(crate) struct Store {
    dir: PathBuf,
    guard: Arc<Mutex<()>>,
}

impl Store {
    pub(crate) fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            guard: Arc::new(Mutex::new(())),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Loads the document under `key`. A missing or malformed document is
    /// replaced on disk by `default` and returned as-is; corruption is never
    /// surfaced to the caller.
    pub(crate) fn load<T, D>(&self, key: &str, default: D) -> T
    where
        T: Serialize + DeserializeOwned,
        D: FnOnce() -> T,
    {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(value) => return value,
                Err(err) => eprintln!("discarding malformed document {key}: {err}"),
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => eprintln!("failed to read document {key}: {err}"),
        }

        let value = default();
        if let Err(err) = self.save(key, &value) {
            eprintln!("failed to persist default document {key}: {err}");
        }
        value
    }

    pub(crate) fn save<T: Serialize>(&self, key: &str, value: &T) -> std::io::Result<()> {
        let contents = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
        std::fs::create_dir_all(&self.dir)?;
        atomic_write(&self.path_for(key), &contents)
    }

    pub(crate) fn remove(&self, key: &str) -> std::io::Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    /// Read-modify-write against the freshest document. The store lock spans
    /// the whole sequence so no mutation ever starts from a stale snapshot.
    pub(crate) fn update<T, D, F>(&self, key: &str, default: D, f: F) -> std::io::Result<T>
    where
        T: Serialize + DeserializeOwned,
        D: FnOnce() -> T,
        F: FnOnce(T) -> T,
    {
        let _guard = self.guard.lock().expect("store lock");
        let value = f(self.load(key, default));
        self.save(key, &value)?;
        Ok(value)
    }
}

fn atomic_write(path: &Path, contents: &str) -> std::io::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("missing parent directory"))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document.json");
    let pid = std::process::id();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();

    for attempt in 0..10u32 {
        let temp_name = format!(".{}.tmp-{}-{}-{}", file_name, pid, nanos, attempt);
        let temp_path = parent.join(temp_name);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_path)
        {
            Ok(mut file) => {
                file.write_all(contents.as_bytes())?;
                file.flush()?;
                std::fs::rename(&temp_path, path)?;
                return Ok(());
            }
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::other("failed to create temporary file"))
}

#[cfg(test)]
#[allow(non_snake_case)]
pub(crate) mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Doc {
        value: u32,
    }

    #[test]
    fn load__should_persist_default_when_document_missing() {
        // Given
        let dir = create_temp_dir("load-missing");
        let store = Store::new(dir.clone());

        // When
        let doc: Doc = store.load("doc", || Doc { value: 7 });

        // Then
        assert_eq!(doc, Doc { value: 7 });
        let raw = std::fs::read_to_string(dir.join("doc.json")).expect("read doc.json");
        let persisted: Doc = serde_json::from_str(&raw).expect("parse doc.json");
        assert_eq!(persisted, doc);

        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn load__should_replace_malformed_document_with_default() {
        // Given
        let dir = create_temp_dir("load-corrupt");
        std::fs::write(dir.join("doc.json"), "{not json").expect("write doc.json");
        let store = Store::new(dir.clone());

        // When
        let doc: Doc = store.load("doc", || Doc { value: 1 });

        // Then
        assert_eq!(doc, Doc { value: 1 });
        let raw = std::fs::read_to_string(dir.join("doc.json")).expect("read doc.json");
        let persisted: Doc = serde_json::from_str(&raw).expect("parse doc.json");
        assert_eq!(persisted, doc);

        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn save__should_round_trip_through_load() {
        // Given
        let dir = create_temp_dir("round-trip");
        let store = Store::new(dir.clone());

        // When
        store.save("doc", &Doc { value: 42 }).expect("save doc");
        let doc: Doc = store.load("doc", || Doc { value: 0 });

        // Then
        assert_eq!(doc, Doc { value: 42 });

        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn remove__should_succeed_when_document_missing() {
        // Given
        let dir = create_temp_dir("remove-missing");
        let store = Store::new(dir.clone());

        // Then
        store.remove("doc").expect("remove missing doc");

        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn update__should_apply_transform_to_latest_document() {
        // Given
        let dir = create_temp_dir("update-fresh");
        let store = Store::new(dir.clone());
        store.save("doc", &Doc { value: 10 }).expect("save doc");

        // When
        let updated = store
            .update("doc", || Doc { value: 0 }, |doc: Doc| Doc {
                value: doc.value + 1,
            })
            .expect("update doc");

        // Then
        assert_eq!(updated, Doc { value: 11 });
        let doc: Doc = store.load("doc", || Doc { value: 0 });
        assert_eq!(doc, Doc { value: 11 });

        std::fs::remove_dir_all(&dir).expect("cleanup");
    }

    pub(crate) fn create_temp_dir(test_name: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        dir.push(format!("civicdesk-{}-{}", test_name, nanos));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }
}
