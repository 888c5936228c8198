//! Directory-backed store.
//!
//! Layout under the root:
//!
//! ```text
//! sets/<id>.json   one EntrySet per file
//! secret.json      salted admin secret digest
//! state/<key>.json persisted wheel state (see FileBackend)
//! ```
//!
//! Every write goes to a temporary sibling first and is renamed into place,
//! so a crash leaves either the old or the new file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use spin::Mutex;
use spinwheel_abi::{EntrySet, EntrySetId, NewEntrySet, RawRecord, StoreResult};
use spinwheel_core::PersistBackend;
use spinwheel_lib::{Clock, SystemClock, WheelRng, klog_debug, klog_warn};

use crate::secret::SecretDigest;
use crate::store::{SetTable, SpinFileStore};

const SETS_DIR: &str = "sets";
const STATE_DIR: &str = "state";
const SECRET_FILE: &str = "secret.json";

/// Write `contents` to `path` through a temporary file and a rename.
pub fn write_atomic(path: &Path, contents: &[u8]) -> StoreResult<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Read a file, mapping "not found" to `None`.
pub fn read_optional(path: &Path) -> StoreResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn remove_optional(path: &Path) -> StoreResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

pub struct DirStore {
    root: PathBuf,
    inner: Mutex<SetTable>,
    clock: Arc<dyn Clock>,
}

impl DirStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        Self::open_with(root, Arc::new(SystemClock::new()), WheelRng::from_entropy())
    }

    pub fn open_with(root: impl Into<PathBuf>, clock: Arc<dyn Clock>, rng: WheelRng) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(SETS_DIR))?;

        let mut sets = Vec::new();
        for dirent in fs::read_dir(root.join(SETS_DIR))? {
            let path = dirent?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let text = fs::read_to_string(&path)?;
            match serde_json::from_str::<EntrySet>(&text) {
                Ok(set) => sets.push(set),
                Err(err) => klog_warn!("dirstore: skipping {}: {}", path.display(), err),
            }
        }

        let secret = match read_optional(&root.join(SECRET_FILE))? {
            Some(text) => Some(serde_json::from_str::<SecretDigest>(&text)?),
            None => None,
        };
        let fresh_secret = secret.is_none();
        klog_debug!("dirstore: opened {} with {} sets", root.display(), sets.len());

        let store = Self {
            inner: Mutex::new(SetTable::from_parts(sets, secret, rng)),
            root,
            clock,
        };
        if fresh_secret {
            let table = store.inner.lock();
            store.write_secret(table.secret())?;
        }
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persistence backend for wheel state that lives next to the sets.
    pub fn state_backend(&self) -> StoreResult<FileBackend> {
        FileBackend::open(self.root.join(STATE_DIR))
    }

    fn set_path(&self, id: EntrySetId) -> PathBuf {
        self.root.join(SETS_DIR).join(format!("{}.json", id))
    }

    fn write_set(&self, set: &EntrySet) -> StoreResult<()> {
        let text = serde_json::to_vec_pretty(set)?;
        write_atomic(&self.set_path(set.id), &text)
    }

    fn write_secret(&self, secret: &SecretDigest) -> StoreResult<()> {
        let text = serde_json::to_vec(secret)?;
        write_atomic(&self.root.join(SECRET_FILE), &text)
    }
}

impl SpinFileStore for DirStore {
    fn name(&self) -> &'static str {
        "dir"
    }

    fn list(&self, active_only: bool) -> StoreResult<Vec<EntrySet>> {
        Ok(self.inner.lock().list(active_only))
    }

    fn get(&self, id: EntrySetId) -> StoreResult<EntrySet> {
        self.inner.lock().get(id).cloned()
    }

    fn create(&self, upload: NewEntrySet) -> StoreResult<EntrySet> {
        let now = self.clock.now_utc();
        let mut table = self.inner.lock();
        let set = table.create(upload, now)?;
        if let Err(err) = self.write_set(&set) {
            table.delete(set.id)?;
            return Err(err);
        }
        Ok(set)
    }

    fn delete(&self, id: EntrySetId) -> StoreResult<()> {
        let mut table = self.inner.lock();
        table.get(id)?;
        remove_optional(&self.set_path(id))?;
        table.delete(id).map(|_| ())
    }

    fn toggle_active(&self, id: EntrySetId) -> StoreResult<bool> {
        let mut table = self.inner.lock();
        let active = table.toggle_active(id)?;
        let written = match table.get(id) {
            Ok(set) => self.write_set(set),
            Err(err) => Err(err),
        };
        if let Err(err) = written {
            table.toggle_active(id)?;
            return Err(err);
        }
        Ok(active)
    }

    fn set_pinned_ticket(&self, id: EntrySetId, ticket: Option<&str>) -> StoreResult<()> {
        let mut table = self.inner.lock();
        let previous = table.get(id)?.pinned_ticket.clone();
        let set = table.set_pinned_ticket(id, ticket)?;
        if let Err(err) = self.write_set(set) {
            table.set_pinned_ticket(id, previous.as_deref())?;
            return Err(err);
        }
        Ok(())
    }

    fn draw(&self, id: EntrySetId, rng: &mut WheelRng) -> StoreResult<(usize, RawRecord)> {
        self.inner.lock().draw(id, rng)
    }

    fn check_secret(&self, secret: &str) -> StoreResult<bool> {
        self.inner.lock().check_secret(secret)
    }

    fn update_secret(&self, old: &str, new: &str) -> StoreResult<()> {
        let mut table = self.inner.lock();
        let previous = table.secret().clone();
        let digest = table.update_secret(old, new)?.clone();
        if let Err(err) = self.write_secret(&digest) {
            klog_warn!("dirstore: password change not saved: {}", err);
            table.restore_secret(previous);
            return Err(err);
        }
        Ok(())
    }
}

/// [`PersistBackend`] keeping one file per key.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

impl PersistBackend for FileBackend {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        read_optional(&self.key_path(key))
    }

    fn write(&mut self, key: &str, value: &str) -> StoreResult<()> {
        write_atomic(&self.key_path(key), value.as_bytes())
    }

    fn delete(&mut self, key: &str) -> StoreResult<()> {
        remove_optional(&self.key_path(key))
    }
}
