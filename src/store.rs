//! Persistence of record collections as a single JSON document.
//!
//! A [DocumentStore] holds one opaque document and hands out a
//! [VersionToken] with every read. Writes must present the token they were
//! based on, and fail with [StoreError::Conflict] if the document changed in
//! between. This is optimistic and best-effort: of two editors racing on the
//! same document, only one wins and the other gets a conflict to retry.

use crate::records::{self, Convenio, RecordError, Rotina};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::Write;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("stored records are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("the document was changed by someone else since it was read")]
    Conflict {
        expected: Option<VersionToken>,
        found: Option<VersionToken>,
    },

    #[error("no record {0}")]
    NotFound(String),

    #[error("record rejected: {0}")]
    Invalid(#[from] RecordError),
}

/// Identifies one version of a stored document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionToken(pub String);

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A value together with the version it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub token: VersionToken,
}

/// Storage for a single document guarded by version tokens
pub trait DocumentStore {
    /// The current document, or [None] if nothing has been stored yet
    fn fetch(&self) -> Result<Option<Versioned<Vec<u8>>>, StoreError>;

    /// Replace the document. `expected` is the token of the version the new
    /// content was derived from, or [None] when creating the document.
    fn put(&self, bytes: &[u8], expected: Option<&VersionToken>) -> Result<VersionToken, StoreError>;
}

fn check_version(expected: Option<&VersionToken>, found: Option<&VersionToken>) -> Result<(), StoreError> {
    if expected == found {
        Ok(())
    } else {
        Err(StoreError::Conflict {
            expected: expected.cloned(),
            found: found.cloned(),
        })
    }
}

/// In-process store, mostly for tests. Tokens count up from 1 with every write.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<Option<(Vec<u8>, u64)>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// A store that already holds `bytes`
    pub fn with_document(bytes: Vec<u8>) -> MemoryStore {
        MemoryStore {
            state: Mutex::new(Some((bytes, 1))),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<(Vec<u8>, u64)>> {
        // the state is only ever replaced whole
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn counter_token(version: u64) -> VersionToken {
    VersionToken(version.to_string())
}

impl DocumentStore for MemoryStore {
    fn fetch(&self) -> Result<Option<Versioned<Vec<u8>>>, StoreError> {
        Ok(self.lock().as_ref().map(|(bytes, version)| Versioned {
            value: bytes.clone(),
            token: counter_token(*version),
        }))
    }

    fn put(&self, bytes: &[u8], expected: Option<&VersionToken>) -> Result<VersionToken, StoreError> {
        let mut state = self.lock();
        let current = state.as_ref().map(|(_, version)| counter_token(*version));
        check_version(expected, current.as_ref())?;

        let next = state.as_ref().map_or(1, |(_, version)| version + 1);
        *state = Some((bytes.to_vec(), next));
        Ok(counter_token(next))
    }
}

/// A JSON file on the local disk. The version token is the SHA-256 of the
/// file's content, so edits made by other programs are detected too.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

fn content_token(bytes: &[u8]) -> VersionToken {
    let digest = Sha256::digest(bytes);
    let mut hex = String::with_capacity(digest.len() * 2);
    for b in digest {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{:02x}", b);
    }
    VersionToken(hex)
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> FileStore {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Option<Vec<u8>>, StoreError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl DocumentStore for FileStore {
    fn fetch(&self) -> Result<Option<Versioned<Vec<u8>>>, StoreError> {
        Ok(self.read()?.map(|bytes| Versioned {
            token: content_token(&bytes),
            value: bytes,
        }))
    }

    fn put(&self, bytes: &[u8], expected: Option<&VersionToken>) -> Result<VersionToken, StoreError> {
        let current = self.read()?.map(|bytes| content_token(&bytes));
        check_version(expected, current.as_ref())?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        // write next to the target, then swap it in
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);
        {
            let mut file = std::fs::File::create(&staging)?;
            file.write_all(bytes)?;
            file.sync_all()?;
        }
        std::fs::rename(&staging, &self.path)?;

        Ok(content_token(bytes))
    }
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn fetch(&self) -> Result<Option<Versioned<Vec<u8>>>, StoreError> {
        (**self).fetch()
    }

    fn put(&self, bytes: &[u8], expected: Option<&VersionToken>) -> Result<VersionToken, StoreError> {
        (**self).put(bytes, expected)
    }
}

/// Records as loaded from a store, with the token needed to save them back
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub token: Option<VersionToken>,
}

/// A typed view of a [DocumentStore] holding a JSON array of `T`
pub struct RecordStore<S, T> {
    store: S,
    _records: PhantomData<fn() -> T>,
}

impl<S: DocumentStore, T: Serialize + DeserializeOwned> RecordStore<S, T> {
    pub fn new(store: S) -> RecordStore<S, T> {
        RecordStore {
            store,
            _records: PhantomData,
        }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Read every record. A missing or blank document is an empty collection.
    pub fn load(&self) -> Result<Loaded<T>, StoreError> {
        let Some(Versioned { value, token }) = self.store.fetch()? else {
            return Ok(Loaded {
                records: Vec::new(),
                token: None,
            });
        };

        let records: Vec<T> = if value.iter().all(u8::is_ascii_whitespace) {
            Vec::new()
        } else {
            serde_json::from_slice(&value)?
        };
        tracing::debug!(count = records.len(), %token, "loaded records");
        Ok(Loaded {
            records,
            token: Some(token),
        })
    }

    /// Write `records` back, provided nobody else wrote since `token` was read
    pub fn save(&self, records: &[T], token: Option<&VersionToken>) -> Result<VersionToken, StoreError> {
        let mut bytes = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
        records.serialize(&mut serializer)?;

        match self.store.put(&bytes, token) {
            Ok(new_token) => {
                tracing::info!(count = records.len(), token = %new_token, "saved records");
                Ok(new_token)
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not save records");
                Err(e)
            }
        }
    }

    /// Load, modify and save in one go. Fails with [StoreError::Conflict]
    /// if another writer got in between the load and the save.
    pub fn update<R, F>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, StoreError>,
    {
        let Loaded { mut records, token } = self.load()?;
        let result = f(&mut records)?;
        self.save(&records, token.as_ref())?;
        Ok(result)
    }
}

impl<S: DocumentStore> RecordStore<S, Convenio> {
    /// Create a convênio, or replace the one with the same name. Returns
    /// `true` if an existing record was replaced.
    ///
    /// `convenio` is only borrowed, so after a [StoreError::Conflict] the
    /// same record can be submitted again.
    pub fn save_convenio(&self, convenio: &Convenio) -> Result<bool, StoreError> {
        convenio.validate()?;
        let replaced = self.update(|list| Ok(records::upsert(list, convenio.clone())))?;
        tracing::info!(convenio = convenio.nome(), replaced, "saved convênio");
        Ok(replaced)
    }
}

impl<S: DocumentStore> RecordStore<S, Rotina> {
    /// Create or replace a rotina, returning its id. A rotina with id 0 is
    /// new and gets the next free id; any other id replaces that rotina or
    /// is added under it.
    pub fn save_rotina(&self, rotina: &Rotina) -> Result<u64, StoreError> {
        rotina.validate()?;
        let id = self.update(|list| {
            let mut record = rotina.clone();
            if record.id == 0 {
                record.id = records::next_rotina_id(list);
            }
            let id = record.id;
            records::upsert(list, record);
            Ok(id)
        })?;
        tracing::info!(rotina = id, nome = rotina.nome(), "saved rotina");
        Ok(id)
    }
}
