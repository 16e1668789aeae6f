//! staffdesk: employee administration backend simulated over a local key-value store
//!
//! Two independent stores share one persisted namespace (Sled):
//! - Session store: registered administrators and the current session.
//! - Roster store: the employee collection, mirrored to storage on every change.
//!
//! Every mutating operation awaits an injectable latency before touching
//! memory and storage, then reports a boolean outcome and a notice.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod roster;
pub mod runtime;
pub mod stats;
pub mod storage;
pub mod telemetry;
pub mod validation;

use std::sync::Arc;

use auth::SessionStore;
use error::StorageError;
use notify::{Notifier, TracingNotifier};
use roster::RosterStore;
use runtime::{FixedDelay, IdMint, Latency};
use storage::Storage;

/// Delay applied by default to every simulated backend call.
pub const DEFAULT_LATENCY_MS: u64 = 1000;

/// Collaborators shared by both stores.
#[derive(Clone)]
pub struct Backend {
    pub storage: Storage,
    pub latency: Arc<dyn Latency>,
    pub ids: Arc<IdMint>,
    pub notifier: Arc<dyn Notifier>,
}

impl Backend {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            latency: Arc::new(FixedDelay::from_millis(DEFAULT_LATENCY_MS)),
            ids: Arc::new(IdMint::system()),
            notifier: Arc::new(TracingNotifier),
        }
    }

    pub fn with_latency(mut self, latency: Arc<dyn Latency>) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_ids(mut self, ids: Arc<IdMint>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

/// Both stores, built once at startup and handed to whatever drives them.
pub struct App {
    pub session: SessionStore,
    pub roster: RosterStore,
}

impl App {
    /// Restore the persisted session and load (or bootstrap) the roster.
    pub fn start(backend: Backend) -> Result<Self, StorageError> {
        let session = SessionStore::restore(backend.clone())?;
        let roster = RosterStore::initialize(backend)?;
        Ok(Self { session, roster })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use crate::error::StorageError;
    use crate::notify::RecordingNotifier;
    use crate::runtime::Immediate;
    use crate::storage::{KeyValue, SledNamespace, Storage};
    use crate::Backend;

    /// Temporary storage, no latency, recorded notices.
    pub fn backend() -> (Backend, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let backend = Backend::new(Storage::temporary().expect("temporary storage"))
            .with_latency(Arc::new(Immediate))
            .with_notifier(notifier.clone());
        (backend, notifier)
    }

    /// Temporary Sled namespace whose writes can be switched off.
    pub struct FlakyWrites {
        inner: SledNamespace,
        failing: AtomicBool,
    }

    impl FlakyWrites {
        pub fn new() -> Self {
            let db = sled::Config::new()
                .temporary(true)
                .open()
                .expect("temporary sled");
            Self {
                inner: SledNamespace::new(db).expect("namespace"),
                failing: AtomicBool::new(false),
            }
        }

        pub fn fail_writes(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        fn check(&self, key: &str) -> Result<(), StorageError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable(format!("write to `{key}` rejected")));
            }
            Ok(())
        }
    }

    impl KeyValue for FlakyWrites {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            self.inner.get(key)
        }

        fn insert(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
            self.check(key)?;
            self.inner.insert(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.check(key)?;
            self.inner.remove(key)
        }

        fn flush(&self) -> Result<(), StorageError> {
            self.inner.flush()
        }
    }

    /// Like [`backend`], but writes fail while the returned switch is on.
    pub fn flaky_backend() -> (Backend, Arc<FlakyWrites>, Arc<RecordingNotifier>) {
        let flaky = Arc::new(FlakyWrites::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let backend = Backend::new(Storage::with_backend(flaky.clone()))
            .with_latency(Arc::new(Immediate))
            .with_notifier(notifier.clone());
        (backend, flaky, notifier)
    }
}
