pub mod attendance;
pub mod identity;
pub mod login_id;
pub mod session;
pub mod timeoff;

use std::sync::{Arc, Mutex, MutexGuard};

use crate::storage::Storage;
use attendance::AttendanceLedger;
use identity::IdentityStore;
use session::SessionStore;
use timeoff::TimeOffRegister;

/// Shared handle behind every store: the storage adapter plus the
/// process-wide lock that serializes read-modify-write cycles. The partitions
/// have no transaction isolation of their own, so all mutations must funnel
/// through a single owner.
#[derive(Clone)]
pub struct StoreHandle {
    storage: Arc<dyn Storage>,
    write_lock: Arc<Mutex<()>>,
}

impl StoreHandle {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    /// Must not be held across an `.await`, and `*_unlocked` helpers are the
    /// only store calls allowed underneath it.
    pub fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().expect("store write lock poisoned")
    }
}

/// The four stores over one storage adapter; this is the application state
/// handed to every handler.
#[derive(Clone)]
pub struct Stores {
    pub identity: IdentityStore,
    pub sessions: SessionStore,
    pub attendance: AttendanceLedger,
    pub timeoff: TimeOffRegister,
}

impl Stores {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        let handle = StoreHandle::new(storage);
        let sessions = SessionStore::new(handle.clone());
        let identity = IdentityStore::new(handle.clone(), sessions.clone());
        let attendance = AttendanceLedger::new(handle.clone(), identity.clone());
        let timeoff = TimeOffRegister::new(handle, identity.clone());
        Self {
            identity,
            sessions,
            attendance,
            timeoff,
        }
    }
}
