use tracing::debug;

use crate::error::EmsError;
use crate::model::employee::Employee;
use crate::storage::{SESSION_PARTITION, read_partition, write_partition};
use crate::store::StoreHandle;

/// The single currently authenticated account, persisted in its own
/// partition. Created on login, cleared on logout, no expiry. The stored
/// snapshot is refreshed whenever the same account mutates elsewhere.
#[derive(Clone)]
pub struct SessionStore {
    handle: StoreHandle,
}

impl SessionStore {
    pub fn new(handle: StoreHandle) -> Self {
        Self { handle }
    }

    pub fn current(&self) -> Result<Option<Employee>, EmsError> {
        read_partition(self.handle.storage(), SESSION_PARTITION)
    }

    pub fn establish(&self, account: &Employee) -> Result<(), EmsError> {
        let _guard = self.handle.lock_writes();
        self.establish_unlocked(account)
    }

    pub fn clear(&self) -> Result<(), EmsError> {
        let _guard = self.handle.lock_writes();
        debug!("Clearing current session");
        self.handle.storage().remove(SESSION_PARTITION)
    }

    pub(crate) fn establish_unlocked(&self, account: &Employee) -> Result<(), EmsError> {
        write_partition(self.handle.storage(), SESSION_PARTITION, &Some(account))
    }

    /// Refresh the stored snapshot when it belongs to the given account.
    pub(crate) fn sync_account_unlocked(&self, account: &Employee) -> Result<(), EmsError> {
        match self.current()? {
            Some(current) if current.id == account.id => self.establish_unlocked(account),
            _ => Ok(()),
        }
    }
}
