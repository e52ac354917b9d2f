use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::error::EmsError;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::{AttendanceStatus, Employee};
use crate::storage::{ATTENDANCE_PARTITION, read_partition, write_partition};
use crate::store::StoreHandle;
use crate::store::identity::IdentityStore;

/// Per-account check-in/out records, keyed by account id. The day rollover
/// is lazy: a record dated before `now` simply stops counting as "checked in
/// today"; nothing rewrites it until the next check-in.
#[derive(Clone)]
pub struct AttendanceLedger {
    handle: StoreHandle,
    identity: IdentityStore,
}

impl AttendanceLedger {
    pub fn new(handle: StoreHandle, identity: IdentityStore) -> Self {
        Self { handle, identity }
    }

    fn load(&self) -> Result<HashMap<String, AttendanceRecord>, EmsError> {
        read_partition(self.handle.storage(), ATTENDANCE_PARTITION)
    }

    fn persist(&self, book: &HashMap<String, AttendanceRecord>) -> Result<(), EmsError> {
        write_partition(self.handle.storage(), ATTENDANCE_PARTITION, book)
    }

    /// Write a fresh record for today and flip the account (and a matching
    /// session snapshot) to `present`.
    pub fn check_in(
        &self,
        account_id: &str,
        now: DateTime<Utc>,
    ) -> Result<AttendanceRecord, EmsError> {
        let _guard = self.handle.lock_writes();

        let mut book = self.load()?;
        let record = AttendanceRecord {
            date: now.date_naive(),
            checked_in: true,
            checked_out: false,
            check_in_time: Some(now),
            check_out_time: None,
        };
        book.insert(account_id.to_owned(), record.clone());
        self.persist(&book)?;

        self.identity
            .set_attendance_status_unlocked(account_id, AttendanceStatus::Present)?;

        info!(account_id, "Checked in");
        Ok(record)
    }

    /// Mark the existing record checked out. Returns `None` when there is no
    /// record at all. The attendance status intentionally stays `present`
    /// for the rest of the day.
    pub fn check_out(
        &self,
        account_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AttendanceRecord>, EmsError> {
        let _guard = self.handle.lock_writes();

        let mut book = self.load()?;
        let Some(record) = book.get_mut(account_id) else {
            return Ok(None);
        };
        record.checked_out = true;
        record.check_out_time = Some(now);
        let record = record.clone();
        self.persist(&book)?;

        info!(account_id, "Checked out");
        Ok(Some(record))
    }

    /// Checked in today and not yet checked out. A record from a prior day
    /// never counts.
    pub fn is_checked_in(&self, account_id: &str, today: NaiveDate) -> Result<bool, EmsError> {
        Ok(self
            .load()?
            .get(account_id)
            .map(|record| record.is_active_on(today))
            .unwrap_or(false))
    }

    pub fn check_in_time(&self, account_id: &str) -> Result<Option<DateTime<Utc>>, EmsError> {
        Ok(self.load()?.get(account_id).and_then(|r| r.check_in_time))
    }

    /// The records of a given day joined with their accounts, for the
    /// attendance table.
    pub fn day_overview(
        &self,
        day: NaiveDate,
    ) -> Result<Vec<(Employee, AttendanceRecord)>, EmsError> {
        let book = self.load()?;
        let accounts = self.identity.list_accounts()?;
        Ok(accounts
            .into_iter()
            .filter_map(|account| {
                book.get(&account.id)
                    .filter(|record| record.date == day)
                    .cloned()
                    .map(|record| (account, record))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::store::Stores;
    use crate::store::identity::NewAccount;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn stores() -> Stores {
        Stores::new(Arc::new(MemoryStorage::default()))
    }

    fn morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 3, 9, 0, 0).unwrap()
    }

    async fn employee(stores: &Stores, email: &str) -> Employee {
        stores
            .identity
            .create_account(
                NewAccount {
                    first_name: "Test".to_string(),
                    last_name: "Person".to_string(),
                    email: email.to_string(),
                    password: "pw123".to_string(),
                    ..NewAccount::default()
                },
                morning(),
            )
            .await
            .unwrap()
    }

    #[actix_web::test]
    async fn check_in_marks_today_and_flips_status() {
        let stores = stores();
        let emp = employee(&stores, "ledger.one@ems.test").await;

        assert!(!stores
            .attendance
            .is_checked_in(&emp.id, morning().date_naive())
            .unwrap());

        stores.attendance.check_in(&emp.id, morning()).unwrap();
        assert!(stores
            .attendance
            .is_checked_in(&emp.id, morning().date_naive())
            .unwrap());
        assert_eq!(
            stores.attendance.check_in_time(&emp.id).unwrap(),
            Some(morning())
        );

        let stored = stores.identity.find_by_id(&emp.id).unwrap().unwrap();
        assert_eq!(stored.attendance_status, AttendanceStatus::Present);
    }

    #[actix_web::test]
    async fn check_out_ends_the_active_state_but_keeps_status() {
        let stores = stores();
        let emp = employee(&stores, "ledger.two@ems.test").await;

        stores.attendance.check_in(&emp.id, morning()).unwrap();
        let evening = morning() + chrono::Duration::hours(8);
        let record = stores
            .attendance
            .check_out(&emp.id, evening)
            .unwrap()
            .unwrap();
        assert!(record.checked_out);
        assert_eq!(record.check_out_time, Some(evening));

        assert!(!stores
            .attendance
            .is_checked_in(&emp.id, morning().date_naive())
            .unwrap());
        // Status stays present until the day rolls over.
        let stored = stores.identity.find_by_id(&emp.id).unwrap().unwrap();
        assert_eq!(stored.attendance_status, AttendanceStatus::Present);
    }

    #[actix_web::test]
    async fn yesterdays_record_is_stale_without_check_out() {
        let stores = stores();
        let emp = employee(&stores, "ledger.three@ems.test").await;

        stores.attendance.check_in(&emp.id, morning()).unwrap();
        let next_day = morning().date_naive().succ_opt().unwrap();
        assert!(!stores.attendance.is_checked_in(&emp.id, next_day).unwrap());
        // The raw check-in time is still readable.
        assert!(stores.attendance.check_in_time(&emp.id).unwrap().is_some());
    }

    #[actix_web::test]
    async fn check_out_without_record_is_a_no_op() {
        let stores = stores();
        assert!(stores
            .attendance
            .check_out("EMP-missing", morning())
            .unwrap()
            .is_none());
    }

    #[actix_web::test]
    async fn re_check_in_after_check_out_writes_a_fresh_record() {
        let stores = stores();
        let emp = employee(&stores, "ledger.four@ems.test").await;

        stores.attendance.check_in(&emp.id, morning()).unwrap();
        stores
            .attendance
            .check_out(&emp.id, morning() + chrono::Duration::hours(1))
            .unwrap();
        let later = morning() + chrono::Duration::hours(2);
        let record = stores.attendance.check_in(&emp.id, later).unwrap();
        assert!(!record.checked_out);
        assert_eq!(record.check_in_time, Some(later));
        assert!(stores
            .attendance
            .is_checked_in(&emp.id, later.date_naive())
            .unwrap());
    }

    #[actix_web::test]
    async fn day_overview_joins_accounts_with_records() {
        let stores = stores();
        let emp = employee(&stores, "ledger.five@ems.test").await;
        stores.attendance.check_in(&emp.id, morning()).unwrap();

        let rows = stores
            .attendance
            .day_overview(morning().date_naive())
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0.id, emp.id);

        let empty = stores
            .attendance
            .day_overview(morning().date_naive().succ_opt().unwrap())
            .unwrap();
        assert!(empty.is_empty());
    }
}
