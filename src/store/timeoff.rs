use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use crate::error::EmsError;
use crate::model::employee::AttendanceStatus;
use crate::model::leave_request::{LeaveStatus, LeaveType, TimeOffRequest};
use crate::storage::{TIMEOFF_PARTITION, read_partition, write_partition};
use crate::store::StoreHandle;
use crate::store::identity::IdentityStore;

#[derive(Debug, Clone)]
pub struct NewTimeOffRequest {
    pub employee_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    pub reason: Option<String>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LeaveDecision {
    Approve,
    Reject,
}

/// Ordered list of leave requests, newest first.
#[derive(Clone)]
pub struct TimeOffRegister {
    handle: StoreHandle,
    identity: IdentityStore,
}

impl TimeOffRegister {
    pub fn new(handle: StoreHandle, identity: IdentityStore) -> Self {
        Self { handle, identity }
    }

    fn load(&self) -> Result<Vec<TimeOffRequest>, EmsError> {
        read_partition(self.handle.storage(), TIMEOFF_PARTITION)
    }

    fn persist(&self, requests: &[TimeOffRequest]) -> Result<(), EmsError> {
        write_partition(self.handle.storage(), TIMEOFF_PARTITION, &requests)
    }

    /// All requests, or one account's when a filter id is given.
    pub fn list(&self, for_account: Option<&str>) -> Result<Vec<TimeOffRequest>, EmsError> {
        let requests = self.load()?;
        Ok(match for_account {
            Some(id) => requests
                .into_iter()
                .filter(|request| request.employee_id == id)
                .collect(),
            None => requests,
        })
    }

    pub fn get(&self, id: i64) -> Result<TimeOffRequest, EmsError> {
        self.load()?
            .into_iter()
            .find(|request| request.id == id)
            .ok_or(EmsError::NotFound)
    }

    /// Validate the range, assign a strictly-increasing timestamp id,
    /// compute the inclusive day count and prepend.
    pub fn submit(
        &self,
        input: NewTimeOffRequest,
        now: DateTime<Utc>,
    ) -> Result<TimeOffRequest, EmsError> {
        if input.end_date < input.start_date {
            return Err(EmsError::InvalidDateRange);
        }

        let employee_name = self
            .identity
            .find_by_id(&input.employee_id)?
            .map(|account| account.name)
            .unwrap_or_else(|| "Employee".to_string());

        let _guard = self.handle.lock_writes();
        let mut requests = self.load()?;

        let mut id = now.timestamp_millis();
        if let Some(max) = requests.iter().map(|request| request.id).max() {
            if id <= max {
                id = max + 1;
            }
        }

        let request = TimeOffRequest {
            id,
            employee_id: input.employee_id,
            employee_name,
            start_date: input.start_date,
            end_date: input.end_date,
            leave_type: input.leave_type,
            reason: input.reason,
            days: (input.end_date - input.start_date).num_days() + 1,
            status: LeaveStatus::Pending,
            created_at: now,
        };
        requests.insert(0, request.clone());
        self.persist(&requests)?;

        info!(request_id = request.id, days = request.days, "Time-off request submitted");
        Ok(request)
    }

    /// Terminal transition out of `pending`. Re-deciding a decided request
    /// is rejected. Approving a range that covers today flips the account to
    /// `on-leave`.
    pub fn decide(
        &self,
        id: i64,
        decision: LeaveDecision,
        today: NaiveDate,
    ) -> Result<TimeOffRequest, EmsError> {
        let _guard = self.handle.lock_writes();
        let mut requests = self.load()?;

        let Some(slot) = requests.iter_mut().find(|request| request.id == id) else {
            return Err(EmsError::NotFound);
        };
        if slot.status.is_terminal() {
            return Err(EmsError::AlreadyDecided);
        }

        slot.status = match decision {
            LeaveDecision::Approve => LeaveStatus::Approved,
            LeaveDecision::Reject => LeaveStatus::Rejected,
        };
        let request = slot.clone();
        self.persist(&requests)?;

        if request.status == LeaveStatus::Approved && request.covers(today) {
            self.identity
                .set_attendance_status_unlocked(&request.employee_id, AttendanceStatus::OnLeave)?;
        }

        info!(request_id = id, status = %request.status, "Time-off request decided");
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::Employee;
    use crate::storage::MemoryStorage;
    use crate::store::Stores;
    use crate::store::identity::NewAccount;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn stores() -> Stores {
        Stores::new(Arc::new(MemoryStorage::default()))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 20, 12, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn employee(stores: &Stores, email: &str) -> Employee {
        stores
            .identity
            .create_account(
                NewAccount {
                    first_name: "Remy".to_string(),
                    last_name: "Lint".to_string(),
                    email: email.to_string(),
                    password: "pw123".to_string(),
                    ..NewAccount::default()
                },
                now(),
            )
            .await
            .unwrap()
    }

    fn request_for(emp: &Employee, start: NaiveDate, end: NaiveDate) -> NewTimeOffRequest {
        NewTimeOffRequest {
            employee_id: emp.id.clone(),
            start_date: start,
            end_date: end,
            leave_type: LeaveType::SickLeave,
            reason: Some("flu".to_string()),
        }
    }

    #[actix_web::test]
    async fn submit_computes_inclusive_days_and_prepends() {
        let stores = stores();
        let emp = employee(&stores, "register.one@ems.test").await;

        let first = stores
            .timeoff
            .submit(
                request_for(&emp, date(2025, 11, 1), date(2025, 11, 3)),
                now(),
            )
            .unwrap();
        assert_eq!(first.days, 3);
        assert_eq!(first.status, LeaveStatus::Pending);
        assert_eq!(first.employee_name, emp.name);

        let second = stores
            .timeoff
            .submit(
                request_for(&emp, date(2025, 11, 5), date(2025, 11, 5)),
                now(),
            )
            .unwrap();
        assert_eq!(second.days, 1);
        assert!(second.id > first.id);

        let listed = stores.timeoff.list(None).unwrap();
        assert_eq!(listed.len(), 2);
        // Newest first.
        assert_eq!(listed[0].id, second.id);
    }

    #[actix_web::test]
    async fn reversed_range_is_rejected() {
        let stores = stores();
        let emp = employee(&stores, "register.two@ems.test").await;
        let err = stores
            .timeoff
            .submit(
                request_for(&emp, date(2025, 11, 3), date(2025, 11, 1)),
                now(),
            )
            .unwrap_err();
        assert!(matches!(err, EmsError::InvalidDateRange));
        assert!(stores.timeoff.list(None).unwrap().is_empty());
    }

    #[actix_web::test]
    async fn decide_is_terminal_and_visible_in_list() {
        let stores = stores();
        let emp = employee(&stores, "register.three@ems.test").await;
        let request = stores
            .timeoff
            .submit(
                request_for(&emp, date(2025, 11, 1), date(2025, 11, 3)),
                now(),
            )
            .unwrap();

        let approved = stores
            .timeoff
            .decide(request.id, LeaveDecision::Approve, now().date_naive())
            .unwrap();
        assert_eq!(approved.status, LeaveStatus::Approved);
        assert_eq!(
            stores.timeoff.list(None).unwrap()[0].status,
            LeaveStatus::Approved
        );

        let err = stores
            .timeoff
            .decide(request.id, LeaveDecision::Reject, now().date_naive())
            .unwrap_err();
        assert!(matches!(err, EmsError::AlreadyDecided));
        assert_eq!(
            stores.timeoff.list(None).unwrap()[0].status,
            LeaveStatus::Approved
        );
    }

    #[actix_web::test]
    async fn decide_unknown_id_leaves_register_unchanged() {
        let stores = stores();
        let emp = employee(&stores, "register.four@ems.test").await;
        stores
            .timeoff
            .submit(
                request_for(&emp, date(2025, 11, 1), date(2025, 11, 2)),
                now(),
            )
            .unwrap();

        let err = stores
            .timeoff
            .decide(4242, LeaveDecision::Approve, now().date_naive())
            .unwrap_err();
        assert!(matches!(err, EmsError::NotFound));
        assert_eq!(
            stores.timeoff.list(None).unwrap()[0].status,
            LeaveStatus::Pending
        );
    }

    #[actix_web::test]
    async fn approval_covering_today_flips_status_to_on_leave() {
        let stores = stores();
        let emp = employee(&stores, "register.five@ems.test").await;
        let today = now().date_naive();
        let request = stores
            .timeoff
            .submit(request_for(&emp, today, today.succ_opt().unwrap()), now())
            .unwrap();

        stores
            .timeoff
            .decide(request.id, LeaveDecision::Approve, today)
            .unwrap();
        let stored = stores.identity.find_by_id(&emp.id).unwrap().unwrap();
        assert_eq!(stored.attendance_status, AttendanceStatus::OnLeave);
    }

    #[actix_web::test]
    async fn list_filters_by_account() {
        let stores = stores();
        let emp = employee(&stores, "register.six@ems.test").await;
        stores
            .timeoff
            .submit(
                request_for(&emp, date(2025, 12, 1), date(2025, 12, 2)),
                now(),
            )
            .unwrap();

        assert_eq!(stores.timeoff.list(Some(&emp.id)).unwrap().len(), 1);
        assert!(stores.timeoff.list(Some("EMP-nobody")).unwrap().is_empty());
    }
}
