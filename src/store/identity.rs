use chrono::{DateTime, Datelike, Utc};
use tracing::{debug, info};

use crate::auth::password;
use crate::error::EmsError;
use crate::model::employee::{AttendanceStatus, Employee, Role, SalaryInfo};
use crate::storage::{USERS_PARTITION, read_partition, write_partition};
use crate::store::StoreHandle;
use crate::store::login_id::{self, LoginIdInput};
use crate::store::session::SessionStore;
use crate::utils::{email_cache, email_filter};

/// Seed administrator, inserted when the accounts partition is empty.
pub const SEED_ADMIN_ID: &str = "admin001";
pub const SEED_ADMIN_LOGIN_ID: &str = "ADMIN001";
pub const SEED_ADMIN_EMAIL: &str = "admin@company.com";

/// Data accepted when an administrator creates an account. Everything beyond
/// the first five fields is optional profile data.
#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub company_name: Option<String>,
    pub role: Option<Role>,
    pub job_position: Option<String>,
    pub department: Option<String>,
    pub manager: Option<String>,
    pub location: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<String>,
    pub nationality: Option<String>,
    pub personal_email: Option<String>,
    pub gender: Option<String>,
    pub marital_status: Option<String>,
    pub date_of_joining: Option<chrono::NaiveDate>,
}

/// All accounts (employees and admins), one partition, plus the operations
/// the rest of the system builds on.
#[derive(Clone)]
pub struct IdentityStore {
    handle: StoreHandle,
    sessions: SessionStore,
}

impl IdentityStore {
    pub fn new(handle: StoreHandle, sessions: SessionStore) -> Self {
        Self { handle, sessions }
    }

    fn load(&self) -> Result<Vec<Employee>, EmsError> {
        read_partition(self.handle.storage(), USERS_PARTITION)
    }

    fn persist(&self, accounts: &[Employee]) -> Result<(), EmsError> {
        write_partition(self.handle.storage(), USERS_PARTITION, &accounts)
    }

    pub fn list_accounts(&self) -> Result<Vec<Employee>, EmsError> {
        self.load()
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<Employee>, EmsError> {
        Ok(self.load()?.into_iter().find(|account| account.id == id))
    }

    /// true  => email AVAILABLE
    /// false => email TAKEN
    ///
    /// Filter gives a fast negative, cache a fast positive, the partition
    /// scan is the fallback.
    pub async fn is_email_available(&self, email: &str) -> Result<bool, EmsError> {
        let email = email.to_lowercase();

        if !email_filter::might_exist(&email) {
            return Ok(true);
        }

        if email_cache::is_taken(&email).await {
            return Ok(false);
        }

        let accounts = self.load()?;
        Ok(!accounts
            .iter()
            .any(|account| account.email.to_lowercase() == email))
    }

    /// Create an account: unique email (case-insensitive), generated id and
    /// login ID, defaults for everything the caller left out.
    pub async fn create_account(
        &self,
        input: NewAccount,
        now: DateTime<Utc>,
    ) -> Result<Employee, EmsError> {
        if !self.is_email_available(&input.email).await? {
            return Err(EmsError::DuplicateEmail);
        }

        let employee = {
            let _guard = self.handle.lock_writes();
            let mut accounts = self.load()?;

            // Authoritative re-check under the write lock.
            let email = input.email.to_lowercase();
            if accounts
                .iter()
                .any(|account| account.email.to_lowercase() == email)
            {
                return Err(EmsError::DuplicateEmail);
            }

            let year = now.year();
            let company_for_id = input.company_name.as_deref().unwrap_or_default();
            let login_id = login_id::generate(
                &LoginIdInput {
                    first_name: &input.first_name,
                    last_name: &input.last_name,
                    company_name: company_for_id,
                    year,
                },
                &accounts,
            );

            // Timestamp ids can collide within one millisecond; bump forward
            // until free so the uniqueness invariant holds.
            let mut id_millis = now.timestamp_millis();
            while accounts.iter().any(|a| a.id == format!("EMP{id_millis}")) {
                id_millis += 1;
            }

            let name = Employee::display_name(&input.first_name, &input.last_name);
            let avatar = Employee::avatar_url(&name);
            let employee = Employee {
                id: format!("EMP{id_millis}"),
                login_id,
                name,
                email: input.email,
                phone: input.phone,
                password_hash: password::hash_password(&input.password),
                company_name: input
                    .company_name
                    .filter(|company| !company.trim().is_empty())
                    .unwrap_or_else(|| "Company".to_string()),
                role: input.role.unwrap_or(Role::Employee),
                year_of_joining: Some(year),
                job_position: input.job_position.unwrap_or_default(),
                department: input.department.unwrap_or_default(),
                manager: input.manager.unwrap_or_default(),
                location: input.location.unwrap_or_default(),
                date_of_birth: input.date_of_birth.unwrap_or_default(),
                address: input.address.unwrap_or_default(),
                nationality: input.nationality.unwrap_or_default(),
                personal_email: input.personal_email.unwrap_or_default(),
                gender: input.gender.unwrap_or_default(),
                marital_status: input.marital_status.unwrap_or_default(),
                date_of_joining: input.date_of_joining.unwrap_or_else(|| now.date_naive()),
                attendance_status: AttendanceStatus::Absent,
                avatar,
                salary: None,
                first_name: input.first_name,
                last_name: input.last_name,
            };

            accounts.push(employee.clone());
            self.persist(&accounts)?;
            employee
        };

        // Keep the fast paths in step with the partition.
        email_filter::insert(&employee.email);
        email_cache::mark_taken(&employee.email).await;

        info!(login_id = %employee.login_id, "Account created");
        Ok(employee)
    }

    /// Replace the account matching by `id` OR `login_id`, append when
    /// neither matches. The session snapshot and the email fast paths are
    /// refreshed alongside.
    pub async fn upsert_account(&self, employee: Employee) -> Result<Employee, EmsError> {
        let previous_email = {
            let _guard = self.handle.lock_writes();
            let mut accounts = self.load()?;
            let previous = match accounts
                .iter_mut()
                .find(|a| a.id == employee.id || a.login_id == employee.login_id)
            {
                Some(slot) => {
                    let previous = slot.email.clone();
                    *slot = employee.clone();
                    Some(previous)
                }
                None => {
                    accounts.push(employee.clone());
                    None
                }
            };
            self.persist(&accounts)?;
            self.sessions.sync_account_unlocked(&employee)?;
            previous
        };

        let email_changed = previous_email
            .as_deref()
            .map(|previous| previous.to_lowercase() != employee.email.to_lowercase())
            .unwrap_or(true);
        if email_changed {
            if let Some(previous) = previous_email {
                email_filter::remove(&previous);
                email_cache::forget(&previous).await;
            }
            email_filter::insert(&employee.email);
            email_cache::mark_taken(&employee.email).await;
        }

        Ok(employee)
    }

    /// Match the identifier against login ID or email (case-insensitive),
    /// then the password against the stored hash (exact). The login handler
    /// establishes the session on success.
    pub fn authenticate(&self, identifier: &str, plain: &str) -> Result<Employee, EmsError> {
        let identifier = identifier.trim();
        let accounts = self.load()?;
        let account = accounts
            .into_iter()
            .find(|account| account.matches_identifier(identifier));

        match account {
            Some(account) if password::verify_password(plain, &account.password_hash) => {
                debug!(account_id = %account.id, "Credentials verified");
                Ok(account)
            }
            _ => Err(EmsError::InvalidCredentials),
        }
    }

    /// Change the current session's password. Fails when there is no session
    /// or the current password does not match; updates both the partition
    /// and the session snapshot.
    pub fn change_password(&self, current: &str, new: &str) -> Result<(), EmsError> {
        let _guard = self.handle.lock_writes();

        let Some(mut session_account) = self.sessions.current()? else {
            return Err(EmsError::InvalidCredentials);
        };
        if !password::verify_password(current, &session_account.password_hash) {
            return Err(EmsError::InvalidCredentials);
        }

        let mut accounts = self.load()?;
        let Some(slot) = accounts
            .iter_mut()
            .find(|account| account.id == session_account.id)
        else {
            return Err(EmsError::InvalidCredentials);
        };

        let hash = password::hash_password(new);
        slot.password_hash = hash.clone();
        self.persist(&accounts)?;

        session_account.password_hash = hash;
        self.sessions.establish_unlocked(&session_account)?;
        info!(account_id = %session_account.id, "Password changed");
        Ok(())
    }

    /// Flip the denormalized attendance status. Caller holds the write lock.
    pub(crate) fn set_attendance_status_unlocked(
        &self,
        account_id: &str,
        status: AttendanceStatus,
    ) -> Result<(), EmsError> {
        let mut accounts = self.load()?;
        if let Some(slot) = accounts.iter_mut().find(|a| a.id == account_id) {
            slot.attendance_status = status;
            let snapshot = slot.clone();
            self.persist(&accounts)?;
            self.sessions.sync_account_unlocked(&snapshot)?;
        }
        Ok(())
    }

    /// Insert the default administrator when the partition is empty.
    /// Returns whether seeding happened.
    pub fn ensure_default_admin(
        &self,
        seed_password: &str,
        company_name: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, EmsError> {
        let _guard = self.handle.lock_writes();
        let accounts = self.load()?;
        if !accounts.is_empty() {
            return Ok(false);
        }

        let name = "Admin User".to_string();
        let admin = Employee {
            id: SEED_ADMIN_ID.to_string(),
            login_id: SEED_ADMIN_LOGIN_ID.to_string(),
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            avatar: Employee::avatar_url(&name),
            name,
            email: SEED_ADMIN_EMAIL.to_string(),
            phone: "1234567890".to_string(),
            password_hash: password::hash_password(seed_password),
            company_name: company_name.to_string(),
            role: Role::Admin,
            year_of_joining: None,
            job_position: "Administrator".to_string(),
            department: "Administration".to_string(),
            manager: String::new(),
            location: "Head Office".to_string(),
            date_of_birth: String::new(),
            address: String::new(),
            nationality: String::new(),
            personal_email: String::new(),
            gender: String::new(),
            marital_status: String::new(),
            date_of_joining: now.date_naive(),
            attendance_status: AttendanceStatus::Present,
            salary: Some(SalaryInfo::default()),
        };
        self.persist(&[admin])?;
        Ok(true)
    }
}
