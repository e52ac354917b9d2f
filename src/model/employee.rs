use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Employee,
    Admin,
}

/// Denormalized cache of today's attendance, kept on the account record so
/// the directory can render status dots without touching the ledger.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    OnLeave,
    Absent,
}

/// Admin-only salary and bank block of the profile page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SalaryInfo {
    pub monthly_wage: String,
    pub yearly_wage: String,
    pub working_days: String,
    pub working_hours: String,
    pub basic_salary: String,
    pub hra: String,
    pub special_allowance: String,
    pub fixed_allowance: String,
    pub pf_employee: String,
    pub pf_employer: String,
    pub tax_deductions: String,
    pub pan: String,
    pub uan: String,
    pub ifsc: String,
    pub bank_name: String,
    pub account_number: String,
}

/// A stored account: credentials, role and the full profile. Admins are
/// accounts too; the directory lists both roles.
///
/// Serialized with the legacy camelCase keys so existing `ems_users` dumps
/// stay readable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// `EMP` + creation timestamp in ms; fixed `admin001` for the seed admin.
    pub id: String,
    /// Generated 17-character identifier, immutable after creation.
    pub login_id: String,
    pub first_name: String,
    pub last_name: String,
    /// Display name, denormalized as "first last".
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    /// Argon2id digest. Never leaves the persistence layer; API responses use
    /// `EmployeeResponse`.
    pub password_hash: String,
    pub company_name: String,
    pub role: Role,
    /// Year baked into a generated login ID; `None` for accounts whose ID is
    /// fixed rather than generated (the seed admin). The per-year serial is
    /// counted from this field, never re-parsed out of the ID text.
    pub year_of_joining: Option<i32>,
    #[serde(default)]
    pub job_position: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub manager: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub personal_email: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub marital_status: String,
    pub date_of_joining: NaiveDate,
    pub attendance_status: AttendanceStatus,
    #[serde(default)]
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<SalaryInfo>,
}

impl Employee {
    pub fn display_name(first_name: &str, last_name: &str) -> String {
        format!("{first_name} {last_name}").trim().to_string()
    }

    pub fn avatar_url(name: &str) -> String {
        format!(
            "https://ui-avatars.com/api/?name={}&background=a855f7&color=fff",
            name.replace(' ', "+")
        )
    }

    /// Case-insensitive match against login ID or email, the two accepted
    /// login identifiers.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        let needle = identifier.to_lowercase();
        self.login_id.to_lowercase() == needle || self.email.to_lowercase() == needle
    }

    /// Directory search over name, email and job position.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self.email.to_lowercase().contains(&term)
            || self.job_position.to_lowercase().contains(&term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_use_kebab_case() {
        assert_eq!(AttendanceStatus::OnLeave.to_string(), "on-leave");
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::OnLeave).unwrap(),
            "\"on-leave\""
        );
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn display_name_trims_missing_parts() {
        assert_eq!(Employee::display_name("Ada", "Lovelace"), "Ada Lovelace");
        assert_eq!(Employee::display_name("Ada", ""), "Ada");
    }

    #[test]
    fn avatar_url_encodes_spaces() {
        assert_eq!(
            Employee::avatar_url("Admin User"),
            "https://ui-avatars.com/api/?name=Admin+User&background=a855f7&color=fff"
        );
    }
}
