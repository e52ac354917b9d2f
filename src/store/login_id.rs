//! Login-ID generation.
//!
//! Format: `[company 5][first name 2][last name 2][year 4][serial 4]`,
//! always 17 characters, e.g. `ODOOXJODO20250001`. Codes are uppercased and
//! right-padded with `X`; missing inputs fall back to placeholder codes
//! rather than failing.

use crate::model::employee::Employee;

const COMPANY_CODE_WIDTH: usize = 5;
const NAME_CODE_WIDTH: usize = 2;

pub struct LoginIdInput<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub company_name: &'a str,
    pub year: i32,
}

/// Generate the next login ID for the given year against the accounts that
/// already exist. The per-year serial counts accounts by their stored
/// `year_of_joining`; accounts with fixed IDs carry `None` there and never
/// consume a serial.
pub fn generate(input: &LoginIdInput<'_>, existing: &[Employee]) -> String {
    let company = code_of(input.company_name, "COMP", COMPANY_CODE_WIDTH);
    let first = code_of(input.first_name, "XX", NAME_CODE_WIDTH);
    let last = code_of(input.last_name, "XX", NAME_CODE_WIDTH);

    let serial = existing
        .iter()
        .filter(|account| account.year_of_joining == Some(input.year))
        .count()
        + 1;

    format!(
        "{company}{first}{last}{year:04}{serial:04}",
        year = input.year
    )
}

fn code_of(value: &str, fallback: &str, width: usize) -> String {
    let source = if value.trim().is_empty() {
        fallback
    } else {
        value
    };
    let mut code: String = source.to_uppercase().chars().take(width).collect();
    while code.chars().count() < width {
        code.push('X');
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::model::employee::{AttendanceStatus, Role};

    fn account(year: Option<i32>) -> Employee {
        Employee {
            id: "EMP1".into(),
            login_id: "X".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            name: "A B".into(),
            email: "a@b.c".into(),
            phone: String::new(),
            password_hash: String::new(),
            company_name: "Company".into(),
            role: Role::Employee,
            year_of_joining: year,
            job_position: String::new(),
            department: String::new(),
            manager: String::new(),
            location: String::new(),
            date_of_birth: String::new(),
            address: String::new(),
            nationality: String::new(),
            personal_email: String::new(),
            gender: String::new(),
            marital_status: String::new(),
            date_of_joining: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            attendance_status: AttendanceStatus::Absent,
            avatar: String::new(),
            salary: None,
        }
    }

    #[test]
    fn empty_store_yields_first_serial() {
        let input = LoginIdInput {
            first_name: "John",
            last_name: "Doe",
            company_name: "Odoo",
            year: 2025,
        };
        let id = generate(&input, &[]);
        assert_eq!(id, "ODOOXJODO20250001");
        assert_eq!(id.chars().count(), 17);
    }

    #[test]
    fn serial_counts_only_the_target_year() {
        let existing = vec![account(Some(2025)), account(Some(2025)), account(Some(2024))];
        let input = LoginIdInput {
            first_name: "Jane",
            last_name: "Roe",
            company_name: "Initech",
            year: 2025,
        };
        assert_eq!(generate(&input, &existing), "INITEJARO20250003");
    }

    #[test]
    fn fixed_id_accounts_do_not_consume_serials() {
        // The seed admin has no year_of_joining; the first generated account
        // of the year still gets 0001.
        let existing = vec![account(None)];
        let input = LoginIdInput {
            first_name: "John",
            last_name: "Doe",
            company_name: "Odoo",
            year: 2025,
        };
        assert!(generate(&input, &existing).ends_with("0001"));
    }

    #[test]
    fn missing_inputs_degrade_to_placeholders() {
        let input = LoginIdInput {
            first_name: "",
            last_name: " ",
            company_name: "",
            year: 2026,
        };
        assert_eq!(generate(&input, &[]), "COMPXXXXX20260001");
    }

    #[test]
    fn long_and_short_codes_are_normalized() {
        let input = LoginIdInput {
            first_name: "A",
            last_name: "Bartholomew",
            company_name: "Megacorporation",
            year: 2025,
        };
        let id = generate(&input, &[]);
        assert_eq!(&id[..5], "MEGAC");
        assert_eq!(&id[5..7], "AX");
        assert_eq!(&id[7..9], "BA");
        assert_eq!(id.chars().count(), 17);
    }
}
