use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One account's current check-in/out record. A record dated before today is
/// stale; staleness is decided on read, there is no rollover job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub date: NaiveDate,
    pub checked_in: bool,
    #[serde(default)]
    pub checked_out: bool,
    #[serde(default)]
    pub check_in_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub check_out_time: Option<DateTime<Utc>>,
}

impl AttendanceRecord {
    /// Checked in today and not yet checked out.
    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        self.checked_in && !self.checked_out && self.date == day
    }
}
