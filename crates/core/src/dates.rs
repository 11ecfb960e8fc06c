use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Which calendar day a run books when no explicit date is supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateMode {
    #[default]
    Today,
    Tomorrow,
}

/// A reservation date with its portal-facing strings derived once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationDate {
    /// The calendar date being booked.
    pub date: NaiveDate,
    /// `MM/DD/YYYY`, the portal's own rendering.
    pub slash: String,
    /// `MM/DD/YYYY 12:00:00 AM`, the form value both portal posts expect.
    pub full_datetime: String,
    /// Jalali rendering shown in logs and the audit trail.
    pub display: String,
}

impl ReservationDate {
    pub fn from_date(date: NaiveDate) -> Self {
        let slash = format!("{:02}/{:02}/{}", date.month(), date.day(), date.year());
        Self {
            full_datetime: format!("{slash} 12:00:00 AM"),
            display: to_jalali(date),
            slash,
            date,
        }
    }

    /// Resolves the date from the configured mode against the local clock.
    pub fn for_mode(mode: DateMode) -> Self {
        let today = Local::now().date_naive();
        let date = match mode {
            DateMode::Today => today,
            DateMode::Tomorrow => today.succ_opt().unwrap_or(today),
        };
        Self::from_date(date)
    }
}

/// Converts a Gregorian date to its Jalali rendering, `YYYY/MM/DD`.
///
/// Day-count conversion over the 33-year Jalali cycle. Valid for the
/// Gregorian range the portal can ever serve (1600 onward).
pub fn to_jalali(date: NaiveDate) -> String {
    const G_DAYS_IN_MONTH: [i64; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    const J_DAYS_IN_MONTH: [i64; 12] = [31, 31, 31, 31, 31, 31, 30, 30, 30, 30, 30, 29];

    let gy = i64::from(date.year()) - 1600;
    let gm = date.month0() as i64;
    let gd = i64::from(date.day0());

    let mut g_day_no = 365 * gy + (gy + 3) / 4 - (gy + 99) / 100 + (gy + 399) / 400;
    for days in G_DAYS_IN_MONTH.iter().take(gm as usize) {
        g_day_no += days;
    }
    if gm > 1 && (gy % 4 == 0 && gy % 100 != 0 || gy % 400 == 0) {
        g_day_no += 1;
    }
    g_day_no += gd;

    let mut j_day_no = g_day_no - 79;
    let j_np = j_day_no / 12053;
    j_day_no %= 12053;

    let mut jy = 979 + 33 * j_np + 4 * (j_day_no / 1461);
    j_day_no %= 1461;

    if j_day_no >= 366 {
        jy += (j_day_no - 1) / 365;
        j_day_no = (j_day_no - 1) % 365;
    }

    let mut jm = 0;
    while jm < 11 && j_day_no >= J_DAYS_IN_MONTH[jm] {
        j_day_no -= J_DAYS_IN_MONTH[jm];
        jm += 1;
    }
    let jd = j_day_no + 1;

    format!("{jy}/{:02}/{jd:02}", jm + 1)
}
