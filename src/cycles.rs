use std::fmt;

use chrono::{Datelike, Days, Local, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// `NaiveDate::num_days_from_ce` of 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;
/// 1970-01-01 is a Thursday. Bi-weekly periods count from the Sunday before it.
const EPOCH_TO_SUNDAY_ANCHOR: i64 = 4;
const BI_WEEKLY_DAYS: u64 = 14;

/// Pay/timesheet cycle length.
///
/// Parsing never fails: anything that is not one of the four known names is
/// kept verbatim in [`CycleType::Unknown`] and handled by fallback rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CycleType {
    SemiMonthly,
    #[default]
    Weekly,
    BiWeekly,
    Monthly,
    Unknown(String),
}

impl CycleType {
    pub const KNOWN: [CycleType; 4] = [
        CycleType::SemiMonthly,
        CycleType::Weekly,
        CycleType::BiWeekly,
        CycleType::Monthly,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            CycleType::SemiMonthly => "semi-monthly",
            CycleType::Weekly => "weekly",
            CycleType::BiWeekly => "bi-weekly",
            CycleType::Monthly => "monthly",
            CycleType::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, CycleType::Unknown(_))
    }
}

impl From<&str> for CycleType {
    fn from(value: &str) -> Self {
        match value {
            "semi-monthly" => CycleType::SemiMonthly,
            "weekly" => CycleType::Weekly,
            "bi-weekly" => CycleType::BiWeekly,
            "monthly" => CycleType::Monthly,
            other => CycleType::Unknown(other.to_string()),
        }
    }
}

impl From<String> for CycleType {
    fn from(value: String) -> Self {
        CycleType::from(value.as_str())
    }
}

impl From<CycleType> for String {
    fn from(value: CycleType) -> Self {
        match value {
            CycleType::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for CycleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive day range of one cycle. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CyclePeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub cycle_type: CycleType,
}

impl CyclePeriod {
    /// Last representable instant of the period (23:59:59.999 of `end_date`).
    pub fn end_of_day(&self) -> NaiveDateTime {
        end_of_day(self.end_date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut current = self.start_date;
        while current <= self.end_date {
            dates.push(current);
            match current.succ_opt() {
                Some(next) => current = next,
                None => break,
            }
        }
        dates
    }

    pub fn label_on(&self, today: NaiveDate) -> String {
        format_period_on(self.start_date, &self.cycle_type, today)
    }
}

pub fn cycle_period(date: NaiveDate, cycle_type: &CycleType) -> CyclePeriod {
    CyclePeriod {
        start_date: cycle_start(date, cycle_type),
        end_date: cycle_end_date(date, cycle_type),
        cycle_type: cycle_type.clone(),
    }
}

pub fn cycle_start(date: NaiveDate, cycle_type: &CycleType) -> NaiveDate {
    match cycle_type {
        CycleType::SemiMonthly => {
            let day = if date.day() <= 15 { 1 } else { 16 };
            date.with_day(day).unwrap_or(date)
        }
        CycleType::Weekly => start_of_week(date),
        CycleType::BiWeekly => {
            let days_since_anchor = i64::from(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
                + EPOCH_TO_SUNDAY_ANCHOR;
            sub_days(date, days_since_anchor.rem_euclid(BI_WEEKLY_DAYS as i64) as u64)
        }
        CycleType::Monthly => first_of_month(date),
        CycleType::Unknown(_) => date,
    }
}

/// End of the cycle containing `date`, at 23:59:59.999.
pub fn cycle_end(date: NaiveDate, cycle_type: &CycleType) -> NaiveDateTime {
    end_of_day(cycle_end_date(date, cycle_type))
}

pub fn cycle_end_date(date: NaiveDate, cycle_type: &CycleType) -> NaiveDate {
    match cycle_type {
        CycleType::SemiMonthly => {
            if date.day() <= 15 {
                date.with_day(15).unwrap_or(date)
            } else {
                last_day_of_month(date)
            }
        }
        CycleType::Weekly => add_days(cycle_start(date, cycle_type), 6),
        CycleType::BiWeekly => add_days(cycle_start(date, cycle_type), BI_WEEKLY_DAYS - 1),
        CycleType::Monthly => last_day_of_month(date),
        CycleType::Unknown(_) => cycle_start(date, cycle_type),
    }
}

/// Every calendar day of the cycle containing `date`, ascending.
pub fn cycle_dates(date: NaiveDate, cycle_type: &CycleType) -> Vec<NaiveDate> {
    cycle_period(date, cycle_type).dates()
}

/// Dates shown as columns of the entry grid.
///
/// Monthly and semi-monthly cycles only show the week containing `date`.
pub fn grid_dates(date: NaiveDate, cycle_type: &CycleType) -> Vec<NaiveDate> {
    match cycle_type {
        CycleType::Monthly | CycleType::SemiMonthly => cycle_dates(date, &CycleType::Weekly),
        other => cycle_dates(date, other),
    }
}

/// Nominal cycle length in days. Not exact for monthly and semi-monthly.
pub fn cycle_day_count(cycle_type: &CycleType) -> u32 {
    match cycle_type {
        CycleType::SemiMonthly => 15,
        CycleType::Weekly => 7,
        CycleType::BiWeekly => 14,
        CycleType::Monthly => 30,
        CycleType::Unknown(_) => 7,
    }
}

pub fn next_cycle(date: NaiveDate, cycle_type: &CycleType) -> NaiveDate {
    let shifted = match cycle_type {
        CycleType::SemiMonthly => {
            if date.day() <= 15 {
                date.with_day(16).unwrap_or(date)
            } else {
                add_months(first_of_month(date), 1)
            }
        }
        CycleType::Monthly => add_months(first_of_month(date), 1),
        CycleType::Weekly | CycleType::Unknown(_) => add_days(date, 7),
        CycleType::BiWeekly => add_days(date, BI_WEEKLY_DAYS),
    };
    cycle_start(shifted, cycle_type)
}

pub fn previous_cycle(date: NaiveDate, cycle_type: &CycleType) -> NaiveDate {
    let shifted = match cycle_type {
        CycleType::SemiMonthly => {
            if date.day() <= 15 {
                let previous_month = sub_months(first_of_month(date), 1);
                previous_month.with_day(16).unwrap_or(previous_month)
            } else {
                first_of_month(date)
            }
        }
        CycleType::Monthly => sub_months(first_of_month(date), 1),
        CycleType::Weekly | CycleType::Unknown(_) => sub_days(date, 7),
        CycleType::BiWeekly => sub_days(date, BI_WEEKLY_DAYS),
    };
    cycle_start(shifted, cycle_type)
}

/// Start of the cycle `offset` periods away from the one containing `date`.
pub fn shift_cycle(date: NaiveDate, cycle_type: &CycleType, offset: i32) -> NaiveDate {
    let mut current = cycle_start(date, cycle_type);
    for _ in 0..offset.unsigned_abs() {
        current = if offset > 0 {
            next_cycle(current, cycle_type)
        } else {
            previous_cycle(current, cycle_type)
        };
    }
    current
}

pub fn format_period(date: NaiveDate, cycle_type: &CycleType) -> String {
    format_period_on(date, cycle_type, Local::now().date_naive())
}

/// Display label for the cycle containing `date`, with `today` deciding
/// whether years are spelled out.
pub fn format_period_on(date: NaiveDate, cycle_type: &CycleType, today: NaiveDate) -> String {
    match cycle_type {
        CycleType::Monthly => date.format("%B %Y").to_string(),
        _ => {
            let start = cycle_start(date, cycle_type);
            let end = cycle_end_date(date, cycle_type);
            format!(
                "{} - {}",
                short_label(start, today),
                short_label(end, today)
            )
        }
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| "Invalid date format. Use YYYY-MM-DD.".to_string())
}

fn short_label(date: NaiveDate, today: NaiveDate) -> String {
    if date.year() == today.year() {
        date.format("%b %-d").to_string()
    } else {
        date.format("%b %-d, %Y").to_string()
    }
}

fn start_of_week(date: NaiveDate) -> NaiveDate {
    sub_days(date, u64::from(date.weekday().num_days_from_sunday()))
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months)).unwrap_or(date)
}

fn sub_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months)).unwrap_or(date)
}

/// Day arithmetic saturates at the ends of the supported calendar.
fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

fn sub_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}
