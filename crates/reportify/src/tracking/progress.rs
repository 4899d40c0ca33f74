//! Internship progress arithmetic. Day counts round up, so a period that
//! has started counts as at least one day.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProgressStatus {
    Completed,
    #[serde(rename = "In Progress")]
    InProgress,
    Pending,
}

impl ProgressStatus {
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            100.. => ProgressStatus::Completed,
            1..=99 => ProgressStatus::InProgress,
            0 => ProgressStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub percentage: u8,
    pub current_day: i64,
    pub total_days: Option<i64>,
    pub status: ProgressStatus,
}

fn ceil_days(span: Duration) -> i64 {
    const DAY_MS: i64 = 24 * 60 * 60 * 1000;
    let ms = span.num_milliseconds();
    ms.div_euclid(DAY_MS) + i64::from(ms.rem_euclid(DAY_MS) != 0)
}

pub fn percentage(start: DateTime<Utc>, end: Option<DateTime<Utc>>, today: DateTime<Utc>) -> u8 {
    if today < start {
        return 0;
    }
    let Some(end) = end else {
        return 100;
    };
    if today > end {
        return 100;
    }
    let total = ceil_days(end - start);
    if total <= 0 {
        return 100;
    }
    let passed = ceil_days(today - start);
    let ratio = (passed as f64 / total as f64 * 100.0).round();
    ratio.clamp(0.0, 100.0) as u8
}

pub fn progress(start: DateTime<Utc>, end: Option<DateTime<Utc>>, today: DateTime<Utc>) -> Progress {
    let total_days = end.map(|end| ceil_days(end - start));
    let current_day = if today < start {
        0
    } else {
        let passed = ceil_days(today - start);
        match total_days {
            Some(total) => passed.min(total).max(0),
            None => passed,
        }
    };
    let percentage = percentage(start, end, today);

    Progress {
        percentage,
        current_day,
        total_days,
        status: ProgressStatus::from_percentage(percentage),
    }
}
