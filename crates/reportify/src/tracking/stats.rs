//! Coordinator statistics over the whole student population.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use super::progress::{percentage, ProgressStatus};
use crate::model::StudentProfile;

/// Guidance status counted as awaiting the advisor.
pub const PENDING_GUIDANCE: &str = "pending";

/// Intake year (two digits) encoded in characters 1..3 of a NIM. Reads
/// leading digits only, so `"1a5"` yields nothing and `"12x"` yields 2.
pub fn batch_from_nim(nim: &str) -> Option<u32> {
    let digits: String = nim
        .chars()
        .skip(1)
        .take(2)
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

pub fn semester_from_nim(nim: &str, today: DateTime<Utc>) -> Option<u32> {
    let batch = i64::from(batch_from_nim(nim)?);
    let year = i64::from(today.year().rem_euclid(100));
    let semester = (year - batch) * 2 + 1;
    Some(semester.max(1) as u32)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchCount {
    pub angkatan: u32,
    pub jumlah: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdvisorCount {
    #[serde(rename = "dosenPembimbing")]
    pub dosen_pembimbing: String,
    pub jumlah: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
}

impl StatusCounts {
    fn record(&mut self, status: ProgressStatus) {
        match status {
            ProgressStatus::Completed => self.completed += 1,
            ProgressStatus::InProgress => self.in_progress += 1,
            ProgressStatus::Pending => self.pending += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_mahasiswa: usize,
    pub per_angkatan: Vec<BatchCount>,
    pub per_dosen: Vec<AdvisorCount>,
    pub status_progres: StatusCounts,
    pub bimbingan_pending: usize,
}

pub fn compute(students: &[StudentProfile], today: DateTime<Utc>) -> Statistics {
    let mut batches: HashMap<u32, usize> = HashMap::new();
    let mut advisors: HashMap<&str, usize> = HashMap::new();
    let mut status_progres = StatusCounts::default();
    let mut bimbingan_pending = 0;

    for student in students {
        if let Some(batch) = batch_from_nim(&student.nim) {
            *batches.entry(batch).or_default() += 1;
        }
        *advisors.entry(student.dosen_pembimbing.as_str()).or_default() += 1;

        let pct = percentage(student.mulai_kp, student.selesai_kp, today);
        status_progres.record(ProgressStatus::from_percentage(pct));

        bimbingan_pending += student
            .bimbingan
            .iter()
            .filter(|b| b.status.as_deref() == Some(PENDING_GUIDANCE))
            .count();
    }

    let mut per_angkatan: Vec<BatchCount> = batches
        .into_iter()
        .map(|(angkatan, jumlah)| BatchCount { angkatan, jumlah })
        .collect();
    per_angkatan.sort_by(|a, b| b.angkatan.cmp(&a.angkatan));

    let mut per_dosen: Vec<AdvisorCount> = advisors
        .into_iter()
        .map(|(name, jumlah)| AdvisorCount {
            dosen_pembimbing: name.to_string(),
            jumlah,
        })
        .collect();
    per_dosen.sort_by(|a, b| {
        b.jumlah
            .cmp(&a.jumlah)
            .then_with(|| a.dosen_pembimbing.cmp(&b.dosen_pembimbing))
    });

    Statistics {
        total_mahasiswa: students.len(),
        per_angkatan,
        per_dosen,
        status_progres,
        bimbingan_pending,
    }
}
