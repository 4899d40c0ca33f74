//! Report status derived from evaluations.
//!
//! Evaluations are the only source of a report's status; nothing is copied
//! onto the report itself.

use serde::Serialize;

use crate::model::{format_date, DailyReport, Evaluation};

pub const NOT_EVALUATED: &str = "Belum dievaluasi";
pub const ACCEPTED: &str = "Diterima";
pub const NO_AGENDA: &str = "Agenda belum ditambahkan.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedStatus {
    pub status: String,
    pub komentar: Option<String>,
    /// NIP of the evaluating supervisor.
    pub nip: Option<String>,
}

/// Status of `report_id` from the first evaluation that references it.
/// A missing evaluation or a blank status reads as [`NOT_EVALUATED`].
pub fn merged_status(report_id: &str, evaluations: &[Evaluation]) -> MergedStatus {
    match evaluations.iter().find(|e| e.daily_report_id == report_id) {
        Some(eval) => {
            let status = eval.status.trim();
            MergedStatus {
                status: if status.is_empty() {
                    NOT_EVALUATED.to_string()
                } else {
                    status.to_string()
                },
                komentar: Some(eval.komentar.clone()),
                nip: Some(eval.nip.clone()),
            }
        }
        None => MergedStatus {
            status: NOT_EVALUATED.to_string(),
            komentar: None,
            nip: None,
        },
    }
}

/// Agenda edits are allowed until the report is accepted.
pub fn is_editable(status: &str) -> bool {
    status != ACCEPTED
}

/// One line of a student's report overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub id: String,
    pub date: String,
    pub title: String,
    pub status: String,
    pub komentar: Option<String>,
    #[serde(skip)]
    pub evaluator_nip: Option<String>,
    pub editable: bool,
}

pub fn report_rows(reports: &[DailyReport], evaluations: &[Evaluation]) -> Vec<ReportRow> {
    reports
        .iter()
        .map(|report| {
            let merged = merged_status(&report.id, evaluations);
            ReportRow {
                id: report.id.clone(),
                date: format_date(&report.tanggal),
                title: report
                    .agenda
                    .first()
                    .map(|a| a.judul_agenda.clone())
                    .unwrap_or_else(|| NO_AGENDA.to_string()),
                editable: is_editable(&merged.status),
                status: merged.status,
                komentar: merged.komentar,
                evaluator_nip: merged.nip,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_date, AgendaItem};

    fn eval(report_id: &str, status: &str) -> Evaluation {
        Evaluation {
            id: format!("e-{report_id}-{status}"),
            daily_report_id: report_id.to_string(),
            nip: "1".to_string(),
            komentar: format!("komentar {status}"),
            status: status.to_string(),
        }
    }

    fn report(id: &str, titles: &[&str]) -> DailyReport {
        DailyReport {
            id: id.to_string(),
            tanggal: parse_date("2024-01-10").unwrap(),
            agenda: titles
                .iter()
                .map(|t| AgendaItem {
                    waktu_mulai: "08:00".into(),
                    waktu_selesai: "09:00".into(),
                    judul_agenda: t.to_string(),
                    deskripsi_agenda: "d".into(),
                    files: vec![],
                })
                .collect(),
        }
    }

    #[test]
    fn test_unmatched_report_is_not_evaluated() {
        let merged = merged_status("r1", &[eval("r2", ACCEPTED)]);
        assert_eq!(merged.status, NOT_EVALUATED);
        assert!(merged.komentar.is_none());
        assert!(merged.nip.is_none());
    }

    #[test]
    fn test_first_match_wins_and_is_trimmed() {
        let merged = merged_status("r1", &[eval("r1", "  Diterima "), eval("r1", "Belum")]);
        assert_eq!(merged.status, ACCEPTED);
        assert_eq!(merged.komentar.as_deref(), Some("komentar   Diterima "));
    }

    #[test]
    fn test_blank_status_is_not_evaluated() {
        assert_eq!(merged_status("r1", &[eval("r1", "   ")]).status, NOT_EVALUATED);
    }

    #[test]
    fn test_report_rows() {
        let rows = report_rows(
            &[report("r1", &["Rapat", "Coding"]), report("r2", &[])],
            &[eval("r1", ACCEPTED)],
        );
        assert_eq!(rows[0].title, "Rapat");
        assert_eq!(rows[0].status, ACCEPTED);
        assert!(!rows[0].editable);
        assert_eq!(rows[1].title, NO_AGENDA);
        assert_eq!(rows[1].status, NOT_EVALUATED);
        assert!(rows[1].editable);
        assert_eq!(rows[1].date, "2024-01-10T00:00:00.000Z");
    }
}
