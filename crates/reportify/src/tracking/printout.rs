//! The printable internship report: the student's identity block followed
//! by one entry per daily report with its evaluation note and attachments.

use serde::Serialize;

use super::status::report_rows;
use crate::model::{format_date, AgendaItem, Evaluation, StudentProfile};

/// Evaluation note printed for a report nobody has commented on.
pub const NO_EVALUATION: &str = "Tidak Ada Evaluasi.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintoutEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub tanggal: String,
    pub agenda: Vec<AgendaItem>,
    pub evaluasi: String,
    /// Attachment URLs of every agenda item, in agenda order.
    pub dokumentasi: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Printout {
    pub email: String,
    pub nim: String,
    pub nama: String,
    #[serde(rename = "judulKP")]
    pub judul_kp: String,
    pub instansi: String,
    pub pembimbing_instansi: String,
    pub dosen_pembimbing: String,
    #[serde(rename = "mulaiKP")]
    pub mulai_kp: String,
    #[serde(rename = "selesaiKP", skip_serializing_if = "Option::is_none")]
    pub selesai_kp: Option<String>,
    /// NIP signed under the supervisor's name: the evaluator of the latest
    /// evaluated report.
    pub nip_pembimbing: Option<String>,
    pub entries: Vec<PrintoutEntry>,
}

pub fn printout(student: &StudentProfile, evaluations: &[Evaluation]) -> Printout {
    let rows = report_rows(&student.reports, evaluations);

    let nip_pembimbing = rows.iter().rev().find_map(|row| row.evaluator_nip.clone());

    let entries = student
        .reports
        .iter()
        .zip(rows)
        .map(|(report, row)| PrintoutEntry {
            id: row.id,
            tanggal: row.date,
            evaluasi: row
                .komentar
                .filter(|k| !k.trim().is_empty())
                .unwrap_or_else(|| NO_EVALUATION.to_string()),
            dokumentasi: report
                .agenda
                .iter()
                .flat_map(|item| item.files.iter().cloned())
                .collect(),
            agenda: report.agenda.clone(),
        })
        .collect();

    Printout {
        email: student.email.clone(),
        nim: student.nim.clone(),
        nama: student.nama.clone(),
        judul_kp: student.judul_kp.clone(),
        instansi: student.instansi.clone(),
        pembimbing_instansi: student.pembimbing_instansi.clone(),
        dosen_pembimbing: student.dosen_pembimbing.clone(),
        mulai_kp: format_date(&student.mulai_kp),
        selesai_kp: student.selesai_kp.as_ref().map(format_date),
        nip_pembimbing,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{parse_date, DailyReport};

    fn item(title: &str, files: &[&str]) -> AgendaItem {
        AgendaItem {
            waktu_mulai: "08:00".into(),
            waktu_selesai: "10:00".into(),
            judul_agenda: title.into(),
            deskripsi_agenda: "d".into(),
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn student(reports: Vec<DailyReport>) -> StudentProfile {
        StudentProfile {
            id: "s1".into(),
            email: "b@x.com".into(),
            nim: "12210111".into(),
            nama: "Budi".into(),
            judul_kp: "Sistem Pelaporan".into(),
            instansi: "PT Maju".into(),
            pembimbing_instansi: "Pak Joko".into(),
            dosen_pembimbing: "Bu Rina".into(),
            mulai_kp: parse_date("2024-01-01").unwrap(),
            selesai_kp: None,
            reports,
            bimbingan: vec![],
        }
    }

    fn report(id: &str, agenda: Vec<AgendaItem>) -> DailyReport {
        DailyReport {
            id: id.into(),
            tanggal: parse_date("2024-01-10").unwrap(),
            agenda,
        }
    }

    fn eval(report_id: &str, nip: &str, komentar: &str) -> Evaluation {
        Evaluation {
            id: format!("e-{report_id}"),
            daily_report_id: report_id.into(),
            nip: nip.into(),
            komentar: komentar.into(),
            status: "Diterima".into(),
        }
    }

    #[test]
    fn test_unevaluated_and_blank_comments_fall_back() {
        let profile = student(vec![
            report("r1", vec![item("Rapat", &[])]),
            report("r2", vec![]),
            report("r3", vec![item("Coding", &[])]),
        ]);
        let out = printout(&profile, &[eval("r1", "1980", "Bagus"), eval("r3", "1981", "  ")]);

        let notes: Vec<_> = out.entries.iter().map(|e| e.evaluasi.as_str()).collect();
        assert_eq!(notes, vec!["Bagus", NO_EVALUATION, NO_EVALUATION]);
        assert_eq!(out.nip_pembimbing.as_deref(), Some("1981"));
        assert_eq!(out.entries[1].tanggal, "2024-01-10T00:00:00.000Z");
    }

    #[test]
    fn test_attachments_follow_agenda_order() {
        let profile = student(vec![report(
            "r1",
            vec![
                item("a", &["https://cdn/1.png"]),
                item("b", &[]),
                item("c", &["https://cdn/2.png", "https://cdn/3.png"]),
            ],
        )]);
        let out = printout(&profile, &[]);

        assert_eq!(
            out.entries[0].dokumentasi,
            vec!["https://cdn/1.png", "https://cdn/2.png", "https://cdn/3.png"]
        );
        assert_eq!(out.entries[0].agenda.len(), 3);
        assert!(out.nip_pembimbing.is_none());
        assert_eq!(out.mulai_kp, "2024-01-01T00:00:00.000Z");
    }
}
