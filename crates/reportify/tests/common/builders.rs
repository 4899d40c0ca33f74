//! Builders for test records.

#![allow(dead_code)]

use reportify::model::{
    parse_date, AgendaItem, NewDailyReport, NewEvaluation, NewGuidanceSession, StudentFields,
};

/// Builder for `StudentFields`.
pub struct StudentBuilder {
    fields: StudentFields,
}

impl StudentBuilder {
    pub fn new(email: &str) -> Self {
        Self {
            fields: StudentFields {
                email: email.to_string(),
                nim: "12210111".to_string(),
                nama: "Budi Santoso".to_string(),
                judul_kp: "Sistem Pelaporan Magang".to_string(),
                instansi: "PT Maju Jaya".to_string(),
                pembimbing_instansi: "Pak Joko".to_string(),
                dosen_pembimbing: "Bu Rina".to_string(),
                mulai_kp: parse_date("2024-01-01").unwrap(),
                selesai_kp: Some(parse_date("2024-03-01").unwrap()),
            },
        }
    }

    pub fn nim(mut self, nim: &str) -> Self {
        self.fields.nim = nim.to_string();
        self
    }

    pub fn supervisor(mut self, name: &str) -> Self {
        self.fields.pembimbing_instansi = name.to_string();
        self
    }

    pub fn advisor(mut self, name: &str) -> Self {
        self.fields.dosen_pembimbing = name.to_string();
        self
    }

    pub fn period(mut self, start: &str, end: Option<&str>) -> Self {
        self.fields.mulai_kp = parse_date(start).unwrap();
        self.fields.selesai_kp = end.map(|e| parse_date(e).unwrap());
        self
    }

    pub fn build(self) -> StudentFields {
        self.fields
    }
}

pub fn agenda_item(title: &str) -> AgendaItem {
    AgendaItem {
        waktu_mulai: "08:00".to_string(),
        waktu_selesai: "12:00".to_string(),
        judul_agenda: title.to_string(),
        deskripsi_agenda: format!("Mengerjakan {title}"),
        files: vec![],
    }
}

pub fn daily_report(date: &str, titles: &[&str]) -> NewDailyReport {
    NewDailyReport {
        tanggal: parse_date(date).unwrap(),
        agenda: titles.iter().map(|t| agenda_item(t)).collect(),
    }
}

pub fn guidance(status: &str) -> NewGuidanceSession {
    NewGuidanceSession {
        nip: "19790101".to_string(),
        tanggal: parse_date("2024-01-20").unwrap(),
        komentar: "Perbaiki bab 1".to_string(),
        status: status.to_string(),
    }
}

pub fn evaluation(report_id: &str, status: &str) -> NewEvaluation {
    NewEvaluation {
        daily_report_id: report_id.to_string(),
        nip: "19800101".to_string(),
        komentar: "Sudah sesuai".to_string(),
        status: status.to_string(),
    }
}
