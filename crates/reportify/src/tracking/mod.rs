//! Derived views: report status, the printable report, internship
//! progress and coordinator statistics. Everything here is pure and works
//! on already loaded records.

pub mod printout;
pub mod progress;
pub mod stats;
pub mod status;

pub use printout::{printout, Printout, PrintoutEntry};
pub use progress::{progress, Progress, ProgressStatus};
pub use stats::{batch_from_nim, compute as compute_statistics, semester_from_nim, Statistics};
pub use status::{is_editable, merged_status, report_rows, MergedStatus, ReportRow};
