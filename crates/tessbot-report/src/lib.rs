//! tessbot-report: report writers for tessbot runs.

pub mod text;

pub use text::{render_text, report_file_name, text_report_path, write_text_report};
