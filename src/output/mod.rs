pub mod formatter;
pub mod report;

pub use formatter::{format_leaderboard, format_score_sheet, format_tsv, should_use_colors};
pub use report::{render_report, write_report, ReportOptions, DEFAULT_TITLE};
