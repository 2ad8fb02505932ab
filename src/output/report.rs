//! Printable HTML export of the leaderboard.

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fmt::Write as _;
use std::path::Path;

use crate::model::{Criterion, EventState, Judge};
use crate::scoring::{leaderboard, LevelFilter, RankedParticipant};

pub const DEFAULT_TITLE: &str = "Rekapitulasi Rinci Nilai PBB";

const STYLES: &str = "
      @page { size: legal landscape; margin: 15px; }
      body { font-family: Arial, sans-serif; font-size: 8px; }
      h1, h2 { text-align: center; margin-bottom: 1rem; }
      h1 { font-size: 16px; }
      h2 { font-size: 14px; }
      table { width: 100%; border-collapse: collapse; }
      th, td { border: 1px solid #000; padding: 4px; text-align: center; vertical-align: middle; }
      thead { background-color: #f2f2f2; }
      th { font-weight: bold; }
      .criterion-header { background-color: #FFDAB9; }
      .judge-header { background-color: #E6E6FA; }
      .judge-total-header { background-color: #ADD8E6; }
      .participant-name { text-align: left; white-space: nowrap; font-weight: bold; }
      tbody tr:nth-child(even) { background-color: #f9f9f9; }
      .bold, .criterion-total, .final-total, .rank, .judge-total { font-weight: bold; }
      .judge-total { background-color: #f0f8ff; }
      .page-break { page-break-before: always; }
      .generated { text-align: right; font-size: 7px; }
";

/// Report settings taken from the config
#[derive(Debug, Clone)]
pub struct ReportOptions<'a> {
    pub title: &'a str,
    /// Table order for "all"
    pub brackets: &'a [String],
    pub generated_at: DateTime<Local>,
}

/// Render the whole report.
///
/// A single bracket always gets its own page, with a notice when nobody is
/// registered in it. "All" renders one table per bracket that has
/// participants, each ranked on its own, separated by page breaks. Brackets
/// in use but missing from the configured order come last, alphabetically.
pub fn render_report(state: &EventState, filter: &LevelFilter, options: &ReportOptions) -> String {
    let (title, body) = match filter {
        LevelFilter::Level(level) => {
            let title = format!("{} - Jenjang {}", options.title, level);
            let ranked = leaderboard(state, filter);
            let body = if ranked.is_empty() {
                format!(
                    "<p style=\"text-align: center;\">Tidak ada data untuk jenjang {}.</p>",
                    escape(level)
                )
            } else {
                render_table(&ranked, None, &state.judges, &state.rubric.criteria_for(level))
            };
            (title, body)
        }
        LevelFilter::All => {
            let title = format!("{} - Semua Jenjang", options.title);
            let tables: Vec<String> = bracket_order(state, options.brackets)
                .into_iter()
                .filter_map(|level| {
                    let ranked = leaderboard(state, &LevelFilter::Level(level.clone()));
                    if ranked.is_empty() {
                        return None;
                    }
                    let heading = format!("Jenjang {}", level);
                    Some(render_table(
                        &ranked,
                        Some(&heading),
                        &state.judges,
                        &state.rubric.criteria_for(&level),
                    ))
                })
                .collect();
            (title, tables.join("<div class=\"page-break\"></div>"))
        }
    };

    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title}</title><style>{styles}</style></head>\n\
         <body><h1>{title}</h1>{body}<p class=\"generated\">Dibuat {generated}</p></body></html>\n",
        title = escape(&title),
        styles = STYLES,
        body = body,
        generated = options.generated_at.format("%Y-%m-%d %H:%M"),
    )
}

/// Write a rendered report, creating the parent directory if needed
pub fn write_report(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create report directory: {}", parent.display()))?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("Failed to write report: {}", path.display()))
}

fn bracket_order(state: &EventState, configured: &[String]) -> Vec<String> {
    let mut order: Vec<String> = configured.to_vec();
    let mut extra: Vec<String> = state
        .participants
        .iter()
        .map(|p| p.level.clone())
        .filter(|level| !configured.contains(level))
        .collect();
    extra.sort();
    extra.dedup();
    order.extend(extra);
    order
}

fn render_table(
    ranked: &[RankedParticipant],
    heading: Option<&str>,
    judges: &[Judge],
    criteria: &[&Criterion],
) -> String {
    let mut html = String::new();
    if let Some(heading) = heading {
        let _ = write!(html, "<h2>{}</h2>", escape(heading));
    }

    html.push_str("<table><thead><tr>");
    html.push_str("<th rowspan=\"2\" class=\"rank\">PERINGKAT</th>");
    html.push_str("<th rowspan=\"2\" class=\"participant-name\">NAMA PESERTA</th>");
    for criterion in criteria {
        let _ = write!(
            html,
            "<th class=\"criterion-header\" colspan=\"{}\">{}</th>",
            judges.len() + 1,
            escape(&criterion.name.to_uppercase())
        );
    }
    for judge in judges {
        let _ = write!(
            html,
            "<th rowspan=\"2\" class=\"judge-total-header\">TOTAL {}</th>",
            escape(&judge.name.to_uppercase())
        );
    }
    html.push_str("<th rowspan=\"2\" class=\"final-total\">TOTAL NILAI</th></tr><tr>");
    for _ in criteria {
        for judge in judges {
            let _ = write!(html, "<th class=\"judge-header\">{}</th>", escape(&judge.name));
        }
        html.push_str("<th class=\"judge-header bold\">Total</th>");
    }
    html.push_str("</tr></thead><tbody>");

    for r in ranked {
        let _ = write!(
            html,
            "<tr><td class=\"rank\">{}</td><td class=\"participant-name\">{}</td>",
            r.rank,
            escape(&r.participant.name)
        );
        for criterion in criteria {
            for judge in judges {
                let _ = write!(html, "<td>{}</td>", r.score(&judge.id, criterion.id));
            }
            let _ = write!(
                html,
                "<td class=\"criterion-total\">{}</td>",
                r.criterion_total(criterion.id)
            );
        }
        for judge in judges {
            let _ = write!(html, "<td class=\"judge-total\">{}</td>", r.judge_total(&judge.id));
        }
        let _ = write!(html, "<td class=\"final-total\">{}</td></tr>", r.total);
    }
    html.push_str("</tbody></table>");
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Participant, Rubric, ScoreTable};

    fn state() -> EventState {
        let mut rubric = Rubric::new();
        for level in ["SD", "SMP"] {
            rubric.insert_level(
                level,
                vec![Category {
                    id: 1,
                    name: format!("Kriteria {}", level),
                    criteria: vec![Criterion {
                        id: 1,
                        name: "Hormat".to_string(),
                        scores: ScoreTable::new(),
                    }],
                }],
            );
        }
        let mut a = Participant::new("a", "Tim <A>", "SD");
        a.scores.set("j1", 1, 40);
        let b = Participant::new("b", "Tim B", "SD");
        let c = Participant::new("c", "Tim C", "TK");

        EventState {
            participants: vec![a, b, c],
            judges: vec![Judge::new("j1", "Juri 1"), Judge::new("j2", "Juri 2")],
            rubric,
            ..EventState::default()
        }
    }

    fn options(brackets: &[String]) -> ReportOptions<'_> {
        ReportOptions {
            title: DEFAULT_TITLE,
            brackets,
            generated_at: Local::now(),
        }
    }

    fn brackets() -> Vec<String> {
        vec!["SD".to_string(), "SMP".to_string(), "SLTA".to_string()]
    }

    #[test]
    fn test_single_bracket_report() {
        let brackets = brackets();
        let filter = LevelFilter::Level("SD".to_string());
        let html = render_report(&state(), &filter, &options(&brackets));

        assert!(html.contains("<title>Rekapitulasi Rinci Nilai PBB - Jenjang SD</title>"));
        assert!(html.contains("@page { size: legal landscape"));
        assert!(html.contains("PERINGKAT"));
        assert!(html.contains("<th class=\"criterion-header\" colspan=\"3\">HORMAT</th>"));
        assert!(html.contains("TOTAL JURI 1"));
        assert!(html.contains("TOTAL NILAI"));
        assert!(html.contains("Tim &lt;A&gt;"));
        assert!(!html.contains("Tim C"));
        assert!(!html.contains("page-break\"></div>"));
    }

    #[test]
    fn test_row_cells_follow_header_order() {
        let brackets = brackets();
        let filter = LevelFilter::Level("SD".to_string());
        let html = render_report(&state(), &filter, &options(&brackets));
        // rank, name, j1, j2, criterion total, total j1, total j2, grand total
        assert!(html.contains(
            "<tr><td class=\"rank\">1</td><td class=\"participant-name\">Tim &lt;A&gt;</td>\
             <td>40</td><td>0</td><td class=\"criterion-total\">40</td>\
             <td class=\"judge-total\">40</td><td class=\"judge-total\">0</td>\
             <td class=\"final-total\">40</td></tr>"
        ));
    }

    #[test]
    fn test_empty_single_bracket_shows_notice() {
        let brackets = brackets();
        let filter = LevelFilter::Level("SLTA".to_string());
        let html = render_report(&state(), &filter, &options(&brackets));
        assert!(html.contains("Tidak ada data untuk jenjang SLTA."));
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn test_all_skips_empty_brackets() {
        let brackets = brackets();
        let html = render_report(&state(), &LevelFilter::All, &options(&brackets));

        assert!(html.contains("Semua Jenjang"));
        assert!(html.contains("<h2>Jenjang SD</h2>"));
        assert!(!html.contains("<h2>Jenjang SMP</h2>"));
        // Unconfigured bracket with participants still appears, after SD
        let sd = html.find("<h2>Jenjang SD</h2>").unwrap();
        let tk = html.find("<h2>Jenjang TK</h2>").unwrap();
        assert!(sd < tk);
        assert_eq!(html.matches("<div class=\"page-break\"></div>").count(), 1);
    }

    #[test]
    fn test_write_report_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("rekap.html");
        write_report(&path, "<html></html>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html></html>");
    }
}
