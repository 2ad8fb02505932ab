use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::model::{Criterion, Judge, Participant};
use crate::scoring::RankedParticipant;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format a leaderboard as one row per participant: rank, total, bracket, name.
///
/// Rank column: 3 chars (fits "99."), right-aligned. Total column: 7 chars.
pub fn format_leaderboard(ranked: &[RankedParticipant], use_colors: bool) -> String {
    if ranked.is_empty() {
        return "No participants found.".to_string();
    }

    let term_width = get_terminal_width();
    let rank_width = 3;
    let total_width = 7;
    let level_width = ranked
        .iter()
        .map(|r| r.participant.level.chars().count())
        .max()
        .unwrap_or(0);
    let separator = "  ";

    ranked
        .iter()
        .map(|r| {
            let rank_str = format!("{:>2}.", r.rank);
            let total_str = format!("{:>width$}", r.total, width = total_width);
            let level_str = format!("{:<width$}", r.participant.level, width = level_width);

            let fixed_width = rank_width + 1 + total_width + separator.len() * 2 + level_width;
            let name = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_name(&r.participant.name, width - fixed_width)
                }
                Some(_) => truncate_name(&r.participant.name, 20),
                None => r.participant.name.clone(),
            };

            if use_colors {
                format!(
                    "{} {}{}{}{}{}",
                    rank_str.dimmed(),
                    total_str.bold(),
                    separator,
                    level_str.cyan(),
                    separator,
                    name
                )
            } else {
                format!(
                    "{} {}{}{}{}{}",
                    rank_str, total_str, separator, level_str, separator, name
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a leaderboard as tab-separated values for scripting
/// Columns: rank, total, name, bracket, then one total per judge (no headers, no colors)
pub fn format_tsv(ranked: &[RankedParticipant], judges: &[Judge]) -> String {
    ranked
        .iter()
        .map(|r| {
            let mut columns = vec![
                r.rank.to_string(),
                r.total.to_string(),
                r.participant.name.clone(),
                r.participant.level.clone(),
            ];
            columns.extend(judges.iter().map(|j| r.judge_total(&j.id).to_string()));
            columns.join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// One participant's score sheet: a row per criterion with each judge's
/// recorded score ("-" when not scored yet), then every judge's running total.
pub fn format_score_sheet(
    participant: &Participant,
    judges: &[Judge],
    criteria: &[&Criterion],
    use_colors: bool,
) -> String {
    let header = format!("{} ({})", participant.name, participant.level);
    let mut lines = vec![if use_colors {
        header.bold().to_string()
    } else {
        header
    }];

    if criteria.is_empty() {
        lines.push("No criteria for this bracket.".to_string());
        return lines.join("\n");
    }

    let name_width = criteria
        .iter()
        .map(|c| c.name.chars().count())
        .chain(std::iter::once("Total".len()))
        .max()
        .unwrap_or(0);
    let cell = |text: String| format!("{:>8}", text);

    let mut judge_header = format!("{:<width$}", "", width = name_width + 5);
    for judge in judges {
        judge_header.push_str(&cell(truncate_name(&judge.name, 8)));
    }
    lines.push(judge_header);

    for criterion in criteria {
        let mut row = format!(
            "{:>3}. {:<width$}",
            criterion.id,
            criterion.name,
            width = name_width
        );
        for judge in judges {
            let text = participant
                .scores
                .get(&judge.id, criterion.id)
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string());
            row.push_str(&cell(text));
        }
        lines.push(row);
    }

    let mut totals = format!("     {:<width$}", "Total", width = name_width);
    for judge in judges {
        totals.push_str(&cell(participant.scores.judge_total(&judge.id).to_string()));
    }
    lines.push(if use_colors {
        totals.bold().to_string()
    } else {
        totals
    });

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScoreTable;
    use std::collections::BTreeMap;

    fn ranked(rank: usize, name: &str, level: &str, total: i64) -> RankedParticipant {
        let mut judge_totals = BTreeMap::new();
        judge_totals.insert("j1".to_string(), total);
        RankedParticipant {
            participant: Participant::new(name.to_lowercase(), name, level),
            rank,
            total,
            criterion_totals: BTreeMap::new(),
            judge_totals,
        }
    }

    fn criterion(id: u32, name: &str) -> Criterion {
        Criterion {
            id,
            name: name.to_string(),
            scores: ScoreTable::new(),
        }
    }

    #[test]
    fn test_format_leaderboard_empty() {
        assert_eq!(format_leaderboard(&[], false), "No participants found.");
    }

    #[test]
    fn test_format_leaderboard_rows() {
        let rows = vec![
            ranked(1, "Tim A", "SMP", 175),
            ranked(2, "Tim B", "SD", 90),
            ranked(2, "Tim C", "SD", 90),
        ];
        let result = format_leaderboard(&rows, false);
        let lines: Vec<&str> = result.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with(" 1."));
        assert!(lines[0].contains("175"));
        assert!(lines[0].contains("SMP"));
        assert!(lines[0].contains("Tim A"));
        assert!(lines[1].starts_with(" 2."));
        assert!(lines[2].starts_with(" 2."));
    }

    #[test]
    fn test_format_tsv() {
        let rows = vec![ranked(1, "Tim A", "SMP", 175), ranked(2, "Tim B", "SD", 0)];
        let judges = vec![Judge::new("j1", "Juri 1"), Judge::new("j2", "Juri 2")];
        let result = format_tsv(&rows, &judges);
        assert_eq!(result, "1\t175\tTim A\tSMP\t175\t0\n2\t0\tTim B\tSD\t0\t0");
    }

    #[test]
    fn test_format_tsv_empty() {
        assert_eq!(format_tsv(&[], &[]), "");
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Short", 20), "Short");
        assert_eq!(truncate_name("Pasukan Garuda Muda", 10), "Pasukan...");
        assert_eq!(truncate_name("Hello world", 3), "Hel");
    }

    #[test]
    fn test_score_sheet_marks_unscored_cells() {
        let mut participant = Participant::new("a", "Tim A", "SD");
        participant.scores.set("j1", 1, 40);
        participant.scores.set("j1", 2, 0);
        let judges = vec![Judge::new("j1", "Juri 1"), Judge::new("j2", "Juri 2")];
        let c1 = criterion(1, "Hormat");
        let c2 = criterion(2, "Hitung");

        let sheet = format_score_sheet(&participant, &judges, &[&c1, &c2], false);
        let lines: Vec<&str> = sheet.lines().collect();

        assert_eq!(lines[0], "Tim A (SD)");
        assert!(lines[2].contains("Hormat"));
        assert!(lines[2].trim_end().ends_with('-'));
        assert!(lines[3].contains(" 0 "));
        assert!(lines[4].contains("Total"));
        assert!(lines[4].contains("40"));
    }

    #[test]
    fn test_score_sheet_without_criteria() {
        let participant = Participant::new("a", "Tim A", "TK");
        let sheet = format_score_sheet(&participant, &[], &[], false);
        assert!(sheet.contains("No criteria"));
    }
}
