use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use judgeboard::commands::{Command, Created};
use judgeboard::model::{
    parse_score_list, CategoryId, CriterionDraft, CriterionId, LevelStyle, PerformanceLevelDraft,
    Score, ScoreTable,
};
use judgeboard::scoring::LevelFilter;
use judgeboard::store::DocumentStore;
use judgeboard::sync::{Outcome, Scoreboard};

const EXIT_SUCCESS: i32 = 0;
const EXIT_USAGE: i32 = 2;
const EXIT_CONFIG: i32 = 4;
const EXIT_STORE: i32 = 5;
const EXIT_PARTIAL: i32 = 6;

type Board = Scoreboard<DocumentStore>;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the leaderboard (default if no subcommand)
    Rank {
        /// Bracket to rank, or "all"
        #[arg(default_value = "all")]
        level: String,
        #[arg(short, long, value_enum, default_value_t = Format::Table)]
        format: Format,
    },
    /// Write the printable HTML report
    Export {
        /// Bracket to export, or "all"
        #[arg(default_value = "all")]
        level: String,
        /// Output file
        #[arg(short, long, default_value = "rekap.html")]
        output: PathBuf,
        /// Open the report in the browser for printing
        #[arg(long)]
        open: bool,
    },
    /// Manage participants
    #[command(subcommand)]
    Participant(ParticipantCommand),
    /// Manage judges
    #[command(subcommand)]
    Judge(JudgeCommand),
    /// Record scores
    #[command(subcommand)]
    Score(ScoreCommand),
    /// Edit a bracket's rubric
    #[command(subcommand)]
    Criterion(CriterionCommand),
    /// Manage performance levels
    #[command(subcommand)]
    PerfLevel(PerfLevelCommand),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Table,
    Tsv,
}

#[derive(Subcommand, Debug)]
enum ParticipantCommand {
    List,
    Add {
        name: String,
        #[arg(short, long)]
        level: String,
    },
    Update {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        level: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
enum JudgeCommand {
    List,
    Add { name: String },
    Update { id: String, name: String },
    /// Delete a judge and every score it recorded
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
enum ScoreCommand {
    /// Record a score; giving the same value again clears it
    Toggle {
        participant: String,
        judge: String,
        criterion: CriterionId,
        #[arg(allow_negative_numbers = true)]
        value: Score,
    },
    /// Show a participant's score sheet
    Show { participant: String },
}

#[derive(Args, Debug)]
struct RubricTarget {
    /// Bracket whose rubric is edited
    #[arg(short, long)]
    level: String,
    #[arg(short = 'k', long, default_value_t = 1)]
    category: CategoryId,
}

#[derive(Subcommand, Debug)]
enum CriterionCommand {
    List {
        #[arg(short, long)]
        level: String,
    },
    Add {
        #[command(flatten)]
        target: RubricTarget,
        name: String,
        /// Permitted scores per performance level, e.g. level-1=40,45,50
        #[arg(short, long = "scores", value_name = "LEVEL=LIST")]
        scores: Vec<String>,
    },
    Update {
        #[command(flatten)]
        target: RubricTarget,
        id: CriterionId,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long = "scores", value_name = "LEVEL=LIST")]
        scores: Vec<String>,
    },
    /// Delete a criterion and every score recorded for it in that bracket
    Delete {
        #[command(flatten)]
        target: RubricTarget,
        id: CriterionId,
    },
}

#[derive(Subcommand, Debug)]
enum PerfLevelCommand {
    List,
    Add {
        name: String,
        #[arg(long, default_value = "bg-gray-500")]
        color: String,
        #[arg(long, default_value = "text-white")]
        text_color: String,
    },
    Update {
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        text_color: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Parser, Debug)]
#[command(name = "judgeboard")]
#[command(about = "Multi-judge scoring with a live leaderboard", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/judgeboard/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Shared document file (overrides store_path from the config)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Rank {
        level: "all".to_string(),
        format: Format::Table,
    });

    // Load and validate config
    let config = match judgeboard::config::load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    if let Err(errors) = judgeboard::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let level = match (&config.log_level, cli.verbose) {
        (_, true) | (None, false) => judgeboard::logging::default_log_level(cli.verbose),
        (Some(level), false) => level.as_str(),
    };
    if let Err(e) = judgeboard::logging::init_logging(level, config.log_dir.as_deref()) {
        eprintln!("Logging error: {:#}", e);
        std::process::exit(EXIT_CONFIG);
    }

    // Open the shared document
    let store_path = match cli.store {
        Some(path) => path,
        None => match judgeboard::config::resolve_store_path(&config) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Config error: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
        },
    };
    let store = match DocumentStore::open(&store_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Store error: {:#}", e);
            std::process::exit(EXIT_STORE);
        }
    };
    if cli.verbose {
        eprintln!("Using store at {}", store_path.display());
    }

    let board: Board = Scoreboard::new(Arc::new(store), judgeboard::config::retry_policy(&config));
    if let Err(e) = board.refresh().await {
        eprintln!("Store error: {:#}", e);
        std::process::exit(EXIT_STORE);
    }

    let use_colors = judgeboard::output::should_use_colors();

    let code = match command {
        Commands::Rank { level, format } => {
            let filter: LevelFilter = level.parse().unwrap_or(LevelFilter::All);
            let ranked = board.rank(&filter);
            let output = match format {
                Format::Table => judgeboard::output::format_leaderboard(&ranked, use_colors),
                Format::Tsv => judgeboard::output::format_tsv(&ranked, &board.snapshot().judges),
            };
            if !output.is_empty() {
                println!("{}", output);
            }
            EXIT_SUCCESS
        }
        Commands::Export { level, output, open } => {
            let filter: LevelFilter = level.parse().unwrap_or(LevelFilter::All);
            let options = judgeboard::output::ReportOptions {
                title: &config.report.title,
                brackets: &config.brackets,
                generated_at: chrono::Local::now(),
            };
            let html = judgeboard::output::render_report(&board.snapshot(), &filter, &options);
            if let Err(e) = judgeboard::output::write_report(&output, &html) {
                eprintln!("Export failed: {:#}", e);
                std::process::exit(EXIT_STORE);
            }
            println!("Report written to {}", output.display());

            if open {
                if let Err(e) = judgeboard::browser::open_report(&output) {
                    eprintln!("Failed to open browser: {:#}", e);
                }
            }
            EXIT_SUCCESS
        }
        Commands::Participant(cmd) => participant(&board, cmd).await,
        Commands::Judge(cmd) => judge(&board, cmd).await,
        Commands::Score(cmd) => score(&board, cmd, use_colors).await,
        Commands::Criterion(cmd) => criterion(&board, cmd).await,
        Commands::PerfLevel(cmd) => perf_level(&board, cmd).await,
    };

    std::process::exit(code);
}

async fn participant(board: &Board, cmd: ParticipantCommand) -> i32 {
    let state = board.snapshot();
    let command = match cmd {
        ParticipantCommand::List => {
            for p in &state.participants {
                println!("{}\t{}\t{}", p.id, p.level, p.name);
            }
            return EXIT_SUCCESS;
        }
        ParticipantCommand::Add { name, level } => Command::AddParticipant { name, level },
        ParticipantCommand::Update { id, name, level } => {
            let Some(existing) = state.participant(&id) else {
                return not_found("participant", &id);
            };
            Command::UpdateParticipant {
                name: name.unwrap_or_else(|| existing.name.clone()),
                level: level.unwrap_or_else(|| existing.level.clone()),
                id,
            }
        }
        ParticipantCommand::Delete { id } => Command::DeleteParticipant { id },
    };
    run(board, command).await
}

async fn judge(board: &Board, cmd: JudgeCommand) -> i32 {
    let command = match cmd {
        JudgeCommand::List => {
            for j in &board.snapshot().judges {
                println!("{}\t{}", j.id, j.name);
            }
            return EXIT_SUCCESS;
        }
        JudgeCommand::Add { name } => Command::AddJudge { name },
        JudgeCommand::Update { id, name } => Command::UpdateJudge { id, name },
        JudgeCommand::Delete { id } => Command::DeleteJudge { id },
    };
    run(board, command).await
}

async fn score(board: &Board, cmd: ScoreCommand, use_colors: bool) -> i32 {
    match cmd {
        ScoreCommand::Show { participant } => {
            let state = board.snapshot();
            let Some(p) = state.participant(&participant) else {
                return not_found("participant", &participant);
            };
            let criteria = state.rubric.criteria_for(&p.level);
            println!(
                "{}",
                judgeboard::output::format_score_sheet(p, &state.judges, &criteria, use_colors)
            );
            EXIT_SUCCESS
        }
        ScoreCommand::Toggle {
            participant,
            judge,
            criterion,
            value,
        } => {
            let state = board.snapshot();
            if state.participant(&participant).is_none() {
                return not_found("participant", &participant);
            }
            if state.judge(&judge).is_none() {
                return not_found("judge", &judge);
            }
            let permitted = state
                .participant(&participant)
                .map(|p| state.rubric.criteria_for(&p.level))
                .and_then(|criteria| criteria.into_iter().find(|c| c.id == criterion).cloned());
            match permitted {
                None => eprintln!(
                    "Warning: criterion {} is not in this participant's rubric",
                    criterion
                ),
                Some(c) if !c.permits(value) => eprintln!(
                    "Warning: {} is not a listed score for '{}' ({:?})",
                    value,
                    c.name,
                    c.permitted_scores()
                ),
                Some(_) => {}
            }

            let code = run(
                board,
                Command::ToggleScore {
                    participant: participant.clone(),
                    judge: judge.clone(),
                    criterion,
                    score: value,
                },
            )
            .await;
            if code == EXIT_SUCCESS {
                let recorded = board
                    .snapshot()
                    .participant(&participant)
                    .and_then(|p| p.scores.get(&judge, criterion));
                match recorded {
                    Some(v) => println!("Recorded {}", v),
                    None => println!("Cleared"),
                }
            }
            code
        }
    }
}

async fn criterion(board: &Board, cmd: CriterionCommand) -> i32 {
    let state = board.snapshot();
    let command = match cmd {
        CriterionCommand::List { level } => {
            if !state.rubric.has_level(&level) {
                return not_found("bracket", &level);
            }
            for category in state.rubric.categories(&level) {
                println!("[{}] {}", category.id, category.name);
                for c in &category.criteria {
                    println!("  {:>3}. {}  {:?}", c.id, c.name, c.scores);
                }
            }
            return EXIT_SUCCESS;
        }
        CriterionCommand::Add {
            target,
            name,
            scores,
        } => {
            let scores = match parse_score_args(&scores) {
                Ok(s) => s,
                Err(e) => return usage(&e),
            };
            Command::AddCriterion {
                level: target.level,
                category: target.category,
                draft: CriterionDraft { name, scores },
            }
        }
        CriterionCommand::Update {
            target,
            id,
            name,
            scores,
        } => {
            let Some(existing) = state
                .rubric
                .category(&target.level, target.category)
                .and_then(|c| c.criteria.iter().find(|c| c.id == id))
            else {
                return not_found("criterion", &id.to_string());
            };
            let mut updated = existing.clone();
            if let Some(name) = name {
                updated.name = name;
            }
            match parse_score_args(&scores) {
                Ok(table) => updated.scores.extend(table),
                Err(e) => return usage(&e),
            }
            Command::UpdateCriterion {
                level: target.level,
                category: target.category,
                criterion: updated,
            }
        }
        CriterionCommand::Delete { target, id } => Command::DeleteCriterion {
            level: target.level,
            category: target.category,
            criterion: id,
        },
    };
    run(board, command).await
}

async fn perf_level(board: &Board, cmd: PerfLevelCommand) -> i32 {
    let state = board.snapshot();
    let command = match cmd {
        PerfLevelCommand::List => {
            for l in &state.performance_levels {
                println!("{}\t{}\t{} {}", l.id, l.name, l.style.color, l.style.text_color);
            }
            return EXIT_SUCCESS;
        }
        PerfLevelCommand::Add {
            name,
            color,
            text_color,
        } => Command::AddPerformanceLevel {
            draft: PerformanceLevelDraft {
                name,
                style: LevelStyle { color, text_color },
            },
        },
        PerfLevelCommand::Update {
            id,
            name,
            color,
            text_color,
        } => {
            let Some(existing) = state.performance_level(&id) else {
                return not_found("performance level", &id);
            };
            let mut level = existing.clone();
            if let Some(name) = name {
                level.name = name;
            }
            if let Some(color) = color {
                level.style.color = color;
            }
            if let Some(text_color) = text_color {
                level.style.text_color = text_color;
            }
            Command::UpdatePerformanceLevel { level }
        }
        PerfLevelCommand::Delete { id } => Command::DeletePerformanceLevel { id },
    };
    run(board, command).await
}

/// Execute a command, report failed writes and pick the exit code
async fn run(board: &Board, command: Command) -> i32 {
    let name = command.name();
    let Outcome { created, report } = match board.execute(command).await {
        Ok(o) => o,
        Err(e) => {
            eprintln!("{} failed: {:#}", name, e);
            return EXIT_STORE;
        }
    };

    if report.applied.is_empty() && report.failed.is_empty() {
        println!("Nothing to do");
        return EXIT_SUCCESS;
    }
    match created {
        Some(Created::Participant(id))
        | Some(Created::Judge(id))
        | Some(Created::PerformanceLevel(id)) => println!("Created {}", id),
        Some(Created::Criterion(id)) => println!("Created criterion {}", id),
        None => {}
    }

    if !report.is_complete() {
        eprintln!(
            "{} of {} write(s) failed; re-run the command to repair:",
            report.failed.len(),
            report.failed.len() + report.applied.len()
        );
        for (write, e) in &report.failed {
            eprintln!("  - {}: {}", write, e);
        }
        return EXIT_PARTIAL;
    }

    // Pick up the store's echo of the change
    if let Err(e) = board.refresh().await {
        eprintln!("Store error: {:#}", e);
        return EXIT_STORE;
    }
    EXIT_SUCCESS
}

/// Parse repeated `LEVEL=LIST` arguments into a score table
fn parse_score_args(args: &[String]) -> Result<ScoreTable, String> {
    let mut table = ScoreTable::new();
    for arg in args {
        let Some((level, list)) = arg.split_once('=') else {
            return Err(format!("expected LEVEL=LIST, got '{}'", arg));
        };
        table.insert(level.trim().to_string(), parse_score_list(list));
    }
    Ok(table)
}

fn not_found(kind: &str, id: &str) -> i32 {
    eprintln!("No {} with id '{}'", kind, id);
    EXIT_USAGE
}

fn usage(message: &str) -> i32 {
    eprintln!("{}", message);
    EXIT_USAGE
}
