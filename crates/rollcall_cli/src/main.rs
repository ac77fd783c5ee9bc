//! Command-line front end for `rollcall_core`.
//!
//! # Responsibility
//! - Open the local store, seed it and print schedules and reports.
//! - Hand CSV exports to a directory-backed export sink.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use rollcall_core::db::open_db;
use rollcall_core::report::DEFAULT_EXPORT_FILENAME;
use rollcall_core::service::report_service::{ExportOutcome, ReportService};
use rollcall_core::service::schedule_service::ScheduleService;
use rollcall_core::service::seed::seed_database;
use rollcall_core::service::stage_service::StageService;
use rollcall_core::{
    default_log_level, init_logging, FileExportSink, KvSchoolRepository, Report, SqliteKvStore,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "rollcall", version, about = "School schedule and attendance tracker")]
struct Cli {
    /// Store database file; created when missing.
    #[arg(long, default_value = "rollcall.db")]
    db: PathBuf,

    /// Absolute directory for rolling log files. Logging is off when unset.
    #[arg(long)]
    log_dir: Option<String>,

    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fill missing collections with default data.
    Seed,
    /// List stages.
    Stages,
    /// Print the weekly schedule of one stage.
    Schedule { stage_id: i64 },
    /// Print attendance statistics.
    Report,
    /// Write all attendance as CSV.
    Export {
        /// Target directory.
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value = DEFAULT_EXPORT_FILENAME)]
        filename: String,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Seed => "seed",
            Self::Stages => "stages",
            Self::Schedule { .. } => "schedule",
            Self::Report => "report",
            Self::Export { .. } => "export",
        }
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).map_err(anyhow::Error::msg)?;
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open store `{}`", cli.db.display()))?;
    let repo = KvSchoolRepository::new(SqliteKvStore::try_new(&conn)?);
    info!(
        "event=cli_command module=cli status=start command={}",
        cli.command.name()
    );

    match cli.command {
        Command::Seed => {
            let summary = seed_database(&repo)?;
            if summary.is_noop() {
                println!("store already seeded");
            } else {
                let keys: Vec<&str> = summary.seeded_keys.iter().map(|key| key.as_str()).collect();
                println!("seeded: {}", keys.join(", "));
            }
        }
        Command::Stages => {
            for stage in StageService::new(repo).list_stages()? {
                println!("{}\t{}", stage.id, stage.name);
            }
        }
        Command::Schedule { stage_id } => {
            let week = ScheduleService::new(repo).weekly_schedule(stage_id)?;
            if week.is_empty() {
                println!("no lectures scheduled for stage {stage_id}");
            }
            for day in week.days.iter().filter(|day| !day.lectures.is_empty()) {
                println!("{}", day.day);
                for lecture in &day.lectures {
                    println!(
                        "  {}  {} ({})  next: {}",
                        lecture.time,
                        lecture.subject,
                        lecture.instructor_name.as_deref().unwrap_or("unassigned"),
                        if lecture.next_topic.is_empty() {
                            "-"
                        } else {
                            lecture.next_topic.as_str()
                        }
                    );
                }
            }
        }
        Command::Report => match ReportService::new(repo).summary()? {
            Report::NoData => println!("no attendance recorded yet"),
            Report::Ready(summary) => {
                println!("attendance by stage:");
                for stage in &summary.stage_percentages {
                    println!("  {}: {:.2}%", stage.stage_name, stage.percentage);
                }
                println!("most absent subject: {}", summary.most_absent_subject);
                println!("most absent day: {}", summary.most_absent_day);
            }
        },
        Command::Export { out, filename } => {
            let mut sink = FileExportSink::new(&out);
            match ReportService::new(repo).export_csv_as(&mut sink, &filename)? {
                ExportOutcome::NoData => println!("no attendance to export"),
                ExportOutcome::Exported { row_count, .. } => {
                    let path = sink.last_written().unwrap_or(out.as_path());
                    println!("exported {row_count} rows to {}", path.display());
                }
            }
        }
    }

    Ok(())
}
