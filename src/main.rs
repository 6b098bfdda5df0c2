use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use log::{error, info, warn};

use timegrid::cycles::{self, parse_date, CycleType};
use timegrid::export::{build_export, ExportFormat, ExportRange};
use timegrid::summary::{filter_by_date_range, summarize, summarize_sorted};
use timegrid::{logging, storage, Project, Result, TimeEntry};

/// Timesheet periods and report exports.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the period containing a date
    Period {
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// semi-monthly, weekly, bi-weekly or monthly
        #[arg(short, long)]
        cycle: Option<String>,
        /// Move this many periods forward (or back when negative)
        #[arg(short, long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i32,
    },
    /// List the dates of the entry grid
    Grid {
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(short, long)]
        cycle: Option<String>,
    },
    /// Print summary totals as JSON
    Summary {
        #[command(flatten)]
        input: InputArgs,
        /// Label the date range by earliest and latest entry
        #[arg(long)]
        sorted: bool,
    },
    /// Render a CSV or JSON report
    Export {
        #[command(flatten)]
        input: InputArgs,
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// Directory to write into (defaults to the configured export dir)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print the report instead of writing a file
        #[arg(long)]
        stdout: bool,
    },
    /// Show or update the saved configuration
    Config {
        #[arg(long)]
        cycle: Option<String>,
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
}

#[derive(Debug, clap::Args)]
struct InputArgs {
    /// JSON array of time entries
    #[arg(short, long)]
    entries: PathBuf,
    /// JSON array of projects
    #[arg(short, long)]
    projects: Option<PathBuf>,
    #[arg(long, value_parser = parse_date)]
    start: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,
}

impl InputArgs {
    fn load(&self) -> Result<(Vec<TimeEntry>, Vec<Project>)> {
        let entries = storage::load_entries(&self.entries)?;
        let projects = match &self.projects {
            Some(path) => storage::load_projects(path)?,
            None => Vec::new(),
        };
        info!(
            "Loaded {} entries and {} projects",
            entries.len(),
            projects.len()
        );
        Ok((entries, projects))
    }

    /// A filename range needs both bounds; a single bound still filters.
    fn range(&self) -> Option<ExportRange> {
        match (self.start, self.end) {
            (Some(start_date), Some(end_date)) => Some(ExportRange {
                start_date,
                end_date,
            }),
            _ => None,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = logging::init(cli.verbose) {
        eprintln!("Failed to initialize logging: {err}");
    }

    let prefix = failure_prefix(&cli.command);
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:?}");
            eprintln!("{prefix}: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Period {
            date,
            cycle,
            offset,
        } => {
            let cycle_type = resolve_cycle(cycle);
            let date = cycles::shift_cycle(today_or(date), &cycle_type, offset);
            let period = cycles::cycle_period(date, &cycle_type);
            println!("{}", period.label_on(Local::now().date_naive()));
            println!("start: {}", period.start_date.format("%Y-%m-%d"));
            println!("end:   {}", period.end_of_day().format("%Y-%m-%d %H:%M:%S%.3f"));
            Ok(())
        }
        Command::Grid { date, cycle } => {
            let cycle_type = resolve_cycle(cycle);
            for day in cycles::grid_dates(today_or(date), &cycle_type) {
                println!("{}", day.format("%a %Y-%m-%d"));
            }
            Ok(())
        }
        Command::Summary { input, sorted } => {
            let (entries, projects) = input.load()?;
            let filtered = filter_by_date_range(&entries, input.start, input.end);
            let summary = if sorted {
                summarize_sorted(&filtered, &projects)
            } else {
                summarize(&filtered, &projects)
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Command::Export {
            input,
            format,
            out,
            stdout,
        } => {
            let (entries, projects) = input.load()?;
            let filtered = filter_by_date_range(&entries, input.start, input.end);
            let export = build_export(&filtered, &projects, format, input.range())?;
            if stdout {
                print!("{}", export.content);
                return Ok(());
            }
            let dir = out
                .or_else(storage::read_export_dir)
                .unwrap_or_else(|| PathBuf::from("."));
            let path = storage::write_export(&dir, &export)?;
            println!(
                "Wrote {} ({} entries, {:.2} hours)",
                path.display(),
                export.summary.total_entries,
                export.summary.total_hours
            );
            Ok(())
        }
        Command::Config { cycle, export_dir } => {
            if let Some(cycle) = cycle {
                storage::write_cycle_type(CycleType::from(cycle.as_str()))?;
            }
            if let Some(dir) = export_dir {
                storage::write_export_dir(dir)?;
            }
            let config = storage::read_config().unwrap_or_default();
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn resolve_cycle(cycle: Option<String>) -> CycleType {
    let cycle_type = cycle
        .map(CycleType::from)
        .or_else(storage::read_cycle_type)
        .unwrap_or_default();
    if !cycle_type.is_known() {
        let known = CycleType::KNOWN.map(|known| known.to_string()).join(", ");
        warn!("Unknown cycle type {cycle_type} (expected one of {known}), using single-day periods");
    }
    cycle_type
}

fn failure_prefix(command: &Command) -> &'static str {
    match command {
        Command::Export { .. } => "Export failed",
        _ => "Error",
    }
}

fn today_or(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(args: &[&str]) -> Command {
        let mut argv = vec!["timegrid"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn only_export_reports_export_failed() {
        assert_eq!(
            failure_prefix(&command(&["export", "--entries", "e.json"])),
            "Export failed"
        );
        assert_eq!(
            failure_prefix(&command(&["summary", "--entries", "e.json"])),
            "Error"
        );
        assert_eq!(failure_prefix(&command(&["config"])), "Error");
        assert_eq!(
            failure_prefix(&command(&["period", "--cycle", "weekly"])),
            "Error"
        );
    }

    #[test]
    fn resolve_cycle_keeps_unknown_names() {
        assert_eq!(
            resolve_cycle(Some("quarterly".to_string())),
            CycleType::Unknown("quarterly".to_string())
        );
        assert_eq!(
            resolve_cycle(Some("bi-weekly".to_string())),
            CycleType::BiWeekly
        );
    }

    #[test]
    fn period_offset_accepts_negative_numbers() {
        match command(&["period", "--cycle", "weekly", "--offset", "-2"]) {
            Command::Period { offset, .. } => assert_eq!(offset, -2),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
