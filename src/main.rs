use clap::Parser;
use linkledger::cli::{Cli, Command, DeleteArgs, DiffArgs, IngestArgs, ReportArgs};
use linkledger::config::Config;
use linkledger::model::{ReportId, ReportSubmission};
use linkledger::render::{self, Format};
use linkledger::store::diff;
use linkledger::store::history::History;
use linkledger::store::{Store, StoreError};

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn parse_report_id(input: &str) -> ReportId {
    ReportId::parse(input).unwrap_or_else(|_| {
        eprintln!("Invalid report id: '{input}'. Must be a UUID.");
        std::process::exit(1);
    })
}

fn read_submission(input: &str) -> Result<ReportSubmission, Box<dyn std::error::Error>> {
    let raw = if input == "-" {
        std::io::read_to_string(std::io::stdin())?
    } else {
        std::fs::read_to_string(input)?
    };
    Ok(serde_json::from_str(&raw)?)
}

fn run_ingest(store: &mut Store, args: &IngestArgs) {
    let submission = match read_submission(&args.input) {
        Ok(submission) => submission,
        Err(e) => {
            eprintln!("Error reading report payload: {e}");
            std::process::exit(1);
        }
    };

    match store.save(&submission) {
        Ok(report_id) => {
            println!("{report_id}");
        }
        Err(StoreError::DuplicateTimestamp(report_date)) => {
            eprintln!("A report already exists for {report_date}. Submit with a new timestamp.");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error saving report: {e}");
            std::process::exit(1);
        }
    }
}

fn run_report(store: &Store, args: &ReportArgs) {
    let format = Format::from_flags(args.json, args.csv);

    if args.list {
        match store.list_summaries() {
            Ok(summaries) => render::print_summaries(&summaries, format),
            Err(e) => {
                eprintln!("Error listing reports: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let report_id = match &args.id {
        Some(id_str) => parse_report_id(id_str),
        None => match History::new(store).latest() {
            Ok(summary) => summary.report_id,
            Err(StoreError::NotFound) => {
                eprintln!("No reports stored. Run 'linkledger ingest' to add one.");
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("Error finding latest report: {e}");
                std::process::exit(1);
            }
        },
    };

    match store.load(report_id) {
        Ok(snapshot) => render::print_report(&snapshot, format),
        Err(StoreError::NotFound) => {
            eprintln!("Report {report_id} not found.");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error loading report: {e}");
            std::process::exit(1);
        }
    }
}

fn run_diff(store: &Store, args: &DiffArgs) {
    let format = Format::from_flags(args.json, args.csv);

    match diff::diff_latest(store) {
        Ok(diff) => render::print_diff(&diff, format),
        Err(StoreError::InsufficientData) => {
            eprintln!("Need at least 2 reports to compare. Ingest another report first.");
            std::process::exit(1);
        }
        Err(StoreError::NoReportData) => {
            eprintln!("No report data stored. Run 'linkledger ingest' to add one.");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error diffing reports: {e}");
            std::process::exit(1);
        }
    }
}

fn run_delete(store: &mut Store, args: &DeleteArgs) {
    let report_id = parse_report_id(&args.id);

    match store.exists(report_id) {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("Report {report_id} not found.");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error checking report: {e}");
            std::process::exit(1);
        }
    }

    if let Err(e) = store.delete(report_id) {
        eprintln!("Error deleting report: {e}");
        std::process::exit(1);
    }
    println!("Deleted report {report_id}.");
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::resolve(cli.db.clone(), cli.verbose) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error resolving database path: {e}");
            std::process::exit(1);
        }
    };
    init_logging(config.verbose);

    let mut store = match Store::open(&config.db_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error opening database: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Ingest(args) => run_ingest(&mut store, &args),
        Command::Report(args) => run_report(&store, &args),
        Command::Diff(args) => run_diff(&store, &args),
        Command::Delete(args) => run_delete(&mut store, &args),
        Command::Clear(args) => {
            if !args.yes {
                eprintln!("This wipes every stored report. Re-run with --yes to confirm.");
                std::process::exit(1);
            }
            if let Err(e) = store.clear_all() {
                eprintln!("Error clearing reports: {e}");
                std::process::exit(1);
            }
            println!("All report data deleted.");
        }
    }
}
