use clap::Parser;
use dateprefix::cancel::CancelToken;
use dateprefix::cli::Args;
use dateprefix::config::Config;
use dateprefix::date_source::DateResolver;
use dateprefix::error::{AppError, ExitCode};
use dateprefix::execute::execute_plan;
use dateprefix::history::{HistoryStore, JsonHistoryStore};
use dateprefix::logging;
use dateprefix::output::{
    display_conflicts, display_execution_result, display_history, display_plan, display_undo_outcome,
    display_undo_result,
};
use dateprefix::plan::PlanBuilder;
use dateprefix::progress::{should_use_colors, Progress};
use dateprefix::undo::{undo_entry, undo_last, UndoOutcome};
use std::io;
use tracing::{debug, error, info};

fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    logging::init(args.verbose);

    let config = Config::from_env().with_history_override(args.history_file.as_deref());
    debug!(history = %config.history_path.display(), ffprobe = %config.ffprobe.display(), "Configuration loaded");

    match run(&args, &config) {
        Ok(ExitCode::Success) => {}
        Ok(code) => std::process::exit(code.into()),
        Err(e) => {
            let e = e.with_history_path(config.history_path.clone());
            error!("{}", e);
            eprintln!("\nError: {}", e.detailed_message());
            std::process::exit(e.exit_code().into());
        }
    }
}

fn run(args: &Args, config: &Config) -> Result<ExitCode, AppError> {
    let history = JsonHistoryStore::new(&config.history_path);
    let cancel = CancelToken::new();
    let mut progress = Progress::new_with_ui(args.verbose > 0, should_use_colors());
    let mut stdout = io::stdout();

    if args.history {
        let entries = history.entries()?;
        display_history(&entries, &mut stdout).map_err(display_failed)?;
        return Ok(ExitCode::Success);
    }

    if let Some(id) = &args.undo_id {
        info!(id = %id, "Undo mode");
        let result = undo_entry(id, &history, &cancel, &mut progress)?;
        display_undo_result(&result, &mut stdout).map_err(display_failed)?;
        return Ok(if result.errors > 0 {
            ExitCode::ItemErrors
        } else {
            ExitCode::Success
        });
    }

    if args.undo {
        info!("Undo mode: last batch");
        let outcome = undo_last(&history, &cancel, &mut progress)?;
        display_undo_outcome(&outcome, &mut stdout).map_err(display_failed)?;
        return Ok(match outcome {
            UndoOutcome::Completed(result) if result.errors > 0 => ExitCode::ItemErrors,
            _ => ExitCode::Success,
        });
    }

    let Some(target) = &args.target else {
        return Err(AppError::Other("No target given".to_string()));
    };

    let options = args.rename_options();
    let builder = PlanBuilder::new(DateResolver::with_default_providers(&config.ffprobe));
    let plan = builder.build(target, &options, &cancel)?;

    info!(
        items = plan.len(),
        renames = plan.rename_count(),
        conflicts = plan.conflict_count(),
        "Plan built"
    );

    if args.conflicts {
        display_conflicts(&plan, &mut stdout).map_err(display_failed)?;
        return Ok(ExitCode::Success);
    }

    let result = if args.dry {
        display_plan(&plan, &mut stdout).map_err(display_failed)?;
        execute_plan(&plan, true, &history, &cancel, &mut Progress::silent())?
    } else {
        execute_plan(&plan, false, &history, &cancel, &mut progress)?
    };

    display_execution_result(&result, &mut stdout).map_err(display_failed)?;

    if result.cancelled {
        Ok(ExitCode::Cancelled)
    } else if result.errors > 0 {
        Ok(ExitCode::ItemErrors)
    } else {
        Ok(ExitCode::Success)
    }
}

fn display_failed(e: io::Error) -> AppError {
    AppError::Other(format!("Failed to display output: {}", e))
}
