//! Speedtest Logger - Main CLI Application
//!
//! Runs one speed test, appends the result to the CSV log and mirrors the
//! log to Google Drive. Meant to be scheduled (cron, systemd timer).

use clap::Parser;
use speedtest_logger::{
    cli::Cli,
    config::{display_config_summary, load_config, EnvManager},
    error::{AppError, Result},
    logging::LoggerFactory,
    App,
};
use std::process;

#[tokio::main]
async fn main() {
    // Set up better panic handling
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(99);
    }));

    let cli = Cli::parse();
    let use_color = cli.use_colors();

    if let Err(e) = run_application(cli).await {
        eprintln!("{}", e.format_for_console(use_color));
        print_error_suggestions(&e);

        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    if cli.debug {
        println!("{}", speedtest_logger::version_info());
        println!("Debug mode enabled");
        println!();
    }

    let config = load_config(cli)?;

    if config.debug {
        println!("Configuration Summary:");
        println!("{}", display_config_summary(&config));
        println!();
    }

    let factory = LoggerFactory::new(config.clone());
    let app = App::with_factory(config, &factory).await;
    let report = app.run().await?;

    if app.config().verbose || app.config().debug {
        if let Some(reason) = report.outcome.failure_reason() {
            println!("Measurement failed: {}", reason);
        }
        println!("Log: {} ({:?})", report.log_path.display(), report.append);
        match &report.uploaded_file {
            Some(file) => println!(
                "Uploaded: {} (id {}, {} previous cop{} removed)",
                file.name,
                file.id,
                report.deleted_files,
                if report.deleted_files == 1 { "y" } else { "ies" }
            ),
            None => println!("Upload: skipped"),
        }
    }

    Ok(())
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    eprintln!();
    eprintln!("Suggestion: {}", error.suggestion());

    if let AppError::Config(_) = error {
        eprintln!();
        eprintln!("{}", EnvManager::display_env_help());
    }
}
