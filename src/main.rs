use clap::Parser;
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;
use wash_booking::app::{build_orchestrator, build_state, server};
use wash_booking::config::Command;
use wash_booking::core::quote::{QuoteCalculator, QuoteUpdate};
use wash_booking::domain::model::{JobRequestPayload, SubmissionOutcome};
use wash_booking::utils::error::{BookingError, ErrorSeverity};
use wash_booking::utils::logger;
use wash_booking::{BookingConfig, CliConfig, PriceTable, SubmissionResponse};

/// 大於郵件服務的請求逾時上限
const NOTIFICATION_DRAIN_TIMEOUT: Duration = Duration::from_secs(310);

fn print_quote(update: &QuoteUpdate) {
    match (update.inside_outside, update.outside_only) {
        (Some(inside_outside), Some(outside_only)) => println!(
            "🪟 {} panes: inside+outside ${:.2} | outside only ${:.2} | ~{} h",
            update.pane_count, inside_outside, outside_only, update.duration_hours
        ),
        _ => println!(
            "🪟 {} panes: {}",
            update.pane_count,
            update.message.as_deref().unwrap_or("no price for this pane count")
        ),
    }
}

fn run_quote(panes: &[String], table: Option<&str>) -> Result<(), BookingError> {
    let table = match table {
        Some(path) => PriceTable::from_csv_path(path)?,
        None => PriceTable::standard(),
    };
    let mut calculator = QuoteCalculator::new(table).on_change(print_quote);

    if panes.is_empty() {
        // 互動模式：每行一個窗格數
        print_quote(&calculator.current());
        for line in std::io::stdin().lock().lines() {
            calculator.set_input(&line?);
        }
    } else {
        for input in panes {
            calculator.set_input(input);
        }
    }
    Ok(())
}

async fn run_submit(config: &BookingConfig, file: &str) -> Result<SubmissionOutcome, BookingError> {
    let orchestrator = build_orchestrator(config)?;
    let content = std::fs::read_to_string(file)?;
    let payload: JobRequestPayload = serde_json::from_str(&content)?;

    // 程序結束前等通知送完
    let outcome = orchestrator
        .submit_tracked(&payload)
        .await
        .settle(NOTIFICATION_DRAIN_TIMEOUT)
        .await;
    Ok(outcome)
}

async fn run(cli: &CliConfig) -> Result<(), BookingError> {
    match &cli.command {
        Command::Quote { panes, table } => run_quote(panes, table.as_deref()),
        Command::Serve { bind } => {
            let config = BookingConfig::from_file(&cli.config)?;
            let bind = bind.clone().unwrap_or_else(|| config.server.bind.clone());
            let state = Arc::new(build_state(&config)?);
            server::serve(state, &bind).await
        }
        Command::Submit { file } => {
            let config = BookingConfig::from_file(&cli.config)?;
            let outcome = run_submit(&config, file).await?;
            let response = SubmissionResponse::from(&outcome);
            println!("{}", serde_json::to_string_pretty(&response)?);
            match outcome {
                SubmissionOutcome::ValidationError(e) | SubmissionOutcome::RecordServiceError(e) => {
                    Err(e)
                }
                _ => Ok(()),
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting wash-booking");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ wash-booking failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };

        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
