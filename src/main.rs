use anyhow::Context;
use bookrec::app::report::{render, render_users};
use bookrec::core::CatalogStore;
use bookrec::utils::error::ErrorSeverity;
use bookrec::utils::{logger, monitor::ResourceMonitor};
use bookrec::{build_engine, AppConfig, CliConfig, Command, RecError};
use clap::Parser;
use std::io::Write;

fn exit_on_error(e: &RecError) -> ! {
    tracing::error!(
        "❌ Recommendation failed: {} (Category: {:?}, Severity: {:?})",
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
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }
    tracing::info!("Starting bookrec CLI");
    tracing::debug!("CLI config: {:?}", cli);

    let config: AppConfig = match cli.load_app_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            exit_on_error(&e);
        }
    };

    // 先驗證查詢參數，避免白白載入模型
    let query = match cli.query(&config) {
        Ok(query) => query,
        Err(e) => exit_on_error(&e),
    };

    let mut monitor = ResourceMonitor::new(cli.monitor);
    if monitor.is_enabled() {
        tracing::info!("🔍 Resource monitoring enabled");
    }

    let engine = match build_engine(&config).await {
        Ok(engine) => engine,
        Err(e) => exit_on_error(&e),
    };
    monitor.log_phase("Assets loaded");

    let output = match (&cli.command, query) {
        (Command::Users { limit }, _) => render_users(engine.catalog().all_user_ids(), *limit, config.output.format),
        (_, Some(query)) => engine
            .run(&query)
            .and_then(|outcome| render(&outcome, config.output.format)),
        (_, None) => Ok(String::new()),
    };
    monitor.log_phase("Query finished");

    match output {
        Ok(text) => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .context("failed to write results to stdout")?;
            stdout.flush().context("failed to flush stdout")?;
        }
        Err(e) => exit_on_error(&e),
    }

    Ok(())
}
