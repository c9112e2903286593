use anyhow::Context;
use clap::Parser;
use compose_redeploy::core::plan::render_plan;
use compose_redeploy::domain::ports::ConfigProvider;
use compose_redeploy::utils::{logger, validation::Validate};
use compose_redeploy::{
    exit_codes, CliConfig, DeployDriver, DeployReport, HttpProbe, ProcessRunner, StepOutcome,
};
use std::path::Path;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // Logging
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    // Defaults < deploy file < flags, then validate
    let config = match cli.resolve().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(exit_codes::FAILED);
        }
    };

    // Dry run: print the plan only
    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no engine commands will be issued");
        print!("{}", render_plan(&config));
        return;
    }

    let driver = DeployDriver::new(config, ProcessRunner::new(), HttpProbe::new());
    let report = driver.run().await;

    // Run report
    if let Some(path) = &cli.report {
        if let Err(e) = write_report(&report, path) {
            tracing::error!("Failed to write run report: {:#}", e);
            eprintln!("⚠️  Could not write run report: {:#}", e);
        }
    }

    // Summary
    for record in report.warnings() {
        if let StepOutcome::Warning { message } = &record.outcome {
            println!("⚠️  {}: {}", record.step, message);
        }
    }

    let exit_code = report.exit_code();
    match report.into_result() {
        Ok(_) => {
            println!(
                "✅ '{}' redeployed and running",
                driver.config().service_name()
            );
        }
        Err(e) => {
            tracing::error!("❌ Deployment failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        }
    }

    std::process::exit(exit_code);
}

fn write_report(report: &DeployReport, path: &Path) -> anyhow::Result<()> {
    let payload = report.to_json_pretty().context("serialize run report")?;
    std::fs::write(path, payload).with_context(|| format!("write {}", path.display()))?;
    tracing::info!("📁 Run report saved to: {}", path.display());
    Ok(())
}
