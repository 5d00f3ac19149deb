use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobpilot::config::AppConfig;
use jobpilot::report;
use jobpilot::session::{runner, SessionOutcome};
use jobpilot::shutdown::AbortSignal;

#[derive(Parser)]
#[command(name = "jobpilot", about = "AI-powered job application agent")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Run the browser with a visible window regardless of configuration
    #[arg(long)]
    headed: bool,

    /// Disable the randomized delay between browser actions
    #[arg(long)]
    no_pacing: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if cli.headed {
        config.browser.headless = false;
    }
    if cli.no_pacing {
        config.pacing.enabled = false;
    }

    tracing::info!(
        site = %config.search.site,
        role = %config.search.role,
        location = %config.search.location,
        "Starting job application session"
    );

    let abort = AbortSignal::new();
    abort.install();

    let is_cancelled = {
        let abort = abort.clone();
        move || {
            let abort = abort.clone();
            async move { abort.is_aborted() }
        }
    };

    let outcome = runner::execute(&config, is_cancelled).await?;

    match outcome {
        SessionOutcome::Completed { report } => {
            println!("{}", report::render(&report));
            Ok(())
        }
        SessionOutcome::NarrativeRejected { raw, error } => {
            tracing::error!(error = %error, "Final narrative failed validation");
            eprintln!("The agent's final output did not validate: {error}");
            eprintln!("\nRaw narrative:\n{raw}");
            std::process::exit(1);
        }
        SessionOutcome::Cancelled => {
            tracing::warn!("Session cancelled before completion");
            std::process::exit(130);
        }
        SessionOutcome::Failed { error } => {
            tracing::error!(error = %error, "Session failed");
            eprintln!("Session failed: {error}");
            std::process::exit(1);
        }
    }
}
