//! locfix demo binary
//!
//! Runs one single-shot location request against a scripted provider
//! scenario and prints the outcome. Useful for exercising the
//! coordinator end to end and for watching its structured log output:
//!
//! ```text
//! RUST_LOG=debug locfix --scenario coarse
//! ```

use clap::{Parser, ValueEnum};
use locfix::domain::{AuthorizationLevel, AuthorizationStatus, LocationFix, ProviderError};
use locfix::infra::Config;
use locfix::io::SimulatedProvider;
use locfix::services::SingleRequestLocationCoordinator;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

/// locfix - single-shot location acquisition demo
#[derive(Parser, Debug)]
#[command(name = "locfix", version, about)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "config/dev.toml")]
    config: String,

    /// Authorization level to request
    #[arg(short, long, value_enum, default_value = "foreground")]
    authorization: AuthLevelArg,

    /// Provider scenario to simulate
    #[arg(short, long, value_enum, default_value = "good")]
    scenario: Scenario,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AuthLevelArg {
    Foreground,
    Always,
}

impl From<AuthLevelArg> for AuthorizationLevel {
    fn from(arg: AuthLevelArg) -> Self {
        match arg {
            AuthLevelArg::Foreground => AuthorizationLevel::WhileInForeground,
            AuthLevelArg::Always => AuthorizationLevel::Always,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scenario {
    /// An accurate fix arrives after one coarse reading
    Good,
    /// Only coarse fixes; resolves best-effort at timeout
    Coarse,
    /// Authorization prompt is denied
    Denied,
    /// No fixes at all; times out
    Silent,
    /// Transient glitch followed by an accurate fix
    Flaky,
}

fn build_provider(scenario: Scenario) -> SimulatedProvider {
    // Reykjavik city center, accuracy degrading outward
    let precise = LocationFix::new(64.1466, -21.9426, 35.0);
    let coarse = LocationFix::new(64.1450, -21.9400, 500.0);
    let coarser = LocationFix::new(64.1440, -21.9380, 800.0);

    match scenario {
        Scenario::Good => SimulatedProvider::new()
            .with_fix(200, coarse)
            .with_fix(1_000, precise),
        Scenario::Coarse => SimulatedProvider::new()
            .with_fix(200, coarser)
            .with_fix(1_500, coarse),
        Scenario::Denied => SimulatedProvider::new().with_grant(AuthorizationStatus::Denied),
        Scenario::Silent => SimulatedProvider::new(),
        Scenario::Flaky => SimulatedProvider::new()
            .with_error(300, ProviderError::transient("momentary signal loss"))
            .with_fix(1_200, precise),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Structured logging, level via RUST_LOG (default: info)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .init();

    info!(git_hash = env!("GIT_HASH"), "locfix starting");

    let args = Args::parse();
    let config = Config::load_from_path(&args.config);

    info!(
        config_file = %config.config_file(),
        timeout_ms = %config.timeout_ms(),
        accuracy_threshold_m = %config.accuracy_threshold_m(),
        staleness_bound_ms = %config.staleness_bound_ms(),
        "config_loaded"
    );

    let provider = Arc::new(build_provider(args.scenario));
    let coordinator = SingleRequestLocationCoordinator::shared_with(provider, config);

    match coordinator.current_location(args.authorization.into()).await {
        Ok(fix) => {
            info!(
                latitude = %fix.coordinates.latitude,
                longitude = %fix.coordinates.longitude,
                accuracy_m = %fix.horizontal_accuracy_m,
                "current_location"
            );
            println!("{}", serde_json::to_string(&fix)?);
        }
        Err(failure) => {
            warn!(failure = %failure.as_str(), "request_failed");
            eprintln!("locfix: {failure}");
            std::process::exit(1);
        }
    }

    Ok(())
}
