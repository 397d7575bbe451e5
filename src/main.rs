use codegate::client::AccessCodeClient;
use codegate::config::GateConfig;
use codegate::controller::{AccessCodeController, ControllerMessage, GateObserver, Phase};
use codegate::models::{ValidationDetails, ValidationOutcome};

use color_eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Observer that announces accepted codes on stdout.
///
/// Rejections and network failures are reported from the event loop, where
/// the displayable reason lives in the controller outcome.
struct PrintObserver;

impl GateObserver for PrintObserver {
    fn on_change(&self, code: &str) {
        tracing::debug!(len = code.chars().count(), "Code changed");
    }

    fn on_validate(&self, is_valid: bool) {
        tracing::info!(valid = is_valid, "Validation resolved");
    }

    fn on_validated(&self, details: &ValidationDetails) {
        match details.expires_at {
            Some(expires_at) => println!(
                "✓ Code accepted: {}/{} uses remaining, expires {}",
                details.remaining_uses,
                details.max_usage,
                expires_at.format("%Y-%m-%d %H:%M UTC")
            ),
            None => println!(
                "✓ Code accepted: {}/{} uses remaining",
                details.remaining_uses, details.max_usage
            ),
        }
    }
}

/// Report the outcome of a freshly applied resolution.
fn report_outcome(controller: &AccessCodeController) {
    match controller.outcome() {
        Some(ValidationOutcome::Invalid { reason }) => println!("✗ Rejected: {}", reason),
        Some(ValidationOutcome::NetworkError { message }) => {
            println!("✗ Network problem: {}", message)
        }
        _ => {} // acceptance is announced by the observer
    }
}

async fn run(config: GateConfig) -> Result<()> {
    // Check the service once so an unreachable API is visible up front
    let health_client = AccessCodeClient::from_config(&config);
    match health_client.health_check().await {
        Ok(true) => tracing::info!(url = %config.base_url, "Validation service reachable"),
        Ok(false) => {
            tracing::warn!(url = %config.base_url, "Validation service answered with an error status")
        }
        Err(e) => {
            tracing::warn!(url = %config.base_url, error = %e, "Validation service unreachable")
        }
    }

    let mut controller =
        AccessCodeController::from_config(&config, std::sync::Arc::new(PrintObserver));

    println!("codegate {} - validating against {}", VERSION, config.base_url);
    println!(
        "Type a code and press Enter; it validates after {}ms of quiet.",
        config.debounce.as_millis()
    );
    println!("Commands: !submit validates immediately, !quit exits.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    // Take the message receiver from the controller (we need ownership for select!)
    let mut message_rx: Option<mpsc::UnboundedReceiver<ControllerMessage>> =
        controller.message_rx.take();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break; // stdin closed
                };
                match line.trim_end_matches('\r') {
                    "!quit" => break,
                    "!submit" => controller.on_submit_requested(),
                    text => {
                        controller.on_edit(text);
                        match controller.format_error() {
                            Some(error) => println!("  format: {}", error),
                            None => println!("  format: ok"),
                        }
                    }
                }
            }

            // Handle async messages from timers and in-flight requests
            msg = async {
                match &mut message_rx {
                    Some(rx) => rx.recv().await,
                    None => std::future::pending().await,
                }
            } => {
                if let Some(msg) = msg {
                    let resolved = matches!(msg, ControllerMessage::RequestResolved { .. });
                    let was_validating = controller.phase() == Phase::Validating;
                    controller.handle_message(msg);
                    if resolved && was_validating && controller.phase() == Phase::Idle {
                        report_outcome(&controller);
                    }
                }
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    // Handle --version flag before any initialization
    if std::env::args().any(|arg| arg == "--version") {
        println!("codegate {}", VERSION);
        std::process::exit(0);
    }

    color_eyre::install()?;

    // Logs go to stderr so stdout stays clean for the entry prompt
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = GateConfig::from_env();

    // Create Tokio runtime for the entire application
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config))
}
