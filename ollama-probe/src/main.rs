use std::io::Write;

use ollama_probe::{ProbeConfig, ProbeRunner};

#[cfg(feature = "tracing")]
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .compact()
        .init();
}

/// Checks a local Ollama server and prints what it finds.
///
/// Always exits with status 0: every outcome, including failures, is reported
/// on stdout.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    #[cfg(feature = "tracing")]
    init_tracing();

    let mut stdout = std::io::stdout().lock();

    let runner = match ProbeConfig::from_env().and_then(ProbeRunner::from_config) {
        Ok(runner) => runner,
        Err(e) => {
            let _ = writeln!(stdout, "Error testing Ollama: {}", e);
            return;
        }
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        host = %runner.config().host,
        port = runner.config().port,
        model = %runner.config().model,
        "probing ollama"
    );

    match runner.run(&mut stdout).await {
        Ok(_report) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(all_passed = _report.all_passed(), "done");
        }
        Err(_e) => {
            #[cfg(feature = "tracing")]
            tracing::error!(error = %_e, "could not write report");
        }
    }
}
