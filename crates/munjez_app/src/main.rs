use munjez_app::app::{run, AppConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let result = AppConfig::from_env().and_then(run);
    if let Err(err) = result {
        tracing::error!(error = ?err, "munjez terminated");
        eprintln!("Failed to render calendar: {err:#}");
        std::process::exit(1);
    }
}
