use std::io::Write;
use std::sync::Arc;

use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::bridge::dispatcher::Dispatcher;
use crate::bridge::http_backend::HttpBackend;
use crate::bridge::lifecycle::Coordinator;
use crate::cli::Config;

/// stdout carries the JSON-RPC stream, so every log line goes to stderr.
pub fn init_tracing(directive: &str) {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(directive);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Fatal diagnostics bypass the log filter: they are written even when
/// logging is `off`.
pub fn report_fatal<W: Write>(out: &mut W, err: &anyhow::Error) {
    let _ = writeln!(out, "mcp-http-bridge: fatal: {:#}", err);
    let _ = out.flush();
}

pub async fn run(config: Config) -> anyhow::Result<()> {
    let backend = HttpBackend::new(config.url, &config.user_agent)?;
    info!(
        url = %backend.url(),
        timeout_secs = config.timeout.as_secs(),
        "bridge started"
    );

    let dispatcher = Dispatcher::new(Arc::new(backend), config.timeout);
    Coordinator::new(tokio::io::stdin(), tokio::io::stdout(), dispatcher)
        .run()
        .await?;

    info!("input closed and every request answered");
    Ok(())
}
