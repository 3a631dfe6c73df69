//! Flow Navigator - terminal chat driver
//!
//! Loads the flow documents named by `FLOW_FILES`, starts one session, and feeds
//! it stdin lines until EOF.

use flow_navigator::runtime::TerminalSink;
use flow_navigator::{launch, FileFlowSource, Settings};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging; stdout belongs to the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flow_navigator=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Configuration
    let settings = Settings::from_env();
    let config = settings.engine_config()?;
    tracing::info!(
        files = ?settings.flow_files,
        root = %config.root,
        "Loading conversation flow"
    );

    let source = FileFlowSource::new(settings.flow_files.clone());
    let session = launch(&source, config, TerminalSink::new()).await?;
    tracing::info!(session_id = %session.session_id(), "Session started");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        session.submit(line).await?;
    }

    session.shutdown().await;
    Ok(())
}
