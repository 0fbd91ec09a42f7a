use std::sync::Arc;

use request_matrix::cli::{Console, MatrixRenderer, PageSnapshot};
use request_matrix::config::SwitchboardConfig;
use request_matrix::logging;
use request_matrix::switchboard::Switchboard;

fn main() -> anyhow::Result<()> {
    // Initialize logging system
    logging::init_logging()?;

    let console = Console::new();
    let Some(path) = std::env::args().nth(1) else {
        console.print_error("usage: request-matrix <snapshot.json>");
        std::process::exit(2);
    };

    tracing::info!("=== Request Matrix Starting ===");

    // Configuration from REQUEST_MATRIX_CONFIG, defaults otherwise
    let config = SwitchboardConfig::from_env()?;

    // Seed the rule store from the snapshot
    let snapshot = PageSnapshot::from_file(&path)?;
    let switchboard = Switchboard::with_store(config, Arc::new(snapshot.store()));

    let mut page = switchboard.page(&snapshot.page_url)?;
    page.rebuild_matrix(&snapshot.requests);
    let groups = page.classify();

    tracing::info!(
        "Page {} ({}, opened {}): {} row(s)",
        page.page_url(),
        page.id(),
        page.created_at().to_rfc3339(),
        page.matrix().len()
    );

    MatrixRenderer::with_console(console).print(&page, &groups);

    Ok(())
}
