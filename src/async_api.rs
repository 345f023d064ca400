//! Async wrappers around the blocking checks.
//!
//! Each call runs its blocking operation on a dedicated worker thread and
//! hands the result back through a oneshot channel, so callers inside a tokio
//! runtime never block an executor thread (and the blocking reqwest client
//! never runs inside the runtime).

use crate::{Config, Error, HealthReport, ProbeReport, Result};
use std::thread;
use tokio::sync::oneshot;

#[cfg(feature = "cdp")]
use crate::RenderOutcome;

async fn run_on_worker<T, F>(name: &str, job: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (tx, rx) = oneshot::channel::<Result<T>>();

    thread::Builder::new()
        .name(format!("bridgecheck-{}", name))
        .spawn(move || {
            let _ = tx.send(job());
        })
        .map_err(|e| Error::Other(format!("Failed to spawn {} worker: {}", name, e)))?;

    rx.await
        .map_err(|e| Error::Other(format!("{} worker canceled: {}", name, e)))?
}

/// Send the bridge request once.
pub async fn probe(config: Config) -> Result<ProbeReport> {
    run_on_worker("probe", move || crate::probe::probe(&config)).await
}

/// Check `/api/health` once.
pub async fn health(config: Config) -> Result<HealthReport> {
    run_on_worker("health", move || crate::probe::health(&config)).await
}

/// Render the background page with headless Chrome.
#[cfg(feature = "cdp")]
pub async fn render_background(config: Config) -> Result<RenderOutcome> {
    run_on_worker("render", move || crate::render::render_background(&config)).await
}
