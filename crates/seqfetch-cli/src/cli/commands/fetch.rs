//! `seqfetch fetch` – run the engine and print its narration.

use anyhow::{Context, Result};
use seqfetch_core::engine::{Engine, EngineOptions, StopReason};
use seqfetch_core::http::CurlSource;
use seqfetch_core::request::FetchRequest;
use std::path::Path;

pub async fn run_fetch(
    request: FetchRequest,
    out: &Path,
    options: EngineOptions,
    http: CurlSource,
    json: bool,
) -> Result<()> {
    let mut handle = Engine::new(request, out, options, http).spawn();

    let cancel = handle.cancel_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received; stopping before the next attempt");
            eprintln!("Stopping after the current request...");
            cancel.cancel();
        }
    });

    while let Some(event) = handle.next_event().await {
        if json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            println!("{}", event);
        }
    }

    let result = handle.wait().await;
    interrupt.abort();
    let summary = match result {
        Ok(summary) => summary,
        Err(e) if e.is_environment() => {
            return Err(e).with_context(|| format!("output directory {} is not usable", out.display()))
        }
        Err(e) => return Err(e).context("fetch run aborted"),
    };

    match summary.reason {
        StopReason::FailureStreak => tracing::info!(
            saved = summary.total_saved,
            "sequence ended after {} missing indices",
            summary.consecutive_failures
        ),
        StopReason::Cancelled => tracing::info!(saved = summary.total_saved, "run cancelled"),
    }
    Ok(())
}
