// SPDX-License-Identifier: MIT
//
// BridgeKit host — line-delimited JSON over stdio.
//
// Reads one request envelope per stdin line, dispatches it to the bridges,
// and writes one reply envelope per stdout line. Calls run concurrently on
// a single-threaded runtime, so a deferred flow (UI presentation, consent
// prompt) never blocks the calls behind it; replies go out in completion
// order and carry the request id for correlation. Logs go to stderr so the
// reply stream stays clean.

mod router;
mod wire;

use std::rc::Rc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use bridgekit_core::config::BridgeConfig;
use bridgekit_native::platform_layer;

use router::Router;
use wire::{ReplyEnvelope, RequestEnvelope};

fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, run())
}

async fn run() -> std::io::Result<()> {
    let native = platform_layer();
    info!(platform = native.platform_name(), "bridgekit host starting");
    let router = Rc::new(Router::new(BridgeConfig::default(), native));

    // Replies funnel through one writer task so concurrent calls never
    // interleave bytes on stdout.
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<ReplyEnvelope>();
    let writer = tokio::task::spawn_local(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(reply) = reply_rx.recv().await {
            let mut line = match serde_json::to_string(&reply) {
                Ok(line) => line,
                Err(e) => {
                    error!(error = %e, id = reply.id, "reply failed to serialize");
                    continue;
                }
            };
            line.push('\n');
            if let Err(e) = stdout.write_all(line.as_bytes()).await {
                error!(error = %e, "stdout closed, stopping writer");
                break;
            }
            let _ = stdout.flush().await;
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let envelope: RequestEnvelope = match serde_json::from_str(&line) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "malformed request line, skipping");
                continue;
            }
        };
        let (id, channel, call) = envelope.into_call();
        let router = Rc::clone(&router);
        let reply_tx = reply_tx.clone();
        tokio::task::spawn_local(async move {
            let reply = router.dispatch(&channel, call).await;
            // A closed writer means shutdown is already underway.
            let _ = reply_tx.send(ReplyEnvelope::new(id, reply));
        });
    }

    // Stdin is done; let in-flight calls drain, then stop the writer.
    drop(reply_tx);
    let _ = writer.await;
    info!("bridgekit host stopping");
    Ok(())
}
