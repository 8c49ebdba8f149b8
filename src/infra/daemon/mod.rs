// src/infra/daemon/mod.rs — Bot dispatch loop

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;

use crate::integrations::types::{MessagingAdapter, PollBatch};

pub mod handler;

pub use handler::{handle_event, BotContext};

/// Pause after a failed poll before trying again.
pub const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

type PollFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<PollBatch>> + Send + 'a>>;

/// Long-poll the messenger and handle each event on its own task until Ctrl+C.
pub async fn run_bot(ctx: Arc<BotContext>) -> anyhow::Result<()> {
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Cannot listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };
    serve(ctx, shutdown, POLL_RETRY_DELAY).await
}

/// Dispatch loop behind [`run_bot`], stopping when `shutdown` completes.
///
/// Events from different chats run in parallel. Ordering within a chat is
/// left to the session lock. Exactly one poll is outstanding at a time; it
/// is only replaced after it resolves, so finishing handlers never cut a
/// long poll short.
pub async fn serve(
    ctx: Arc<BotContext>,
    shutdown: impl Future<Output = ()>,
    retry_delay: Duration,
) -> anyhow::Result<()> {
    tracing::info!("Bot started, waiting for messages");
    tokio::pin!(shutdown);

    let mut tasks = JoinSet::new();
    let mut offset = 0i64;
    let mut poll = next_poll(ctx.messenger.as_ref(), offset, None);

    loop {
        tokio::select! {
            polled = &mut poll => {
                let delay = match polled {
                    Ok(batch) => {
                        offset = batch.next_offset;
                        for event in batch.events {
                            tracing::debug!(chat_id = %event.chat_id(), "Dispatching event");
                            let ctx = ctx.clone();
                            tasks.spawn(async move {
                                handle_event(&ctx, event).await;
                            });
                        }
                        None
                    }
                    Err(e) => {
                        tracing::error!("Polling failed: {e:#}");
                        Some(retry_delay)
                    }
                };
                poll = next_poll(ctx.messenger.as_ref(), offset, delay);
            }
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                if let Err(e) = joined {
                    if e.is_panic() {
                        tracing::error!("Event handler panicked: {e}");
                    }
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    if !tasks.is_empty() {
        tracing::info!(in_flight = tasks.len(), "Aborting in-flight handlers");
    }
    tasks.shutdown().await;
    tracing::info!("Bot stopped.");
    Ok(())
}

/// The next poll, optionally preceded by a back-off pause. The pause is part
/// of the future so shutdown can interrupt it.
fn next_poll(
    messenger: &dyn MessagingAdapter,
    offset: i64,
    delay: Option<Duration>,
) -> PollFuture<'_> {
    Box::pin(async move {
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        messenger.poll(offset).await
    })
}
