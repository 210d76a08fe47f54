//! Debounced suggestion lookups for a stream of keystrokes.
//!
//! Each keystroke bumps a generation counter. A lookup starts only after the
//! debounce window passes with no newer keystroke, and its response is
//! delivered only if no keystroke arrived while it was in flight.

use crate::api::SearchBackend;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Shorter queries clear the suggestion list without asking the API.
pub const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionUpdate {
    pub query: String,
    pub suggestions: Vec<String>,
}

pub struct SuggestionFeed {
    input: Option<mpsc::UnboundedSender<String>>,
    updates: mpsc::UnboundedReceiver<SuggestionUpdate>,
}

impl SuggestionFeed {
    pub fn spawn<B: SearchBackend + 'static>(backend: Arc<B>, debounce: Duration) -> Self {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_feed(backend, debounce, input_rx, update_tx));
        Self {
            input: Some(input_tx),
            updates: update_rx,
        }
    }

    /// Record the current contents of the search box.
    pub fn push(&self, query: impl Into<String>) -> bool {
        match &self.input {
            Some(tx) => tx.send(query.into()).is_ok(),
            None => false,
        }
    }

    /// No more keystrokes; pending lookups still complete.
    pub fn close_input(&mut self) {
        self.input = None;
    }

    /// Next delivered update, or `None` once input is closed and every
    /// lookup has settled.
    pub async fn next_update(&mut self) -> Option<SuggestionUpdate> {
        self.updates.recv().await
    }
}

async fn run_feed<B: SearchBackend + 'static>(
    backend: Arc<B>,
    debounce: Duration,
    mut input: mpsc::UnboundedReceiver<String>,
    updates: mpsc::UnboundedSender<SuggestionUpdate>,
) {
    let latest = Arc::new(AtomicU64::new(0));
    let mut pending: Option<String> = None;

    loop {
        let query = match pending.take() {
            Some(q) => q,
            None => match input.recv().await {
                Some(q) => q,
                None => break,
            },
        };
        let generation = latest.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::select! {
            next = input.recv() => {
                if let Some(next) = next {
                    pending = Some(next);
                    continue;
                }
            }
            _ = tokio::time::sleep(debounce) => {}
        }

        if query.chars().count() < MIN_QUERY_LEN {
            let _ = updates.send(SuggestionUpdate {
                query,
                suggestions: Vec::new(),
            });
            continue;
        }

        let backend = backend.clone();
        let latest = latest.clone();
        let updates = updates.clone();
        tokio::spawn(async move {
            let suggestions = backend.fetch_suggestions(&query).await;
            if latest.load(Ordering::SeqCst) != generation {
                tracing::debug!("Dropping stale suggestions for '{}'", query);
                return;
            }
            let _ = updates.send(SuggestionUpdate { query, suggestions });
        });
    }
}
