//! Live queries on top of SQLite.
//!
//! SQLite has no change streams of its own, so [`super::SqliteDatabase`] publishes a [`StoreChange`] on a broadcast
//! channel after every committed write. A live query listens on that channel and re-runs its query when a relevant
//! change comes through. Results go out over a watch channel, so a slow reader only ever sees the latest snapshot.
use std::future::Future;

use log::*;
use sqlx::SqlitePool;
use tokio::sync::{broadcast, broadcast::error::RecvError, watch};

use crate::{
    db::traits::{StoreChange, StoreError},
    subscription::Subscription,
};

/// Runs `fetch` once and keeps re-running it whenever `is_relevant` accepts a change notification.
///
/// The listener is registered before the initial fetch, so a write that lands between the two is not lost. If the
/// listener falls too far behind, the query is re-run unconditionally.
pub async fn spawn_live_query<T, F, Fut, M>(
    name: &str,
    pool: SqlitePool,
    changes: &broadcast::Sender<StoreChange>,
    is_relevant: M,
    fetch: F,
) -> Result<Subscription<T>, StoreError>
where
    T: Clone + PartialEq + Send + Sync + 'static,
    F: Fn(SqlitePool) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, StoreError>> + Send,
    M: Fn(&StoreChange) -> bool + Send + 'static,
{
    let mut listener = changes.subscribe();
    let initial = fetch(pool.clone()).await?;
    let (tx, rx) = watch::channel(initial);
    let name = name.to_string();
    let task = tokio::spawn(async move {
        trace!("👀️ Live query {name} started");
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                change = listener.recv() => match change {
                    Ok(change) if !is_relevant(&change) => continue,
                    Ok(_) => {},
                    Err(RecvError::Lagged(n)) => debug!("👀️ Live query {name} missed {n} change notifications. Resyncing"),
                    Err(RecvError::Closed) => break,
                },
            }
            match fetch(pool.clone()).await {
                Ok(value) => {
                    tx.send_if_modified(|current| {
                        if *current == value {
                            false
                        } else {
                            *current = value;
                            true
                        }
                    });
                },
                Err(e) => warn!("👀️ Live query {name} could not refresh. The last snapshot stays in place. {e}"),
            }
        }
        trace!("👀️ Live query {name} stopped");
    });
    Ok(Subscription::new(rx, task))
}
