//! Cancellable live data handles
//!
//! A [`Subscription`] is the Rust face of a "listen to this query" registration. A background task keeps the latest
//! value of the query in a watch channel; the handle reads from it. The task is cancelled exactly once: by
//! [`Subscription::close`], or, on every other exit path, when the handle is dropped.
use log::*;
use tokio::{sync::watch, task::JoinHandle};

pub struct Subscription<T> {
    receiver: watch::Receiver<T>,
    task: Option<JoinHandle<()>>,
}

impl<T> std::fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Subscription(active: {})", self.task.is_some())
    }
}

impl<T> Subscription<T>
where T: Clone + Send + Sync + 'static
{
    /// Wraps a receiver and the task that feeds it. The subscription owns the task from here on.
    pub fn new(receiver: watch::Receiver<T>, task: JoinHandle<()>) -> Self {
        Self { receiver, task: Some(task) }
    }

    /// The most recent snapshot.
    pub fn latest(&self) -> T {
        self.receiver.borrow().clone()
    }

    /// Waits for the next snapshot. Returns `None` once the feeding task has stopped.
    pub async fn changed(&mut self) -> Option<T> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Waits until a snapshot satisfies `predicate`, checking the current one first.
    pub async fn wait_for<F>(&mut self, predicate: F) -> Option<T>
    where F: FnMut(&T) -> bool {
        let value = self.receiver.wait_for(predicate).await.ok()?;
        Some(T::clone(&value))
    }

    /// A second reader on the same feed. It stops receiving updates when this subscription is closed.
    pub fn receiver(&self) -> watch::Receiver<T> {
        self.receiver.clone()
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    /// Cancels the feeding task and waits until it has been torn down, so that everything it held (change feed
    /// listeners, sensor watches) is released by the time this returns.
    pub async fn close(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            match task.await {
                Err(e) if e.is_panic() => error!("📡️ Subscription task panicked: {e}"),
                _ => debug!("📡️ Subscription closed"),
            }
        }
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            trace!("📡️ Subscription dropped without close(). Cancelling its task");
            task.abort();
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;

    fn counting_subscription() -> (Subscription<u32>, tokio::sync::mpsc::Sender<u32>) {
        let (values_tx, mut values_rx) = tokio::sync::mpsc::channel::<u32>(8);
        let (tx, rx) = watch::channel(0);
        let task = tokio::spawn(async move {
            while let Some(v) = values_rx.recv().await {
                let _ = tx.send(v);
            }
        });
        (Subscription::new(rx, task), values_tx)
    }

    #[tokio::test]
    async fn delivers_updates_in_order() {
        let (mut sub, values) = counting_subscription();
        assert_eq!(sub.latest(), 0);
        values.send(1).await.unwrap();
        assert_eq!(sub.changed().await, Some(1));
        values.send(2).await.unwrap();
        values.send(3).await.unwrap();
        let v = tokio::time::timeout(Duration::from_secs(1), sub.wait_for(|v| *v == 3)).await.unwrap();
        assert_eq!(v, Some(3));
    }

    #[tokio::test]
    async fn close_stops_the_task() {
        let (sub, values) = counting_subscription();
        let mut reader = sub.receiver();
        assert!(sub.is_active());
        sub.close().await;
        // the sender inside the task is gone, so the feed is closed
        assert!(reader.changed().await.is_err());
        assert!(values.send(5).await.is_err());
    }

    #[tokio::test]
    async fn drop_cancels_the_task() {
        let (sub, values) = counting_subscription();
        drop(sub);
        tokio::time::timeout(Duration::from_secs(1), values.closed()).await.unwrap();
    }
}
