//! Lifetime of one mounted view.
//!
//! A [`Mount`] owns the view's subscriptions on the shared connection and a
//! cancellation token raced against every request the view starts. Dropping
//! the mount unmounts the view: outstanding requests are cancelled and every
//! subscription is removed, while the connection itself stays open.

use std::future::Future;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::common::{ClientEvent, PushEvent, Topic};
use crate::network::{ConnectionHandle, SubscriptionId};

pub struct Mount<R> {
    runtime: Handle,
    connection: Option<ConnectionHandle>,
    subscriptions: Vec<SubscriptionId>,
    events_tx: mpsc::UnboundedSender<PushEvent>,
    events_rx: mpsc::UnboundedReceiver<PushEvent>,
    results_tx: mpsc::UnboundedSender<R>,
    results_rx: mpsc::UnboundedReceiver<R>,
    cancel: CancellationToken,
}

impl<R: Send + 'static> Mount<R> {
    pub fn new(runtime: Handle, connection: Option<ConnectionHandle>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        Self {
            runtime,
            connection,
            subscriptions: Vec::new(),
            events_tx,
            events_rx,
            results_tx,
            results_rx,
            cancel: CancellationToken::new(),
        }
    }

    /// Subscribes this view to `topics`. A no-op without a connection.
    pub fn subscribe(&mut self, topics: &[Topic]) {
        let Some(connection) = &self.connection else {
            log::debug!("No real-time connection; view runs on snapshots only");
            return;
        };
        for topic in topics {
            let id = connection.subscribe(*topic, self.events_tx.clone());
            self.subscriptions.push(id);
        }
    }

    pub fn emit(&self, event: ClientEvent) {
        match &self.connection {
            Some(connection) => connection.emit(event),
            None => log::debug!("No real-time connection; dropping {}", event.name()),
        }
    }

    /// Runs `task` on the runtime; its output is delivered through
    /// [`Mount::drain_results`] unless the view unmounts first.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = R> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        self.spawn_until(async move { cancel.cancelled().await }, task);
    }

    /// A child token for work that must stop before the view unmounts
    /// (e.g. a superseded debounced query).
    pub fn child_token(&self) -> CancellationToken {
        self.cancel.child_token()
    }

    /// Like [`Mount::spawn`] but also stops when `token` is cancelled.
    pub fn spawn_with<F>(&self, token: CancellationToken, task: F)
    where
        F: Future<Output = R> + Send + 'static,
    {
        self.spawn_superseded_by(token, task);
    }

    fn spawn_superseded_by<F>(&self, token: CancellationToken, task: F) -> JoinHandle<()>
    where
        F: Future<Output = R> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        let stop = async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = token.cancelled() => {}
            }
        };
        self.spawn_until(stop, task)
    }

    fn spawn_until<S, F>(&self, stop: S, task: F) -> JoinHandle<()>
    where
        S: Future<Output = ()> + Send + 'static,
        F: Future<Output = R> + Send + 'static,
    {
        let results = self.results_tx.clone();
        self.runtime.spawn(async move {
            tokio::select! {
                _ = stop => {
                    log::debug!("Request cancelled");
                }
                output = task => {
                    let _ = results.send(output);
                }
            }
        })
    }

    /// Push events received since the last call, in delivery order.
    pub fn drain_events(&mut self) -> Vec<PushEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Finished requests since the last call.
    pub fn drain_results(&mut self) -> Vec<R> {
        let mut results = Vec::new();
        while let Ok(result) = self.results_rx.try_recv() {
            results.push(result);
        }
        results
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl<R> Drop for Mount<R> {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(connection) = &self.connection {
            for id in self.subscriptions.drain(..) {
                connection.unsubscribe(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn superseded_task_finishes_while_view_stays_mounted() {
        let mount: Mount<u8> = Mount::new(Handle::current(), None);
        let token = mount.child_token();
        let handle = mount.spawn_superseded_by(token.clone(), std::future::pending());

        token.cancel();

        let finished = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(matches!(finished, Ok(Ok(()))));
        assert!(!mount.is_cancelled());
    }

    #[tokio::test]
    async fn unmount_stops_tasks_started_with_a_child_token() {
        let mount: Mount<u8> = Mount::new(Handle::current(), None);
        let handle = mount.spawn_superseded_by(mount.child_token(), std::future::pending());

        drop(mount);

        let finished = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(matches!(finished, Ok(Ok(()))));
    }
}
