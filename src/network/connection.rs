//! The shared real-time connection.
//!
//! One [`Connection`] exists per application session. It is created by the
//! first [`ConnectionManager::obtain`] call that carries a credential and is
//! reused by every view afterwards; views subscribe and unsubscribe on it but
//! never close it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use crate::common::{ClientEvent, Credential, PushEvent, Topic};

/// Receives the push events of one subscription.
pub type EventSink = mpsc::UnboundedSender<PushEvent>;

pub type ConnectionHandle = Arc<Connection>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// The transport side of a freshly created connection.
pub struct ConnectionLink {
    pub connection: ConnectionHandle,
    pub outbound: mpsc::UnboundedReceiver<ClientEvent>,
}

/// Opens the network side of a connection.
pub trait Connector: Send + Sync {
    fn open(&self, credential: &Credential, link: ConnectionLink);
}

struct Registration {
    id: SubscriptionId,
    sink: EventSink,
}

pub struct Connection {
    subscribers: Mutex<HashMap<Topic, Vec<Registration>>>,
    outbound: mpsc::UnboundedSender<ClientEvent>,
    next_id: AtomicU64,
}

impl Connection {
    /// Creates a connection together with the queue of events it emits.
    pub fn channel() -> (ConnectionHandle, mpsc::UnboundedReceiver<ClientEvent>) {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let connection = Arc::new(Self {
            subscribers: Mutex::new(HashMap::new()),
            outbound,
            next_id: AtomicU64::new(1),
        });
        (connection, outbound_rx)
    }

    fn subscribers(&self) -> MutexGuard<'_, HashMap<Topic, Vec<Registration>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `sink` for `topic`. Every call creates an independent registration.
    pub fn subscribe(&self, topic: Topic, sink: EventSink) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers()
            .entry(topic)
            .or_default()
            .push(Registration { id, sink });
        log::debug!("subscribed {id:?} to {topic}");
        id
    }

    /// Removes exactly the registration `id`. Returns whether it existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers();
        for registrations in subscribers.values_mut() {
            if let Some(index) = registrations.iter().position(|reg| reg.id == id) {
                registrations.remove(index);
                log::debug!("unsubscribed {id:?}");
                return true;
            }
        }
        false
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.subscribers().get(&topic).map_or(0, Vec::len)
    }

    /// Queues a client event for the transport. Fire and forget.
    pub fn emit(&self, event: ClientEvent) {
        log::debug!("emit {}", event.name());
        if self.outbound.send(event).is_err() {
            log::warn!("Real-time transport is gone; dropping emitted event");
        }
    }

    /// Delivers one push event to every subscriber of its topic.
    ///
    /// Returns how many subscribers received it. Registrations whose
    /// receiver was dropped are pruned.
    pub fn dispatch(&self, event: PushEvent) -> usize {
        let topic = event.topic();
        let mut subscribers = self.subscribers();
        let Some(registrations) = subscribers.get_mut(&topic) else {
            log::debug!("no subscriber for {topic}");
            return 0;
        };

        registrations.retain(|reg| reg.sink.send(event.clone()).is_ok());
        registrations.len()
    }

    /// Whether the transport has stopped reading emitted events.
    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}

/// Owns the single shared connection of the application session.
pub struct ConnectionManager {
    connector: Arc<dyn Connector>,
    slot: Mutex<Option<ConnectionHandle>>,
}

impl ConnectionManager {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            slot: Mutex::new(None),
        }
    }

    /// Returns the shared connection, creating it on first use.
    ///
    /// Once a connection exists it is returned as is and `credential` is
    /// ignored: signing in again does not rebind the socket. Without an
    /// existing connection and without a credential nothing is created.
    pub fn obtain(&self, credential: Option<&Credential>) -> Option<ConnectionHandle> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = slot.as_ref() {
            return Some(Arc::clone(existing));
        }

        let credential = credential?;
        let (connection, outbound) = Connection::channel();
        log::info!("Opening shared real-time connection");
        self.connector.open(
            credential,
            ConnectionLink {
                connection: Arc::clone(&connection),
                outbound,
            },
        );
        *slot = Some(Arc::clone(&connection));
        Some(connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::events::UnseenUpdate;

    #[derive(Default)]
    struct CountingConnector {
        opened: Mutex<Vec<Credential>>,
    }

    impl Connector for CountingConnector {
        fn open(&self, credential: &Credential, _link: ConnectionLink) {
            self.opened.lock().unwrap().push(credential.clone());
        }
    }

    fn unseen(friend: &str, count: u32) -> PushEvent {
        PushEvent::UnseenUpdate(UnseenUpdate {
            friend_username: friend.to_string(),
            unseen_count: count,
        })
    }

    #[test]
    fn obtain_without_credential_creates_nothing() {
        let connector = Arc::new(CountingConnector::default());
        let manager = ConnectionManager::new(connector.clone());
        assert!(manager.obtain(None).is_none());
        assert!(connector.opened.lock().unwrap().is_empty());
    }

    #[test]
    fn second_obtain_reuses_first_connection() {
        let connector = Arc::new(CountingConnector::default());
        let manager = ConnectionManager::new(connector.clone());

        let first = manager.obtain(Some(&Credential::new("A"))).unwrap();
        let second = manager.obtain(Some(&Credential::new("B"))).unwrap();
        let third = manager.obtain(None).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &third));
        assert_eq!(*connector.opened.lock().unwrap(), vec![Credential::new("A")]);
    }

    #[test]
    fn unsubscribe_leaves_other_subscribers() {
        let (connection, _outbound) = Connection::channel();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();

        let a = connection.subscribe(Topic::UnseenUpdate, tx_a);
        let _b = connection.subscribe(Topic::UnseenUpdate, tx_b);

        assert!(connection.unsubscribe(a));
        assert!(!connection.unsubscribe(a));
        assert_eq!(connection.dispatch(unseen("bob", 1)), 1);

        assert!(rx_a.try_recv().is_err());
        assert_eq!(rx_b.try_recv().unwrap(), unseen("bob", 1));
    }

    #[test]
    fn same_sink_twice_is_two_registrations() {
        let (connection, _outbound) = Connection::channel();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let first = connection.subscribe(Topic::RequestNew, tx.clone());
        connection.subscribe(Topic::RequestNew, tx);
        connection.unsubscribe(first);

        connection.dispatch(PushEvent::RequestNew { from: "carol".into() });
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn dispatch_preserves_order_and_prunes_dead_sinks() {
        let (connection, _outbound) = Connection::channel();
        let (live, mut live_rx) = mpsc::unbounded_channel();
        let (dead, dead_rx) = mpsc::unbounded_channel();
        connection.subscribe(Topic::UnseenUpdate, live);
        connection.subscribe(Topic::UnseenUpdate, dead);
        drop(dead_rx);

        connection.dispatch(unseen("a", 1));
        connection.dispatch(unseen("b", 2));

        assert_eq!(connection.subscriber_count(Topic::UnseenUpdate), 1);
        assert_eq!(live_rx.try_recv().unwrap(), unseen("a", 1));
        assert_eq!(live_rx.try_recv().unwrap(), unseen("b", 2));
    }

    #[test]
    fn emit_reaches_transport_queue() {
        let (connection, mut outbound) = Connection::channel();
        connection.emit(ClientEvent::UserConnected {
            username: "alice".into(),
        });
        assert_eq!(
            outbound.try_recv().unwrap(),
            ClientEvent::UserConnected {
                username: "alice".into()
            }
        );
        drop(outbound);
        assert!(connection.is_closed());
        connection.emit(ClientEvent::UserConnected {
            username: "alice".into(),
        });
    }
}
