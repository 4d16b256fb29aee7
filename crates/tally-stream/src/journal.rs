use std::sync::RwLock;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use tally_types::{Record, TxId};

use crate::error::{Result, StreamError};
use crate::notification::{Notification, NotificationFilter};

/// A broadcast channel receiver for live notifications.
pub type NotificationFeed = broadcast::Receiver<Notification>;

/// Consumer-side contract for the notification stream.
///
/// `replay` returns every notification published so far, in append order;
/// `subscribe` delivers notifications published after the call. Both accept
/// a [`NotificationFilter`]. The in-process [`NotificationJournal`]
/// implements this directly; remote transports can implement it over a
/// wire protocol, which is why `replay` is async and fallible.
#[async_trait]
pub trait NotificationStream: Send + Sync {
    /// All matching notifications published so far, oldest first.
    async fn replay(&self, filter: NotificationFilter) -> Result<Vec<Notification>>;

    /// Live feed of matching notifications published after this call.
    fn subscribe(&self, filter: NotificationFilter) -> NotificationFeed;
}

/// Internal subscriber: a filter paired with a broadcast sender.
struct Subscriber {
    filter: NotificationFilter,
    sender: broadcast::Sender<Notification>,
}

/// Fan-out router that delivers notifications to matching subscribers.
struct NotificationRouter {
    subscribers: RwLock<Vec<Subscriber>>,
}

impl NotificationRouter {
    fn new() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
        }
    }

    /// Register a new subscriber with the given filter.
    /// Returns a broadcast receiver for the matching notifications.
    fn subscribe(&self, filter: NotificationFilter, capacity: usize) -> NotificationFeed {
        let (tx, rx) = broadcast::channel(capacity);
        let sub = Subscriber { filter, sender: tx };
        self.subscribers
            .write()
            .expect("router lock poisoned")
            .push(sub);
        rx
    }

    /// Route a notification to all matching subscribers.
    /// Subscribers whose channels are closed are pruned.
    fn route(&self, notification: &Notification) {
        let mut subs = self.subscribers.write().expect("router lock poisoned");
        subs.retain(|sub| {
            if sub.filter.matches(notification) {
                // If send fails (no receivers), the subscriber is stale.
                sub.sender.send(notification.clone()).is_ok()
            } else {
                // Keep non-matching subscribers; they may match future
                // notifications. Only prune if the channel itself is closed.
                sub.sender.receiver_count() > 0
            }
        });
    }

    /// Number of active subscribers.
    fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .expect("router lock poisoned")
            .len()
    }
}

/// Configuration for the [`NotificationJournal`].
#[derive(Clone, Debug)]
pub struct JournalConfig {
    /// Capacity of per-subscriber broadcast channels.
    pub channel_capacity: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
        }
    }
}

/// Append-order log of creation notifications with live fan-out.
///
/// The journal is the replayable record of every announcement ever
/// published: consumers that missed live delivery can rebuild history from
/// position zero. The ledger publishes into the journal inside its own
/// mutation boundary, so a record and its notification are never observed
/// apart.
pub struct NotificationJournal {
    log: RwLock<Vec<Notification>>,
    router: NotificationRouter,
    config: JournalConfig,
}

impl NotificationJournal {
    /// Create an empty journal.
    pub fn new(config: JournalConfig) -> Self {
        Self {
            log: RwLock::new(Vec::new()),
            router: NotificationRouter::new(),
            config,
        }
    }

    /// Announce a freshly appended record.
    ///
    /// Appends the notification to the replay log, then fans it out to
    /// matching subscribers. Returns the published notification.
    pub fn publish(&self, record: &Record, tx: TxId) -> Result<Notification> {
        let notification = Notification::announce(record, tx);

        self.log
            .write()
            .map_err(|_| StreamError::Unavailable("journal lock poisoned".into()))?
            .push(notification.clone());

        self.router.route(&notification);

        debug!(id = notification.id, tx = %tx, "notification published");
        Ok(notification)
    }

    /// Number of notifications published so far.
    pub fn len(&self) -> usize {
        self.log.read().map(|log| log.len()).unwrap_or(0)
    }

    /// Returns `true` if nothing has been published.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.router.subscriber_count()
    }
}

impl Default for NotificationJournal {
    fn default() -> Self {
        Self::new(JournalConfig::default())
    }
}

#[async_trait]
impl NotificationStream for NotificationJournal {
    async fn replay(&self, filter: NotificationFilter) -> Result<Vec<Notification>> {
        let log = self
            .log
            .read()
            .map_err(|_| StreamError::Unavailable("journal lock poisoned".into()))?;
        Ok(log.iter().filter(|n| filter.matches(n)).cloned().collect())
    }

    fn subscribe(&self, filter: NotificationFilter) -> NotificationFeed {
        self.router.subscribe(filter, self.config.channel_capacity)
    }
}
