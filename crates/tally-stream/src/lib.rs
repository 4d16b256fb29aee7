//! Creation notification stream for Tally.
//!
//! Every successful ledger append announces itself as exactly one
//! [`Notification`]. The [`NotificationJournal`] keeps those announcements
//! in append order so consumers can replay history from the beginning, and
//! fans new ones out to filtered live subscribers. The read-side indexer
//! consumes both through the [`NotificationStream`] trait.

pub mod error;
pub mod journal;
pub mod notification;

pub use error::StreamError;
pub use journal::{JournalConfig, NotificationFeed, NotificationJournal, NotificationStream};
pub use notification::{Notification, NotificationFilter};
