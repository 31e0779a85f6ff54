//! Operator-facing notifications.
//!
//! Mutations publish here; whatever renders the console drains the receiver.

use log::debug;

use crate::users::Mutation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// The directory confirmed the action.
    Success,
    Error,
}

/// One message for the operator, tagged with the action that raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub mutation: Mutation,
    pub message: String,
}

impl Notification {
    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

/// Sending half of the notification queue. Clones share the same queue.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: flume::Sender<Notification>,
}

impl Notifier {
    /// A notifier and the receiver the console drains. The queue is
    /// unbounded, so publishing never blocks a mutation.
    pub fn channel() -> (Self, flume::Receiver<Notification>) {
        let (tx, rx) = flume::unbounded();
        (Self { tx }, rx)
    }

    /// Published only after the directory confirmed `mutation`.
    pub fn success(&self, mutation: Mutation, message: impl Into<String>) {
        self.publish(Notification {
            level: NotificationLevel::Success,
            mutation,
            message: message.into(),
        });
    }

    pub fn error(&self, mutation: Mutation, message: impl Into<String>) {
        self.publish(Notification {
            level: NotificationLevel::Error,
            mutation,
            message: message.into(),
        });
    }

    /// Dropping the receiver silences notifications without failing the
    /// mutation that raised them.
    fn publish(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            debug!("notification dropped, nobody is listening");
        }
    }
}
