//! # Change notifications
//!
//! Typed publish/subscribe over `tokio::sync::broadcast`. Each service owns
//! an [`EventBus`] for its own payload type; subscribers receive every event
//! published after they subscribed. Delivery is advisory: a subscriber that
//! falls more than `capacity` events behind observes `RecvError::Lagged`.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use domains::{Complaint, LikeOutcome, User};

const DEFAULT_CAPACITY: usize = 64;

/// Session state change, published by the session controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthEvent {
    #[serde(rename = "isAuthenticated")]
    pub is_authenticated: bool,
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum ComplaintEvent {
    Created(Complaint),
    LikeToggled {
        complaint_id: Uuid,
        user_id: Uuid,
        outcome: LikeOutcome,
    },
    CommentAdded {
        complaint_id: Uuid,
        comment_id: Uuid,
    },
    Reported {
        complaint_id: Uuid,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct EventBus<E: Clone> {
    sender: broadcast::Sender<E>,
}

impl<E: Clone> EventBus<E> {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }

    /// Returns the number of subscribers reached; zero is not an error.
    pub fn publish(&self, event: E) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
