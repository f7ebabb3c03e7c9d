//! Fan-out of inbound platform events to running games.
//!
//! The host publishes every [`InboundEvent`] once; each game holds its own
//! [`Subscription`] and waits on it with a deadline and a predicate. Events a
//! game is not interested in are skipped, never consumed on behalf of other
//! games.

use cringo_core::{EventKind, InboundEvent};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{Instant, sleep_until, timeout_at};
use tracing::{trace, warn};

/// Default number of events buffered per subscriber.
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Broadcasts inbound events to every live [`Subscription`].
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<InboundEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event. Returns the number of subscribers it reached.
    pub fn publish(&self, event: InboundEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribes to events published from now on.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER)
    }
}

/// One game's view of the event stream.
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<InboundEvent>,
}

impl Subscription {
    /// Waits for the next event of `kind` accepted by `predicate`.
    ///
    /// Returns `None` once `deadline` passes. Events stamped at or after the
    /// deadline are dropped even if they are still queued when the caller
    /// resumes. If the bus is closed the wait still lasts until the deadline
    /// so that phase timing does not depend on the host.
    pub async fn await_event<F>(
        &mut self,
        kind: EventKind,
        deadline: Instant,
        mut predicate: F,
    ) -> Option<InboundEvent>
    where
        F: FnMut(&InboundEvent) -> bool,
    {
        loop {
            if Instant::now() >= deadline {
                return None;
            }
            match timeout_at(deadline, self.receiver.recv()).await {
                Err(_elapsed) => return None,
                Ok(Ok(event)) => {
                    if event.received_at() >= deadline {
                        trace!(kind = ?event.kind(), "Event arrived after the deadline");
                        continue;
                    }
                    if event.kind() == kind && predicate(&event) {
                        return Some(event);
                    }
                }
                Ok(Err(RecvError::Lagged(skipped))) => {
                    warn!(skipped, "Game subscription lagged, events dropped");
                }
                Ok(Err(RecvError::Closed)) => {
                    sleep_until(deadline).await;
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use cringo_core::{ChannelId, MessageId, Participant};

    use super::*;

    fn reaction(user: &str) -> InboundEvent {
        InboundEvent::reaction(
            ChannelId::new("c"),
            MessageId::new("m"),
            Participant::new(user, user),
            "🎲",
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_predicate_filters_events() {
        let bus = EventBus::new(16);
        let mut subscription = bus.subscribe();

        bus.publish(InboundEvent::direct_message(Participant::new("1", "one"), "a1"));
        bus.publish(reaction("2"));
        bus.publish(reaction("3"));

        let deadline = Instant::now() + Duration::from_secs(5);
        let event = subscription
            .await_event(EventKind::Reaction, deadline, |e| e.user_id().as_str() == "3")
            .await
            .unwrap();
        assert_eq!(event.user_id().as_str(), "3");
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_returns_none() {
        let bus = EventBus::new(16);
        let mut subscription = bus.subscribe();
        let start = Instant::now();
        let deadline = start + Duration::from_secs(30);

        let event = subscription
            .await_event(EventKind::Message, deadline, |_| true)
            .await;
        assert!(event.is_none());
        assert!(Instant::now() >= deadline);
    }

    #[tokio::test(start_paused = true)]
    async fn test_event_queued_after_deadline_is_dropped() {
        let bus = EventBus::new(16);
        let mut subscription = bus.subscribe();
        let deadline = Instant::now() + Duration::from_secs(5);

        tokio::time::sleep(Duration::from_secs(10)).await;
        bus.publish(reaction("late"));

        let event = subscription
            .await_event(EventKind::Reaction, deadline, |_| true)
            .await;
        assert!(event.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_bus_waits_for_deadline() {
        let bus = EventBus::new(4);
        let mut subscription = bus.subscribe();
        drop(bus);

        let deadline = Instant::now() + Duration::from_secs(10);
        assert!(
            subscription
                .await_event(EventKind::Reaction, deadline, |_| true)
                .await
                .is_none()
        );
        assert!(Instant::now() >= deadline);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(reaction("1")), 0);
        let _subscription = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(bus.publish(reaction("1")), 1);
    }
}
