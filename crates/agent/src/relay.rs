//! Progress relay: the run's single outbound path to its subscriber.
//!
//! Events go out immediately, one per `emit`. The relay closes itself right
//! after a terminal event, and once the subscriber is gone every further
//! `emit` is a silent no-op.

use dojo_core::event::ProgressEvent;
use tokio::sync::mpsc;
use tracing::debug;

/// Channel capacity used for streamed runs.
pub const EVENT_CHANNEL_CAPACITY: usize = 128;

enum RelayState {
    Open(mpsc::Sender<ProgressEvent>),
    Closed,
}

pub struct ProgressRelay {
    state: RelayState,
    emitted: usize,
}

impl ProgressRelay {
    /// Relay writing into an existing sender.
    pub fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self {
            state: RelayState::Open(tx),
            emitted: 0,
        }
    }

    /// Relay plus the receiving end for its subscriber.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Deliver one event.
    pub async fn emit(&mut self, event: ProgressEvent) {
        let RelayState::Open(tx) = &self.state else {
            return;
        };

        let terminal = event.is_terminal();
        let event_type = event.event_type();
        if tx.send(event).await.is_err() {
            debug!(event_type, "Subscriber disconnected, dropping progress events");
            self.state = RelayState::Closed;
            return;
        }
        self.emitted += 1;

        if terminal {
            self.state = RelayState::Closed;
        }
    }

    /// True once an attached subscriber has gone away or a terminal event was sent.
    pub fn is_disconnected(&self) -> bool {
        match &self.state {
            RelayState::Open(tx) => tx.is_closed(),
            RelayState::Closed => true,
        }
    }

    /// Number of events actually delivered.
    pub fn emitted(&self) -> usize {
        self.emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(content: &str) -> ProgressEvent {
        ProgressEvent::Stream {
            content: content.into(),
        }
    }

    #[tokio::test]
    async fn closes_after_terminal_event() {
        let (mut relay, mut rx) = ProgressRelay::channel(8);
        relay.emit(stream("a")).await;
        relay
            .emit(ProgressEvent::Done {
                content: "a".into(),
            })
            .await;
        relay.emit(stream("late")).await;

        assert_eq!(rx.recv().await, Some(stream("a")));
        assert!(matches!(rx.recv().await, Some(ProgressEvent::Done { .. })));
        assert_eq!(rx.recv().await, None);
        assert_eq!(relay.emitted(), 2);
        assert!(relay.is_disconnected());
    }

    #[tokio::test]
    async fn emit_after_disconnect_is_silent() {
        let (mut relay, rx) = ProgressRelay::channel(8);
        assert!(!relay.is_disconnected());
        drop(rx);
        assert!(relay.is_disconnected());
        relay.emit(stream("nobody listening")).await;
        relay.emit(stream("still nobody")).await;
        assert_eq!(relay.emitted(), 0);
    }
}
