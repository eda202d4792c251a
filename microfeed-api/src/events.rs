use microfeed_common::model::message::Message;
use tokio::sync::broadcast::{self, Receiver, Sender, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum FeedEvent {
    MessageCreated(Message),
}

#[derive(Clone, Debug)]
pub struct FeedEvents {
    sender: Sender<FeedEvent>,
}

impl FeedEvents {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: FeedEvent) {
        if let Err(err) = self.sender.send(event) {
            debug!(event = ?err.0, "No subscribers for feed event");
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> Receiver<FeedEvent> {
        self.sender.subscribe()
    }
}

impl Default for FeedEvents {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

pub async fn log_feed_events(mut receiver: Receiver<FeedEvent>, cancel: CancellationToken) {
    loop {
        let received = tokio::select! {
            () = cancel.cancelled() => break,
            received = receiver.recv() => received,
        };

        match received {
            Ok(FeedEvent::MessageCreated(message)) => {
                info!(
                    message_id = %message.id,
                    user_id = %message.user_id,
                    "Message created"
                );
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Feed event subscriber fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
