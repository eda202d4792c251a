use crate::events::{FeedEvent, FeedEvents};
use microfeed_common::model::{Id, user::UserMarker};
use microfeed_db::store::Store;
use std::{sync::Arc, time::Duration};
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub const TRAFFIC_USER_ID: i64 = 1;

pub async fn generate_traffic<S>(
    store: Arc<S>,
    events: FeedEvents,
    period: Duration,
    cancel: CancellationToken,
) where
    S: Store + 'static,
{
    let user_id = Id::<UserMarker>::new(TRAFFIC_USER_ID);
    let mut interval = interval_at(Instant::now() + period, period);

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let content = format!("random post #{}", rand::random_range(0..1000_u32));
        match store.create_message(user_id, content).await {
            Ok(message) => {
                debug!(message_id = %message.id, "Posted synthetic message");
                events.publish(FeedEvent::MessageCreated(message));
            }
            Err(err) => warn!(error = %err, "Synthetic post failed"),
        }
    }
}
