use crate::{
    events::{FeedEvent, FeedEvents},
    server::{Result, ServerRouter, auth::AuthenticatedUser, json::Json},
};
use axum::extract::State;
use axum_extra::routing::{RouterExt, TypedPath};
use microfeed_common::model::message::{Message, MessageContent};
use microfeed_db::{backend::Backend, store::Store};
use std::sync::Arc;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_post(create_message)
        .typed_get(get_feed)
}

#[derive(TypedPath)]
#[typed_path("/messages")]
struct MessagesPath;

async fn create_message(
    MessagesPath: MessagesPath,
    State(store): State<Arc<Backend>>,
    State(events): State<FeedEvents>,
    user: AuthenticatedUser,
    Json(MessageContent { content }): Json<MessageContent>,
) -> Result<Json<Message>> {
    let message = store.create_message(user.user_id(), content).await?;

    events.publish(FeedEvent::MessageCreated(message.clone()));
    Ok(Json(message))
}

#[derive(TypedPath)]
#[typed_path("/feed")]
struct FeedPath;

async fn get_feed(
    FeedPath: FeedPath,
    State(store): State<Arc<Backend>>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Message>>> {
    let feed = store.get_feed(user.user_id()).await?;

    Ok(Json(feed))
}
