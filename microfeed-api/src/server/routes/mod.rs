use crate::server::ServerRouter;
use axum_extra::routing::{RouterExt, TypedPath};

mod messages;
mod users;

pub fn routes() -> ServerRouter {
    ServerRouter::new()
        .typed_get(health)
        .merge(users::routes())
        .merge(messages::routes())
}

#[derive(TypedPath)]
#[typed_path("/health")]
struct HealthPath;

async fn health(HealthPath: HealthPath) -> &'static str {
    "ok"
}
