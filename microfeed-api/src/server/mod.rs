use crate::events::FeedEvents;
use axum::{
    Router,
    extract::{FromRef, Request, rejection::JsonRejection},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use json::Json;
use microfeed_common::model::session::SessionTokenDecodeError;
use microfeed_db::{
    backend::Backend,
    store::{ErrorKind, StoreError},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

pub mod auth;
mod json;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub store: Arc<Backend>,
    pub events: FeedEvents,
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub fn app(state: ServerState) -> Router {
    routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error("Session cookie was missing")]
    MissingSession,
    #[error("Session cookie was invalid: {0}")]
    InvalidSession(#[from] SessionTokenDecodeError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ServerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServerError::UnknownRoute(_) => ErrorKind::NotFound,
            ServerError::JsonRejection(_) => ErrorKind::BadRequest,
            ServerError::MissingSession | ServerError::InvalidSession(_) => {
                ErrorKind::Unauthorized
            }
            ServerError::JsonResponse(_) => ErrorKind::Internal,
            ServerError::Store(err) => err.kind(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!(error = %self, %status, "Replying with error");
        } else {
            debug!(error = %self, %status, "Replying with error");
        }

        let error_response = ErrorResponse {
            status: status.as_u16(),
        };
        (status, Json(error_response)).into_response()
    }
}
