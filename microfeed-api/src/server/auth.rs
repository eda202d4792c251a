use crate::server::ServerError;
use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use microfeed_common::model::{
    Id,
    session::{SESSION_COOKIE_NAME, SessionToken},
    user::UserMarker,
};

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct AuthenticatedUser {
    id: Id<UserMarker>,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn user_id(self) -> Id<UserMarker> {
        self.id
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token: SessionToken = jar
            .get(SESSION_COOKIE_NAME)
            .ok_or(ServerError::MissingSession)?
            .value()
            .parse()?;

        // The id is not looked up here; a missing user fails in the store operation.
        Ok(Self { id: token.user_id })
    }
}

#[must_use]
pub fn session_cookie(user_id: Id<UserMarker>) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, SessionToken::new(user_id).as_token_str()))
        .path("/")
        .build()
}
