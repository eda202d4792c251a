use microfeed_common::model::{
    Id, ModelValidationError,
    message::Message,
    user::{Password, User, UserMarker, Username},
};
use std::future::Future;
use thiserror::Error;

pub const FEED_LIMIT: u16 = 20;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub enum ErrorKind {
    Conflict,
    Unauthorized,
    NotFound,
    BadRequest,
    Internal,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Username {} is already taken", .0.get())]
    UsernameTaken(Username),
    #[error("Username or password did not match")]
    InvalidCredentials,
    #[error("User with id {0} was not found")]
    UserNotFound(Id<UserMarker>),
    #[error("An object in the store was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("Backend failure: {0}")]
    Backend(#[source] sqlx::Error),
}

impl StoreError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::UsernameTaken(_) => ErrorKind::Conflict,
            StoreError::InvalidCredentials => ErrorKind::Unauthorized,
            StoreError::UserNotFound(_) => ErrorKind::NotFound,
            StoreError::Data(_) | StoreError::Backend(_) => ErrorKind::Internal,
        }
    }
}

pub trait Store: Send + Sync {
    fn create_user(
        &self,
        username: Username,
        password: Password,
    ) -> impl Future<Output = Result<User>> + Send;

    fn authenticate(
        &self,
        username: &Username,
        password: &Password,
    ) -> impl Future<Output = Result<User>> + Send;

    fn create_message(
        &self,
        user_id: Id<UserMarker>,
        content: String,
    ) -> impl Future<Output = Result<Message>> + Send;

    fn get_feed(&self, user_id: Id<UserMarker>)
    -> impl Future<Output = Result<Vec<Message>>> + Send;

    fn shutdown(&self) -> impl Future<Output = ()> + Send;
}

#[cfg(test)]
mod tests {
    use crate::store::{ErrorKind, StoreError};
    use microfeed_common::model::{Id, user::Username};

    #[test]
    fn errors_classify_into_kinds() {
        let taken = StoreError::UsernameTaken(Username::new("alice".into()).unwrap());
        assert_eq!(taken.kind(), ErrorKind::Conflict);
        assert_eq!(taken.to_string(), "Username alice is already taken");

        assert_eq!(StoreError::InvalidCredentials.kind(), ErrorKind::Unauthorized);
        assert_eq!(StoreError::UserNotFound(Id::new(9)).kind(), ErrorKind::NotFound);
        assert_eq!(
            StoreError::Backend(sqlx::Error::PoolTimedOut).kind(),
            ErrorKind::Internal
        );
    }
}
