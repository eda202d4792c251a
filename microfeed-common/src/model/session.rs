use crate::model::{Id, user::UserMarker};
use std::{
    fmt::{Display, Formatter},
    num::ParseIntError,
    str::FromStr,
};
use thiserror::Error;

pub const SESSION_COOKIE_NAME: &str = "session";

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum SessionTokenDecodeError {
    #[error("Invalid user id: {0}")]
    InvalidUserId(#[from] ParseIntError),
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct SessionToken {
    pub user_id: Id<UserMarker>,
}

impl SessionToken {
    #[must_use]
    pub fn new(user_id: Id<UserMarker>) -> Self {
        Self { user_id }
    }

    #[must_use]
    pub fn as_token_str(self) -> String {
        self.to_string()
    }
}

impl Display for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.user_id, f)
    }
}

impl FromStr for SessionToken {
    type Err = SessionTokenDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let user_id = i64::from_str(s)?.into();

        Ok(Self { user_id })
    }
}
