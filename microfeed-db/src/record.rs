use microfeed_common::model::{
    ModelValidationError,
    message::Message,
    user::{Password, User, Username},
};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, FromRow)]
pub(crate) struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct MessageRecord {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: OffsetDateTime,
}

impl TryFrom<UserRecord> for User {
    type Error = ModelValidationError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            username: Username::new(value.username)?,
            password: Password::new(value.password),
        })
    }
}

impl From<MessageRecord> for Message {
    fn from(value: MessageRecord) -> Self {
        Self {
            id: value.id.into(),
            user_id: value.user_id.into(),
            content: value.content,
            created_at: value.created_at,
        }
    }
}
