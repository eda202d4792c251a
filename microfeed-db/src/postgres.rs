use crate::{
    record::{MessageRecord, UserRecord},
    store::{FEED_LIMIT, Result, Store, StoreError},
};
use microfeed_common::model::{
    Id,
    message::Message,
    user::{Password, User, UserMarker, Username},
};
use sqlx::{
    PgPool,
    migrate::{MigrateError, Migrator},
    postgres::PgPoolOptions,
    query_as,
};
use thiserror::Error;
use tracing::debug;

static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Error connecting to the database: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("Error running database migrations: {0}")]
    Migrate(#[from] MigrateError),
}

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, ConnectError> {
        let pool = PgPoolOptions::new()
            .connect(database_url)
            .await
            .map_err(ConnectError::Connect)?;

        MIGRATOR.run(&pool).await?;

        Ok(Self::new(pool))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db_err| db_err.is_foreign_key_violation())
}

impl Store for PgStore {
    async fn create_user(&self, username: Username, password: Password) -> Result<User> {
        let record = query_as::<_, UserRecord>(
            "
            INSERT INTO users (username, password)
            VALUES ($1, $2)
            RETURNING id, username, password
            ",
        )
        .bind(username.get())
        .bind(password.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                StoreError::UsernameTaken(username.clone())
            } else {
                StoreError::Backend(err)
            }
        })?;

        let user = User::try_from(record)?;
        debug!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn authenticate(&self, username: &Username, password: &Password) -> Result<User> {
        let record = query_as::<_, UserRecord>(
            "
            SELECT
                users.id,
                users.username,
                users.password
            FROM
                users
            WHERE
                users.username = $1 AND users.password = $2
            ",
        )
        .bind(username.get())
        .bind(password.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::Backend)?
        .ok_or(StoreError::InvalidCredentials)?;

        Ok(User::try_from(record)?)
    }

    async fn create_message(&self, user_id: Id<UserMarker>, content: String) -> Result<Message> {
        let record = query_as::<_, MessageRecord>(
            "
            INSERT INTO messages (user_id, content)
            VALUES ($1, $2)
            RETURNING id, user_id, content, created_at
            ",
        )
        .bind(user_id.get())
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                StoreError::UserNotFound(user_id)
            } else {
                StoreError::Backend(err)
            }
        })?;

        let message = Message::from(record);
        debug!(%user_id, message_id = %message.id, "Created message");
        Ok(message)
    }

    async fn get_feed(&self, user_id: Id<UserMarker>) -> Result<Vec<Message>> {
        let records = query_as::<_, MessageRecord>(
            "
            SELECT
                messages.id,
                messages.user_id,
                messages.content,
                messages.created_at
            FROM
                messages
            WHERE
                messages.user_id = $1
            ORDER BY
                messages.created_at DESC,
                messages.id DESC
            LIMIT $2
            ",
        )
        .bind(user_id.get())
        .bind(i64::from(FEED_LIMIT))
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::Backend)?;

        Ok(records.into_iter().map(Message::from).collect())
    }

    async fn shutdown(&self) {
        self.pool.close().await;
        debug!("Closed database pool");
    }
}
