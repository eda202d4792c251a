use crate::{
    memory::MemoryStore,
    postgres::{ConnectError, PgStore},
    store::{Result, Store},
};
use microfeed_common::model::{
    Id,
    message::Message,
    user::{Password, User, UserMarker, Username},
};
use serde::Deserialize;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Postgres,
    Memory,
}

#[derive(Debug)]
pub enum Backend {
    Postgres(PgStore),
    Memory(MemoryStore),
}

impl Backend {
    pub async fn connect(kind: BackendKind, database_url: &str) -> Result<Self, ConnectError> {
        match kind {
            BackendKind::Postgres => Ok(Self::Postgres(PgStore::connect(database_url).await?)),
            BackendKind::Memory => Ok(Self::Memory(MemoryStore::new())),
        }
    }
}

impl From<PgStore> for Backend {
    fn from(value: PgStore) -> Self {
        Self::Postgres(value)
    }
}

impl From<MemoryStore> for Backend {
    fn from(value: MemoryStore) -> Self {
        Self::Memory(value)
    }
}

impl Store for Backend {
    async fn create_user(&self, username: Username, password: Password) -> Result<User> {
        match self {
            Backend::Postgres(store) => store.create_user(username, password).await,
            Backend::Memory(store) => store.create_user(username, password).await,
        }
    }

    async fn authenticate(&self, username: &Username, password: &Password) -> Result<User> {
        match self {
            Backend::Postgres(store) => store.authenticate(username, password).await,
            Backend::Memory(store) => store.authenticate(username, password).await,
        }
    }

    async fn create_message(&self, user_id: Id<UserMarker>, content: String) -> Result<Message> {
        match self {
            Backend::Postgres(store) => store.create_message(user_id, content).await,
            Backend::Memory(store) => store.create_message(user_id, content).await,
        }
    }

    async fn get_feed(&self, user_id: Id<UserMarker>) -> Result<Vec<Message>> {
        match self {
            Backend::Postgres(store) => store.get_feed(user_id).await,
            Backend::Memory(store) => store.get_feed(user_id).await,
        }
    }

    async fn shutdown(&self) {
        match self {
            Backend::Postgres(store) => store.shutdown().await,
            Backend::Memory(store) => store.shutdown().await,
        }
    }
}
