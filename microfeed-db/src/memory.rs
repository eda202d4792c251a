use crate::store::{FEED_LIMIT, Result, Store, StoreError};
use microfeed_common::model::{
    Id,
    message::{Message, MessageMarker},
    user::{Password, User, UserMarker, Username},
};
use std::collections::{HashMap, VecDeque};
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug)]
struct MemoryState {
    users: HashMap<Username, User>,
    feeds: HashMap<Id<UserMarker>, VecDeque<Message>>,
    next_user_id: i64,
    next_message_id: i64,
    last_created_at: Option<OffsetDateTime>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            users: HashMap::new(),
            feeds: HashMap::new(),
            next_user_id: 1,
            next_message_id: 1,
            last_created_at: None,
        }
    }
}

impl MemoryState {
    fn allocate_user_id(&mut self) -> Id<UserMarker> {
        let id = self.next_user_id;
        self.next_user_id += 1;
        id.into()
    }

    fn allocate_message_id(&mut self) -> Id<MessageMarker> {
        let id = self.next_message_id;
        self.next_message_id += 1;
        id.into()
    }

    fn stamp(&mut self) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();
        let stamp = match self.last_created_at {
            // Keep stamps strictly increasing so feed order is total.
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(stamp);
        stamp
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    async fn create_user(&self, username: Username, password: Password) -> Result<User> {
        let mut state = self.state.lock().await;

        if state.users.contains_key(&username) {
            return Err(StoreError::UsernameTaken(username));
        }

        let user = User {
            id: state.allocate_user_id(),
            username: username.clone(),
            password,
        };
        state.users.insert(username, user.clone());
        state.feeds.insert(user.id, VecDeque::new());

        debug!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn authenticate(&self, username: &Username, password: &Password) -> Result<User> {
        let state = self.state.lock().await;

        state
            .users
            .get(username)
            .filter(|user| user.password == *password)
            .cloned()
            .ok_or(StoreError::InvalidCredentials)
    }

    async fn create_message(&self, user_id: Id<UserMarker>, content: String) -> Result<Message> {
        let mut state = self.state.lock().await;

        if !state.feeds.contains_key(&user_id) {
            return Err(StoreError::UserNotFound(user_id));
        }

        let message = Message {
            id: state.allocate_message_id(),
            user_id,
            content,
            created_at: state.stamp(),
        };
        state
            .feeds
            .entry(user_id)
            .or_default()
            .push_front(message.clone());

        debug!(%user_id, message_id = %message.id, "Created message");
        Ok(message)
    }

    async fn get_feed(&self, user_id: Id<UserMarker>) -> Result<Vec<Message>> {
        let state = self.state.lock().await;

        let feed = state
            .feeds
            .get(&user_id)
            .map(|feed| {
                feed.iter()
                    .take(usize::from(FEED_LIMIT))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(feed)
    }

    async fn shutdown(&self) {}
}

#[cfg(test)]
mod tests {
    use crate::{
        memory::MemoryStore,
        store::{ErrorKind, FEED_LIMIT, Store, StoreError},
    };
    use microfeed_common::model::{
        Id,
        user::{Password, Username},
    };
    use std::{collections::HashSet, sync::Arc};

    fn username(name: &str) -> Username {
        Username::new(name.into()).unwrap()
    }

    fn password(password: &str) -> Password {
        Password::new(password.into())
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts_and_keeps_original() {
        let store = MemoryStore::new();

        let original = store
            .create_user(username("alice"), password("pw"))
            .await
            .unwrap();
        let duplicate = store
            .create_user(username("alice"), password("other"))
            .await
            .unwrap_err();

        assert_eq!(duplicate.kind(), ErrorKind::Conflict);
        assert_eq!(
            store
                .authenticate(&username("alice"), &password("pw"))
                .await
                .unwrap(),
            original
        );
        assert!(matches!(
            store
                .authenticate(&username("alice"), &password("other"))
                .await,
            Err(StoreError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn authentication_requires_exact_match() {
        let store = MemoryStore::new();
        let alice = store
            .create_user(username("alice"), password("secret"))
            .await
            .unwrap();

        let authenticated = store
            .authenticate(&username("alice"), &password("secret"))
            .await
            .unwrap();
        assert_eq!(authenticated.id, alice.id);

        let near_misses = [
            ("alice", "secreT"),
            ("alice", "secret "),
            ("alice", "secre"),
            ("alicE", "secret"),
            ("alic", "secret"),
            ("bob", "secret"),
        ];
        for (name, pw) in near_misses {
            let err = store
                .authenticate(&username(name), &password(pw))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unauthorized, "{name}/{pw}");
        }
    }

    #[tokio::test]
    async fn feed_is_capped_newest_first_and_owned() {
        let store = MemoryStore::new();
        let alice = store
            .create_user(username("alice"), password("pw"))
            .await
            .unwrap();
        let bob = store
            .create_user(username("bob"), password("pw"))
            .await
            .unwrap();

        for i in 0..25 {
            store
                .create_message(alice.id, format!("alice {i}"))
                .await
                .unwrap();
            store
                .create_message(bob.id, format!("bob {i}"))
                .await
                .unwrap();
        }

        let feed = store.get_feed(alice.id).await.unwrap();
        assert_eq!(feed.len(), usize::from(FEED_LIMIT));
        assert_eq!(feed[0].content, "alice 24");
        assert_eq!(feed[19].content, "alice 5");
        assert!(feed.iter().all(|message| message.user_id == alice.id));
        assert!(
            feed.windows(2)
                .all(|pair| pair[0].created_at > pair[1].created_at && pair[0].id > pair[1].id)
        );
    }

    #[tokio::test]
    async fn short_feed_returns_everything() {
        let store = MemoryStore::new();
        let alice = store
            .create_user(username("alice"), password("pw"))
            .await
            .unwrap();

        for i in 0..3 {
            store
                .create_message(alice.id, format!("post {i}"))
                .await
                .unwrap();
        }

        let contents: Vec<_> = store
            .get_feed(alice.id)
            .await
            .unwrap()
            .into_iter()
            .map(|message| message.content)
            .collect();
        assert_eq!(contents, ["post 2", "post 1", "post 0"]);
    }

    #[tokio::test]
    async fn empty_feed_is_not_an_error() {
        let store = MemoryStore::new();
        let alice = store
            .create_user(username("alice"), password("pw"))
            .await
            .unwrap();

        assert!(store.get_feed(alice.id).await.unwrap().is_empty());
        assert!(store.get_feed(Id::new(404)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn returned_feed_is_detached_from_store() {
        let store = MemoryStore::new();
        let alice = store
            .create_user(username("alice"), password("pw"))
            .await
            .unwrap();
        store.create_message(alice.id, "first".into()).await.unwrap();

        let snapshot = store.get_feed(alice.id).await.unwrap();
        store.create_message(alice.id, "second".into()).await.unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.get_feed(alice.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn message_for_unknown_user_is_not_found() {
        let store = MemoryStore::new();

        let err = store
            .create_message(Id::new(42), "hello".into())
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::UserNotFound(id) if id == Id::new(42)));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn ids_are_sequential_per_entity() {
        let store = MemoryStore::new();
        let alice = store
            .create_user(username("alice"), password("pw"))
            .await
            .unwrap();
        let bob = store
            .create_user(username("bob"), password("pw"))
            .await
            .unwrap();
        let first = store.create_message(bob.id, "a".into()).await.unwrap();
        let second = store.create_message(alice.id, "b".into()).await.unwrap();

        assert_eq!((alice.id, bob.id), (Id::new(1), Id::new(2)));
        assert_eq!((first.id, second.id), (Id::new(1), Id::new(2)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registrations_get_unique_ids() {
        let store = Arc::new(MemoryStore::new());

        let handles: Vec<_> = (0..64)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .create_user(username(&format!("user{i}")), password("pw"))
                        .await
                })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            let user = handle.await.unwrap().unwrap();
            assert!(ids.insert(user.id));
        }

        assert_eq!(ids.len(), 64);
        assert!(ids.iter().all(|id| (1..=64).contains(&id.get())));
    }

    #[tokio::test]
    async fn shutdown_is_a_no_op() {
        let store = MemoryStore::new();
        store.shutdown().await;

        assert!(
            store
                .create_user(username("alice"), password("pw"))
                .await
                .is_ok()
        );
    }
}
