//! In-process [`UsersFacade`] adapter backed by a locked ordered map.
//!
//! Serves the binary when no external user service is configured and backs
//! the end-to-end tests. Identifiers are allocated from 1 and never reused,
//! even after deletion.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::SecondsFormat;
use mockable::{Clock, DefaultClock};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::domain::ports::UsersFacade;
use crate::domain::{Envelope, Error, User, UserDraft, UserFilter, UserId, UserProfile};

const CREATED_AT: &str = "createdAt";
const UPDATED_AT: &str = "updatedAt";

#[derive(Debug)]
struct Store {
    next_id: u64,
    users: BTreeMap<UserId, User>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            next_id: 1,
            users: BTreeMap::new(),
        }
    }
}

fn exhausted() -> Error {
    Error::internal("user identifier space exhausted")
}

impl Store {
    fn allocate(&mut self) -> Result<UserId, Error> {
        let id = UserId::new(self.next_id).map_err(|_| exhausted())?;
        self.next_id += 1;
        Ok(id)
    }

    /// Claim `count` consecutive ids, or none at all.
    fn allocate_many(&mut self, count: usize) -> Result<Vec<UserId>, Error> {
        let count = u64::try_from(count).map_err(|_| exhausted())?;
        let end = self.next_id.checked_add(count).ok_or_else(exhausted)?;
        let ids = (self.next_id..end)
            .map(UserId::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| exhausted())?;
        self.next_id = end;
        Ok(ids)
    }
}

/// Users kept in memory for the lifetime of the process.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use users_api::domain::ports::UsersFacade;
/// use users_api::domain::UserDraft;
/// use users_api::outbound::memory::InMemoryUsersFacade;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let facade = InMemoryUsersFacade::default();
/// let draft = UserDraft::from_value(json!({ "name": "Ada" })).unwrap();
/// let created = facade.create(draft).await;
/// assert_eq!(created.status_code(), 201);
/// assert_eq!(created.payload()["id"], json!(1));
/// # });
/// ```
pub struct InMemoryUsersFacade {
    store: RwLock<Store>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryUsersFacade {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl InMemoryUsersFacade {
    /// Empty store stamping records with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            store: RwLock::new(Store::default()),
            clock,
        }
    }

    fn now(&self) -> Value {
        Value::String(self.clock.utc().to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Store>, Error> {
        self.store.read().map_err(|_| {
            error!("user store lock poisoned");
            Error::internal("user store lock poisoned")
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Store>, Error> {
        self.store.write().map_err(|_| {
            error!("user store lock poisoned");
            Error::internal("user store lock poisoned")
        })
    }

    fn insert(&self, store: &mut Store, id: UserId, draft: UserDraft) -> User {
        let now = self.now();
        let mut profile = draft.into_fields();
        profile.insert(CREATED_AT.to_owned(), now.clone());
        profile.insert(UPDATED_AT.to_owned(), now);
        let user = User::new(id, profile);
        store.users.insert(id, user.clone());
        user
    }
}

fn render<T: Serialize>(value: &T) -> Result<Value, Error> {
    serde_json::to_value(value).map_err(|err| {
        error!(error = %err, "failed to serialise users");
        Error::internal("failed to serialise users")
    })
}

fn respond(outcome: Result<Envelope, Error>) -> Envelope {
    outcome.unwrap_or_else(Envelope::from)
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn matches(user: &User, filter: &UserFilter) -> bool {
    filter.criteria().iter().all(|(key, expected)| {
        if key == "id" {
            return expected.parse::<UserId>().is_ok_and(|id| id == user.id());
        }
        user.profile()
            .get(key)
            .is_some_and(|value| field_text(value) == *expected)
    })
}

fn missing(id: UserId) -> Error {
    Error::not_found(format!("user {id} not found"))
}

fn merge(profile: &mut UserProfile, mut fields: UserProfile, now: Value) {
    fields.remove("id");
    fields.remove(CREATED_AT);
    profile.extend(fields);
    profile.insert(UPDATED_AT.to_owned(), now);
}

#[async_trait]
impl UsersFacade for InMemoryUsersFacade {
    async fn list_all(&self) -> Envelope {
        respond(self.read().and_then(|store| {
            let users: Vec<&User> = store.users.values().collect();
            render(&users).map(Envelope::ok)
        }))
    }

    async fn find(&self, filter: &UserFilter) -> Envelope {
        respond(self.read().and_then(|store| {
            let users: Vec<&User> = store
                .users
                .values()
                .filter(|user| matches(user, filter))
                .collect();
            render(&users).map(Envelope::ok)
        }))
    }

    async fn create(&self, draft: UserDraft) -> Envelope {
        respond(self.write().and_then(|mut store| {
            let id = store.allocate()?;
            let user = self.insert(&mut store, id, draft);
            render(&user).map(Envelope::created)
        }))
    }

    async fn bulk_create(&self, drafts: Vec<UserDraft>) -> Envelope {
        if drafts.is_empty() {
            return Envelope::from(Error::invalid_request("bulk payload must not be empty"));
        }
        respond(self.write().and_then(|mut store| {
            let ids = store.allocate_many(drafts.len())?;
            let users: Vec<User> = ids
                .into_iter()
                .zip(drafts)
                .map(|(id, draft)| self.insert(&mut store, id, draft))
                .collect();
            render(&users).map(Envelope::created)
        }))
    }

    async fn get_by_id(&self, id: UserId) -> Envelope {
        respond(self.read().and_then(|store| {
            let user = store.users.get(&id).ok_or_else(|| missing(id))?;
            render(user).map(Envelope::ok)
        }))
    }

    async fn update(&self, id: UserId, draft: UserDraft) -> Envelope {
        let now = self.now();
        respond(self.write().and_then(|mut store| {
            let user = store.users.get_mut(&id).ok_or_else(|| missing(id))?;
            merge(user.profile_mut(), draft.into_fields(), now);
            render(&*user).map(Envelope::ok)
        }))
    }

    async fn delete_by_id(&self, id: UserId) -> Envelope {
        respond(self.write().and_then(|mut store| {
            let user = store.users.remove(&id).ok_or_else(|| missing(id))?;
            render(&user).map(Envelope::ok)
        }))
    }
}

#[cfg(test)]
mod tests;
