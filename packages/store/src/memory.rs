//! In-memory collaborators for tests and the offline demo backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use base64::Engine;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::documents::{compare_values, Direction, Document, DocumentStore, Query, Record};
use crate::error::{IdentityError, StoreError};
use crate::identity::{IdentityBroadcaster, IdentityService, Subscription};
use crate::models::Identity;
use crate::objects::ObjectStore;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct DocumentsInner {
    collections: HashMap<String, BTreeMap<String, Map<String, Value>>>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl DocumentsInner {
    /// Strictly increasing so that insertion order survives timestamp ordering.
    fn next_timestamp(&mut self) -> String {
        let now = Utc::now();
        let stamp = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(stamp);
        stamp.to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

/// In-memory DocumentStore.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<Mutex<DocumentsInner>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, collection: &str) -> usize {
        lock(&self.inner)
            .collections
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: &str, record: Record) -> Result<String, StoreError> {
        let mut inner = lock(&self.inner);
        let mut fields = record.fields;
        for field in &record.server_timestamps {
            let stamp = inner.next_timestamp();
            fields.insert(field.clone(), Value::String(stamp));
        }
        let id = uuid::Uuid::new_v4().simple().to_string();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let inner = lock(&self.inner);
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document {
                id: id.to_string(),
                fields: fields.clone(),
            }))
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let inner = lock(&self.inner);
        let Some(docs) = inner.collections.get(collection) else {
            return Ok(Vec::new());
        };
        let mut matched: Vec<Document> = docs
            .iter()
            .map(|(id, fields)| Document {
                id: id.clone(),
                fields: fields.clone(),
            })
            .filter(|doc| query.filters.iter().all(|f| f.matches(doc)))
            .collect();

        if let Some(order) = query.effective_order() {
            matched.retain(|doc| doc.field(&order.field).is_some());
            matched.sort_by(|a, b| {
                let by_field = match (a.field(&order.field), b.field(&order.field)) {
                    (Some(x), Some(y)) => compare_values(x, y).unwrap_or(std::cmp::Ordering::Equal),
                    _ => std::cmp::Ordering::Equal,
                };
                let by_field = match order.direction {
                    Direction::Ascending => by_field,
                    Direction::Descending => by_field.reverse(),
                };
                by_field.then_with(|| a.id.cmp(&b.id))
            });
        }
        Ok(matched)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut inner = lock(&self.inner);
        if let Some(docs) = inner.collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}

/// In-memory ObjectStore. Uploaded objects are served back as `data:` URLs.
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<Mutex<HashMap<String, (String, Vec<u8>)>>>,
    fail_deletes: Arc<AtomicBool>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent delete fail, to exercise partial-failure paths.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn contains(&self, path: &str) -> bool {
        lock(&self.objects).contains_key(path)
    }

    pub fn len(&self) -> usize {
        lock(&self.objects).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ObjectStore for MemoryObjectStore {
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StoreError> {
        let url = format!(
            "data:{content_type};base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&bytes)
        );
        lock(&self.objects).insert(path.to_string(), (content_type.to_string(), bytes));
        Ok(url)
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(format!("delete of {path} refused")));
        }
        match lock(&self.objects).remove(path) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(path.to_string())),
        }
    }
}

struct Account {
    password: String,
    identity: Identity,
}

#[derive(Default)]
struct IdentityInner {
    accounts: HashMap<String, Account>,
    current: Option<Identity>,
    resolved: bool,
}

/// In-memory IdentityService. Starts unresolved: subscribers hear nothing
/// until [`IdentityService::restore`], a sign-in/out, or [`Self::emit`].
#[derive(Clone, Default)]
pub struct MemoryIdentityService {
    inner: Arc<Mutex<IdentityInner>>,
    broadcaster: IdentityBroadcaster,
}

impl MemoryIdentityService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to register an account up front.
    pub fn with_account(self, email: &str, password: &str, display_name: Option<&str>) -> Self {
        let identity = Identity::new(
            uuid::Uuid::new_v4().simple().to_string(),
            display_name,
            Some(email),
        );
        lock(&self.inner).accounts.insert(
            email.to_lowercase(),
            Account {
                password: password.to_string(),
                identity,
            },
        );
        self
    }

    /// Set the current identity and notify subscribers.
    pub fn emit(&self, event: Option<Identity>) {
        {
            let mut inner = lock(&self.inner);
            inner.current = event.clone();
            inner.resolved = true;
        }
        self.broadcaster.publish(event);
    }

    pub fn current(&self) -> Option<Identity> {
        lock(&self.inner).current.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.broadcaster.subscriber_count()
    }
}

impl IdentityService for MemoryIdentityService {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        let identity = {
            let inner = lock(&self.inner);
            match inner.accounts.get(&email.trim().to_lowercase()) {
                Some(account) if account.password == password => account.identity.clone(),
                _ => return Err(IdentityError::InvalidCredentials),
            }
        };
        self.emit(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        let email = email.trim().to_lowercase();
        if password.len() < 6 {
            return Err(IdentityError::WeakPassword);
        }
        let identity = {
            let mut inner = lock(&self.inner);
            if inner.accounts.contains_key(&email) {
                return Err(IdentityError::AccountExists);
            }
            let identity = Identity::new(
                uuid::Uuid::new_v4().simple().to_string(),
                None,
                Some(&email),
            );
            inner.accounts.insert(
                email,
                Account {
                    password: password.to_string(),
                    identity: identity.clone(),
                },
            );
            identity
        };
        self.emit(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.emit(None);
        Ok(())
    }

    async fn update_display_name(
        &self,
        identity: &Identity,
        name: &str,
    ) -> Result<Identity, IdentityError> {
        let (updated, is_current) = {
            let mut inner = lock(&self.inner);
            let account = inner
                .accounts
                .values_mut()
                .find(|a| a.identity.id == identity.id)
                .ok_or_else(|| IdentityError::Rejected("USER_NOT_FOUND".to_string()))?;
            account.identity.display_name = Some(name.to_string());
            let updated = account.identity.clone();
            let is_current = inner.current.as_ref().is_some_and(|c| c.id == updated.id);
            (updated, is_current)
        };
        // Queued after the sign-up event, so subscribers end on the named identity
        if is_current {
            self.emit(Some(updated.clone()));
        }
        Ok(updated)
    }

    fn subscribe(&self) -> Subscription {
        let inner = lock(&self.inner);
        let initial = inner.resolved.then(|| inner.current.clone());
        self.broadcaster.subscribe_with(initial)
    }

    async fn restore(&self) {
        let current = {
            let mut inner = lock(&self.inner);
            if inner.resolved {
                return;
            }
            inner.resolved = true;
            inner.current.clone()
        };
        self.broadcaster.publish(current);
    }
}

/// The three in-memory collaborators wired together.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    pub identity: MemoryIdentityService,
    pub documents: MemoryDocumentStore,
    pub objects: MemoryObjectStore,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}
