//! In-memory `UserStore` used by tests. Uniqueness is checked case-insensitively
//! both on insert and on commit, like the unique indexes in the real schema.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{StoreError, UserStore, UserTransaction};
use super::repo_types::{NewUser, UserRecord};

#[derive(Default)]
struct Inner {
    users: Vec<UserRecord>,
    fail_inserts: bool,
    hide_from_precheck: bool,
}

#[derive(Clone, Default)]
pub struct MemoryUserStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryUserStore {
    pub fn count(&self) -> usize {
        self.inner.lock().unwrap().users.len()
    }

    pub fn all(&self) -> Vec<UserRecord> {
        self.inner.lock().unwrap().users.clone()
    }

    /// Make every `insert_user` fail with a backend error.
    pub fn fail_inserts(&self) {
        self.inner.lock().unwrap().fail_inserts = true;
    }

    /// Make `find_by_email_or_username` always miss, as if a concurrent
    /// registration committed right after the pre-check ran.
    pub fn hide_from_precheck(&self) {
        self.inner.lock().unwrap().hide_from_precheck = true;
    }
}

fn same(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

fn clashes(users: &[UserRecord], candidate: &UserRecord) -> bool {
    users
        .iter()
        .any(|u| same(&u.email, &candidate.email) || same(&u.username, &candidate.username))
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| same(&u.email, email)).cloned())
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let inner = self.inner.lock().unwrap();
        if inner.hide_from_precheck {
            return Ok(None);
        }
        Ok(inner
            .users
            .iter()
            .find(|u| same(&u.email, email) || same(&u.username, username))
            .cloned())
    }

    async fn begin(&self) -> Result<Box<dyn UserTransaction>, StoreError> {
        Ok(Box::new(MemoryTransaction {
            inner: Arc::clone(&self.inner),
            staged: Vec::new(),
        }))
    }
}

struct MemoryTransaction {
    inner: Arc<Mutex<Inner>>,
    staged: Vec<UserRecord>,
}

#[async_trait]
impl UserTransaction for MemoryTransaction {
    async fn insert_user(&mut self, user: &NewUser) -> Result<Uuid, StoreError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_inserts {
            return Err(StoreError::Backend(anyhow::anyhow!("injected insert failure")));
        }
        let now = OffsetDateTime::now_utc();
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            profile_image: user.profile_image.clone(),
            profile: user.profile.clone(),
            created_at: now,
            updated_at: now,
        };
        if clashes(&inner.users, &record) || clashes(&self.staged, &record) {
            return Err(StoreError::UniqueViolation);
        }
        let id = record.id;
        self.staged.push(record);
        Ok(id)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let MemoryTransaction { inner, staged } = *self;
        let mut inner = inner.lock().unwrap();
        if staged.iter().any(|r| clashes(&inner.users, r)) {
            return Err(StoreError::UniqueViolation);
        }
        inner.users.extend(staged);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
