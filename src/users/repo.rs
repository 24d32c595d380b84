use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{NewUser, UserRecord};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The insert hit the UNIQUE constraint on username or email.
    #[error("username or email already taken")]
    UniqueViolation,
    #[error(transparent)]
    Backend(anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e.as_database_error() {
            Some(db) if db.is_unique_violation() => StoreError::UniqueViolation,
            _ => StoreError::Backend(e.into()),
        }
    }
}

/// Read side of the users table plus a way to open a write transaction.
///
/// Usernames and emails are unique regardless of letter case, and lookups
/// ignore case the same way.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<UserRecord>, StoreError>;

    async fn begin(&self) -> Result<Box<dyn UserTransaction>, StoreError>;
}

/// A write transaction on the users table.
///
/// Nothing is visible to other readers until `commit`. Dropping the
/// transaction without committing rolls it back, so any early return or `?`
/// between `begin` and `commit` leaves the store untouched.
#[async_trait]
pub trait UserTransaction: Send {
    async fn insert_user(&mut self, user: &NewUser) -> Result<Uuid, StoreError>;
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const USER_COLUMNS: &str = r#"
    id, username, email, password_hash, profile_image,
    first_name, last_name, bio, location, website, portfolio_url,
    social_links, date_of_birth, gender, art_styles, is_profile_private,
    created_at, updated_at
"#;

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_email_or_username(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE lower(email) = lower($1) OR lower(username) = lower($2) \
             LIMIT 1"
        ))
        .bind(email)
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn begin(&self) -> Result<Box<dyn UserTransaction>, StoreError> {
        let tx = self.db.begin().await?;
        Ok(Box::new(PgUserTransaction { tx }))
    }
}

struct PgUserTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UserTransaction for PgUserTransaction {
    async fn insert_user(&mut self, user: &NewUser) -> Result<Uuid, StoreError> {
        let now = OffsetDateTime::now_utc();
        let p = &user.profile;
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (
                username, email, password_hash, profile_image,
                first_name, last_name, bio, location, website, portfolio_url,
                social_links, date_of_birth, gender, art_styles, is_profile_private,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16)
            RETURNING id
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.profile_image) // Option<String> → NULL allowed
        .bind(&p.first_name)
        .bind(&p.last_name)
        .bind(&p.bio)
        .bind(&p.location)
        .bind(&p.website)
        .bind(&p.portfolio_url)
        .bind(&p.social_links)
        .bind(p.date_of_birth)
        .bind(&p.gender)
        .bind(&p.art_styles)
        .bind(p.is_profile_private)
        .bind(now)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::memory::MemoryUserStore;
    use crate::users::repo_types::ProfileDetails;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
            profile_image: None,
            profile: ProfileDetails::default(),
        }
    }

    #[test]
    fn non_database_errors_are_backend_errors() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn dropped_transaction_leaves_no_record() {
        let store = MemoryUserStore::default();
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_user(&new_user("ghost", "ghost@example.com"))
                .await
                .unwrap();
        }
        assert_eq!(store.count(), 0);
        assert!(store
            .find_by_email("ghost@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn concurrent_inserts_of_same_email_conflict_on_commit() {
        let store = MemoryUserStore::default();
        let mut first = store.begin().await.unwrap();
        let mut second = store.begin().await.unwrap();

        first.insert_user(&new_user("alice", "a@example.com")).await.unwrap();
        second.insert_user(&new_user("alice2", "a@example.com")).await.unwrap();

        first.commit().await.unwrap();
        let err = second.commit().await.unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation));
        assert_eq!(store.count(), 1);
    }

    #[tokio::test]
    async fn lookup_by_email_or_username_matches_either() {
        let store = MemoryUserStore::default();
        let mut tx = store.begin().await.unwrap();
        tx.insert_user(&new_user("bob", "bob@example.com")).await.unwrap();
        tx.commit().await.unwrap();

        let by_name = store
            .find_by_email_or_username("other@example.com", "bob")
            .await
            .unwrap();
        let by_email = store
            .find_by_email_or_username("bob@example.com", "someone")
            .await
            .unwrap();
        let neither = store
            .find_by_email_or_username("x@example.com", "x_user")
            .await
            .unwrap();

        assert_eq!(by_name.map(|u| u.username), Some("bob".to_string()));
        assert_eq!(by_email.map(|u| u.email), Some("bob@example.com".to_string()));
        assert!(neither.is_none());
    }

    #[tokio::test]
    async fn letter_case_does_not_make_a_new_identity() {
        let store = MemoryUserStore::default();
        let mut tx = store.begin().await.unwrap();
        tx.insert_user(&new_user("mona", "mona@example.com")).await.unwrap();
        tx.commit().await.unwrap();

        let found = store
            .find_by_email_or_username("x@example.com", "MONA")
            .await
            .unwrap();
        assert!(found.is_some());
        assert!(store.find_by_email("Mona@Example.com").await.unwrap().is_some());

        let mut tx = store.begin().await.unwrap();
        let err = tx
            .insert_user(&new_user("Mona", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation));
    }
}
