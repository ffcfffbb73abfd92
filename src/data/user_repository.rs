use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{NewUser, User};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace, warn};

#[derive(Default)]
struct Table {
    rows: Vec<User>,
    next_id: i32,
}

/// Process-local user table with the same mail uniqueness rule as the database.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    storage: Arc<RwLock<Table>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user), fields(mail = %user.mail))]
    async fn insert_user(&self, user: NewUser) -> Result<User> {
        trace!("Acquiring write lock for user storage");
        let mut table = self.storage.write().await;

        if table.rows.iter().any(|u| u.mail == user.mail) {
            warn!(mail = %user.mail, "Mail already present in storage");
            return Err(DomainError::DuplicateUser.into());
        }

        table.next_id += 1;
        let stored = User {
            id: table.next_id,
            name: user.name,
            mail: user.mail,
            password_hash: user.password_hash,
        };
        table.rows.push(stored.clone());

        debug!(user_id = stored.id, mail = %stored.mail, "User saved to memory storage");
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn find_password_hash(&self, mail: &str) -> Result<Option<String>> {
        let table = self.storage.read().await;
        let hash = table
            .rows
            .iter()
            .find(|u| u.mail == mail)
            .map(|u| u.password_hash.clone());
        if hash.is_none() {
            trace!(mail = mail, "User not found in storage");
        }
        Ok(hash)
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let table = self.storage.read().await;
        Ok(table.rows.clone())
    }
}
