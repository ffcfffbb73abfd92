use crate::domain::compile::{CompileOutcome, CompileRequest};
use crate::domain::user::{NewUser, User};
use anyhow::Result;
use async_trait::async_trait;

/// Relays a compile request to whatever actually runs the code.
#[async_trait]
pub trait Compiler: Send + Sync {
    async fn forward(&self, request: &CompileRequest) -> Result<CompileOutcome>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `DomainError::DuplicateUser` when the mail is taken.
    async fn insert_user(&self, user: NewUser) -> Result<User>;
    async fn find_password_hash(&self, mail: &str) -> Result<Option<String>>;
    async fn list_users(&self) -> Result<Vec<User>>;
}
