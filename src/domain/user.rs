use crate::domain::de::null_as_empty;
use crate::domain::error::{DomainError, require_non_empty};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub mail: String,
    pub password_hash: String,
}

/// A user row ready for insertion; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub mail: String,
    pub password_hash: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mail: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pass: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_non_empty(&[
            ("name", &self.name),
            ("mail", &self.mail),
            ("pass", &self.pass),
        ])
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("mail", &self.mail)
            .field("pass", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub mail: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pass: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_non_empty(&[("mail", &self.mail), ("pass", &self.pass)])
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("mail", &self.mail)
            .field("pass", &"<redacted>")
            .finish()
    }
}

/// Listing representation of a user.
///
/// `pass` carries the stored argon2 hash; exposing it is a known information leak.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserView {
    pub name: String,
    pub mail: String,
    pub pass: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            mail: user.mail,
            pass: user.password_hash,
        }
    }
}
