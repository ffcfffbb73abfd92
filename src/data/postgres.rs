use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{NewUser, User};
use crate::infrastructure::config::DatabaseConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, PgPool};
use tracing::{debug, error, info, instrument, warn};

const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id       serial PRIMARY KEY,
    name     varchar(40) NOT NULL,
    mail     text NOT NULL UNIQUE,
    password text NOT NULL
)
"#;

// Reserved for compile history; nothing writes to it yet.
const CREATE_COMPILES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS compiles (
    id         serial PRIMARY KEY,
    language   varchar(40) NOT NULL,
    result     text NOT NULL,
    id_user    integer NOT NULL REFERENCES users(id),
    code       text,
    created_at timestamp DEFAULT current_timestamp
)
"#;

#[derive(FromRow)]
struct UserRow {
    id: i32,
    name: String,
    mail: String,
    password: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            mail: row.mail,
            password_hash: row.password,
        }
    }
}

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .with_context(|| {
                format!(
                    "could not connect to postgres at {}:{}/{}",
                    config.host, config.port, config.name
                )
            })?;

        info!(host = %config.host, database = %config.name, "Postgres pool established");
        Ok(Self::new(pool))
    }

    /// Creates the `users` and `compiles` tables when absent. Safe to run on every start.
    pub async fn init_schema(&self) -> Result<()> {
        for statement in [CREATE_USERS_TABLE, CREATE_COMPILES_TABLE] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("failed to initialise database schema")?;
        }
        debug!("Database schema ensured");
        Ok(())
    }
}

fn map_sqlx_error(err: sqlx::Error) -> DomainError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            warn!(constraint = ?db_err.constraint(), "Unique constraint violated");
            return DomainError::DuplicateUser;
        }
        error!(code = ?db_err.code(), message = db_err.message(), "Database rejected statement");
    } else {
        error!(error = %err, "Database operation failed");
    }
    DomainError::StoreUnavailable(err.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[instrument(skip(self, user), fields(mail = %user.mail))]
    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO users (name, mail, password) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&user.name)
        .bind(&user.mail)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(user_id = id, "User row inserted");
        Ok(User {
            id,
            name: user.name,
            mail: user.mail,
            password_hash: user.password_hash,
        })
    }

    #[instrument(skip(self))]
    async fn find_password_hash(&self, mail: &str) -> Result<Option<String>> {
        let hash: Option<String> = sqlx::query_scalar("SELECT password FROM users WHERE mail = $1")
            .bind(mail)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(hash)
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>> {
        let rows: Vec<UserRow> =
            sqlx::query_as("SELECT id, name, mail, password FROM users ORDER BY id")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        debug!(count = rows.len(), "Users fetched");
        Ok(rows.into_iter().map(User::from).collect())
    }
}
