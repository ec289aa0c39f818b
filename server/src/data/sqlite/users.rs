//! User account repository
//!
//! Lookup and creation for the accounts behind token issuance. Passwords
//! are stored as `salt$digest` where digest is SHA-256 over salt + password.

use chrono::{SecondsFormat, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::data::error::DataError;

/// One account row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub patronymic: Option<String>,
    pub email: String,
    pub login: String,
    pub password_hash: String,
    pub role: String,
}

/// Fields required to create an account
#[derive(Debug)]
pub struct NewUser<'a> {
    pub name: &'a str,
    pub surname: &'a str,
    pub patronymic: Option<&'a str>,
    pub email: &'a str,
    pub login: &'a str,
    pub password: &'a str,
    pub role: &'a str,
}

pub async fn find_user_by_login(
    pool: &SqlitePool,
    login: &str,
) -> Result<Option<UserRecord>, DataError> {
    let user = sqlx::query_as::<_, UserRecord>(
        "SELECT id, name, surname, patronymic, email, login, password_hash, role \
         FROM user WHERE login = ?",
    )
    .bind(login)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Insert a new account, returning its generated id
pub async fn insert_user(pool: &SqlitePool, user: &NewUser<'_>) -> Result<Uuid, DataError> {
    let id = Uuid::new_v4();
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    sqlx::query(
        "INSERT INTO user (id, name, surname, patronymic, email, login, password_hash, role, registered_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(user.name)
    .bind(user.surname)
    .bind(user.patronymic)
    .bind(user.email)
    .bind(user.login)
    .bind(hash_password(user.password))
    .bind(user.role)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn count_users(pool: &SqlitePool) -> Result<i64, DataError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt_hex = hex::encode(salt);
    format!("{salt_hex}${}", digest(&salt_hex, password))
}

/// Constant-format check of a password against a stored `salt$digest`
pub fn verify_password(password: &str, stored: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, expected)) => digest(salt, password) == expected,
        None => false,
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
