//! Accounts, sessions and role assignments.
//!
//! Generally clients should never call these functions directly, and prefer the [`crate::AuthManagement`] trait
//! methods implemented on [`super::SqliteDatabase`] instead.
use chrono::Utc;
use log::*;
use sqlx::{FromRow, Row, SqliteConnection};

use crate::{
    db::traits::StoreError,
    db_types::{NewUser, Role, SessionToken, UserCredentials, UserId, UserProfile},
};

#[derive(FromRow)]
struct CredentialsRow {
    uid: UserId,
    password_hash: String,
}

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<UserProfile, StoreError> {
    let uid = UserId::random();
    let result = sqlx::query_as(
        r#"
            INSERT INTO users (uid, name, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING uid, name, email, created_at;
        "#,
    )
    .bind(uid.as_str())
    .bind(user.name)
    .bind(user.email.as_str())
    .bind(user.password_hash)
    .bind(Utc::now())
    .fetch_one(conn)
    .await;
    match result {
        Ok(row) => Ok(row),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(StoreError::DuplicateEmail(user.email)),
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_credentials(email: &str, conn: &mut SqliteConnection) -> Result<Option<UserCredentials>, sqlx::Error> {
    let row: Option<CredentialsRow> = sqlx::query_as("SELECT uid, password_hash FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(conn)
        .await?;
    Ok(row.map(|r| UserCredentials { uid: r.uid, password_hash: r.password_hash }))
}

pub async fn fetch_profile(uid: &UserId, conn: &mut SqliteConnection) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as("SELECT uid, name, email, created_at FROM users WHERE uid = $1")
        .bind(uid.as_str())
        .fetch_optional(conn)
        .await
}

pub async fn insert_session(uid: &UserId, conn: &mut SqliteConnection) -> Result<SessionToken, sqlx::Error> {
    let token = SessionToken::random();
    sqlx::query("INSERT INTO sessions (token, uid, created_at) VALUES ($1, $2, $3)")
        .bind(token.as_str())
        .bind(uid.as_str())
        .bind(Utc::now())
        .execute(conn)
        .await?;
    trace!("🔑️ New session opened for {uid}");
    Ok(token)
}

pub async fn session_user(token: &SessionToken, conn: &mut SqliteConnection) -> Result<Option<UserId>, sqlx::Error> {
    let row = sqlx::query("SELECT uid FROM sessions WHERE token = $1").bind(token.as_str()).fetch_optional(conn).await?;
    row.map(|r| r.try_get::<String, _>("uid").map(UserId::from)).transpose()
}

pub async fn delete_session(token: &SessionToken, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE token = $1").bind(token.as_str()).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn roles_for_user(uid: &UserId, conn: &mut SqliteConnection) -> Result<Vec<Role>, StoreError> {
    let rows = sqlx::query("SELECT role FROM role_assignments WHERE uid = $1 ORDER BY role")
        .bind(uid.as_str())
        .fetch_all(conn)
        .await?;
    rows.iter()
        .map(|r| {
            let name = r.try_get::<String, _>("role")?;
            name.parse::<Role>().map_err(|e| {
                error!("🔑️ Role assignment for {uid} holds an unknown role: {e}");
                StoreError::DatabaseError(e.to_string())
            })
        })
        .collect()
}

pub async fn assign_roles(uid: &UserId, roles: &[Role], conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    for role in roles {
        sqlx::query("INSERT OR IGNORE INTO role_assignments (uid, role) VALUES ($1, $2)")
            .bind(uid.as_str())
            .bind(role.to_string())
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}
