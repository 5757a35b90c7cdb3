use std::fmt::Debug;

use feast_common::Secret;
use log::*;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    db::traits::AuthManagement,
    db_types::{NewUser, Role, SessionToken, UserId, UserProfile},
    feast_api::{errors::AuthApiError, session::Session},
    helpers::{hash_password, verify_against_decoy, verify_password},
};

static EMAIL_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .map_err(|e| error!("🔑️ The email pattern does not compile. Emails are not validated. {e}"))
        .ok()
});

pub struct AuthApi<B> {
    db: B,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.db)
    }
}

impl<B> AuthApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AuthApi<B>
where B: AuthManagement
{
    /// Creates an account with a user profile and signs the new user in.
    pub async fn sign_up(&self, name: &str, email: &str, password: &Secret<String>) -> Result<Session, AuthApiError> {
        let name = name.trim();
        let email = normalize_email(email)?;
        if name.is_empty() {
            return Err(AuthApiError::InvalidInput("Name cannot be blank".to_string()));
        }
        if password.reveal().trim().is_empty() {
            return Err(AuthApiError::InvalidInput("Password cannot be blank".to_string()));
        }
        let password_hash = hash_password(password).map_err(|e| {
            error!("🔑️ Could not hash the password for a new account. {e}");
            AuthApiError::PasswordHash(e.to_string())
        })?;
        let user = NewUser { name: name.to_string(), email, password_hash };
        let profile = self.db.create_user(user).await?;
        info!("🔑️ New account {} created for {}", profile.uid, profile.email);
        self.open_session(profile.uid).await
    }

    pub async fn sign_in(&self, email: &str, password: &Secret<String>) -> Result<Session, AuthApiError> {
        let email = normalize_email(email)?;
        let Some(credentials) = self.db.fetch_credentials(&email).await? else {
            debug!("🔑️ Sign in attempt for unknown email {email}");
            verify_against_decoy(password);
            return Err(AuthApiError::InvalidCredentials);
        };
        if !verify_password(password, &credentials.password_hash) {
            debug!("🔑️ Wrong password for {email}");
            return Err(AuthApiError::InvalidCredentials);
        }
        self.open_session(credentials.uid).await
    }

    /// Ends the session. Signing out twice is harmless.
    pub async fn sign_out(&self, session: &Session) -> Result<(), AuthApiError> {
        if self.db.delete_session(&session.token).await? {
            debug!("🔑️ {} signed out", session.user_id);
        }
        Ok(())
    }

    pub async fn is_signed_in(&self, session: &Session) -> Result<bool, AuthApiError> {
        let owner = self.db.session_user(&session.token).await?;
        Ok(owner.as_ref() == Some(&session.user_id))
    }

    /// Restores the session for a token, e.g. on app start.
    pub async fn current_user(&self, token: &SessionToken) -> Result<Session, AuthApiError> {
        let uid = self.db.session_user(token).await?.ok_or(AuthApiError::SessionExpired)?;
        self.build_session(uid, token.clone()).await
    }

    pub async fn profile(&self, session: &Session) -> Result<UserProfile, AuthApiError> {
        if !self.is_signed_in(session).await? {
            return Err(AuthApiError::SessionExpired);
        }
        self.db
            .fetch_user_profile(&session.user_id)
            .await?
            .ok_or_else(|| AuthApiError::ProfileNotFound(session.user_id.clone()))
    }

    pub async fn assign_roles(&self, uid: &UserId, roles: &[Role]) -> Result<(), AuthApiError> {
        if self.db.fetch_user_profile(uid).await?.is_none() {
            return Err(AuthApiError::ProfileNotFound(uid.clone()));
        }
        self.db.assign_roles(uid, roles).await?;
        info!("🔑️ Roles {roles:?} assigned to {uid}");
        Ok(())
    }

    async fn open_session(&self, uid: UserId) -> Result<Session, AuthApiError> {
        let token = self.db.create_session(&uid).await?;
        self.build_session(uid, token).await
    }

    async fn build_session(&self, uid: UserId, token: SessionToken) -> Result<Session, AuthApiError> {
        let profile = self.db.fetch_user_profile(&uid).await?.ok_or_else(|| AuthApiError::ProfileNotFound(uid.clone()))?;
        let roles = self.db.fetch_roles(&uid).await?;
        Ok(Session::new(uid, Some(profile.name), roles, token))
    }
}

fn normalize_email(email: &str) -> Result<String, AuthApiError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AuthApiError::InvalidInput("Email cannot be blank".to_string()));
    }
    match EMAIL_PATTERN.as_ref() {
        Some(pattern) if !pattern.is_match(&email) => Err(AuthApiError::InvalidInput(format!("{email} is not an email"))),
        _ => Ok(email),
    }
}
