use crate::{
    db::traits::StoreError,
    db_types::{NewUser, Role, SessionToken, UserCredentials, UserId, UserProfile},
};

/// Accounts, sessions and role assignments.
#[allow(async_fn_in_trait)]
pub trait AuthManagement {
    /// Creates the account and its profile in one go. New accounts get the `Customer` role.
    /// Fails with [`StoreError::DuplicateEmail`] if the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<UserProfile, StoreError>;

    async fn fetch_credentials(&self, email: &str) -> Result<Option<UserCredentials>, StoreError>;

    async fn fetch_user_profile(&self, uid: &UserId) -> Result<Option<UserProfile>, StoreError>;

    async fn create_session(&self, uid: &UserId) -> Result<SessionToken, StoreError>;

    /// The user a session token belongs to, if the session is still open.
    async fn session_user(&self, token: &SessionToken) -> Result<Option<UserId>, StoreError>;

    async fn delete_session(&self, token: &SessionToken) -> Result<bool, StoreError>;

    async fn fetch_roles(&self, uid: &UserId) -> Result<Vec<Role>, StoreError>;

    /// Adds the roles to the user. Roles the user already has are left alone.
    async fn assign_roles(&self, uid: &UserId, roles: &[Role]) -> Result<(), StoreError>;
}
