use crate::db_types::{Role, SessionToken, UserId};

pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// The signed-in user an API object acts for. Sessions are handed out by [`crate::AuthApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub roles: Vec<Role>,
    pub token: SessionToken,
}

impl Session {
    pub fn new(user_id: UserId, display_name: Option<String>, roles: Vec<Role>, token: SessionToken) -> Self {
        Self { user_id, display_name, roles, token }
    }

    /// The name reviews are published under.
    pub fn author_name(&self) -> String {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(ANONYMOUS_AUTHOR)
            .to_string()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Couriers and admins may move any order along, not only their own.
    pub fn can_handle_any_order(&self) -> bool {
        self.has_role(Role::Courier) || self.has_role(Role::Admin)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn author_falls_back_to_anonymous() {
        let mut session = Session::new(UserId::from("u1"), None, vec![Role::Customer], SessionToken::random());
        assert_eq!(session.author_name(), "Anonymous");
        session.display_name = Some("   ".into());
        assert_eq!(session.author_name(), "Anonymous");
        session.display_name = Some("Linh".into());
        assert_eq!(session.author_name(), "Linh");
        assert!(!session.can_handle_any_order());
        session.roles.push(Role::Courier);
        assert!(session.can_handle_any_order());
    }
}
