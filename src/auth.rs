// Simulated sign-in against an in-memory user registry

use uuid::Uuid;

use crate::models::{Role, User, UserPreferences};

// The distinguished credential pair that always yields an admin session
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub email: String,
    pub password: String,
}

// Lookup-by-email table of known users
#[derive(Debug, Clone)]
pub struct UserRegistry {
    users: Vec<User>,
}

fn demo_user(id: &str, name: &str, email: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        role,
        preferences: None,
        vehicle_number: None,
    }
}

// Fill in the number-format preference when the record doesn't carry one
fn ensure_preferences(user: &mut User) {
    let preferences = user.preferences.get_or_insert_with(UserPreferences::default);
    if preferences.use_indian_number_format.is_none() {
        preferences.use_indian_number_format = Some(true);
    }
}

impl UserRegistry {
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    pub fn with_demo_users() -> Self {
        Self::new(vec![
            demo_user("user1", "John Doe", "john@example.com", Role::User),
            demo_user("user2", "Jane Smith", "jane@example.com", Role::User),
            demo_user("admin1", "Admin User", "admin@example.com", Role::Admin),
        ])
    }

    // Emails match case-sensitively
    #[cfg(test)]
    pub fn find(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    fn find_mut(&mut self, email: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.email == email)
    }

    // Returns the admin record for `email`, creating or promoting it as needed
    fn ensure_admin(&mut self, email: &str) -> &mut User {
        if let Some(index) = self.users.iter().position(|u| u.email == email) {
            let user = &mut self.users[index];
            user.role = Role::Admin;
            return user;
        }

        tracing::info!("Registry has no admin record for {}; creating one", email);
        let id = format!("admin-{}", &Uuid::new_v4().simple().to_string()[..8]);
        self.users.push(demo_user(&id, "Admin User", email, Role::Admin));
        let last = self.users.len() - 1;
        &mut self.users[last]
    }

    /// Checks a credential pair and returns the signed-in user.
    ///
    /// The admin pair always succeeds with an admin session. Any other
    /// registered email is accepted with any non-empty password; this is a
    /// stand-in for a real authentication backend.
    pub fn authenticate(
        &mut self,
        email: &str,
        password: &str,
        admin: &AdminCredentials,
    ) -> Option<User> {
        if email == admin.email && password == admin.password {
            let user = self.ensure_admin(email);
            ensure_preferences(user);
            return Some(user.clone());
        }
        if email == admin.email || password.is_empty() {
            return None;
        }

        let user = self.find_mut(email)?;
        ensure_preferences(user);
        Some(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> AdminCredentials {
        AdminCredentials {
            email: "admin@example.com".to_string(),
            password: "1234".to_string(),
        }
    }

    #[test]
    fn test_known_email_accepts_any_non_empty_password() {
        let mut registry = UserRegistry::with_demo_users();
        for password in ["x", "hunter2", "definitely-not-checked"] {
            let user = registry.authenticate("john@example.com", password, &admin()).unwrap();
            assert_eq!(user.id, "user1");
            assert_eq!(user.role, Role::User);
        }
    }

    #[test]
    fn test_empty_password_is_rejected() {
        let mut registry = UserRegistry::with_demo_users();
        assert!(registry.authenticate("john@example.com", "", &admin()).is_none());
    }

    #[test]
    fn test_unknown_or_differently_cased_email_fails() {
        let mut registry = UserRegistry::with_demo_users();
        assert!(registry.authenticate("nobody@example.com", "pw", &admin()).is_none());
        assert!(registry.authenticate("John@example.com", "pw", &admin()).is_none());
    }

    #[test]
    fn test_admin_email_requires_admin_password() {
        let mut registry = UserRegistry::with_demo_users();
        assert!(registry.authenticate("admin@example.com", "wrong", &admin()).is_none());
    }

    #[test]
    fn test_admin_pair_succeeds_on_empty_registry() {
        let mut registry = UserRegistry::new(Vec::new());
        let user = registry.authenticate("admin@example.com", "1234", &admin()).unwrap();
        assert_eq!(user.role, Role::Admin);
        // The registry now holds the admin record
        assert_eq!(registry.find("admin@example.com").map(|u| u.role), Some(Role::Admin));
    }

    #[test]
    fn test_admin_pair_promotes_existing_record() {
        let mut registry = UserRegistry::new(vec![demo_user(
            "u9",
            "Ops",
            "admin@example.com",
            Role::User,
        )]);
        let user = registry.authenticate("admin@example.com", "1234", &admin()).unwrap();
        assert_eq!(user.id, "u9");
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn test_login_defaults_number_format_preference() {
        let mut registry = UserRegistry::with_demo_users();
        let user = registry.authenticate("jane@example.com", "pw", &admin()).unwrap();
        assert_eq!(
            user.preferences.and_then(|p| p.use_indian_number_format),
            Some(true)
        );
        // Written back to the registry record
        let stored = registry.find("jane@example.com").unwrap();
        assert_eq!(
            stored.preferences.as_ref().and_then(|p| p.use_indian_number_format),
            Some(true)
        );
    }

    #[test]
    fn test_explicit_preference_is_kept() {
        let mut jane = demo_user("user2", "Jane Smith", "jane@example.com", Role::User);
        jane.preferences = Some(UserPreferences { use_indian_number_format: Some(false) });
        let mut registry = UserRegistry::new(vec![jane]);
        let user = registry.authenticate("jane@example.com", "pw", &admin()).unwrap();
        assert!(!user.uses_indian_format());
    }
}
