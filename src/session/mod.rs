//! session.rs
//!
//! Per-user session state: login flag, chosen role, chosen profile.
//!
//! The state machine here is pure. All transitions are plain in-memory
//! mutations with no I/O, so the whole login/role/profile flow is testable
//! without a running store. Persistence across requests lives in
//! [`store::SessionStore`].

pub mod store;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Customer,
}

impl Role {
    pub fn parse(raw: &str) -> Result<Role, AppError> {
        match raw {
            "manager" => Ok(Role::Manager),
            "customer" => Ok(Role::Customer),
            other => Err(AppError::InvalidRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Manager => write!(f, "manager"),
            Role::Customer => write!(f, "customer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerProfile {
    pub manager_id: i32,
    pub cinema_id: i32,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_id: i32,
    pub username: String,
}

/// Transient per-user state carried between requests.
///
/// Invariant: `manager` and `customer` are mutually exclusive. Switching
/// role clears both profile slots; selecting a profile for the active role
/// replaces the previous one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub authenticated: bool,
    pub username: Option<String>,
    pub role: Option<Role>,
    pub manager: Option<ManagerProfile>,
    pub customer: Option<CustomerProfile>,
}

impl Session {
    pub fn login(username: &str) -> Session {
        Session {
            authenticated: true,
            username: Some(username.to_string()),
            role: None,
            manager: None,
            customer: None,
        }
    }

    /// Set the active role, clearing any previously selected profile of
    /// either role so no stale residue survives the switch.
    pub fn choose_role(&mut self, raw: &str) -> Result<Role, AppError> {
        let role = Role::parse(raw)?;
        self.role = Some(role);
        self.manager = None;
        self.customer = None;
        Ok(role)
    }

    pub fn select_manager_profile(&mut self, profile: ManagerProfile) -> Result<(), AppError> {
        if self.role != Some(Role::Manager) {
            return Err(AppError::RoleRequired(Role::Manager));
        }
        self.manager = Some(profile);
        Ok(())
    }

    pub fn select_customer_profile(&mut self, profile: CustomerProfile) -> Result<(), AppError> {
        if self.role != Some(Role::Customer) {
            return Err(AppError::RoleRequired(Role::Customer));
        }
        self.customer = Some(profile);
        Ok(())
    }

    pub fn logout(&mut self) {
        *self = Session::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_profile() -> ManagerProfile {
        ManagerProfile {
            manager_id: 7,
            cinema_id: 3,
            username: "alex".to_string(),
        }
    }

    #[test]
    fn login_sets_flag_and_identity_only() {
        let s = Session::login("admin");
        assert!(s.authenticated);
        assert_eq!(s.username.as_deref(), Some("admin"));
        assert!(s.role.is_none());
        assert!(s.manager.is_none());
        assert!(s.customer.is_none());
    }

    #[test]
    fn choose_role_rejects_unknown_roles() {
        let mut s = Session::login("admin");
        assert!(matches!(
            s.choose_role("admin"),
            Err(AppError::InvalidRole(_))
        ));
        assert!(s.role.is_none());
    }

    #[test]
    fn switching_role_clears_other_profile() {
        let mut s = Session::login("admin");
        s.choose_role("manager").unwrap();
        s.select_manager_profile(manager_profile()).unwrap();

        s.choose_role("customer").unwrap();
        assert_eq!(s.role, Some(Role::Customer));
        assert!(s.manager.is_none());
        assert!(s.customer.is_none());
    }

    #[test]
    fn reselecting_profile_replaces_previous() {
        let mut s = Session::login("admin");
        s.choose_role("manager").unwrap();
        s.select_manager_profile(manager_profile()).unwrap();
        s.select_manager_profile(ManagerProfile {
            manager_id: 9,
            cinema_id: 5,
            username: "kim".to_string(),
        })
        .unwrap();

        let p = s.manager.as_ref().unwrap();
        assert_eq!((p.manager_id, p.cinema_id), (9, 5));
    }

    #[test]
    fn profile_selection_requires_matching_role() {
        let mut s = Session::login("admin");
        s.choose_role("customer").unwrap();
        assert!(matches!(
            s.select_manager_profile(manager_profile()),
            Err(AppError::RoleRequired(Role::Manager))
        ));
        assert!(s.manager.is_none());
    }

    #[test]
    fn logout_clears_everything() {
        let mut s = Session::login("admin");
        s.choose_role("manager").unwrap();
        s.select_manager_profile(manager_profile()).unwrap();
        s.logout();
        assert_eq!(s, Session::default());
    }
}
