// Accounts and the viewer on whose behalf data is listed
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Fazendeiro,
    Pivozeiro,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewAccount {
    pub name: String,
    pub login: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Fazendeiro
}

/// Who is looking at the dashboard. Admins see everything; everyone else is
/// scoped to their own farms and probes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct Viewer {
    pub user_id: Option<i64>,
    pub role: Option<Role>,
}

impl Viewer {
    pub fn scope_user_id(&self) -> Option<i64> {
        match self.role {
            Some(Role::Admin) => None,
            _ => self.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_user_id() {
        let admin = Viewer { user_id: Some(1), role: Some(Role::Admin) };
        let farmer = Viewer { user_id: Some(7), role: Some(Role::Fazendeiro) };
        let anonymous = Viewer::default();

        assert_eq!(admin.scope_user_id(), None);
        assert_eq!(farmer.scope_user_id(), Some(7));
        assert_eq!(anonymous.scope_user_id(), None);
    }

    #[test]
    fn test_role_wire_format() {
        let user: SessionUser = serde_json::from_str(r#"{"id": 3, "name": "Ana", "role": "PIVOZEIRO"}"#).unwrap();
        assert_eq!(user.role, Role::Pivozeiro);

        let account: NewAccount =
            serde_json::from_str(r#"{"name": "Ana", "login": "ana", "password": "x"}"#).unwrap();
        assert_eq!(account.role, Role::Fazendeiro);
    }
}
