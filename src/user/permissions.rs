use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    EditJobs,
    ManageUsers,
}

impl Permission {
    pub fn as_int(self) -> i32 {
        match self {
            Permission::EditJobs => 1,
            Permission::ManageUsers => 2,
        }
    }

    pub fn from_int(value: i32) -> Option<Self> {
        match value {
            1 => Some(Permission::EditJobs),
            2 => Some(Permission::ManageUsers),
            _ => None,
        }
    }
}

const ADMIN_PERMISSIONS: &[Permission] = &[Permission::EditJobs, Permission::ManageUsers];
const EDITOR_PERMISSIONS: &[Permission] = &[Permission::EditJobs];
const VIEWER_PERMISSIONS: &[Permission] = &[];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    Editor,
    Viewer,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Admin, UserRole::Editor, UserRole::Viewer];

    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            UserRole::Admin => ADMIN_PERMISSIONS,
            UserRole::Editor => EDITOR_PERMISSIONS,
            UserRole::Viewer => VIEWER_PERMISSIONS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "Admin",
            UserRole::Editor => "Editor",
            UserRole::Viewer => "Viewer",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "editor" => Some(UserRole::Editor),
            "viewer" => Some(UserRole::Viewer),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_int_round_trip() {
        for permission in [Permission::EditJobs, Permission::ManageUsers] {
            assert_eq!(Permission::from_int(permission.as_int()), Some(permission));
        }
        assert_eq!(Permission::from_int(0), None);
        assert_eq!(Permission::from_int(3), None);
    }

    #[test]
    fn role_permissions() {
        assert!(UserRole::Admin.permissions().contains(&Permission::EditJobs));
        assert!(UserRole::Admin
            .permissions()
            .contains(&Permission::ManageUsers));
        assert_eq!(UserRole::Editor.permissions(), &[Permission::EditJobs]);
        assert!(UserRole::Viewer.permissions().is_empty());
    }

    #[test]
    fn role_from_str_is_case_insensitive() {
        assert_eq!(UserRole::from_str("ADMIN"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_str("editor"), Some(UserRole::Editor));
        assert_eq!(UserRole::from_str("Viewer"), Some(UserRole::Viewer));
        assert_eq!(UserRole::from_str("regular"), None);
    }

    #[test]
    fn role_string_round_trip() {
        for role in UserRole::ALL {
            assert_eq!(UserRole::from_str(&role.to_string()), Some(role));
        }
    }
}
