use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// User role. Governs which status transitions and endpoints are permitted.
///
/// `Koordinator` is the canonical spelling; the English alias "Coordinator"
/// from older clients is accepted on parse.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "user_role", rename_all = "lowercase"))]
pub enum Role {
    Admin,
    #[serde(rename = "TU")]
    Tu,
    Koordinator,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Tu => "TU",
            Role::Koordinator => "Koordinator",
            Role::Staff => "Staff",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "tu" => Some(Role::Tu),
            "koordinator" | "coordinator" => Some(Role::Koordinator),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }

    /// Roles allowed to register new reports.
    pub fn can_create_reports(&self) -> bool {
        matches!(self, Role::Admin | Role::Tu | Role::Koordinator)
    }

    /// Administrative intake: forwarding, finalizing, deleting reports.
    pub fn is_tu_or_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::Tu)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User identity and role, mirroring the hosted auth provider's subject.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Profile {
    pub id: Uuid,
    /// Subject id from the hosted auth provider.
    pub user_id: Uuid,
    pub name: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Best display name available, matching what the dashboards show.
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_accepts_coordinator_alias() {
        assert_eq!(Role::parse("Coordinator"), Some(Role::Koordinator));
        assert_eq!(Role::parse("koordinator"), Some(Role::Koordinator));
        assert_eq!(Role::parse("TU"), Some(Role::Tu));
        assert_eq!(Role::parse("intern"), None);
    }

    #[test]
    fn test_role_permissions() {
        assert!(Role::Tu.can_create_reports());
        assert!(Role::Koordinator.can_create_reports());
        assert!(!Role::Staff.can_create_reports());
        assert!(Role::Admin.is_tu_or_admin());
        assert!(!Role::Koordinator.is_tu_or_admin());
    }

    #[test]
    fn test_role_serde_tu_spelling() {
        assert_eq!(serde_json::to_string(&Role::Tu).unwrap(), "\"TU\"");
    }
}
