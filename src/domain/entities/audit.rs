use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Assign,
    StatusChange,
    Approve,
    Reject,
    Delete,
    Deactivate,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Assign => "ASSIGN",
            AuditAction::StatusChange => "STATUS_CHANGE",
            AuditAction::Approve => "APPROVE",
            AuditAction::Reject => "REJECT",
            AuditAction::Delete => "DELETE",
            AuditAction::Deactivate => "DEACTIVATE",
        }
    }
}

impl std::str::FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CREATE" => Ok(AuditAction::Create),
            "ASSIGN" => Ok(AuditAction::Assign),
            "STATUS_CHANGE" => Ok(AuditAction::StatusChange),
            "APPROVE" => Ok(AuditAction::Approve),
            "REJECT" => Ok(AuditAction::Reject),
            "DELETE" => Ok(AuditAction::Delete),
            "DEACTIVATE" => Ok(AuditAction::Deactivate),
            _ => Err(format!("Invalid audit action: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditModule {
    ServiceRequests,
    Enquiries,
    Orders,
    Users,
}

impl AuditModule {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditModule::ServiceRequests => "service_requests",
            AuditModule::Enquiries => "enquiries",
            AuditModule::Orders => "orders",
            AuditModule::Users => "users",
        }
    }
}

impl std::fmt::Display for AuditModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AuditModule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "service_requests" => Ok(AuditModule::ServiceRequests),
            "enquiries" => Ok(AuditModule::Enquiries),
            "orders" => Ok(AuditModule::Orders),
            "users" => Ok(AuditModule::Users),
            _ => Err(format!("Invalid audit module: {}", s)),
        }
    }
}

/// One recorded decision. `changes` holds a small JSON object describing
/// what moved, e.g. `{"from": "ASSIGNED", "to": "ON_THE_WAY"}`.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub user_id: Option<i64>,
    pub username: String,
    pub action: AuditAction,
    pub module: AuditModule,
    pub record_id: i64,
    pub changes: Option<serde_json::Value>,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub user_id: Option<i64>,
    pub username: String,
    pub action: AuditAction,
    pub module: AuditModule,
    pub record_id: i64,
    pub changes: Option<serde_json::Value>,
    pub created_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub module: Option<AuditModule>,
    pub user_id: Option<i64>,
    pub action: Option<AuditAction>,
    pub limit: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_action_names_parse_back() {
        for action in [
            AuditAction::Create,
            AuditAction::Assign,
            AuditAction::StatusChange,
            AuditAction::Approve,
            AuditAction::Reject,
            AuditAction::Delete,
            AuditAction::Deactivate,
        ] {
            assert_eq!(AuditAction::from_str(action.as_str()).unwrap(), action);
        }
        assert!(AuditAction::from_str("VIEW").is_err());
    }

    #[test]
    fn test_module_serializes_as_its_table_name() {
        assert_eq!(
            serde_json::to_value(AuditModule::ServiceRequests).unwrap(),
            serde_json::json!("service_requests")
        );
        assert_eq!(AuditModule::from_str("orders").unwrap(), AuditModule::Orders);
    }
}
