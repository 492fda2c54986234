use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    EnquiryNew,
    ServiceNew,
    ServiceAssigned,
    ServiceCompleted,
    SlaWarning,
    SlaBreach,
    OrderPending,
    OrderApproved,
    OrderRejected,
    LateAttendance,
    NegativeFeedback,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::EnquiryNew => "enquiry_new",
            NotificationType::ServiceNew => "service_new",
            NotificationType::ServiceAssigned => "service_assigned",
            NotificationType::ServiceCompleted => "service_completed",
            NotificationType::SlaWarning => "sla_warning",
            NotificationType::SlaBreach => "sla_breach",
            NotificationType::OrderPending => "order_pending",
            NotificationType::OrderApproved => "order_approved",
            NotificationType::OrderRejected => "order_rejected",
            NotificationType::LateAttendance => "late_attendance",
            NotificationType::NegativeFeedback => "negative_feedback",
        }
    }

    /// Module the notification links back into.
    pub fn module(&self) -> &'static str {
        match self {
            NotificationType::EnquiryNew => "enquiries",
            NotificationType::ServiceNew
            | NotificationType::ServiceAssigned
            | NotificationType::ServiceCompleted
            | NotificationType::SlaWarning
            | NotificationType::SlaBreach => "service",
            NotificationType::OrderPending
            | NotificationType::OrderApproved
            | NotificationType::OrderRejected => "orders",
            NotificationType::LateAttendance => "attendance",
            NotificationType::NegativeFeedback => "feedback",
        }
    }
}

impl std::str::FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enquiry_new" => Ok(NotificationType::EnquiryNew),
            "service_new" => Ok(NotificationType::ServiceNew),
            "service_assigned" => Ok(NotificationType::ServiceAssigned),
            "service_completed" => Ok(NotificationType::ServiceCompleted),
            "sla_warning" => Ok(NotificationType::SlaWarning),
            "sla_breach" => Ok(NotificationType::SlaBreach),
            "order_pending" => Ok(NotificationType::OrderPending),
            "order_approved" => Ok(NotificationType::OrderApproved),
            "order_rejected" => Ok(NotificationType::OrderRejected),
            "late_attendance" => Ok(NotificationType::LateAttendance),
            "negative_feedback" => Ok(NotificationType::NegativeFeedback),
            _ => Err(format!("Invalid notification type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    Low,
    Normal,
    High,
    Critical,
}

impl NotificationPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationPriority::Low => "low",
            NotificationPriority::Normal => "normal",
            NotificationPriority::High => "high",
            NotificationPriority::Critical => "critical",
        }
    }
}

impl std::str::FromStr for NotificationPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(NotificationPriority::Low),
            "normal" => Ok(NotificationPriority::Normal),
            "high" => Ok(NotificationPriority::High),
            "critical" => Ok(NotificationPriority::Critical),
            _ => Err(format!("Invalid notification priority: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub priority: NotificationPriority,
    pub module: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    pub is_read: bool,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<String>,
}

/// Content of a notification before it is addressed to a user.
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub priority: NotificationPriority,
    pub action_url: Option<String>,
}

impl NotificationDraft {
    pub fn new(
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            notification_type,
            title: title.into(),
            message: message.into(),
            priority: NotificationPriority::Normal,
            action_url: None,
        }
    }

    pub fn with_priority(mut self, priority: NotificationPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_action_url(mut self, url: impl Into<String>) -> Self {
        self.action_url = Some(url.into());
        self
    }

    pub fn addressed_to(&self, user_id: i64, created_at: String) -> Notification {
        Notification {
            id: Uuid::new_v4().to_string(),
            user_id,
            notification_type: self.notification_type,
            title: self.title.clone(),
            message: self.message.clone(),
            priority: self.priority,
            module: self.notification_type.module().to_string(),
            action_url: self.action_url.clone(),
            is_read: false,
            created_at,
            read_at: None,
        }
    }
}
