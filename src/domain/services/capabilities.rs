use serde::Serialize;

use crate::domain::entities::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ServiceRequestsViewAll,
    ServiceRequestsCreate,
    ServiceRequestsAssign,
    /// Move one's own tickets through the dispatch flow.
    ServiceRequestsWork,
    EnquiriesViewAll,
    EnquiriesCreate,
    EnquiriesManage,
    OrdersCreate,
    OrdersViewAll,
    OrdersApprove,
    AttendanceViewAll,
    UsersManage,
    ReportsView,
    /// Escalated customer feedback.
    FeedbackViewNegative,
    /// Feedback and SLA scores of every engineer.
    EngineerAnalyticsView,
    AuditView,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ServiceRequestsViewAll => "service_requests:view_all",
            Capability::ServiceRequestsCreate => "service_requests:create",
            Capability::ServiceRequestsAssign => "service_requests:assign",
            Capability::ServiceRequestsWork => "service_requests:work",
            Capability::EnquiriesViewAll => "enquiries:view_all",
            Capability::EnquiriesCreate => "enquiries:create",
            Capability::EnquiriesManage => "enquiries:manage",
            Capability::OrdersCreate => "orders:create",
            Capability::OrdersViewAll => "orders:view_all",
            Capability::OrdersApprove => "orders:approve",
            Capability::AttendanceViewAll => "attendance:view_all",
            Capability::UsersManage => "users:manage",
            Capability::ReportsView => "reports:view",
            Capability::FeedbackViewNegative => "feedback:view_negative",
            Capability::EngineerAnalyticsView => "analytics:view_engineers",
            Capability::AuditView => "audit:view",
        }
    }
}

const ADMIN: &[Capability] = &[
    Capability::ServiceRequestsViewAll,
    Capability::ServiceRequestsCreate,
    Capability::ServiceRequestsAssign,
    Capability::EnquiriesViewAll,
    Capability::EnquiriesCreate,
    Capability::EnquiriesManage,
    Capability::OrdersCreate,
    Capability::OrdersViewAll,
    Capability::OrdersApprove,
    Capability::AttendanceViewAll,
    Capability::UsersManage,
    Capability::ReportsView,
    Capability::FeedbackViewNegative,
    Capability::EngineerAnalyticsView,
    Capability::AuditView,
];

const RECEPTION: &[Capability] = &[
    Capability::ServiceRequestsViewAll,
    Capability::ServiceRequestsCreate,
    Capability::ServiceRequestsAssign,
    Capability::EnquiriesViewAll,
    Capability::EnquiriesCreate,
    Capability::EnquiriesManage,
    Capability::OrdersViewAll,
    Capability::AttendanceViewAll,
    Capability::ReportsView,
    Capability::FeedbackViewNegative,
    Capability::AuditView,
];

const SALESMAN: &[Capability] = &[Capability::EnquiriesCreate, Capability::OrdersCreate];

const SERVICE_ENGINEER: &[Capability] = &[Capability::ServiceRequestsWork];

pub fn role_capabilities(role: UserRole) -> &'static [Capability] {
    match role {
        UserRole::Admin => ADMIN,
        UserRole::Reception => RECEPTION,
        UserRole::Salesman => SALESMAN,
        UserRole::ServiceEngineer => SERVICE_ENGINEER,
    }
}

pub fn has_capability(role: UserRole, capability: Capability) -> bool {
    role_capabilities(role).contains(&capability)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
}

const fn nav(label: &'static str, path: &'static str) -> NavItem {
    NavItem { label, path }
}

const ADMIN_NAV: &[NavItem] = &[
    nav("Dashboard", "/admin/dashboard"),
    nav("Employees", "/admin/employees"),
    nav("Enquiries", "/admin/enquiries"),
    nav("Orders", "/admin/orders"),
    nav("Service Requests", "/admin/service/requests"),
    nav("SLA Monitor", "/admin/service/sla"),
    nav("Attendance", "/admin/attendance"),
    nav("Reports", "/admin/reports"),
    nav("Feedback", "/admin/feedback"),
    nav("Audit Log", "/admin/audit"),
];

const RECEPTION_NAV: &[NavItem] = &[
    nav("Dashboard", "/reception/dashboard"),
    nav("Enquiry Board", "/reception/enquiries"),
    nav("Service Complaints", "/reception/service-complaints"),
    nav("Attendance", "/reception/attendance"),
];

const SALESMAN_NAV: &[NavItem] = &[
    nav("Dashboard", "/salesman/dashboard"),
    nav("Attendance", "/salesman/attendance"),
    nav("Enquiries & Leads", "/salesman/enquiries"),
    nav("Orders", "/salesman/orders"),
];

const SERVICE_ENGINEER_NAV: &[NavItem] = &[
    nav("Dashboard", "/service-engineer/dashboard"),
    nav("Daily Start", "/service-engineer/attendance"),
    nav("Assigned Jobs", "/service-engineer/jobs"),
    nav("Service History", "/service-engineer/history"),
    nav("SLA Tracker", "/service-engineer/sla-tracker"),
    nav("My Feedback", "/service-engineer/feedback"),
];

pub fn navigation_for(role: UserRole) -> &'static [NavItem] {
    match role {
        UserRole::Admin => ADMIN_NAV,
        UserRole::Reception => RECEPTION_NAV,
        UserRole::Salesman => SALESMAN_NAV,
        UserRole::ServiceEngineer => SERVICE_ENGINEER_NAV,
    }
}
