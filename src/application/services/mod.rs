pub mod attendance_service;
pub mod audit_service;
pub mod auth_service;
pub mod enquiry_service;
pub mod feedback_service;
pub mod notification_service;
pub mod order_service;
pub mod service_request_service;
pub mod sla_monitor;
pub mod user_service;

pub use attendance_service::*;
pub use audit_service::*;
pub use auth_service::*;
pub use enquiry_service::*;
pub use feedback_service::*;
pub use notification_service::*;
pub use order_service::*;
pub use service_request_service::*;
pub use sla_monitor::*;
pub use user_service::*;
