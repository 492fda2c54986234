pub mod attendance_repository;
pub mod audit_repository;
pub mod enquiry_repository;
pub mod feedback_repository;
pub mod notification_repository;
pub mod order_repository;
pub mod service_request_repository;
pub mod session_repository;
pub mod task_queue;
pub mod task_spawner;
pub mod time_service;
pub mod user_repository;

pub use attendance_repository::*;
pub use audit_repository::*;
pub use enquiry_repository::*;
pub use feedback_repository::*;
pub use notification_repository::*;
pub use order_repository::*;
pub use service_request_repository::*;
pub use session_repository::*;
pub use task_queue::*;
pub use task_spawner::*;
pub use time_service::*;
pub use user_repository::*;
