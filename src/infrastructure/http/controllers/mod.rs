pub mod attendance;
pub mod audit;
pub mod auth;
pub mod enquiries;
pub mod feedback;
pub mod notifications;
pub mod orders;
pub mod public;
pub mod service_requests;
pub mod users;
