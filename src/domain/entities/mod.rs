pub mod attendance;
pub mod audit;
pub mod enquiry;
pub mod feedback;
pub mod job;
pub mod notification;
pub mod order;
pub mod service_request;
pub mod session;
pub mod user;

pub use attendance::*;
pub use audit::*;
pub use enquiry::*;
pub use feedback::*;
pub use job::*;
pub use notification::*;
pub use order::*;
pub use service_request::*;
pub use session::*;
pub use user::*;
