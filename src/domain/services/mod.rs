pub mod capabilities;
pub mod sla;
pub mod state_machine;

pub use capabilities::*;
pub use sla::*;
pub use state_machine::*;
