pub mod timestamps;
pub mod validation;

pub use timestamps::*;
pub use validation::*;
