pub mod sanitize;
pub mod types;
pub mod validation;

pub use sanitize::*;
pub use types::*;
pub use validation::*;
