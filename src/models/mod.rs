pub mod analysis;
pub mod enums;
pub mod record;

pub use analysis::*;
pub use enums::*;
pub use record::*;
