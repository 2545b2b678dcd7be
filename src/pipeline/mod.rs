pub mod analysis;
pub mod safety;
