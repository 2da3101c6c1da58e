pub mod model;
pub mod patch;

pub use model::*;
pub use patch::Patch;
