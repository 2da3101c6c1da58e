// === PUBLIC CONTRACT ===
// Transport-agnostic models shared by the domain, storage and REST layers
pub mod contract;

pub use contract::{model, patch};

// === MODULE WIRING ===
// Builds the store, service and routes from a database connection
pub mod module;
pub use module::UsersProjects;

// === INTERNAL MODULES ===
// WARNING: These modules are internal implementation details!
// They are exposed only for comprehensive testing and should NOT be used by external consumers.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
