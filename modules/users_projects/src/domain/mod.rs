pub mod error;
pub mod repo;
pub mod resolver;
pub mod service;
pub mod validator;
