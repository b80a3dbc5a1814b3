pub mod auth_service;
pub mod cookie_service;
pub mod session_service;
pub mod token_inspector;
pub mod token_store;
