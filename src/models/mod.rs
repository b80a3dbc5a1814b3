pub mod auth;
pub mod jwt;
pub mod lecture;
pub mod person;
