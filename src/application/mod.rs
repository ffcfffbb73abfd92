pub mod auth_service;
pub mod compile_service;
