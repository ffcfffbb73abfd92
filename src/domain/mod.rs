pub mod compile;
mod de;
pub mod error;
pub mod repository;
pub mod user;
