pub mod application;
pub mod job;
pub mod resume;
pub mod score;
pub mod user;
