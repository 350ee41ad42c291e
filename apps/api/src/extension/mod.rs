pub mod channel;
pub mod handlers;
pub mod job_page;
pub mod messages;
