pub mod ats_scoring;
pub mod handlers;
pub mod jd_parser;
pub mod prompts;
pub mod tailor;
