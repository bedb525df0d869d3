pub mod chat_message;
pub mod course;
pub mod iq_record;
pub mod quiz_record;
pub mod user;
