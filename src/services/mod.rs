pub mod chat_service;
pub mod course_service;
pub mod generation;
pub mod quiz_engine;
pub mod record_service;
pub mod user_service;
