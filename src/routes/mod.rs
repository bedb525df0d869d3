pub mod auth;
pub mod chat;
pub mod course;
pub mod health;
pub mod iq;
pub mod quiz;
pub mod stats;
