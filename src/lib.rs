pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod utils;

use crate::services::{
    chat_service::ChatService,
    course_service::CourseService,
    generation::{CompletionProvider, GroqService},
    record_service::RecordService,
    user_service::UserService,
};
use crate::session::SessionStore;
use reqwest::Client;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub sessions: SessionStore,
    pub generator: Arc<dyn CompletionProvider>,
    pub max_question_retries: usize,
    pub user_service: UserService,
    pub record_service: RecordService,
    pub chat_service: ChatService,
    pub course_service: CourseService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();
        let http_client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap();

        let generator: Arc<dyn CompletionProvider> = Arc::new(GroqService::new(
            config.groq_api_key.clone(),
            config.groq_model.clone(),
            http_client,
        ));

        Self::with_generator(
            pool,
            generator,
            Duration::from_secs(config.session_ttl_minutes * 60),
            config.max_question_retries,
        )
    }

    /// State with an explicit completion provider, used directly by tests.
    pub fn with_generator(
        pool: PgPool,
        generator: Arc<dyn CompletionProvider>,
        session_ttl: Duration,
        max_question_retries: usize,
    ) -> Self {
        Self {
            sessions: SessionStore::new(session_ttl),
            generator,
            max_question_retries,
            user_service: UserService::new(pool.clone()),
            record_service: RecordService::new(pool.clone()),
            chat_service: ChatService::new(pool.clone()),
            course_service: CourseService::new(pool.clone()),
            pool,
        }
    }
}
