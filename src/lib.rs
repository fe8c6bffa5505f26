pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    question_service::QuestionService, register_service::RegisterService,
    user_service::UserService, variant_service::VariantService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub register_service: RegisterService,
    pub user_service: UserService,
    pub variant_service: VariantService,
    pub question_service: QuestionService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let register_service = RegisterService::new(pool.clone(), config.password_salt.clone());
        let user_service = UserService::new(pool.clone());
        let variant_service = VariantService::new(pool.clone());
        let question_service = QuestionService::new(pool.clone());

        Self {
            pool,
            register_service,
            user_service,
            variant_service,
            question_service,
        }
    }
}
