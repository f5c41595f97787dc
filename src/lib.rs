pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    dispatch::{default_dispatcher, EventDispatcher},
    line_client::LineClient,
    message_log_service::MessageLogService,
    relay_service::RelayService,
    user_service::UserService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub line_client: LineClient,
    pub user_service: UserService,
    pub message_log_service: MessageLogService,
    pub relay_service: RelayService,
    pub dispatcher: EventDispatcher,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let line_client = LineClient::new(
            config.line_channel_access_token.clone(),
            config.line_api_base.clone(),
        );
        let user_service = UserService::new(pool.clone());
        let message_log_service = MessageLogService::new(pool);
        let relay_service = RelayService::new(config.n8n_webhook_url.clone());

        Self {
            line_client,
            user_service,
            message_log_service,
            relay_service,
            dispatcher: default_dispatcher(),
        }
    }
}
