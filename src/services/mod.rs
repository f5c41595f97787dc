pub mod dispatch;
pub mod line_client;
pub mod message_log_service;
pub mod registration;
pub mod relay_service;
pub mod user_service;
