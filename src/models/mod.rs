pub mod line_user;
pub mod message_log;
