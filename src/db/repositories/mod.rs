pub mod event;
pub mod notification;
pub mod refresh_token;
pub mod user;
