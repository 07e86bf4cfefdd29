pub mod prelude;

pub mod events;
pub mod notifications;
pub mod refresh_tokens;
pub mod users;
