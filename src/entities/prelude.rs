pub use super::events::Entity as Events;
pub use super::notifications::Entity as Notifications;
pub use super::refresh_tokens::Entity as RefreshTokens;
pub use super::users::Entity as Users;
