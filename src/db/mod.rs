use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::entities::{events, notifications, refresh_tokens, users};
use crate::error::StoreResult;

pub mod migrator;
pub mod repositories;

pub use crate::entities::notifications::NotificationKind;
pub use repositories::notification::{parse_kind as parse_notification_kind, NewNotification};
pub use repositories::user::{NewUser, UserPatch};

/// Facade over the persistence layer. Each operation is a short-lived,
/// stateless call; cascades run inside a single transaction on the
/// underlying connection.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn event_repo(&self) -> repositories::event::EventRepository {
        repositories::event::EventRepository::new(self.conn.clone())
    }

    fn refresh_token_repo(&self) -> repositories::refresh_token::RefreshTokenRepository {
        repositories::refresh_token::RefreshTokenRepository::new(self.conn.clone())
    }

    fn notification_repo(&self) -> repositories::notification::NotificationRepository {
        repositories::notification::NotificationRepository::new(self.conn.clone())
    }

    // Users

    pub async fn create_user(&self, new: NewUser) -> StoreResult<users::Model> {
        self.user_repo().create(new).await
    }

    pub async fn get_user(&self, id: Uuid) -> StoreResult<Option<users::Model>> {
        self.user_repo().get(id).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<users::Model>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn update_user(&self, id: Uuid, patch: UserPatch) -> StoreResult<users::Model> {
        self.user_repo().update(id, patch).await
    }

    /// Cascade-deletes owned refresh tokens and events; notification
    /// references to the user are nulled, not deleted.
    pub async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        self.user_repo().delete(id).await
    }

    // Events

    pub async fn create_event(
        &self,
        owner_id: Uuid,
        title: &str,
        starts_at: DateTime<Utc>,
    ) -> StoreResult<events::Model> {
        self.event_repo().create(owner_id, title, starts_at).await
    }

    pub async fn get_event(&self, id: Uuid) -> StoreResult<Option<events::Model>> {
        self.event_repo().get(id).await
    }

    pub async fn delete_event(&self, id: Uuid) -> StoreResult<()> {
        self.event_repo().delete(id).await
    }

    // Refresh tokens

    pub async fn issue_refresh_token(
        &self,
        owner_id: Uuid,
        token: &str,
        device: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<refresh_tokens::Model> {
        self.refresh_token_repo()
            .issue(owner_id, token, device, expires_at)
            .await
    }

    pub async fn get_refresh_token(&self, id: Uuid) -> StoreResult<Option<refresh_tokens::Model>> {
        self.refresh_token_repo().get(id).await
    }

    pub async fn list_refresh_tokens(
        &self,
        owner_id: Uuid,
    ) -> StoreResult<Vec<refresh_tokens::Model>> {
        self.refresh_token_repo().list_for_owner(owner_id).await
    }

    pub async fn revoke_refresh_token(&self, id: Uuid) -> StoreResult<refresh_tokens::Model> {
        self.refresh_token_repo().revoke(id).await
    }

    // Notifications

    pub async fn create_notification(
        &self,
        new: NewNotification,
    ) -> StoreResult<notifications::Model> {
        self.notification_repo().create(new).await
    }

    pub async fn get_notification(&self, id: Uuid) -> StoreResult<Option<notifications::Model>> {
        self.notification_repo().get(id).await
    }

    pub async fn get_notification_with_deleted(
        &self,
        id: Uuid,
    ) -> StoreResult<Option<notifications::Model>> {
        self.notification_repo().get_with_deleted(id).await
    }

    pub async fn unread_notifications(
        &self,
        recipient_id: Uuid,
    ) -> StoreResult<Vec<notifications::Model>> {
        self.notification_repo()
            .unread_for_recipient(recipient_id)
            .await
    }

    pub async fn notifications_for_recipient(
        &self,
        recipient_id: Uuid,
    ) -> StoreResult<Vec<notifications::Model>> {
        self.notification_repo()
            .list_for_recipient(recipient_id)
            .await
    }

    pub async fn mark_notification_read(&self, id: Uuid) -> StoreResult<notifications::Model> {
        self.notification_repo().mark_read(id).await
    }

    pub async fn soft_delete_notification(&self, id: Uuid) -> StoreResult<notifications::Model> {
        self.notification_repo().soft_delete(id).await
    }

    /// Null-on-delete hook for events removed outside this store.
    pub async fn detach_event_from_notifications(&self, event_id: Uuid) -> StoreResult<u64> {
        self.notification_repo().detach_event(event_id).await
    }

    /// Null-on-delete hook for users removed outside this store.
    pub async fn detach_user_from_notifications(&self, user_id: Uuid) -> StoreResult<u64> {
        self.notification_repo().detach_user(user_id).await
    }

    pub async fn purge_deleted_notifications(&self, before: DateTime<Utc>) -> StoreResult<u64> {
        self.notification_repo().purge_deleted(before).await
    }
}
