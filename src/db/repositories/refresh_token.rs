use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::{prelude::*, refresh_tokens};
use crate::error::{StoreError, StoreResult};
use crate::ids;

pub struct RefreshTokenRepository {
    conn: DatabaseConnection,
}

impl RefreshTokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Creates a non-revoked token for an existing user. `owner_id` is a
    /// NOT NULL reference, so a missing owner is a `Reference` error rather
    /// than a silent null.
    pub async fn issue(
        &self,
        owner_id: Uuid,
        token: &str,
        device: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<refresh_tokens::Model> {
        if Users::find_by_id(owner_id).one(&self.conn).await?.is_none() {
            return Err(StoreError::Reference(format!(
                "refresh token owner {owner_id} does not exist"
            )));
        }

        let active = refresh_tokens::ActiveModel {
            id: Set(ids::new_record_id()),
            owner_id: Set(owner_id),
            token: Set(token.to_string()),
            is_revoked: Set(false),
            device: Set(device.to_string()),
            expires_at: Set(expires_at),
        };

        Ok(active.insert(&self.conn).await?)
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Option<refresh_tokens::Model>> {
        Ok(RefreshTokens::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn list_for_owner(&self, owner_id: Uuid) -> StoreResult<Vec<refresh_tokens::Model>> {
        Ok(RefreshTokens::find()
            .filter(refresh_tokens::Column::OwnerId.eq(owner_id))
            .order_by_asc(refresh_tokens::Column::Id)
            .all(&self.conn)
            .await?)
    }

    /// Idempotent; revoking twice leaves the row revoked.
    pub async fn revoke(&self, id: Uuid) -> StoreResult<refresh_tokens::Model> {
        let token = self
            .get(id)
            .await?
            .ok_or_else(|| StoreError::not_found("refresh token", id))?;

        if token.is_revoked {
            return Ok(token);
        }

        let mut active: refresh_tokens::ActiveModel = token.into();
        active.is_revoked = Set(true);

        Ok(active.update(&self.conn).await?)
    }
}
