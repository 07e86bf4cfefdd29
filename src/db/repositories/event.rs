use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{events, prelude::*};
use crate::error::{StoreError, StoreResult};
use crate::ids;

pub struct EventRepository {
    conn: DatabaseConnection,
}

impl EventRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        title: &str,
        starts_at: DateTime<Utc>,
    ) -> StoreResult<events::Model> {
        if Users::find_by_id(owner_id).one(&self.conn).await?.is_none() {
            return Err(StoreError::Reference(format!(
                "event owner {owner_id} does not exist"
            )));
        }

        let active = events::ActiveModel {
            id: Set(ids::new_record_id()),
            owner_id: Set(owner_id),
            title: Set(title.to_string()),
            starts_at: Set(starts_at),
        };

        Ok(active.insert(&self.conn).await?)
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Option<events::Model>> {
        Ok(Events::find_by_id(id).one(&self.conn).await?)
    }

    /// Removes the event and nulls `event_id` on every notification that
    /// pointed at it, in one transaction. The notifications survive.
    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let event = Events::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found("event", id))?;

        let txn = self.conn.begin().await?;

        super::notification::detach_events_on(&txn, &[event.id]).await?;
        Events::delete_by_id(event.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}
