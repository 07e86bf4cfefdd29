use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::notifications::{self, NotificationKind};
use crate::entities::prelude::*;
use crate::error::{StoreError, StoreResult};
use crate::ids;

/// Input for a notification produced by an event-lifecycle action.
///
/// Every reference is optional; producers hand over whatever they still
/// know about the event and the users involved.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub event_id: Option<Uuid>,
    pub sender_id: Option<Uuid>,
    pub recipient_id: Option<Uuid>,
    pub kind: NotificationKind,
    pub feedback: Option<String>,
    pub payload: Option<serde_json::Value>,
}

impl NewNotification {
    #[must_use]
    pub const fn of_kind(kind: NotificationKind) -> Self {
        Self {
            event_id: None,
            sender_id: None,
            recipient_id: None,
            kind,
            feedback: None,
            payload: None,
        }
    }
}

/// Parses the wire form of a notification type against the closed enum.
pub fn parse_kind(value: &str) -> StoreResult<NotificationKind> {
    value
        .parse()
        .map_err(|_| StoreError::validation(format!("unknown notification_type: {value}")))
}

pub struct NotificationRepository {
    conn: DatabaseConnection,
}

impl NotificationRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new: NewNotification) -> StoreResult<notifications::Model> {
        let now = Utc::now();

        let active = notifications::ActiveModel {
            id: Set(ids::new_record_id()),
            event_id: Set(new.event_id),
            sender_id: Set(new.sender_id),
            recipient_id: Set(new.recipient_id),
            feedback: Set(new.feedback),
            payload: Set(new.payload),
            notification_type: Set(new.kind),
            is_read: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        Ok(active.insert(&self.conn).await?)
    }

    /// Default-scope lookup: soft-deleted rows are invisible.
    pub async fn get(&self, id: Uuid) -> StoreResult<Option<notifications::Model>> {
        Ok(Notifications::find_by_id(id)
            .filter(notifications::Column::DeletedAt.is_null())
            .one(&self.conn)
            .await?)
    }

    /// Maintenance-scope lookup that also returns soft-deleted rows.
    pub async fn get_with_deleted(&self, id: Uuid) -> StoreResult<Option<notifications::Model>> {
        Ok(Notifications::find_by_id(id).one(&self.conn).await?)
    }

    /// The dominant query: unread, visible notifications for one recipient,
    /// oldest first (ids are time-ordered).
    pub async fn unread_for_recipient(
        &self,
        recipient_id: Uuid,
    ) -> StoreResult<Vec<notifications::Model>> {
        Ok(Notifications::find()
            .filter(notifications::Column::RecipientId.eq(recipient_id))
            .filter(notifications::Column::IsRead.eq(false))
            .filter(notifications::Column::DeletedAt.is_null())
            .order_by_asc(notifications::Column::Id)
            .all(&self.conn)
            .await?)
    }

    pub async fn list_for_recipient(
        &self,
        recipient_id: Uuid,
    ) -> StoreResult<Vec<notifications::Model>> {
        Ok(Notifications::find()
            .filter(notifications::Column::RecipientId.eq(recipient_id))
            .filter(notifications::Column::DeletedAt.is_null())
            .order_by_asc(notifications::Column::Id)
            .all(&self.conn)
            .await?)
    }

    /// Idempotent; marking an already-read notification is a no-op.
    pub async fn mark_read(&self, id: Uuid) -> StoreResult<notifications::Model> {
        let notification = self
            .get(id)
            .await?
            .ok_or_else(|| StoreError::not_found("notification", id))?;

        if notification.is_read {
            return Ok(notification);
        }

        let mut active: notifications::ActiveModel = notification.into();
        active.is_read = Set(true);
        active.updated_at = Set(Utc::now());

        Ok(active.update(&self.conn).await?)
    }

    /// Stamps `deleted_at`; the row persists but leaves the default scope.
    /// Idempotent: an already-deleted row keeps its original stamp.
    pub async fn soft_delete(&self, id: Uuid) -> StoreResult<notifications::Model> {
        let notification = self
            .get_with_deleted(id)
            .await?
            .ok_or_else(|| StoreError::not_found("notification", id))?;

        if notification.deleted_at.is_some() {
            return Ok(notification);
        }

        let now = Utc::now();
        let mut active: notifications::ActiveModel = notification.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);

        Ok(active.update(&self.conn).await?)
    }

    /// Null-on-delete for an event removed by the event-management service.
    /// Matching notifications keep everything else, including soft-deleted rows.
    pub async fn detach_event(&self, event_id: Uuid) -> StoreResult<u64> {
        detach_events_on(&self.conn, &[event_id]).await
    }

    /// Null-on-delete for a removed user, on both the sender and recipient
    /// sides. Recipient notifications are not cascade-deleted.
    pub async fn detach_user(&self, user_id: Uuid) -> StoreResult<u64> {
        detach_user_on(&self.conn, user_id).await
    }

    /// Physically removes rows soft-deleted before `before`. Explicit
    /// maintenance only; nothing calls this implicitly.
    pub async fn purge_deleted(&self, before: DateTime<Utc>) -> StoreResult<u64> {
        let result = Notifications::delete_many()
            .filter(notifications::Column::DeletedAt.is_not_null())
            .filter(notifications::Column::DeletedAt.lt(before))
            .exec(&self.conn)
            .await?;

        Ok(result.rows_affected)
    }
}

pub(crate) async fn detach_events_on<C: ConnectionTrait>(
    conn: &C,
    event_ids: &[Uuid],
) -> StoreResult<u64> {
    let result = Notifications::update_many()
        .col_expr(notifications::Column::EventId, Expr::value(Option::<Uuid>::None))
        .col_expr(notifications::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(notifications::Column::EventId.is_in(event_ids.iter().copied()))
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}

pub(crate) async fn detach_user_on<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> StoreResult<u64> {
    let now = Utc::now();

    let senders = Notifications::update_many()
        .col_expr(notifications::Column::SenderId, Expr::value(Option::<Uuid>::None))
        .col_expr(notifications::Column::UpdatedAt, Expr::value(now))
        .filter(notifications::Column::SenderId.eq(user_id))
        .exec(conn)
        .await?;

    let recipients = Notifications::update_many()
        .col_expr(notifications::Column::RecipientId, Expr::value(Option::<Uuid>::None))
        .col_expr(notifications::Column::UpdatedAt, Expr::value(now))
        .filter(notifications::Column::RecipientId.eq(user_id))
        .exec(conn)
        .await?;

    Ok(senders.rows_affected + recipients.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_kind_accepts_the_closed_set() {
        for value in [
            "event_created",
            "event_updated",
            "event_deleted",
            "event_pending",
            "event_revised",
            "event_approved",
            "event_rejected",
        ] {
            assert!(parse_kind(value).is_ok(), "{value} should parse");
        }
    }

    #[test]
    fn parse_kind_rejects_unknown_values() {
        let err = parse_kind("event_published").unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }
}
