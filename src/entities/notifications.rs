use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Closed set of event-lifecycle actions that produce a notification.
///
/// Stored as `notification_type varchar(50)`; an unknown string fails to
/// decode rather than round-tripping as an open value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(50))")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[sea_orm(string_value = "event_created")]
    EventCreated,
    #[sea_orm(string_value = "event_updated")]
    EventUpdated,
    #[sea_orm(string_value = "event_deleted")]
    EventDeleted,
    #[sea_orm(string_value = "event_pending")]
    EventPending,
    #[sea_orm(string_value = "event_revised")]
    EventRevised,
    #[sea_orm(string_value = "event_approved")]
    EventApproved,
    #[sea_orm(string_value = "event_rejected")]
    EventRejected,
}

impl std::str::FromStr for NotificationKind {
    type Err = DbErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_value(&s.to_owned())
    }
}

/// A message derived from an event-lifecycle action, addressed to a
/// recipient and optionally attributed to a sender.
///
/// All three references are weak: a notification outlives the event or user
/// that produced it, with the foreign key nulled on delete. Removal is a
/// soft delete via `deleted_at`; default-scope reads must filter it out.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(nullable)]
    pub event_id: Option<Uuid>,

    #[sea_orm(nullable)]
    pub sender_id: Option<Uuid>,

    #[sea_orm(nullable)]
    pub recipient_id: Option<Uuid>,

    #[sea_orm(column_type = "Text", nullable)]
    pub feedback: Option<String>,

    /// Free-form structured data attached by the producer.
    #[sea_orm(nullable)]
    pub payload: Option<Json>,

    pub notification_type: NotificationKind,

    #[sea_orm(default_value = false)]
    pub is_read: bool,

    pub created_at: DateTimeUtc,

    pub updated_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeUtc>,
}

impl Model {
    /// Visibility predicate applied by every default-scope read.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::events::Entity",
        from = "Column::EventId",
        to = "super::events::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Events,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SenderId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Sender,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::RecipientId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Recipient,
}

impl Related<super::events::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
