use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "refresh_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub owner_id: Uuid,

    /// Opaque session credential issued at login.
    pub token: String,

    #[sea_orm(default_value = false)]
    pub is_revoked: bool,

    /// Client identifier the token was issued to (user agent / device name).
    pub device: String,

    pub expires_at: DateTimeUtc,
}

impl Model {
    /// A token is usable only while it is unrevoked and unexpired. There is
    /// no stored validity flag; every consumer must apply this predicate.
    #[must_use]
    pub fn is_valid(&self, now: DateTimeUtc) -> bool {
        !self.is_revoked && now < self.expires_at
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::OwnerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn token(is_revoked: bool, expires_in: Duration) -> Model {
        Model {
            id: Uuid::now_v7(),
            owner_id: Uuid::now_v7(),
            token: "opaque".to_string(),
            is_revoked,
            device: "test-device".to_string(),
            expires_at: Utc::now() + expires_in,
        }
    }

    #[test]
    fn live_token_is_valid() {
        let t = token(false, Duration::hours(1));
        assert!(t.is_valid(Utc::now()));
    }

    #[test]
    fn revoked_token_is_invalid_even_before_expiry() {
        let t = token(true, Duration::hours(1));
        assert!(!t.is_valid(Utc::now()));
    }

    #[test]
    fn expired_token_is_invalid_even_if_unrevoked() {
        let t = token(false, Duration::hours(-1));
        assert!(!t.is_valid(Utc::now()));
    }

    #[test]
    fn expiry_instant_itself_is_invalid() {
        let t = token(false, Duration::zero());
        assert!(!t.is_valid(t.expires_at));
    }
}
