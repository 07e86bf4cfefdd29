use std::sync::OnceLock;

use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{events, prelude::*, refresh_tokens, users};
use crate::error::{StoreError, StoreResult};
use crate::ids;

const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 64;
const NAME_MAX: usize = 20;
const EMAIL_MAX: usize = 50;
const STUDENT_ID_LEN: usize = 10;

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("static regex"))
}

/// Input for registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub student_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub student_id: Option<Option<String>>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, new: NewUser) -> StoreResult<users::Model> {
        validate_name("first_name", &new.first_name)?;
        validate_name("last_name", &new.last_name)?;
        validate_email(&new.email)?;
        validate_password(&new.password)?;
        if let Some(student_id) = &new.student_id {
            validate_student_id(student_id)?;
            self.ensure_student_id_free(student_id, None).await?;
        }

        let id = ids::new_record_id();
        if Users::find_by_id(id).one(&self.conn).await?.is_some() {
            return Err(StoreError::Uniqueness(format!("user id {id} already exists")));
        }

        let active = users::ActiveModel {
            id: Set(id),
            student_id: Set(new.student_id),
            first_name: Set(new.first_name),
            last_name: Set(new.last_name),
            email: Set(new.email),
            password: Set(new.password),
        };

        Ok(active.insert(&self.conn).await?)
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Option<users::Model>> {
        Ok(Users::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn get_by_email(&self, email: &str) -> StoreResult<Option<users::Model>> {
        Ok(Users::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await?)
    }

    /// Re-validates every changed field before writing.
    pub async fn update(&self, id: Uuid, patch: UserPatch) -> StoreResult<users::Model> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found("user", id))?;

        let mut active: users::ActiveModel = user.into();

        if let Some(student_id) = patch.student_id {
            if let Some(value) = &student_id {
                validate_student_id(value)?;
                self.ensure_student_id_free(value, Some(id)).await?;
            }
            active.student_id = Set(student_id);
        }
        if let Some(first_name) = patch.first_name {
            validate_name("first_name", &first_name)?;
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = patch.last_name {
            validate_name("last_name", &last_name)?;
            active.last_name = Set(last_name);
        }
        if let Some(email) = patch.email {
            validate_email(&email)?;
            active.email = Set(email);
        }
        if let Some(password) = patch.password {
            validate_password(&password)?;
            active.password = Set(password);
        }

        Ok(active.update(&self.conn).await?)
    }

    /// Deletes a user and everything it owns in one transaction: refresh
    /// tokens and events are removed, notification references to the user
    /// (and to its deleted events) are nulled, the notifications themselves
    /// survive.
    pub async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let user = Users::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or_else(|| StoreError::not_found("user", id))?;

        let txn = self.conn.begin().await?;

        RefreshTokens::delete_many()
            .filter(refresh_tokens::Column::OwnerId.eq(id))
            .exec(&txn)
            .await?;

        let owned_events: Vec<Uuid> = Events::find()
            .filter(events::Column::OwnerId.eq(id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|event| event.id)
            .collect();

        if !owned_events.is_empty() {
            super::notification::detach_events_on(&txn, &owned_events).await?;
            Events::delete_many()
                .filter(events::Column::OwnerId.eq(id))
                .exec(&txn)
                .await?;
        }

        super::notification::detach_user_on(&txn, id).await?;

        Users::delete_by_id(user.id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    async fn ensure_student_id_free(
        &self,
        student_id: &str,
        exclude: Option<Uuid>,
    ) -> StoreResult<()> {
        let mut query = Users::find().filter(users::Column::StudentId.eq(student_id));
        if let Some(own_id) = exclude {
            query = query.filter(users::Column::Id.ne(own_id));
        }

        if query.one(&self.conn).await?.is_some() {
            return Err(StoreError::Uniqueness(format!(
                "student_id {student_id} is already registered"
            )));
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> StoreResult<()> {
    if email.is_empty() || email.chars().count() > EMAIL_MAX {
        return Err(StoreError::validation(format!(
            "email must be 1..={EMAIL_MAX} characters"
        )));
    }
    if !email_regex().is_match(email) {
        return Err(StoreError::validation(format!("invalid email: {email}")));
    }
    Ok(())
}

fn validate_password(password: &str) -> StoreResult<()> {
    let len = password.chars().count();
    if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&len) {
        return Err(StoreError::validation(format!(
            "password must be {PASSWORD_MIN}..={PASSWORD_MAX} characters"
        )));
    }
    Ok(())
}

fn validate_name(field: &str, value: &str) -> StoreResult<()> {
    let len = value.chars().count();
    if len == 0 || len > NAME_MAX {
        return Err(StoreError::validation(format!(
            "{field} must be 1..={NAME_MAX} characters"
        )));
    }
    Ok(())
}

fn validate_student_id(student_id: &str) -> StoreResult<()> {
    if student_id.chars().count() != STUDENT_ID_LEN {
        return Err(StoreError::validation(format!(
            "student_id must be exactly {STUDENT_ID_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_syntax() {
        assert!(validate_email("a@b.co").is_ok());
        assert!(validate_email("first.last@uni.edu").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@at@signs.io").is_err());
        assert!(validate_email("spaces in@mail.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn password_bounds_are_inclusive() {
        assert!(validate_password(&"x".repeat(7)).is_err());
        assert!(validate_password(&"x".repeat(8)).is_ok());
        assert!(validate_password(&"x".repeat(64)).is_ok());
        assert!(validate_password(&"x".repeat(65)).is_err());
    }

    #[test]
    fn student_id_is_fixed_length() {
        assert!(validate_student_id("6312345678").is_ok());
        assert!(validate_student_id("123").is_err());
        assert!(validate_student_id("12345678901").is_err());
    }
}
