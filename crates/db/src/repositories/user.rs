//! User repository for database operations.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use procura_core::workflow::{UserRole, WorkflowError};
use procura_shared::types::UserId;

use super::convert::{core_role_to_db, db_err, is_unique_violation};
use crate::entities::users;

/// Input for registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login name.
    pub username: String,
    /// Email address, unique across users.
    pub email: String,
    /// Display name.
    pub full_name: String,
    /// Workflow role.
    pub role: UserRole,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, WorkflowError> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email.trim().to_lowercase()))
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Finds a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<users::Model>, WorkflowError> {
        users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Creates a new active user. Emails are stored lowercased.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for blank fields or an email that is already
    /// registered, `Database` if the insert fails otherwise.
    pub async fn create(&self, input: NewUser) -> Result<users::Model, WorkflowError> {
        let username = input.username.trim();
        let email = input.email.trim().to_lowercase();
        if username.is_empty() {
            return Err(WorkflowError::validation("username is required"));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(WorkflowError::validation("a valid email is required"));
        }

        let user = users::ActiveModel {
            id: Set(UserId::new().into_inner()),
            username: Set(username.to_string()),
            email: Set(email),
            full_name: Set(input.full_name.trim().to_string()),
            role: Set(core_role_to_db(input.role)),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        };

        let user = user.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                WorkflowError::validation("email is already registered")
            } else {
                db_err(e)
            }
        })?;

        tracing::info!(user_id = %user.id, role = %input.role, "user created");
        Ok(user)
    }
}
