//! User Repository

use super::{BaseRepository, RepoError, RepoResult, record_id};
use crate::db::models::{Role, User, UserCreate, UserUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const USER_TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all users
    pub async fn find_all(&self) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user ORDER BY email")
            .await?
            .take(0)?;
        Ok(users)
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let thing = record_id(USER_TABLE, id)?;
        let user: Option<User> = self.base.db().select(thing).await?;
        Ok(user)
    }

    /// Find user by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email_owned = email.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Create a new user
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        // Check duplicate email (unique index is the backstop)
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "User with email '{}' already exists",
                data.email
            )));
        }

        // Hash password
        let password_hash = User::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        let role = data.role.unwrap_or(Role::Customer);
        let created_at = chrono::Utc::now().to_rfc3339();

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE user SET
                    email = $email,
                    password_hash = $password_hash,
                    first_name = $first_name,
                    last_name = $last_name,
                    role = $role,
                    created_at = $created_at
                RETURN AFTER"#,
            )
            .bind(("email", data.email))
            .bind(("password_hash", password_hash))
            .bind(("first_name", data.first_name))
            .bind(("last_name", data.last_name))
            .bind(("role", role))
            .bind(("created_at", created_at))
            .await?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Update a user
    pub async fn update(&self, id: &str, data: UserUpdate) -> RepoResult<User> {
        let thing = record_id(USER_TABLE, id)?;

        // Check duplicate email if changing
        if let Some(ref new_email) = data.email
            && let Some(existing) = self.find_by_email(new_email).await?
            && existing.id.as_ref() != Some(&thing)
        {
            return Err(RepoError::Duplicate(format!(
                "User with email '{}' already exists",
                new_email
            )));
        }

        // Build dynamic SET clauses with proper type bindings
        let mut set_parts: Vec<&str> = Vec::new();
        if data.email.is_some() {
            set_parts.push("email = $email");
        }
        if data.first_name.is_some() {
            set_parts.push("first_name = $first_name");
        }
        if data.last_name.is_some() {
            set_parts.push("last_name = $last_name");
        }
        if data.role.is_some() {
            set_parts.push("role = $role");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)));
        }

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self.base.db().query(query_str).bind(("thing", thing));

        if let Some(v) = data.email {
            query = query.bind(("email", v));
        }
        if let Some(v) = data.first_name {
            query = query.bind(("first_name", v));
        }
        if let Some(v) = data.last_name {
            query = query.bind(("last_name", v));
        }
        if let Some(v) = data.role {
            query = query.bind(("role", v));
        }

        let mut result = query.await?;
        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Hard delete a user
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let thing = record_id(USER_TABLE, id)?;
        let deleted: Option<User> = self.base.db().delete(thing).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }
}
