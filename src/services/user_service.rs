use crate::dto::auth_dto::{RegisterRequest, UpdateProfileRequest};
use crate::error::{Error, Result};
use crate::models::user::User;
use crate::utils::crypto::{hash_password, verify_password};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a new account. All input validation happens before any store
    /// access; the duplicate-email pre-check is backed by the unique index on
    /// `users.email`, which closes the read-then-write race at the store
    /// boundary.
    pub async fn register(&self, req: RegisterRequest) -> Result<User> {
        req.validate()?;
        if req.password != req.confirm_password {
            return Err(Error::Validation("Passwords do not match".to_string()));
        }

        if self.find_by_email(&req.email).await?.is_some() {
            return Err(Error::Conflict("User already exists".to_string()));
        }

        let password_hash = hash_password(&req.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username, password_hash, age, grade)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&req.email)
        .bind(&req.username)
        .bind(&password_hash)
        .bind(req.age)
        .bind(&req.grade)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match Error::from(e) {
            Error::Conflict(_) => Error::Conflict("User already exists".to_string()),
            other => other,
        })?;

        tracing::info!(user_id = %user.id, "Registered new user");
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let Some(user) = self.find_by_email(email).await? else {
            return Err(Error::NotAuthenticated(
                "Invalid email or password".to_string(),
            ));
        };
        if !verify_password(password, &user.password_hash)? {
            return Err(Error::NotAuthenticated(
                "Invalid email or password".to_string(),
            ));
        }
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE email = $1"#)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Resolves the session's user, treating a vanished row as a dead session.
    pub async fn get(&self, id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        user.ok_or_else(|| Error::NotAuthenticated("Session user no longer exists".to_string()))
    }

    pub async fn update_profile(&self, id: Uuid, req: UpdateProfileRequest) -> Result<User> {
        req.validate()?;

        let password_hash = match req.password.as_deref() {
            Some(plain) if !plain.is_empty() => Some(hash_password(plain)?),
            _ => None,
        };

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($1, name),
                email = COALESCE($2, email),
                phone = COALESCE($3, phone),
                grade = COALESCE($4, grade),
                age = COALESCE($5, age),
                password_hash = COALESCE($6, password_hash),
                updated_at = NOW()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&req.name)
        .bind(&req.email)
        .bind(&req.phone)
        .bind(&req.grade)
        .bind(req.age)
        .bind(&password_hash)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}
