use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    pub confirm_password: String,
    pub age: Option<i32>,
    pub grade: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub grade: Option<String>,
    pub age: Option<i32>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub id: uuid::Uuid,
    pub email: String,
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            username: "learner".into(),
            password: password.into(),
            confirm_password: password.into(),
            age: Some(12),
            grade: Some("7".into()),
        }
    }

    #[test]
    fn malformed_email_fails_validation() {
        assert!(register("bad-email", "longenough").validate().is_err());
    }

    #[test]
    fn short_password_fails_validation() {
        assert!(register("kid@example.com", "short").validate().is_err());
    }

    #[test]
    fn well_formed_registration_passes() {
        assert!(register("kid@example.com", "longenough").validate().is_ok());
    }

    #[test]
    fn profile_update_with_no_changes_is_valid() {
        let req = UpdateProfileRequest {
            name: None,
            email: None,
            phone: None,
            grade: None,
            age: None,
            password: None,
        };
        assert!(req.validate().is_ok());
    }
}
