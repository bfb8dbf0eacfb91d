use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;

use crate::auth::password::hash_password;
use crate::error::ApiError;

use super::repo_types::{NewUser, Role, UserChanges};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Registration body. Role is optional and defaults to `user`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub user_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut problems = Vec::new();
        if self.user_name.trim().len() < 3 {
            problems.push("Username too short");
        }
        if self.password.len() < 5 {
            problems.push("Password too short");
        }
        if !is_valid_email(self.email.trim()) {
            problems.push("Email not valid");
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ApiError::BadRequest(problems.join(", ")))
        }
    }

    pub fn into_new_user(self) -> Result<NewUser, ApiError> {
        let password = hash_password(&self.password)?;
        Ok(NewUser {
            user_name: self.user_name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            role: self.role.unwrap_or_default(),
            password,
        })
    }
}

/// Update body; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut problems = Vec::new();
        if let Some(user_name) = &self.user_name {
            if user_name.trim().len() < 3 {
                problems.push("Username too short");
            }
        }
        if let Some(password) = &self.password {
            if password.len() < 5 {
                problems.push("Password too short");
            }
        }
        if let Some(email) = &self.email {
            if !is_valid_email(email.trim()) {
                problems.push("Email not valid");
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ApiError::BadRequest(problems.join(", ")))
        }
    }

    pub fn into_changes(self) -> Result<UserChanges, ApiError> {
        let password = match self.password {
            Some(plain) => Some(hash_password(&plain)?),
            None => None,
        };
        Ok(UserChanges {
            user_name: self.user_name.map(|s| s.trim().to_string()),
            email: self.email.map(|e| e.trim().to_lowercase()),
            role: self.role,
            password,
        })
    }
}
