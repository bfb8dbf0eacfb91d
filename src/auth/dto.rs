use serde::{Deserialize, Serialize};

use crate::users::repo_types::PublicUser;

/// Login body. The `username` field carries the account email.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: PublicUser,
}
