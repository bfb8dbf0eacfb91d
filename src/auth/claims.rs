use serde::{Deserialize, Serialize};

use crate::users::repo_types::Role;

/// JWT payload attached to every authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,   // user id
    pub role: Role, // authorization role, fixed at login time
    pub iat: usize, // issued at (unix timestamp)
    pub exp: usize, // expires at (unix timestamp)
    pub iss: String,
    pub aud: String,
}
