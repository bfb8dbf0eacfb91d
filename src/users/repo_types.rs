use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Authorization role. Stored as the Postgres enum `user_role`, lowercase
/// on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Full user row. Only the authentication path ever loads this; the
/// password hash never serializes.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub user_id: i32,
    pub user_name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password: String,
}

impl User {
    pub fn into_public(self) -> PublicUser {
        PublicUser {
            user_id: self.user_id,
            user_name: self.user_name,
            email: self.email,
            role: self.role,
        }
    }
}

/// The four public attributes. Every read outside the login path selects
/// exactly these columns.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PublicUser {
    pub user_id: i32,
    pub user_name: String,
    pub email: String,
    pub role: Role,
}

/// Insert payload. `password` is already an argon2 hash; hashing happens in
/// the handler before this type is built.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_name: String,
    pub email: String,
    pub role: Role,
    pub password: String,
}

/// Partial update; `None` fields keep their stored values. `password`, when
/// present, is already hashed.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_row_never_serializes_the_password() {
        let user = User {
            user_id: 1,
            user_name: "alice".into(),
            email: "a@x.com".into(),
            role: Role::User,
            password: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".into(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["user_name"], "alice");
    }

    #[test]
    fn public_projection_has_exactly_the_four_attributes() {
        let user = PublicUser {
            user_id: 2,
            user_name: "bob".into(),
            email: "b@x.com".into(),
            role: Role::Admin,
        };
        let json = serde_json::to_value(&user).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 4);
        for key in ["user_id", "user_name", "email", "role"] {
            assert!(keys.iter().any(|k| k == key), "missing {key}");
        }
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn role_defaults_to_user_and_round_trips_lowercase() {
        assert_eq!(Role::default(), Role::User);
        assert_eq!(serde_json::to_value(Role::User).unwrap(), "user");
        assert_eq!(
            serde_json::from_value::<Role>(serde_json::json!("admin")).unwrap(),
            Role::Admin
        );
    }
}
