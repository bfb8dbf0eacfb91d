use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;

use crate::auth::extractors::AuthUser;
use crate::users::repo_types::Role;

/// Owner summary joined onto every cat read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatOwner {
    pub user_id: i32,
    pub user_name: String,
}

/// Flat row produced by the cat/owner join. `coords` is unpacked into the
/// two scalars in SQL; the owner columns are folded into [`CatOwner`] when
/// building the read model.
#[derive(Debug, Clone, FromRow)]
pub struct CatRow {
    pub cat_id: i32,
    pub cat_name: String,
    pub weight: f64,
    pub filename: String,
    pub birthdate: Date,
    pub lat: f64,
    pub lng: f64,
    pub owner_id: i32,
    pub owner_name: String,
}

/// Read model shared by the list and single-cat paths.
#[derive(Debug, Clone, Serialize)]
pub struct Cat {
    pub cat_id: i32,
    pub cat_name: String,
    pub weight: f64,
    pub filename: String,
    pub birthdate: Date,
    pub lat: f64,
    pub lng: f64,
    pub owner: CatOwner,
}

impl From<CatRow> for Cat {
    fn from(row: CatRow) -> Self {
        Self {
            cat_id: row.cat_id,
            cat_name: row.cat_name,
            weight: row.weight,
            filename: row.filename,
            birthdate: row.birthdate,
            lat: row.lat,
            lng: row.lng,
            owner: CatOwner {
                user_id: row.owner_id,
                user_name: row.owner_name,
            },
        }
    }
}

/// Insert payload; `owner` is the authenticated uploader's id and
/// `filename` comes from the file store.
#[derive(Debug, Clone)]
pub struct NewCat {
    pub cat_name: String,
    pub weight: f64,
    pub owner: i32,
    pub filename: String,
    pub birthdate: Date,
    pub lat: f64,
    pub lng: f64,
}

/// Partial update; `None` fields keep their stored values.
#[derive(Debug, Clone, Default)]
pub struct CatChanges {
    pub cat_name: Option<String>,
    pub weight: Option<f64>,
    pub birthdate: Option<Date>,
}

/// WHERE clause selector for cat updates. Non-admin callers only ever match
/// rows they own; admins match by primary key alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateScope {
    OwnerScoped { cat_id: i32, owner_id: i32 },
    Unscoped { cat_id: i32 },
}

impl UpdateScope {
    pub fn for_caller(caller: &AuthUser, cat_id: i32) -> Self {
        match caller.role {
            Role::Admin => UpdateScope::Unscoped { cat_id },
            Role::User => UpdateScope::OwnerScoped {
                cat_id,
                owner_id: caller.user_id,
            },
        }
    }
}
