use serde::Deserialize;
use time::Date;

use crate::error::ApiError;

use super::repo_types::CatChanges;

/// JSON body for cat updates; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCatRequest {
    pub cat_name: Option<String>,
    pub weight: Option<f64>,
    pub birthdate: Option<Date>,
}

impl UpdateCatRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut problems = Vec::new();
        if let Some(cat_name) = &self.cat_name {
            if cat_name.trim().is_empty() {
                problems.push("Cat name is empty");
            }
        }
        if let Some(weight) = self.weight {
            if !weight.is_finite() || weight <= 0.0 {
                problems.push("Weight not valid");
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ApiError::BadRequest(problems.join(", ")))
        }
    }

    pub fn into_changes(self) -> CatChanges {
        CatChanges {
            cat_name: self.cat_name.map(|s| s.trim().to_string()),
            weight: self.weight,
            birthdate: self.birthdate,
        }
    }
}
