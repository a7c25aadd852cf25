//! Vehicle platforms and the two-level category taxonomy

use serde::{Deserialize, Serialize};

/// A vehicle generation (make/model over a year range) that parts are built for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub id: i64,
    pub name: String,
    pub make: String,
    pub model: String,
    pub start_year: i32,
    pub end_year: i32,
    pub slug: String,
}

impl Platform {
    pub fn covers_year(&self, year: i32) -> bool { (self.start_year..=self.end_year).contains(&year) }

    pub fn matches_vehicle(&self, make: &str, model: &str, year: i32) -> bool {
        self.make.eq_ignore_ascii_case(make.trim())
            && self.model.eq_ignore_ascii_case(model.trim())
            && self.covers_year(year)
    }

    /// "2005-2014 Ford Mustang"
    pub fn display_name(&self) -> String {
        format!("{}-{} {} {}", self.start_year, self.end_year, self.make, self.model)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MainCategory {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub main_category_id: i64,
    pub name: String,
    pub slug: String,
}
