use serde::Deserialize;

use super::common::{flexible_id, optional_flexible_id, Choice};
use crate::core::ListLookup;

#[derive(Debug, Clone, Deserialize)]
pub struct Branch {
    #[serde(alias = "branch_id", deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default, deserialize_with = "optional_flexible_id")]
    pub school_id: Option<String>,
    #[serde(default)]
    pub branch_code: Option<String>,
    #[serde(alias = "name", default)]
    pub branch_name: Option<String>,
    #[serde(default)]
    pub is_main_branch: bool,
}

impl Branch {
    pub const LOOKUP: ListLookup<'static> = ListLookup {
        plural: "branches",
        id_keys: &["id", "branch_id"],
        users_key: false,
    };

    pub fn belongs_to(&self, school_id: &str) -> bool {
        self.school_id.as_deref() == Some(school_id)
    }

    pub fn choice(&self) -> Choice {
        let name = self.branch_name.as_deref().unwrap_or("Unnamed branch");
        let label = if self.is_main_branch {
            format!("{} (main)", name)
        } else {
            name.to_string()
        };
        Choice::new(self.id.clone(), label)
    }
}
