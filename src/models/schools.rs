use serde::Deserialize;

use super::common::{flexible_id, Choice};
use crate::core::ListLookup;

/// School row as returned by `GET /schools`.
#[derive(Debug, Clone, Deserialize)]
pub struct School {
    #[serde(alias = "school_id", deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub school_code: Option<String>,
    #[serde(alias = "name", default)]
    pub school_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl School {
    pub const LOOKUP: ListLookup<'static> = ListLookup {
        plural: "schools",
        id_keys: &["id", "school_id"],
        users_key: false,
    };

    pub fn choice(&self) -> Choice {
        let name = self.school_name.as_deref().unwrap_or("Unnamed school");
        let label = match &self.school_code {
            Some(code) => format!("{} ({})", name, code),
            None => name.to_string(),
        };
        Choice::new(self.id.clone(), label)
    }
}
