use serde::Deserialize;

use super::common::{flexible_id, Choice};
use crate::core::ListLookup;

/// User row from `GET /users/school/{schoolId}/{ROLE}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserSummary {
    #[serde(alias = "user_id", deserialize_with = "flexible_id")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl UserSummary {
    pub const LOOKUP: ListLookup<'static> = ListLookup {
        plural: "users",
        id_keys: &["id", "user_id"],
        users_key: true,
    };

    pub fn choice(&self) -> Choice {
        let name = self
            .full_name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or("Unnamed user");
        let label = match &self.email {
            Some(email) => format!("{} <{}>", name, email),
            None => name.to_string(),
        };
        Choice::new(self.id.clone(), label)
    }
}
