use serde_json::Value;

/// Which dashboard a signed-in user gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardRole {
    Teacher,
    Parent,
    Student,
    Admin,
}

impl DashboardRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardRole::Teacher => "teacher",
            DashboardRole::Parent => "parent",
            DashboardRole::Student => "student",
            DashboardRole::Admin => "admin",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "teacher" => Some(DashboardRole::Teacher),
            "parent" | "guardian" => Some(DashboardRole::Parent),
            "student" => Some(DashboardRole::Student),
            "admin" | "super_admin" | "school_admin" | "principal" => Some(DashboardRole::Admin),
            _ => None,
        }
    }
}

/// Normalizes the role carried by a raw user object.
///
/// `role` may be a plain string or an object with a `name`; `user_role` and
/// the first entry of `roles` are tried when `role` is absent.
pub fn resolve_role(user: &Value) -> Option<DashboardRole> {
    let candidate = user
        .get("role")
        .or_else(|| user.get("user_role"))
        .or_else(|| user.get("roles").and_then(|roles| roles.get(0)))?;

    let name = match candidate {
        Value::String(name) => name.as_str(),
        Value::Object(_) => candidate.get("name")?.as_str()?,
        _ => return None,
    };
    DashboardRole::from_name(name)
}
