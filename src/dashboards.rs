//! Read-only dashboards mounted after sign-in.

use serde_json::Value;

use crate::api::ApiClient;
use crate::core::{id_as_string, AppError};
use crate::session::{DashboardRole, SessionContext};

const STUDENT_ID_POINTERS: &[&str] = &[
    "/student_id",
    "/student/id",
    "/data/student_id",
    "/data/student/id",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Dashboard {
    Student { student_id: String, data: Value },
    Teacher { teacher_id: String, data: Value },
    /// Rendered from the session user; the parent view has no aggregate endpoint.
    Parent { user: Value },
    /// The registration console itself.
    Admin { user: Value },
}

impl Dashboard {
    pub fn role(&self) -> DashboardRole {
        match self {
            Dashboard::Student { .. } => DashboardRole::Student,
            Dashboard::Teacher { .. } => DashboardRole::Teacher,
            Dashboard::Parent { .. } => DashboardRole::Parent,
            Dashboard::Admin { .. } => DashboardRole::Admin,
        }
    }
}

/// Student record id inside a `GET /users/{id}` response.
pub fn student_id_from(detail: &Value) -> Option<String> {
    STUDENT_ID_POINTERS
        .iter()
        .find_map(|pointer| detail.pointer(pointer).and_then(id_as_string))
}

/// Picks the dashboard for the signed-in user and loads whatever it displays.
#[tracing::instrument(name = "Load dashboard", skip_all)]
pub async fn load_dashboard(api: &ApiClient, session: &SessionContext) -> Result<Dashboard, AppError> {
    let user = session
        .user()
        .ok_or_else(|| AppError::session_error("Not signed in"))?;
    let role = session
        .role()
        .ok_or_else(|| AppError::session_error("This account has no dashboard for its role"))?;
    let user_id = session.user_id();

    match role {
        DashboardRole::Student => {
            let user_id =
                user_id.ok_or_else(|| AppError::session_error("Signed-in user has no id"))?;
            let detail = api.user_detail(&user_id).await?;
            let student_id = student_id_from(&detail).ok_or_else(|| {
                AppError::session_error("No student record is linked to this account")
            })?;
            tracing::debug!(%user_id, %student_id, "resolved student record");
            let data = api.student_dashboard(&student_id).await?;
            Ok(Dashboard::Student { student_id, data })
        }
        DashboardRole::Teacher => {
            let teacher_id = user
                .get("teacher_id")
                .and_then(id_as_string)
                .or(user_id)
                .ok_or_else(|| AppError::session_error("Signed-in user has no id"))?;
            let data = api.teacher_dashboard(&teacher_id).await?;
            Ok(Dashboard::Teacher { teacher_id, data })
        }
        DashboardRole::Parent => Ok(Dashboard::Parent { user }),
        DashboardRole::Admin => Ok(Dashboard::Admin { user }),
    }
}
