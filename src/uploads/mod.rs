//! Bulk imports. Each kind declares its endpoints and accepted files; one
//! kind (school setup) validates on the server before committing.

mod flow;
mod summary;

pub use flow::{AutoConfirm, Confirmer, UploadController, UploadOutcome};
pub use summary::{UploadCounts, UploadPreview, UploadSummary, MAX_SAMPLE_ERRORS};

use std::path::Path;

const SPREADSHEETS: &[&str] = &["csv", "xlsx", "xls"];
const SPREADSHEETS_AND_DOCUMENTS: &[&str] = &["csv", "xlsx", "xls", "pdf", "doc", "docx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadKind {
    SchoolSetup,
    Families,
    Attendance,
    StudentEnrollments,
    QuestionPapers,
    ReportCards,
}

/// Per-kind capabilities.
#[derive(Debug, Clone, Copy)]
pub struct UploadSpec {
    pub endpoint: &'static str,
    /// Dry-run endpoint. Present only for two-phase kinds.
    pub validate_endpoint: Option<&'static str>,
    pub field_name: &'static str,
    pub extensions: &'static [&'static str],
    /// Form fields that must accompany the file.
    pub extra_fields: &'static [&'static str],
}

impl UploadKind {
    pub const ALL: [UploadKind; 6] = [
        UploadKind::SchoolSetup,
        UploadKind::Families,
        UploadKind::Attendance,
        UploadKind::StudentEnrollments,
        UploadKind::QuestionPapers,
        UploadKind::ReportCards,
    ];

    pub fn spec(&self) -> UploadSpec {
        let simple = |endpoint| UploadSpec {
            endpoint,
            validate_endpoint: None,
            field_name: "file",
            extensions: SPREADSHEETS,
            extra_fields: &[],
        };
        match self {
            UploadKind::SchoolSetup => UploadSpec {
                endpoint: "/unified-setup/upload",
                validate_endpoint: Some("/unified-setup/validate"),
                field_name: "csvFile",
                extensions: SPREADSHEETS,
                extra_fields: &[],
            },
            UploadKind::Families => simple("/bulk-upload/families"),
            UploadKind::Attendance => simple("/attendance/upload"),
            UploadKind::StudentEnrollments => simple("/upload/student_enrollments"),
            UploadKind::QuestionPapers => UploadSpec {
                extensions: SPREADSHEETS_AND_DOCUMENTS,
                ..simple("/question-papers/upload")
            },
            UploadKind::ReportCards => UploadSpec {
                extra_fields: &["schoolId", "yearId", "term"],
                ..simple("/report-cards/upload-csv")
            },
        }
    }

    pub fn is_two_phase(&self) -> bool {
        self.spec().validate_endpoint.is_some()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadKind::SchoolSetup => "school-setup",
            UploadKind::Families => "families",
            UploadKind::Attendance => "attendance",
            UploadKind::StudentEnrollments => "student-enrollments",
            UploadKind::QuestionPapers => "question-papers",
            UploadKind::ReportCards => "report-cards",
        }
    }

    /// Case-insensitive extension check against the kind's allowed set.
    pub fn accepts(&self, file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.spec()
                    .extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }

    pub fn allowed_list(&self) -> String {
        self.spec()
            .extensions
            .iter()
            .map(|ext| format!(".{}", ext))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::str::FromStr for UploadKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        UploadKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| format!("Unknown upload kind: {}", s))
    }
}
