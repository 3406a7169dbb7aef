//! Declarative description of every registration form.
//!
//! Each entity is a table of fields (input class, validation rules, how the
//! value lands in the request body) plus the selector graph: which field is
//! the scope and which fields depend on it.

use crate::models::enums::{
    BloodGroup, BoardType, EducationLevel, Gender, GradingSystem, IncomeRange, RecognitionStatus,
    RelationshipType, StudentStatus, UserRole,
};

use super::normalizer::FieldClass;
use super::rules::Rule;

/// How a validated value is written into the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadRule {
    /// Trimmed string, `""` when blank.
    Text,
    /// Uppercased trimmed string, for categorical fields.
    Code,
    Integer,
    /// Integer, left out of the body when blank.
    OptionalInteger,
    /// Identifier sent as a JSON string whatever the selector held.
    IdString,
    Flag,
    Secret,
    /// Falls back to another field's value when blank.
    DefaultsTo(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub class: FieldClass,
    pub rules: &'static [Rule],
    pub payload: PayloadRule,
}

const fn field(
    name: &'static str,
    label: &'static str,
    class: FieldClass,
    rules: &'static [Rule],
    payload: PayloadRule,
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        class,
        rules,
        payload,
    }
}

const fn text(name: &'static str, label: &'static str, rules: &'static [Rule]) -> FieldSpec {
    field(name, label, FieldClass::Text, rules, PayloadRule::Text)
}

const fn code(name: &'static str, label: &'static str, rules: &'static [Rule]) -> FieldSpec {
    field(name, label, FieldClass::Text, rules, PayloadRule::Code)
}

const fn flag(name: &'static str, label: &'static str) -> FieldSpec {
    field(name, label, FieldClass::Flag, &[], PayloadRule::Flag)
}

const PHONE_DIGITS: FieldClass = FieldClass::Digits(Some(10));
const NAME_RULES: &[Rule] = &[Rule::Required, Rule::MaxGraphemes(100)];
const REQUIRED: &[Rule] = &[Rule::Required];

/// Where a selector gets its options from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSource {
    Schools,
    BranchesOfSchool,
    UsersOfSchool(UserRole),
}

impl ListSource {
    pub fn empty_message(&self) -> String {
        match self {
            ListSource::Schools => "No schools available".to_string(),
            ListSource::BranchesOfSchool => "No branches available for this school".to_string(),
            ListSource::UsersOfSchool(role) => format!(
                "No {} users available for this school",
                role.as_str().to_lowercase()
            ),
        }
    }
}

/// A field whose options are re-fetched whenever the scope field changes.
#[derive(Debug, Clone, Copy)]
pub struct Dependent {
    pub field: &'static str,
    pub source: ListSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    School,
    Branch,
    User,
    Student,
    Parent,
    Relationship,
}

#[derive(Debug)]
pub struct EntitySchema {
    pub kind: EntityKind,
    own_fields: &'static [FieldSpec],
    with_address: bool,
    /// Field chosen from the all-schools list; changing it rescopes `dependents`.
    pub scope: Option<&'static str>,
    pub dependents: &'static [Dependent],
}

impl EntitySchema {
    pub fn fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        let address: &'static [FieldSpec] = if self.with_address { &ADDRESS } else { &[] };
        self.own_fields.iter().chain(address.iter())
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().find(|spec| spec.name == name)
    }

    pub fn dependent(&self, name: &str) -> Option<&'static Dependent> {
        self.dependents.iter().find(|d| d.field == name)
    }

    pub fn is_scope(&self, name: &str) -> bool {
        self.scope == Some(name)
    }
}

static ADDRESS: [FieldSpec; 5] = [
    text("address_line1", "Address line 1", REQUIRED),
    text("address_line2", "Address line 2", &[]),
    text("city", "City", REQUIRED),
    text("state", "State", REQUIRED),
    field(
        "pincode",
        "Pincode",
        FieldClass::Digits(Some(6)),
        &[Rule::Required, Rule::Pincode],
        PayloadRule::Text,
    ),
];

const SCHOOL_SELECT: FieldSpec = field(
    "school_id",
    "School",
    FieldClass::Text,
    &[Rule::Required, Rule::PositiveInt],
    PayloadRule::Integer,
);

const BRANCH_SELECT: FieldSpec = field(
    "branch_id",
    "Branch",
    FieldClass::Text,
    &[Rule::Required, Rule::PositiveInt],
    PayloadRule::Integer,
);

const fn user_select(name: &'static str, label: &'static str) -> FieldSpec {
    field(name, label, FieldClass::Text, REQUIRED, PayloadRule::IdString)
}

static SCHOOL: EntitySchema = EntitySchema {
    kind: EntityKind::School,
    own_fields: &[
        text("school_code", "School code", &[Rule::Required, Rule::MaxGraphemes(20)]),
        text("school_name", "School name", NAME_RULES),
        field("phone", "Phone", PHONE_DIGITS, &[Rule::Required, Rule::Phone], PayloadRule::Text),
        text("email", "Email", &[Rule::Required, Rule::Email]),
        text("website", "Website", &[Rule::Url]),
        code("board_type", "Board type", &[Rule::Required, Rule::OneOf(BoardType::VALUES)]),
        field(
            "academic_session_start_month",
            "Academic session start month",
            FieldClass::Text,
            &[Rule::Required, Rule::IntRange(1, 12)],
            PayloadRule::Integer,
        ),
        code(
            "grading_system",
            "Grading system",
            &[Rule::Required, Rule::OneOf(GradingSystem::VALUES)],
        ),
        text("affiliation_number", "Affiliation number", REQUIRED),
        code(
            "recognition_status",
            "Recognition status",
            &[Rule::Required, Rule::OneOf(RecognitionStatus::VALUES)],
        ),
        flag("rte_compliance", "RTE compliance"),
    ],
    with_address: true,
    scope: None,
    dependents: &[],
};

static BRANCH: EntitySchema = EntitySchema {
    kind: EntityKind::Branch,
    own_fields: &[
        SCHOOL_SELECT,
        text("branch_code", "Branch code", &[Rule::Required, Rule::MaxGraphemes(20)]),
        text("branch_name", "Branch name", NAME_RULES),
        field("phone", "Phone", PHONE_DIGITS, &[Rule::Required, Rule::Phone], PayloadRule::Text),
        flag("is_main_branch", "Main branch"),
        field(
            "max_students",
            "Max students",
            FieldClass::Digits(None),
            &[Rule::PositiveInt],
            PayloadRule::OptionalInteger,
        ),
    ],
    with_address: true,
    scope: Some("school_id"),
    dependents: &[],
};

static USER: EntitySchema = EntitySchema {
    kind: EntityKind::User,
    own_fields: &[
        SCHOOL_SELECT,
        BRANCH_SELECT,
        text("username", "Username", &[Rule::Required, Rule::MaxGraphemes(50)]),
        text("email", "Email", &[Rule::Required, Rule::Email]),
        field("phone", "Phone", PHONE_DIGITS, &[Rule::Required, Rule::Phone], PayloadRule::Text),
        field(
            "password",
            "Password",
            FieldClass::Secret,
            &[Rule::Required, Rule::MinChars(6)],
            PayloadRule::Secret,
        ),
        text("full_name", "Full name", NAME_RULES),
        text("date_of_birth", "Date of birth", &[Rule::Required, Rule::PastDate]),
        code("gender", "Gender", &[Rule::Required, Rule::OneOf(Gender::VALUES)]),
        code("role", "Role", &[Rule::Required, Rule::OneOf(UserRole::VALUES)]),
        text("employee_id", "Employee ID", &[]),
        text("designation", "Designation", &[]),
        field(
            "alternate_phone",
            "Alternate phone",
            PHONE_DIGITS,
            &[Rule::Phone],
            PayloadRule::DefaultsTo("phone"),
        ),
        field(
            "emergency_contact",
            "Emergency contact",
            PHONE_DIGITS,
            &[Rule::Phone],
            PayloadRule::DefaultsTo("phone"),
        ),
    ],
    with_address: true,
    scope: Some("school_id"),
    dependents: &[Dependent {
        field: "branch_id",
        source: ListSource::BranchesOfSchool,
    }],
};

static STUDENT: EntitySchema = EntitySchema {
    kind: EntityKind::Student,
    own_fields: &[
        SCHOOL_SELECT,
        BRANCH_SELECT,
        user_select("user_id", "Student user"),
        text("admission_number", "Admission number", REQUIRED),
        text("roll_number", "Roll number", REQUIRED),
        text("full_name", "Full name", NAME_RULES),
        text("date_of_birth", "Date of birth", &[Rule::Required, Rule::PastDate]),
        code("gender", "Gender", &[Rule::Required, Rule::OneOf(Gender::VALUES)]),
        code("blood_group", "Blood group", &[Rule::Required, Rule::OneOf(BloodGroup::VALUES)]),
        field(
            "aadhar_number",
            "Aadhar number",
            FieldClass::Digits(Some(12)),
            &[Rule::Required, Rule::Aadhar],
            PayloadRule::Text,
        ),
        text("admission_date", "Admission date", &[Rule::Required, Rule::Date]),
        field(
            "admission_class",
            "Admission class",
            FieldClass::Text,
            &[Rule::Required, Rule::IntRange(1, 12)],
            PayloadRule::Integer,
        ),
        code(
            "current_status",
            "Current status",
            &[Rule::Required, Rule::OneOf(StudentStatus::VALUES)],
        ),
        text("medical_conditions", "Medical conditions", &[]),
        text("emergency_contact_name", "Emergency contact name", NAME_RULES),
        field(
            "emergency_contact_phone",
            "Emergency contact phone",
            PHONE_DIGITS,
            &[Rule::Required, Rule::GuardianPhone],
            PayloadRule::Text,
        ),
        text("student_photo_url", "Student photo URL", &[Rule::Url]),
    ],
    with_address: true,
    scope: Some("school_id"),
    dependents: &[
        Dependent {
            field: "branch_id",
            source: ListSource::BranchesOfSchool,
        },
        Dependent {
            field: "user_id",
            source: ListSource::UsersOfSchool(UserRole::Student),
        },
    ],
};

static PARENT: EntitySchema = EntitySchema {
    kind: EntityKind::Parent,
    own_fields: &[
        SCHOOL_SELECT,
        user_select("user_id", "Parent user"),
        text("full_name", "Full name", NAME_RULES),
        field(
            "phone",
            "Phone",
            PHONE_DIGITS,
            &[Rule::Required, Rule::GuardianPhone],
            PayloadRule::Text,
        ),
        field(
            "whatsapp_number",
            "WhatsApp number",
            PHONE_DIGITS,
            &[Rule::GuardianPhone],
            PayloadRule::DefaultsTo("phone"),
        ),
        text("email", "Email", &[Rule::Required, Rule::Email]),
        text("occupation", "Occupation", REQUIRED),
        code(
            "annual_income_range",
            "Annual income range",
            &[Rule::Required, Rule::OneOf(IncomeRange::VALUES)],
        ),
        code(
            "education_level",
            "Education level",
            &[Rule::Required, Rule::OneOf(EducationLevel::VALUES)],
        ),
    ],
    with_address: true,
    scope: Some("school_id"),
    dependents: &[Dependent {
        field: "user_id",
        source: ListSource::UsersOfSchool(UserRole::Parent),
    }],
};

static RELATIONSHIP: EntitySchema = EntitySchema {
    kind: EntityKind::Relationship,
    own_fields: &[
        SCHOOL_SELECT,
        user_select("parent_user_id", "Parent user"),
        user_select("student_user_id", "Student user"),
        code(
            "relationship_type",
            "Relationship",
            &[Rule::Required, Rule::OneOf(RelationshipType::VALUES)],
        ),
        flag("is_primary_contact", "Primary contact"),
    ],
    with_address: false,
    scope: Some("school_id"),
    dependents: &[
        Dependent {
            field: "parent_user_id",
            source: ListSource::UsersOfSchool(UserRole::Parent),
        },
        Dependent {
            field: "student_user_id",
            source: ListSource::UsersOfSchool(UserRole::Student),
        },
    ],
};

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::School,
        EntityKind::Branch,
        EntityKind::User,
        EntityKind::Student,
        EntityKind::Parent,
        EntityKind::Relationship,
    ];

    pub fn schema(&self) -> &'static EntitySchema {
        match self {
            EntityKind::School => &SCHOOL,
            EntityKind::Branch => &BRANCH,
            EntityKind::User => &USER,
            EntityKind::Student => &STUDENT,
            EntityKind::Parent => &PARENT,
            EntityKind::Relationship => &RELATIONSHIP,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::School => "school",
            EntityKind::Branch => "branch",
            EntityKind::User => "user",
            EntityKind::Student => "student",
            EntityKind::Parent => "parent",
            EntityKind::Relationship => "relationship",
        }
    }

    pub fn endpoint(&self) -> &'static str {
        match self {
            EntityKind::School => "/schools/register",
            EntityKind::Branch => "/branches",
            EntityKind::User => "/users/register",
            EntityKind::Student => "/students/register",
            EntityKind::Parent => "/parents/register",
            EntityKind::Relationship => "/parents/relationships",
        }
    }

    pub fn success_message(&self) -> String {
        match self {
            EntityKind::Relationship => "Relationship linked successfully".to_string(),
            other => format!("{} registered successfully", capitalize(other.as_str())),
        }
    }

    pub fn failure_fallback(&self) -> String {
        match self {
            EntityKind::Relationship => {
                "Failed to link relationship. Please try again.".to_string()
            }
            other => format!("Failed to register {}. Please try again.", other.as_str()),
        }
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown form: {}", s))
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
