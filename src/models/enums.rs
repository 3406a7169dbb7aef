//! Categorical values accepted by the registration forms, in their wire spelling.

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const VALUES: &'static [&'static str] = &[$($wire),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $(v if v.eq_ignore_ascii_case($wire) => Ok(Self::$variant),)+
                    other => Err(format!("Invalid {}: {}", stringify!($name), other)),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(BoardType {
    Cbse => "CBSE",
    Icse => "ICSE",
    StateBoard => "STATE_BOARD",
    Ib => "IB",
    Igcse => "IGCSE",
});

wire_enum!(GradingSystem {
    Percentage => "PERCENTAGE",
    Grade => "GRADE",
    Cgpa => "CGPA",
});

wire_enum!(RecognitionStatus {
    Recognized => "RECOGNIZED",
    Provisional => "PROVISIONAL",
    Pending => "PENDING",
});

wire_enum!(Gender {
    Male => "M",
    Female => "F",
    Other => "O",
});

wire_enum!(
    /// Account role as stored by the backend.
    UserRole {
        Principal => "PRINCIPAL",
        Teacher => "TEACHER",
        Parent => "PARENT",
        Admin => "ADMIN",
        Student => "STUDENT",
    }
);

wire_enum!(BloodGroup {
    APositive => "A+",
    ANegative => "A-",
    BPositive => "B+",
    BNegative => "B-",
    AbPositive => "AB+",
    AbNegative => "AB-",
    OPositive => "O+",
    ONegative => "O-",
});

wire_enum!(StudentStatus {
    Active => "ACTIVE",
    Inactive => "INACTIVE",
    Suspended => "SUSPENDED",
});

wire_enum!(IncomeRange {
    Below2Lakh => "BELOW_2_LAKH",
    From2To5Lakh => "2_5_LAKH",
    From5To10Lakh => "5_10_LAKH",
    From10To25Lakh => "10_25_LAKH",
    Above25Lakh => "ABOVE_25_LAKH",
});

wire_enum!(EducationLevel {
    Below10th => "BELOW_10TH",
    Tenth => "10TH",
    Twelfth => "12TH",
    Graduate => "GRADUATE",
    PostGraduate => "POST_GRADUATE",
    Doctorate => "DOCTORATE",
});

wire_enum!(RelationshipType {
    Father => "FATHER",
    Mother => "MOTHER",
    Guardian => "GUARDIAN",
});
