use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::validate_mobile;

/// Raised when a text value does not name a known enum member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
    pub allowed: &'static [&'static str],
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} must be one of {}, got '{}'",
            self.field,
            self.allowed.join(", "),
            self.value
        )
    }
}

impl std::error::Error for UnknownVariant {}

macro_rules! text_enum {
    ($name:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const NAMES: &'static [&'static str] = &[$($text),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    _ => Err(UnknownVariant {
                        field: $field,
                        value: s.to_string(),
                        allowed: Self::NAMES,
                    }),
                }
            }
        }
    };
}

text_enum!(Designation, "designation", {
    Developer => "Developer",
    Manager => "Manager",
    Designer => "Designer",
    Tester => "Tester",
    Hr => "HR",
});

text_enum!(Course, "course", {
    Bca => "BCA",
    Mca => "MCA",
    Bsc => "BSC",
});

text_enum!(Gender, "gender", {
    Male => "Male",
    Female => "Female",
    Other => "Other",
});

/// Stored employee record, also the transfer representation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub designation: Designation,
    pub course: BTreeSet<Course>,
    pub gender: Gender,
    pub image: Option<String>,
    #[serde(skip)]
    pub image_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated create request, one field per attribute.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct NewEmployee {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(custom = "validate_mobile")]
    pub mobile: String,
    pub designation: Designation,
    pub course: BTreeSet<Course>,
    pub gender: Gender,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EmployeeUpdate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(custom = "validate_mobile")]
    pub mobile: Option<String>,
    pub designation: Option<Designation>,
    pub course: Option<BTreeSet<Course>>,
    pub gender: Option<Gender>,
}

impl EmployeeUpdate {
    /// Trims text fields in place so that blank values fail validation.
    pub fn normalize(&mut self) {
        for value in [&mut self.name, &mut self.email, &mut self.mobile]
            .into_iter()
            .flatten()
        {
            *value = value.trim().to_string();
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.mobile.is_none()
            && self.designation.is_none()
            && self.course.is_none()
            && self.gender.is_none()
    }

    /// Applies the set fields to `employee`, bumping `updated_at`.
    pub fn apply_to(&self, employee: &mut Employee, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            employee.name.clone_from(name);
        }
        if let Some(email) = &self.email {
            employee.email.clone_from(email);
        }
        if let Some(mobile) = &self.mobile {
            employee.mobile.clone_from(mobile);
        }
        if let Some(designation) = self.designation {
            employee.designation = designation;
        }
        if let Some(course) = &self.course {
            employee.course.clone_from(course);
        }
        if let Some(gender) = self.gender {
            employee.gender = gender;
        }
        employee.updated_at = now;
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EmployeeEnvelope {
    pub employee: Employee,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Employee {
        let now = Utc::now();
        Employee {
            id: Uuid::new_v4(),
            name: "Jo".to_string(),
            email: "jo@x.com".to_string(),
            mobile: "5551234".to_string(),
            designation: Designation::Hr,
            course: [Course::Mca, Course::Bca].into_iter().collect(),
            gender: Gender::Other,
            image: None,
            image_key: Some("internal".to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn parses_exact_enum_spellings() {
        assert_eq!("HR".parse::<Designation>().unwrap(), Designation::Hr);
        assert_eq!("BSC".parse::<Course>().unwrap(), Course::Bsc);
        assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);

        let err = "female".parse::<Gender>().unwrap_err();
        assert_eq!(err.to_string(), "gender must be one of Male, Female, Other, got 'female'");
    }

    #[test]
    fn serializes_courses_in_canonical_order_and_hides_image_key() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["course"], serde_json::json!(["BCA", "MCA"]));
        assert_eq!(json["designation"], "HR");
        assert!(json.get("imageKey").is_none());
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn update_rejects_unknown_fields_and_bad_enums() {
        let unknown = serde_json::from_str::<EmployeeUpdate>(r#"{"salary": 10}"#);
        assert!(unknown.is_err());

        let bad_enum = serde_json::from_str::<EmployeeUpdate>(r#"{"gender": "Robot"}"#);
        assert!(bad_enum.is_err());
    }

    #[test]
    fn update_applies_only_set_fields() {
        let mut employee = sample();
        let update = EmployeeUpdate {
            name: Some("Joanna".to_string()),
            course: Some(BTreeSet::new()),
            ..EmployeeUpdate::default()
        };
        let later = employee.updated_at + chrono::Duration::seconds(5);

        update.apply_to(&mut employee, later);

        assert_eq!(employee.name, "Joanna");
        assert_eq!(employee.email, "jo@x.com");
        assert!(employee.course.is_empty());
        assert_eq!(employee.updated_at, later);
    }

    #[test]
    fn new_employee_validation_reports_each_field() {
        let invalid = NewEmployee {
            name: String::new(),
            email: "not-an-email".to_string(),
            mobile: "55a".to_string(),
            designation: Designation::Developer,
            course: BTreeSet::new(),
            gender: Gender::Male,
        };

        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("mobile"));
    }
}
