//! Closed field schema shared by the single-card editor and the bulk importer.
//!
//! Every card field is addressed by a `FieldKey` rather than a free-form string, so a
//! misspelled key is a compile error instead of a silently empty field. Each
//! `Category` owns an ordered default field list; imported records are always seeded
//! with the full list of their category, matched or not.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical key of a card field. Serialized in camelCase (`rollNo`, `bloodGroup`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldKey {
    Name,
    RollNo,
    Class,
    Section,
    EnrollmentNo,
    Course,
    Department,
    Year,
    EmployeeId,
    Designation,
    ParticipantId,
    EventName,
    Role,
    Organization,
    Dob,
    BloodGroup,
    ParentName,
    Phone,
    Email,
    Address,
    ValidUntil,
}

/// Keys that identify a person, in the order they are consulted.
pub const IDENTIFIER_KEYS: [FieldKey; 4] = [
    FieldKey::RollNo,
    FieldKey::EnrollmentNo,
    FieldKey::EmployeeId,
    FieldKey::ParticipantId,
];

impl FieldKey {
    /// The camelCase key as it appears on the wire and in header matching.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::RollNo => "rollNo",
            Self::Class => "class",
            Self::Section => "section",
            Self::EnrollmentNo => "enrollmentNo",
            Self::Course => "course",
            Self::Department => "department",
            Self::Year => "year",
            Self::EmployeeId => "employeeId",
            Self::Designation => "designation",
            Self::ParticipantId => "participantId",
            Self::EventName => "eventName",
            Self::Role => "role",
            Self::Organization => "organization",
            Self::Dob => "dob",
            Self::BloodGroup => "bloodGroup",
            Self::ParentName => "parentName",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Address => "address",
            Self::ValidUntil => "validUntil",
        }
    }

    /// Human readable label used in templates and on the card.
    pub fn default_label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::RollNo => "Roll No",
            Self::Class => "Class",
            Self::Section => "Section",
            Self::EnrollmentNo => "Enrollment No",
            Self::Course => "Course",
            Self::Department => "Department",
            Self::Year => "Year",
            Self::EmployeeId => "Employee ID",
            Self::Designation => "Designation",
            Self::ParticipantId => "Participant ID",
            Self::EventName => "Event Name",
            Self::Role => "Role",
            Self::Organization => "Organization",
            Self::Dob => "Date of Birth",
            Self::BloodGroup => "Blood Group",
            Self::ParentName => "Parent Name",
            Self::Phone => "Phone",
            Self::Email => "Email",
            Self::Address => "Address",
            Self::ValidUntil => "Valid Until",
        }
    }

    pub fn is_identifier(&self) -> bool {
        IDENTIFIER_KEYS.contains(self)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Card category selected by the user; decides the default field set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    School,
    College,
    Corporate,
    Event,
    Custom,
}

impl Category {
    /// Ordered default field keys for this category.
    pub fn field_keys(&self) -> &'static [FieldKey] {
        use FieldKey::*;
        match self {
            Self::School => &[
                Name, RollNo, Class, Section, Dob, BloodGroup, ParentName, Phone, Address,
            ],
            Self::College => &[
                Name,
                EnrollmentNo,
                Course,
                Department,
                Year,
                Dob,
                BloodGroup,
                Phone,
                Email,
            ],
            Self::Corporate => &[
                Name,
                EmployeeId,
                Designation,
                Department,
                BloodGroup,
                Phone,
                Email,
                ValidUntil,
            ],
            Self::Event => &[
                Name,
                ParticipantId,
                EventName,
                Role,
                Organization,
                Phone,
                Email,
            ],
            Self::Custom => &[Name, Role, Organization, Phone, Email, Address],
        }
    }

    /// Fresh, empty, enabled field values for this category.
    pub fn default_fields(&self) -> Vec<FieldValue> {
        self.field_keys()
            .iter()
            .map(|key| FieldValue::empty(*key))
            .collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::School => "school",
            Self::College => "college",
            Self::Corporate => "corporate",
            Self::Event => "event",
            Self::Custom => "custom",
        }
    }
}

/// One field on a card: key, display label, value and visibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    pub key: FieldKey,
    pub label: String,
    pub value: String,
    pub enabled: bool,
}

impl FieldValue {
    pub fn empty(key: FieldKey) -> Self {
        Self {
            key,
            label: key.default_label().to_string(),
            value: String::new(),
            enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_key_serializes_camel_case() {
        let json = serde_json::to_string(&FieldKey::RollNo).unwrap();
        assert_eq!(json, "\"rollNo\"");
        let back: FieldKey = serde_json::from_str("\"bloodGroup\"").unwrap();
        assert_eq!(back, FieldKey::BloodGroup);
    }

    #[test]
    fn test_as_str_matches_serde_name() {
        for category in [
            Category::School,
            Category::College,
            Category::Corporate,
            Category::Event,
            Category::Custom,
        ] {
            for key in category.field_keys() {
                let json = serde_json::to_string(key).unwrap();
                assert_eq!(json, format!("\"{}\"", key.as_str()));
            }
        }
    }

    #[test]
    fn test_every_category_starts_with_name() {
        for category in [
            Category::School,
            Category::College,
            Category::Corporate,
            Category::Event,
            Category::Custom,
        ] {
            assert_eq!(category.field_keys()[0], FieldKey::Name, "{category:?}");
        }
    }

    #[test]
    fn test_default_fields_are_empty_and_enabled() {
        let fields = Category::Corporate.default_fields();
        assert_eq!(fields.len(), Category::Corporate.field_keys().len());
        assert!(fields.iter().all(|f| f.value.is_empty() && f.enabled));
        assert_eq!(fields[1].label, "Employee ID");
    }

    #[test]
    fn test_identifier_keys() {
        assert!(FieldKey::ParticipantId.is_identifier());
        assert!(!FieldKey::Name.is_identifier());
    }
}
