use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Returns the current UTC time as an RFC 3339 string.
pub fn now_str() -> String {
    Utc::now().to_rfc3339()
}

/// A yes/no answer on the RSVP form. An unanswered question is `None`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Yes,
    No,
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Choice::Yes => write!(f, "yes"),
            Choice::No => write!(f, "no"),
        }
    }
}

/// The guest-writable part of an RSVP.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RsvpDraft {
    pub name: String,
    /// Six digits, used only as a shared secret alongside the name.
    pub birthdate: String,
    #[serde(default)]
    pub attendance: Option<Choice>,
    #[serde(default)]
    pub meal: Option<Choice>,
    #[serde(default)]
    pub companion_count: u32,
    #[serde(default)]
    pub message: String,
}

impl RsvpDraft {
    /// Names of the required fields that are absent or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.birthdate.trim().is_empty() {
            missing.push("birthdate");
        }
        if self.attendance.is_none() {
            missing.push("attendance");
        }
        if self.meal.is_none() {
            missing.push("meal");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// A stored RSVP document.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RsvpRecord {
    pub id: String,
    pub name: String,
    pub birthdate: String,
    #[serde(default)]
    pub attendance: Option<Choice>,
    #[serde(default)]
    pub meal: Option<Choice>,
    #[serde(default)]
    pub companion_count: u32,
    #[serde(default)]
    pub message: String,
    pub created_at: String,
    pub updated_at: String,
}

impl RsvpRecord {
    /// Builds a freshly created record with server-assigned id and timestamps.
    pub fn from_draft(id: String, draft: RsvpDraft) -> Self {
        let now = now_str();
        RsvpRecord {
            id,
            name: draft.name,
            birthdate: draft.birthdate,
            attendance: draft.attendance,
            meal: draft.meal,
            companion_count: draft.companion_count,
            message: draft.message,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Overwrites the writable fields and refreshes `updated_at`.
    pub fn apply(&mut self, draft: RsvpDraft) {
        self.name = draft.name;
        self.birthdate = draft.birthdate;
        self.attendance = draft.attendance;
        self.meal = draft.meal;
        self.companion_count = draft.companion_count;
        self.message = draft.message;
        self.updated_at = now_str();
    }

    pub fn draft(&self) -> RsvpDraft {
        RsvpDraft {
            name: self.name.clone(),
            birthdate: self.birthdate.clone(),
            attendance: self.attendance,
            meal: self.meal,
            companion_count: self.companion_count,
            message: self.message.clone(),
        }
    }

    pub fn matches_identity(&self, name: &str, birthdate: &str) -> bool {
        self.name == name && self.birthdate == birthdate
    }
}

/// Body of the like-counter endpoints. `count` is null until the
/// counter document exists.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeCount {
    pub count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_reports_blank_and_unset() {
        let draft = RsvpDraft {
            name: "  ".to_string(),
            birthdate: String::new(),
            attendance: Some(Choice::Yes),
            meal: None,
            ..Default::default()
        };
        assert_eq!(draft.missing_fields(), vec!["name", "birthdate", "meal"]);
        assert!(!draft.is_complete());
    }

    #[test]
    fn test_record_wire_format() {
        let record = RsvpRecord::from_draft(
            "abc".to_string(),
            RsvpDraft {
                name: "김철수".to_string(),
                birthdate: "900101".to_string(),
                attendance: Some(Choice::Yes),
                meal: Some(Choice::No),
                companion_count: 2,
                message: "축하해요".to_string(),
            },
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["attendance"], "yes");
        assert_eq!(json["meal"], "no");
        assert_eq!(json["companionCount"], 2);
        assert_eq!(json["createdAt"], json["updatedAt"]);
    }

    #[test]
    fn test_draft_accepts_null_answers() {
        let draft: RsvpDraft = serde_json::from_str(
            r#"{"name":"홍길동","birthdate":"","attendance":null,"meal":null}"#,
        )
        .unwrap();
        assert_eq!(draft.attendance, None);
        assert_eq!(draft.companion_count, 0);
        assert!(draft.message.is_empty());
    }
}
