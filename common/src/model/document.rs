use serde::{Deserialize, Serialize};

/// Event metadata entered in step 2 of the wizard.
///
/// `title`, `organizer`, `date` and `location` must be non-empty before a
/// template can be generated; the rest is optional. The struct is treated as
/// immutable once a generation run has started.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDetails {
    pub title: String,
    pub organizer: String,
    pub date: String,
    #[serde(default)]
    pub time: String,
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dresscode: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub rsvp: String,
}

impl DocumentDetails {
    /// Fields that must be present before template generation may start.
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.organizer.trim().is_empty() {
            missing.push("organizer");
        }
        if self.date.trim().is_empty() {
            missing.push("date");
        }
        if self.location.trim().is_empty() {
            missing.push("location");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required_fields().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> DocumentDetails {
        DocumentDetails {
            title: "창립 10주년 기념식".to_string(),
            organizer: "ABC재단".to_string(),
            date: "2026-09-12".to_string(),
            time: "14:00".to_string(),
            location: "서울 코엑스 그랜드볼룸".to_string(),
            description: "함께해 주신 분들을 모십니다.".to_string(),
            dresscode: String::new(),
            contact: "events@abc.or.kr".to_string(),
            rsvp: String::new(),
        }
    }

    #[test]
    fn complete_details_pass() {
        assert!(details().is_complete());
    }

    #[test]
    fn missing_fields_are_reported() {
        let mut d = details();
        d.title.clear();
        d.location = "  ".to_string();
        assert_eq!(d.missing_required_fields(), vec!["title", "location"]);
        assert!(!d.is_complete());
    }
}
