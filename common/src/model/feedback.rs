use serde::{Deserialize, Serialize};

/// A user-authored change request targeting one template section.
///
/// Feedback items are append-only; they can be removed by index but never
/// edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub section: TemplateSection,
    pub instruction: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateSection {
    Header,
    Body,
    Footer,
    Cta,
    Style,
}

impl TemplateSection {
    pub fn label(&self) -> &'static str {
        match self {
            TemplateSection::Header => "header",
            TemplateSection::Body => "body",
            TemplateSection::Footer => "footer",
            TemplateSection::Cta => "cta",
            TemplateSection::Style => "style",
        }
    }
}

/// Priority tier of a feedback item. The revision pipeline always applies
/// tiers in `High`, `Medium`, `Low` order regardless of insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Fixed processing order for the revision pipeline.
    pub const ORDERED: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}
