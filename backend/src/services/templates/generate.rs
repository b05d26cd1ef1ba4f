//! Deterministic initial template generation from event details and a
//! gallery design. Produces the skeleton the feedback pipeline will refine.

use common::model::design::{DesignCategory, DesignLayout, DesignTemplate};
use common::model::document::DocumentDetails;
use common::model::template::{DocumentTemplate, TemplateStyle};

fn tone_for(category: DesignCategory) -> &'static str {
    match category {
        DesignCategory::Formal => "formal",
        DesignCategory::Modern => "modern",
        DesignCategory::Elegant => "elegant",
        DesignCategory::Casual => "casual",
    }
}

fn layout_label(layout: DesignLayout) -> &'static str {
    match layout {
        DesignLayout::Classic => "classic",
        DesignLayout::Modern => "modern",
        DesignLayout::Minimal => "minimal",
        DesignLayout::Decorative => "decorative",
    }
}

/// Build the initial invitation copy for the chosen design.
pub fn initial_template(details: &DocumentDetails, design: &DesignTemplate) -> DocumentTemplate {
    let location = if details.location.trim().is_empty() {
        "추후 안내"
    } else {
        details.location.as_str()
    };
    let contact = if details.contact.trim().is_empty() {
        details.organizer.as_str()
    } else {
        details.contact.as_str()
    };

    let mut body = format!("안녕하세요. {{{{name}}}}님,\n\n{}\n\n", details.description);
    body.push_str(&format!("일시: {} {}\n", details.date, details.time));
    body.push_str(&format!("장소: {}\n", location));
    body.push_str(&format!("주최: {}", details.organizer));

    DocumentTemplate {
        header: format!("{} 초청장", details.title),
        body,
        footer: format!(
            "문의사항이 있으시면 {}로 연락해주세요.\n\n감사합니다.",
            contact
        ),
        cta: "참석 의사를 알려주세요".to_string(),
        style: TemplateStyle {
            tone: tone_for(design.category).to_string(),
            color: design.colors.primary.clone(),
            layout: layout_label(design.layout).to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::design::find_design;

    fn details() -> DocumentDetails {
        DocumentDetails {
            title: "창립 기념식".to_string(),
            organizer: "ABC재단".to_string(),
            date: "2026-09-12".to_string(),
            time: "14:00".to_string(),
            location: "코엑스".to_string(),
            description: "귀하를 초대합니다.".to_string(),
            dresscode: String::new(),
            contact: "events@abc.or.kr".to_string(),
            rsvp: String::new(),
        }
    }

    #[test]
    fn template_carries_event_fields_and_name_token() {
        let design = find_design("formal-blue").unwrap();
        let t = initial_template(&details(), &design);
        assert_eq!(t.header, "창립 기념식 초청장");
        assert!(t.body.contains("{{name}}"));
        assert!(t.body.contains("2026-09-12"));
        assert!(t.body.contains("코엑스"));
        assert!(t.footer.contains("events@abc.or.kr"));
        assert_eq!(t.style.color, design.colors.primary);
    }

    #[test]
    fn fallbacks_for_blank_location_and_contact() {
        let mut d = details();
        d.location = String::new();
        d.contact = String::new();
        let design = find_design("minimal-gray").unwrap();
        let t = initial_template(&d, &design);
        assert!(t.body.contains("추후 안내"));
        assert!(t.footer.contains("ABC재단"));
    }
}
