use serde::{Deserialize, Serialize};

/// Visual design applied uniformly across all recipients' documents:
/// a color palette, a font pairing and a layout kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignTemplate {
    pub id: String,
    pub name: String,
    pub category: DesignCategory,
    pub colors: DesignColors,
    pub fonts: DesignFonts,
    pub layout: DesignLayout,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesignCategory {
    Formal,
    Modern,
    Elegant,
    Casual,
}

/// Hex color strings, `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignColors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub text: String,
    pub background: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignFonts {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesignLayout {
    Classic,
    Modern,
    Minimal,
    Decorative,
}

fn design(
    id: &str,
    name: &str,
    category: DesignCategory,
    colors: [&str; 5],
    heading: &str,
    body: &str,
    layout: DesignLayout,
    description: &str,
) -> DesignTemplate {
    DesignTemplate {
        id: id.to_string(),
        name: name.to_string(),
        category,
        colors: DesignColors {
            primary: colors[0].to_string(),
            secondary: colors[1].to_string(),
            accent: colors[2].to_string(),
            text: colors[3].to_string(),
            background: colors[4].to_string(),
        },
        fonts: DesignFonts {
            heading: heading.to_string(),
            body: body.to_string(),
        },
        layout,
        description: description.to_string(),
    }
}

/// The built-in design gallery shown in step 3 of the wizard.
pub fn builtin_designs() -> Vec<DesignTemplate> {
    vec![
        design(
            "formal-blue",
            "공식 블루",
            DesignCategory::Formal,
            ["#1e40af", "#3b82f6", "#60a5fa", "#1f2937", "#ffffff"],
            "Noto Sans KR",
            "Noto Sans KR",
            DesignLayout::Classic,
            "정중하고 공식적인 분위기의 블루 계열 템플릿",
        ),
        design(
            "elegant-gold",
            "엘레간트 골드",
            DesignCategory::Elegant,
            ["#d97706", "#f59e0b", "#fbbf24", "#374151", "#fffbeb"],
            "Playfair Display",
            "Noto Sans KR",
            DesignLayout::Decorative,
            "고급스럽고 우아한 골드 계열 템플릿",
        ),
        design(
            "modern-green",
            "모던 그린",
            DesignCategory::Modern,
            ["#059669", "#10b981", "#34d399", "#111827", "#f0fdf4"],
            "Inter",
            "Inter",
            DesignLayout::Modern,
            "깔끔하고 현대적인 그린 계열 템플릿",
        ),
        design(
            "minimal-gray",
            "미니멀 그레이",
            DesignCategory::Modern,
            ["#374151", "#6b7280", "#9ca3af", "#111827", "#ffffff"],
            "Inter",
            "Inter",
            DesignLayout::Minimal,
            "심플하고 깔끔한 그레이 계열 템플릿",
        ),
        design(
            "warm-orange",
            "웜 오렌지",
            DesignCategory::Casual,
            ["#ea580c", "#fb923c", "#fdba74", "#1f2937", "#fff7ed"],
            "Poppins",
            "Noto Sans KR",
            DesignLayout::Modern,
            "따뜻하고 친근한 오렌지 계열 템플릿",
        ),
        design(
            "royal-purple",
            "로얄 퍼플",
            DesignCategory::Elegant,
            ["#7c3aed", "#8b5cf6", "#a78bfa", "#1f2937", "#faf5ff"],
            "Playfair Display",
            "Noto Sans KR",
            DesignLayout::Decorative,
            "품격 있는 퍼플 계열 템플릿",
        ),
    ]
}

/// Look up a gallery design by id.
pub fn find_design(id: &str) -> Option<DesignTemplate> {
    builtin_designs().into_iter().find(|d| d.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gallery_ids_are_unique() {
        let designs = builtin_designs();
        let mut ids: Vec<_> = designs.iter().map(|d| d.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), designs.len());
    }

    #[test]
    fn lookup_by_id() {
        assert!(find_design("formal-blue").is_some());
        assert!(find_design("no-such-design").is_none());
    }
}
