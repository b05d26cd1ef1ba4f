use serde::{Deserialize, Serialize};

/// The invitation copy that gets instantiated once per recipient.
///
/// All four text sections may contain `{{...}}` placeholder tokens. The
/// revision pipeline replaces sections wholesale; it never patches inside a
/// string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTemplate {
    pub header: String,
    pub body: String,
    pub footer: String,
    #[serde(default)]
    pub cta: String,
    pub style: TemplateStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateStyle {
    pub tone: String,
    pub color: String,
    pub layout: String,
}

impl Default for TemplateStyle {
    fn default() -> Self {
        TemplateStyle {
            tone: "formal".to_string(),
            color: "default".to_string(),
            layout: "classic".to_string(),
        }
    }
}

/// Partial template as returned by the text-generation service.
///
/// Every field is optional so that a response which omits a section leaves
/// the current value untouched (shallow merge).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplatePatch {
    pub header: Option<String>,
    pub body: Option<String>,
    pub footer: Option<String>,
    pub cta: Option<String>,
    pub style: Option<TemplateStyle>,
}

impl DocumentTemplate {
    /// Overwrite sections present in `patch`, keep the rest.
    pub fn merge(&mut self, patch: TemplatePatch) {
        if let Some(header) = patch.header {
            self.header = header;
        }
        if let Some(body) = patch.body {
            self.body = body;
        }
        if let Some(footer) = patch.footer {
            self.footer = footer;
        }
        if let Some(cta) = patch.cta {
            self.cta = cta;
        }
        if let Some(style) = patch.style {
            self.style = style;
        }
    }
}
