//! Fixed HTML shell for the browser preview of one recipient's invitation.
//!
//! Template sections and event fields go through HTML escaping before they
//! land in markup; the result is served as `text/html` by the preview
//! endpoint. The batch generator does not consume this shell — it draws the
//! same layout directly onto a bitmap.

use common::model::design::DesignTemplate;
use common::model::recipient::Recipient;
use common::model::template::DocumentTemplate;

use super::placeholder::{apply_escaped, html_escape};

fn paragraph(text: &str) -> String {
    text.split('\n')
        .map(|line| line.to_string())
        .collect::<Vec<_>>()
        .join("<br>")
}

/// Render the invitation preview for one recipient.
pub fn render_preview(
    template: &DocumentTemplate,
    design: &DesignTemplate,
    recipient: &Recipient,
) -> String {
    let header = paragraph(&apply_escaped(&template.header, recipient));
    let body = paragraph(&apply_escaped(&template.body, recipient));
    let footer = paragraph(&apply_escaped(&template.footer, recipient));
    let cta = paragraph(&apply_escaped(&template.cta, recipient));
    let colors = &design.colors;

    let cta_block = if template.cta.trim().is_empty() {
        String::new()
    } else {
        format!(
            r#"<div class="cta" style="background:{accent}">{cta}</div>"#,
            accent = html_escape(&colors.accent),
            cta = cta,
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
<meta charset="UTF-8">
<title>초청장 - {name}</title>
<style>
  body {{ font-family: '{body_font}', sans-serif; background: {background}; margin: 0; padding: 20px; }}
  .invitation {{ max-width: 600px; margin: 0 auto; background: #ffffff; border-radius: 12px; overflow: hidden; box-shadow: 0 8px 24px rgba(0,0,0,0.08); }}
  .header {{ background: linear-gradient(135deg, {primary} 0%, {secondary} 100%); color: #ffffff; padding: 40px 30px; text-align: center; font-family: '{heading_font}', sans-serif; font-size: 1.6rem; font-weight: 700; }}
  .content {{ padding: 32px 30px; color: {text}; line-height: 1.7; }}
  .cta {{ margin: 24px 30px; padding: 14px 18px; border-radius: 8px; text-align: center; color: #ffffff; font-weight: 600; }}
  .footer {{ padding: 24px 30px; background: #f9fafb; border-top: 1px solid #e5e7eb; color: {text}; font-size: 0.9rem; }}
</style>
</head>
<body>
  <div class="invitation">
    <div class="header">{header}</div>
    <div class="content">{body}</div>
    {cta_block}
    <div class="footer">{footer}</div>
  </div>
</body>
</html>
"#,
        name = html_escape(&recipient.name),
        body_font = html_escape(&design.fonts.body),
        heading_font = html_escape(&design.fonts.heading),
        background = html_escape(&colors.background),
        primary = html_escape(&colors.primary),
        secondary = html_escape(&colors.secondary),
        text = html_escape(&colors.text),
        header = header,
        body = body,
        footer = footer,
        cta_block = cta_block,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::design::find_design;
    use common::model::template::TemplateStyle;

    fn template() -> DocumentTemplate {
        DocumentTemplate {
            header: "행사 초청장".to_string(),
            body: "{{name}}님을 초대합니다.".to_string(),
            footer: "감사합니다.".to_string(),
            cta: "참석 여부를 알려주세요".to_string(),
            style: TemplateStyle::default(),
        }
    }

    fn recipient(name: &str) -> Recipient {
        Recipient {
            id: "r1".to_string(),
            name: name.to_string(),
            organization: String::new(),
            email: "a@b.co".to_string(),
            phone: String::new(),
            position: String::new(),
        }
    }

    #[test]
    fn preview_substitutes_and_carries_design_colors() {
        let design = find_design("formal-blue").unwrap();
        let html = render_preview(&template(), &design, &recipient("김수진"));
        assert!(html.contains("김수진님을 초대합니다."));
        assert!(html.contains("#1e40af"));
        assert!(!html.contains("{{name}}"));
    }

    #[test]
    fn recipient_markup_is_escaped() {
        let design = find_design("formal-blue").unwrap();
        let html = render_preview(&template(), &design, &recipient("<img src=x>"));
        assert!(!html.contains("<img src=x>"));
        assert!(html.contains("&lt;img src=x&gt;"));
    }
}
