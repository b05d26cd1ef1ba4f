//! Feedback-driven revision pipeline.
//!
//! Feedback items are grouped into priority tiers and applied to the
//! template tier by tier (high, then medium, then low), followed by a
//! final review pass over the whole document. Each step sends the current
//! template and the tier's feedback to the text-generation service and
//! merges whatever JSON patch comes back. A response that carries no
//! parseable patch leaves the template untouched but still completes the
//! step, so one chatty model answer cannot sink the whole run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use common::model::document::DocumentDetails;
use common::model::feedback::{FeedbackItem, Priority, TemplateSection};
use common::model::template::{DocumentTemplate, TemplatePatch};
use common::jobs::{RevisionStepReport, RevisionStepState};

use super::client::{TextGenError, TextGenerator};

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_MS: u64 = 500;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("수정 작업이 취소되었습니다")]
    Cancelled { reports: Vec<RevisionStepReport> },

    #[error("'{step}' 단계 실패: {source}")]
    StepFailed {
        step: String,
        reports: Vec<RevisionStepReport>,
        source: TextGenError,
    },
}

/// One planned unit of work: a priority tier, or the final review pass
/// (which carries no feedback items).
pub struct RevisionStep {
    pub id: String,
    pub title: String,
    pub description: String,
    pub items: Vec<FeedbackItem>,
}

#[derive(Debug)]
pub struct PipelineOutcome {
    pub template: DocumentTemplate,
    pub reports: Vec<RevisionStepReport>,
}

fn tier_title(priority: Priority) -> (&'static str, &'static str, &'static str) {
    match priority {
        Priority::High => (
            "high-priority",
            "높은 우선순위 반영",
            "높은 우선순위 피드백을 템플릿에 반영합니다",
        ),
        Priority::Medium => (
            "medium-priority",
            "중간 우선순위 반영",
            "중간 우선순위 피드백을 템플릿에 반영합니다",
        ),
        Priority::Low => (
            "low-priority",
            "낮은 우선순위 반영",
            "낮은 우선순위 피드백을 템플릿에 반영합니다",
        ),
    }
}

/// Group feedback into priority tiers, skip empty tiers, and append the
/// final review step. Relative order of items within a tier is preserved.
pub fn plan_steps(feedback: &[FeedbackItem]) -> Vec<RevisionStep> {
    let mut steps = Vec::new();

    for priority in Priority::ORDERED {
        let items: Vec<FeedbackItem> = feedback
            .iter()
            .filter(|f| f.priority == priority)
            .cloned()
            .collect();
        if items.is_empty() {
            continue;
        }
        let (id, title, description) = tier_title(priority);
        steps.push(RevisionStep {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            items,
        });
    }

    steps.push(RevisionStep {
        id: "final-review".to_string(),
        title: "최종 검토".to_string(),
        description: "전체 문서의 일관성과 완성도를 점검합니다".to_string(),
        items: Vec::new(),
    });

    steps
}

const SECTION_ORDER: [TemplateSection; 5] = [
    TemplateSection::Header,
    TemplateSection::Body,
    TemplateSection::Footer,
    TemplateSection::Cta,
    TemplateSection::Style,
];

fn template_json(template: &DocumentTemplate) -> String {
    serde_json::to_string_pretty(template).unwrap_or_default()
}

fn feedback_block(items: &[FeedbackItem]) -> String {
    let mut block = String::new();
    for section in SECTION_ORDER {
        for item in items.iter().filter(|f| f.section == section) {
            block.push_str(&format!("- [{}] {}\n", section.label(), item.instruction));
        }
    }
    block
}

/// Prompt for one priority tier. Mirrors the document context and insists
/// on keeping the `{{...}}` placeholders intact and answering with JSON only.
fn apply_prompt(
    template: &DocumentTemplate,
    items: &[FeedbackItem],
    details: &DocumentDetails,
) -> String {
    format!(
        "당신은 행사 초청장 문구를 다듬는 전문 편집자입니다.\n\
         \n\
         행사 정보:\n\
         - 행사명: {}\n\
         - 주최: {}\n\
         - 일시: {}\n\
         - 장소: {}\n\
         \n\
         현재 초청장 템플릿(JSON):\n{}\n\
         \n\
         다음 피드백을 템플릿에 반영해 주세요:\n{}\n\
         규칙:\n\
         1. {{{{name}}}}, {{{{organization}}}}, {{{{email}}}}, {{{{phone}}}}, {{{{position}}}} 자리표시자는 절대 수정하거나 삭제하지 마세요.\n\
         2. 변경이 필요한 필드만 포함한 JSON 객체 하나만 출력하세요. 설명 문장은 쓰지 마세요.\n\
         3. 사용할 수 있는 필드는 header, body, footer, cta, style 입니다.",
        details.title, details.organizer, details.date, details.location,
        template_json(template),
        feedback_block(items),
    )
}

/// Prompt for the final review pass over the fully patched template.
fn finalize_prompt(template: &DocumentTemplate) -> String {
    format!(
        "다음 초청장 템플릿(JSON)의 전체적인 일관성, 맞춤법, 어조를 최종 점검해 주세요.\n{}\n\
         \n\
         규칙:\n\
         1. {{{{name}}}} 등 자리표시자는 그대로 유지하세요.\n\
         2. 수정이 필요하면 변경할 필드만 담은 JSON 객체 하나만 출력하고, 수정할 것이 없으면 빈 객체 {{}} 를 출력하세요.",
        template_json(template),
    )
}

/// Pull a [`TemplatePatch`] out of a model response, tolerating markdown
/// code fences around the JSON. Anything that does not deserialize into a
/// patch yields `None`.
pub fn extract_json(text: &str) -> Option<TemplatePatch> {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    if let Some(rest) = body.strip_suffix("```") {
        body = rest;
    }

    serde_json::from_str(body.trim()).ok()
}

async fn complete_with_backoff(
    generator: &dyn TextGenerator,
    prompt: &str,
) -> Result<String, TextGenError> {
    let mut attempt = 0;
    loop {
        match generator.complete(prompt).await {
            Ok(text) => return Ok(text),
            Err(e) if e.is_retryable() && attempt + 1 < MAX_ATTEMPTS => {
                let delay = BACKOFF_BASE_MS * 2u64.pow(attempt);
                log::warn!("text generation attempt {} failed, retrying in {}ms: {}", attempt + 1, delay, e);
                tokio::time::sleep(Duration::from_millis(delay)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Run the pipeline to completion. `on_progress` is invoked before each
/// step with `(step_index, total_steps, step_title)`; the cancellation flag
/// is checked between steps, never mid-request.
pub async fn run_pipeline(
    generator: &dyn TextGenerator,
    mut template: DocumentTemplate,
    feedback: &[FeedbackItem],
    details: &DocumentDetails,
    cancel: &AtomicBool,
    mut on_progress: impl FnMut(usize, usize, &str),
) -> Result<PipelineOutcome, PipelineError> {
    let steps = plan_steps(feedback);
    let total = steps.len();
    let mut reports: Vec<RevisionStepReport> = steps
        .iter()
        .map(|s| RevisionStepReport {
            id: s.id.clone(),
            title: s.title.clone(),
            description: s.description.clone(),
            state: RevisionStepState::Pending,
            result: None,
        })
        .collect();

    for (index, step) in steps.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            return Err(PipelineError::Cancelled { reports });
        }

        reports[index].state = RevisionStepState::Processing;
        on_progress(index, total, &step.title);

        let prompt = if step.items.is_empty() {
            finalize_prompt(&template)
        } else {
            apply_prompt(&template, &step.items, details)
        };

        let text = match complete_with_backoff(generator, &prompt).await {
            Ok(text) => text,
            Err(e) => {
                reports[index].state = RevisionStepState::Error;
                reports[index].result = Some(e.to_string());
                return Err(PipelineError::StepFailed {
                    step: step.title.clone(),
                    reports,
                    source: e,
                });
            }
        };

        match extract_json(&text) {
            Some(patch) => {
                template.merge(patch);
                reports[index].result = Some("변경 사항을 반영했습니다".to_string());
            }
            None => {
                log::warn!("step '{}': response carried no JSON patch, keeping template as-is", step.title);
                reports[index].result = Some("변경 사항 없음".to_string());
            }
        }
        reports[index].state = RevisionStepState::Completed;
    }

    Ok(PipelineOutcome { template, reports })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedGenerator {
        responses: Mutex<Vec<Result<String, TextGenError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<Result<String, TextGenError>>) -> Self {
            ScriptedGenerator {
                responses: Mutex::new(responses),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn complete(&self, prompt: &str) -> Result<String, TextGenError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Ok("{}".to_string())
            } else {
                responses.remove(0)
            }
        }
    }

    fn item(section: TemplateSection, priority: Priority, instruction: &str) -> FeedbackItem {
        FeedbackItem {
            section,
            priority,
            instruction: instruction.to_string(),
        }
    }

    fn details() -> DocumentDetails {
        DocumentDetails {
            title: "개발자 컨퍼런스".to_string(),
            organizer: "테크협회".to_string(),
            date: "2025-03-01".to_string(),
            location: "코엑스".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn steps_follow_priority_order_and_end_with_review() {
        let feedback = vec![
            item(TemplateSection::Body, Priority::Low, "짧게"),
            item(TemplateSection::Header, Priority::High, "제목 강조"),
            item(TemplateSection::Footer, Priority::Medium, "연락처 추가"),
            item(TemplateSection::Cta, Priority::High, "버튼 문구"),
        ];
        let steps = plan_steps(&feedback);
        let ids: Vec<&str> = steps.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["high-priority", "medium-priority", "low-priority", "final-review"]
        );
        assert_eq!(steps[0].items.len(), 2);
        assert!(steps[3].items.is_empty());
    }

    #[test]
    fn empty_tiers_are_skipped() {
        let feedback = vec![item(TemplateSection::Body, Priority::Medium, "어조")];
        let steps = plan_steps(&feedback);
        let ids: Vec<&str> = steps.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["medium-priority", "final-review"]);
    }

    #[test]
    fn no_feedback_still_plans_final_review() {
        let steps = plan_steps(&[]);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].id, "final-review");
    }

    #[test]
    fn extract_json_handles_code_fences() {
        let patch = extract_json("```json\n{\"body\": \"새 본문\"}\n```").unwrap();
        assert_eq!(patch.body.as_deref(), Some("새 본문"));

        let patch = extract_json("  {\"header\": \"제목\"}  ").unwrap();
        assert_eq!(patch.header.as_deref(), Some("제목"));
    }

    #[test]
    fn extract_json_rejects_prose() {
        assert!(extract_json("네, 다음과 같이 수정하면 좋겠습니다.").is_none());
        assert!(extract_json("").is_none());
    }

    #[tokio::test]
    async fn later_tiers_overwrite_earlier_patches() {
        let feedback = vec![
            item(TemplateSection::Body, Priority::High, "본문 수정"),
            item(TemplateSection::Body, Priority::Low, "본문 다시"),
        ];
        let generator = ScriptedGenerator::new(vec![
            Ok("{\"body\": \"높은 우선순위 본문\"}".to_string()),
            Ok("{\"body\": \"낮은 우선순위 본문\"}".to_string()),
            Ok("{}".to_string()),
        ]);
        let cancel = AtomicBool::new(false);

        let outcome = run_pipeline(
            &generator,
            DocumentTemplate::default(),
            &feedback,
            &details(),
            &cancel,
            |_, _, _| {},
        )
        .await
        .unwrap();

        assert_eq!(outcome.template.body, "낮은 우선순위 본문");
        assert_eq!(outcome.reports.len(), 3);
        assert!(outcome
            .reports
            .iter()
            .all(|r| r.state == RevisionStepState::Completed));
    }

    #[tokio::test]
    async fn prose_response_completes_step_without_changes() {
        let feedback = vec![item(TemplateSection::Header, Priority::High, "제목")];
        let generator = ScriptedGenerator::new(vec![
            Ok("죄송하지만 JSON 대신 설명을 드리겠습니다.".to_string()),
            Ok("{}".to_string()),
        ]);
        let cancel = AtomicBool::new(false);
        let original = DocumentTemplate {
            header: "원래 제목".to_string(),
            ..Default::default()
        };

        let outcome = run_pipeline(
            &generator,
            original.clone(),
            &feedback,
            &details(),
            &cancel,
            |_, _, _| {},
        )
        .await
        .unwrap();

        assert_eq!(outcome.template.header, original.header);
        assert_eq!(outcome.reports[0].state, RevisionStepState::Completed);
    }

    #[tokio::test]
    async fn non_retryable_error_fails_the_step() {
        let feedback = vec![item(TemplateSection::Body, Priority::High, "수정")];
        let generator = ScriptedGenerator::new(vec![Err(TextGenError::Api {
            status: 401,
            body: "unauthorized".to_string(),
        })]);
        let cancel = AtomicBool::new(false);

        let err = run_pipeline(
            &generator,
            DocumentTemplate::default(),
            &feedback,
            &details(),
            &cancel,
            |_, _, _| {},
        )
        .await
        .unwrap_err();

        match err {
            PipelineError::StepFailed { reports, .. } => {
                assert_eq!(reports[0].state, RevisionStepState::Error);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Non-retryable failures must not be retried.
        assert_eq!(generator.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cancellation_stops_before_next_step() {
        let feedback = vec![item(TemplateSection::Body, Priority::High, "수정")];
        let generator = ScriptedGenerator::new(vec![]);
        let cancel = AtomicBool::new(true);

        let err = run_pipeline(
            &generator,
            DocumentTemplate::default(),
            &feedback,
            &details(),
            &cancel,
            |_, _, _| {},
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PipelineError::Cancelled { .. }));
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn prompts_carry_placeholders_rule() {
        let feedback = vec![item(TemplateSection::Body, Priority::High, "수정")];
        let generator = ScriptedGenerator::new(vec![Ok("{}".to_string()), Ok("{}".to_string())]);
        let cancel = AtomicBool::new(false);

        run_pipeline(
            &generator,
            DocumentTemplate::default(),
            &feedback,
            &details(),
            &cancel,
            |_, _, _| {},
        )
        .await
        .unwrap();

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("{{name}}"));
        assert!(prompts[0].contains("수정"));
    }
}
