//! The eight-step wizard as a pure state machine, independent of any
//! presentation layer. Transitions are guarded by predicates over the
//! project state (recipients present, details complete, and so on) and are
//! exercised directly by the project endpoints.

use serde::{Deserialize, Serialize};

use super::ProjectState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Recipients,
    EventDetails,
    TemplateDesign,
    DesignPreview,
    Feedback,
    Revision,
    Approval,
    Generation,
}

impl WizardStep {
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::Recipients => 1,
            WizardStep::EventDetails => 2,
            WizardStep::TemplateDesign => 3,
            WizardStep::DesignPreview => 4,
            WizardStep::Feedback => 5,
            WizardStep::Revision => 6,
            WizardStep::Approval => 7,
            WizardStep::Generation => 8,
        }
    }
}

impl Default for WizardStep {
    fn default() -> Self {
        WizardStep::Recipients
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    #[error("수신자를 먼저 추가해주세요")]
    NoRecipients,
    #[error("이벤트 정보가 완성되지 않았습니다: {0}")]
    IncompleteDetails(String),
    #[error("템플릿을 먼저 생성해주세요")]
    NoTemplate,
    #[error("템플릿을 먼저 확정해주세요")]
    NotApproved,
    #[error("이미 마지막 단계입니다")]
    AtEnd,
}

/// Compute the step after `state.current_step`, checking its guard.
///
/// Step 5 (feedback) branches: with feedback present the wizard moves to the
/// revision step, otherwise it skips straight to approval.
pub fn advance(state: &ProjectState) -> Result<WizardStep, WizardError> {
    match state.current_step {
        WizardStep::Recipients => {
            if state.recipients.is_empty() {
                Err(WizardError::NoRecipients)
            } else {
                Ok(WizardStep::EventDetails)
            }
        }
        WizardStep::EventDetails => match &state.document_details {
            None => Err(WizardError::IncompleteDetails("입력된 정보가 없습니다".into())),
            Some(details) => {
                let missing = details.missing_required_fields();
                if missing.is_empty() {
                    Ok(WizardStep::TemplateDesign)
                } else {
                    Err(WizardError::IncompleteDetails(missing.join(", ")))
                }
            }
        },
        WizardStep::TemplateDesign => {
            if state.template.is_some() {
                Ok(WizardStep::DesignPreview)
            } else {
                Err(WizardError::NoTemplate)
            }
        }
        WizardStep::DesignPreview => Ok(WizardStep::Feedback),
        WizardStep::Feedback => {
            if state.feedback.is_empty() {
                Ok(WizardStep::Approval)
            } else {
                Ok(WizardStep::Revision)
            }
        }
        WizardStep::Revision => Ok(WizardStep::Approval),
        WizardStep::Approval => {
            if state.approved {
                Ok(WizardStep::Generation)
            } else {
                Err(WizardError::NotApproved)
            }
        }
        WizardStep::Generation => Err(WizardError::AtEnd),
    }
}

/// Step back one step; stays on step 1 when already there.
pub fn back(current: WizardStep) -> WizardStep {
    match current {
        WizardStep::Recipients => WizardStep::Recipients,
        WizardStep::EventDetails => WizardStep::Recipients,
        WizardStep::TemplateDesign => WizardStep::EventDetails,
        WizardStep::DesignPreview => WizardStep::TemplateDesign,
        WizardStep::Feedback => WizardStep::DesignPreview,
        WizardStep::Revision => WizardStep::Feedback,
        WizardStep::Approval => WizardStep::Feedback,
        WizardStep::Generation => WizardStep::Approval,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::document::DocumentDetails;
    use common::model::recipient::Recipient;
    use common::model::template::{DocumentTemplate, TemplateStyle};

    fn recipient() -> Recipient {
        Recipient {
            id: "r1".to_string(),
            name: "김수진".to_string(),
            organization: "ABC".to_string(),
            email: "kim@example.com".to_string(),
            phone: String::new(),
            position: String::new(),
        }
    }

    fn complete_details() -> DocumentDetails {
        DocumentDetails {
            title: "t".into(),
            organizer: "o".into(),
            date: "2026-09-12".into(),
            time: String::new(),
            location: "l".into(),
            description: String::new(),
            dresscode: String::new(),
            contact: String::new(),
            rsvp: String::new(),
        }
    }

    fn template() -> DocumentTemplate {
        DocumentTemplate {
            header: "h".into(),
            body: "b".into(),
            footer: "f".into(),
            cta: String::new(),
            style: TemplateStyle::default(),
        }
    }

    #[test]
    fn step1_requires_recipients() {
        let mut state = ProjectState::default();
        assert_eq!(advance(&state), Err(WizardError::NoRecipients));
        state.recipients.push(recipient());
        assert_eq!(advance(&state), Ok(WizardStep::EventDetails));
    }

    #[test]
    fn step2_requires_complete_details() {
        let mut state = ProjectState {
            current_step: WizardStep::EventDetails,
            ..Default::default()
        };
        assert!(matches!(
            advance(&state),
            Err(WizardError::IncompleteDetails(_))
        ));
        let mut details = complete_details();
        details.location.clear();
        state.document_details = Some(details);
        assert!(matches!(
            advance(&state),
            Err(WizardError::IncompleteDetails(_))
        ));
        state.document_details = Some(complete_details());
        assert_eq!(advance(&state), Ok(WizardStep::TemplateDesign));
    }

    #[test]
    fn feedback_step_branches_on_feedback() {
        let mut state = ProjectState {
            current_step: WizardStep::Feedback,
            template: Some(template()),
            ..Default::default()
        };
        assert_eq!(advance(&state), Ok(WizardStep::Approval));
        state.feedback.push(common::model::feedback::FeedbackItem {
            section: common::model::feedback::TemplateSection::Body,
            instruction: "더 정중하게".into(),
            priority: common::model::feedback::Priority::High,
        });
        assert_eq!(advance(&state), Ok(WizardStep::Revision));
    }

    #[test]
    fn approval_gates_generation() {
        let mut state = ProjectState {
            current_step: WizardStep::Approval,
            template: Some(template()),
            ..Default::default()
        };
        assert_eq!(advance(&state), Err(WizardError::NotApproved));
        state.approved = true;
        assert_eq!(advance(&state), Ok(WizardStep::Generation));
    }

    #[test]
    fn steps_are_numbered_one_through_eight() {
        let steps = [
            WizardStep::Recipients,
            WizardStep::EventDetails,
            WizardStep::TemplateDesign,
            WizardStep::DesignPreview,
            WizardStep::Feedback,
            WizardStep::Revision,
            WizardStep::Approval,
            WizardStep::Generation,
        ];
        let numbers: Vec<u8> = steps.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn back_floors_at_step_one() {
        assert_eq!(back(WizardStep::Recipients), WizardStep::Recipients);
        assert_eq!(back(WizardStep::Generation), WizardStep::Approval);
        assert_eq!(back(WizardStep::Approval), WizardStep::Feedback);
    }
}
