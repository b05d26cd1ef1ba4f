//! The synchronous batch worker, run via `spawn_blocking`.
//!
//! Recipients are processed strictly in list order. One failed recipient is
//! recorded and skipped; the run keeps going. Cancellation is checked
//! before each recipient, so at most the in-flight document completes after
//! a cancel request.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use common::jobs::{JobPhase, JobProgress};
use common::model::design::DesignTemplate;
use common::model::generated::{FileFormat, GeneratedFile};
use common::model::recipient::Recipient;
use common::model::template::DocumentTemplate;
use uuid::Uuid;

use crate::services::templates::placeholder;
use super::render::{self, RenderDoc, Rasterizer};
use super::pdf;

/// Everything the worker needs, snapshotted before the job starts.
pub struct BatchInput {
    pub recipients: Vec<Recipient>,
    pub template: DocumentTemplate,
    pub design: DesignTemplate,
    pub format: FileFormat,
}

#[derive(Clone)]
pub struct RenderSettings {
    pub fonts_dir: String,
    pub jpeg_quality: u8,
    /// Pause between recipients to bound peak resource usage.
    pub inter_item_delay_ms: u64,
}

pub struct BatchOutcome {
    pub files: Vec<GeneratedFile>,
    pub errors: Vec<String>,
    pub cancelled: bool,
}

fn render_one(
    rasterizer: &dyn Rasterizer,
    input: &BatchInput,
    settings: &RenderSettings,
    recipient: &Recipient,
) -> Result<GeneratedFile, String> {
    // Raw substitution: the output is drawn as text, never parsed as markup.
    let doc = RenderDoc {
        header: placeholder::apply(&input.template.header, recipient),
        body: placeholder::apply(&input.template.body, recipient),
        footer: placeholder::apply(&input.template.footer, recipient),
        cta: placeholder::apply(&input.template.cta, recipient),
        design: input.design.clone(),
    };

    let bitmap = rasterizer.render(&doc).map_err(|e| e.to_string())?;
    let bytes = match input.format {
        FileFormat::Pdf => {
            pdf::bitmap_to_pdf(&bitmap, &settings.fonts_dir).map_err(|e| e.to_string())?
        }
        FileFormat::Png => render::encode_png(&bitmap).map_err(|e| e.to_string())?,
        FileFormat::Jpg => {
            render::encode_jpeg(&bitmap, settings.jpeg_quality).map_err(|e| e.to_string())?
        }
    };

    Ok(GeneratedFile {
        id: Uuid::new_v4().to_string(),
        recipient_id: recipient.id.clone(),
        recipient_name: recipient.name.clone(),
        file_type: input.format,
        file_name: format!("{}_초청장.{}", recipient.name, input.format.extension()),
        size: bytes.len(),
        bytes,
        created_at: chrono::Utc::now(),
    })
}

/// Generate one document per recipient, reporting progress after each unit.
pub fn generate_blocking(
    rasterizer: &dyn Rasterizer,
    input: &BatchInput,
    settings: &RenderSettings,
    cancel: &AtomicBool,
    mut report: impl FnMut(JobProgress),
) -> BatchOutcome {
    let total = input.recipients.len();
    let mut files = Vec::new();
    let mut errors: Vec<String> = Vec::new();
    let mut cancelled = false;
    let mut processed = 0usize;

    report(JobProgress {
        total,
        completed: 0,
        current: String::new(),
        phase: JobPhase::Preparing,
        errors: Vec::new(),
    });

    for (i, recipient) in input.recipients.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            cancelled = true;
            break;
        }

        report(JobProgress {
            total,
            completed: i,
            current: recipient.name.clone(),
            phase: JobPhase::Generating,
            errors: errors.clone(),
        });

        match render_one(rasterizer, input, settings, recipient) {
            Ok(file) => files.push(file),
            Err(e) => {
                log::warn!("generation failed for {}: {e}", recipient.name);
                errors.push(format!("{}: {e}", recipient.name));
            }
        }
        processed = i + 1;

        if settings.inter_item_delay_ms > 0 && i + 1 < total {
            thread::sleep(Duration::from_millis(settings.inter_item_delay_ms));
        }
    }

    let phase = if cancelled {
        JobPhase::Cancelled
    } else if errors.is_empty() {
        JobPhase::Completed
    } else {
        JobPhase::Error
    };
    report(JobProgress {
        total,
        completed: processed,
        current: String::new(),
        phase,
        errors: errors.clone(),
    });

    BatchOutcome {
        files,
        errors,
        cancelled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::generation::render::RenderError;
    use common::model::design::builtin_designs;
    use image::{Rgba, RgbaImage};
    use std::sync::atomic::AtomicBool;

    /// Renders a 2x2 bitmap, failing for recipients whose substituted
    /// header contains the poison marker.
    struct MockRasterizer;

    impl Rasterizer for MockRasterizer {
        fn render(&self, doc: &RenderDoc) -> Result<RgbaImage, RenderError> {
            if doc.header.contains("실패") {
                return Err(RenderError::Render("mock failure".to_string()));
            }
            Ok(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255])))
        }
    }

    fn recipient(name: &str) -> Recipient {
        Recipient {
            id: format!("id-{name}"),
            name: name.to_string(),
            organization: String::new(),
            email: format!("{name}@example.com"),
            phone: String::new(),
            position: String::new(),
        }
    }

    fn input(names: &[&str]) -> BatchInput {
        BatchInput {
            recipients: names.iter().map(|n| recipient(n)).collect(),
            template: DocumentTemplate {
                header: "{{name}} 귀하".to_string(),
                body: "{{name}}님을 초대합니다".to_string(),
                footer: "문의: 행사팀".to_string(),
                cta: String::new(),
                style: Default::default(),
            },
            design: builtin_designs().remove(0),
            format: FileFormat::Png,
        }
    }

    fn settings() -> RenderSettings {
        RenderSettings {
            fonts_dir: "./fonts".to_string(),
            jpeg_quality: 90,
            inter_item_delay_ms: 0,
        }
    }

    #[test]
    fn successful_run_yields_one_file_per_recipient() {
        let cancel = AtomicBool::new(false);
        let mut phases = Vec::new();
        let outcome = generate_blocking(
            &MockRasterizer,
            &input(&["김철수", "이영희"]),
            &settings(),
            &cancel,
            |p| phases.push(p.phase),
        );

        assert!(outcome.errors.is_empty());
        assert!(!outcome.cancelled);
        assert_eq!(outcome.files.len(), 2);
        assert_eq!(outcome.files[0].file_name, "김철수_초청장.png");
        assert_eq!(outcome.files[1].file_name, "이영희_초청장.png");
        assert_eq!(phases.first(), Some(&JobPhase::Preparing));
        assert_eq!(*phases.last().unwrap(), JobPhase::Completed);
    }

    #[test]
    fn one_failure_does_not_stop_the_run() {
        let cancel = AtomicBool::new(false);
        let outcome = generate_blocking(
            &MockRasterizer,
            &input(&["김철수", "이영희", "실패자", "박민수", "정다은"]),
            &settings(),
            &cancel,
            |_| {},
        );

        assert_eq!(outcome.files.len(), 4);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("실패자: "));
        // Order of the surviving files matches the recipient list.
        let names: Vec<_> = outcome
            .files
            .iter()
            .map(|f| f.recipient_name.as_str())
            .collect();
        assert_eq!(names, ["김철수", "이영희", "박민수", "정다은"]);
    }

    #[test]
    fn error_run_ends_in_error_phase() {
        let cancel = AtomicBool::new(false);
        let mut last_phase = JobPhase::Preparing;
        let outcome = generate_blocking(
            &MockRasterizer,
            &input(&["실패자"]),
            &settings(),
            &cancel,
            |p| last_phase = p.phase,
        );
        assert!(outcome.files.is_empty());
        assert_eq!(last_phase, JobPhase::Error);
    }

    #[test]
    fn cancellation_stops_before_the_next_recipient() {
        let cancel = AtomicBool::new(true);
        let mut last_phase = JobPhase::Preparing;
        let outcome = generate_blocking(
            &MockRasterizer,
            &input(&["김철수", "이영희"]),
            &settings(),
            &cancel,
            |p| last_phase = p.phase,
        );
        assert!(outcome.cancelled);
        assert!(outcome.files.is_empty());
        assert_eq!(last_phase, JobPhase::Cancelled);
    }

    #[test]
    fn placeholders_are_substituted_per_recipient() {
        struct Capture(std::sync::Mutex<Vec<String>>);
        impl Rasterizer for Capture {
            fn render(&self, doc: &RenderDoc) -> Result<RgbaImage, RenderError> {
                self.0.lock().unwrap().push(doc.body.clone());
                Ok(RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255])))
            }
        }

        let capture = Capture(std::sync::Mutex::new(Vec::new()));
        let cancel = AtomicBool::new(false);
        generate_blocking(&capture, &input(&["김철수"]), &settings(), &cancel, |_| {});
        assert_eq!(capture.0.lock().unwrap()[0], "김철수님을 초대합니다");
    }
}
