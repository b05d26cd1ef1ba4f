//! Validation of parsed recipients: partition into importable and rejected
//! rows with per-row reasons. Large imports are judged in parallel; the
//! output partition preserves input order.

use rayon::prelude::*;
use regex::Regex;
use std::sync::OnceLock;

use common::model::recipient::{InvalidRecipient, Recipient, ValidationReport};

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

fn check(recipient: &Recipient) -> Vec<String> {
    let mut errors = Vec::new();
    if recipient.name.trim().is_empty() {
        errors.push("이름이 필요합니다".to_string());
    }
    if recipient.email.trim().is_empty() {
        errors.push("이메일이 필요합니다".to_string());
    } else if !is_valid_email(&recipient.email) {
        errors.push("올바른 이메일 형식이 아닙니다".to_string());
    }
    errors
}

/// Partition `recipients` into valid and invalid. Exhaustive and disjoint:
/// `valid.len() + invalid.len() == recipients.len()` always holds.
pub fn validate_recipients(recipients: &[Recipient]) -> ValidationReport {
    let judged: Vec<(Recipient, Vec<String>)> = recipients
        .par_iter()
        .map(|r| (r.clone(), check(r)))
        .collect();

    let mut report = ValidationReport::default();
    for (recipient, errors) in judged {
        if errors.is_empty() {
            report.valid.push(recipient);
        } else {
            report.invalid.push(InvalidRecipient { recipient, errors });
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient(name: &str, email: &str) -> Recipient {
        Recipient {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            organization: String::new(),
            email: email.to_string(),
            phone: String::new(),
            position: String::new(),
        }
    }

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("kim@example.com"));
        assert!(!is_valid_email("kim@example"));
        assert!(!is_valid_email("kim example@x.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn partition_is_exhaustive_and_disjoint() {
        let input = vec![
            recipient("Kim", "kim@example.com"),
            recipient("", "lee@example.com"),
            recipient("Park", "not-an-email"),
            recipient("Choi", ""),
            recipient("정다은", "jung@example.co.kr"),
        ];
        let report = validate_recipients(&input);
        assert_eq!(report.valid.len() + report.invalid.len(), input.len());
        assert_eq!(report.valid.len(), 2);
        assert_eq!(report.invalid.len(), 3);
    }

    #[test]
    fn invalid_rows_carry_reasons() {
        let report = validate_recipients(&[recipient("", "bad")]);
        assert_eq!(report.invalid.len(), 1);
        let errors = &report.invalid[0].errors;
        assert!(errors.iter().any(|e| e.contains("이름")));
        assert!(errors.iter().any(|e| e.contains("이메일")));
    }

    #[test]
    fn order_is_preserved_within_partitions() {
        let input = vec![
            recipient("A", "a@example.com"),
            recipient("B", "bad"),
            recipient("C", "c@example.com"),
            recipient("D", "bad"),
        ];
        let report = validate_recipients(&input);
        let valid_names: Vec<_> = report.valid.iter().map(|r| r.name.as_str()).collect();
        let invalid_names: Vec<_> = report
            .invalid
            .iter()
            .map(|r| r.recipient.name.as_str())
            .collect();
        assert_eq!(valid_names, ["A", "C"]);
        assert_eq!(invalid_names, ["B", "D"]);
    }

    #[test]
    fn empty_input_gives_empty_report() {
        let report = validate_recipients(&[]);
        assert!(report.valid.is_empty());
        assert!(report.invalid.is_empty());
    }
}
