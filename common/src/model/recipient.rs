use serde::{Deserialize, Serialize};

/// A person who will receive a personalized invitation document.
///
/// Recipients are unique by `id` and are never mutated in place: an edit
/// replaces the whole record, a delete filters it out of the list.
/// `name` and `email` are mandatory and checked by the validation pass;
/// the remaining fields are optional and default to the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub organization: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub position: String,
}

/// One recipient rejected by validation, with the reasons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvalidRecipient {
    pub recipient: Recipient,
    pub errors: Vec<String>,
}

/// Result of partitioning an imported list into importable and rejected rows.
///
/// The partition is exhaustive and disjoint: `valid.len() + invalid.len()`
/// always equals the length of the input list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: Vec<Recipient>,
    pub invalid: Vec<InvalidRecipient>,
}
