//! CSV and JSON recipient import.
//!
//! The CSV importer accepts a comma-delimited file with a header row whose
//! column names come from a fixed Korean/English synonym table. Unmapped
//! columns are ignored. Rows lacking *both* name and email are dropped
//! silently at parse time; rows with at least one of the two are kept and
//! judged later by the validation pass. That two-phase behavior is
//! deliberate and covered by tests — do not unify the phases.

use csv::ReaderBuilder;
use uuid::Uuid;

use common::model::recipient::Recipient;
use common::requests::JsonRecipientRow;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("CSV 파일에 헤더와 최소 1개의 데이터 행이 필요합니다")]
    MissingHeaderOrData,
    #[error("CSV 읽기 오류: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON 파싱 오류: {0}")]
    Json(#[from] serde_json::Error),
    #[error("파일이 UTF-8이 아닙니다")]
    NotUtf8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Name,
    Organization,
    Email,
    Phone,
    Position,
    Ignored,
}

/// Map a header cell to a recipient field via the fixed synonym table.
fn map_column(header: &str) -> Column {
    match header.trim().to_lowercase().as_str() {
        "name" | "이름" => Column::Name,
        "organization" | "소속" | "회사" => Column::Organization,
        "email" | "이메일" => Column::Email,
        "phone" | "전화번호" | "연락처" => Column::Phone,
        "position" | "직책" | "직위" => Column::Position,
        _ => Column::Ignored,
    }
}

/// Parse raw CSV text into recipients.
///
/// Accepts an optional UTF-8 BOM (spreadsheet exports carry one). Each kept
/// row gets a fresh opaque id.
pub fn parse_csv(text: &str) -> Result<Vec<Recipient>, ImportError> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    if text.trim().is_empty() {
        return Err(ImportError::MissingHeaderOrData);
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<Column> = reader
        .headers()?
        .iter()
        .map(map_column)
        .collect();

    let mut recipients = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut recipient = Recipient {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            organization: String::new(),
            email: String::new(),
            phone: String::new(),
            position: String::new(),
        };

        for (column, value) in columns.iter().zip(record.iter()) {
            let value = value.trim().to_string();
            match column {
                Column::Name => recipient.name = value,
                Column::Organization => recipient.organization = value,
                Column::Email => recipient.email = value,
                Column::Phone => recipient.phone = value,
                Column::Position => recipient.position = value,
                Column::Ignored => {}
            }
        }

        // Phase one: silently drop rows with neither name nor email.
        if !recipient.name.is_empty() || !recipient.email.is_empty() {
            recipients.push(recipient);
        }
    }

    Ok(recipients)
}

/// Parse a JSON array of recipient rows. `organization` and `company` are
/// accepted as synonyms; the same two-phase name/email drop applies.
pub fn parse_json(bytes: &[u8]) -> Result<Vec<Recipient>, ImportError> {
    let rows: Vec<JsonRecipientRow> = serde_json::from_slice(bytes)?;
    let recipients = rows
        .into_iter()
        .filter_map(|row| {
            let organization = row
                .organization
                .or(row.company)
                .unwrap_or_default()
                .trim()
                .to_string();
            let recipient = Recipient {
                id: Uuid::new_v4().to_string(),
                name: row.name.trim().to_string(),
                organization,
                email: row.email.trim().to_string(),
                phone: row.phone.trim().to_string(),
                position: row.position.trim().to_string(),
            };
            if recipient.name.is_empty() && recipient.email.is_empty() {
                None
            } else {
                Some(recipient)
            }
        })
        .collect();
    Ok(recipients)
}
