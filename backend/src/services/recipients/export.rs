//! CSV template and recipient export. Exports carry a UTF-8 BOM so
//! spreadsheet applications render Korean correctly, and round-trip through
//! the importer field by field.

use common::model::recipient::Recipient;

const BOM: &str = "\u{FEFF}";
const KOREAN_HEADERS: [&str; 5] = ["이름", "소속", "이메일", "전화번호", "직책"];
const ENGLISH_HEADERS: [&str; 5] = ["name", "organization", "email", "phone", "position"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderLanguage {
    Korean,
    English,
}

fn write_rows(headers: [&str; 5], rows: &[[&str; 5]]) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    // Static header/sample content; writing to a Vec cannot fail.
    let _ = writer.write_record(headers);
    for row in rows {
        let _ = writer.write_record(row);
    }
    let bytes = writer.into_inner().unwrap_or_default();
    String::from_utf8(bytes).unwrap_or_default()
}

/// Downloadable CSV skeleton for bulk import, optionally with sample rows.
pub fn csv_template(language: HeaderLanguage, include_sample: bool) -> String {
    let (headers, samples): ([&str; 5], Vec<[&str; 5]>) = match language {
        HeaderLanguage::Korean => (
            KOREAN_HEADERS,
            vec![
                ["홍길동", "ABC회사", "hong@example.com", "010-1234-5678", "부장"],
                ["김철수", "XYZ기업", "kim@example.com", "010-9876-5432", "팀장"],
                ["이영희", "DEF스타트업", "lee@example.com", "010-5555-7777", "대리"],
            ],
        ),
        HeaderLanguage::English => (
            ENGLISH_HEADERS,
            vec![
                ["Hong Gil-dong", "ABC Company", "hong@example.com", "010-1234-5678", "Manager"],
                ["Kim Chul-su", "XYZ Corporation", "kim@example.com", "010-9876-5432", "Team Lead"],
                ["Lee Young-hee", "DEF Startup", "lee@example.com", "010-5555-7777", "Associate"],
            ],
        ),
    };

    let rows = if include_sample { samples } else { Vec::new() };
    format!("{}{}", BOM, write_rows(headers, &rows))
}

/// Export the current recipient list as CSV with Korean headers.
pub fn export_recipients(recipients: &[Recipient]) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let _ = writer.write_record(KOREAN_HEADERS);
    for r in recipients {
        let _ = writer.write_record([
            r.name.as_str(),
            r.organization.as_str(),
            r.email.as_str(),
            r.phone.as_str(),
            r.position.as_str(),
        ]);
    }
    let bytes = writer.into_inner().unwrap_or_default();
    format!("{}{}", BOM, String::from_utf8(bytes).unwrap_or_default())
}
