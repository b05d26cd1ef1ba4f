//! Zip packaging of a batch generation run.

use chrono::Local;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use common::model::generated::GeneratedFile;

#[derive(Debug, thiserror::Error)]
#[error("압축 파일 생성 실패: {0}")]
pub struct ArchiveError(String);

/// `초청장_전체_{N}명_{YYYY-MM-DD}.zip`, dated in server-local time.
pub fn archive_name(recipient_count: usize) -> String {
    format!(
        "초청장_전체_{}명_{}.zip",
        recipient_count,
        Local::now().format("%Y-%m-%d")
    )
}

/// Disambiguate duplicate entry names with `_{n}` before the extension, so
/// two recipients named 김철수 both end up in the archive.
fn unique_entry_name(seen: &mut HashMap<String, usize>, file_name: &str) -> String {
    let n = seen.entry(file_name.to_string()).or_insert(0);
    *n += 1;
    if *n == 1 {
        return file_name.to_string();
    }
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => format!("{}_{}.{}", stem, *n - 1, ext),
        None => format!("{}_{}", file_name, *n - 1),
    }
}

/// Pack the generated files into a zip held in memory. A file that fails to
/// be written is logged and skipped; the archive still carries the others.
/// Returns the archive bytes and the number of entries written.
pub fn pack(files: &[GeneratedFile]) -> Result<(Vec<u8>, usize), ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let mut seen = HashMap::new();
    let mut entries = 0usize;

    for file in files {
        let entry_name = unique_entry_name(&mut seen, &file.file_name);
        if let Err(e) = writer.start_file(entry_name.as_str(), options) {
            log::warn!("skipping archive entry {entry_name}: {e}");
            continue;
        }
        if let Err(e) = writer.write_all(&file.bytes) {
            log::warn!("skipping archive entry {entry_name}: {e}");
            continue;
        }
        entries += 1;
    }

    let cursor = writer.finish().map_err(|e| ArchiveError(e.to_string()))?;
    Ok((cursor.into_inner(), entries))
}
