// ============================================================
// Layer 4 — Split File Loader
// ============================================================
// Reads one train/dev/test file into LabeledDocs.
//
// File format:
//   line 0      header (column names), discarded
//   line 1..    tab-separated fields
//                 field[1]   whitespace-separated token indices
//                 field[-1]  integer label (0 or 1)
//
// Example record (tabs shown as →):
//   17→12 904 3 77 0 0→1
//
// Any unreadable file or malformed record is an error that
// names the file and line. Nothing is skipped silently: a bad
// split would otherwise quietly change the class balance.
//
// Reference: Rust Book §9 (Error Handling)
//            Rust Book §12 (Reading a File)

use anyhow::{anyhow, bail, Context, Result};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use crate::domain::document::LabeledDoc;

/// Read every record of a split file, in file order.
pub fn read_labeled_docs(path: &Path) -> Result<Vec<LabeledDoc>> {
    let file = File::open(path)
        .with_context(|| format!("Cannot open split file '{}'", path.display()))?;

    let mut lines = BufReader::new(file).lines();

    // Column names
    match lines.next() {
        Some(header) => {
            header.with_context(|| format!("Cannot read header of '{}'", path.display()))?;
        }
        None => return Ok(Vec::new()),
    }

    let mut docs = Vec::new();
    for (idx, line) in lines.enumerate() {
        // +2: one for the header, one for 1-based numbering
        let line_no = idx + 2;
        let line = line
            .with_context(|| format!("Cannot read line {line_no} of '{}'", path.display()))?;

        let doc = parse_record(&line)
            .with_context(|| format!("Malformed record at {}:{line_no}", path.display()))?;
        docs.push(doc);
    }

    tracing::debug!("Read {} records from '{}'", docs.len(), path.display());
    Ok(docs)
}

/// Parse a single tab-separated record.
pub fn parse_record(line: &str) -> Result<LabeledDoc> {
    let fields: Vec<&str> = line.trim().split('\t').collect();
    if fields.len() < 2 {
        bail!("expected at least 2 tab-separated fields, found {}", fields.len());
    }

    let raw_label = fields[fields.len() - 1].trim();
    let label: i64 = raw_label
        .parse()
        .map_err(|e| anyhow!("label '{raw_label}' is not an integer: {e}"))?;
    let label = match label {
        0 => 0u8,
        1 => 1u8,
        other => bail!("label {other} is not binary (expected 0 or 1)"),
    };

    let tokens = fields[1]
        .split_whitespace()
        .map(|tok| {
            tok.parse::<u32>()
                .map_err(|e| anyhow!("token index '{tok}' is not an integer: {e}"))
        })
        .collect::<Result<Vec<u32>>>()?;

    Ok(LabeledDoc::new(tokens, label))
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_split(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_parses_records_and_skips_header() {
        let f = write_split("did\tdoc\tlabel\n7\t4 5 6\t1\n8\t9 10\t0\n");
        let docs = read_labeled_docs(f.path()).unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0], LabeledDoc::new(vec![4, 5, 6], 1));
        assert_eq!(docs[1], LabeledDoc::new(vec![9, 10], 0));
    }

    #[test]
    fn test_label_is_last_field() {
        let doc = parse_record("1\t3 2 1\textra\tmeta\t0").unwrap();
        assert_eq!(doc.tokens, vec![3, 2, 1]);
        assert_eq!(doc.label, 0);
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let f = write_split("did\tdoc\tlabel\n");
        assert!(read_labeled_docs(f.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = read_labeled_docs(Path::new("/definitely/not/here.train")).unwrap_err();
        assert!(err.to_string().contains("Cannot open split file"));
    }

    #[test]
    fn test_non_integer_label_is_an_error() {
        let f = write_split("h\n1\t2 3\tpositive\n");
        let err = read_labeled_docs(f.path()).unwrap_err();
        // Context names the offending line
        assert!(format!("{err:#}").contains(":2"));
    }

    #[test]
    fn test_wrong_column_count_is_an_error() {
        assert!(parse_record("only-one-field").is_err());
        assert!(parse_record("").is_err());
    }

    #[test]
    fn test_non_integer_token_is_an_error() {
        assert!(parse_record("1\t2 x 3\t1").is_err());
    }

    #[test]
    fn test_non_binary_label_is_an_error() {
        assert!(parse_record("1\t2 3\t2").is_err());
    }
}
