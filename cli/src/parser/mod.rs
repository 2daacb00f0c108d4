//! CSV loader with encoding and delimiter auto-detection.
//!
//! Reads a file into an ordered list of [`BusinessRecord`]s. Values are kept
//! verbatim (no trimming) so the writer can reproduce them unchanged.

use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::models::{BusinessRecord, Schema};

/// Delimiters considered by auto-detection, in tie-break order.
const CANDIDATE_DELIMITERS: [char; 4] = [',', ';', '\t', '|'];

/// Result of loading a CSV, with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Column headers
    pub schema: Schema,
    /// Data rows in input order
    pub records: Vec<BusinessRecord>,
    /// Detected encoding
    pub encoding: String,
    /// Detected or configured delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 always wins; otherwise chardet decides.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the given encoding, dropping a UTF-8 BOM.
pub fn decode_content(bytes: &[u8], encoding: &str) -> LoadResult<String> {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        // Latin-1 maps each byte to the code point of the same value
        "iso-8859-1" | "latin-1" | "latin1" => bytes.iter().map(|&b| b as char).collect(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        other => {
            let label = encoding_rs::Encoding::for_label(other.as_bytes())
                .ok_or_else(|| LoadError::Encoding(other.to_string()))?;
            label.decode(bytes).0.into_owned()
        }
    };

    Ok(match decoded.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => decoded,
    })
}

/// Detect the delimiter by counting candidates in the header line.
///
/// Falls back to `,` when no candidate appears.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &CANDIDATE_DELIMITERS {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Load a CSV file. `delimiter` overrides auto-detection.
pub fn load_csv<P: AsRef<Path>>(path: P, delimiter: Option<char>) -> LoadResult<ParseResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    parse_bytes(&bytes, delimiter)
}

/// Parse CSV bytes with encoding detection. `delimiter` overrides auto-detection.
pub fn parse_bytes(bytes: &[u8], delimiter: Option<char>) -> LoadResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));

    parse_str(&content, delimiter, encoding)
}

/// Parse decoded CSV text with an explicit delimiter.
///
/// Every data row must have exactly as many fields as the header.
pub fn parse_str(content: &str, delimiter: char, encoding: String) -> LoadResult<ParseResult> {
    if content.trim().is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let delimiter_byte = delimiter_byte(delimiter)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter_byte)
        .has_headers(true)
        .flexible(false)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(map_csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let mut records = Vec::new();
    for (position, row) in reader.records().enumerate() {
        let row = row.map_err(map_csv_error)?;
        let values = row.iter().map(str::to_string).collect();
        records.push(BusinessRecord::new(position, values));
    }

    Ok(ParseResult {
        schema: Schema::new(headers),
        records,
        encoding,
        delimiter,
    })
}

/// Delimiters must be single-byte for the csv reader and writer.
pub(crate) fn delimiter_byte(delimiter: char) -> LoadResult<u8> {
    if delimiter.is_ascii() && delimiter != '"' && delimiter != '\n' && delimiter != '\r' {
        Ok(delimiter as u8)
    } else {
        Err(LoadError::Parse(format!(
            "unsupported delimiter '{}'",
            delimiter.escape_default()
        )))
    }
}

fn map_csv_error(err: csv::Error) -> LoadError {
    match err.kind() {
        csv::ErrorKind::UnequalLengths {
            pos,
            expected_len,
            len,
        } => LoadError::Malformed {
            line: pos.as_ref().map(|p| p.line()).unwrap_or(0),
            expected: *expected_len,
            found: *len,
        },
        _ => LoadError::Parse(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(csv: &str) -> LoadResult<ParseResult> {
        parse_bytes(csv.as_bytes(), None)
    }

    #[test]
    fn test_simple_csv() {
        let result = parse("Name,Street 1\nPetco,Calle Loíza 1\nBodega,\n").unwrap();

        assert_eq!(result.schema.headers(), &["Name", "Street 1"]);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].get(&result.schema, "Street 1"), Some("Calle Loíza 1"));
        assert_eq!(result.records[1].get(&result.schema, "Street 1"), Some(""));
        assert_eq!(result.records[1].position(), 1);
    }

    #[test]
    fn test_quoted_values_keep_delimiters() {
        let csv = "Name,Description 1\n\"Tapas, Bar & Grill\",\"Says \"\"hi\"\"\"\n";
        let result = parse(csv).unwrap();

        assert_eq!(result.records[0].values(), &["Tapas, Bar & Grill", "Says \"hi\""]);
    }

    #[test]
    fn test_values_not_trimmed() {
        let result = parse("a,b\n  x , y\n").unwrap();
        assert_eq!(result.records[0].values(), &["  x ", " y"]);
    }

    #[test]
    fn test_header_only() {
        let result = parse("Name,Street 1\n").unwrap();
        assert_eq!(result.schema.len(), 2);
        assert!(result.records.is_empty());
    }

    #[test]
    fn test_empty_lines_skipped() {
        let result = parse("a,b\n1,2\n\n3,4\n").unwrap();
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[1].position(), 1);
    }

    #[test]
    fn test_unequal_row_is_malformed() {
        let err = parse("a,b,c\n1,2,3\n4,5\n").unwrap_err();
        match err {
            LoadError::Malformed { line, expected, found } => {
                assert_eq!(line, 3);
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("expected Malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_extra_fields_are_malformed() {
        assert!(matches!(
            parse("a,b\n1,2,3\n"),
            Err(LoadError::Malformed { .. })
        ));
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse(""), Err(LoadError::EmptyFile)));
        assert!(matches!(parse("  \n\n"), Err(LoadError::EmptyFile)));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_explicit_delimiter_overrides_detection() {
        let result = parse_bytes("a;b,c\n1;2,3\n".as_bytes(), Some(',')).unwrap();
        assert_eq!(result.delimiter, ',');
        assert_eq!(result.schema.headers(), &["a;b", "c"]);
    }

    #[test]
    fn test_bom_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(b"Name,City\nA,B\n");
        let result = parse_bytes(&bytes, None).unwrap();
        assert_eq!(result.schema.headers()[0], "Name");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_latin1_upper_half_preserved() {
        // 0xA4 is the currency sign and 0xBD one half, not Latin-9's euro and oe
        let decoded = decode_content(&[b'a', 0xA4, b'b', b' ', 0xBD], "iso-8859-1").unwrap();
        assert_eq!(decoded, "a\u{a4}b \u{bd}");
    }

    #[test]
    fn test_latin1_file_values_survive() {
        let mut bytes = b"Producto,Nota\nCaf".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b",precio ");
        bytes.push(0xBD);
        bytes.push(b'\n');

        let result = parse_bytes(&bytes, None).unwrap();
        assert_ne!(result.encoding, "utf-8");
        assert_eq!(result.records[0].values(), &["Caf\u{e9}", "precio \u{bd}"]);
    }

    #[test]
    fn test_utf8_detected() {
        assert_eq!(detect_encoding("Bayamón".as_bytes()), "utf-8");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_csv(dir.path().join("businesses.csv"), None).unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
    }

    #[test]
    fn test_load_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Name;Main type\nPetco;Pet store\n").unwrap();

        let result = load_csv(file.path(), None).unwrap();
        assert_eq!(result.delimiter, ';');
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.records.len(), 1);
    }

    #[test]
    fn test_rejects_multibyte_delimiter() {
        assert!(delimiter_byte('§').is_err());
        assert_eq!(delimiter_byte('\t').unwrap(), b'\t');
    }
}
