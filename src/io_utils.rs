//! CSV input: delimiter and encoding resolution plus decoding into a
//! [`Dataset`].
//!
//! The loader reads raw byte records so non-UTF-8 files can be decoded with
//! `encoding_rs`, and accepts ragged rows: short records simply leave their
//! trailing columns absent. The `-` path reads standard input.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};

use crate::data::Dataset;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

const BYTE_ORDER_MARK: char = '\u{feff}';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

pub fn open_csv_reader_from_path(path: &Path, delimiter: u8) -> Result<csv::Reader<Box<dyn Read>>> {
    let reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    Ok(open_csv_reader(reader, delimiter))
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

pub fn reader_headers<R>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
) -> Result<Vec<String>>
where
    R: Read,
{
    let headers = reader.byte_headers()?.clone();
    let mut decoded = decode_record(&headers, encoding)?;
    if let Some(first) = decoded.first_mut()
        && first.starts_with(BYTE_ORDER_MARK)
    {
        *first = first.trim_start_matches(BYTE_ORDER_MARK).to_string();
    }
    Ok(decoded)
}

/// Reads a delimited file into a [`Dataset`], keeping at most `max_rows` rows.
pub fn read_dataset<R>(
    reader: &mut csv::Reader<R>,
    encoding: &'static Encoding,
    max_rows: usize,
) -> Result<Dataset>
where
    R: Read,
{
    let headers = reader_headers(reader, encoding)?;
    let mut records = Vec::new();
    let mut dropped = 0usize;
    let mut record = csv::ByteRecord::new();
    let mut line = 1usize;
    while reader
        .read_byte_record(&mut record)
        .with_context(|| format!("Reading CSV record after line {line}"))?
    {
        line += 1;
        if records.len() >= max_rows {
            dropped += 1;
            continue;
        }
        records.push(
            decode_record(&record, encoding)
                .with_context(|| format!("Decoding CSV record on line {line}"))?,
        );
    }
    if dropped > 0 {
        info!("Row limit {max_rows} reached; {dropped} additional row(s) ignored");
    }
    let dataset = Dataset::from_records(headers, records).context("Building dataset")?;
    debug!(
        "Loaded {} row(s) across {} column(s)",
        dataset.row_count(),
        dataset.column_count()
    );
    Ok(dataset)
}

pub fn load_dataset(
    path: &Path,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
    max_rows: usize,
) -> Result<Dataset> {
    let delimiter = resolve_input_delimiter(path, delimiter);
    let mut reader = open_csv_reader_from_path(path, delimiter)?;
    read_dataset(&mut reader, encoding, max_rows)
        .with_context(|| format!("Loading dataset from {path:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;

    fn read(text: &[u8], max_rows: usize) -> Result<Dataset> {
        let mut reader = open_csv_reader(text, b',');
        read_dataset(&mut reader, UTF_8, max_rows)
    }

    #[test]
    fn delimiter_follows_extension_unless_provided() {
        assert_eq!(resolve_input_delimiter(Path::new("a.tsv"), None), b'\t');
        assert_eq!(resolve_input_delimiter(Path::new("a.csv"), None), b',');
        assert_eq!(resolve_input_delimiter(Path::new("a.tsv"), Some(b';')), b';');
    }

    #[test]
    fn unknown_encoding_is_an_error() {
        assert!(resolve_encoding(Some("not-a-charset")).is_err());
        assert_eq!(resolve_encoding(Some("latin1")).unwrap().name(), "windows-1252");
    }

    #[test]
    fn ragged_rows_leave_cells_absent() {
        let dataset = read(b"name,amount,note\nwidget,12\ngizmo,3,ok\n", 100).unwrap();
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.value(0, "note"), None);
        assert_eq!(dataset.value(1, "amount"), Some(&Value::Number(3.0)));
    }

    #[test]
    fn row_cap_truncates_and_bom_is_stripped() {
        let dataset = read("\u{feff}id,value\n1,2\n3,4\n5,6\n".as_bytes(), 2).unwrap();
        assert_eq!(dataset.headers(), ["id", "value"]);
        assert_eq!(dataset.row_count(), 2);
    }

    #[test]
    fn latin1_input_decodes() {
        let bytes = b"city,total\nM\xfcnchen,5\n";
        let mut reader = open_csv_reader(&bytes[..], b',');
        let encoding = resolve_encoding(Some("latin1")).unwrap();
        let dataset = read_dataset(&mut reader, encoding, 10).unwrap();
        assert_eq!(dataset.value(0, "city"), Some(&Value::from("M\u{fc}nchen")));
    }
}
