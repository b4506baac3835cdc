use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;

use super::model::{Column, Table, Value};
use crate::error::{Result, SweeperError};

pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Cell tokens read as missing values.
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Formats
// ---------------------------------------------------------------------------

/// The two serialisation schemes a file can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Xlsx,
}

/// The export format picked by the user; independent of the ingest format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionTarget {
    #[default]
    Csv,
    Excel,
}

impl ConversionTarget {
    pub const ALL: [ConversionTarget; 2] = [ConversionTarget::Csv, ConversionTarget::Excel];

    pub fn label(self) -> &'static str {
        match self {
            ConversionTarget::Csv => "CSV",
            ConversionTarget::Excel => "Excel",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ConversionTarget::Csv => "csv",
            ConversionTarget::Excel => "xlsx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ConversionTarget::Csv => CSV_MIME,
            ConversionTarget::Excel => XLSX_MIME,
        }
    }
}

/// Knobs for reading and writing; built from the user configuration.
#[derive(Debug, Clone)]
pub struct CodecOptions {
    pub delimiter: u8,
    pub sheet_name: String,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            sheet_name: "Sheet1".to_string(),
        }
    }
}

/// A converted file ready to be offered for download.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Pick the format from the file name's extension (case-insensitive).
///
/// Supported:
/// * `.csv`  – delimited text, first line is the header
/// * `.xlsx` – workbook, first sheet, first row is the header
pub fn detect_format(file_name: &str) -> Result<Format> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => Ok(Format::Csv),
        "xlsx" => Ok(Format::Xlsx),
        "" => Err(SweeperError::UnsupportedFormat("(no extension)".to_string())),
        other => Err(SweeperError::UnsupportedFormat(format!(".{other}"))),
    }
}

pub fn decode(bytes: &[u8], format: Format, options: &CodecOptions) -> Result<Table> {
    match format {
        Format::Csv => decode_csv(bytes, options),
        Format::Xlsx => decode_xlsx(bytes),
    }
}

pub fn encode(table: &Table, target: ConversionTarget, options: &CodecOptions) -> Result<Vec<u8>> {
    match target {
        ConversionTarget::Csv => encode_csv(table, options),
        ConversionTarget::Excel => encode_xlsx(table, options),
    }
}

/// `sales.xlsx` exported as CSV becomes `sales_cleaned.csv`.
pub fn export_file_name(original: &str, target: ConversionTarget) -> String {
    let base = Path::new(original)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(original);
    format!("{base}_cleaned.{}", target.extension())
}

/// Encode `table` and name the result after `original`.
pub fn export(
    table: &Table,
    original: &str,
    target: ConversionTarget,
    options: &CodecOptions,
) -> Result<ExportArtifact> {
    Ok(ExportArtifact {
        file_name: export_file_name(original, target),
        bytes: encode(table, target, options)?,
        mime_type: target.mime_type(),
    })
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn decode_csv(bytes: &[u8], options: &CodecOptions) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| SweeperError::Decode(format!("reading CSV header: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() {
        return Err(SweeperError::Decode("no columns to parse".to_string()));
    }

    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| SweeperError::Decode(format!("CSV row {row_no}: {e}")))?;
        for (col, field) in record.iter().enumerate() {
            cells[col].push(parse_field(field));
        }
    }

    assemble(headers, cells)
}

fn parse_field(s: &str) -> Value {
    if MISSING_TOKENS.contains(&s) {
        return Value::Missing;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return Value::Float(f);
    }
    match s {
        "True" | "TRUE" | "true" => Value::Bool(true),
        "False" | "FALSE" | "false" => Value::Bool(false),
        _ => Value::Text(s.to_string()),
    }
}

fn encode_csv(table: &Table, options: &CodecOptions) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(Vec::new());

    writer
        .write_record(table.column_names())
        .map_err(|e| SweeperError::Encode(e.to_string()))?;
    for row in 0..table.row_count() {
        writer
            .write_record(table.row(row).iter().map(|v| v.to_field()))
            .map_err(|e| SweeperError::Encode(e.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|e| SweeperError::Encode(e.to_string()))
}

// ---------------------------------------------------------------------------
// XLSX
// ---------------------------------------------------------------------------

fn decode_xlsx(bytes: &[u8]) -> Result<Table> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| SweeperError::Decode(format!("opening workbook: {e}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SweeperError::Decode("workbook has no sheets".to_string()))?
        .map_err(|e| SweeperError::Decode(format!("reading first sheet: {e}")))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| SweeperError::Decode("first sheet is empty".to_string()))?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| match cell {
            Data::Empty => String::new(),
            Data::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();

    let mut cells: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (col, cell) in row.iter().enumerate() {
            cells[col].push(cell_value(cell));
        }
    }

    assemble(headers, cells)
}

/// Workbooks store every number as a float; integral ones come back as
/// integers and are widened again by column normalisation if needed.
fn cell_value(cell: &Data) -> Value {
    const EXACT_INT_LIMIT: f64 = 9_007_199_254_740_992.0; // 2^53
    match cell {
        Data::Int(i) => Value::Integer(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < EXACT_INT_LIMIT => Value::Integer(*f as i64),
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) if MISSING_TOKENS.contains(&s.as_str()) => Value::Missing,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Text(s.clone()),
        Data::DateTime(_) => Value::Text(cell.to_string()),
        Data::Error(_) | Data::Empty => Value::Missing,
    }
}

fn encode_xlsx(table: &Table, options: &CodecOptions) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(&options.sheet_name)?;

    for (col_idx, column) in table.columns().iter().enumerate() {
        let col = u16::try_from(col_idx)
            .map_err(|_| SweeperError::Encode(format!("too many columns ({col_idx})")))?;
        worksheet.write_string(0, col, column.name())?;

        for (row_idx, value) in column.values().iter().enumerate() {
            let row = u32::try_from(row_idx + 1)
                .map_err(|_| SweeperError::Encode(format!("too many rows ({row_idx})")))?;
            match value {
                Value::Text(s) => {
                    worksheet.write_string(row, col, s)?;
                }
                Value::Integer(i) => {
                    worksheet.write_number(row, col, *i as f64)?;
                }
                Value::Float(f) => {
                    worksheet.write_number(row, col, *f)?;
                }
                Value::Bool(b) => {
                    worksheet.write_boolean(row, col, *b)?;
                }
                Value::Missing => {}
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Name blank headers, de-duplicate repeated ones (`a`, `a.1`, ...) and
/// normalise numeric columns.
fn assemble(headers: Vec<String>, cells: Vec<Vec<Value>>) -> Result<Table> {
    let mut taken: Vec<String> = Vec::with_capacity(headers.len());
    let mut columns = Vec::with_capacity(headers.len());

    for (idx, (header, values)) in headers.into_iter().zip(cells).enumerate() {
        let base = if header.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            header
        };
        let mut name = base.clone();
        let mut suffix = 1;
        while taken.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        taken.push(name.clone());

        let mut column = Column::new(name, values);
        column.normalise_numeric();
        columns.push(column);
    }

    Table::new(columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> CodecOptions {
        CodecOptions::default()
    }

    #[test]
    fn detects_extensions_case_insensitively() {
        assert_eq!(detect_format("data.csv").unwrap(), Format::Csv);
        assert_eq!(detect_format("Report.XLSX").unwrap(), Format::Xlsx);
        assert_eq!(detect_format("archive.v2.Csv").unwrap(), Format::Csv);
    }

    #[test]
    fn rejects_other_extensions() {
        assert!(matches!(
            detect_format("data.txt"),
            Err(SweeperError::UnsupportedFormat(ext)) if ext == ".txt"
        ));
        assert!(detect_format("csv").is_err());
        assert!(detect_format("notes.xls").is_err());
    }

    #[test]
    fn csv_cells_are_typed_per_column() {
        let table = decode(b"name,age,score,active\na,1,2.5,True\nb,,3,false\n", Format::Csv, &opts())
            .unwrap();

        assert_eq!(table.column_names(), vec!["name", "age", "score", "active"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(
            table.column("age").unwrap().values(),
            &[Value::Float(1.0), Value::Missing]
        );
        assert_eq!(
            table.column("score").unwrap().values(),
            &[Value::Float(2.5), Value::Float(3.0)]
        );
        assert_eq!(
            table.column("active").unwrap().values(),
            &[Value::Bool(true), Value::Bool(false)]
        );
    }

    #[test]
    fn csv_missing_tokens_become_missing() {
        let table = decode(b"a,b\nNA,x\nnull,\n", Format::Csv, &opts()).unwrap();
        assert_eq!(table.column("a").unwrap().missing_count(), 2);
        assert_eq!(table.column("b").unwrap().missing_count(), 1);
    }

    #[test]
    fn csv_headers_are_named_and_deduplicated() {
        let table = decode(b"a,,a,a\n1,2,3,4\n", Format::Csv, &opts()).unwrap();
        assert_eq!(table.column_names(), vec!["a", "Unnamed: 1", "a.1", "a.2"]);
    }

    #[test]
    fn ragged_csv_is_a_decode_failure() {
        let err = decode(b"a,b\n1,2,3\n", Format::Csv, &opts()).unwrap_err();
        assert!(matches!(err, SweeperError::Decode(detail) if detail.contains("row 0")));
    }

    #[test]
    fn empty_csv_is_a_decode_failure() {
        assert!(matches!(
            decode(b"", Format::Csv, &opts()),
            Err(SweeperError::Decode(_))
        ));
    }

    #[test]
    fn garbage_workbook_is_a_decode_failure() {
        let err = decode(b"definitely not a zip archive", Format::Xlsx, &opts()).unwrap_err();
        assert!(matches!(err, SweeperError::Decode(detail) if detail.starts_with("opening workbook")));
    }

    #[test]
    fn csv_encoding_writes_missing_as_empty_field() {
        let table = decode(b"name,score\na,1.5\nb,\n", Format::Csv, &opts()).unwrap();
        let bytes = encode(&table, ConversionTarget::Csv, &opts()).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "name,score\na,1.5\nb,\n");
    }

    #[test]
    fn csv_round_trip_preserves_table() {
        let source = b"city,pop,ratio,ok\nOslo,700000,0.5,True\n\"Rio, BR\",6000000,,False\n";
        let table = decode(source, Format::Csv, &opts()).unwrap();
        let bytes = encode(&table, ConversionTarget::Csv, &opts()).unwrap();
        assert_eq!(decode(&bytes, Format::Csv, &opts()).unwrap(), table);
    }

    #[test]
    fn excel_round_trip_preserves_table() {
        let source = b"city,pop,ratio,ok\nOslo,700000,0.5,True\nRio,6000000,,False\n";
        let table = decode(source, Format::Csv, &opts()).unwrap();
        let bytes = encode(&table, ConversionTarget::Excel, &opts()).unwrap();
        let back = decode(&bytes, Format::Xlsx, &opts()).unwrap();
        assert_eq!(back, table);
        assert_eq!(back.column("ratio").unwrap().values()[1], Value::Missing);
    }

    #[test]
    fn csv_round_trip_keeps_huge_floats_as_floats() {
        let table = Table::new(vec![Column::new(
            "x",
            vec![Value::Float(1e16), Value::Float(2e16)],
        )])
        .unwrap();
        let bytes = encode(&table, ConversionTarget::Csv, &opts()).unwrap();
        assert_eq!(String::from_utf8(bytes.clone()).unwrap(), "x\n1e16\n2e16\n");
        assert_eq!(decode(&bytes, Format::Csv, &opts()).unwrap(), table);
    }

    #[test]
    fn only_the_first_sheet_is_read() {
        let mut workbook = Workbook::new();
        let first = workbook.add_worksheet();
        first.write_string(0, 0, "first").unwrap();
        first.write_number(1, 0, 1.0).unwrap();
        let second = workbook.add_worksheet();
        second.write_string(0, 0, "second").unwrap();
        second.write_string(0, 1, "other").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let table = decode(&bytes, Format::Xlsx, &opts()).unwrap();
        assert_eq!(table.column_names(), vec!["first"]);
        assert_eq!(table.column("first").unwrap().values(), &[Value::Integer(1)]);
    }

    #[test]
    fn empty_first_sheet_is_a_decode_failure() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet();
        workbook.add_worksheet().write_string(0, 0, "later").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let err = decode(&bytes, Format::Xlsx, &opts()).unwrap_err();
        assert!(matches!(err, SweeperError::Decode(detail) if detail == "first sheet is empty"));
    }

    #[test]
    fn workbook_missing_tokens_become_missing() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "name").unwrap();
        sheet.write_string(0, 1, "score").unwrap();
        sheet.write_string(1, 0, "a").unwrap();
        sheet.write_string(1, 1, "NA").unwrap();
        sheet.write_string(2, 0, "N/A").unwrap();
        sheet.write_number(2, 1, 2.5).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let table = decode(&bytes, Format::Xlsx, &opts()).unwrap();
        assert_eq!(
            table.column("name").unwrap().values(),
            &[Value::Text("a".into()), Value::Missing]
        );
        assert_eq!(
            table.column("score").unwrap().values(),
            &[Value::Missing, Value::Float(2.5)]
        );
    }

    #[test]
    fn semicolon_delimiter_is_honoured() {
        let options = CodecOptions {
            delimiter: b';',
            ..CodecOptions::default()
        };
        let table = decode(b"a;b\n1;2\n", Format::Csv, &options).unwrap();
        assert_eq!(table.width(), 2);
        let bytes = encode(&table, ConversionTarget::Csv, &options).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "a;b\n1;2\n");
    }

    #[test]
    fn export_names_and_mime_types() {
        assert_eq!(export_file_name("sales.xlsx", ConversionTarget::Csv), "sales_cleaned.csv");
        assert_eq!(
            export_file_name("q1.report.csv", ConversionTarget::Excel),
            "q1.report_cleaned.xlsx"
        );
        assert_eq!(ConversionTarget::Csv.mime_type(), "text/csv");
        assert_eq!(
            ConversionTarget::Excel.mime_type(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }
}
