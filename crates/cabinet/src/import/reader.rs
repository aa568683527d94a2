use std::io::Cursor;

use calamine::{Data, DataType, Reader, Xlsx};
use tracing::debug;

use super::schema::{normalize_header, EntityKind};
use super::service::FieldError;
use super::ImportError;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Upload encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Xlsx,
}

impl ImportFormat {
    /// CSV for `text/csv` style types, xlsx for everything else.
    pub fn from_mime(mime: &mime::Mime) -> Self {
        let csv_like = mime.subtype() == mime::CSV
            || mime.subtype().as_str().eq_ignore_ascii_case("x-csv")
            || mime.suffix().map_or(false, |suffix| suffix == mime::CSV);
        if csv_like {
            Self::Csv
        } else {
            Self::Xlsx
        }
    }

    pub fn from_content_type(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.parse::<mime::Mime>().ok())
            .map_or(Self::Xlsx, |mime| Self::from_mime(&mime))
    }
}

/// A data row with its 1-based spreadsheet row number. `defect` is set when
/// the row could not be decoded; such a row is reported as failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SheetRow {
    pub(crate) number: usize,
    pub(crate) cells: Vec<String>,
    pub(crate) defect: Option<FieldError>,
}

impl SheetRow {
    fn is_blank(&self) -> bool {
        self.defect.is_none() && self.cells.iter().all(|cell| cell.trim().is_empty())
    }
}

/// Normalized header keys and the non-blank data rows below them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Sheet {
    pub(crate) headers: Vec<String>,
    pub(crate) rows: Vec<SheetRow>,
}

impl Sheet {
    pub(crate) fn column_index(&self, key: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == key)
    }
}

pub(crate) fn read_sheet(
    bytes: &[u8],
    format: ImportFormat,
    kind: EntityKind,
) -> Result<Sheet, ImportError> {
    match format {
        ImportFormat::Csv => read_csv(bytes),
        ImportFormat::Xlsx => read_xlsx(bytes, kind),
    }
}

/// Only an unreadable header aborts; a row that cannot be read or decoded
/// becomes a row with a defect.
fn read_csv(bytes: &[u8]) -> Result<Sheet, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader
        .byte_headers()?
        .iter()
        .map(|raw| normalize_header(&String::from_utf8_lossy(raw)))
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    let mut record = csv::ByteRecord::new();
    let mut fallback = 1;
    loop {
        fallback += 1;
        let row = match reader.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => decode_record(&record, &headers, fallback),
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                let number = err
                    .position()
                    .map_or(fallback, |position| position.line() as usize);
                debug!(row = number, error = %err, "unreadable csv record");
                SheetRow {
                    number,
                    cells: Vec::new(),
                    defect: Some(FieldError {
                        field: "row".to_string(),
                        message: format!("unreadable CSV record: {err}"),
                    }),
                }
            }
        };
        if !row.is_blank() {
            rows.push(row);
        }
    }

    Ok(Sheet { headers, rows })
}

fn decode_record(record: &csv::ByteRecord, headers: &[String], fallback: usize) -> SheetRow {
    let number = record
        .position()
        .map_or(fallback, |position| position.line() as usize);
    let mut cells = Vec::with_capacity(record.len());
    let mut defect = None;
    for (column, raw) in record.iter().enumerate() {
        match std::str::from_utf8(raw) {
            Ok(text) => cells.push(text.to_string()),
            Err(_) => {
                if defect.is_none() {
                    let field = headers
                        .get(column)
                        .filter(|header| !header.is_empty())
                        .cloned()
                        .unwrap_or_else(|| format!("column_{}", column + 1));
                    defect = Some(FieldError {
                        field,
                        message: "value is not valid UTF-8 text; save the file as CSV UTF-8"
                            .to_string(),
                    });
                }
                cells.push(String::from_utf8_lossy(raw).into_owned());
            }
        }
    }
    SheetRow {
        number,
        cells,
        defect,
    }
}

fn read_xlsx(bytes: &[u8], kind: EntityKind) -> Result<Sheet, ImportError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let sheet_names = workbook.sheet_names();
    let sheet_name = sheet_names
        .iter()
        .find(|name| name.eq_ignore_ascii_case(kind.sheet_name()))
        .or_else(|| sheet_names.first())
        .cloned()
        .ok_or(ImportError::EmptyWorkbook)?;
    debug!(sheet = %sheet_name, kind = kind.slug(), "reading worksheet");

    let range = workbook.worksheet_range(&sheet_name)?;
    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let mut lines = range.rows().enumerate();

    let headers = match lines.next() {
        Some((_, header)) => header
            .iter()
            .map(|cell| normalize_header(&cell_text(cell)))
            .collect(),
        None => Vec::new(),
    };

    let rows = lines
        .map(|(offset, cells)| SheetRow {
            number: first_row + offset + 1,
            cells: cells.iter().map(cell_text).collect(),
            defect: None,
        })
        .filter(|row| !row.is_blank())
        .collect();

    Ok(Sheet { headers, rows })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.trim().to_string(),
        Data::Float(value) => format_number(*value),
        Data::DateTime(_) => cell
            .as_date()
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

/// Whole floats without the trailing `.0` spreadsheets add to integers.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_selects_format() {
        assert_eq!(
            ImportFormat::from_content_type(Some("text/csv; charset=utf-8")),
            ImportFormat::Csv
        );
        assert_eq!(
            ImportFormat::from_content_type(Some("application/vnd.ms-excel")),
            ImportFormat::Xlsx
        );
        assert_eq!(
            ImportFormat::from_content_type(Some(XLSX_CONTENT_TYPE)),
            ImportFormat::Xlsx
        );
        assert_eq!(ImportFormat::from_content_type(None), ImportFormat::Xlsx);
    }

    #[test]
    fn csv_rows_keep_spreadsheet_numbers_and_skip_blanks() {
        let csv = "Nom*,Adresse\nAtlas,1 rue A\n,\n\nPalmiers,2 rue B\n";
        let sheet = read_sheet(csv.as_bytes(), ImportFormat::Csv, EntityKind::Immeubles)
            .expect("csv parses");

        assert_eq!(sheet.headers, vec!["nom", "adresse"]);
        let numbers = sheet.rows.iter().map(|row| row.number).collect::<Vec<_>>();
        assert_eq!(numbers, vec![2, 5]);
        assert_eq!(sheet.column_index("adresse"), Some(1));
    }

    #[test]
    fn undecodable_csv_row_is_kept_with_a_defect() {
        let csv = b"Nom*,Adresse\nAtlas,1 rue A\nCaf\xe9,2 rue B\nPalmiers,3 rue C\n";
        let sheet = read_sheet(csv, ImportFormat::Csv, EntityKind::Immeubles)
            .expect("one bad row does not abort the file");

        let numbers = sheet.rows.iter().map(|row| row.number).collect::<Vec<_>>();
        assert_eq!(numbers, vec![2, 3, 4]);
        assert!(sheet.rows[0].defect.is_none());
        let defect = sheet.rows[1].defect.as_ref().expect("row 3 has a defect");
        assert_eq!(defect.field, "nom");
        assert!(defect.message.contains("UTF-8"));
        assert!(sheet.rows[2].defect.is_none());
    }

    #[test]
    fn garbage_bytes_are_not_a_workbook() {
        let result = read_sheet(b"not a zip file", ImportFormat::Xlsx, EntityKind::Lots);
        assert!(matches!(result, Err(ImportError::Workbook(_))));
    }

    #[test]
    fn whole_floats_lose_their_fraction() {
        assert_eq!(format_number(450000.0), "450000");
        assert_eq!(format_number(72.5), "72.5");
    }
}
