//! Tabular directory parsing.
//!
//! The provider exports the directory as an Excel workbook. Only the first
//! sheet is read; its header row names the columns. Some mirrors serve the same
//! table as CSV, which is detected by the absence of a workbook signature.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::error_handling::ParseError;
use crate::models::CameraRecord;

const COL_ID: &str = "CCTVID";
const COL_NAME: &str = "CCTVNAME";
const COL_CENTER: &str = "CENTERNAME";
const COL_LNG: &str = "XCOORD";
const COL_LAT: &str = "YCOORD";

/// ZIP container signature (xlsx)
const XLSX_MAGIC: &[u8] = b"PK\x03\x04";
/// OLE compound document signature (legacy xls)
const XLS_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parses a directory document, returning an empty list if it is unreadable.
///
/// Rows that fail validation are dropped silently; an unreadable document is
/// logged and yields no records so the refresher can fall back.
pub fn parse_directory(bytes: &[u8]) -> Vec<CameraRecord> {
    match try_parse_directory(bytes) {
        Ok(records) => records,
        Err(e) => {
            log::error!("Failed to parse directory document: {}", e);
            Vec::new()
        }
    }
}

/// Parses a directory document.
///
/// # Errors
///
/// Returns a `ParseError` only when the document as a whole cannot be read
/// (not a workbook or CSV, no sheets, or required columns missing).
pub fn try_parse_directory(bytes: &[u8]) -> Result<Vec<CameraRecord>, ParseError> {
    let rows = if is_workbook(bytes) {
        read_workbook_rows(bytes)?
    } else {
        read_csv_rows(bytes)?
    };

    let mut rows = rows.into_iter();
    let header = rows.next().ok_or(ParseError::Empty)?;
    let columns = ColumnMap::from_header(&header)?;

    let mut total = 0usize;
    let records: Vec<CameraRecord> = rows
        .inspect(|_| total += 1)
        .map(|row| columns.to_record(&row))
        .filter(CameraRecord::is_valid)
        .collect();

    log::info!(
        "Parsed directory document: {} rows, {} valid cameras",
        total,
        records.len()
    );
    for record in records.iter().take(3) {
        log::debug!(
            "  {} ({}, {}) - {}",
            record.name,
            record.lat,
            record.lng,
            record.center
        );
    }

    Ok(records)
}

fn is_workbook(bytes: &[u8]) -> bool {
    bytes.starts_with(XLSX_MAGIC) || bytes.starts_with(XLS_MAGIC)
}

fn read_workbook_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>, ParseError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook.worksheet_range_at(0).ok_or(ParseError::NoSheet)??;
    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn read_csv_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>, ParseError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| String::from_utf8_lossy(field).trim().to_string())
                .collect(),
        );
    }
    Ok(rows)
}

/// Column positions resolved from the header row.
struct ColumnMap {
    id: usize,
    name: usize,
    center: Option<usize>,
    lng: usize,
    lat: usize,
}

impl ColumnMap {
    fn from_header(header: &[String]) -> Result<Self, ParseError> {
        let find = |name: &str| header.iter().position(|h| h.trim() == name);
        let require = |name: &'static str| find(name).ok_or(ParseError::MissingColumn(name));

        Ok(ColumnMap {
            id: require(COL_ID)?,
            name: require(COL_NAME)?,
            center: find(COL_CENTER),
            lng: require(COL_LNG)?,
            lat: require(COL_LAT)?,
        })
    }

    fn to_record(&self, row: &[String]) -> CameraRecord {
        let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or("");
        CameraRecord {
            id: cell(self.id).to_string(),
            name: cell(self.name).to_string(),
            center: self.center.map(cell).unwrap_or("").to_string(),
            lng: parse_coordinate(cell(self.lng)),
            lat: parse_coordinate(cell(self.lat)),
        }
    }
}

/// Coerces a coordinate cell to a float, substituting 0 on failure.
///
/// Accepts the longest leading numeric prefix (`"127.1089 E"` parses as
/// `127.1089`, `"1.2.3"` as `1.2`).
fn parse_coordinate(text: &str) -> f64 {
    let text = text.trim();
    let value = text.parse::<f64>().ok().or_else(|| {
        let mut seen_dot = false;
        let end = text
            .char_indices()
            .find(|&(i, c)| match c {
                '0'..='9' => false,
                '.' if !seen_dot => {
                    seen_dot = true;
                    false
                }
                '-' | '+' => i != 0,
                _ => true,
            })
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        text[..end].parse::<f64>().ok()
    });
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    const HEADER: &str = "CENTERNAME,CCTVID,CCTVNAME,XCOORD,YCOORD,KIND";

    fn csv(rows: &[&str]) -> Vec<u8> {
        let mut doc = String::from(HEADER);
        for row in rows {
            doc.push('\n');
            doc.push_str(row);
        }
        doc.into_bytes()
    }

    #[test]
    fn test_maps_columns_by_header() {
        let doc = csv(&["KBS 재난포털,L933113,강원 강릉 용강동,128.8760,37.7519,KB"]);
        let records = try_parse_directory(&doc).expect("valid CSV");
        assert_eq!(
            records,
            vec![CameraRecord {
                id: "L933113".to_string(),
                name: "강원 강릉 용강동".to_string(),
                center: "KBS 재난포털".to_string(),
                lat: 37.7519,
                lng: 128.8760,
            }]
        );
    }

    #[test]
    fn test_drops_invalid_rows_and_keeps_order() {
        let doc = csv(&[
            "A,E1,first,127.0,37.0,E",
            "A,,no id,127.0,37.0,E",
            "A,E2,,127.0,37.0,E",
            "A,E3,zero lat,127.0,0,E",
            "A,E4,bad lng,abc,37.0,E",
            "A,E5,second,126.5,36.5,E",
            "A,E6,missing cells",
        ]);
        let records = try_parse_directory(&doc).expect("valid CSV");
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["E1", "E5"]);
    }

    #[test]
    fn test_center_column_is_optional() {
        let doc = b"CCTVID,CCTVNAME,XCOORD,YCOORD\nL1,name,127.0,37.0\n";
        let records = try_parse_directory(doc).expect("valid CSV");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].center, "");
    }

    #[test]
    fn test_strips_bom() {
        let mut doc = UTF8_BOM.to_vec();
        doc.extend_from_slice(b"CCTVID,CCTVNAME,XCOORD,YCOORD\nL1,name,127.0,37.0\n");
        assert_eq!(try_parse_directory(&doc).expect("valid CSV").len(), 1);
    }

    #[test]
    fn test_missing_required_column() {
        let doc = b"CCTVID,CCTVNAME,XCOORD\nL1,name,127.0\n";
        assert!(matches!(
            try_parse_directory(doc),
            Err(ParseError::MissingColumn("YCOORD"))
        ));
    }

    #[test]
    fn test_empty_document() {
        assert!(matches!(try_parse_directory(b""), Err(ParseError::Empty)));
        assert!(parse_directory(b"").is_empty());
    }

    #[test]
    fn test_garbage_document_yields_empty_list() {
        let garbage = b"<html><body>Service temporarily unavailable</body></html>";
        assert!(try_parse_directory(garbage).is_err());
        assert!(parse_directory(garbage).is_empty());
    }

    const WORKBOOK_HEADER: [&str; 5] = ["CENTERNAME", "CCTVID", "CCTVNAME", "XCOORD", "YCOORD"];

    /// Two-sheet xlsx export: cameras on the first sheet, unrelated rows on the second.
    fn workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();
        {
            let sheet = workbook.add_worksheet();
            sheet.set_name("CCTV").expect("sheet name");
            for (col, title) in WORKBOOK_HEADER.iter().enumerate() {
                sheet.write_string(0, col as u16, *title).expect("header cell");
            }
            // Text cells throughout
            sheet.write_string(1, 0, "KBS 재난포털").expect("cell");
            sheet.write_string(1, 1, "L933113").expect("cell");
            sheet.write_string(1, 2, "강원 강릉 용강동").expect("cell");
            sheet.write_number(1, 3, 128.876).expect("cell");
            sheet.write_number(1, 4, 37.7519).expect("cell");
            // Numeric id, coordinates stored as text
            sheet.write_string(2, 0, "서울특별시").expect("cell");
            sheet.write_number(2, 1, 12345.0).expect("cell");
            sheet.write_string(2, 2, "강남역 사거리").expect("cell");
            sheet.write_string(2, 3, "127.0276").expect("cell");
            sheet.write_string(2, 4, "37.4979 N").expect("cell");
            // Zero coordinates are dropped
            sheet.write_string(3, 0, "서울특별시").expect("cell");
            sheet.write_string(3, 1, "L010001").expect("cell");
            sheet.write_string(3, 2, "좌표 없음").expect("cell");
            sheet.write_number(3, 3, 0.0).expect("cell");
            sheet.write_number(3, 4, 0.0).expect("cell");
        }
        {
            let other = workbook.add_worksheet();
            other.set_name("Notes").expect("sheet name");
            for (col, title) in WORKBOOK_HEADER.iter().enumerate() {
                other.write_string(0, col as u16, *title).expect("header cell");
            }
            other.write_string(1, 0, "기타").expect("cell");
            other.write_string(1, 1, "L999999").expect("cell");
            other.write_string(1, 2, "second sheet").expect("cell");
            other.write_number(1, 3, 127.0).expect("cell");
            other.write_number(1, 4, 37.0).expect("cell");
        }
        workbook.save_to_buffer().expect("workbook should serialize")
    }

    #[test]
    fn test_reads_first_sheet_of_workbook() {
        let doc = workbook();
        assert!(is_workbook(&doc));

        let records = try_parse_directory(&doc).expect("valid workbook");
        assert_eq!(
            records,
            vec![
                CameraRecord {
                    id: "L933113".to_string(),
                    name: "강원 강릉 용강동".to_string(),
                    center: "KBS 재난포털".to_string(),
                    lat: 37.7519,
                    lng: 128.876,
                },
                CameraRecord {
                    id: "12345".to_string(),
                    name: "강남역 사거리".to_string(),
                    center: "서울특별시".to_string(),
                    lat: 37.4979,
                    lng: 127.0276,
                },
            ]
        );
        assert!(records.iter().all(|r| r.id != "L999999"));
    }

    #[test]
    fn test_corrupt_workbook_is_parse_error() {
        let mut doc = XLSX_MAGIC.to_vec();
        doc.extend_from_slice(&[0u8; 64]);
        assert!(matches!(
            try_parse_directory(&doc),
            Err(ParseError::Workbook(_))
        ));
        assert!(parse_directory(&doc).is_empty());
    }

    #[test]
    fn test_parse_coordinate() {
        assert_eq!(parse_coordinate("127.1089"), 127.1089);
        assert_eq!(parse_coordinate(" 37.5 "), 37.5);
        assert_eq!(parse_coordinate("127.1089 E"), 127.1089);
        assert_eq!(parse_coordinate("-12.5x"), -12.5);
        assert_eq!(parse_coordinate("1.2.3"), 1.2);
        assert_eq!(parse_coordinate("37.5665.1 N"), 37.5665);
        assert_eq!(parse_coordinate("-.5deg"), -0.5);
        assert_eq!(parse_coordinate("."), 0.0);
        assert_eq!(parse_coordinate("1-2"), 1.0);
        assert_eq!(parse_coordinate(""), 0.0);
        assert_eq!(parse_coordinate("abc"), 0.0);
        assert_eq!(parse_coordinate("NaN"), 0.0);
        assert_eq!(parse_coordinate("inf"), 0.0);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::String(" L1 ".to_string())), "L1");
        assert_eq!(cell_text(&Data::Float(127.25)), "127.25");
        assert_eq!(cell_text(&Data::Int(42)), "42");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}
