//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use calculus_core::chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use calculus_core::{date, CellAddress, CellValue, Properties, Sheet, SheetState, Style, Workbook};

use crate::error::{XlsxError, XlsxResult};
use crate::styles::read_styles_xml;

/// Decode `_xHHHH_` escapes used for control characters in cell text
///
/// `_x000D_` is a carriage return, `_x005F_` a literal underscore. Sequences
/// that are not exactly four hex digits between `_x` and `_` are kept as is.
fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);
        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push('_');
                rest = &candidate[1..];
            }
        }
    }
    result.push_str(rest);
    result
}

/// Sheet entry from `workbook.xml`
#[derive(Debug)]
struct SheetEntry {
    name: String,
    rel_id: String,
    state: SheetState,
}

/// Workbook-level settings from `workbook.xml`
#[derive(Debug)]
struct WorkbookInfo {
    app_name: String,
    date1904: bool,
    show_horizontal_scroll: bool,
    show_vertical_scroll: bool,
    show_sheet_tabs: bool,
    active_tab: usize,
    sheets: Vec<SheetEntry>,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;
        let styles = Self::read_styles(&mut archive)?;
        let shared_strings = Self::read_shared_strings(&mut archive)?;

        let mut workbook = Workbook::new();
        *workbook.properties_mut() = Self::read_doc_props(&mut archive)?;

        let props = workbook.properties_mut();
        if props.application.is_empty() {
            props.application = info.app_name.clone();
        }
        props.date1904 = info.date1904;
        workbook.show_horizontal_scroll = info.show_horizontal_scroll;
        workbook.show_vertical_scroll = info.show_vertical_scroll;
        workbook.show_sheet_tabs = info.show_sheet_tabs;

        for entry in &info.sheets {
            let path = match sheet_paths.get(&entry.rel_id) {
                Some(path) => path,
                None => {
                    log::warn!(
                        "sheet {:?} has no worksheet relationship {:?}, skipped",
                        entry.name,
                        entry.rel_id
                    );
                    continue;
                }
            };

            let sheet = workbook.add_sheet(entry.name.as_str())?;
            sheet.set_state(entry.state);
            Self::read_worksheet(
                &mut archive,
                path,
                sheet,
                &shared_strings,
                &styles,
                info.date1904,
            )?;
        }

        if !workbook.is_empty() {
            let active = info.active_tab.min(workbook.sheet_count() - 1);
            workbook.set_active_index(active);
        }

        log::debug!("read XLSX with {} sheets", workbook.sheet_count());
        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        // Leading and trailing spaces inside <t> are significant
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => current.clear(),
                    b"t" if !in_phonetic => in_t = true,
                    b"rPh" => in_phonetic = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => strings.push(String::new()),
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => strings.push(decode_excel_escapes(&current)),
                    b"t" => in_t = false,
                    b"rPh" => in_phonetic = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    if let Ok(text) = e.unescape() {
                        current.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_styles<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<Option<Arc<Style>>>> {
        match archive.by_name("xl/styles.xml") {
            Ok(file) => read_styles_xml(file),
            Err(_) => Ok(Vec::new()),
        }
    }

    /// Read workbook.xml: sheet list and workbook-wide settings
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<WorkbookInfo> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut info = WorkbookInfo {
            app_name: String::new(),
            date1904: false,
            show_horizontal_scroll: true,
            show_vertical_scroll: true,
            show_sheet_tabs: true,
            active_tab: 0,
            sheets: Vec::new(),
        };

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"fileVersion" => {
                        info.app_name = attr_value(&e, b"appName").unwrap_or_default();
                    }
                    b"workbookPr" => {
                        info.date1904 = attr_value(&e, b"date1904").map_or(false, |v| is_true(&v));
                    }
                    b"workbookView" => {
                        for attr in e.attributes().flatten() {
                            let value = match attr.unescape_value() {
                                Ok(v) => v,
                                Err(_) => continue,
                            };
                            match attr.key.as_ref() {
                                b"showHorizontalScroll" => {
                                    info.show_horizontal_scroll = is_true(&value)
                                }
                                b"showVerticalScroll" => info.show_vertical_scroll = is_true(&value),
                                b"showSheetTabs" => info.show_sheet_tabs = is_true(&value),
                                b"activeTab" => info.active_tab = value.parse().unwrap_or(0),
                                _ => {}
                            }
                        }
                    }
                    b"sheet" => {
                        let mut name = None;
                        let mut rel_id = None;
                        let mut state = SheetState::Visible;

                        for attr in e.attributes().flatten() {
                            match attr.key.as_ref() {
                                b"name" => {
                                    name = attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"r:id" => {
                                    rel_id = attr.unescape_value().ok().map(|s| s.to_string());
                                }
                                b"state" => {
                                    if let Ok(value) = attr.unescape_value() {
                                        state = value.parse().unwrap_or_else(|_| {
                                            log::warn!("unknown sheet state {:?}", value);
                                            SheetState::Visible
                                        });
                                    }
                                }
                                _ => {}
                            }
                        }

                        if let (Some(name), Some(rel_id)) = (name, rel_id) {
                            info.sheets.push(SheetEntry {
                                name,
                                rel_id,
                                state,
                            });
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(info)
    }

    /// Read workbook.xml.rels to get worksheet paths by relationship id
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.name().as_ref() == b"Relationship" =>
                {
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    let rel_type = attr_value(&e, b"Type");

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Relative targets resolve against xl/
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read docProps/core.xml and docProps/app.xml, both optional
    fn read_doc_props<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> XlsxResult<Properties> {
        let mut props = Properties::new();

        for part in ["docProps/core.xml", "docProps/app.xml"] {
            let file = match archive.by_name(part) {
                Ok(f) => f,
                Err(_) => continue,
            };

            let mut xml_reader = Reader::from_reader(BufReader::new(file));
            xml_reader.trim_text(true);

            let mut buf = Vec::new();
            let mut current: Option<Vec<u8>> = None;

            loop {
                match xml_reader.read_event_into(&mut buf) {
                    Ok(Event::Start(e)) => current = Some(e.local_name().as_ref().to_vec()),
                    Ok(Event::End(_)) => current = None,
                    Ok(Event::Text(e)) => {
                        let element = current.as_deref().unwrap_or_default();
                        let text = e.unescape()?.trim().to_string();
                        match element {
                            b"creator" => props.creator = text,
                            b"lastModifiedBy" => props.last_modified_by = text,
                            b"title" => props.title = text,
                            b"subject" => props.subject = text,
                            b"description" => props.description = text,
                            b"keywords" => props.keywords = text,
                            b"category" => props.category = text,
                            b"created" => props.created = parse_timestamp(&text),
                            b"modified" => props.modified = parse_timestamp(&text),
                            b"Application" => props.application = text,
                            _ => {}
                        }
                    }
                    Ok(Event::Eof) => break,
                    Err(e) => return Err(XlsxError::Xml(e)),
                    _ => {}
                }
                buf.clear();
            }
        }

        Ok(props)
    }

    /// Read a worksheet from the archive
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        sheet: &mut Sheet,
        shared_strings: &[String],
        styles: &[Option<Arc<Style>>],
        date1904: bool,
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();

        // Position used when `r` attributes are omitted
        let mut row_index: u32 = 0;
        let mut next_column: Option<u32> = Some(0);
        let mut rows_seen = false;

        let mut cell: Option<PendingCell> = None;
        let mut in_value = false;
        let mut in_formula = false;
        let mut in_inline_text = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"row" => {
                        Self::begin_row(&e, sheet, &mut row_index, &mut rows_seen)?;
                        next_column = Some(0);
                    }
                    b"c" => cell = Some(PendingCell::from_element(&e)),
                    b"v" if cell.is_some() => in_value = true,
                    b"f" if cell.is_some() => in_formula = true,
                    b"t" if cell.is_some() => in_inline_text = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) => match e.name().as_ref() {
                    b"row" => {
                        Self::begin_row(&e, sheet, &mut row_index, &mut rows_seen)?;
                        next_column = Some(0);
                    }
                    b"c" => {
                        let pending = PendingCell::from_element(&e);
                        next_column = pending.store(
                            sheet,
                            row_index,
                            next_column,
                            shared_strings,
                            styles,
                            date1904,
                        )?
                        .checked_add(1);
                    }
                    _ => {}
                },
                Ok(Event::Text(e)) if in_value || in_formula || in_inline_text => {
                    let text = e.unescape()?;
                    if let Some(pending) = cell.as_mut() {
                        let target = if in_value {
                            &mut pending.value
                        } else if in_formula {
                            &mut pending.formula
                        } else {
                            &mut pending.inline
                        };
                        target.get_or_insert_with(String::new).push_str(&text);
                    }
                }
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"c" => {
                        if let Some(pending) = cell.take() {
                            next_column = pending.store(
                                sheet,
                                row_index,
                                next_column,
                                shared_strings,
                                styles,
                                date1904,
                            )?
                            .checked_add(1);
                        }
                    }
                    b"v" => in_value = false,
                    b"f" => in_formula = false,
                    b"t" => in_inline_text = false,
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    /// Apply `<row>` attributes and move the row cursor
    fn begin_row(
        e: &BytesStart<'_>,
        sheet: &mut Sheet,
        row_index: &mut u32,
        rows_seen: &mut bool,
    ) -> XlsxResult<()> {
        let mut number: Option<u32> = None;
        let mut height: Option<f64> = None;
        let mut hidden = false;

        for attr in e.attributes().flatten() {
            let value = match attr.unescape_value() {
                Ok(v) => v,
                Err(_) => continue,
            };
            match attr.key.as_ref() {
                b"r" => number = value.parse().ok(),
                b"ht" => height = value.parse().ok(),
                b"hidden" => hidden = is_true(&value),
                _ => {}
            }
        }

        *row_index = match number {
            Some(r) => r.saturating_sub(1),
            None if *rows_seen => row_index
                .checked_add(1)
                .ok_or_else(|| XlsxError::Parse("Row past the last sheet row".to_string()))?,
            None => 0,
        };
        *rows_seen = true;

        if hidden {
            sheet.set_row_hidden(*row_index, true);
        }
        if let Some(h) = height {
            sheet.set_row_height(*row_index, h);
        }
        Ok(())
    }
}

/// A `<c>` element collected until its end tag
#[derive(Debug, Default)]
struct PendingCell {
    reference: Option<String>,
    kind: Option<String>,
    style: Option<u32>,
    value: Option<String>,
    formula: Option<String>,
    inline: Option<String>,
}

impl PendingCell {
    fn from_element(e: &BytesStart<'_>) -> Self {
        let mut cell = Self::default();
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => cell.reference = attr.unescape_value().ok().map(|s| s.to_string()),
                b"t" => cell.kind = attr.unescape_value().ok().map(|s| s.to_string()),
                b"s" => {
                    cell.style = attr
                        .unescape_value()
                        .ok()
                        .and_then(|s| s.parse::<u32>().ok());
                }
                _ => {}
            }
        }
        cell
    }

    /// Store the cell in the sheet, returning the column it landed in
    fn store(
        self,
        sheet: &mut Sheet,
        row_index: u32,
        next_column: Option<u32>,
        shared_strings: &[String],
        styles: &[Option<Arc<Style>>],
        date1904: bool,
    ) -> XlsxResult<u32> {
        let (row, column) = match &self.reference {
            Some(reference) => {
                let addr = CellAddress::parse(reference).map_err(|e| {
                    XlsxError::Parse(format!("Invalid cell reference '{}': {}", reference, e))
                })?;
                (addr.row, addr.column)
            }
            None => {
                let column = next_column.ok_or_else(|| {
                    XlsxError::Parse(format!(
                        "Cell past the last column in row {}",
                        row_index.saturating_add(1)
                    ))
                })?;
                (row_index, column)
            }
        };

        let raw = match self.kind.as_deref() {
            Some("inlineStr") => self.inline.as_deref().or(self.value.as_deref()),
            _ => self.value.as_deref(),
        };
        let value = match raw {
            Some(raw) => convert_value(self.kind.as_deref(), raw, shared_strings, date1904)?,
            None => CellValue::Empty,
        };

        let cell = sheet.set_value(row, column, value);
        if let Some(formula) = self.formula.filter(|f| !f.is_empty()) {
            cell.set_formula(Some(formula));
        }
        if let Some(index) = self.style.filter(|&s| s != 0) {
            match styles.get(index as usize) {
                Some(style) => cell.set_style(style.clone()),
                None => log::warn!("style index {} out of bounds", index),
            }
        }

        Ok(column)
    }
}

/// Convert the raw `<v>` text of a cell according to its `t` attribute
fn convert_value(
    kind: Option<&str>,
    raw: &str,
    shared_strings: &[String],
    date1904: bool,
) -> XlsxResult<CellValue> {
    let value = match kind {
        Some("s") => {
            let index: usize = raw.trim().parse().map_err(|_| {
                XlsxError::Parse(format!("Invalid shared string index: {}", raw))
            })?;
            let s = shared_strings.get(index).ok_or_else(|| {
                XlsxError::Parse(format!("Shared string index {} out of bounds", index))
            })?;
            CellValue::String(s.clone())
        }
        Some("b") => CellValue::Boolean(is_true(raw.trim())),
        Some("e") => CellValue::Error(raw.to_string()),
        Some("str") | Some("inlineStr") => CellValue::String(decode_excel_escapes(raw)),
        Some("d") => {
            let raw = raw.trim();
            let timestamp = match raw.parse::<f64>() {
                Ok(serial) => date::from_serial(serial, date1904),
                Err(_) => parse_timestamp(raw),
            };
            timestamp
                .map(CellValue::Date)
                .ok_or_else(|| XlsxError::Parse(format!("Failed to parse value as date: {:?}", raw)))?
        }
        None | Some("n") => raw
            .trim()
            .parse::<f64>()
            .map(CellValue::Float)
            .map_err(|_| XlsxError::Parse(format!("Failed to parse value as number: {:?}", raw)))?,
        Some(other) => {
            log::warn!("unknown cell type {:?}, read as string", other);
            CellValue::String(raw.to_string())
        }
    };
    Ok(value)
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.to_string()))
}

fn is_true(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// ISO-8601 timestamp, with or without offset, or a bare date
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|d| NaiveDateTime::from(d).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calculus_core::chrono::TimeZone;
    use std::io::{Cursor, Write};

    #[test]
    fn test_decode_excel_escapes() {
        assert_eq!(decode_excel_escapes("line_x000D__x000A_break"), "line\r\nbreak");
        assert_eq!(decode_excel_escapes("tab_x0009_here"), "tab\there");
        assert_eq!(decode_excel_escapes("under_x005F_score"), "under_score");
        assert_eq!(decode_excel_escapes("no escapes"), "no escapes");
        assert_eq!(decode_excel_escapes("_x00_ and _xZZZZ_"), "_x00_ and _xZZZZ_");
        assert_eq!(decode_excel_escapes("trailing_x"), "trailing_x");
    }

    #[test]
    fn test_convert_value() {
        let strings = vec!["Hello".to_string()];
        assert_eq!(
            convert_value(Some("s"), "0", &strings, false).unwrap(),
            CellValue::string("Hello")
        );
        assert!(convert_value(Some("s"), "1", &strings, false).is_err());
        assert_eq!(
            convert_value(Some("b"), "1", &strings, false).unwrap(),
            CellValue::Boolean(true)
        );
        assert_eq!(
            convert_value(None, "42", &strings, false).unwrap(),
            CellValue::Float(42.0)
        );
        assert_eq!(
            convert_value(Some("e"), "#N/A", &strings, false).unwrap(),
            CellValue::error("#N/A")
        );
        assert!(convert_value(Some("n"), "abc", &strings, false).is_err());

        let expected = Utc.with_ymd_and_hms(2019, 8, 13, 12, 13, 14).unwrap();
        assert_eq!(
            convert_value(Some("d"), "43690.50918981482", &strings, false).unwrap(),
            CellValue::Date(expected)
        );
        assert_eq!(
            convert_value(Some("d"), "2019-08-13T12:13:14Z", &strings, false).unwrap(),
            CellValue::Date(expected)
        );
    }

    #[test]
    fn test_read_minimal_xlsx() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();

            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#).unwrap();

            zip.start_file("xl/workbook.xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><fileVersion appName="xl"/><bookViews><workbookView activeTab="1"/></bookViews><sheets><sheet name="First" sheetId="1" r:id="rId7"/><sheet name="Second" sheetId="2" state="hidden" r:id="rId8"/></sheets></workbook>"#).unwrap();

            zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId7" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/a.xml"/><Relationship Id="rId8" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/b.xml"/></Relationships>"#).unwrap();

            zip.start_file("xl/worksheets/a.xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="2" ht="30" hidden="1"><c r="B2" t="inlineStr"><is><t xml:space="preserve"> padded </t></is></c><c t="str"><f>B2&amp;"!"</f><v> padded !</v></c></row></sheetData></worksheet>"#).unwrap();

            zip.start_file("xl/worksheets/b.xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData/></worksheet>"#).unwrap();

            zip.finish().unwrap();
        }

        let workbook = XlsxReader::read(Cursor::new(buf)).unwrap();
        assert_eq!(workbook.sheet_count(), 2);
        assert_eq!(workbook.properties().application, "xl");
        assert_eq!(workbook.active_sheet().map(|s| s.name()), Some("Second"));
        assert_eq!(workbook.sheet_at(1).unwrap().state(), SheetState::Hidden);

        let sheet = workbook.sheet("First").unwrap();
        assert!(sheet.is_row_hidden(1));
        assert_eq!(sheet.row_height(1), 30.0);
        assert_eq!(sheet.value_by_ref("B2"), Some(&CellValue::string(" padded ")));

        // A cell without a reference follows its predecessor
        let formula_cell = sheet.cell_by_ref("C2").unwrap().unwrap();
        assert_eq!(formula_cell.value(), &CellValue::string(" padded !"));
        assert_eq!(formula_cell.formula(), Some(r#"B2&"!""#));
    }

    fn single_sheet(sheet_data: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();

            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#).unwrap();

            zip.start_file("xl/workbook.xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Edge" sheetId="1" r:id="rId1"/></sheets></workbook>"#).unwrap();

            zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#).unwrap();

            zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
            write!(
                zip,
                r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
                sheet_data
            )
            .unwrap();

            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_read_cells_at_grid_edge() {
        let last = CellAddress::column_to_letters(u32::MAX);

        let data = format!(r#"<row r="1"><c r="{}1"><v>1</v></c></row>"#, last);
        let workbook = XlsxReader::read(Cursor::new(single_sheet(&data))).unwrap();
        assert_eq!(
            workbook.sheet("Edge").unwrap().value(0, u32::MAX),
            Some(&CellValue::Float(1.0))
        );

        let data = format!(r#"<row r="1"><c r="{}1"><v>1</v></c><c><v>2</v></c></row>"#, last);
        assert!(matches!(
            XlsxReader::read(Cursor::new(single_sheet(&data))),
            Err(XlsxError::Parse(_))
        ));

        let data = r#"<row r="4294967295"/><row><c><v>1</v></c></row><row/>"#;
        assert!(matches!(
            XlsxReader::read(Cursor::new(single_sheet(data))),
            Err(XlsxError::Parse(_))
        ));
    }

    #[test]
    fn test_read_rejects_non_ooxml_zip() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            zip.start_file("hello.txt", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"hello").unwrap();
            zip.finish().unwrap();
        }
        assert!(matches!(
            XlsxReader::read(Cursor::new(buf)),
            Err(XlsxError::InvalidFormat(_))
        ));
    }
}
