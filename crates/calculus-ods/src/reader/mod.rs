//! ODS reader

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use calculus_core::chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use calculus_core::{duration, Cell, CellValue, Properties, SheetState, Workbook};

use crate::error::{OdsError, OdsResult};
use crate::MIME_TYPE;

/// Repeated rows beyond this count are only skipped over
///
/// Office suites pad tables with a trailing run of empty rows that spans the
/// whole grid.
const MAX_REPEATED_ROWS: u32 = 65_536;
const MAX_REPEATED_COLUMNS: u32 = 16_384;
/// Upper bound on the cells a single row element expands to, repeats included
const MAX_REPEATED_CELLS: u64 = 1 << 20;
const MAX_SPACE_RUN: usize = 1024;

/// View settings from `settings.xml`
#[derive(Debug, Default)]
struct ViewSettings {
    active_table: Option<String>,
    show_sheet_tabs: Option<bool>,
    show_horizontal_scroll: Option<bool>,
    show_vertical_scroll: Option<bool>,
}

/// ODS file reader
pub struct OdsReader;

impl OdsReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> OdsResult<Workbook> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> OdsResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        if let Ok(mut file) = archive.by_name("mimetype") {
            let mut mime = String::new();
            file.read_to_string(&mut mime)?;
            if mime.trim() != MIME_TYPE {
                return Err(OdsError::InvalidFormat(format!(
                    "Unexpected media type {:?}",
                    mime.trim()
                )));
            }
        }

        let mut workbook = Workbook::new();
        *workbook.properties_mut() = Self::read_meta(&mut archive)?;
        Self::read_content(&mut archive, &mut workbook)?;

        let settings = Self::read_settings(&mut archive)?;
        if let Some(flag) = settings.show_sheet_tabs {
            workbook.show_sheet_tabs = flag;
        }
        if let Some(flag) = settings.show_horizontal_scroll {
            workbook.show_horizontal_scroll = flag;
        }
        if let Some(flag) = settings.show_vertical_scroll {
            workbook.show_vertical_scroll = flag;
        }

        if !workbook.is_empty() {
            workbook.set_active_index(0);
            if let Some(name) = settings.active_table {
                if workbook.set_active(&name).is_none() {
                    log::warn!("active table {:?} does not exist", name);
                }
            }
        }

        log::debug!("read ODS with {} tables", workbook.sheet_count());
        Ok(workbook)
    }

    fn read_content<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        workbook: &mut Workbook,
    ) -> OdsResult<()> {
        let file = archive
            .by_name("content.xml")
            .map_err(|_| OdsError::MissingPart("content.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        // Spaces inside <text:p> are significant
        xml_reader.trim_text(false);

        let mut state = ContentState::new(workbook);
        let mut buf = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => state.start(&e, false)?,
                Ok(Event::Empty(e)) => state.start(&e, true)?,
                Ok(Event::End(e)) => state.end(e.name().as_ref())?,
                Ok(Event::Text(e)) => {
                    if let Some(paragraph) = state.paragraph.as_mut() {
                        paragraph.push_str(&e.unescape()?);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OdsError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    fn read_meta<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> OdsResult<Properties> {
        let mut props = Properties::new();

        let file = match archive.by_name("meta.xml") {
            Ok(f) => f,
            Err(_) => return Ok(props),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut current: Option<Vec<u8>> = None;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => current = Some(e.name().as_ref().to_vec()),
                Ok(Event::End(_)) => current = None,
                Ok(Event::Text(e)) => {
                    let element = current.as_deref().unwrap_or_default();
                    let text = e.unescape()?.trim().to_string();
                    match element {
                        b"meta:generator" => props.application = text,
                        b"dc:title" => props.title = text,
                        b"dc:description" => props.description = text,
                        b"dc:subject" => props.subject = text,
                        b"meta:keyword" => props.keywords = text,
                        b"meta:initial-creator" => props.creator = text,
                        b"dc:creator" => props.last_modified_by = text,
                        b"meta:creation-date" => props.created = parse_timestamp(&text),
                        b"dc:date" => props.modified = parse_timestamp(&text),
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OdsError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(props)
    }

    /// Read the first occurrence of each view setting
    fn read_settings<R: Read + Seek>(archive: &mut zip::ZipArchive<R>) -> OdsResult<ViewSettings> {
        let mut settings = ViewSettings::default();

        let file = match archive.by_name("settings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(settings),
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut current: Option<String> = None;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) if e.name().as_ref() == b"config:config-item" => {
                    current = attr_value(&e, b"config:name");
                }
                Ok(Event::End(_)) => current = None,
                Ok(Event::Text(e)) => {
                    let text = e.unescape()?.trim().to_string();
                    match current.as_deref() {
                        Some("ActiveTable") if settings.active_table.is_none() => {
                            settings.active_table = Some(text)
                        }
                        Some("HasSheetTabs") if settings.show_sheet_tabs.is_none() => {
                            settings.show_sheet_tabs = Some(is_true(&text))
                        }
                        Some("HasHorizontalScrollBar")
                            if settings.show_horizontal_scroll.is_none() =>
                        {
                            settings.show_horizontal_scroll = Some(is_true(&text))
                        }
                        Some("HasVerticalScrollBar") if settings.show_vertical_scroll.is_none() => {
                            settings.show_vertical_scroll = Some(is_true(&text))
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OdsError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(settings)
    }
}

/// Row being read, applied to the sheet once closed
#[derive(Debug, Default)]
struct PendingRow {
    repeat: u32,
    hidden: bool,
    height: f64,
    cells: Vec<(u32, Cell)>,
}

/// Cell being read, converted once closed
#[derive(Debug, Default)]
struct PendingCell {
    repeat: u32,
    value_type: Option<String>,
    error: bool,
    value: Option<String>,
    date_value: Option<String>,
    time_value: Option<String>,
    boolean_value: Option<String>,
    string_value: Option<String>,
    formula: Option<String>,
    paragraphs: Vec<String>,
    annotation: Vec<String>,
}

impl PendingCell {
    fn from_element(e: &BytesStart<'_>) -> Self {
        let mut cell = PendingCell {
            repeat: 1,
            ..Default::default()
        };
        for attr in e.attributes().flatten() {
            let value = match attr.unescape_value() {
                Ok(v) => v.to_string(),
                Err(_) => continue,
            };
            match attr.key.as_ref() {
                b"table:number-columns-repeated" => cell.repeat = value.parse().unwrap_or(1).max(1),
                b"office:value-type" => cell.value_type = Some(value),
                b"calcext:value-type" => cell.error = value == "error",
                b"office:value" => cell.value = Some(value),
                b"office:date-value" => cell.date_value = Some(value),
                b"office:time-value" => cell.time_value = Some(value),
                b"office:boolean-value" => cell.boolean_value = Some(value),
                b"office:string-value" => cell.string_value = Some(value),
                b"table:formula" => cell.formula = Some(value),
                _ => {}
            }
        }
        cell
    }

    /// Build the cell, `None` when there is nothing to store
    fn into_cell(self) -> OdsResult<Option<Cell>> {
        let value = self.convert_value()?;
        if value.is_empty() && self.formula.is_none() && self.annotation.is_empty() {
            return Ok(None);
        }

        let mut cell = Cell::new(value);
        cell.set_formula(self.formula);
        if !self.annotation.is_empty() {
            cell.set_comment(Some(self.annotation.join("\n")));
        }
        Ok(Some(cell))
    }

    fn convert_value(&self) -> OdsResult<CellValue> {
        let text = || self.paragraphs.join("\n");

        if self.error {
            return Ok(CellValue::Error(text()));
        }

        let value_type = match self.value_type.as_deref() {
            Some(t) => t,
            None => return Ok(CellValue::Empty),
        };

        let value = match value_type {
            "float" | "currency" | "percentage" => {
                let raw = self.value.as_deref().unwrap_or_default();
                let n = raw
                    .parse::<f64>()
                    .map_err(|_| OdsError::Parse(format!("Invalid number {:?}", raw)))?;
                CellValue::Float(n)
            }
            "date" => {
                let raw = self.date_value.as_deref().unwrap_or_default();
                let d = parse_timestamp(raw)
                    .ok_or_else(|| OdsError::Parse(format!("Invalid date {:?}", raw)))?;
                CellValue::Date(d)
            }
            "time" => {
                let raw = self.time_value.as_deref().unwrap_or_default();
                let d = duration::parse(raw)
                    .map_err(|_| OdsError::Parse(format!("Invalid time {:?}", raw)))?;
                CellValue::Duration(d)
            }
            "boolean" => match self.boolean_value.as_deref() {
                Some(raw) => CellValue::Boolean(is_true(raw)),
                None => CellValue::Boolean(text().eq_ignore_ascii_case("true")),
            },
            "string" => match &self.string_value {
                Some(s) => CellValue::String(s.clone()),
                None => CellValue::String(text()),
            },
            other => {
                log::warn!("unknown value type {:?}, read as text", other);
                CellValue::String(text())
            }
        };
        Ok(value)
    }
}

/// Streaming state while walking `content.xml`
struct ContentState<'w> {
    workbook: &'w mut Workbook,
    hidden_tables: HashSet<String>,
    row_heights: HashMap<String, f64>,
    style_name: Option<String>,
    table: Option<usize>,
    row: u32,
    column: u32,
    pending_row: Option<PendingRow>,
    pending_cell: Option<PendingCell>,
    paragraph: Option<String>,
    in_annotation: bool,
}

impl<'w> ContentState<'w> {
    fn new(workbook: &'w mut Workbook) -> Self {
        Self {
            workbook,
            hidden_tables: HashSet::new(),
            row_heights: HashMap::new(),
            style_name: None,
            table: None,
            row: 0,
            column: 0,
            pending_row: None,
            pending_cell: None,
            paragraph: None,
            in_annotation: false,
        }
    }

    fn start(&mut self, e: &BytesStart<'_>, empty: bool) -> OdsResult<()> {
        match e.name().as_ref() {
            b"style:style" => {
                self.style_name = attr_value(e, b"style:name");
            }
            b"style:table-properties" => {
                if let Some(name) = &self.style_name {
                    if attr_value(e, b"table:display").as_deref() == Some("false") {
                        self.hidden_tables.insert(name.clone());
                    }
                }
            }
            b"style:table-row-properties" => {
                let optimal = attr_value(e, b"style:use-optimal-row-height")
                    .map_or(false, |v| is_true(&v));
                let height = attr_value(e, b"style:row-height").and_then(|v| parse_length(&v));
                if let (Some(name), Some(height), false) = (&self.style_name, height, optimal) {
                    self.row_heights.insert(name.clone(), height);
                }
            }
            b"table:table" => self.begin_table(e)?,
            b"table:table-row" if self.table.is_some() => {
                let row = PendingRow {
                    repeat: attr_value(e, b"table:number-rows-repeated")
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(1u32)
                        .max(1),
                    hidden: matches!(
                        attr_value(e, b"table:visibility").as_deref(),
                        Some("collapse") | Some("filter")
                    ),
                    height: attr_value(e, b"table:style-name")
                        .and_then(|name| self.row_heights.get(&name).copied())
                        .unwrap_or(0.0),
                    cells: Vec::new(),
                };
                self.pending_row = Some(row);
                self.column = 0;
                if empty {
                    self.end_row();
                }
            }
            b"table:table-cell" | b"table:covered-table-cell" if self.pending_row.is_some() => {
                self.pending_cell = Some(PendingCell::from_element(e));
                if empty {
                    self.end_cell()?;
                }
            }
            b"office:annotation" if self.pending_cell.is_some() => {
                self.in_annotation = !empty;
            }
            b"text:p" if self.pending_cell.is_some() => {
                if empty {
                    self.push_paragraph(String::new());
                } else {
                    self.paragraph = Some(String::new());
                }
            }
            b"text:s" => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    let mut count = attr_value(e, b"text:c")
                        .and_then(|v| v.parse::<usize>().ok())
                        .unwrap_or(1);
                    if count > MAX_SPACE_RUN {
                        log::warn!("run of {} spaces truncated to {}", count, MAX_SPACE_RUN);
                        count = MAX_SPACE_RUN;
                    }
                    paragraph.extend(std::iter::repeat(' ').take(count));
                }
            }
            b"text:tab" => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.push('\t');
                }
            }
            b"text:line-break" => {
                if let Some(paragraph) = self.paragraph.as_mut() {
                    paragraph.push('\n');
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, name: &[u8]) -> OdsResult<()> {
        match name {
            b"style:style" => self.style_name = None,
            b"table:table" => self.table = None,
            b"table:table-row" if self.pending_row.is_some() => self.end_row(),
            b"table:table-cell" | b"table:covered-table-cell" if self.pending_cell.is_some() => {
                self.end_cell()?
            }
            b"office:annotation" => self.in_annotation = false,
            b"text:p" => {
                if let Some(paragraph) = self.paragraph.take() {
                    self.push_paragraph(paragraph);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn begin_table(&mut self, e: &BytesStart<'_>) -> OdsResult<()> {
        let name = attr_value(e, b"table:name").unwrap_or_default();
        let hidden = attr_value(e, b"table:style-name")
            .map_or(false, |style| self.hidden_tables.contains(&style));

        let sheet = self.workbook.add_sheet(name)?;
        if hidden {
            sheet.set_state(SheetState::Hidden);
        }

        self.table = Some(self.workbook.sheet_count() - 1);
        self.row = 0;
        Ok(())
    }

    fn push_paragraph(&mut self, paragraph: String) {
        if let Some(cell) = self.pending_cell.as_mut() {
            if self.in_annotation {
                cell.annotation.push(paragraph);
            } else {
                cell.paragraphs.push(paragraph);
            }
        }
    }

    fn end_cell(&mut self) -> OdsResult<()> {
        let pending = match self.pending_cell.take() {
            Some(cell) => cell,
            None => return Ok(()),
        };
        self.in_annotation = false;
        self.paragraph = None;

        let repeat = pending.repeat;
        if let (Some(cell), Some(row)) = (pending.into_cell()?, self.pending_row.as_mut()) {
            let room = MAX_REPEATED_CELLS.saturating_sub(row.cells.len() as u64);
            let count = u64::from(repeat.min(MAX_REPEATED_COLUMNS)).min(room) as u32;
            if count < repeat {
                log::warn!("cell repeated {} times, truncated to {}", repeat, count);
            }
            for offset in 0..count {
                match self.column.checked_add(offset) {
                    Some(column) => row.cells.push((column, cell.clone())),
                    None => break,
                }
            }
        }
        self.column = self.column.saturating_add(repeat);
        Ok(())
    }

    fn end_row(&mut self) {
        let row = match self.pending_row.take() {
            Some(row) => row,
            None => return,
        };

        let carries_data = !row.cells.is_empty() || row.hidden || row.height > 0.0;
        if carries_data && row.repeat <= MAX_REPEATED_ROWS {
            let mut repeat = row.repeat;
            let total = u64::from(repeat) * row.cells.len() as u64;
            if total > MAX_REPEATED_CELLS {
                repeat = (MAX_REPEATED_CELLS / row.cells.len() as u64).max(1) as u32;
                log::warn!(
                    "row of {} cells repeated {} times, truncated to {} rows",
                    row.cells.len(),
                    row.repeat,
                    repeat
                );
            }
            if let Some(sheet) = self.table.and_then(|i| self.workbook.sheet_at_mut(i)) {
                for offset in 0..repeat {
                    let index = match self.row.checked_add(offset) {
                        Some(index) => index,
                        None => {
                            log::warn!("rows past the last addressable row dropped");
                            break;
                        }
                    };
                    for (column, cell) in &row.cells {
                        sheet.rows_mut().set_cell(index, *column, cell.clone());
                    }
                    if row.hidden {
                        sheet.set_row_hidden(index, true);
                    }
                    if row.height > 0.0 {
                        sheet.set_row_height(index, row.height);
                    }
                }
            }
        } else if carries_data {
            log::warn!(
                "skipped {} repeated rows at row {}",
                row.repeat,
                self.row.saturating_add(1)
            );
        }

        self.row = self.row.saturating_add(row.repeat);
    }
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

/// Length such as `0.1783in` or `12.5pt`, in points
fn parse_length(text: &str) -> Option<f64> {
    let split = text
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let value: f64 = number.trim().parse().ok()?;
    let factor = match unit {
        "pt" | "" => 1.0,
        "in" => 72.0,
        "cm" => 72.0 / 2.54,
        "mm" => 72.0 / 25.4,
        "pc" => 12.0,
        "px" => 0.75,
        _ => return None,
    };
    Some(value * factor)
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
    use calculus_core::chrono::{Duration, TimeZone};
    use std::io::{Cursor, Write};

    fn package(content: &str, extra: &[(&str, &str)]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();
            zip.start_file("mimetype", options).unwrap();
            zip.write_all(MIME_TYPE.as_bytes()).unwrap();
            zip.start_file("content.xml", options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
            for (name, data) in extra {
                zip.start_file(*name, options).unwrap();
                zip.write_all(data.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        buf
    }

    fn document(automatic_styles: &str, tables: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:calcext="urn:org:documentfoundation:names:experimental:calc:xmlns:calcext:1.0">
<office:automatic-styles>{}</office:automatic-styles>
<office:body><office:spreadsheet>{}</office:spreadsheet></office:body>
</office:document-content>"#,
            automatic_styles, tables
        )
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length("12.5pt"), Some(12.5));
        assert_eq!(parse_length("1in"), Some(72.0));
        assert_eq!(parse_length("2.54cm"), Some(72.0));
        assert_eq!(parse_length("1pc"), Some(12.0));
        assert_eq!(parse_length("3em"), None);
        assert_eq!(parse_length("wide"), None);
    }

    #[test]
    fn test_convert_value() {
        let cell = |value_type: &str| PendingCell {
            value_type: Some(value_type.to_string()),
            ..Default::default()
        };

        let number = PendingCell {
            value: Some("0.25".into()),
            ..cell("percentage")
        };
        assert_eq!(number.convert_value().unwrap(), CellValue::Float(0.25));

        let bad = PendingCell {
            value: Some("abc".into()),
            ..cell("float")
        };
        assert!(matches!(bad.convert_value(), Err(OdsError::Parse(_))));

        let date = PendingCell {
            date_value: Some("2019-08-13".into()),
            ..cell("date")
        };
        assert_eq!(
            date.convert_value().unwrap(),
            CellValue::Date(Utc.with_ymd_and_hms(2019, 8, 13, 0, 0, 0).unwrap())
        );

        let time = PendingCell {
            time_value: Some("PT12H30M".into()),
            ..cell("time")
        };
        assert_eq!(
            time.convert_value().unwrap(),
            CellValue::Duration(Duration::minutes(750))
        );

        let text = PendingCell {
            paragraphs: vec!["one".into(), "two".into()],
            ..cell("string")
        };
        assert_eq!(text.convert_value().unwrap(), CellValue::string("one\ntwo"));

        let error = PendingCell {
            error: true,
            paragraphs: vec!["#DIV/0!".into()],
            ..cell("string")
        };
        assert_eq!(error.convert_value().unwrap(), CellValue::error("#DIV/0!"));

        let blank = PendingCell {
            paragraphs: vec!["ignored".into()],
            ..Default::default()
        };
        assert_eq!(blank.convert_value().unwrap(), CellValue::Empty);
    }

    #[test]
    fn test_read_repeats_and_metadata() {
        let styles = r#"<style:style style:name="ta1" style:family="table"><style:table-properties table:display="false"/></style:style><style:style style:name="ro1" style:family="table-row"><style:table-row-properties style:row-height="0.5in" style:use-optimal-row-height="false"/></style:style><style:style style:name="ro2" style:family="table-row"><style:table-row-properties style:row-height="0.178in" style:use-optimal-row-height="true"/></style:style>"#;
        let tables = r#"<table:table table:name="Data"><table:table-column table:number-columns-repeated="3"/><table:table-row table:style-name="ro1"><table:table-cell table:number-columns-repeated="2"/><table:table-cell office:value-type="float" office:value="7"><text:p>7</text:p></table:table-cell></table:table-row><table:table-row table:number-rows-repeated="2" table:visibility="collapse"><table:table-cell office:value-type="string" table:number-columns-repeated="2"><text:p>x<text:s text:c="2"/>y</text:p></table:table-cell></table:table-row><table:table-row table:style-name="ro2" table:number-rows-repeated="1048572"><table:table-cell table:number-columns-repeated="1024"/></table:table-row></table:table><table:table table:name="Hidden" table:style-name="ta1"/>"#;

        let bytes = package(&document(styles, tables), &[]);
        let workbook = OdsReader::read(Cursor::new(bytes)).unwrap();

        assert_eq!(workbook.sheet_count(), 2);
        assert_eq!(workbook.active_sheet().map(|s| s.name()), Some("Data"));
        assert_eq!(workbook.sheet("Hidden").unwrap().state(), SheetState::Hidden);

        let sheet = workbook.sheet("Data").unwrap();
        assert_eq!(sheet.value_by_ref("C1"), Some(&CellValue::Float(7.0)));
        assert!(sheet.cell(0, 0).is_none());
        assert_eq!(sheet.row_height(0), 36.0);
        for reference in ["A2", "B2", "A3", "B3"] {
            assert_eq!(sheet.value_by_ref(reference), Some(&CellValue::string("x  y")));
        }
        assert!(sheet.is_row_hidden(1));
        assert!(sheet.is_row_hidden(2));
        assert!(!sheet.is_row_hidden(3));
        assert_eq!(sheet.row_height(3), 0.0);
        assert_eq!(sheet.rows().len(), 3);
    }

    #[test]
    fn test_read_formula_annotation_and_settings() {
        let tables = r#"<table:table table:name="First"><table:table-row><table:table-cell/></table:table-row></table:table><table:table table:name="Second"><table:table-row><table:table-cell table:formula="of:=[.B1]*2" office:value-type="float" office:value="4"><office:annotation><dc:creator xmlns:dc="http://purl.org/dc/elements/1.1/">me</dc:creator><text:p>first line</text:p><text:p>second</text:p></office:annotation><text:p>4</text:p></table:table-cell><table:table-cell office:value-type="boolean" office:boolean-value="true"><text:p>TRUE</text:p></table:table-cell></table:table-row></table:table>"#;
        let settings = r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-settings xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:config="urn:oasis:names:tc:opendocument:xmlns:config:1.0"><office:settings><config:config-item-set config:name="ooo:view-settings"><config:config-item-map-indexed config:name="Views"><config:config-item-map-entry><config:config-item config:name="ActiveTable" config:type="string">Second</config:config-item><config:config-item config:name="HasSheetTabs" config:type="boolean">false</config:config-item></config:config-item-map-entry></config:config-item-map-indexed></config:config-item-set></office:settings></office:document-settings>"#;
        let meta = r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-meta xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:meta="urn:oasis:names:tc:opendocument:xmlns:meta:1.0" xmlns:dc="http://purl.org/dc/elements/1.1/"><office:meta><meta:generator>LibreOffice/6.4</meta:generator><dc:title>Report</dc:title><meta:initial-creator>Ana</meta:initial-creator><dc:creator>Bo</dc:creator><meta:creation-date>2020-01-02T03:04:05.123</meta:creation-date></office:meta></office:document-meta>"#;

        let bytes = package(
            &document("", tables),
            &[("settings.xml", settings), ("meta.xml", meta)],
        );
        let workbook = OdsReader::read(Cursor::new(bytes)).unwrap();

        assert_eq!(workbook.active_sheet().map(|s| s.name()), Some("Second"));
        assert!(!workbook.show_sheet_tabs);
        assert!(workbook.show_vertical_scroll);

        let cell = workbook.sheet("Second").unwrap().cell(0, 0).unwrap();
        assert_eq!(cell.value(), &CellValue::Float(4.0));
        assert_eq!(cell.formula(), Some("of:=[.B1]*2"));
        assert_eq!(cell.comment(), Some("first line\nsecond"));
        assert_eq!(
            workbook.sheet("Second").unwrap().value(0, 1),
            Some(&CellValue::Boolean(true))
        );

        let props = workbook.properties();
        assert_eq!(props.application, "LibreOffice/6.4");
        assert_eq!(props.title, "Report");
        assert_eq!(props.creator, "Ana");
        assert_eq!(props.last_modified_by, "Bo");
        assert_eq!(
            props.created.map(|d| d.timestamp_subsec_millis()),
            Some(123)
        );
    }

    #[test]
    fn test_read_rows_past_last_addressable_row() {
        let tables = r#"<table:table table:name="Edge"><table:table-row table:number-rows-repeated="4294967295"><table:table-cell/></table:table-row><table:table-row table:number-rows-repeated="2"><table:table-cell office:value-type="string"><text:p>end</text:p></table:table-cell></table:table-row></table:table>"#;

        let bytes = package(&document("", tables), &[]);
        let workbook = OdsReader::read(Cursor::new(bytes)).unwrap();

        let sheet = workbook.sheet("Edge").unwrap();
        assert_eq!(sheet.rows().len(), 1);
        assert_eq!(sheet.value(u32::MAX, 0), Some(&CellValue::string("end")));
        assert!(sheet.cell(0, 0).is_none());
    }

    #[test]
    fn test_read_caps_repeated_content() {
        let tables = r#"<table:table table:name="Wide"><table:table-row table:number-rows-repeated="65536"><table:table-cell office:value-type="float" office:value="1" table:number-columns-repeated="16384"><text:p>1</text:p></table:table-cell></table:table-row><table:table-row><table:table-cell office:value-type="string"><text:p>a<text:s text:c="18446744073709551615"/>b</text:p></table:table-cell></table:table-row></table:table>"#;

        let bytes = package(&document("", tables), &[]);
        let workbook = OdsReader::read(Cursor::new(bytes)).unwrap();

        let sheet = workbook.sheet("Wide").unwrap();
        let cells: usize = sheet.rows().iter().map(|(_, row)| row.len()).sum();
        assert!(cells as u64 <= MAX_REPEATED_CELLS + 1);
        assert_eq!(sheet.value(0, 16_383), Some(&CellValue::Float(1.0)));
        assert!(sheet.cell(64, 0).is_none());

        let text = sheet.value(65_536, 0).unwrap().to_text();
        assert_eq!(text.len(), MAX_SPACE_RUN + 2);
        assert!(text.starts_with("a ") && text.ends_with(" b"));
    }

    #[test]
    fn test_read_rejects_foreign_packages() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();
            zip.start_file("mimetype", options).unwrap();
            zip.write_all(b"application/vnd.oasis.opendocument.text").unwrap();
            zip.finish().unwrap();
        }
        assert!(matches!(
            OdsReader::read(Cursor::new(buf)),
            Err(OdsError::InvalidFormat(_))
        ));

        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            zip.start_file("meta.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"<office:document-meta/>").unwrap();
            zip.finish().unwrap();
        }
        assert!(matches!(
            OdsReader::read(Cursor::new(buf)),
            Err(OdsError::MissingPart(_))
        ));
    }
}
