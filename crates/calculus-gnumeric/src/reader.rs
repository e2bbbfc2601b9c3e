//! GNumeric reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use calculus_core::{date, Cell, CellAddress, CellValue, Properties, SheetState, Workbook};

use crate::error::{GnumericError, GnumericResult};
use crate::value_type::ValueType;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Longest run of rows a single `RowInfo` may describe
const MAX_ROW_INFO_COUNT: u32 = 65_536;

/// How a numeric cell is rendered, from its `ValueFormat`
#[derive(Debug, Clone, Copy, PartialEq)]
enum NumberKind {
    Plain,
    Date,
    Elapsed,
}

impl NumberKind {
    fn from_format(format: &str) -> Self {
        if format.starts_with("[h]") || format.starts_with("[H]") {
            return NumberKind::Elapsed;
        }

        // Quoted literals and bracketed sections do not count
        let mut in_quotes = false;
        let mut in_brackets = false;
        for ch in format.chars() {
            match ch {
                '"' => in_quotes = !in_quotes,
                '[' if !in_quotes => in_brackets = true,
                ']' if !in_quotes => in_brackets = false,
                'd' | 'D' | 'y' | 'Y' if !in_quotes && !in_brackets => return NumberKind::Date,
                _ => {}
            }
        }
        NumberKind::Plain
    }
}

/// GNumeric file reader
pub struct GnumericReader;

impl GnumericReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> GnumericResult<Workbook> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a workbook from a reader
    ///
    /// Gzip-compressed and plain XML documents are both accepted.
    pub fn read<R: Read>(reader: R) -> GnumericResult<Workbook> {
        let mut reader = BufReader::new(reader);
        let compressed = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
        if compressed {
            Self::read_xml(BufReader::new(GzDecoder::new(reader)))
        } else {
            Self::read_xml(reader)
        }
    }

    fn read_xml<B: BufRead>(input: B) -> GnumericResult<Workbook> {
        let mut xml_reader = Reader::from_reader(input);
        // Cell text keeps its surrounding spaces
        xml_reader.trim_text(false);

        let mut state = DocumentState::default();
        let mut buf = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    state.start(&e)?;
                    state.path.push(e.local_name().as_ref().to_vec());
                    state.text.clear();
                }
                Ok(Event::Empty(e)) => {
                    state.start(&e)?;
                    state.text.clear();
                    state.end(e.local_name().as_ref())?;
                }
                Ok(Event::End(e)) => {
                    state.path.pop();
                    state.end(e.local_name().as_ref())?;
                    state.text.clear();
                }
                Ok(Event::Text(e)) => state.text.push_str(&e.unescape()?),
                Ok(Event::Eof) => break,
                Err(e) => return Err(GnumericError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        state.finish()
    }
}

/// Cell being read, stored once closed
#[derive(Debug)]
struct PendingCell {
    row: u32,
    column: u32,
    value_type: Option<ValueType>,
    number_kind: NumberKind,
    expr_id: Option<String>,
}

/// Numeric cell to turn into a date or duration once the date system is known
#[derive(Debug)]
struct TemporalCell {
    sheet: usize,
    row: u32,
    column: u32,
    serial: f64,
    kind: NumberKind,
}

#[derive(Debug, Default)]
struct DocumentState {
    workbook: Workbook,
    props: Properties,
    seen_root: bool,
    path: Vec<Vec<u8>>,
    text: String,
    item_name: String,
    item_value: String,
    sheet: Option<usize>,
    visibility: SheetState,
    cell: Option<PendingCell>,
    expressions: HashMap<String, String>,
    temporal: Vec<TemporalCell>,
    selected_tab: usize,
    date1904: bool,
}

impl DocumentState {
    fn parent(&self) -> &[u8] {
        self.path.last().map(Vec::as_slice).unwrap_or_default()
    }

    fn start(&mut self, e: &BytesStart<'_>) -> GnumericResult<()> {
        let name = e.local_name();
        if !self.seen_root {
            if name.as_ref() != b"Workbook" {
                return Err(GnumericError::InvalidFormat(format!(
                    "Unexpected root element {}",
                    String::from_utf8_lossy(name.as_ref())
                )));
            }
            self.seen_root = true;
            return Ok(());
        }

        match name.as_ref() {
            b"Sheet" if self.parent() == b"Sheets" => {
                self.sheet = None;
                self.visibility = match attr_value(e, b"Visibility").as_deref() {
                    Some("GNM_SHEET_VISIBILITY_HIDDEN") => SheetState::Hidden,
                    Some("GNM_SHEET_VISIBILITY_VERY_HIDDEN") => SheetState::VeryHidden,
                    _ => SheetState::Visible,
                };
            }
            b"RowInfo" => self.row_info(e),
            b"Cell" if self.parent() == b"Cells" => {
                self.cell = Some(PendingCell {
                    row: parse_index(e, b"Row")?,
                    column: parse_index(e, b"Col")?,
                    value_type: attr_value(e, b"ValueType")
                        .and_then(|v| v.parse().ok())
                        .and_then(ValueType::from_code),
                    number_kind: attr_value(e, b"ValueFormat")
                        .map_or(NumberKind::Plain, |f| NumberKind::from_format(&f)),
                    expr_id: attr_value(e, b"ExprID"),
                });
            }
            b"CellComment" => self.cell_comment(e),
            b"UIData" => {
                self.selected_tab = attr_value(e, b"SelectedTab")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
            }
            b"Calculation" => {
                self.date1904 = attr_value(e, b"DateConvention")
                    .map_or(false, |v| v.contains("1904"));
            }
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, name: &[u8]) -> GnumericResult<()> {
        let text = std::mem::take(&mut self.text);
        match name {
            b"name" => self.item_name = text.trim().to_string(),
            b"value" | b"val-string" | b"val-int" => self.item_value = text.trim().to_string(),
            b"Attribute" => {
                let flag = self.item_value.eq_ignore_ascii_case("TRUE");
                match self.item_name.as_str() {
                    "WorkbookView::show_horizontal_scrollbar" => {
                        self.workbook.show_horizontal_scroll = flag
                    }
                    "WorkbookView::show_vertical_scrollbar" => {
                        self.workbook.show_vertical_scroll = flag
                    }
                    "WorkbookView::show_notebook_tabs" => self.workbook.show_sheet_tabs = flag,
                    _ => {}
                }
            }
            b"Item" => {
                let value = std::mem::take(&mut self.item_value);
                match self.item_name.as_str() {
                    "application" => self.props.application = value,
                    "author" => self.props.creator = value,
                    "last_author" => self.props.last_modified_by = value,
                    "title" => self.props.title = value,
                    "category" => self.props.category = value,
                    "keywords" => self.props.keywords = value,
                    "comments" => self.props.description = value,
                    _ => {}
                }
            }
            b"Name" if self.parent() == b"Sheet" && self.sheet.is_none() => {
                let sheet = self.workbook.add_sheet(text.trim())?;
                sheet.set_state(self.visibility);
                self.sheet = Some(self.workbook.sheet_count() - 1);
            }
            b"Cell" => {
                if let Some(cell) = self.cell.take() {
                    self.store_cell(cell, text)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn row_info(&mut self, e: &BytesStart<'_>) {
        let sheet = match self.sheet.and_then(|i| self.workbook.sheet_at_mut(i)) {
            Some(sheet) => sheet,
            None => return,
        };
        let first: u32 = match attr_value(e, b"No").and_then(|v| v.parse().ok()) {
            Some(no) => no,
            None => return,
        };
        let mut count: u32 = attr_value(e, b"Count")
            .and_then(|v| v.parse().ok())
            .unwrap_or(1)
            .max(1);
        let hidden = attr_value(e, b"Hidden").map_or(false, |v| is_true(&v));
        let hard_size = attr_value(e, b"hard-size").map_or(false, |v| is_true(&v));
        let height = attr_value(e, b"Unit").and_then(|v| v.parse::<f64>().ok());
        if !hidden && !hard_size {
            return;
        }
        if count > MAX_ROW_INFO_COUNT {
            log::warn!(
                "RowInfo at row {} spans {} rows, truncated to {}",
                first,
                count,
                MAX_ROW_INFO_COUNT
            );
            count = MAX_ROW_INFO_COUNT;
        }

        for row in (0..count).map_while(|offset| first.checked_add(offset)) {
            if hidden {
                sheet.set_row_hidden(row, true);
            }
            if let (true, Some(height)) = (hard_size, height) {
                sheet.set_row_height(row, height);
            }
        }
    }

    fn cell_comment(&mut self, e: &BytesStart<'_>) {
        let sheet = match self.sheet.and_then(|i| self.workbook.sheet_at_mut(i)) {
            Some(sheet) => sheet,
            None => return,
        };
        let (bound, text) = match (attr_value(e, b"ObjectBound"), attr_value(e, b"Text")) {
            (Some(bound), Some(text)) => (bound, text),
            _ => return,
        };
        let address = match CellAddress::parse(&bound) {
            Ok(address) => address,
            Err(_) => {
                log::warn!("comment anchored at {:?} skipped", bound);
                return;
            }
        };

        match sheet.cell_mut(address.row, address.column) {
            Some(cell) => cell.set_comment(Some(text)),
            None => {
                sheet
                    .rows_mut()
                    .set_cell(address.row, address.column, Cell::empty().with_comment(text));
            }
        }
    }

    fn store_cell(&mut self, pending: PendingCell, text: String) -> GnumericResult<()> {
        let index = match self.sheet {
            Some(index) => index,
            None => {
                log::warn!("cell outside of a sheet skipped");
                return Ok(());
            }
        };

        let mut formula = None;
        let value = match pending.value_type {
            Some(value_type) => convert_value(value_type, &text)?,
            None => {
                // Expression cell, possibly sharing an earlier expression by id
                if text.starts_with('=') {
                    if let Some(id) = &pending.expr_id {
                        self.expressions.insert(id.clone(), text.clone());
                    }
                    formula = Some(text);
                } else if let Some(id) = &pending.expr_id {
                    formula = self.expressions.get(id).cloned();
                }
                CellValue::Empty
            }
        };

        if value.is_empty() && formula.is_none() {
            return Ok(());
        }

        if let CellValue::Float(serial) = value {
            if pending.number_kind != NumberKind::Plain {
                self.temporal.push(TemporalCell {
                    sheet: index,
                    row: pending.row,
                    column: pending.column,
                    serial,
                    kind: pending.number_kind,
                });
            }
        }

        if let Some(sheet) = self.workbook.sheet_at_mut(index) {
            sheet
                .set_value(pending.row, pending.column, value)
                .set_formula(formula);
        }
        Ok(())
    }

    fn finish(mut self) -> GnumericResult<Workbook> {
        if !self.seen_root {
            return Err(GnumericError::InvalidFormat("Empty document".into()));
        }

        for cell in std::mem::take(&mut self.temporal) {
            let value = match cell.kind {
                NumberKind::Date => date::from_serial(cell.serial, self.date1904).map(CellValue::Date),
                NumberKind::Elapsed => date::duration_from_serial(cell.serial).map(CellValue::Duration),
                NumberKind::Plain => None,
            };
            match (value, self.workbook.sheet_at_mut(cell.sheet)) {
                (Some(value), Some(sheet)) => {
                    if let Some(target) = sheet.cell_mut(cell.row, cell.column) {
                        target.set_value(value);
                    }
                }
                (None, _) => log::warn!("serial {} out of range, kept as number", cell.serial),
                _ => {}
            }
        }

        self.props.date1904 = self.date1904;
        *self.workbook.properties_mut() = self.props;

        if !self.workbook.is_empty() {
            let active = self.selected_tab.min(self.workbook.sheet_count() - 1);
            self.workbook.set_active_index(active);
        }

        log::debug!("read GNumeric with {} sheets", self.workbook.sheet_count());
        Ok(self.workbook)
    }
}

fn convert_value(value_type: ValueType, text: &str) -> GnumericResult<CellValue> {
    let value = match value_type {
        ValueType::Empty => CellValue::Empty,
        ValueType::Boolean => CellValue::Boolean(text.trim().eq_ignore_ascii_case("TRUE")),
        ValueType::Integer => CellValue::Integer(
            text.trim()
                .parse()
                .map_err(|_| GnumericError::Parse(format!("Invalid integer {:?}", text)))?,
        ),
        ValueType::Float => CellValue::Float(
            text.trim()
                .parse()
                .map_err(|_| GnumericError::Parse(format!("Invalid number {:?}", text)))?,
        ),
        ValueType::Error => CellValue::Error(text.to_string()),
        ValueType::String => CellValue::String(text.to_string()),
        ValueType::CellRange | ValueType::Array => {
            log::warn!("value type {} read as text", value_type);
            CellValue::String(text.to_string())
        }
    };
    Ok(value)
}

fn parse_index(e: &BytesStart<'_>, key: &[u8]) -> GnumericResult<u32> {
    let raw = attr_value(e, key).unwrap_or_default();
    raw.parse().map_err(|_| {
        GnumericError::Parse(format!(
            "Invalid cell {} {:?}",
            String::from_utf8_lossy(key),
            raw
        ))
    })
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
