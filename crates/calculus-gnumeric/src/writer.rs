//! GNumeric writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use calculus_core::{date, Cell, CellAddress, CellValue, Sheet, SheetState, Workbook};

use crate::error::GnumericResult;
use crate::value_type::ValueType;
use crate::NAMESPACE;

const DATE_FORMAT: &str = "d/m/yyyy";
const ELAPSED_FORMAT: &str = "[h]:mm:ss";
const DEFAULT_ROW_HEIGHT: f64 = 12.8;
const DEFAULT_COLUMN_WIDTH: f64 = 48.0;

/// GNumeric file writer
pub struct GnumericWriter;

impl GnumericWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> GnumericResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write(workbook, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write a gzip-compressed workbook document
    ///
    /// A workbook without sheets is written as a document with an empty sheet
    /// list.
    pub fn write<W: Write>(workbook: &Workbook, writer: W) -> GnumericResult<()> {
        let xml = Self::to_xml(workbook);
        let mut encoder = GzEncoder::new(writer, Compression::default());
        encoder.write_all(xml.as_bytes())?;
        encoder.finish()?;
        log::debug!("wrote GNumeric with {} sheets", workbook.sheet_count());
        Ok(())
    }

    /// Render the uncompressed document
    pub fn to_xml(workbook: &Workbook) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push_str(&format!("\n<Workbook xmlns=\"{}\">", NAMESPACE));

        write_attributes(&mut xml, workbook);
        write_summary(&mut xml, workbook);

        xml.push_str("\n  <SheetNameIndex>");
        for sheet in workbook.sheets() {
            xml.push_str(&format!("<SheetName>{}</SheetName>", escape_xml(sheet.name())));
        }
        xml.push_str("</SheetNameIndex>");
        xml.push_str("\n  <Names/>");
        xml.push_str("\n  <Geometry Width=\"734\" Height=\"422\"/>");
        if workbook.properties().date1904 {
            xml.push_str("\n  <Calculation DateConvention=\"Apple:1904\"/>");
        }

        xml.push_str("\n  <Sheets>");
        let date1904 = workbook.properties().date1904;
        for sheet in workbook.sheets() {
            write_sheet(&mut xml, sheet, date1904);
        }
        xml.push_str("\n  </Sheets>");

        xml.push_str(&format!(
            "\n  <UIData SelectedTab=\"{}\"/>",
            workbook.active_index().unwrap_or(0)
        ));
        xml.push_str("\n</Workbook>\n");
        xml
    }
}

fn write_attributes(xml: &mut String, workbook: &Workbook) {
    let attributes = [
        ("WorkbookView::show_horizontal_scrollbar", workbook.show_horizontal_scroll),
        ("WorkbookView::show_vertical_scrollbar", workbook.show_vertical_scroll),
        ("WorkbookView::show_notebook_tabs", workbook.show_sheet_tabs),
        ("WorkbookView::is_protected", false),
    ];

    xml.push_str("\n  <Attributes>");
    for (name, value) in attributes {
        xml.push_str(&format!(
            "\n    <Attribute><name>{}</name><value>{}</value></Attribute>",
            name,
            bool_text(value)
        ));
    }
    xml.push_str("\n  </Attributes>");
}

fn write_summary(xml: &mut String, workbook: &Workbook) {
    let props = workbook.properties();
    let items = [
        ("application", &props.application),
        ("author", &props.creator),
        ("last_author", &props.last_modified_by),
        ("title", &props.title),
        ("category", &props.category),
        ("keywords", &props.keywords),
        ("comments", &props.description),
    ];

    xml.push_str("\n  <Summary>");
    for (name, value) in items {
        xml.push_str(&format!(
            "\n    <Item><name>{}</name><val-string>{}</val-string></Item>",
            name,
            escape_xml(value)
        ));
    }
    xml.push_str("\n  </Summary>");
}

fn write_sheet(xml: &mut String, sheet: &Sheet, date1904: bool) {
    let visibility = match sheet.state() {
        SheetState::Visible => "GNM_SHEET_VISIBILITY_VISIBLE",
        SheetState::Hidden => "GNM_SHEET_VISIBILITY_HIDDEN",
        SheetState::VeryHidden => "GNM_SHEET_VISIBILITY_VERY_HIDDEN",
    };
    let (max_col, max_row) = sheet
        .dimension()
        .map_or((-1, -1), |corner| (corner.column as i64, corner.row as i64));

    xml.push_str(&format!(
        "\n    <Sheet DisplayFormulas=\"0\" HideZero=\"0\" HideGrid=\"0\" HideColHeader=\"0\" HideRowHeader=\"0\" DisplayOutlines=\"1\" OutlineSymbolsBelow=\"1\" OutlineSymbolsRight=\"1\" Visibility=\"{}\" GridColor=\"0:0:0\">",
        visibility
    ));
    xml.push_str(&format!("\n      <Name>{}</Name>", escape_xml(sheet.name())));
    xml.push_str(&format!("\n      <MaxCol>{}</MaxCol>", max_col));
    xml.push_str(&format!("\n      <MaxRow>{}</MaxRow>", max_row));
    xml.push_str("\n      <Zoom>1</Zoom>");
    xml.push_str("\n      <Names/>");
    xml.push_str(
        r#"
      <PrintInformation>
        <Margins>
          <top Points="120" PrefUnit="mm"/>
          <bottom Points="120" PrefUnit="mm"/>
          <left Points="72" PrefUnit="mm"/>
          <right Points="72" PrefUnit="mm"/>
          <header Points="72" PrefUnit="mm"/>
          <footer Points="72" PrefUnit="mm"/>
        </Margins>
        <orientation>portrait</orientation>
        <paper>iso_a4</paper>
      </PrintInformation>"#,
    );
    xml.push_str("\n      <Styles/>");
    xml.push_str(&format!("\n      <Cols DefaultSizePts=\"{}\"/>", DEFAULT_COLUMN_WIDTH));

    let rows: Vec<_> = sheet.rows().stable_iter().collect();

    xml.push_str(&format!("\n      <Rows DefaultSizePts=\"{}\">", DEFAULT_ROW_HEIGHT));
    for (index, row) in rows.iter().filter(|(_, row)| row.has_custom_settings()) {
        let height = if row.height > 0.0 { row.height } else { DEFAULT_ROW_HEIGHT };
        xml.push_str(&format!("\n        <RowInfo No=\"{}\" Unit=\"{}\"", index, height));
        if row.height > 0.0 {
            xml.push_str(" hard-size=\"1\"");
        }
        if row.hidden {
            xml.push_str(" Hidden=\"1\"");
        }
        xml.push_str("/>");
    }
    xml.push_str("\n      </Rows>");

    xml.push_str("\n      <Selections CursorCol=\"0\" CursorRow=\"0\"/>");

    let mut comments = Vec::new();
    xml.push_str("\n      <Cells>");
    for (r, row) in &rows {
        for (c, cell) in row.stable_iter() {
            write_cell(xml, *r, c, cell, date1904);
            if let Some(comment) = cell.comment() {
                comments.push((CellAddress::new(*r, c), comment));
            }
        }
    }
    xml.push_str("\n      </Cells>");

    if !comments.is_empty() {
        xml.push_str("\n      <Objects>");
        for (address, text) in comments {
            xml.push_str(&format!(
                "\n        <CellComment ObjectBound=\"{}\" Text=\"{}\"/>",
                address,
                escape_xml(text)
            ));
        }
        xml.push_str("\n      </Objects>");
    }

    xml.push_str("\n      <SheetLayout TopLeft=\"A1\"/>");
    xml.push_str("\n    </Sheet>");
}

fn write_cell(xml: &mut String, row: u32, column: u32, cell: &Cell, date1904: bool) {
    xml.push_str(&format!("\n        <Cell Row=\"{}\" Col=\"{}\"", row, column));

    // Formula cells carry the expression only; the value is recomputed on load
    if let Some(formula) = cell.formula() {
        let expression = if formula.starts_with('=') {
            formula.to_string()
        } else {
            format!("={}", formula)
        };
        xml.push_str(&format!(">{}</Cell>", escape_xml(&expression)));
        return;
    }

    let (value_type, format, text) = match cell.value() {
        CellValue::Empty => (ValueType::Empty, None, String::new()),
        CellValue::Boolean(b) => (ValueType::Boolean, None, bool_text(*b).to_string()),
        CellValue::Integer(n) => (ValueType::Integer, None, n.to_string()),
        CellValue::Float(n) if n.is_finite() => (ValueType::Float, None, n.to_string()),
        CellValue::Float(_) => (ValueType::Error, None, "#NUM!".to_string()),
        CellValue::String(s) => (ValueType::String, None, s.clone()),
        CellValue::Date(d) => (
            ValueType::Float,
            Some(DATE_FORMAT),
            date::to_serial(*d, date1904).to_string(),
        ),
        CellValue::Duration(d) => (
            ValueType::Float,
            Some(ELAPSED_FORMAT),
            date::duration_to_serial(*d).to_string(),
        ),
        CellValue::Error(e) => (ValueType::Error, None, e.clone()),
    };

    xml.push_str(&format!(" ValueType=\"{}\"", value_type));
    if let Some(format) = format {
        xml.push_str(&format!(" ValueFormat=\"{}\"", format));
    }
    xml.push_str(&format!(">{}</Cell>", escape_xml(&text)));
}

fn bool_text(value: bool) -> &'static str {
    if value {
        "TRUE"
    } else {
        "FALSE"
    }
}

pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
