//! ODS writer

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use calculus_core::chrono::{DateTime, SecondsFormat, Utc};
use calculus_core::{Cell, CellValue, Sheet, Workbook};

use crate::error::{OdsError, OdsResult};
use crate::MIME_TYPE;

const NAMESPACES: &str = r#"xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:fo="urn:oasis:names:tc:opendocument:xmlns:xsl-fo-compatible:1.0" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:meta="urn:oasis:names:tc:opendocument:xmlns:meta:1.0" xmlns:config="urn:oasis:names:tc:opendocument:xmlns:config:1.0" xmlns:calcext="urn:org:documentfoundation:names:experimental:calc:xmlns:calcext:1.0" office:version="1.2""#;

/// ODS file writer
pub struct OdsWriter;

impl OdsWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> OdsResult<()> {
        if workbook.is_empty() {
            return Err(OdsError::NoSheet);
        }
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write(workbook, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write a workbook to a writer
    ///
    /// Fails with [`OdsError::NoSheet`] before anything is written when the
    /// workbook has no sheets.
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> OdsResult<()> {
        if workbook.is_empty() {
            return Err(OdsError::NoSheet);
        }

        let mut zip = zip::ZipWriter::new(writer);

        // The media type must be the first entry and must not be compressed
        let stored = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        zip.start_file("mimetype", stored)?;
        zip.write_all(MIME_TYPE.as_bytes())?;

        Self::write_manifest(&mut zip)?;
        Self::write_meta(&mut zip, workbook)?;
        Self::write_settings(&mut zip, workbook)?;
        Self::write_styles(&mut zip)?;
        Self::write_content(&mut zip, workbook)?;

        zip.finish()?;
        log::debug!("wrote ODS with {} tables", workbook.sheet_count());
        Ok(())
    }

    fn write_manifest<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> OdsResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("META-INF/manifest.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.2">
    <manifest:file-entry manifest:full-path="/" manifest:version="1.2" manifest:media-type="{}"/>
    <manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/>
    <manifest:file-entry manifest:full-path="styles.xml" manifest:media-type="text/xml"/>
    <manifest:file-entry manifest:full-path="meta.xml" manifest:media-type="text/xml"/>
    <manifest:file-entry manifest:full-path="settings.xml" manifest:media-type="text/xml"/>
</manifest:manifest>"#,
            MIME_TYPE
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_meta<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> OdsResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("meta.xml", options)?;

        let props = workbook.properties();
        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-meta {}>
    <office:meta>"#,
            NAMESPACES
        );

        let text_items = [
            ("meta:generator", &props.application),
            ("dc:title", &props.title),
            ("dc:description", &props.description),
            ("dc:subject", &props.subject),
            ("meta:keyword", &props.keywords),
            ("meta:initial-creator", &props.creator),
            ("dc:creator", &props.last_modified_by),
        ];
        for (tag, value) in text_items {
            if !value.is_empty() {
                content.push_str(&format!("\n        <{tag}>{}</{tag}>", escape_xml(value)));
            }
        }
        for (tag, value) in [("meta:creation-date", props.created), ("dc:date", props.modified)] {
            if let Some(timestamp) = value {
                content.push_str(&format!("\n        <{tag}>{}</{tag}>", timestamp_text(timestamp)));
            }
        }

        content.push_str("\n    </office:meta>\n</office:document-meta>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_settings<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> OdsResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("settings.xml", options)?;

        let active = workbook
            .active_sheet()
            .or_else(|| workbook.sheet_at(0))
            .map(|s| s.name())
            .unwrap_or_default();

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-settings {}>
    <office:settings>
        <config:config-item-set config:name="ooo:view-settings">
            <config:config-item-map-indexed config:name="Views">
                <config:config-item-map-entry>
                    <config:config-item config:name="ViewId" config:type="string">view1</config:config-item>
                    <config:config-item config:name="ActiveTable" config:type="string">{}</config:config-item>
                    <config:config-item config:name="HasHorizontalScrollBar" config:type="boolean">{}</config:config-item>
                    <config:config-item config:name="HasVerticalScrollBar" config:type="boolean">{}</config:config-item>
                    <config:config-item config:name="HasSheetTabs" config:type="boolean">{}</config:config-item>
                </config:config-item-map-entry>
            </config:config-item-map-indexed>
        </config:config-item-set>
    </office:settings>
</office:document-settings>"#,
            NAMESPACES,
            escape_xml(active),
            workbook.show_horizontal_scroll,
            workbook.show_vertical_scroll,
            workbook.show_sheet_tabs
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_styles<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> OdsResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("styles.xml", options)?;

        let content = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-styles {}>
    <office:styles>
        <style:default-style style:family="table-cell"/>
    </office:styles>
</office:document-styles>"#,
            NAMESPACES
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_content<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> OdsResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("content.xml", options)?;

        let row_styles = RowStyles::collect(workbook);

        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content {}>
    <office:automatic-styles>
        <style:style style:name="ta1" style:family="table"><style:table-properties table:display="true"/></style:style>
        <style:style style:name="ta2" style:family="table"><style:table-properties table:display="false"/></style:style>"#,
            NAMESPACES
        );
        for (name, height) in row_styles.iter() {
            content.push_str(&format!(
                "\n        <style:style style:name=\"{}\" style:family=\"table-row\"><style:table-row-properties style:row-height=\"{}pt\" style:use-optimal-row-height=\"false\"/></style:style>",
                name, height
            ));
        }
        content.push_str("\n    </office:automatic-styles>\n    <office:body>\n        <office:spreadsheet>");

        for sheet in workbook.sheets() {
            write_table(&mut content, sheet, &row_styles);
        }

        content.push_str("\n        </office:spreadsheet>\n    </office:body>\n</office:document-content>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// Automatic row styles, one per distinct custom row height
#[derive(Debug, Default)]
struct RowStyles {
    /// Height bits to style name
    names: HashMap<u64, String>,
    ordered: Vec<(String, f64)>,
}

impl RowStyles {
    fn collect(workbook: &Workbook) -> Self {
        let mut styles = Self::default();
        for sheet in workbook.sheets() {
            for (_, row) in sheet.rows().stable_iter() {
                if row.height > 0.0 && !styles.names.contains_key(&row.height.to_bits()) {
                    let name = format!("ro{}", styles.ordered.len() + 1);
                    styles.names.insert(row.height.to_bits(), name.clone());
                    styles.ordered.push((name, row.height));
                }
            }
        }
        styles
    }

    fn name_for(&self, height: f64) -> Option<&str> {
        if height > 0.0 {
            self.names.get(&height.to_bits()).map(String::as_str)
        } else {
            None
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.ordered.iter().map(|(name, h)| (name.as_str(), *h))
    }
}

fn write_table(content: &mut String, sheet: &Sheet, row_styles: &RowStyles) {
    let style = if sheet.state().is_visible() { "ta1" } else { "ta2" };
    content.push_str(&format!(
        "\n            <table:table table:name=\"{}\" table:style-name=\"{}\">",
        escape_xml(sheet.name()),
        style
    ));

    let columns = sheet.dimension().map_or(1, |corner| corner.column + 1);
    content.push_str("\n                <table:table-column");
    if columns > 1 {
        content.push_str(&format!(" table:number-columns-repeated=\"{}\"", columns));
    }
    content.push_str("/>");

    let mut next_row = 0u32;
    for (r, row) in sheet.rows().stable_iter() {
        if row.is_empty() && !row.has_custom_settings() {
            continue;
        }

        if r > next_row {
            push_row_start(content, r - next_row, None, false);
            content.push_str("<table:table-cell/></table:table-row>");
        }

        push_row_start(content, 1, row_styles.name_for(row.height), row.hidden);

        let mut next_column = 0u32;
        for (c, cell) in row.stable_iter() {
            if c > next_column {
                push_empty_cells(content, c - next_column);
            }
            write_cell(content, cell);
            next_column = c + 1;
        }
        if row.is_empty() {
            content.push_str("<table:table-cell/>");
        }

        content.push_str("</table:table-row>");
        next_row = r + 1;
    }

    // A table needs at least one row
    if next_row == 0 {
        content.push_str("\n                <table:table-row><table:table-cell/></table:table-row>");
    }

    content.push_str("\n            </table:table>");
}

fn push_row_start(content: &mut String, repeat: u32, style: Option<&str>, hidden: bool) {
    content.push_str("\n                <table:table-row");
    if repeat > 1 {
        content.push_str(&format!(" table:number-rows-repeated=\"{}\"", repeat));
    }
    if let Some(style) = style {
        content.push_str(&format!(" table:style-name=\"{}\"", style));
    }
    if hidden {
        content.push_str(" table:visibility=\"collapse\"");
    }
    content.push('>');
}

fn push_empty_cells(content: &mut String, count: u32) {
    if count > 1 {
        content.push_str(&format!(
            "<table:table-cell table:number-columns-repeated=\"{}\"/>",
            count
        ));
    } else {
        content.push_str("<table:table-cell/>");
    }
}

fn write_cell(content: &mut String, cell: &Cell) {
    let value = cell.value();
    let mut attrs = String::new();

    if let Some(formula) = cell.formula() {
        attrs.push_str(&format!(" table:formula=\"{}\"", escape_xml(formula)));
    }

    // Text shown in <text:p>, None for empty cells
    let display = match value {
        CellValue::Empty => None,
        CellValue::Boolean(b) => {
            attrs.push_str(&format!(
                " office:value-type=\"boolean\" office:boolean-value=\"{}\"",
                b
            ));
            Some(if *b { "TRUE" } else { "FALSE" }.to_string())
        }
        CellValue::Integer(_) => {
            attrs.push_str(&format!(
                " office:value-type=\"float\" office:value=\"{}\"",
                value.to_text()
            ));
            Some(value.to_text())
        }
        CellValue::Float(n) if n.is_finite() => {
            attrs.push_str(&format!(" office:value-type=\"float\" office:value=\"{}\"", n));
            Some(value.to_text())
        }
        CellValue::Float(n) => {
            log::warn!("non-finite number {} written as text", n);
            attrs.push_str(" office:value-type=\"string\"");
            Some(value.to_text())
        }
        CellValue::String(s) => {
            attrs.push_str(" office:value-type=\"string\"");
            Some(s.clone())
        }
        CellValue::Date(_) => {
            attrs.push_str(&format!(
                " office:value-type=\"date\" office:date-value=\"{}\"",
                value.to_text()
            ));
            Some(value.to_text())
        }
        CellValue::Duration(_) => {
            attrs.push_str(&format!(
                " office:value-type=\"time\" office:time-value=\"{}\"",
                value.to_text()
            ));
            Some(value.to_text())
        }
        CellValue::Error(e) => {
            attrs.push_str(" office:value-type=\"string\" office:string-value=\"\" calcext:value-type=\"error\"");
            Some(e.clone())
        }
    };

    if display.is_none() && cell.comment().is_none() {
        content.push_str(&format!("<table:table-cell{}/>", attrs));
        return;
    }

    content.push_str(&format!("<table:table-cell{}>", attrs));
    if let Some(comment) = cell.comment() {
        content.push_str("<office:annotation>");
        push_paragraphs(content, comment);
        content.push_str("</office:annotation>");
    }
    if let Some(text) = display {
        push_paragraphs(content, &text);
    }
    content.push_str("</table:table-cell>");
}

/// Emit text as `<text:p>` paragraphs, one per line
///
/// Leading spaces and runs of spaces become `<text:s/>` so readers do not
/// collapse them; tabs become `<text:tab/>`.
fn push_paragraphs(content: &mut String, text: &str) {
    for line in text.split('\n') {
        content.push_str("<text:p>");
        let mut spaces = 0usize;
        let mut at_start = true;
        for ch in line.chars() {
            if ch == ' ' {
                spaces += 1;
                continue;
            }
            flush_spaces(content, &mut spaces, at_start);
            at_start = false;
            match ch {
                '\t' => content.push_str("<text:tab/>"),
                '&' => content.push_str("&amp;"),
                '<' => content.push_str("&lt;"),
                '>' => content.push_str("&gt;"),
                _ => content.push(ch),
            }
        }
        flush_spaces(content, &mut spaces, true);
        content.push_str("</text:p>");
    }
}

fn flush_spaces(content: &mut String, spaces: &mut usize, at_edge: bool) {
    match *spaces {
        0 => {}
        1 if !at_edge => content.push(' '),
        n if at_edge => content.push_str(&format!("<text:s text:c=\"{}\"/>", n)),
        n => {
            // One literal space followed by the rest as an explicit run
            content.push(' ');
            if n - 1 == 1 {
                content.push_str("<text:s/>");
            } else {
                content.push_str(&format!("<text:s text:c=\"{}\"/>", n - 1));
            }
        }
    }
    *spaces = 0;
}

fn timestamp_text(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
