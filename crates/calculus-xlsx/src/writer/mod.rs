//! XLSX writer

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use calculus_core::chrono::{DateTime, SecondsFormat, Utc};
use calculus_core::{date, Cell, CellAddress, CellValue, Error, Sheet, Workbook};

use crate::error::{XlsxError, XlsxResult};
use crate::styles::XlsxStyleTable;

/// Relationship id of the first worksheet in `workbook.xml.rels`
///
/// rId1 is the stylesheet, rId2 the shared strings, rId3 is left unused.
const FIRST_SHEET_REL_ID: usize = 4;

/// XLSX file writer
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        if workbook.is_empty() {
            return Err(XlsxError::NoSheet);
        }
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write(workbook, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write a workbook to a writer
    ///
    /// Fails with [`XlsxError::NoSheet`] before anything is written when the
    /// workbook has no sheets.
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        if workbook.is_empty() {
            return Err(XlsxError::NoSheet);
        }

        let styles = XlsxStyleTable::build(workbook);
        let mut shared_strings = SharedStrings::default();

        let mut zip = zip::ZipWriter::new(writer);

        Self::write_content_types(&mut zip, workbook)?;
        Self::write_root_rels(&mut zip)?;
        Self::write_app_props(&mut zip, workbook)?;
        Self::write_core_props(&mut zip, workbook)?;
        Self::write_workbook_xml(&mut zip, workbook)?;
        Self::write_workbook_rels(&mut zip, workbook)?;

        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/styles.xml", options)?;
        zip.write_all(styles.to_styles_xml().as_bytes())?;

        let date1904 = workbook.properties().date1904;
        let active = workbook.active_index();
        for (index, sheet) in workbook.sheets().iter().enumerate() {
            Self::write_worksheet(
                &mut zip,
                sheet,
                index,
                active == Some(index),
                date1904,
                &styles,
                &mut shared_strings,
            )?;
        }

        Self::write_shared_strings(&mut zip, &shared_strings)?;

        zip.finish()?;
        log::debug!(
            "wrote XLSX with {} sheets and {} shared strings",
            workbook.sheet_count(),
            shared_strings.strings.len()
        );
        Ok(())
    }

    fn write_content_types<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
    <Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>
    <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
    <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
        );

        for index in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                index + 1
            ));
        }

        content.push_str("\n</Types>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_root_rels<W: Write + Seek>(zip: &mut zip::ZipWriter<W>) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("_rels/.rels", options)?;

        let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
    <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#;

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_app_props<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("docProps/app.xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#,
        );
        let application = &workbook.properties().application;
        if !application.is_empty() {
            content.push_str(&format!(
                "\n    <Application>{}</Application>",
                escape_xml(application)
            ));
        }
        content.push_str("\n</Properties>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_core_props<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("docProps/core.xml", options)?;

        let props = workbook.properties();
        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
        );

        let text_items = [
            ("dc:creator", &props.creator),
            ("cp:lastModifiedBy", &props.last_modified_by),
            ("dc:title", &props.title),
            ("dc:subject", &props.subject),
            ("dc:description", &props.description),
            ("cp:keywords", &props.keywords),
            ("cp:category", &props.category),
        ];
        for (tag, value) in text_items {
            if !value.is_empty() {
                content.push_str(&format!("\n    <{tag}>{}</{tag}>", escape_xml(value)));
            }
        }

        for (tag, value) in [("dcterms:created", props.created), ("dcterms:modified", props.modified)] {
            if let Some(timestamp) = value {
                content.push_str(&format!(
                    "\n    <{tag} xsi:type=\"dcterms:W3CDTF\">{}</{tag}>",
                    w3cdtf(timestamp)
                ));
            }
        }

        content.push_str("\n</cp:coreProperties>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_xml<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/workbook.xml", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );

        content.push_str(&format!(
            "\n    <fileVersion appName=\"{}\"/>",
            escape_xml(&workbook.properties().application)
        ));
        if workbook.properties().date1904 {
            content.push_str("\n    <workbookPr date1904=\"1\"/>");
        } else {
            content.push_str("\n    <workbookPr/>");
        }

        content.push_str(&format!(
            r#"
    <bookViews>
        <workbookView showHorizontalScroll="{}" showVerticalScroll="{}" showSheetTabs="{}" windowWidth="16384" windowHeight="8192" tabRatio="500" activeTab="{}"/>
    </bookViews>
    <sheets>"#,
            flag(workbook.show_horizontal_scroll),
            flag(workbook.show_vertical_scroll),
            flag(workbook.show_sheet_tabs),
            workbook.active_index().unwrap_or(0)
        ));

        for (index, sheet) in workbook.sheets().iter().enumerate() {
            content.push_str(&format!(
                "\n        <sheet name=\"{}\" sheetId=\"{}\" state=\"{}\" r:id=\"rId{}\"/>",
                escape_xml(sheet.name()),
                index + 1,
                sheet.state(),
                index + FIRST_SHEET_REL_ID
            ));
        }

        content.push_str(
            r#"
    </sheets>
</workbook>"#,
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_workbook_rels<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        workbook: &Workbook,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/_rels/workbook.xml.rels", options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>"#,
        );

        for index in 0..workbook.sheet_count() {
            content.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                index + FIRST_SHEET_REL_ID,
                index + 1
            ));
        }

        content.push_str("\n</Relationships>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_worksheet<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        sheet: &Sheet,
        index: usize,
        selected: bool,
        date1904: bool,
        styles: &XlsxStyleTable,
        shared_strings: &mut SharedStrings,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file(format!("xl/worksheets/sheet{}.xml", index + 1), options)?;

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        );

        let dimension = match sheet.dimension() {
            Some(corner) => format!("A1:{}", corner),
            None => "A1".to_string(),
        };
        content.push_str(&format!("\n    <dimension ref=\"{}\"/>", dimension));

        content.push_str("\n    <sheetViews>\n        <sheetView workbookViewId=\"0\"");
        if selected {
            content.push_str(" tabSelected=\"1\"");
        }
        content.push_str("/>\n    </sheetViews>");

        content.push_str("\n    <sheetData>");

        for (r, row) in sheet.rows().stable_iter() {
            if row.is_empty() && !row.has_custom_settings() {
                continue;
            }

            content.push_str(&format!("\n        <row r=\"{}\"", r + 1));
            if row.hidden {
                content.push_str(" hidden=\"1\"");
            }
            if row.height > 0.0 {
                content.push_str(&format!(" ht=\"{}\" customHeight=\"1\"", row.height));
            }

            if row.is_empty() {
                content.push_str("/>");
                continue;
            }
            content.push('>');

            for (c, cell) in row.stable_iter() {
                let reference = CellAddress::new(r, c).to_string();
                write_cell(
                    &mut content,
                    &reference,
                    cell,
                    styles.xf_id_for(cell.style()),
                    date1904,
                    shared_strings,
                )?;
            }

            content.push_str("\n        </row>");
        }

        content.push_str(
            r#"
    </sheetData>
</worksheet>"#,
        );

        zip.write_all(content.as_bytes())?;
        Ok(())
    }

    fn write_shared_strings<W: Write + Seek>(
        zip: &mut zip::ZipWriter<W>,
        shared_strings: &SharedStrings,
    ) -> XlsxResult<()> {
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("xl/sharedStrings.xml", options)?;

        let mut content = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">"#,
            shared_strings.count,
            shared_strings.strings.len()
        );

        for s in &shared_strings.strings {
            let preserve = s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace);
            if preserve {
                content.push_str(&format!(
                    "\n    <si><t xml:space=\"preserve\">{}</t></si>",
                    escape_xml(s)
                ));
            } else {
                content.push_str(&format!("\n    <si><t>{}</t></si>", escape_xml(s)));
            }
        }

        content.push_str("\n</sst>");

        zip.write_all(content.as_bytes())?;
        Ok(())
    }
}

/// Deduplicated string table shared by all worksheets
#[derive(Debug, Default)]
struct SharedStrings {
    strings: Vec<String>,
    index: HashMap<String, usize>,
    /// Number of string cells referencing the table
    count: usize,
}

impl SharedStrings {
    fn add(&mut self, s: &str) -> usize {
        self.count += 1;
        if let Some(&idx) = self.index.get(s) {
            return idx;
        }
        let idx = self.strings.len();
        self.strings.push(s.to_string());
        self.index.insert(s.to_string(), idx);
        idx
    }
}

fn write_cell(
    content: &mut String,
    reference: &str,
    cell: &Cell,
    style_id: u32,
    date1904: bool,
    shared_strings: &mut SharedStrings,
) -> XlsxResult<()> {
    // (type attribute, <v> text)
    let (kind, value): (Option<&str>, Option<String>) = match cell.value() {
        CellValue::Empty => (None, None),
        CellValue::Boolean(b) => (Some("b"), Some(if *b { "1" } else { "0" }.to_string())),
        CellValue::Integer(n) => (None, Some(n.to_string())),
        CellValue::Float(n) if n.is_finite() => (None, Some(n.to_string())),
        CellValue::Float(n) => {
            log::warn!("{}: non-finite number {} has no XLSX form", reference, n);
            return Err(Error::UnsupportedValueType("non-finite number").into());
        }
        CellValue::String(s) => (Some("s"), Some(shared_strings.add(s).to_string())),
        CellValue::Date(d) => (Some("d"), Some(date::to_serial(*d, date1904).to_string())),
        CellValue::Duration(d) => (None, Some(date::duration_to_serial(*d).to_string())),
        CellValue::Error(e) => (Some("e"), Some(e.clone())),
    };

    content.push_str(&format!("\n            <c r=\"{}\"", reference));
    if style_id != 0 {
        content.push_str(&format!(" s=\"{}\"", style_id));
    }
    if let Some(kind) = kind {
        content.push_str(&format!(" t=\"{}\"", kind));
    }

    if value.is_none() && cell.formula().is_none() {
        content.push_str("/>");
        return Ok(());
    }
    content.push('>');

    if let Some(formula) = cell.formula() {
        let formula = formula.strip_prefix('=').unwrap_or(formula);
        content.push_str(&format!("<f>{}</f>", escape_xml(formula)));
    }
    if let Some(value) = value {
        content.push_str(&format!("<v>{}</v>", escape_xml(&value)));
    }
    content.push_str("</c>");
    Ok(())
}

fn flag(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}

fn w3cdtf(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
