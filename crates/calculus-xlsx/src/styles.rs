//! XLSX styles (styles.xml) read/write helpers

use std::collections::HashMap;
use std::io::{BufReader, Read};
use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::writer::escape_xml;
use calculus_core::{Font, Style, StylePool, Workbook};

/// First id available for custom number formats
const FIRST_CUSTOM_NUM_FMT: u32 = 164;

/// Built-in number formats that are referenced by id only
const BUILTIN_NUM_FMTS: &[(u32, &str)] = &[
    (1, "0"),
    (2, "0.00"),
    (3, "#,##0"),
    (4, "#,##0.00"),
    (9, "0%"),
    (10, "0.00%"),
    (11, "0.00E+00"),
    (12, "# ?/?"),
    (13, "# ??/??"),
    (14, "mm-dd-yy"),
    (15, "d-mmm-yy"),
    (16, "d-mmm"),
    (17, "mmm-yy"),
    (18, "h:mm AM/PM"),
    (19, "h:mm:ss AM/PM"),
    (20, "h:mm"),
    (21, "h:mm:ss"),
    (22, "m/d/yy h:mm"),
    (45, "mm:ss"),
    (46, "[h]:mm:ss"),
    (47, "mmss.0"),
    (48, "##0.0E+0"),
    (49, "@"),
];

fn builtin_id(code: &str) -> Option<u32> {
    BUILTIN_NUM_FMTS
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(id, _)| *id)
}

fn builtin_code(id: u32) -> Option<&'static str> {
    BUILTIN_NUM_FMTS
        .iter()
        .find(|(i, _)| *i == id)
        .map(|(_, c)| *c)
}

// === Writing ===

/// Styles used by a workbook, laid out as `cellXfs` records
///
/// The xf index of a style is its index in the pool, so the default style is
/// always xf 0.
#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    pool: StylePool,
}

impl XlsxStyleTable {
    pub(crate) fn build(workbook: &Workbook) -> Self {
        let mut pool = StylePool::new();
        for sheet in workbook.sheets() {
            for (_, row) in sheet.rows().iter() {
                for (_, cell) in row.iter() {
                    if let Some(style) = cell.style() {
                        pool.get_or_insert(Style::clone(style));
                    }
                }
            }
        }
        Self { pool }
    }

    /// xf index for a cell style, 0 when the cell has none
    pub(crate) fn xf_id_for(&self, style: Option<&Arc<Style>>) -> u32 {
        style
            .and_then(|s| self.pool.index_of(s))
            .unwrap_or(0)
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        let mut fonts: Vec<&Font> = Vec::new();
        let mut font_ids: HashMap<&Font, u32> = HashMap::new();

        let mut num_fmts: Vec<(u32, &str)> = Vec::new();
        let mut num_fmt_ids: HashMap<&str, u32> = HashMap::new();

        // (numFmtId, fontId) per xf
        let mut xfs: Vec<(u32, u32)> = Vec::with_capacity(self.pool.len());

        for (_, style) in self.pool.iter() {
            // Font 0 is the document default, so any explicit font gets its own record
            let font_id = match &style.font {
                None => 0,
                Some(font) => match font_ids.get(font) {
                    Some(&id) => id,
                    None => {
                        fonts.push(font);
                        let id = fonts.len() as u32;
                        font_ids.insert(font, id);
                        id
                    }
                },
            };

            let code = style.number_format.as_str();
            let num_fmt_id = if code.is_empty() {
                0
            } else if let Some(id) = builtin_id(code) {
                id
            } else if let Some(&id) = num_fmt_ids.get(code) {
                id
            } else {
                let id = FIRST_CUSTOM_NUM_FMT + num_fmts.len() as u32;
                num_fmts.push((id, code));
                num_fmt_ids.insert(code, id);
                id
            };

            xfs.push((num_fmt_id, font_id));
        }

        let mut content = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !num_fmts.is_empty() {
            content.push_str(&format!("\n    <numFmts count=\"{}\">", num_fmts.len()));
            for (id, code) in &num_fmts {
                content.push_str(&format!(
                    "\n        <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_xml(code)
                ));
            }
            content.push_str("\n    </numFmts>");
        }

        content.push_str(&format!("\n    <fonts count=\"{}\">", fonts.len() + 1));
        content.push_str("\n        <font><sz val=\"11\"/><name val=\"Calibri\"/></font>");
        for font in &fonts {
            content.push_str("\n        ");
            content.push_str(&write_font(font));
        }
        content.push_str("\n    </fonts>");

        content.push_str(
            r#"
    <fills count="2">
        <fill><patternFill patternType="none"/></fill>
        <fill><patternFill patternType="gray125"/></fill>
    </fills>
    <borders count="1">
        <border><left/><right/><top/><bottom/><diagonal/></border>
    </borders>
    <cellStyleXfs count="1">
        <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
    </cellStyleXfs>"#,
        );

        content.push_str(&format!("\n    <cellXfs count=\"{}\">", xfs.len()));
        for (num_fmt_id, font_id) in &xfs {
            content.push_str(&format!(
                "\n        <xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"0\" borderId=\"0\" xfId=\"0\"",
                num_fmt_id, font_id
            ));
            if *num_fmt_id != 0 {
                content.push_str(" applyNumberFormat=\"1\"");
            }
            if *font_id != 0 {
                content.push_str(" applyFont=\"1\"");
            }
            content.push_str("/>");
        }
        content.push_str("\n    </cellXfs>");

        content.push_str(
            r#"
    <cellStyles count="1">
        <cellStyle name="Normal" xfId="0" builtinId="0"/>
    </cellStyles>
</styleSheet>"#,
        );

        content
    }
}

fn write_font(font: &Font) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    if font.strikethrough {
        s.push_str("<strike/>");
    }
    if font.underline {
        s.push_str("<u/>");
    }
    if font.size > 0.0 {
        s.push_str(&format!("<sz val=\"{}\"/>", font.size));
    }
    match font.hex_rgb() {
        Some(rgb) => s.push_str(&format!("<color rgb=\"FF{}\"/>", rgb.to_ascii_uppercase())),
        None if !font.color.is_empty() => {
            log::debug!("font color {:?} is not hex, dropped from XLSX", font.color);
        }
        None => {}
    }
    if !font.name.is_empty() {
        s.push_str(&format!("<name val=\"{}\"/>", escape_xml(&font.name)));
    }
    s.push_str("</font>");
    s
}

// === Reading ===

/// Decode `styles.xml` into one entry per `cellXfs` record
///
/// Records equivalent to the default style decode to `None`; the others are
/// interned so cells sharing a format share one `Arc<Style>`.
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<Option<Arc<Style>>>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();

    let mut num_fmts: HashMap<u32, String> = HashMap::new();
    let mut fonts: Vec<Font> = Vec::new();
    let mut current_font: Option<Font> = None;
    let mut in_fonts = false;
    // (numFmtId, fontId)
    let mut xfs: Vec<(u32, u32)> = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"cellXfs" => in_cell_xfs = true,
                b"fonts" => in_fonts = true,
                b"font" if in_fonts => current_font = Some(Font::default()),
                b"xf" if in_cell_xfs => xfs.push(parse_xf(&e)),
                b"numFmt" => parse_num_fmt(&e, &mut num_fmts),
                name => {
                    if let Some(font) = current_font.as_mut() {
                        apply_font_property(font, name, &e);
                    }
                }
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"font" if in_fonts => fonts.push(Font::default()),
                b"xf" if in_cell_xfs => xfs.push(parse_xf(&e)),
                b"numFmt" => parse_num_fmt(&e, &mut num_fmts),
                name => {
                    if let Some(font) = current_font.as_mut() {
                        apply_font_property(font, name, &e);
                    }
                }
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"cellXfs" => in_cell_xfs = false,
                b"fonts" => in_fonts = false,
                b"font" => {
                    if let Some(font) = current_font.take() {
                        fonts.push(font);
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

    let mut pool = StylePool::new();
    let styles = xfs
        .into_iter()
        .map(|(num_fmt_id, font_id)| {
            let number_format = match num_fmt_id {
                0 => String::new(),
                id => num_fmts
                    .get(&id)
                    .cloned()
                    .or_else(|| builtin_code(id).map(str::to_string))
                    .unwrap_or_default(),
            };
            let font = match font_id {
                0 => None,
                id => fonts.get(id as usize).cloned(),
            };
            let style = Style {
                font,
                number_format,
            };
            if style.is_default() {
                None
            } else {
                Some(pool.intern(style))
            }
        })
        .collect();

    Ok(styles)
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.to_string()))
}

fn parse_xf(e: &BytesStart<'_>) -> (u32, u32) {
    let num_fmt_id = attr_value(e, b"numFmtId")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let font_id = attr_value(e, b"fontId")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    (num_fmt_id, font_id)
}

fn parse_num_fmt(e: &BytesStart<'_>, num_fmts: &mut HashMap<u32, String>) {
    let id = attr_value(e, b"numFmtId").and_then(|v| v.parse::<u32>().ok());
    let code = attr_value(e, b"formatCode");
    if let (Some(id), Some(code)) = (id, code) {
        num_fmts.insert(id, code);
    }
}

/// Toggle elements such as `<b/>` are on unless `val` says otherwise
fn toggle(e: &BytesStart<'_>) -> bool {
    !matches!(
        attr_value(e, b"val").as_deref(),
        Some("0") | Some("false") | Some("none")
    )
}

fn apply_font_property(font: &mut Font, name: &[u8], e: &BytesStart<'_>) {
    match name {
        b"b" => font.bold = toggle(e),
        b"i" => font.italic = toggle(e),
        b"u" => font.underline = toggle(e),
        b"strike" => font.strikethrough = toggle(e),
        b"sz" => {
            font.size = attr_value(e, b"val")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.0);
        }
        b"name" => font.name = attr_value(e, b"val").unwrap_or_default(),
        b"color" => {
            if let Some(argb) = attr_value(e, b"rgb") {
                font.color = argb_to_color(&argb);
            }
        }
        _ => {}
    }
}

/// `AARRGGBB` to `#rrggbb`, keeping a non-opaque alpha as `#rrggbbaa`
fn argb_to_color(argb: &str) -> String {
    if argb.len() != 8 || !argb.bytes().all(|b| b.is_ascii_hexdigit()) {
        return String::new();
    }
    let argb = argb.to_ascii_lowercase();
    let (alpha, rgb) = argb.split_at(2);
    if alpha == "ff" {
        format!("#{}", rgb)
    } else {
        format!("#{}{}", rgb, alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calculus_core::Sheet;

    fn table_for(styles: &[Style]) -> XlsxStyleTable {
        let mut workbook = Workbook::new();
        let sheet: &mut Sheet = workbook.add_sheet("Styles").unwrap();
        for (row, style) in styles.iter().enumerate() {
            sheet
                .set_value(row as u32, 0, "x")
                .set_style(Some(Arc::new(style.clone())));
        }
        XlsxStyleTable::build(&workbook)
    }

    #[test]
    fn test_default_style_is_xf_zero() {
        let table = table_for(&[Style::new().bold(true)]);
        assert_eq!(table.xf_id_for(None), 0);
        assert_eq!(table.xf_id_for(Some(&Arc::new(Style::default()))), 0);
        assert_eq!(table.xf_id_for(Some(&Arc::new(Style::new().bold(true)))), 1);
    }

    #[test]
    fn test_custom_number_formats_start_at_164() {
        let table = table_for(&[
            Style::new().number_format("d/m/yyyy"),
            Style::new().number_format("0.00"),
            Style::new().number_format("0.000"),
        ]);
        let xml = table.to_styles_xml();
        assert!(xml.contains(r#"<numFmts count="2">"#));
        assert!(xml.contains(r#"<numFmt numFmtId="164" formatCode="d/m/yyyy"/>"#));
        assert!(xml.contains(r#"<numFmt numFmtId="165" formatCode="0.000"/>"#));
        // Built-in codes are referenced, not declared
        assert!(xml.contains(r#"<xf numFmtId="2" fontId="0""#));
    }

    #[test]
    fn test_fonts_are_deduplicated() {
        let table = table_for(&[
            Style::new().bold(true),
            Style::new().bold(true).number_format("0%"),
            Style::new().italic(true).font_color("#1a2b3c"),
        ]);
        let xml = table.to_styles_xml();
        assert!(xml.contains(r#"<fonts count="3">"#));
        assert!(xml.contains(r#"<font><i/><color rgb="FF1A2B3C"/></font>"#));
        assert!(xml.contains(r#"<cellXfs count="4">"#));
    }

    #[test]
    fn test_read_styles() {
        let xml = r#"<?xml version="1.0"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="1"><numFmt numFmtId="164" formatCode="d/m/yyyy"/></numFmts>
  <fonts count="2">
    <font><sz val="11"/><name val="Calibri"/></font>
    <font><b/><i val="0"/><sz val="14"/><color rgb="80FF0000"/><name val="Arial"/></font>
  </fonts>
  <cellXfs count="4">
    <xf numFmtId="0" fontId="0"/>
    <xf numFmtId="164" fontId="0"/>
    <xf numFmtId="14" fontId="1"/>
    <xf numFmtId="164" fontId="0"/>
  </cellXfs>
</styleSheet>"#;
        let styles = read_styles_xml(xml.as_bytes()).unwrap();
        assert_eq!(styles.len(), 4);
        assert!(styles[0].is_none());
        assert_eq!(styles[1].as_ref().unwrap().number_format, "d/m/yyyy");

        let third = styles[2].as_ref().unwrap();
        assert_eq!(third.number_format, "mm-dd-yy");
        let font = third.font.as_ref().unwrap();
        assert!(font.bold);
        assert!(!font.italic);
        assert_eq!(font.size, 14.0);
        assert_eq!(font.name, "Arial");
        assert_eq!(font.color, "#ff000080");

        // Identical records share one instance
        assert!(Arc::ptr_eq(
            styles[1].as_ref().unwrap(),
            styles[3].as_ref().unwrap()
        ));
    }
}
