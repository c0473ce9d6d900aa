use anyhow::Result;
use std::fmt::Write as _;

use super::DocumentBackend;
use super::layout::{BRAILLE_HEADING, Block, Layout, ORIGINAL_HEADING, SectionTable, TextStyle};

pub const HTML_MIME: &str = "text/html; charset=utf-8";

const STYLE: &str = "body{font-family:Helvetica,Arial,sans-serif;margin:1in;}\
h1{font-size:18pt;text-align:center;}\
h2{font-size:14pt;}\
p{font-size:10pt;line-height:12pt;margin:0;white-space:pre-wrap;}\
p.braille{font-size:14pt;line-height:18pt;margin-bottom:12pt;}\
table{border-collapse:collapse;width:100%;border:1pt solid #000;}\
th{background:#d3d3d3;font-size:12pt;text-align:center;padding:3pt 6pt 8pt;border:0.5pt solid #808080;}\
td{font-size:10pt;line-height:12pt;vertical-align:top;padding:3pt 6pt;border:0.5pt solid #808080;white-space:pre-wrap;width:50%;}\
tr.shaded td{background:#f5f5f5;}";

/// Self-contained HTML page; every piece of text goes through [`escape_html`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlBackend;

impl DocumentBackend for HtmlBackend {
    fn mime(&self) -> &'static str {
        HTML_MIME
    }

    fn render(&self, layout: &Layout) -> Result<Vec<u8>> {
        let mut out = String::new();
        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        writeln!(out, "<title>{}</title>", escape_html(&layout.title))?;
        writeln!(out, "<style>{}</style>", STYLE)?;
        out.push_str("</head>\n<body>\n");
        for block in &layout.blocks {
            render_block(&mut out, block)?;
        }
        out.push_str("</body>\n</html>\n");
        Ok(out.into_bytes())
    }
}

fn render_block(out: &mut String, block: &Block) -> std::fmt::Result {
    match block {
        Block::Title { text } => writeln!(out, "<h1>{}</h1>", escape_html(text)),
        Block::Heading { text } => writeln!(out, "<h2>{}</h2>", escape_html(text)),
        Block::Paragraph { text, style } => {
            let class = match style {
                TextStyle::Body => "original",
                TextStyle::Braille => "braille",
            };
            writeln!(out, "<p class=\"{}\">{}</p>", class, escape_html(text))
        }
        Block::Spacer { height } => {
            writeln!(out, "<div style=\"height:{}pt\"></div>", height)
        }
        Block::Table { table } => render_table(out, table),
    }
}

fn render_table(out: &mut String, table: &SectionTable) -> std::fmt::Result {
    out.push_str("<table>\n");
    writeln!(
        out,
        "<thead><tr><th>{}</th><th>{}</th></tr></thead>",
        ORIGINAL_HEADING, BRAILLE_HEADING
    )?;
    out.push_str("<tbody>\n");
    for (index, row) in table.rows.iter().enumerate() {
        let class = if index % 2 == 1 { " class=\"shaded\"" } else { "" };
        writeln!(
            out,
            "<tr{}><td>{}</td><td class=\"braille\">{}</td></tr>",
            class,
            escape_html(&row.original),
            escape_html(&row.braille)
        )?;
    }
    out.push_str("</tbody>\n</table>\n");
    Ok(())
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::layout::{sequential_layout, side_by_side_layout};

    fn render(layout: &Layout) -> String {
        String::from_utf8(HtmlBackend.render(layout).expect("render")).expect("utf8")
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_html("Fish & Chips <b>"), "Fish &amp; Chips &lt;b&gt;");
        let html = render(&sequential_layout("Mac & Cheese <new>", "⠍⠁⠉", "Bar & Grill"));
        assert!(html.contains("<title>Bar &amp; Grill</title>"));
        assert!(html.contains("<p class=\"original\">Mac &amp; Cheese &lt;new&gt;</p>"));
        assert!(!html.contains("<new>"));
    }

    #[test]
    fn side_by_side_renders_one_row_per_pair() {
        let html = render(&side_by_side_layout("A\nB\n\nC", "⠁", "Menu"));
        assert!(html.contains("<h2>Section 1</h2>"));
        assert!(html.contains("<h2>Section 2</h2>"));
        assert_eq!(html.matches("<tr><td>").count() + html.matches("<tr class=\"shaded\">").count(), 3);
        assert!(html.contains("<tr class=\"shaded\"><td>B</td><td class=\"braille\"></td></tr>"));
    }

    #[test]
    fn error_page_is_valid_html() {
        let html = render(&Layout::error("Error creating document: boom"));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Error creating document: boom"));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
