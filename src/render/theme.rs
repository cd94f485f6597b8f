use super::{Cell, Markup, RenderedOutput};
use crate::routing::Url;

/// Turns structured output into markup: the host's link and table primitives.
pub trait Theme: Send + Sync {
    fn link(&self, text: &str, url: &Url) -> Markup;

    fn text(&self, text: &str) -> Markup;

    fn table(&self, header: Option<&[String]>, rows: &[Vec<Markup>]) -> Markup;

    fn cell(&self, cell: &Cell) -> Markup {
        match cell {
            Cell::Link { text, url } => self.link(text, url),
            Cell::Text(text) => self.text(text),
            Cell::Empty => Markup::default(),
        }
    }

    fn output(&self, output: &RenderedOutput) -> Markup {
        match output {
            RenderedOutput::Link(link) => self.link(&link.count.to_string(), &link.url),
            RenderedOutput::Table(table) => {
                let rows: Vec<Vec<Markup>> = table
                    .rows
                    .iter()
                    .map(|row| row.iter().map(|cell| self.cell(cell)).collect())
                    .collect();
                self.table(table.header.as_deref(), &rows)
            }
        }
    }
}

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// HTML markup, as embedded in a host page.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlTheme;

impl Theme for HtmlTheme {
    fn link(&self, text: &str, url: &Url) -> Markup {
        Markup::new(format!(
            "<a href=\"{}\">{}</a>",
            escape_html(url.as_str()),
            escape_html(text)
        ))
    }

    fn text(&self, text: &str) -> Markup {
        Markup::new(escape_html(text))
    }

    fn table(&self, header: Option<&[String]>, rows: &[Vec<Markup>]) -> Markup {
        let mut html = String::from("<table>");

        if let Some(header) = header {
            html.push_str("<thead><tr>");
            for label in header {
                html.push_str("<th>");
                html.push_str(&escape_html(label));
                html.push_str("</th>");
            }
            html.push_str("</tr></thead>");
        }

        html.push_str("<tbody>");
        for row in rows {
            html.push_str("<tr>");
            for cell in row {
                html.push_str("<td>");
                html.push_str(cell.as_str());
                html.push_str("</td>");
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");

        Markup::new(html)
    }
}

/// Plain text with aligned columns, for terminals.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextTheme;

const COLUMN_GAP: &str = "  ";

impl Theme for TextTheme {
    fn link(&self, text: &str, url: &Url) -> Markup {
        Markup::new(format!("{text} <{url}>"))
    }

    fn text(&self, text: &str) -> Markup {
        Markup::new(text)
    }

    fn table(&self, header: Option<&[String]>, rows: &[Vec<Markup>]) -> Markup {
        let mut widths: Vec<usize> = Vec::new();
        let mut widen = |cells: &mut dyn Iterator<Item = &str>| {
            for (i, cell) in cells.enumerate() {
                let width = cell.chars().count();
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(width),
                    None => widths.push(width),
                }
            }
        };
        if let Some(header) = header {
            widen(&mut header.iter().map(String::as_str));
        }
        for row in rows {
            widen(&mut row.iter().map(Markup::as_str));
        }

        let format_line = |cells: &mut dyn Iterator<Item = &str>| -> String {
            cells
                .zip(&widths)
                .map(|(cell, &width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join(COLUMN_GAP)
                .trim_end()
                .to_string()
        };

        let mut lines = Vec::with_capacity(rows.len() + 2);
        if let Some(header) = header {
            lines.push(format_line(&mut header.iter().map(String::as_str)));
            let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
            lines.push(rule.join(COLUMN_GAP));
        }
        for row in rows {
            lines.push(format_line(&mut row.iter().map(Markup::as_str)));
        }

        Markup::new(lines.join("\n"))
    }
}
