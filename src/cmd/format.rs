/*!
format.rs

Output formatting for `keystone` commands.

Two shapes cover every command:
  - list: one row per resource over a fixed, ordered set of attribute names
  - dict: one resource's full attribute map as `Property | Value` rows,
    sorted by property name

Both have a JSON rendering used with `--json`. Everything here is pure:
functions return strings and the caller decides where they go. A missing
attribute renders as an empty cell (`null` in JSON).

Style decisions (colour on/off, width) live in `StyleOptions`:
  - colour is disabled by `NO_COLOR` or when stdout is not a terminal
  - width comes from `COLUMNS` (clamped 40..=400), default 120
*/

use std::borrow::Cow;
use std::io::IsTerminal;

use serde_json::{Map, Value};

use crate::client::{EndpointMap, Resource};

/* -------------------------------------------------------------------------- */
/* Style Options                                                              */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct StyleOptions {
    pub use_color: bool,
    pub term_width: usize,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::detect()
    }
}

impl StyleOptions {
    pub fn detect() -> Self {
        let use_color =
            std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal();

        let width = std::env::var("COLUMNS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .map(|w| w.clamp(40, 400))
            .unwrap_or(120);

        StyleOptions {
            use_color,
            term_width: width,
        }
    }

    /// No colour, wide enough that nothing is truncated.
    #[cfg(test)]
    pub fn plain() -> Self {
        StyleOptions {
            use_color: false,
            term_width: usize::MAX,
        }
    }
}

/* -------------------------------------------------------------------------- */
/* Color                                                                      */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Accent,
    Dim,
}

pub fn color(role: Role, text: impl AsRef<str>, style: &StyleOptions) -> String {
    if !style.use_color {
        return text.as_ref().to_string();
    }
    let code = match role {
        Role::Accent => "38;5;45",
        Role::Dim => "2",
    };
    format!("\x1b[{code}m{}\x1b[0m", text.as_ref())
}

/* -------------------------------------------------------------------------- */
/* Cells                                                                      */
/* -------------------------------------------------------------------------- */

/// Text for one attribute value. Strings print bare, null/absent print empty,
/// nested values print as compact JSON.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/* -------------------------------------------------------------------------- */
/* List / Dict                                                                */
/* -------------------------------------------------------------------------- */

/// Table with one row per resource and one column per field, in field order.
pub fn render_list(items: &[Resource], fields: &[&str], style: &StyleOptions) -> String {
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|r| fields.iter().map(|f| cell_text(r.attr(f))).collect())
        .collect();
    table(fields, &rows, TableOpts::default(), style)
}

/// JSON array of objects restricted to `fields`.
pub fn render_list_json(items: &[Resource], fields: &[&str]) -> String {
    let arr: Vec<Value> = items
        .iter()
        .map(|r| {
            let obj: Map<String, Value> = fields
                .iter()
                .map(|f| (f.to_string(), r.attr(f).cloned().unwrap_or(Value::Null)))
                .collect();
            Value::Object(obj)
        })
        .collect();
    serde_json::to_string_pretty(&Value::Array(arr)).unwrap_or_default()
}

/// `Property | Value` table over every attribute, sorted by property.
pub fn render_dict(attrs: &Map<String, Value>, style: &StyleOptions) -> String {
    let mut rows: Vec<Vec<String>> = attrs
        .iter()
        .map(|(k, v)| vec![k.clone(), cell_text(Some(v))])
        .collect();
    rows.sort_by(|a, b| a[0].cmp(&b[0]));
    table(&["Property", "Value"], &rows, TableOpts::default(), style)
}

pub fn render_dict_json(attrs: &Map<String, Value>) -> String {
    serde_json::to_string_pretty(attrs).unwrap_or_default()
}

/// Endpoints grouped by service type as a single JSON object.
pub fn render_catalog_json(endpoints: &EndpointMap) -> String {
    serde_json::to_string_pretty(endpoints).unwrap_or_default()
}

/* -------------------------------------------------------------------------- */
/* Table Rendering                                                            */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone)]
pub struct TableOpts {
    pub max_width: usize,
    pub truncate: bool,
    pub header_sep: bool,
    pub min_col_width: usize,
}

impl Default for TableOpts {
    fn default() -> Self {
        Self {
            max_width: 0, // 0 -> style.term_width
            truncate: true,
            header_sep: true,
            min_col_width: 8,
        }
    }
}

pub fn table(
    headers: &[&str],
    rows: &[Vec<String>],
    opts: TableOpts,
    style: &StyleOptions,
) -> String {
    if headers.is_empty() {
        return String::new();
    }
    let col_count = headers.len();
    let width_limit = if opts.max_width == 0 {
        style.term_width
    } else {
        opts.max_width.min(style.term_width)
    };

    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(display_width(cell));
        }
    }

    // shrink the widest columns first until the row fits
    let total: usize = widths.iter().sum::<usize>() + (col_count - 1) * 2;
    if opts.truncate && total > width_limit {
        let mut overflow = total - width_limit;
        let mut ordered: Vec<(usize, usize)> = widths.iter().copied().enumerate().collect();
        ordered.sort_by(|a, b| b.1.cmp(&a.1));
        for (idx, _) in ordered {
            if overflow == 0 {
                break;
            }
            if widths[idx] > opts.min_col_width {
                let shrink = (widths[idx] - opts.min_col_width).min(overflow);
                widths[idx] -= shrink;
                overflow -= shrink;
            }
        }
    }

    let mut lines: Vec<String> = Vec::with_capacity(rows.len() + 2);

    let header = headers
        .iter()
        .enumerate()
        .map(|(i, h)| color(Role::Accent, pad_or_truncate(h, widths[i], opts.truncate), style))
        .collect::<Vec<_>>()
        .join("  ");
    lines.push(header.trim_end().to_string());

    if opts.header_sep {
        let sep = widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(color(Role::Dim, sep, style));
    }

    for row in rows {
        let line = (0..col_count)
            .map(|c| {
                let raw = row.get(c).map(|s| s.as_str()).unwrap_or("");
                pad_or_truncate(raw, widths[c], opts.truncate)
            })
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(line.trim_end().to_string());
    }

    lines.join("\n")
}

fn pad_or_truncate(s: &str, width: usize, truncate: bool) -> String {
    let len = display_width(s);
    if len <= width {
        return format!("{s}{}", " ".repeat(width - len));
    }
    if !truncate {
        return s.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }
    let mut out: String = s.chars().take(width - 1).collect();
    out.push('…');
    out
}

/* -------------------------------------------------------------------------- */
/* ANSI / Width Utilities                                                     */
/* -------------------------------------------------------------------------- */

fn strip_ansi(s: &str) -> Cow<'_, str> {
    // scans for ESC '[' ... letter
    if !s.contains('\x1b') {
        return Cow::Borrowed(s);
    }
    let mut buf = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for t in chars.by_ref() {
                if t.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }
        buf.push(c);
    }
    Cow::Owned(buf)
}

fn display_width(s: &str) -> usize {
    strip_ansi(s).chars().count()
}

/* -------------------------------------------------------------------------- */
/* Tests                                                                      */
/* -------------------------------------------------------------------------- */
