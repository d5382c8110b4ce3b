//! Server-rendered HTML pages.
//!
//! Pages are plain string templates with `{name}` placeholders filled by a
//! [`PageContext`]. Every page is wrapped in [`layout`], which carries the
//! navigation bar and any pending flash messages.

pub mod catalog;
pub mod edit;

use std::collections::HashMap;

use axum::http::StatusCode;

use crate::flash::Flash;

/// Named values substituted into a template.
///
/// Values added with [`PageContext::with_text`] are HTML-escaped; values
/// added with [`PageContext::with_html`] are inserted verbatim.
///
/// ```
/// use pixly_server::pages::PageContext;
///
/// let ctx = PageContext::new()
///     .with_text("name", "<b>cat</b>")
///     .with_html("extra", "<hr>");
///
/// assert_eq!(
///     ctx.substitute("<h1>{name}</h1>{extra}{unknown}"),
///     "<h1>&lt;b&gt;cat&lt;/b&gt;</h1><hr>{unknown}"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    vars: HashMap<&'static str, String>,
}

impl PageContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an escaped text variable.
    pub fn with_text(mut self, key: &'static str, value: impl AsRef<str>) -> Self {
        self.vars.insert(key, escape(value.as_ref()));
        self
    }

    /// Add a pre-rendered HTML fragment.
    pub fn with_html(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.vars.insert(key, value.into());
        self
    }

    /// Substitute `{name}` placeholders in one pass.
    ///
    /// Unknown placeholders and braces that do not enclose an identifier
    /// (CSS blocks, for instance) are left as they are. Substituted values
    /// are never rescanned.
    pub fn substitute(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let name_len = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());

            let name = &after[..name_len];
            let closed = after[name_len..].starts_with('}');
            match self.vars.get(name) {
                Some(value) if closed && !name.is_empty() => {
                    out.push_str(value);
                    rest = &after[name_len + 1..];
                }
                _ => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Escape text for use in HTML content and quoted attributes.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const LAYOUT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Pixly</title>
<style>
body { font-family: system-ui, sans-serif; margin: 0; background: #f6f6f4; color: #222; }
nav.navbar { display: flex; gap: 1.5rem; align-items: center; padding: 0.75rem 1.5rem; background: #222; }
nav.navbar a { color: #fff; text-decoration: none; }
nav.navbar .brand { font-weight: bold; font-size: 1.2rem; }
main { max-width: 960px; margin: 0 auto; padding: 1.5rem; }
.flash { padding: 0.6rem 1rem; margin-bottom: 1rem; border-radius: 4px; }
.flash-success { background: #e3f4e1; }
.flash-info { background: #e4eef8; }
.flash-error { background: #f8e1e1; }
.gallery { display: grid; grid-template-columns: repeat(auto-fill, minmax(200px, 1fr)); gap: 1rem; list-style: none; padding: 0; }
.gallery img, .photo-details img, .preview img { max-width: 100%; }
label { display: block; margin-top: 0.75rem; }
table.metadata td, table.metadata th { padding: 0.25rem 0.75rem; text-align: left; }
</style>
</head>
<body>
<nav class="navbar">
<a class="brand" href="/">Pixly</a>
<a href="/">Catalog</a>
<a href="/addimage">Add New Image</a>
</nav>
<main>
{flashes}
{content}
</main>
</body>
</html>
"#;

/// Wrap page content in the shared layout.
pub fn layout(title: &str, flashes: &[Flash], content: &str) -> String {
    let flashes: String = flashes
        .iter()
        .map(|f| {
            format!(
                "<div class=\"flash flash-{}\">{}</div>\n",
                f.level.as_str(),
                escape(&f.message)
            )
        })
        .collect();

    PageContext::new()
        .with_text("title", title)
        .with_html("flashes", flashes)
        .with_html("content", content)
        .substitute(LAYOUT)
}

/// `<option>` list for a select, marking `selected`.
pub(crate) fn options<T: PartialEq + Copy>(
    all: &[T],
    selected: T,
    value: impl Fn(T) -> &'static str,
    label: impl Fn(T) -> &'static str,
) -> String {
    all.iter()
        .map(|&item| {
            let marker = if item == selected { " selected" } else { "" };
            format!(
                "<option value=\"{}\"{marker}>{}</option>\n",
                value(item),
                escape(label(item))
            )
        })
        .collect()
}

const ERROR_PAGE: &str = r#"<h1>{status}</h1>
<p class="error">{message}</p>
<p><a href="/">Back to the catalog</a></p>
"#;

/// Page rendered for server-side failures.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let content = PageContext::new()
        .with_text("status", status.to_string())
        .with_text("message", message)
        .substitute(ERROR_PAGE);
    layout("Error", &[], &content)
}
