// 🧾 HTML table extraction for sources without a structured API
//
// Disclosure pages publish one `<table>`; we only need its data rows as
// plain-text cells. Header rows (`<th>` only) are skipped.

use regex::Regex;
use std::sync::OnceLock;

fn table_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<table\b[^>]*>(.*?)</table\s*>").expect("valid regex"))
}

fn row_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<tr\b[^>]*>(.*?)</tr\s*>").expect("valid regex"))
}

fn cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<td\b[^>]*>(.*?)</td\s*>").expect("valid regex"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"))
}

/// Data rows of the first `<table>` in `html`, each as its `<td>` texts.
/// `None` when the page has no table.
pub fn first_table_rows(html: &str) -> Option<Vec<Vec<String>>> {
    let table = table_re().captures(html)?.get(1)?.as_str();

    let rows = row_re()
        .captures_iter(table)
        .filter_map(|row| {
            let cells: Vec<String> = cell_re()
                .captures_iter(row.get(1)?.as_str())
                .filter_map(|cell| cell.get(1).map(|m| cell_text(m.as_str())))
                .collect();
            (!cells.is_empty()).then_some(cells)
        })
        .collect();

    Some(rows)
}

/// Visible text of a cell: tags removed, common entities decoded,
/// whitespace collapsed.
pub fn cell_text(fragment: &str) -> String {
    let stripped = tag_re().replace_all(fragment, " ");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&eacute;", "é")
        .replace("&egrave;", "è")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
