//! Build report rendering.

use owo_colors::{OwoColorize, Stream, Style};
use sether_build::ReportRow;

const HEADERS: [&str; 4] = ["File", "Size", "Gzipped", "Time"];
const GAP: &str = "   ";

/// Render the size table as plain text, one line per row plus a header.
///
/// File names are left-aligned, the numeric columns right-aligned.
pub fn render_table(rows: &[ReportRow]) -> Vec<String> {
    let cells: Vec<[&str; 4]> = rows
        .iter()
        .map(|row| {
            [
                row.file_name.as_str(),
                row.human_size.as_str(),
                row.gzip_size.as_str(),
                row.duration_label.as_str(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    std::iter::once(HEADERS)
        .chain(cells)
        .map(|row| {
            format!(
                "{:<w0$}{GAP}{:>w1$}{GAP}{:>w2$}{GAP}{:>w3$}",
                row[0],
                row[1],
                row[2],
                row[3],
                w0 = widths[0],
                w1 = widths[1],
                w2 = widths[2],
                w3 = widths[3],
            )
            .trim_end()
            .to_string()
        })
        .collect()
}

/// Print the size table to stdout.
pub fn print_report_table(rows: &[ReportRow]) {
    if rows.is_empty() {
        return;
    }
    let mut lines = render_table(rows).into_iter();
    if let Some(header) = lines.next() {
        println!(
            "  {}",
            header.if_supports_color(Stream::Stdout, |t| t.style(Style::new().bold().underline()))
        );
    }
    for line in lines {
        println!("  {line}");
    }
    println!();
}

/// Closing note under the size table.
pub fn print_footer() {
    println!(
        "  {}",
        "Images and other types of assets omitted.".if_supports_color(Stream::Stdout, |t| t.dimmed())
    );
    println!();
}

/// Text printed for a successful build that produced warnings.
pub fn warnings_text(warnings: &[String]) -> String {
    let mut text = String::from("Compiled with warnings.\n\n");
    text.push_str(&warnings.join("\n\n"));
    text.push_str("\n\nSearch for the keywords to learn more about each warning.\n");
    text.push_str("To ignore, add // eslint-disable-next-line to the line before.\n");
    text
}

/// Print collected warnings to stderr. Prints nothing for an empty list.
pub fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    eprintln!(
        "{}",
        warnings_text(warnings).if_supports_color(Stream::Stderr, |t| t.yellow())
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(file: &str, size: &str, gzip: &str, time: &str) -> ReportRow {
        ReportRow {
            file_name: file.to_string(),
            human_size: size.to_string(),
            gzip_size: gzip.to_string(),
            duration_label: time.to_string(),
        }
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let lines = render_table(&[
            row("widgets.esm.js", "12.40 KB", "3.10 KB", "820ms"),
            row("widgets.umd.js", "980 B", "412 B", "1.50s"),
        ]);

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("File"));
        assert!(lines[1].starts_with("widgets.esm.js"));
        assert_eq!(lines[2], "widgets.umd.js      980 B     412 B   1.50s");
        assert_eq!(lines[1].len(), lines[2].len());
    }

    #[test]
    fn test_render_table_header_only() {
        let lines = render_table(&[]);
        assert_eq!(lines, vec!["File   Size   Gzipped   Time".to_string()]);
    }

    #[test]
    fn test_warnings_text() {
        let text = warnings_text(&["first".to_string(), "second".to_string()]);
        assert!(text.starts_with("Compiled with warnings.\n\nfirst\n\nsecond\n\n"));
        assert!(text.contains("eslint-disable-next-line"));
    }
}
