use std::io::Cursor;

use docx_rs::{
    AlignmentType, Docx, Paragraph, Run, RunFonts, Style, StyleType, Table, TableCell, TableRow,
};

use crate::error::ExportError;
use crate::styles::DocumentStyles;

/// Build a DOCX document from a rendered report.
///
/// Understands the subset the report template emits:
/// - `# ` and `## ` / `### ` headings
/// - `- item` bullets
/// - `| a | b |` table rows, the first row of a table being its header and
///   `|---|` separator rows being skipped
/// - `**bold**` inline runs
///
/// Anything else becomes a body paragraph.
pub fn generate_docx(rendered: &str, styles: &DocumentStyles) -> Result<Vec<u8>, ExportError> {
    let mut docx = Docx::new()
        .add_style(heading_style("Heading1", "heading 1", styles.heading1_size, styles))
        .add_style(heading_style("Heading2", "heading 2", styles.heading2_size, styles))
        .add_style(heading_style("Heading3", "heading 3", styles.body_size, styles));

    let mut table_rows: Vec<Vec<String>> = Vec::new();

    for line in rendered.lines() {
        let trimmed = line.trim();

        if let Some(cells) = table_cells(trimmed) {
            if !is_separator_row(&cells) {
                table_rows.push(cells);
            }
            continue;
        }
        if !table_rows.is_empty() {
            docx = docx.add_table(build_table(&table_rows, styles));
            table_rows.clear();
        }

        if trimmed.is_empty() {
            continue;
        }

        let paragraph = if let Some(text) = trimmed.strip_prefix("### ") {
            heading_paragraph(text, "Heading3")
        } else if let Some(text) = trimmed.strip_prefix("## ") {
            heading_paragraph(text, "Heading2")
        } else if let Some(text) = trimmed.strip_prefix("# ") {
            heading_paragraph(text, "Heading1")
        } else if let Some(text) = trimmed.strip_prefix("- ") {
            bullet_paragraph(text, styles)
        } else {
            inline_paragraph(text_runs(trimmed, &styles.body_font, styles.body_size))
        };
        docx = docx.add_paragraph(paragraph);
    }

    if !table_rows.is_empty() {
        docx = docx.add_table(build_table(&table_rows, styles));
    }

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| ExportError::Docx(e.to_string()))?;

    Ok(buf.into_inner())
}

fn heading_style(style_id: &str, name: &str, size_pt: usize, styles: &DocumentStyles) -> Style {
    Style::new(style_id, StyleType::Paragraph)
        .name(name)
        .size(size_pt * 2) // half-points
        .bold()
        .fonts(RunFonts::new().ascii(&styles.heading_font))
}

fn heading_paragraph(text: &str, style_id: &str) -> Paragraph {
    Paragraph::new()
        .style(style_id)
        .add_run(Run::new().add_text(text))
}

fn bullet_paragraph(text: &str, styles: &DocumentStyles) -> Paragraph {
    let bullet = Run::new()
        .add_text("\u{2022} ")
        .size(styles.body_size * 2)
        .fonts(RunFonts::new().ascii(&styles.body_font));

    let mut runs = vec![bullet];
    runs.extend(text_runs(text, &styles.body_font, styles.body_size));
    inline_paragraph(runs)
}

fn inline_paragraph(runs: Vec<Run>) -> Paragraph {
    runs.into_iter()
        .fold(Paragraph::new().align(AlignmentType::Left), |p, run| {
            p.add_run(run)
        })
}

/// Cells of a `| a | b |` line, or `None` if the line is not a table row.
fn table_cells(line: &str) -> Option<Vec<String>> {
    let inner = line.strip_prefix('|')?.strip_suffix('|')?;
    Some(inner.split('|').map(|c| c.trim().to_string()).collect())
}

fn is_separator_row(cells: &[String]) -> bool {
    cells
        .iter()
        .all(|c| !c.is_empty() && c.chars().all(|ch| ch == '-' || ch == ':'))
}

fn build_table(rows: &[Vec<String>], styles: &DocumentStyles) -> Table {
    let rows = rows
        .iter()
        .enumerate()
        .map(|(i, cells)| {
            let cells = cells
                .iter()
                .map(|text| {
                    let mut runs = text_runs(text, &styles.body_font, styles.table_size);
                    if i == 0 {
                        runs = runs.into_iter().map(Run::bold).collect();
                    }
                    TableCell::new().add_paragraph(inline_paragraph(runs))
                })
                .collect();
            TableRow::new(cells)
        })
        .collect();
    Table::new(rows)
}

/// Split text on `**` markers into plain and bold runs. An unmatched
/// marker leaves the rest of the text plain.
fn text_runs(text: &str, font: &str, size_pt: usize) -> Vec<Run> {
    let run = |s: &str| {
        Run::new()
            .add_text(s)
            .size(size_pt * 2)
            .fonts(RunFonts::new().ascii(font))
    };

    let mut runs = Vec::new();
    let mut remaining = text;
    while let Some(start) = remaining.find("**") {
        let after = &remaining[start + 2..];
        let Some(end) = after.find("**") else {
            break;
        };
        if start > 0 {
            runs.push(run(&remaining[..start]));
        }
        runs.push(run(&after[..end]).bold());
        remaining = &after[end + 2..];
    }
    if !remaining.is_empty() {
        runs.push(run(remaining));
    }
    runs
}
