//! Rendering of outdated dependency reports

use crate::version::types::{OutdatedFinding, OutdatedReport};

const HEADERS: [&str; 5] = ["Job", "Step Name", "Action", "Specified", "Latest"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Plain,
    Markdown,
}

/// Render one section per workflow, separated by blank lines
pub fn format_outdated(report: &OutdatedReport, format: ReportFormat) -> String {
    report
        .iter()
        .map(|(workflow, findings)| {
            let rows: Vec<[String; 5]> = findings.iter().map(row).collect();
            match format {
                ReportFormat::Plain => format!("{}\n{}", workflow, plain_table(&rows)),
                ReportFormat::Markdown => format!("## {}\n\n{}", workflow, markdown_table(&rows)),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn row(finding: &OutdatedFinding) -> [String; 5] {
    let dependency = &finding.dependency;
    [
        dependency.job.clone(),
        dependency.step_name.clone().unwrap_or_default(),
        dependency.uses.action.to_string(),
        dependency.uses.constraint.to_string(),
        finding.latest.version.to_string(),
    ]
}

fn column_widths(rows: &[[String; 5]]) -> [usize; 5] {
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }
    widths
}

fn pad(cell: &str, width: usize) -> String {
    format!("{:<width$}", cell, width = width)
}

fn plain_table(rows: &[[String; 5]]) -> String {
    let widths = column_widths(rows);
    let line = |cells: [&str; 5]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| pad(cell, width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![
        line(HEADERS),
        widths
            .map(|width| "-".repeat(width))
            .join("  "),
    ];
    lines.extend(rows.iter().map(|row| line(row.each_ref().map(String::as_str))));

    lines.join("\n") + "\n"
}

fn markdown_table(rows: &[[String; 5]]) -> String {
    let rows: Vec<[String; 5]> = rows
        .iter()
        .map(|row| row.each_ref().map(|cell| cell.replace('|', "\\|")))
        .collect();
    let widths = column_widths(&rows).map(|width| width.max(3));
    let line = |cells: [&str; 5]| {
        let cells: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| pad(cell, width))
            .collect();
        format!("| {} |", cells.join(" | "))
    };

    let mut lines = vec![
        line(HEADERS),
        format!(
            "|{}|",
            widths
                .map(|width| "-".repeat(width + 2))
                .join("|")
        ),
    ];
    lines.extend(rows.iter().map(|row| line(row.each_ref().map(String::as_str))));

    lines.join("\n") + "\n"
}
