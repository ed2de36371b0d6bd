use argo_core::{AppViewModel, Bound, PreviewTable, SearchStatus};

const MAX_CELL_WIDTH: usize = 18;

/// What has already been printed, so each render only emits the changes.
#[derive(Debug, Default)]
pub struct RenderCursor {
    status: SearchStatus,
    logs_printed: usize,
    error: Option<String>,
    preview_printed: bool,
}

/// Lines to print for the changes between the last render and `view`.
pub fn render(view: &AppViewModel, cursor: &mut RenderCursor) -> Vec<String> {
    let mut lines = Vec::new();

    if view.logs.len() < cursor.logs_printed {
        cursor.logs_printed = 0;
    }
    if view.status != cursor.status {
        if let Some(line) = status_line(view.status) {
            lines.push(line.to_string());
        }
        cursor.status = view.status;
    }
    for log in &view.logs[cursor.logs_printed..] {
        lines.push(format!("  > {log}"));
    }
    cursor.logs_printed = view.logs.len();

    if view.error != cursor.error {
        if let Some(error) = &view.error {
            lines.push(format!("error: {error}"));
        }
        cursor.error = view.error.clone();
    }

    match &view.preview {
        Some(preview) if !cursor.preview_printed => {
            if let Some(name) = &view.artifact_filename {
                lines.push(format!("Result: {name}"));
            }
            lines.extend(preview_lines(preview));
            cursor.preview_printed = true;
        }
        None => cursor.preview_printed = false,
        Some(_) => {}
    }
    lines
}

fn status_line(status: SearchStatus) -> Option<&'static str> {
    match status {
        SearchStatus::Idle => None,
        SearchStatus::Connecting => Some("Connecting to the data service..."),
        SearchStatus::Running => Some("Search running."),
        SearchStatus::Succeeded => Some("Search complete."),
        SearchStatus::Failed => Some("Search failed."),
    }
}

/// Full snapshot of the form and session, for the `show` command.
pub fn summary(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![
        format!("Bounds:   {}", format_bound(&view.bound)),
        match view.overlay {
            Some(rect) => format!(
                "Overlay:  N {} S {} E {} W {}",
                rect.north, rect.south, rect.east, rect.west
            ),
            None => "Overlay:  none".to_string(),
        },
        format!(
            "Dates:    {} .. {}",
            view.params.start_date, view.params.end_date
        ),
        format!(
            "Depth:    {} .. {} dbar",
            format_value(view.params.min_depth),
            format_value(view.params.max_depth)
        ),
        format!("Category: {}", view.params.category),
        format!("Fields:   {}", view.variables.join(", ")),
        format!("Status:   {:?}", view.status),
    ];
    if let Some(error) = &view.error {
        lines.push(format!("Error:    {error}"));
    }
    if let Some(preview) = &view.preview {
        lines.extend(preview_lines(preview));
    }
    lines
}

fn format_bound(bound: &Bound) -> String {
    format!(
        "N {} S {} E {} W {}",
        format_value(bound.north),
        format_value(bound.south),
        format_value(bound.east),
        format_value(bound.west)
    )
}

fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |value| value.to_string())
}

/// Column-aligned table of the preview rows.
pub fn preview_lines(preview: &PreviewTable) -> Vec<String> {
    let columns = preview
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(preview.column_count()))
        .max()
        .unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in std::iter::once(&preview.header).chain(&preview.rows) {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count().min(MAX_CELL_WIDTH));
        }
    }

    let format_row = |row: &[String]| {
        widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let cell = row.get(index).map(String::as_str).unwrap_or("");
                format!("{:<width$}", clip(cell), width = *width)
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(&preview.header[..])];
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    lines.extend(preview.rows.iter().map(|row| format_row(&row[..])));
    if preview.is_truncated() {
        lines.push(format!(
            "({} of {} rows shown)",
            preview.rows.len(),
            preview.total_rows
        ));
    } else if preview.rows.is_empty() {
        lines.push("(no data rows)".to_string());
    }
    lines
}

fn clip(cell: &str) -> String {
    if cell.chars().count() <= MAX_CELL_WIDTH {
        return cell.to_string();
    }
    let mut clipped: String = cell.chars().take(MAX_CELL_WIDTH - 1).collect();
    clipped.push('~');
    clipped
}

#[cfg(test)]
mod tests {
    use argo_core::{build_preview, AppViewModel, SearchStatus};
    use pretty_assertions::assert_eq;

    use super::{preview_lines, render, RenderCursor};

    #[test]
    fn only_new_logs_are_printed() {
        let mut cursor = RenderCursor::default();
        let mut view = AppViewModel {
            status: SearchStatus::Running,
            logs: vec!["one".to_string()],
            ..AppViewModel::default()
        };
        assert_eq!(
            render(&view, &mut cursor),
            vec!["Search running.".to_string(), "  > one".to_string()]
        );

        view.logs.push("two".to_string());
        assert_eq!(render(&view, &mut cursor), vec!["  > two".to_string()]);
        assert!(render(&view, &mut cursor).is_empty());
    }

    #[test]
    fn new_session_restarts_the_log() {
        let mut cursor = RenderCursor::default();
        let mut view = AppViewModel {
            status: SearchStatus::Running,
            logs: vec!["a".to_string(), "b".to_string()],
            ..AppViewModel::default()
        };
        render(&view, &mut cursor);

        view.status = SearchStatus::Connecting;
        view.logs.clear();
        render(&view, &mut cursor);
        view.status = SearchStatus::Running;
        view.logs = vec!["fresh".to_string()];
        assert_eq!(
            render(&view, &mut cursor),
            vec!["Search running.".to_string(), "  > fresh".to_string()]
        );
    }

    #[test]
    fn failure_prints_the_error_once() {
        let mut cursor = RenderCursor::default();
        let view = AppViewModel {
            status: SearchStatus::Failed,
            error: Some("No profiles found.".to_string()),
            ..AppViewModel::default()
        };
        assert_eq!(
            render(&view, &mut cursor),
            vec![
                "Search failed.".to_string(),
                "error: No profiles found.".to_string()
            ]
        );
        assert!(render(&view, &mut cursor).is_empty());
    }

    #[test]
    fn preview_table_is_aligned_and_counts_hidden_rows() {
        let csv: String = std::iter::once("date,lat".to_string())
            .chain((0..12).map(|i| format!("2023-01-{:02},{i}", i + 1)))
            .collect::<Vec<_>>()
            .join("\n");
        let lines = preview_lines(&build_preview(&csv));

        assert_eq!(lines[0], "date       | lat");
        assert_eq!(lines[1], "-----------+----");
        assert_eq!(lines[2], "2023-01-01 | 0");
        assert_eq!(lines.last().unwrap(), "(10 of 12 rows shown)");
        assert_eq!(lines.len(), 2 + 10 + 1);
    }
}
