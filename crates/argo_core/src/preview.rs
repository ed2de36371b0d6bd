pub const PREVIEW_ROWS: usize = 10;

/// First rows of a delimited-text payload, for display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Non-empty data lines in the whole payload.
    pub total_rows: usize,
}

impl PreviewTable {
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    pub fn is_truncated(&self) -> bool {
        self.total_rows > self.rows.len()
    }
}

/// Splits `raw` into a header and at most [`PREVIEW_ROWS`] data rows.
///
/// Never fails: empty or short input yields fewer rows, and rows are not
/// checked against the header width.
pub fn build_preview(raw: &str) -> PreviewTable {
    let mut lines = raw
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line));
    let header = split_row(lines.next().unwrap_or(""));

    let mut rows = Vec::with_capacity(PREVIEW_ROWS);
    let mut total_rows = 0;
    for line in lines.filter(|line| !line.is_empty()) {
        if rows.len() < PREVIEW_ROWS {
            rows.push(split_row(line));
        }
        total_rows += 1;
    }

    PreviewTable {
        header,
        rows,
        total_rows,
    }
}

fn split_row(line: &str) -> Vec<String> {
    line.split(',').map(ToOwned::to_owned).collect()
}
