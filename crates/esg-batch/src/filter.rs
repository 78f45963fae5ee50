//! Executive summary extraction

/// Marker line the analysis program prints before its summary
pub const DEFAULT_MARKER: &str = "EXECUTIVE SUMMARY";

/// Lines kept after each marker line
pub const DEFAULT_CONTEXT_LINES: usize = 10;

/// Keeps each marker line and the lines after it, like `grep -A`
///
/// Overlapping windows merge; separate groups are joined by a `--` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryFilter {
    marker: String,
    after: usize,
}

impl Default for SummaryFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER, DEFAULT_CONTEXT_LINES)
    }
}

impl SummaryFilter {
    pub fn new(marker: impl Into<String>, after: usize) -> Self {
        Self {
            marker: marker.into(),
            after,
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    pub fn after(&self) -> usize {
        self.after
    }

    /// Matching lines of `output`; empty when the marker never appears
    pub fn apply(&self, output: &str) -> Vec<String> {
        let mut kept = Vec::new();
        let mut last_kept: Option<usize> = None;
        let mut window_end: Option<usize> = None;

        for (i, line) in output.lines().enumerate() {
            if line.contains(&self.marker) {
                if last_kept.is_some_and(|last| i > last + 1) {
                    kept.push("--".to_string());
                }
                window_end = Some(i + self.after);
            }
            if window_end.is_some_and(|end| i <= end) {
                kept.push(line.to_string());
                last_kept = Some(i);
            }
        }
        kept
    }
}
