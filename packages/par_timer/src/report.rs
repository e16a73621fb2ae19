//! Human-readable summary of a timer.

use std::fmt;
use std::time::Duration;

use bytesize::ByteSize;

use crate::Record;

const HEADERS: [&str; 7] = ["name", "time (s)", "gc %", "allocs", "bytes", "thread", "pid"];

/// Snapshot of a timer's records together with the time elapsed since the timer was created.
///
/// A `Report` is detached from its timer and can be sent to other threads for processing.
///
/// # Examples
///
/// ```
/// use par_timer::Timer;
///
/// let timer = Timer::new();
/// timer.record("step", || std::thread::sleep(std::time::Duration::from_millis(1)));
///
/// let report = timer.report();
/// assert_eq!(report.rows().len(), 1);
/// assert!(report.accounted_percentage() <= 100.0);
///
/// report.print_to_stdout();
/// ```
#[derive(Clone, Debug)]
pub struct Report {
    total_elapsed: Duration,
    rows: Vec<Record>,
}

impl Report {
    pub(crate) fn new(total_elapsed: Duration, rows: Vec<Record>) -> Self {
        Self {
            total_elapsed,
            rows,
        }
    }

    /// Time from the creation of the timer until the snapshot was taken.
    #[must_use]
    pub fn total_elapsed(&self) -> Duration {
        self.total_elapsed
    }

    /// The records in the snapshot, in merge order.
    #[must_use]
    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    /// Whether the snapshot holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of the time of all records as a percentage of the total elapsed time.
    ///
    /// Overlapping calls on several threads can push this above 100.
    #[must_use]
    pub fn accounted_percentage(&self) -> f64 {
        let total = self.total_elapsed.as_secs_f64();

        if total > 0.0 {
            self.rows.iter().map(Record::time_seconds).sum::<f64>() / total * 100.0
        } else {
            0.0
        }
    }

    /// Prints the report to stdout.
    #[cfg_attr(test, mutants::skip)] // Too difficult to test stdout output reliably - manually tested.
    pub fn print_to_stdout(&self) {
        println!("{self}");
    }

    /// Rows sorted by descending time. Ties keep their merge order.
    fn rows_by_time(&self) -> Vec<&Record> {
        let mut sorted: Vec<_> = self.rows.iter().collect();
        sorted.sort_by(|a, b| b.time_seconds().total_cmp(&a.time_seconds()));
        sorted
    }
}

/// Formats a byte count using binary magnitude units (KiB, MiB, ...).
///
/// # Examples
///
/// ```
/// use par_timer::format_bytes;
///
/// assert_eq!(format_bytes(100), "100 B");
/// assert!(format_bytes(3 * 1024 * 1024).ends_with("MiB"));
/// ```
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    ByteSize::b(bytes).display().iec().to_string()
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Total elapsed: {:.3} s, accounted for: {:.2}%",
            self.total_elapsed.as_secs_f64(),
            self.accounted_percentage()
        )?;

        if self.rows.is_empty() {
            return writeln!(f, "No entries.");
        }

        let cells: Vec<[String; 7]> = self
            .rows_by_time()
            .into_iter()
            .map(|row| {
                [
                    row.name().to_string(),
                    format!("{:.6}", row.time_seconds()),
                    format!("{:.2}%", row.gc_percentage()),
                    row.alloc_count().to_string(),
                    format_bytes(row.bytes_allocated().unsigned_abs()),
                    row.thread_id().to_string(),
                    row.process_id().to_string(),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(str::len);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_line(f, &HEADERS, &widths)?;

        for row in &cells {
            write_line(f, row, &widths)?;
        }

        Ok(())
    }
}

/// The name column is left-aligned, all numeric columns right-aligned.
fn write_line(
    f: &mut fmt::Formatter<'_>,
    cells: &[impl AsRef<str>; 7],
    widths: &[usize; 7],
) -> fmt::Result {
    for (index, (cell, width)) in cells.iter().zip(widths).enumerate() {
        let cell = cell.as_ref();
        let width = *width;

        if index == 0 {
            write!(f, "{cell:<width$}")?;
        } else {
            write!(f, "  {cell:>width$}")?;
        }
    }

    writeln!(f)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn record(name: &str, millis: u64, bytes: u64) -> Record {
        Record::new(
            name.to_string(),
            Duration::from_millis(millis),
            Duration::ZERO,
            1,
            bytes,
            1,
            100,
        )
    }

    #[test]
    fn empty_report_says_no_entries() {
        let report = Report::new(Duration::from_secs(2), Vec::new());

        let text = report.to_string();

        assert!(report.is_empty());
        assert!(text.starts_with("Total elapsed: 2.000 s, accounted for: 0.00%"));
        assert!(text.contains("No entries."));
        assert!(!text.contains("gc %"));
    }

    #[test]
    fn accounted_percentage_sums_row_times() {
        let report = Report::new(
            Duration::from_secs(2),
            vec![record("a", 500, 0), record("b", 500, 0)],
        );

        assert!((report.accounted_percentage() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn zero_elapsed_accounts_for_nothing() {
        let report = Report::new(Duration::ZERO, vec![record("a", 0, 0)]);

        assert!(report.accounted_percentage().abs() < f64::EPSILON);
    }

    #[test]
    fn table_is_sorted_by_descending_time() {
        let report = Report::new(
            Duration::from_secs(1),
            vec![
                record("fast", 10, 0),
                record("slow", 300, 0),
                record("medium", 100, 0),
            ],
        );

        let text = report.to_string();
        let slow = text.find("slow").unwrap();
        let medium = text.find("medium").unwrap();
        let fast = text.find("fast").unwrap();

        assert!(slow < medium);
        assert!(medium < fast);
    }

    #[test]
    fn table_renders_gc_percentage_and_bytes() {
        let report = Report::new(Duration::from_secs(1), vec![record("a", 100, 2048)]);

        let text = report.to_string();

        assert!(text.contains("0.00%"));
        assert!(text.contains(&format_bytes(2048)));
        assert!(text.contains("KiB"));
        assert!(text.contains("0.100000"));
    }

    #[test]
    fn table_lines_have_equal_width() {
        let report = Report::new(
            Duration::from_secs(1),
            vec![
                record("a", 1, 1),
                record("a much longer name", 1000, 5_000_000),
            ],
        );

        let text = report.to_string();
        let widths: Vec<usize> = text.lines().skip(1).map(|l| l.chars().count()).collect();

        assert_eq!(widths.len(), 3);
        assert!(widths.iter().all(|w| *w == widths[0]));
    }

    #[test]
    fn format_bytes_units() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert!(format_bytes(1024).ends_with("KiB"));
        assert!(format_bytes(5 * 1024 * 1024 * 1024).starts_with('5'));
        assert!(format_bytes(5 * 1024 * 1024 * 1024).ends_with("GiB"));
    }

    static_assertions::assert_impl_all!(Report: Send, Sync);
}
