//! All-or-nothing file output.

use maline_types::MaRecord;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{CsvFormatter, FormatError};

/// Writes `records` to `path` as CSV, replacing any existing file.
///
/// Rows are written to a temporary file in the destination directory, which
/// is synced and then renamed over `path`. On any error the temporary file is
/// removed and `path` is left untouched.
///
/// # Errors
///
/// Returns an error if the records are not strictly ascending or any file
/// operation fails.
pub fn write_csv_atomic(path: impl AsRef<Path>, records: &[MaRecord]) -> Result<(), FormatError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_error = |source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = NamedTempFile::new_in(parent).map_err(io_error)?;
    write_rows(&mut file, records, path)?;
    file.as_file().sync_all().map_err(io_error)?;

    let temp = file.path().to_path_buf();
    file.persist(path).map_err(|e| io_error(e.error))?;
    debug!(from = %temp.display(), to = %path.display(), rows = records.len(), "feed persisted");
    Ok(())
}

/// Writes the CSV rows through a buffer, attributing stream failures to
/// `path`.
fn write_rows<W: Write>(writer: W, records: &[MaRecord], path: &Path) -> Result<(), FormatError> {
    let io_error = |source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = BufWriter::new(writer);
    CsvFormatter::new()
        .write_records(records, &mut writer)
        .map_err(|e| match e {
            FormatError::Write(source) => io_error(source),
            other => other,
        })?;
    writer.flush().map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::io;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Rejects every write, like a full disk.
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn records() -> Vec<MaRecord> {
        (0..3)
            .map(|h| {
                MaRecord::new(
                    Utc.with_ymd_and_hms(2025, 1, 28, h, 0, 0).unwrap(),
                    Decimal::new(1000 + i64::from(h), 1),
                    Decimal::new(900, 1),
                )
            })
            .collect()
    }

    fn entries(dir: &TempDir) -> usize {
        std::fs::read_dir(dir.path()).unwrap().count()
    }

    #[test]
    fn test_writes_complete_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feed.csv");

        write_csv_atomic(&path, &records()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "timestamp,ma30,ma60\n2025012800,100.0,90.0\n2025012801,100.1,90.0\n2025012802,100.2,90.0\n"
        );
        assert_eq!(entries(&dir), 1);
    }

    #[test]
    fn test_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feed.csv");
        std::fs::write(&path, "stale").unwrap();

        write_csv_atomic(&path, &records()).unwrap();

        assert!(std::fs::read_to_string(&path).unwrap().starts_with("timestamp,"));
    }

    #[test]
    fn test_failure_leaves_target_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("feed.csv");
        std::fs::write(&path, "previous run").unwrap();

        let mut unordered = records();
        unordered.reverse();
        assert!(write_csv_atomic(&path, &unordered).is_err());

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous run");
        // The temporary file is gone too.
        assert_eq!(entries(&dir), 1);
    }

    #[test]
    fn test_write_failure_names_path() {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        // Enough rows to overflow the write buffer mid-stream.
        let many: Vec<MaRecord> = (0..2000)
            .map(|h| MaRecord::new(start + TimeDelta::hours(h), Decimal::ONE, Decimal::TWO))
            .collect();
        let path = PathBuf::from("feeds/sol.csv");

        let err = write_rows(FullDisk, &many, &path).unwrap_err();

        match &err {
            FormatError::Io { path: failed, .. } => assert_eq!(failed, &path),
            other => panic!("expected an I/O error carrying the path, got {other:?}"),
        }
        assert!(err.to_string().contains("feeds/sol.csv"));
        assert!(err.to_string().contains("no space left on device"));
    }

    #[test]
    fn test_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent").join("feed.csv");

        let err = write_csv_atomic(&path, &records()).unwrap_err();
        assert!(matches!(err, FormatError::Io { .. }));
        assert!(!path.exists());
    }
}
