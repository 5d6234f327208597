//! A calendar file that has been read and checked to parse.

use std::path::Path;

use icalendar::parser::{read_calendar, unfold};

use crate::error::{SyncError, SyncResult};

/// Raw ICS content that is known to parse as a calendar.
///
/// The content is kept unfolded so the normalizer can re-parse it as many
/// times as it likes and always get the same components.
#[derive(Debug, Clone)]
pub struct IcsSource {
    unfolded: String,
}

impl IcsSource {
    pub fn from_path(path: &Path) -> SyncResult<Self> {
        let bytes = std::fs::read(path)
            .map_err(|e| SyncError::Source(format!("{}: {}", path.display(), e)))?;

        // Timetable exports are not always valid UTF-8
        let content = String::from_utf8_lossy(&bytes);

        Self::from_string(&content)
            .map_err(|e| SyncError::Source(format!("{}: {}", path.display(), source_message(e))))
    }

    pub fn from_string(content: &str) -> SyncResult<Self> {
        let unfolded = unfold(content).trim().to_string();

        if !unfolded.contains("BEGIN:VCALENDAR") {
            return Err(SyncError::Source("not a calendar file (no VCALENDAR)".into()));
        }

        read_calendar(&unfolded).map_err(|e| SyncError::Source(format!("{}", e)))?;

        Ok(IcsSource { unfolded })
    }

    pub(crate) fn unfolded(&self) -> &str {
        &self.unfolded
    }
}

fn source_message(err: SyncError) -> String {
    match err {
        SyncError::Source(message) => message,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:TEST\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn test_from_path_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        assert!(IcsSource::from_path(file.path()).is_ok());
    }

    #[test]
    fn test_missing_file_is_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = IcsSource::from_path(&dir.path().join("edt.ics")).unwrap_err();

        assert!(matches!(err, SyncError::Source(_)));
        assert!(err.to_string().contains("edt.ics"));
    }

    #[test]
    fn test_non_calendar_content_is_source_error() {
        let err = IcsSource::from_string("<html>Session expired</html>").unwrap_err();

        assert!(matches!(err, SyncError::Source(_)));
    }
}
