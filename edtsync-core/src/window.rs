//! The date window a sync pass operates on.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{SyncError, SyncResult};

/// Events starting before `cutoff` are left untouched by a pass.
///
/// Built once at the start of a pass; the reader, the reconciler and the
/// executor all see the same value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncWindow {
    pub cutoff: DateTime<Utc>,
    pub include_past: bool,
}

impl SyncWindow {
    /// Window covering everything ever scheduled.
    pub fn everything() -> Self {
        SyncWindow {
            cutoff: DateTime::<Utc>::MIN_UTC,
            include_past: true,
        }
    }

    pub fn from_cutoff(cutoff: DateTime<Utc>) -> Self {
        SyncWindow {
            cutoff,
            include_past: false,
        }
    }

    /// Cutoff at local midnight today, or the whole history with `include_past`.
    pub fn starting_today(tz: Tz, include_past: bool) -> SyncResult<Self> {
        if include_past {
            return Ok(Self::everything());
        }

        let today = Utc::now().with_timezone(&tz).date_naive();
        Self::from_date(today, tz)
    }

    /// Cutoff at local midnight of `date`.
    pub fn from_date(date: NaiveDate, tz: Tz) -> SyncResult<Self> {
        let midnight = local_midnight(date, tz).ok_or_else(|| {
            SyncError::Config(format!("Midnight of {} does not exist in {}", date, tz))
        })?;

        Ok(Self::from_cutoff(midnight.with_timezone(&Utc)))
    }

    /// Parse a `YYYY-MM-DD` cutoff date, as given on the command line.
    pub fn from_arg(date: &str, tz: Tz) -> SyncResult<Self> {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            SyncError::Config(format!("Invalid date format '{}'. Expected YYYY-MM-DD", date))
        })?;
        Self::from_date(date, tz)
    }

    /// Window for a pass: an explicit `from` date, or today/everything.
    ///
    /// A cutoff date and `include_past` contradict each other, so asking for
    /// both is an error.
    pub fn resolve(from: Option<&str>, include_past: bool, tz: Tz) -> SyncResult<Self> {
        match from {
            Some(date) if include_past => Err(SyncError::Config(format!(
                "Cannot start at {} while include_past is set",
                date
            ))),
            Some(date) => Self::from_arg(date, tz),
            None => Self::starting_today(tz, include_past),
        }
    }

    /// Lower bound to hand to the remote query (`None` = unbounded).
    pub fn start_bound(&self) -> Option<DateTime<Utc>> {
        if self.include_past {
            None
        } else {
            Some(self.cutoff)
        }
    }

    pub fn contains<T: TimeZone>(&self, start: &DateTime<T>) -> bool {
        self.include_past || start.with_timezone(&Utc) >= self.cutoff
    }
}

/// Midnight of `date` in `tz`. Where midnight is skipped by a DST change,
/// the earliest valid instant of that day is used instead.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> Option<DateTime<Tz>> {
    let naive = date.and_time(NaiveTime::MIN);

    tz.from_local_datetime(&naive).earliest().or_else(|| {
        (1..=3)
            .filter_map(|h| NaiveTime::from_hms_opt(h, 0, 0))
            .find_map(|t| tz.from_local_datetime(&date.and_time(t)).earliest())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Sao_Paulo;
    use chrono_tz::Europe::Paris;

    #[test]
    fn test_include_past_is_unbounded() {
        let window = SyncWindow::starting_today(Paris, true).unwrap();

        assert!(window.include_past);
        assert_eq!(window.start_bound(), None);
        assert!(window.contains(&Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_from_arg_uses_local_midnight() {
        let window = SyncWindow::from_arg("2024-01-10", Paris).unwrap();

        // Paris is UTC+1 in January
        assert_eq!(
            window.cutoff,
            Utc.with_ymd_and_hms(2024, 1, 9, 23, 0, 0).unwrap()
        );
        assert_eq!(window.start_bound(), Some(window.cutoff));
    }

    #[test]
    fn test_from_arg_rejects_garbage() {
        assert!(SyncWindow::from_arg("10/01/2024", Paris).is_err());
    }

    #[test]
    fn test_resolve_rejects_cutoff_with_include_past() {
        let err = SyncWindow::resolve(Some("2024-01-10"), true, Paris).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));

        let window = SyncWindow::resolve(Some("2024-01-10"), false, Paris).unwrap();
        assert_eq!(window, SyncWindow::from_arg("2024-01-10", Paris).unwrap());

        let window = SyncWindow::resolve(None, true, Paris).unwrap();
        assert!(window.include_past);
    }

    #[test]
    fn test_contains_is_inclusive_at_cutoff() {
        let window = SyncWindow::from_arg("2024-01-10", Paris).unwrap();

        let at_cutoff = Paris.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap();
        let before = Paris.with_ymd_and_hms(2024, 1, 9, 23, 59, 59).unwrap();

        assert!(window.contains(&at_cutoff));
        assert!(!window.contains(&before));
    }

    #[test]
    fn test_midnight_skipped_by_dst() {
        // Sao Paulo skipped 2018-11-04 00:00 (clocks went to 01:00)
        let date = NaiveDate::from_ymd_opt(2018, 11, 4).unwrap();
        let midnight = local_midnight(date, Sao_Paulo).unwrap();

        assert_eq!(midnight.date_naive(), date);
    }
}
