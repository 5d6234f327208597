//! VEVENT components → canonical [`Event`]s.

use chrono::{DateTime, Days, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, read_calendar},
};

use crate::classify::Classifier;
use crate::error::{SyncError, SyncResult};
use crate::event::Event;
use crate::ics::source::IcsSource;
use crate::ics::text;
use crate::window::local_midnight;

/// A VEVENT that could not be turned into an [`Event`] and was skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedComponent {
    /// 1-based position among the file's VEVENTs.
    pub index: usize,
    pub uid: Option<String>,
    pub reason: String,
}

impl From<&MalformedComponent> for SyncError {
    fn from(component: &MalformedComponent) -> Self {
        SyncError::MalformedComponent {
            index: component.index,
            reason: component.reason.clone(),
        }
    }
}

/// Result of normalizing one calendar file.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    /// Events in file order.
    pub events: Vec<Event>,
    pub skipped: Vec<MalformedComponent>,
}

pub struct Normalizer<'a> {
    timezone: Tz,
    classifier: &'a Classifier,
}

impl<'a> Normalizer<'a> {
    pub fn new(timezone: Tz, classifier: &'a Classifier) -> Self {
        Normalizer {
            timezone,
            classifier,
        }
    }

    /// Normalize every VEVENT of `source`.
    ///
    /// Components that cannot be read are skipped with a warning; the rest of
    /// the file is still normalized.
    pub fn normalize(&self, source: &IcsSource) -> SyncResult<Normalized> {
        let calendar =
            read_calendar(source.unfolded()).map_err(|e| SyncError::Source(format!("{}", e)))?;

        let mut vevents = Vec::new();
        collect_vevents(&calendar.components, &mut vevents);

        let mut normalized = Normalized::default();

        for (i, vevent) in vevents.into_iter().enumerate() {
            match self.normalize_component(vevent) {
                Ok(event) => normalized.events.push(event),
                Err(reason) => {
                    let skipped = MalformedComponent {
                        index: i + 1,
                        uid: vevent.find_prop("UID").map(|p| p.val.to_string()),
                        reason,
                    };
                    tracing::warn!(
                        index = skipped.index,
                        uid = skipped.uid.as_deref().unwrap_or("-"),
                        "{}",
                        SyncError::from(&skipped)
                    );
                    normalized.skipped.push(skipped);
                }
            }
        }

        tracing::debug!(
            events = normalized.events.len(),
            skipped = normalized.skipped.len(),
            "Normalized calendar file"
        );

        Ok(normalized)
    }

    fn normalize_component(&self, vevent: &Component) -> Result<Event, String> {
        let title = text_prop(vevent, "SUMMARY");
        let location = text_prop(vevent, "LOCATION");
        let description = text_prop(vevent, "DESCRIPTION");

        let dtstart = vevent.find_prop("DTSTART").ok_or("missing DTSTART")?;
        let start_value = DatePerhapsTime::try_from(dtstart)
            .map_err(|_| format!("unreadable DTSTART '{}'", dtstart.val.as_ref()))?;
        let all_day = matches!(start_value, DatePerhapsTime::Date(_));
        let start = self.resolve(start_value)?;

        let end = if let Some(dtend) = vevent.find_prop("DTEND") {
            let end_value = DatePerhapsTime::try_from(dtend)
                .map_err(|_| format!("unreadable DTEND '{}'", dtend.val.as_ref()))?;
            self.resolve(end_value)?
        } else if let Some(duration) = vevent.find_prop("DURATION") {
            let value = duration.val.as_ref();
            start
                .checked_add_signed(parse_duration(value)?)
                .ok_or_else(|| format!("DURATION '{}' out of range", value))?
        } else if all_day {
            let next_day = start
                .date_naive()
                .checked_add_days(Days::new(1))
                .ok_or("date out of range")?;
            local_midnight(next_day, self.timezone).ok_or("date out of range")?
        } else {
            start
        };

        Event::new(title, location, description, start, end, self.classifier)
            .ok_or_else(|| format!("ends ({}) before it starts ({})", end, start))
    }

    /// Turn a DTSTART/DTEND value into a date-time in the configured timezone.
    fn resolve(&self, value: DatePerhapsTime) -> Result<DateTime<Tz>, String> {
        match value {
            DatePerhapsTime::Date(date) => local_midnight(date, self.timezone)
                .ok_or_else(|| format!("{} has no midnight in {}", date, self.timezone)),
            DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => {
                Ok(dt.with_timezone(&self.timezone))
            }
            DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
                localize(&naive, self.timezone)
            }
            DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
                let zone = parse_tzid(&tzid).unwrap_or_else(|| {
                    tracing::warn!(
                        tzid = %tzid,
                        fallback = %self.timezone,
                        "Unknown TZID, using configured timezone"
                    );
                    self.timezone
                });
                localize(&date_time, zone).map(|dt| dt.with_timezone(&self.timezone))
            }
        }
    }
}

fn collect_vevents<'c, 'a>(components: &'c [Component<'a>], out: &mut Vec<&'c Component<'a>>) {
    for component in components {
        if component.name == "VEVENT" {
            out.push(component);
        } else if component.name == "VCALENDAR" {
            collect_vevents(&component.components, out);
        }
    }
}

fn text_prop(vevent: &Component, name: &str) -> String {
    vevent
        .find_prop(name)
        .map(|p| text::unescape(p.val.as_ref()))
        .unwrap_or_default()
}

fn localize(naive: &NaiveDateTime, zone: Tz) -> Result<DateTime<Tz>, String> {
    zone.from_local_datetime(naive)
        .earliest()
        .ok_or_else(|| format!("{} does not exist in {}", naive, zone))
}

/// Resolve a TZID to an IANA zone, tolerating vendor prefixes such as
/// `/freeassociation.sourceforge.net/Europe/Paris`.
fn parse_tzid(tzid: &str) -> Option<Tz> {
    let tzid = tzid.trim_matches('"');

    if let Ok(tz) = tzid.parse::<Tz>() {
        return Some(tz);
    }

    tzid.match_indices('/')
        .find_map(|(i, _)| tzid[i + 1..].parse::<Tz>().ok())
}

fn parse_duration(value: &str) -> Result<chrono::Duration, String> {
    if value.starts_with('-') {
        return Err(format!("negative DURATION '{}'", value));
    }

    let duration = iso8601::duration(value.trim_start_matches('+'))
        .map_err(|_| format!("unreadable DURATION '{}'", value))?;
    let std_duration: std::time::Duration = duration.into();

    chrono::Duration::from_std(std_duration).map_err(|_| format!("DURATION '{}' too large", value))
}
