//! Civil date/time values as they appear in iCalendar properties.
//
// A value stays a civil timestamp plus a zone until something needs an absolute instant.

use crate::error::ImportError;
use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Utc,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static ICAL_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-])?P(?:(\d+)W)?(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("static pattern compiles")
});

/// How a named zone turns civil time into UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneRule {
    Olson(chrono_tz::Tz),
    Fixed(FixedOffset),
}

impl ZoneRule {
    /// Map a civil timestamp in this zone to an absolute instant.
    ///
    /// Ambiguous times pick the earlier instant; times skipped by a DST gap are moved forward
    /// by the length of the gap.
    pub fn to_utc(&self, naive: &NaiveDateTime) -> DateTime<Utc> {
        match self {
            ZoneRule::Olson(tz) => resolve_local(tz, naive),
            ZoneRule::Fixed(offset) => resolve_local(offset, naive),
        }
    }

    /// Offset in effect at the given civil time.
    pub fn offset_at(&self, naive: &NaiveDateTime) -> FixedOffset {
        let utc = self.to_utc(naive).naive_utc();
        match self {
            ZoneRule::Olson(tz) => tz.offset_from_utc_datetime(&utc).fix(),
            ZoneRule::Fixed(offset) => *offset,
        }
    }
}

fn resolve_local<Z: TimeZone>(zone: &Z, naive: &NaiveDateTime) -> DateTime<Utc> {
    match zone.from_local_datetime(naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            // Gaps are at most a couple of hours; probe forward until the wall clock exists.
            let shifted = (1..=4)
                .map(|hours| *naive + Duration::minutes(30 * hours))
                .find_map(|probe| zone.from_local_datetime(&probe).earliest());
            match shifted {
                Some(dt) => dt.with_timezone(&Utc),
                None => Utc.from_utc_datetime(naive),
            }
        }
    }
}

/// The zone a civil timestamp is expressed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Zone {
    Utc,
    /// No zone information: the value means the same wall clock everywhere.
    Floating,
    Named { tzid: String, rule: ZoneRule },
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Utc => write!(f, "UTC"),
            Zone::Floating => write!(f, "floating"),
            Zone::Named { tzid, .. } => write!(f, "{tzid}"),
        }
    }
}

/// A date or date-time value paired with its zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CivilTime {
    pub naive: NaiveDateTime,
    pub is_date: bool,
    pub zone: Zone,
}

impl CivilTime {
    pub fn date(date: NaiveDate, zone: Zone) -> Self {
        Self { naive: date.and_time(NaiveTime::MIN), is_date: true, zone }
    }

    pub fn date_time(naive: NaiveDateTime, zone: Zone) -> Self {
        Self { naive, is_date: false, zone }
    }

    /// Parse an iCalendar `DATE` (`19970714`) or `DATE-TIME` (`19970714T133000[Z]`) literal.
    ///
    /// A trailing `Z` overrides `zone` with UTC.
    pub fn parse(value: &str, zone: Zone, force_date: bool) -> Result<Self, ImportError> {
        let value = value.trim();
        if force_date || value.len() == 8 {
            let date = NaiveDate::parse_from_str(value, "%Y%m%d")
                .map_err(|_| ImportError::malformed(format!("invalid DATE value '{value}'")))?;
            return Ok(Self::date(date, zone));
        }
        let (literal, zone) = match value.strip_suffix('Z') {
            Some(literal) => (literal, Zone::Utc),
            None => (value, zone),
        };
        let naive = NaiveDateTime::parse_from_str(literal, "%Y%m%dT%H%M%S")
            .map_err(|_| ImportError::malformed(format!("invalid DATE-TIME value '{value}'")))?;
        Ok(Self::date_time(naive, zone))
    }

    /// Absolute instant of this value. Floating values are read in `floating_zone`.
    pub fn to_utc(&self, floating_zone: &ZoneRule) -> DateTime<Utc> {
        match &self.zone {
            Zone::Utc => Utc.from_utc_datetime(&self.naive),
            Zone::Floating => floating_zone.to_utc(&self.naive),
            Zone::Named { rule, .. } => rule.to_utc(&self.naive),
        }
    }

    /// Plain local rendering: `2024-01-01` for dates, `2024-01-01T10:00:00` for date-times and
    /// `2024-01-01T10:00:00Z` for UTC date-times.
    pub fn to_civil_string(&self) -> String {
        if self.is_date {
            return self.naive.format("%Y-%m-%d").to_string();
        }
        let mut out = self.naive.format("%Y-%m-%dT%H:%M:%S").to_string();
        if self.zone == Zone::Utc {
            out.push('Z');
        }
        out
    }

    /// Rendering that pins the value to an instant where the zone allows it: named zones carry
    /// their UTC offset, floating values and dates stay civil.
    pub fn to_offset_string(&self) -> String {
        match &self.zone {
            Zone::Named { rule, .. } if !self.is_date => self.render_in(rule),
            _ => self.to_civil_string(),
        }
    }

    /// Like [`CivilTime::to_offset_string`], but floating date-times are pinned to
    /// `floating_zone` as well.
    pub fn to_offset_string_with(&self, floating_zone: &ZoneRule) -> String {
        match &self.zone {
            Zone::Floating if !self.is_date => self.render_in(floating_zone),
            _ => self.to_offset_string(),
        }
    }

    /// The same civil value detached from its source zone, so that it is read in whatever zone
    /// the destination series uses. UTC values stay absolute.
    pub fn as_floating(&self) -> CivilTime {
        match self.zone {
            Zone::Utc => self.clone(),
            _ => CivilTime { zone: Zone::Floating, ..self.clone() },
        }
    }

    fn render_in(&self, rule: &ZoneRule) -> String {
        match rule.offset_at(&self.naive).from_local_datetime(&self.naive) {
            LocalResult::Single(dt) => dt.to_rfc3339(),
            _ => self.to_civil_string(),
        }
    }

    /// Local midnight of this value's day and of the following day, in its own zone.
    pub fn day_bounds(&self) -> (CivilTime, CivilTime) {
        let start = self.naive.date().and_time(NaiveTime::MIN);
        let end = start + Duration::days(1);
        (
            CivilTime::date_time(start, self.zone.clone()),
            CivilTime::date_time(end, self.zone.clone()),
        )
    }

    pub fn shifted(&self, by: Duration) -> CivilTime {
        CivilTime { naive: self.naive + by, is_date: self.is_date, zone: self.zone.clone() }
    }
}

impl fmt::Display for CivilTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.to_civil_string(), self.zone)
    }
}

/// Render an instant the way the destination's range queries demand: explicit `+00:00`.
pub fn utc_query_string(instant: &DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S+00:00").to_string()
}

/// Parse an iCalendar `DURATION` value such as `PT1H30M` or `-P1D`.
pub fn parse_duration(value: &str) -> Result<Duration, ImportError> {
    let invalid = || ImportError::malformed(format!("invalid DURATION value '{value}'"));
    let caps = ICAL_DURATION.captures(value.trim()).ok_or_else(invalid)?;
    let part = |idx: usize| -> Result<i64, ImportError> {
        caps.get(idx)
            .map_or(Ok(0), |m| m.as_str().parse::<i64>().map_err(|_| invalid()))
    };
    let duration = Duration::weeks(part(2)?)
        + Duration::days(part(3)?)
        + Duration::hours(part(4)?)
        + Duration::minutes(part(5)?)
        + Duration::seconds(part(6)?);
    match caps.get(1).map(|m| m.as_str()) {
        Some("-") => Ok(-duration),
        _ => Ok(duration),
    }
}

/// Parse the leading `YYYY-MM-DDTHH:MM:SS` of a destination `dateTime`, ignoring any offset.
pub fn parse_destination_civil(value: &str) -> Option<NaiveDateTime> {
    let civil = value.get(..19)?;
    NaiveDateTime::parse_from_str(civil, "%Y-%m-%dT%H:%M:%S").ok()
}
