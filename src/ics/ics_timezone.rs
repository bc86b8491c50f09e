//! Timezone registry scoped to one parse, plus the local timezone guess.
//
// Custom VTIMEZONE definitions are mapped onto the IANA database where possible; only when
// nothing matches do we fall back to the fixed offset the definition declares.

use super::ics_component::{Component, Property, DAYLIGHT, STANDARD};
use super::ics_time::{CivilTime, Zone, ZoneRule};
use chrono::FixedOffset;
use log::{debug, warn};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::str::FromStr;

/// Windows zone names commonly found in Outlook/Exchange exports.
static WINDOWS_ZONES: Lazy<HashMap<&'static str, chrono_tz::Tz>> = Lazy::new(|| {
    use chrono_tz::*;
    HashMap::from([
        ("UTC", UTC),
        ("GMT Standard Time", Europe::London),
        ("Greenwich Standard Time", Atlantic::Reykjavik),
        ("W. Europe Standard Time", Europe::Berlin),
        ("Central Europe Standard Time", Europe::Budapest),
        ("Central European Standard Time", Europe::Warsaw),
        ("Romance Standard Time", Europe::Paris),
        ("E. Europe Standard Time", Europe::Chisinau),
        ("FLE Standard Time", Europe::Helsinki),
        ("GTB Standard Time", Europe::Bucharest),
        ("Russian Standard Time", Europe::Moscow),
        ("Eastern Standard Time", America::New_York),
        ("Central Standard Time", America::Chicago),
        ("Mountain Standard Time", America::Denver),
        ("US Mountain Standard Time", America::Phoenix),
        ("Pacific Standard Time", America::Los_Angeles),
        ("Alaskan Standard Time", America::Anchorage),
        ("Hawaiian Standard Time", Pacific::Honolulu),
        ("Atlantic Standard Time", America::Halifax),
        ("Canada Central Standard Time", America::Regina),
        ("E. South America Standard Time", America::Sao_Paulo),
        ("India Standard Time", Asia::Kolkata),
        ("China Standard Time", Asia::Shanghai),
        ("Tokyo Standard Time", Asia::Tokyo),
        ("Korea Standard Time", Asia::Seoul),
        ("Singapore Standard Time", Asia::Singapore),
        ("AUS Eastern Standard Time", Australia::Sydney),
        ("E. Australia Standard Time", Australia::Brisbane),
        ("New Zealand Standard Time", Pacific::Auckland),
        ("Arabian Standard Time", Asia::Dubai),
        ("Israel Standard Time", Asia::Jerusalem),
        ("South Africa Standard Time", Africa::Johannesburg),
    ])
});

/// TZID → zone rule table for the timezones a document defines.
#[derive(Debug, Clone, Default)]
pub struct TimezoneRegistry {
    zones: HashMap<String, ZoneRule>,
}

impl TimezoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one VTIMEZONE component. Definitions without a usable TZID or offset are
    /// skipped with a warning.
    pub fn register(&mut self, vtimezone: &Component) {
        let Some(tzid) = vtimezone.property_value("TZID") else {
            warn!("Ignoring VTIMEZONE without TZID");
            return;
        };
        match resolve_vtimezone(tzid, vtimezone) {
            Some(rule) => {
                debug!("Registered timezone '{}' as {:?}", tzid, rule);
                self.zones.insert(tzid.to_string(), rule);
            }
            None => warn!("Could not interpret VTIMEZONE '{}'", tzid),
        }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Zone for a TZID parameter: registered definitions first, then the IANA database.
    pub fn lookup(&self, tzid: &str) -> Option<ZoneRule> {
        self.zones
            .get(tzid)
            .copied()
            .or_else(|| olson_from_tzid(tzid).map(ZoneRule::Olson))
    }

    /// Zone a date/time property is expressed in. Unknown TZIDs degrade to floating time.
    pub fn zone_for(&self, prop: &Property) -> Zone {
        let Some(tzid) = prop.tzid() else {
            return Zone::Floating;
        };
        match self.lookup(tzid) {
            Some(rule) => Zone::Named { tzid: tzid.to_string(), rule },
            None => {
                warn!("Unknown TZID '{}' on {}, treating value as floating time", tzid, prop.name);
                Zone::Floating
            }
        }
    }
}

fn resolve_vtimezone(tzid: &str, vtimezone: &Component) -> Option<ZoneRule> {
    vtimezone
        .property_value("X-LIC-LOCATION")
        .and_then(olson_from_tzid)
        .or_else(|| olson_from_tzid(tzid))
        .map(ZoneRule::Olson)
        .or_else(|| declared_offset(vtimezone).map(ZoneRule::Fixed))
}

/// Find an IANA zone for a TZID, accepting `/Region/City` and path-prefixed identifiers.
fn olson_from_tzid(tzid: &str) -> Option<chrono_tz::Tz> {
    let tzid = tzid.trim().trim_matches('"');
    if let Ok(tz) = chrono_tz::Tz::from_str(tzid) {
        return Some(tz);
    }
    if let Some(tz) = WINDOWS_ZONES.get(tzid) {
        return Some(*tz);
    }
    // e.g. "/mozilla.org/20050126_1/America/New_York" or "/Europe/Berlin"
    let segments: Vec<&str> = tzid.split('/').filter(|s| !s.is_empty()).collect();
    (1..=segments.len().min(3))
        .rev()
        .find_map(|n| chrono_tz::Tz::from_str(&segments[segments.len() - n..].join("/")).ok())
}

/// Offset of the most recent STANDARD observance, else of the most recent DAYLIGHT one.
fn declared_offset(vtimezone: &Component) -> Option<FixedOffset> {
    [STANDARD, DAYLIGHT].into_iter().find_map(|kind| {
        vtimezone
            .subcomponents(kind)
            .filter_map(|observance| {
                let offset = observance.property_value("TZOFFSETTO").and_then(parse_utc_offset)?;
                let start = observance
                    .property_value("DTSTART")
                    .and_then(|v| CivilTime::parse(v, Zone::Floating, false).ok())
                    .map(|t| t.naive);
                Some((start, offset))
            })
            .max_by_key(|(start, _)| *start)
            .map(|(_, offset)| offset)
    })
}

/// Parse a `UTC-OFFSET` value: `+0100`, `-0530`, `+013045`.
pub fn parse_utc_offset(value: &str) -> Option<FixedOffset> {
    let value = value.trim();
    let (sign, digits) = if let Some(rest) = value.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = value.strip_prefix('-') {
        (-1, rest)
    } else {
        return None;
    };
    if !(digits.len() == 4 || digits.len() == 6) || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[0..2].parse().ok()?;
    let minutes: i32 = digits[2..4].parse().ok()?;
    let seconds: i32 = digits.get(4..6).map_or(Some(0), |s| s.parse().ok())?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60 + seconds))
}

/// Guess the IANA name of the local system timezone.
///
/// Order: explicit override, `TZ`, the `/etc/localtime` link target, then `UTC`.
pub fn guess_local_timezone(override_name: Option<&str>) -> (String, chrono_tz::Tz) {
    let from_env = std::env::var("TZ").ok().map(|tz| tz.trim_start_matches(':').to_string());
    let from_link = std::fs::read_link("/etc/localtime").ok().and_then(|target| {
        let target = target.to_string_lossy().into_owned();
        target.split_once("zoneinfo/").map(|(_, name)| name.to_string())
    });

    [override_name.map(str::to_string), from_env, from_link]
        .into_iter()
        .flatten()
        .find_map(|name| chrono_tz::Tz::from_str(&name).ok().map(|tz| (name, tz)))
        .unwrap_or_else(|| ("UTC".to_string(), chrono_tz::UTC))
}
