use time::{OffsetDateTime, UtcOffset};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::locale::Printer;

const MINUTE: f64 = 60.0;
const HOUR: f64 = 60.0 * MINUTE;
const DAY: f64 = 24.0 * HOUR;

/// Resolves a user timezone to an offset. `UTC` and fixed `+HH:MM` offsets
/// are understood; anything else resolves to UTC.
pub(crate) fn resolve_offset(timezone: &str) -> UtcOffset {
    let format = format_description!("[offset_hour sign:mandatory]:[offset_minute]");
    match timezone {
        "" | "UTC" | "Etc/UTC" => UtcOffset::UTC,
        tz => UtcOffset::parse(tz, &format).unwrap_or_else(|_| {
            debug_!("Timezone '{}' has no fixed offset; using UTC.", tz);
            UtcOffset::UTC
        }),
    }
}

/// Parses an RFC 3339 timestamp. An empty string is an unset instant.
pub(crate) fn parse_instant(value: &str) -> Result<Option<OffsetDateTime>, time::error::Parse> {
    match value {
        "" => Ok(None),
        value => OffsetDateTime::parse(value, &Rfc3339).map(Some),
    }
}

/// Converts Unix seconds to an instant. Zero is an unset instant.
pub(crate) fn unix_instant(seconds: i64) -> Option<OffsetDateTime> {
    match seconds {
        0 => None,
        s => OffsetDateTime::from_unix_timestamp(s).ok(),
    }
}

/// Renders how long ago `instant` was, relative to `now`, as seen from
/// `timezone`, using the translations of `printer`.
pub(crate) fn elapsed_time(
    printer: &Printer,
    timezone: &str,
    instant: Option<OffsetDateTime>,
    now: OffsetDateTime,
) -> String {
    let Some(instant) = instant else {
        return printer.printf("time_elapsed.not_yet", &[]);
    };

    let offset = resolve_offset(timezone);
    let (now, instant) = (now.to_offset(offset), instant.to_offset(offset));
    if now < instant {
        return printer.printf("time_elapsed.not_yet", &[]);
    }

    let seconds = (now - instant).as_seconds_f64();
    let days = (seconds / DAY) as i64;
    let plural = |key: &str, n: i64| printer.plural(key, n, &[&n]);

    match days {
        _ if seconds < MINUTE => printer.printf("time_elapsed.now", &[]),
        _ if seconds < HOUR => plural("time_elapsed.minutes", (seconds / MINUTE) as i64),
        _ if seconds < DAY => plural("time_elapsed.hours", (seconds / HOUR) as i64),
        1 => printer.printf("time_elapsed.yesterday", &[]),
        2..=20 => plural("time_elapsed.days", days),
        21..=30 => plural("time_elapsed.weeks", (days as f64 / 7.0).round() as i64),
        31..=364 => plural("time_elapsed.months", (days as f64 / 30.0).round() as i64),
        _ => plural("time_elapsed.years", (days as f64 / 365.0).round() as i64),
    }
}
