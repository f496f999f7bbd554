// File: ./src/dates.rs
//! Date formatting, parsing and calendar arithmetic.
//!
//! Instants are always `DateTime<Utc>`. A timezone only matters at the edges:
//! when rendering, when parsing, and when a field such as "the day" has to be
//! interpreted on a wall clock. Unless told otherwise, the wall clock is the
//! application timezone held by the handler's [`LocaleHelper`].
use crate::error::{Error, Result};
use crate::interval::{self, EnUs, IntervalWording};
use crate::locale::LocaleHelper;
use chrono::{
    DateTime, Datelike, Days, Months, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Timelike,
    Utc, Weekday,
};
use chrono_tz::Tz;
use std::borrow::Cow;
use strum::EnumIter;

/// Named date patterns. Each variant documents the output for
/// 2015-09-06 07:59:59 (a Sunday) in an English locale.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, strum::Display, strum::EnumString,
)]
pub enum DateFormat {
    /// 2015-09-06T07:59:59.000Z
    DateTimeIso8601In,
    /// 2015-09-06T07:59:59Z
    DateTimeIso8601Out,

    /// 2015-09-06 07:59:59
    DateTimeIso,
    /// 2015-09-06 07-59-59
    DateTimeIsoDashed,
    /// 09-06-2015 07:59:59
    DateTimeIsoMonthDayYear,
    /// 06-09-2015 07:59:59
    DateTimeIsoDayMonthYear,

    /// 09/06 07:59 AM
    DateLongTime12LongAmPm,
    /// 9/6 07:59 AM
    DateShortTime12LongAmPm,
    /// 09/06 7:59 AM
    DateLongTime12ShortAmPm,
    /// 9/6 7:59 AM
    DateShortTime12ShortAmPm,

    /// Sun 06, 07:59 AM
    WeekdayShortDayLongTime12LongAmPm,
    /// Sun 06, 7:59 AM
    WeekdayShortDayLongTime12ShortAmPm,
    /// Sun 6, 07:59 AM
    WeekdayShortDayShortTime12LongAmPm,
    /// Sun 6, 7:59 AM
    WeekdayShortDayShortTime12ShortAmPm,
    /// Sunday 06
    WeekdayLongDayLong,
    /// Sunday 6
    WeekdayLongDayShort,
    /// Sunday, 9/6
    WeekdayLongDateShort,
    /// Sun, 9/6
    WeekdayShortDateShort,

    /// 2015-09-06
    DateIso,
    /// 09/06
    DateLong,
    /// 9/6
    DateShort,

    /// 09
    MonthLong,
    /// 9
    MonthShort,
    /// September
    MonthNameLong,
    /// Sep
    MonthNameShort,

    /// 2015
    YearLong,
    /// 15
    YearShort,

    /// 06
    DayLong,
    /// 6
    DayShort,

    /// Sep 06
    MonthNameShortDayLong,
    /// Sep 6
    MonthNameShortDayShort,
    /// Sep 6, 2015
    MonthNameShortDayShortYearLong,
    /// Sep, 2015
    MonthNameShortYearLong,
    /// September, 2015
    MonthNameLongYearLong,

    /// 07:59:59
    TimeIso,

    /// 07
    TimeHour12Long,
    /// 7
    TimeHour12Short,
    /// 07
    TimeHour24Long,
    /// 7
    TimeHour24Short,
    /// 59
    TimeMinuteLong,
    /// 59
    TimeMinuteShort,
    /// 59
    TimeSecondsLong,
    /// 59
    TimeSecondsShort,

    /// 07:59 AM
    Time12LongAmPm,
    /// 7:59 AM
    Time12ShortAmPm,
}

impl DateFormat {
    /// The chrono `strftime` pattern behind the variant.
    pub fn pattern(self) -> &'static str {
        use DateFormat::*;
        match self {
            DateTimeIso8601In => "%Y-%m-%dT%H:%M:%S%.3fZ",
            DateTimeIso8601Out => "%Y-%m-%dT%H:%M:%SZ",
            DateTimeIso => "%Y-%m-%d %H:%M:%S",
            DateTimeIsoDashed => "%Y-%m-%d %H-%M-%S",
            DateTimeIsoMonthDayYear => "%m-%d-%Y %H:%M:%S",
            DateTimeIsoDayMonthYear => "%d-%m-%Y %H:%M:%S",
            DateLongTime12LongAmPm => "%m/%d %I:%M %p",
            DateShortTime12LongAmPm => "%-m/%-d %I:%M %p",
            DateLongTime12ShortAmPm => "%m/%d %-I:%M %p",
            DateShortTime12ShortAmPm => "%-m/%-d %-I:%M %p",
            WeekdayShortDayLongTime12LongAmPm => "%a %d, %I:%M %p",
            WeekdayShortDayLongTime12ShortAmPm => "%a %d, %-I:%M %p",
            WeekdayShortDayShortTime12LongAmPm => "%a %-d, %I:%M %p",
            WeekdayShortDayShortTime12ShortAmPm => "%a %-d, %-I:%M %p",
            WeekdayLongDayLong => "%A %d",
            WeekdayLongDayShort => "%A %-d",
            WeekdayLongDateShort => "%A, %-m/%-d",
            WeekdayShortDateShort => "%a, %-m/%-d",
            DateIso => "%Y-%m-%d",
            DateLong => "%m/%d",
            DateShort => "%-m/%-d",
            MonthLong => "%m",
            MonthShort => "%-m",
            MonthNameLong => "%B",
            MonthNameShort => "%b",
            YearLong => "%Y",
            YearShort => "%y",
            DayLong => "%d",
            DayShort => "%-d",
            MonthNameShortDayLong => "%b %d",
            MonthNameShortDayShort => "%b %-d",
            MonthNameShortDayShortYearLong => "%b %-d, %Y",
            MonthNameShortYearLong => "%b, %Y",
            MonthNameLongYearLong => "%B, %Y",
            TimeIso => "%H:%M:%S",
            TimeHour12Long => "%I",
            TimeHour12Short => "%-I",
            TimeHour24Long => "%H",
            TimeHour24Short => "%-H",
            TimeMinuteLong => "%M",
            TimeMinuteShort => "%-M",
            TimeSecondsLong => "%S",
            TimeSecondsShort => "%-S",
            Time12LongAmPm => "%I:%M %p",
            Time12ShortAmPm => "%-I:%M %p",
        }
    }
}

// Defaults for fields a pattern does not carry: 2000-01-01 00:00:00.
const FILLERS: &[(&[&str], &str, &str)] = &[
    (&["%Y", "%y"], "%Y", "2000"),
    (&["%m", "%-m", "%B", "%b"], "%m", "01"),
    (&["%d", "%-d"], "%d", "01"),
    (&["%H", "%-H", "%I", "%-I"], "%H", "00"),
    (&["%M", "%-M"], "%M", "00"),
    (&["%S", "%-S"], "%S", "00"),
];

const WEEKDAY_MARKERS: [&str; 2] = ["%A", "%a"];

fn has_any(pattern: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| pattern.contains(m))
}

/// Removes the weekday name from both `pattern` and `input`.
///
/// Only a weekday preceded by literal text is handled; `None` when the input
/// has no English weekday name at that position.
fn strip_weekday(input: &str, pattern: &str) -> Option<(String, String)> {
    let idx = WEEKDAY_MARKERS.iter().filter_map(|m| pattern.find(m)).min()?;
    let prefix = &pattern[..idx];
    if prefix.contains('%') {
        return None;
    }

    let rest = input.strip_prefix(prefix)?;
    let word_len: usize = rest
        .chars()
        .take_while(|c| c.is_alphabetic())
        .map(char::len_utf8)
        .sum();
    rest[..word_len].parse::<Weekday>().ok()?;

    Some((
        format!("{}{}", prefix, &rest[word_len..]),
        format!("{}{}", prefix, &pattern[idx + 2..]),
    ))
}

/// Parses `input` with `pattern`, completing missing fields from [`FILLERS`].
///
/// A weekday only constrains the result when the pattern carries a full
/// date; otherwise it is read and dropped.
fn parse_naive(input: &str, pattern: &str) -> Option<NaiveDateTime> {
    let full_date = FILLERS[..3].iter().all(|(markers, _, _)| has_any(pattern, markers));
    let (mut full_input, stripped) = if has_any(pattern, &WEEKDAY_MARKERS) && !full_date {
        strip_weekday(input, pattern)?
    } else {
        (input.to_string(), pattern.to_string())
    };
    let pattern = stripped.as_str();
    let mut full_pattern = stripped.clone();

    for (markers, spec, value) in FILLERS {
        if !has_any(pattern, markers) {
            full_pattern.push('|');
            full_pattern.push_str(spec);
            full_input.push('|');
            full_input.push_str(value);
        }
    }
    // A 12-hour clock without a meridiem reads as morning.
    let twelve_hour = pattern.contains("%I") || pattern.contains("%-I");
    if twelve_hour && !pattern.contains("%p") {
        full_pattern.push_str("|%p");
        full_input.push_str("|AM");
    }

    NaiveDateTime::parse_from_str(&full_input, &full_pattern).ok()
}

/// Pins a wall-clock time to `tz`.
///
/// Ambiguous times (clocks going back) take the earlier instant. Times that
/// fall in a gap (clocks going forward) are read one hour later.
fn resolve_local(tz: Tz, naive: NaiveDateTime) -> Result<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            naive
                .checked_add_signed(TimeDelta::hours(1))
                .and_then(|shifted| tz.from_local_datetime(&shifted).earliest())
        })
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| Error::NonexistentLocalTime {
            local: naive.to_string(),
            timezone: tz.name().to_string(),
        })
}

/// Formats, parses and shifts dates relative to an application timezone.
#[derive(Debug, Clone, Default)]
pub struct DateHandler {
    locale: LocaleHelper,
}

impl DateHandler {
    pub fn new(locale: LocaleHelper) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> &LocaleHelper {
        &self.locale
    }

    pub fn locale_mut(&mut self) -> &mut LocaleHelper {
        &mut self.locale
    }

    fn reference(&self, tz: Option<Tz>) -> Tz {
        tz.unwrap_or_else(|| self.locale.current_timezone())
    }

    // --- Formatting ---

    /// Renders `date` on the wall clock of `tz`, with month and weekday
    /// names in the preferred language.
    ///
    /// Locales without a meridiem marker (such as `pt_BR`) render
    /// `AM`/`PM` instead.
    pub fn string_from_date(&self, date: DateTime<Utc>, format: DateFormat, tz: Tz) -> String {
        let local = date.with_timezone(&tz);
        let locale = self.locale.date_locale();
        let mut pattern = Cow::Borrowed(format.pattern());
        if pattern.contains("%p") {
            let marker = local.format_localized("%p", locale).to_string();
            if marker.trim().is_empty() {
                let english = local.format("%p").to_string();
                pattern = Cow::Owned(pattern.replace("%p", &english));
            }
        }
        local.format_localized(&pattern, locale).to_string()
    }

    pub fn string_from_date_for_current_timezone(
        &self,
        date: DateTime<Utc>,
        format: DateFormat,
    ) -> String {
        self.string_from_date(date, format, self.locale.current_timezone())
    }

    pub fn string_from_date_for_utc_timezone(
        &self,
        date: DateTime<Utc>,
        format: DateFormat,
    ) -> String {
        self.string_from_date(date, format, LocaleHelper::utc_timezone())
    }

    pub fn string_from_date_in_named(
        &self,
        date: DateTime<Utc>,
        format: DateFormat,
        timezone_name: &str,
    ) -> Result<String> {
        let tz = LocaleHelper::timezone_named(timezone_name)?;
        Ok(self.string_from_date(date, format, tz))
    }

    // --- Parsing ---

    /// Reads `text` as a wall-clock time in `tz`.
    ///
    /// Parsing expects English month and weekday names. Fields the format
    /// lacks default to 2000-01-01 00:00:00.
    pub fn date_from_string(
        &self,
        text: &str,
        format: DateFormat,
        tz: Tz,
    ) -> Result<DateTime<Utc>> {
        let naive = parse_naive(text, format.pattern()).ok_or_else(|| Error::Unparseable {
            input: text.to_string(),
            format: format.to_string(),
        })?;
        resolve_local(tz, naive)
    }

    pub fn date_from_string_for_current_timezone(
        &self,
        text: &str,
        format: DateFormat,
    ) -> Result<DateTime<Utc>> {
        self.date_from_string(text, format, self.locale.current_timezone())
    }

    pub fn date_from_string_for_utc_timezone(
        &self,
        text: &str,
        format: DateFormat,
    ) -> Result<DateTime<Utc>> {
        self.date_from_string(text, format, LocaleHelper::utc_timezone())
    }

    pub fn date_from_string_in_named(
        &self,
        text: &str,
        format: DateFormat,
        timezone_name: &str,
    ) -> Result<DateTime<Utc>> {
        let tz = LocaleHelper::timezone_named(timezone_name)?;
        self.date_from_string(text, format, tz)
    }

    // --- Field mutation ---

    fn replace_local<F>(
        &self,
        date: DateTime<Utc>,
        reference: Option<Tz>,
        f: F,
    ) -> Result<DateTime<Utc>>
    where
        F: FnOnce(NaiveDateTime) -> Result<NaiveDateTime>,
    {
        let tz = self.reference(reference);
        let local = date.with_timezone(&tz).naive_local();
        resolve_local(tz, f(local)?)
    }

    /// Sets the year as seen in `reference` (default: application timezone).
    pub fn set_year(
        &self,
        date: DateTime<Utc>,
        year: i32,
        reference: Option<Tz>,
    ) -> Result<DateTime<Utc>> {
        self.replace_local(date, reference, |local| {
            local.with_year(year).ok_or(Error::InvalidField {
                field: "year",
                value: year as i64,
            })
        })
    }

    pub fn set_month(
        &self,
        date: DateTime<Utc>,
        month: u32,
        reference: Option<Tz>,
    ) -> Result<DateTime<Utc>> {
        self.replace_local(date, reference, |local| {
            local.with_month(month).ok_or(Error::InvalidField {
                field: "month",
                value: month as i64,
            })
        })
    }

    pub fn set_day(
        &self,
        date: DateTime<Utc>,
        day: u32,
        reference: Option<Tz>,
    ) -> Result<DateTime<Utc>> {
        self.replace_local(date, reference, |local| {
            local.with_day(day).ok_or(Error::InvalidField {
                field: "day",
                value: day as i64,
            })
        })
    }

    /// Sets the wall-clock time in `reference`, keeping its calendar date.
    pub fn set_time(
        &self,
        date: DateTime<Utc>,
        hour: u32,
        minute: u32,
        second: u32,
        reference: Option<Tz>,
    ) -> Result<DateTime<Utc>> {
        let limits = [("hour", hour, 23), ("minute", minute, 59), ("second", second, 59)];
        for (field, value, max) in limits {
            if value > max {
                return Err(Error::InvalidField {
                    field,
                    value: value as i64,
                });
            }
        }
        self.replace_local(date, reference, |local| {
            let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or(Error::OutOfRange)?;
            Ok(local.date().and_time(time))
        })
    }

    // --- Arithmetic ---

    /// Adds (or with negative values, removes) elapsed hours, minutes and seconds.
    pub fn operate_time(
        &self,
        date: DateTime<Utc>,
        hours: i64,
        minutes: i64,
        seconds: i64,
    ) -> Result<DateTime<Utc>> {
        let delta = TimeDelta::try_hours(hours)
            .and_then(|h| TimeDelta::try_minutes(minutes).and_then(|m| h.checked_add(&m)))
            .and_then(|hm| TimeDelta::try_seconds(seconds).and_then(|s| hm.checked_add(&s)))
            .ok_or(Error::OutOfRange)?;
        date.checked_add_signed(delta).ok_or(Error::OutOfRange)
    }

    /// Calendar days on the application wall clock, so 09:00 stays 09:00
    /// across a DST change.
    pub fn operate_days(&self, date: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>> {
        self.replace_local(date, None, |local| {
            let n = Days::new(days.unsigned_abs());
            let shifted = if days >= 0 {
                local.checked_add_days(n)
            } else {
                local.checked_sub_days(n)
            };
            shifted.ok_or(Error::OutOfRange)
        })
    }

    pub fn operate_weeks(&self, date: DateTime<Utc>, weeks: i64) -> Result<DateTime<Utc>> {
        let days = weeks.checked_mul(7).ok_or(Error::OutOfRange)?;
        self.operate_days(date, days)
    }

    /// Calendar months; a day past the end of the target month clamps to its last day.
    pub fn operate_months(&self, date: DateTime<Utc>, months: i32) -> Result<DateTime<Utc>> {
        self.replace_local(date, None, |local| {
            let n = Months::new(months.unsigned_abs());
            let shifted = if months >= 0 {
                local.checked_add_months(n)
            } else {
                local.checked_sub_months(n)
            };
            shifted.ok_or(Error::OutOfRange)
        })
    }

    pub fn operate_years(&self, date: DateTime<Utc>, years: i32) -> Result<DateTime<Utc>> {
        let months = years.checked_mul(12).ok_or(Error::OutOfRange)?;
        self.operate_months(date, months)
    }

    // --- Comparisons ---

    /// Whether `date` lies between `start` and `end`, bounds included when
    /// `include_equals` is set.
    pub fn is_date_in_between(
        date: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        include_equals: bool,
    ) -> bool {
        if include_equals {
            date >= start && date <= end
        } else {
            date > start && date < end
        }
    }

    // --- Readable intervals ---

    /// English description of a signed interval in seconds (negative = past).
    pub fn readable_interval(&self, seconds: f64) -> String {
        interval::describe(seconds, &EnUs)
    }

    pub fn readable_interval_with(&self, seconds: f64, wording: &dyn IntervalWording) -> String {
        interval::describe(seconds, wording)
    }

    /// Describes `to` as seen from `from`: later is "in ...", earlier is "... ago".
    pub fn readable_interval_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> String {
        let seconds = (to - from).num_milliseconds() as f64 / 1000.0;
        self.readable_interval(seconds)
    }

    /// Seconds since midnight on the application wall clock.
    pub fn seconds_into_day(&self, date: DateTime<Utc>) -> u32 {
        date.with_timezone(&self.locale.current_timezone())
            .num_seconds_from_midnight()
    }
}
