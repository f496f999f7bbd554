// End-to-end checks of date handling driven by a config file.
use chrono::{DateTime, Utc};
use handykit::config::Config;
use handykit::context::TestContext;
use handykit::dates::{DateFormat, DateHandler};
use handykit::interval::wording_for_language;
use handykit::locale::LocaleHelper;
use handykit::Error;

fn handler_from_config(timezone: &str, language: &str) -> DateHandler {
    let ctx = TestContext::new();
    Config {
        timezone: Some(timezone.to_string()),
        language: Some(language.to_string()),
        ..Config::default()
    }
    .save(&ctx)
    .unwrap();

    let config = Config::load(&ctx).unwrap();
    DateHandler::new(LocaleHelper::from_config(&config))
}

fn reference_date(h: &DateHandler) -> DateTime<Utc> {
    h.date_from_string_for_utc_timezone("2015-09-06 07:59:59", DateFormat::DateTimeIso)
        .unwrap()
}

#[test]
fn test_configured_timezone_drives_current_formatting() {
    let h = handler_from_config("America/Sao_Paulo", "en-US");
    let d = reference_date(&h);

    assert_eq!(
        h.string_from_date_for_current_timezone(d, DateFormat::DateTimeIso),
        "2015-09-06 04:59:59"
    );
    assert_eq!(
        h.string_from_date_in_named(d, DateFormat::DateTimeIso, "America/New_York")
            .unwrap(),
        "2015-09-06 03:59:59"
    );
    assert_eq!(
        h.string_from_date_for_utc_timezone(d, DateFormat::DateTimeIso8601Out),
        "2015-09-06T07:59:59Z"
    );
}

#[test]
fn test_round_trip_through_application_timezone() {
    let h = handler_from_config("Asia/Tokyo", "en-US");
    let d = reference_date(&h);

    let text = h.string_from_date_for_current_timezone(d, DateFormat::DateTimeIso);
    assert_eq!(text, "2015-09-06 16:59:59");
    assert_eq!(
        h.date_from_string_for_current_timezone(&text, DateFormat::DateTimeIso)
            .unwrap(),
        d
    );
}

#[test]
fn test_unknown_named_timezone_is_an_error() {
    let h = handler_from_config("UTC", "en-US");
    let d = reference_date(&h);

    assert_eq!(
        h.string_from_date_in_named(d, DateFormat::DateTimeIso, "Mars/Olympus"),
        Err(Error::UnknownTimezone {
            name: "Mars/Olympus".to_string()
        })
    );
    assert!(h
        .date_from_string_in_named("2015-09-06 07:59:59", DateFormat::DateTimeIso, "Nowhere")
        .is_err());
}

#[test]
fn test_invalid_configured_timezone_keeps_device_zone() {
    let h = handler_from_config("Not/AZone", "en-US");
    assert_eq!(h.locale().current_timezone(), LocaleHelper::device_timezone());
}

#[test]
fn test_field_mutation_then_arithmetic() {
    let h = handler_from_config("America/Sao_Paulo", "en-US");
    let d = reference_date(&h);

    // 04:59:59 local on Sept 6 -> Jan 31 same wall time -> +1 month clamps to Feb 28
    let jan = h.set_month(d, 1, None).unwrap();
    let jan31 = h.set_day(jan, 31, None).unwrap();
    let feb = h.operate_months(jan31, 1).unwrap();
    assert_eq!(
        h.string_from_date_for_current_timezone(feb, DateFormat::DateTimeIso),
        "2015-02-28 04:59:59"
    );

    let back = h.operate_years(feb, -1).unwrap();
    assert_eq!(
        h.string_from_date_for_current_timezone(back, DateFormat::DateTimeIso),
        "2014-02-28 04:59:59"
    );
}

#[test]
fn test_interval_between_dates() {
    let h = handler_from_config("UTC", "en-US");
    let d = reference_date(&h);
    let later = h.operate_time(d, 2, 0, 0).unwrap();
    let much_later = h.operate_days(d, 3).unwrap();

    assert_eq!(h.readable_interval_between(d, later), "in about 2 hours");
    assert_eq!(h.readable_interval_between(later, d), "about 2 hours ago");
    assert_eq!(h.readable_interval_between(much_later, d), "about 3 days ago");
    assert_eq!(h.readable_interval_between(d, d), "just now");
}

#[test]
fn test_interval_wording_follows_preferred_language() {
    let h = handler_from_config("UTC", "pt-BR");
    let wording = wording_for_language(&h.locale().preferred_language());
    assert_eq!(
        h.readable_interval_with(-600.0, wording.as_ref()),
        "aproximadamente 10 minutos atrás"
    );
}

#[test]
fn test_in_between_bounds() {
    let h = handler_from_config("UTC", "en-US");
    let d = reference_date(&h);
    let start = h.operate_time(d, 0, -1, 0).unwrap();
    let end = h.operate_time(d, 0, 1, 0).unwrap();

    assert!(DateHandler::is_date_in_between(d, start, end, false));
    assert!(!DateHandler::is_date_in_between(start, start, end, false));
    assert!(DateHandler::is_date_in_between(start, start, end, true));
    assert!(!DateHandler::is_date_in_between(end, d, start, true));
}
