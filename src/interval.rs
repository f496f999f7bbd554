// File: ./src/interval.rs
//! "About 5 minutes ago" style descriptions of time spans.

/// Words used to build an interval description in one language.
pub trait IntervalWording {
    fn just_now(&self) -> &str;
    fn about(&self) -> &str;
    fn future_prefix(&self) -> &str;
    fn past_suffix(&self) -> &str;

    fn minute(&self) -> &str;
    fn minutes(&self) -> &str;
    fn hour(&self) -> &str;
    fn hours(&self) -> &str;
    fn day(&self) -> &str;
    fn days(&self) -> &str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EnUs;

impl IntervalWording for EnUs {
    fn just_now(&self) -> &str {
        "just now"
    }
    fn about(&self) -> &str {
        "about"
    }
    fn future_prefix(&self) -> &str {
        "in"
    }
    fn past_suffix(&self) -> &str {
        "ago"
    }
    fn minute(&self) -> &str {
        "minute"
    }
    fn minutes(&self) -> &str {
        "minutes"
    }
    fn hour(&self) -> &str {
        "hour"
    }
    fn hours(&self) -> &str {
        "hours"
    }
    fn day(&self) -> &str {
        "day"
    }
    fn days(&self) -> &str {
        "days"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PtBr;

impl IntervalWording for PtBr {
    fn just_now(&self) -> &str {
        "agora há pouco"
    }
    fn about(&self) -> &str {
        "aproximadamente"
    }
    fn future_prefix(&self) -> &str {
        "em"
    }
    fn past_suffix(&self) -> &str {
        "atrás"
    }
    fn minute(&self) -> &str {
        "minuto"
    }
    fn minutes(&self) -> &str {
        "minutos"
    }
    fn hour(&self) -> &str {
        "hora"
    }
    fn hours(&self) -> &str {
        "horas"
    }
    fn day(&self) -> &str {
        "dia"
    }
    fn days(&self) -> &str {
        "dias"
    }
}

/// Wording for a BCP 47 tag; anything that is not Portuguese gets English.
pub fn wording_for_language(tag: &str) -> Box<dyn IntervalWording + Send + Sync> {
    let primary = tag.split(['-', '_']).next().unwrap_or_default();
    if primary.eq_ignore_ascii_case("pt") {
        Box::new(PtBr)
    } else {
        Box::new(EnUs)
    }
}

const MINUTE: f64 = 60.0;
const HOUR: f64 = 3600.0;
const DAY: f64 = 86400.0;

/// Describes a signed interval in seconds. Negative values lie in the past.
///
/// Anything under 59 seconds is "just now" in either direction. Counts are
/// rounded half-to-even.
pub fn describe(seconds: f64, wording: &dyn IntervalWording) -> String {
    let diff = seconds.abs();
    if diff < 59.0 {
        return wording.just_now().to_string();
    }

    let (count, singular, plural) = if diff <= HOUR - 1.0 {
        ((diff / MINUTE).round_ties_even(), wording.minute(), wording.minutes())
    } else if diff < DAY {
        ((diff / HOUR).round_ties_even(), wording.hour(), wording.hours())
    } else {
        ((diff / DAY).round_ties_even(), wording.day(), wording.days())
    };

    let text = if count > 1.0 {
        format!("{} {} {}", wording.about(), count as u64, plural)
    } else {
        format!("{} 1 {}", wording.about(), singular)
    };

    if seconds < 0.0 {
        format!("{} {}", text, wording.past_suffix())
    } else {
        format!("{} {}", wording.future_prefix(), text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_just_now() {
        assert_eq!(describe(0.0, &EnUs), "just now");
        assert_eq!(describe(-58.9, &EnUs), "just now");
        assert_eq!(describe(30.0, &PtBr), "agora há pouco");
    }

    #[test]
    fn test_minutes() {
        assert_eq!(describe(59.0, &EnUs), "in about 1 minute");
        assert_eq!(describe(-120.0, &EnUs), "about 2 minutes ago");
        // 90s is 1.5 minutes, which rounds to the even 2
        assert_eq!(describe(90.0, &EnUs), "in about 2 minutes");
        // 150s is 2.5 minutes, which rounds to the even 2
        assert_eq!(describe(150.0, &EnUs), "in about 2 minutes");
        assert_eq!(describe(3599.0, &EnUs), "in about 60 minutes");
    }

    #[test]
    fn test_hours_and_days() {
        assert_eq!(describe(3600.0, &EnUs), "in about 1 hour");
        assert_eq!(describe(-7200.0, &EnUs), "about 2 hours ago");
        assert_eq!(describe(86400.0, &EnUs), "in about 1 day");
        assert_eq!(describe(-3.0 * 86400.0, &EnUs), "about 3 days ago");
    }

    #[test]
    fn test_portuguese() {
        assert_eq!(describe(-300.0, &PtBr), "aproximadamente 5 minutos atrás");
        assert_eq!(describe(7200.0, &PtBr), "em aproximadamente 2 horas");
    }

    #[test]
    fn test_wording_for_language() {
        assert_eq!(
            describe(-60.0, wording_for_language("pt-BR").as_ref()),
            "aproximadamente 1 minuto atrás"
        );
        assert_eq!(
            describe(-60.0, wording_for_language("fr").as_ref()),
            "about 1 minute ago"
        );
    }
}
