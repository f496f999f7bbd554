// File: ./src/locale.rs
//! Timezone and language lookups.
//!
//! `LocaleHelper` carries the application timezone that date operations
//! default to. It is a plain value: create one, configure it, and hand it to
//! a [`crate::dates::DateHandler`]. Nothing here is global.
use crate::config::Config;
use crate::error::{Error, Result};
use chrono::Locale;
use chrono_tz::Tz;
use isolang::Language;

const FALLBACK_LANGUAGE: &str = "en-US";

#[derive(Debug, Clone)]
pub struct LocaleHelper {
    application_timezone: Tz,
    language_override: Option<String>,
}

impl Default for LocaleHelper {
    fn default() -> Self {
        Self::new()
    }
}

impl LocaleHelper {
    /// Starts with the device timezone as the application timezone.
    pub fn new() -> Self {
        Self {
            application_timezone: Self::device_timezone(),
            language_override: None,
        }
    }

    pub fn with_timezone(timezone: Tz) -> Self {
        Self {
            application_timezone: timezone,
            language_override: None,
        }
    }

    /// Applies the `timezone` and `language` settings from a config file.
    /// An unknown timezone name is logged and the device timezone kept.
    pub fn from_config(config: &Config) -> Self {
        let mut helper = Self::new();
        if let Some(name) = &config.timezone {
            match Self::timezone_named(name) {
                Ok(tz) => helper.set_current_timezone(tz),
                Err(e) => log::warn!("Ignoring configured timezone: {}", e),
            }
        }
        if let Some(lang) = &config.language {
            helper.set_preferred_language(lang);
        }
        helper
    }

    pub fn set_current_timezone(&mut self, timezone: Tz) {
        log::debug!("Application timezone: {}", timezone.name());
        self.application_timezone = timezone;
    }

    /// The timezone date operations use when none is given.
    pub fn current_timezone(&self) -> Tz {
        self.application_timezone
    }

    /// The machine's timezone: `TZ` if it names a zone, then the OS setting, then UTC.
    pub fn device_timezone() -> Tz {
        if let Ok(tz) = std::env::var("TZ")
            && let Ok(parsed) = Self::timezone_named(tz.trim_start_matches(':'))
        {
            return parsed;
        }
        iana_time_zone::get_timezone()
            .ok()
            .and_then(|name| Self::timezone_named(&name).ok())
            .unwrap_or(Tz::UTC)
    }

    pub fn utc_timezone() -> Tz {
        Tz::UTC
    }

    /// Looks up an IANA zone such as `America/Sao_Paulo`.
    pub fn timezone_named(name: &str) -> Result<Tz> {
        name.parse::<Tz>().map_err(|_| Error::UnknownTimezone {
            name: name.to_string(),
        })
    }

    pub fn set_preferred_language(&mut self, tag: &str) {
        self.language_override = Some(tag.to_string());
    }

    /// BCP 47 tag of the user's first preferred language, e.g. `pt-BR`.
    pub fn preferred_language(&self) -> String {
        self.language_override
            .clone()
            .or_else(sys_locale::get_locale)
            .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string())
    }

    /// Locale used for month, weekday and AM/PM names when formatting.
    ///
    /// This follows the preferred language rather than the region format,
    /// so an English UI in Brazil still reads "September".
    pub fn date_locale(&self) -> Locale {
        locale_for_tag(&self.preferred_language())
    }

    /// English name of a language tag's primary subtag (`pt-BR` → `Portuguese`).
    pub fn language_display_name(tag: &str) -> Option<String> {
        primary_language(tag).map(|l| l.to_name().to_string())
    }

    /// The language's own name for itself (`pt-BR` → `português`).
    pub fn language_autonym(tag: &str) -> Option<String> {
        primary_language(tag)
            .and_then(|l| l.to_autonym())
            .map(|s| s.to_string())
    }
}

fn primary_language(tag: &str) -> Option<Language> {
    let primary = tag.split(['-', '_', '.', '@']).next()?.to_ascii_lowercase();
    match primary.len() {
        2 => Language::from_639_1(&primary),
        3 => Language::from_639_3(&primary),
        _ => None,
    }
}

/// Maps `pt-BR`, `pt_BR.UTF-8` or a bare `de` onto a chrono locale.
pub(crate) fn locale_for_tag(tag: &str) -> Locale {
    let base = tag.split(['.', '@']).next().unwrap_or(tag).replace('-', "_");
    if let Ok(locale) = Locale::try_from(base.as_str()) {
        return locale;
    }

    let mut parts = base.split('_');
    let lang = parts.next().unwrap_or_default().to_ascii_lowercase();
    let region = parts.next().map(|r| r.to_ascii_uppercase());
    let candidates = [
        region.map(|r| format!("{}_{}", lang, r)),
        Some(format!("{}_{}", lang, lang.to_ascii_uppercase())),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(|c| Locale::try_from(c.as_str()).ok())
        .unwrap_or(Locale::POSIX)
}
