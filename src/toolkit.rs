// File: ./src/toolkit.rs
// Odds and ends that do not belong to a bigger module.
use isolang::Language;
use std::time::Duration;
use tokio::task::JoinHandle;

pub fn radians_to_degrees(radians: f64) -> f64 {
    radians.to_degrees()
}

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees.to_radians()
}

/// Runs `f` once `delay` has elapsed, without blocking the caller.
///
/// Must be called from within a Tokio runtime.
pub fn perform_after_delay<F>(delay: Duration, f: F) -> JoinHandle<()>
where
    F: FnOnce() + Send + 'static,
{
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        f();
    })
}

/// Every language with a two-letter ISO 639-1 code, as `(code, English name)`,
/// sorted by code.
pub fn available_languages() -> Vec<(String, String)> {
    let mut list = Vec::new();
    for a in b'a'..=b'z' {
        for b in b'a'..=b'z' {
            let code = String::from_utf8(vec![a, b]).unwrap_or_default();
            if let Some(lang) = Language::from_639_1(&code) {
                list.push((code, lang.to_name().to_string()));
            }
        }
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_angle_conversion() {
        assert!((radians_to_degrees(PI) - 180.0).abs() < 1e-9);
        assert!((degrees_to_radians(90.0) - PI / 2.0).abs() < 1e-9);
        assert!((radians_to_degrees(degrees_to_radians(33.0)) - 33.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_perform_after_delay() {
        let flag = Arc::new(AtomicBool::new(false));
        let f = flag.clone();

        let handle = perform_after_delay(Duration::from_millis(20), move || {
            f.store(true, Ordering::SeqCst);
        });
        assert!(!flag.load(Ordering::SeqCst));

        handle.await.unwrap();
        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn test_available_languages() {
        let langs = available_languages();
        assert!(langs.len() > 150);
        assert!(langs.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(langs.contains(&("pt".to_string(), "Portuguese".to_string())));
    }
}
