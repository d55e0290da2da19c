//! Wall-clock access for token expiry checks.
//!
//! Browser builds read `Date.now()`; native builds (tests, tooling) read the
//! system clock. Callers that need determinism take `now_ms` explicitly.

#[cfg(test)]
#[path = "clock_test.rs"]
mod clock_test;

/// Current time in milliseconds since the Unix epoch.
pub fn now_ms() -> i64 {
    #[cfg(feature = "csr")]
    {
        #[allow(clippy::cast_possible_truncation)]
        let now = js_sys::Date::now() as i64;
        now
    }
    #[cfg(not(feature = "csr"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
    }
}
