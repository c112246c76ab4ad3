use chrono::{DateTime, Duration, SecondsFormat, Utc};
use std::time::Duration as StdDuration;

/// Cookie name carried over from the original site so existing visitors
/// keep their cooldown across the migration.
pub const COOLDOWN_KEY: &str = "lastDemoCall";

/// One demo call per hour.
pub const COOLDOWN_WINDOW_MS: i64 = 3_600_000;

/// The record outlives the window it enforces; it is simply overwritten
/// on the next accepted request.
pub const RECORD_TTL: StdDuration = StdDuration::from_secs(24 * 60 * 60);

/// Where the last-request timestamp lives. Production uses the visitor's
/// cookie pair (request header in, Set-Cookie out); tests use a map.
pub trait CooldownStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String, ttl: StdDuration);
}

#[derive(Debug, PartialEq, Eq)]
pub enum CooldownState {
    Unthrottled,
    Throttled { retry_after: Duration },
}

/// Allow when there is no readable record or the window has elapsed.
/// A malformed record counts as no record: a broken cookie must never
/// lock a visitor out.
pub fn check(store: &dyn CooldownStore, now: DateTime<Utc>) -> CooldownState {
    let last = store.get(COOLDOWN_KEY).and_then(|raw| parse_record(&raw));
    match last {
        Some(last) => {
            let elapsed = now.signed_duration_since(last).num_milliseconds();
            if elapsed >= COOLDOWN_WINDOW_MS {
                CooldownState::Unthrottled
            } else {
                CooldownState::Throttled {
                    retry_after: Duration::milliseconds(COOLDOWN_WINDOW_MS - elapsed),
                }
            }
        }
        None => CooldownState::Unthrottled,
    }
}

/// Overwrite the record with the accepted request's timestamp.
pub fn record(store: &mut dyn CooldownStore, now: DateTime<Utc>) {
    store.set(
        COOLDOWN_KEY,
        now.to_rfc3339_opts(SecondsFormat::Millis, true),
        RECORD_TTL,
    );
}

fn parse_record(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
