//! Identity and tracking policy for in-flight calls.
//!
//! The correlator decides whether a call is tracked, assigns it an
//! identifier, and keeps it in the pending table until its outcome arrives.

use crate::config::{RecorderConfig, RuntimeEnvironment};
use crate::models::Entry;
use log::trace;
use rand::Rng;
use std::collections::HashMap;
use std::time::Instant;

const ID_SUFFIX_LEN: usize = 7;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates an identifier of the form `<unix millis>-<7 base36 chars>`.
///
/// Callers that need strict uniqueness check the result against what they
/// already hold and draw again on collision.
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{}", chrono::Utc::now().timestamp_millis(), suffix)
}

/// Decides whether a call should be recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingPolicy {
    environment: RuntimeEnvironment,
    enable_in_production: bool,
    ignored_urls: Vec<String>,
    ignored_hosts: Vec<String>,
}

impl TrackingPolicy {
    pub fn new(config: &RecorderConfig, environment: RuntimeEnvironment) -> Self {
        Self {
            environment,
            enable_in_production: config.enable_in_production,
            ignored_urls: config.ignored_urls.clone(),
            ignored_hosts: config.ignored_hosts.clone(),
        }
    }

    pub fn environment(&self) -> RuntimeEnvironment {
        self.environment
    }

    /// Checks a URL against the policy.
    ///
    /// Tracking is off in production unless explicitly enabled. A URL is
    /// skipped when it contains an ignored URL substring, or when its host
    /// contains an ignored host substring. URLs that fail to parse are
    /// tracked unless a URL rule matches.
    pub fn should_track(&self, url: &str) -> bool {
        if self.environment.is_production() && !self.enable_in_production {
            return false;
        }

        if let Some(pattern) = self.ignored_urls.iter().find(|p| url.contains(p.as_str())) {
            trace!("Skipping {}: matches ignored URL pattern {}", url, pattern);
            return false;
        }

        if self.ignored_hosts.is_empty() {
            return true;
        }

        match url::Url::parse(url) {
            Ok(parsed) => {
                let host = parsed.host_str().unwrap_or_default();
                match self.ignored_hosts.iter().find(|h| host.contains(h.as_str())) {
                    Some(pattern) => {
                        trace!("Skipping {}: host matches ignored host {}", url, pattern);
                        false
                    }
                    None => true,
                }
            }
            Err(e) => {
                trace!("Could not parse {} for host filtering ({}); tracking it", url, e);
                true
            }
        }
    }
}

/// A call that has been opened but not yet settled.
#[derive(Debug, Clone)]
pub(crate) struct PendingRequest {
    pub entry: Entry,
    /// Monotonic start point used for the duration.
    pub started: Instant,
}

/// Identifier to pending call.
#[derive(Debug, Default)]
pub(crate) struct PendingTable {
    requests: HashMap<String, PendingRequest>,
}

impl PendingTable {
    pub fn insert(&mut self, entry: Entry, started: Instant) {
        self.requests
            .insert(entry.id.clone(), PendingRequest { entry, started });
    }

    pub fn remove(&mut self, id: &str) -> Option<PendingRequest> {
        self.requests.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.requests.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn clear(&mut self) {
        self.requests.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn policy(config: RecorderConfig) -> TrackingPolicy {
        TrackingPolicy::new(&config, RuntimeEnvironment::Development)
    }

    #[test]
    fn test_generate_id_shape() {
        let id = generate_id();
        let (millis, suffix) = id.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), ID_SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn test_generate_id_is_unique_in_practice() {
        let ids: HashSet<String> = (0..1000).map(|_| generate_id()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_default_policy_tracks_everything() {
        let policy = policy(RecorderConfig::default());
        assert!(policy.should_track("https://api.example.com/users"));
        assert!(policy.should_track("not a url"));
    }

    #[test]
    fn test_ignored_url_substring() {
        let policy = policy(RecorderConfig::default().with_ignored_urls(["/oauth/token"]));
        assert!(!policy.should_track("https://auth.example.com/oauth/token?grant=x"));
        assert!(policy.should_track("https://auth.example.com/oauth/authorize"));
    }

    #[test]
    fn test_ignored_host_substring() {
        let policy = policy(RecorderConfig::default().with_ignored_hosts(["example.com"]));
        assert!(!policy.should_track("https://example.com/x"));
        assert!(!policy.should_track("https://telemetry.example.com/beacon"));
        assert!(policy.should_track("https://api.other.org/example.com"));
    }

    #[test]
    fn test_malformed_url_is_tracked_with_host_rules() {
        let policy = policy(RecorderConfig::default().with_ignored_hosts(["example.com"]));
        assert!(policy.should_track("example.com/no-scheme"));
    }

    #[test]
    fn test_production_disables_tracking() {
        let config = RecorderConfig::default();
        let production = TrackingPolicy::new(&config, RuntimeEnvironment::Production);
        assert!(!production.should_track("https://api.example.com"));

        let config = config.with_enable_in_production(true);
        let enabled = TrackingPolicy::new(&config, RuntimeEnvironment::Production);
        assert!(enabled.should_track("https://api.example.com"));
    }

    #[test]
    fn test_staging_tracks() {
        let policy = TrackingPolicy::new(&RecorderConfig::default(), RuntimeEnvironment::Staging);
        assert!(policy.should_track("https://api.example.com"));
    }
}
