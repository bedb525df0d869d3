use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::Error;
use crate::middleware::auth::session_token;

const PRUNE_THRESHOLD: usize = 4096;

#[derive(Debug)]
struct WindowState {
    start: Instant,
    count: u32,
}

/// Fixed-window request limiter. Each caller key gets one window per
/// configured `(duration, limit)` pair; a request is admitted only when every
/// window still has headroom.
#[derive(Clone, Debug)]
pub struct QuotaLimiter {
    limits: Vec<(Duration, u32)>,
    windows: Arc<Mutex<HashMap<String, Vec<WindowState>>>>,
}

impl QuotaLimiter {
    pub fn new(limits: Vec<(Duration, u32)>) -> Self {
        Self {
            limits,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Hourly plus daily quota, applied service-wide per caller.
    pub fn global(hourly: u32, daily: u32) -> Self {
        Self::new(vec![
            (Duration::from_secs(60 * 60), hourly.max(1)),
            (Duration::from_secs(24 * 60 * 60), daily.max(1)),
        ])
    }

    /// Tighter single-window quota for the chat completion endpoint.
    pub fn per_minute(limit: u32) -> Self {
        Self::new(vec![(Duration::from_secs(60), limit.max(1))])
    }

    pub fn allow(&self, key: &str) -> bool {
        let mut guard = self.windows.lock().expect("rate limiter mutex poisoned");
        let now = Instant::now();

        if guard.len() > PRUNE_THRESHOLD && !guard.contains_key(key) {
            let limits = &self.limits;
            guard.retain(|_, windows| {
                windows
                    .iter()
                    .zip(limits)
                    .any(|(w, (dur, _))| now.duration_since(w.start) < *dur)
            });
        }

        let windows = guard.entry(key.to_string()).or_insert_with(|| {
            self.limits
                .iter()
                .map(|_| WindowState {
                    start: now,
                    count: 0,
                })
                .collect()
        });

        for (window, (duration, _)) in windows.iter_mut().zip(&self.limits) {
            if now.duration_since(window.start) >= *duration {
                window.start = now;
                window.count = 0;
            }
        }

        let admitted = windows
            .iter()
            .zip(&self.limits)
            .all(|(window, (_, limit))| window.count < *limit);

        if admitted {
            for window in windows.iter_mut() {
                window.count += 1;
            }
        }
        admitted
    }
}

/// The caller identity used for quota accounting: session cookie when logged
/// in, forwarded client address otherwise, one shared bucket as a last resort.
fn caller_key(headers: &HeaderMap) -> String {
    if let Some(token) = session_token(headers) {
        return format!("sid:{}", token);
    }
    if let Some(addr) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
    {
        return format!("ip:{}", addr.trim());
    }
    "anonymous".to_string()
}

pub async fn quota_middleware(
    State(limiter): State<QuotaLimiter>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !limiter.allow(&caller_key(req.headers())) {
        return Error::RateLimited.into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_the_limit_then_rejects() {
        let limiter = QuotaLimiter::per_minute(3);
        assert!(limiter.allow("a"));
        assert!(limiter.allow("a"));
        assert!(limiter.allow("a"));
        assert!(!limiter.allow("a"));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = QuotaLimiter::per_minute(1);
        assert!(limiter.allow("a"));
        assert!(!limiter.allow("a"));
        assert!(limiter.allow("b"));
    }

    #[test]
    fn tightest_window_wins() {
        let limiter = QuotaLimiter::new(vec![
            (Duration::from_secs(60), 2),
            (Duration::from_secs(3600), 100),
        ]);
        assert!(limiter.allow("a"));
        assert!(limiter.allow("a"));
        assert!(!limiter.allow("a"));
    }

    #[test]
    fn window_resets_after_duration() {
        let limiter = QuotaLimiter::new(vec![(Duration::ZERO, 1)]);
        assert!(limiter.allow("a"));
        assert!(limiter.allow("a"));
    }

    #[test]
    fn caller_key_prefers_session_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.0.0.1".parse().unwrap());
        assert_eq!(caller_key(&headers), "ip:10.0.0.1");

        headers.insert(
            axum::http::header::COOKIE,
            format!("{}=tok", crate::session::SESSION_COOKIE)
                .parse()
                .unwrap(),
        );
        assert_eq!(caller_key(&headers), "sid:tok");
    }
}
