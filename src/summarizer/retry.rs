use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

pub(crate) const MAX_ATTEMPTS: usize = 4;
pub(crate) const BASE_DELAY: Duration = Duration::from_secs(2);
pub(crate) const MAX_DELAY: Duration = Duration::from_secs(30);

pub(crate) fn is_retryable(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE {
        return true;
    }
    let lower = body.to_lowercase();
    lower.contains("rate limit") || lower.contains("rate_limit") || lower.contains("overloaded")
}

pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get("retry-after")?.to_str().ok()?.trim();
    value.parse::<u64>().ok().map(Duration::from_secs)
}

/// Exponential backoff between summarizer attempts.
pub(crate) struct Backoff {
    attempt: usize,
    delay: Duration,
}

impl Backoff {
    pub(crate) fn new() -> Self {
        Self {
            attempt: 0,
            delay: BASE_DELAY,
        }
    }

    pub(crate) fn start_attempt(&mut self) -> usize {
        self.attempt += 1;
        self.attempt
    }

    pub(crate) fn can_retry(&self) -> bool {
        self.attempt < MAX_ATTEMPTS
    }

    pub(crate) async fn wait(&mut self, retry_after: Option<Duration>) {
        let wait = retry_after
            .filter(|hint| *hint > self.delay)
            .unwrap_or(self.delay)
            .min(MAX_DELAY);
        warn!(
            "summarizer rate limited; retrying in {:.1}s (attempt {}/{})",
            wait.as_secs_f32(),
            self.attempt,
            MAX_ATTEMPTS
        );
        sleep(wait).await;
        self.delay = next_delay(self.delay);
    }
}

fn next_delay(current: Duration) -> Duration {
    current.saturating_mul(2).clamp(BASE_DELAY, MAX_DELAY)
}
