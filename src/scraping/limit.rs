//! Per-domain request limiting: random delay and parallelism.

use std::time::Duration;

/// Limits applied to requests whose host matches `domain_glob`.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitRule {
    /// Host pattern, `*` matches any run of characters
    pub domain_glob: String,
    /// Upper bound of the random delay before each request
    pub random_delay: Duration,
    /// Maximum requests in flight for matching hosts
    pub parallelism: usize,
}

impl LimitRule {
    pub fn new(domain_glob: impl Into<String>, random_delay: Duration, parallelism: usize) -> Self {
        Self { domain_glob: domain_glob.into(), random_delay, parallelism: parallelism.max(1) }
    }

    /// Returns true if the rule applies to the given host.
    pub fn matches(&self, host: &str) -> bool {
        glob_match(&self.domain_glob, host)
    }

    /// Draws a delay uniformly from `[0, random_delay]`.
    pub fn jitter(&self) -> Duration {
        let max_ms = self.random_delay.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::random_range(0..=max_ms))
    }
}

/// Matches `text` against a pattern where `*` stands for any (possibly empty) substring.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, t));
            p += 1;
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            t = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}
