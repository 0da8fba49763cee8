//! Fetch-and-match engine: visits a URL and fires callbacks for matching elements.

use crate::scraping::error::{FetchError, ScrapeError};
use crate::scraping::limit::LimitRule;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, trace};

/// Retrieves page bodies. Implemented over HTTP in production and by stubs in tests.
#[async_trait]
pub trait FetchEngine: Send + Sync {
    /// Fetches the body of `url`.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// A matched HTML element handed to `on_html` callbacks.
#[derive(Clone, Copy)]
pub struct HtmlElement<'a> {
    element: ElementRef<'a>,
}

impl<'a> HtmlElement<'a> {
    pub fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// Trimmed text of the first descendant matching `selector`, or empty.
    pub fn child_text(&self, selector: &Selector) -> String {
        self.element
            .select(selector)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }

    /// Trimmed attribute of the first descendant matching `selector`, or empty.
    pub fn child_attr(&self, selector: &Selector, attr: &str) -> String {
        self.element
            .select(selector)
            .next()
            .and_then(|e| e.value().attr(attr))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }
}

type Callback = Box<dyn Fn(&HtmlElement<'_>) + Send + Sync>;

/// Visits pages through a `FetchEngine`, applying an optional limit rule.
pub struct Collector {
    engine: Arc<dyn FetchEngine>,
    limit: Option<(LimitRule, Arc<Semaphore>)>,
    callbacks: Vec<(Selector, Callback)>,
}

impl Collector {
    pub fn new(engine: Arc<dyn FetchEngine>) -> Self {
        Self { engine, limit: None, callbacks: Vec::new() }
    }

    /// Installs a limit rule, replacing any previous one.
    pub fn limit(&mut self, rule: LimitRule) -> &mut Self {
        let permits = Arc::new(Semaphore::new(rule.parallelism));
        self.limit = Some((rule, permits));
        self
    }

    /// Registers a callback fired once per element matching `selector`.
    pub fn on_html<F>(&mut self, selector: Selector, callback: F) -> &mut Self
    where
        F: Fn(&HtmlElement<'_>) + Send + Sync + 'static,
    {
        self.callbacks.push((selector, Box::new(callback)));
        self
    }

    /// Fetches `url` and dispatches matching elements to the registered callbacks.
    pub async fn visit(&self, url: &str) -> Result<(), ScrapeError> {
        let _permit = match self.matching_rule(url) {
            Some((rule, permits)) => {
                let permit = permits.acquire().await.ok();
                let delay = rule.jitter();
                if !delay.is_zero() {
                    debug!("Delaying {}ms before {}", delay.as_millis(), url);
                    tokio::time::sleep(delay).await;
                }
                permit
            }
            None => None,
        };

        debug!("Visiting {}", url);
        let body = self
            .engine
            .fetch(url)
            .await
            .map_err(|source| ScrapeError::Transport { url: url.to_string(), source })?;

        self.dispatch(&body);
        Ok(())
    }

    fn matching_rule(&self, url: &str) -> Option<&(LimitRule, Arc<Semaphore>)> {
        let (rule, _) = self.limit.as_ref()?;
        let host = url::Url::parse(url).ok()?.host_str()?.to_string();
        if rule.matches(&host) {
            self.limit.as_ref()
        } else {
            None
        }
    }

    fn dispatch(&self, body: &str) {
        let document = Html::parse_document(body);
        for (selector, callback) in &self.callbacks {
            let mut matched = 0usize;
            for element in document.select(selector) {
                callback(&HtmlElement::new(element));
                matched += 1;
            }
            trace!("Selector {:?} matched {} elements", selector, matched);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    struct StaticEngine {
        body: Result<String, u16>,
        calls: AtomicUsize,
    }

    impl StaticEngine {
        fn ok(body: &str) -> Self {
            Self { body: Ok(body.to_string()), calls: AtomicUsize::new(0) }
        }

        fn failing(status: u16) -> Self {
            Self { body: Err(status), calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl FetchEngine for StaticEngine {
        async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.body.clone().map_err(FetchError::Status)
        }
    }

    fn sel(css: &str) -> Selector {
        Selector::parse(css).unwrap()
    }

    const LISTING: &str = r#"
        <html><body>
            <div class="item"><h2> First </h2><a href=" /p/1 ">go</a></div>
            <div class="item"><h2>Second</h2><a href="/p/2">go</a></div>
            <div class="other"><h2>Other</h2></div>
        </body></html>
    "#;

    #[tokio::test]
    async fn test_visit_dispatches_every_match() {
        let engine = Arc::new(StaticEngine::ok(LISTING));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let mut collector = Collector::new(engine.clone());
        let sink = Arc::clone(&seen);
        collector.on_html(sel("div.item"), move |e| {
            sink.lock().unwrap().push(e.child_text(&sel("h2")));
        });

        collector.visit("https://shop.test/s?k=x").await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["First".to_string(), "Second".to_string()]);
        assert_eq!(engine.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_visit_runs_callbacks_in_registration_order() {
        let engine = Arc::new(StaticEngine::ok(LISTING));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let mut collector = Collector::new(engine);
        for css in ["div.other", "div.item"] {
            let sink = Arc::clone(&seen);
            collector.on_html(sel(css), move |e| {
                sink.lock().unwrap().push(e.child_text(&sel("h2")));
            });
        }

        collector.visit("https://shop.test/").await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec!["Other", "First", "Second"]);
    }

    #[tokio::test]
    async fn test_visit_wraps_transport_error() {
        let engine = Arc::new(StaticEngine::failing(500));
        let collector = Collector::new(engine);

        let err = collector.visit("https://shop.test/s?k=x").await.unwrap_err();
        assert_eq!(err.url(), Some("https://shop.test/s?k=x"));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_visit_with_limit_rule() {
        let engine = Arc::new(StaticEngine::ok(LISTING));
        let mut collector = Collector::new(engine.clone());
        collector.limit(LimitRule::new("*shop.test*", Duration::from_millis(5), 1));

        collector.visit("https://www.shop.test/").await.unwrap();
        collector.visit("https://elsewhere.test/").await.unwrap();
        assert_eq!(engine.calls.load(Ordering::SeqCst), 2);
    }

    /// Counts concurrent fetches and holds each one for `latency`.
    struct SlowEngine {
        latency: Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl SlowEngine {
        fn new(latency: Duration) -> Self {
            Self { latency, in_flight: AtomicUsize::new(0), peak: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl FetchEngine for SlowEngine {
        async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.latency).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(LISTING.to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_random_delay_only_for_matching_hosts() {
        let bound = Duration::from_secs(10);
        let mut collector = Collector::new(Arc::new(StaticEngine::ok(LISTING)));
        collector.limit(LimitRule::new("*shop.test*", bound, 1));

        let start = Instant::now();
        for _ in 0..5 {
            collector.visit("https://elsewhere.test/").await.unwrap();
        }
        assert_eq!(start.elapsed(), Duration::ZERO);

        // Each draw is uniform over [0, 10s]; fifty zero draws in a row do not happen.
        let start = Instant::now();
        let mut visits = 0u32;
        while start.elapsed().is_zero() && visits < 50 {
            collector.visit("https://www.shop.test/s?k=x").await.unwrap();
            visits += 1;
        }
        assert!(start.elapsed() > Duration::ZERO);
        assert!(start.elapsed() < bound * visits + Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallelism_only_for_matching_hosts() {
        let latency = Duration::from_secs(1);
        let engine = Arc::new(SlowEngine::new(latency));
        let mut collector = Collector::new(engine.clone());
        collector.limit(LimitRule::new("*shop.test*", Duration::ZERO, 1));

        let start = Instant::now();
        let (a, b) = tokio::join!(
            collector.visit("https://www.shop.test/1"),
            collector.visit("https://www.shop.test/2")
        );
        a.unwrap();
        b.unwrap();
        assert_eq!(engine.peak.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() >= latency * 2);

        let engine = Arc::new(SlowEngine::new(latency));
        let mut collector = Collector::new(engine.clone());
        collector.limit(LimitRule::new("*shop.test*", Duration::ZERO, 1));

        let start = Instant::now();
        let (a, b) = tokio::join!(
            collector.visit("https://elsewhere.test/1"),
            collector.visit("https://elsewhere.test/2")
        );
        a.unwrap();
        b.unwrap();
        assert_eq!(engine.peak.load(Ordering::SeqCst), 2);
        assert!(start.elapsed() >= latency && start.elapsed() < latency * 2);
    }

    #[test]
    fn test_matching_rule() {
        let mut collector = Collector::new(Arc::new(StaticEngine::ok(LISTING)));
        assert!(collector.matching_rule("https://www.shop.test/").is_none());

        collector.limit(LimitRule::new("*shop.test*", Duration::from_secs(1), 2));
        let (rule, _) = collector.matching_rule("https://www.shop.test/s?k=x").unwrap();
        assert_eq!(rule.parallelism, 2);

        assert!(collector.matching_rule("https://elsewhere.test/").is_none());
        assert!(collector.matching_rule("not a url").is_none());
        assert!(collector.matching_rule("").is_none());
    }

    #[test]
    fn test_child_text_and_attr() {
        let document = Html::parse_document(LISTING);
        let element = document.select(&sel("div.item")).next().unwrap();
        let element = HtmlElement::new(element);

        assert_eq!(element.child_text(&sel("h2")), "First");
        assert_eq!(element.child_attr(&sel("a"), "href"), "/p/1");
        assert_eq!(element.child_text(&sel("span.missing")), "");
        assert_eq!(element.child_attr(&sel("a"), "data-missing"), "");
    }
}
