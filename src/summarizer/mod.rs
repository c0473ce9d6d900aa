use anyhow::{Result, anyhow};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

use crate::settings::SummarizerSettings;

mod openai;
mod retry;

pub use openai::OpenAiSummarizer;
pub(crate) use openai::DEFAULT_MODEL;

pub type SummaryFuture = Pin<Box<dyn Future<Output = Result<String>> + Send>>;

/// External summarization capability. Callers treat an error and an absent
/// summarizer the same way.
pub trait Summarizer: Send + Sync {
    fn summarize(&self, text: String) -> SummaryFuture;
}

impl<S: Summarizer + ?Sized> Summarizer for Arc<S> {
    fn summarize(&self, text: String) -> SummaryFuture {
        (**self).summarize(text)
    }
}

impl<S: Summarizer + ?Sized> Summarizer for &S {
    fn summarize(&self, text: String) -> SummaryFuture {
        (**self).summarize(text)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

impl Summarizer for Unavailable {
    fn summarize(&self, _text: String) -> SummaryFuture {
        Box::pin(async { Err(anyhow!("summarizer is not available")) })
    }
}

type SummarizerFactory = Box<dyn Fn() -> Result<Arc<dyn Summarizer>> + Send + Sync>;

/// Process-wide summarizer handle. The inner client is built on first use,
/// at most once, and a failed build is remembered as "unavailable".
pub struct LazySummarizer {
    factory: SummarizerFactory,
    cell: OnceLock<Option<Arc<dyn Summarizer>>>,
}

impl LazySummarizer {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Summarizer>> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            cell: OnceLock::new(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(|| Err(anyhow!("summarizer is disabled in settings")))
    }

    pub fn from_settings(settings: &SummarizerSettings) -> Self {
        if !settings.enabled {
            return Self::disabled();
        }
        let settings = settings.clone();
        Self::new(move || {
            let summarizer = OpenAiSummarizer::from_settings(&settings)?;
            Ok(Arc::new(summarizer) as Arc<dyn Summarizer>)
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    fn handle(&self) -> Option<Arc<dyn Summarizer>> {
        self.cell
            .get_or_init(|| match (self.factory)() {
                Ok(summarizer) => {
                    info!("summarizer initialized");
                    Some(summarizer)
                }
                Err(err) => {
                    warn!("summarizer unavailable: {}", err);
                    None
                }
            })
            .clone()
    }
}

impl std::fmt::Debug for LazySummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazySummarizer")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl Summarizer for LazySummarizer {
    fn summarize(&self, text: String) -> SummaryFuture {
        match self.handle() {
            Some(inner) => inner.summarize(text),
            None => Unavailable.summarize(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Echo;

    impl Summarizer for Echo {
        fn summarize(&self, text: String) -> SummaryFuture {
            Box::pin(async move { Ok(format!("summary of {} chars", text.len())) })
        }
    }

    #[tokio::test]
    async fn unavailable_always_fails() {
        assert!(Unavailable.summarize("menu".to_string()).await.is_err());
    }

    #[tokio::test]
    async fn lazy_summarizer_builds_once() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = builds.clone();
        let lazy = LazySummarizer::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Echo) as Arc<dyn Summarizer>)
        });
        assert!(!lazy.is_initialized());

        let first = lazy.summarize("abc".to_string()).await.expect("summary");
        let second = lazy.summarize("abcd".to_string()).await.expect("summary");
        assert_eq!(first, "summary of 3 chars");
        assert_eq!(second, "summary of 4 chars");
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(lazy.is_initialized());
    }

    #[test]
    fn concurrent_first_use_initializes_once() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = builds.clone();
        let lazy = Arc::new(LazySummarizer::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(10));
            Ok(Arc::new(Echo) as Arc<dyn Summarizer>)
        }));

        let threads = (0..8)
            .map(|_| {
                let lazy = lazy.clone();
                std::thread::spawn(move || lazy.handle().is_some())
            })
            .collect::<Vec<_>>();
        for thread in threads {
            assert!(thread.join().expect("join"));
        }
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_factory_is_remembered() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = builds.clone();
        let lazy = LazySummarizer::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("no key"))
        });
        assert!(lazy.summarize("x".to_string()).await.is_err());
        assert!(lazy.summarize("y".to_string()).await.is_err());
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disabled_settings_never_build_a_client() {
        let settings = SummarizerSettings {
            enabled: false,
            ..SummarizerSettings::default()
        };
        let lazy = LazySummarizer::from_settings(&settings);
        assert!(lazy.summarize("menu".to_string()).await.is_err());
    }
}
