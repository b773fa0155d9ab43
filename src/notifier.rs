use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::page::{Banner, SharedPage};

pub const ERROR_DISMISS_AFTER: Duration = Duration::from_secs(5);
pub const SUCCESS_DISMISS_AFTER: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NotifierConfig {
    pub error_dismiss_after: Duration,
    pub success_dismiss_after: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        NotifierConfig {
            error_dismiss_after: ERROR_DISMISS_AFTER,
            success_dismiss_after: SUCCESS_DISMISS_AFTER,
        }
    }
}

/// Shows transient banners on a page.
///
/// Dismissal timers are one-shot and never cancelled. There is a single error banner, so a new
/// error replaces the text of the previous one and whichever timer fires first hides it. Success
/// banners stack and each one is removed by its own timer.
#[derive(Clone, Debug)]
pub struct Notifier {
    page: SharedPage,
    config: NotifierConfig,
    next_id: Arc<AtomicU64>,
}

impl Notifier {
    pub fn new(page: SharedPage, config: NotifierConfig) -> Self {
        Notifier {
            page,
            config,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn show_error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "showing error banner");

        let id = self.next_id();
        self.page.lock().error = Some(Banner { id, message });

        let page = self.page.clone();
        let delay = self.config.error_dismiss_after;
        async_std::task::spawn(async move {
            async_std::task::sleep(delay).await;
            page.lock().error = None;
        });
    }

    pub fn show_success(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(%message, "showing success banner");

        let id = self.next_id();
        self.page.lock().successes.insert(0, Banner { id, message });

        let page = self.page.clone();
        let delay = self.config.success_dismiss_after;
        async_std::task::spawn(async move {
            async_std::task::sleep(delay).await;
            page.lock().successes.retain(|banner| banner.id != id);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;

    fn notifier(page: &SharedPage) -> Notifier {
        Notifier::new(
            page.clone(),
            NotifierConfig {
                error_dismiss_after: Duration::from_millis(100),
                success_dismiss_after: Duration::from_millis(50),
            },
        )
    }

    #[async_std::test]
    async fn test_error_banner_is_dismissed() {
        let page = Page::shared();
        let notifier = notifier(&page);

        notifier.show_error("Please enter a search query");
        assert_eq!(
            page.lock().error.as_ref().map(|b| b.message.as_str()),
            Some("Please enter a search query")
        );

        async_std::task::sleep(Duration::from_millis(300)).await;
        assert!(page.lock().error.is_none());
    }

    #[async_std::test]
    async fn test_new_error_overwrites_previous() {
        let page = Page::shared();
        let notifier = notifier(&page);

        notifier.show_error("first");
        notifier.show_error("second");
        assert_eq!(
            page.lock().error.as_ref().map(|b| b.message.as_str()),
            Some("second")
        );
    }

    #[async_std::test]
    async fn test_success_banners_stack() {
        let page = Page::shared();
        let notifier = notifier(&page);

        notifier.show_success("one");
        notifier.show_success("two");
        {
            let page = page.lock();
            let messages: Vec<_> = page.successes.iter().map(|b| b.message.as_str()).collect();
            assert_eq!(messages, vec!["two", "one"]);
        }

        async_std::task::sleep(Duration::from_millis(250)).await;
        assert!(page.lock().successes.is_empty());
    }

    #[test]
    fn test_default_delays() {
        let config = NotifierConfig::default();
        assert_eq!(config.error_dismiss_after, Duration::from_secs(5));
        assert_eq!(config.success_dismiss_after, Duration::from_secs(3));
    }
}
