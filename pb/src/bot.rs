//! Bot runtime: long polling, bounded dispatch, shutdown
//!
//! Every update, and every media group the aggregator flushes, is handled on
//! its own task. A semaphore bounds how many run at once and each one gets a
//! fixed time budget.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use eyre::{Context, Result};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::gemini::{GeminiClient, GenerationBackend};
use crate::handlers::Handler;
use crate::httpclient;
use crate::mediagroup::{Aggregator, FlushFn, MediaGroup};
use crate::preview::PreviewStore;
use crate::session::SessionStore;
use crate::telegram::{ChatTransport, TelegramClient, TransportError, Update};

/// Pause after a failed poll before polling again
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(3);

/// One unit of work for the handler
#[derive(Debug)]
enum Job {
    Update(Update),
    Group(MediaGroup),
}

impl Job {
    fn label(&self) -> &'static str {
        match self {
            Job::Update(_) => "update",
            Job::Group(_) => "media_group",
        }
    }
}

enum Event {
    Shutdown,
    Group(MediaGroup),
    Joined(Result<(), JoinError>),
    Polled(Result<Vec<Update>, TransportError>),
}

/// The composed bot
pub struct Bot {
    transport: Arc<dyn ChatTransport>,
    handler: Arc<Handler>,
    aggregator: Aggregator,
    groups: mpsc::UnboundedReceiver<MediaGroup>,
    limiter: Arc<Semaphore>,
    tasks: JoinSet<()>,
    request_timeout: Duration,
    poll_timeout_secs: u64,
    offset: i64,
}

impl Bot {
    /// Build the real HTTP clients from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        debug!("Bot::from_config: called");
        config.validate()?;
        let http = httpclient::build(&config.http).context("Failed to build HTTP client")?;
        let transport = Arc::new(TelegramClient::from_config(&config.telegram, http.clone()));
        let backend = Arc::new(GeminiClient::from_config(&config.gemini, http));
        Ok(Self::new(transport, backend, config))
    }

    /// Compose the bot around a transport and a backend
    pub fn new(transport: Arc<dyn ChatTransport>, backend: Arc<dyn GenerationBackend>, config: &Config) -> Self {
        debug!(
            max_concurrent = config.bot.max_concurrent,
            debounce_ms = config.bot.media_group_debounce_ms,
            "Bot::new: called"
        );
        let (tx, groups) = mpsc::unbounded_channel();
        let on_flush: FlushFn = Arc::new(move |group: MediaGroup| {
            if tx.send(group).is_err() {
                warn!("Media group flushed after shutdown, dropping");
            }
        });
        let aggregator = Aggregator::new(config.bot.media_group_debounce(), on_flush);

        let handler = Handler::new(
            Arc::clone(&transport),
            backend,
            Arc::new(SessionStore::new(config.bot.max_history_messages)),
            Arc::new(PreviewStore::new()),
            Catalog::builtin(),
        )
        .with_aggregator(aggregator.clone());

        Self {
            transport,
            handler: Arc::new(handler),
            aggregator,
            groups,
            limiter: Arc::new(Semaphore::new(config.bot.max_concurrent.max(1))),
            tasks: JoinSet::new(),
            request_timeout: config.bot.request_timeout(),
            poll_timeout_secs: config.telegram.poll_timeout_secs,
            offset: 0,
        }
    }

    /// Poll and dispatch until `shutdown` completes, then drain
    pub async fn run<F>(mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let me = self
            .transport
            .get_me()
            .await
            .context("Failed to reach the chat transport")?;
        info!(bot = %me.display_name(), "Bot started");

        tokio::pin!(shutdown);
        loop {
            let transport = Arc::clone(&self.transport);
            let event = tokio::select! {
                _ = &mut shutdown => Event::Shutdown,
                Some(group) = self.groups.recv() => Event::Group(group),
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => Event::Joined(joined),
                polled = transport.get_updates(self.offset, self.poll_timeout_secs) => Event::Polled(polled),
            };

            match event {
                Event::Shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
                Event::Group(group) => self.dispatch(Job::Group(group)).await?,
                Event::Joined(joined) => log_joined(joined),
                Event::Polled(Ok(updates)) => self.dispatch_updates(updates).await?,
                Event::Polled(Err(e)) => {
                    warn!(error = %e, "Polling failed");
                    tokio::time::sleep(POLL_ERROR_PAUSE).await;
                }
            }
        }

        self.drain().await?;
        info!("Bot stopped");
        Ok(())
    }

    /// Fetch one batch of updates and dispatch it; returns the batch size
    pub async fn poll_once(&mut self) -> Result<usize> {
        let updates = self
            .transport
            .get_updates(self.offset, self.poll_timeout_secs)
            .await
            .context("Failed to fetch updates")?;
        let count = updates.len();
        self.dispatch_updates(updates).await?;
        Ok(count)
    }

    async fn dispatch_updates(&mut self, updates: Vec<Update>) -> Result<()> {
        debug!(count = updates.len(), offset = self.offset, "dispatch_updates: called");
        for update in updates {
            self.offset = self.offset.max(update.update_id + 1);
            self.dispatch(Job::Update(update)).await?;
        }
        Ok(())
    }

    /// Run a job on its own task once a concurrency slot is free
    async fn dispatch(&mut self, job: Job) -> Result<()> {
        let permit = Arc::clone(&self.limiter)
            .acquire_owned()
            .await
            .context("Concurrency limiter closed")?;
        let handler = Arc::clone(&self.handler);
        let budget = self.request_timeout;
        debug!(job = job.label(), "dispatch: spawning");

        self.tasks.spawn(async move {
            let _permit = permit;
            let label = job.label();
            let work = async {
                match job {
                    Job::Update(update) => handler.handle_update(update).await,
                    Job::Group(group) => handler.handle_media_group(group).await,
                }
            };
            match tokio::time::timeout(budget, work).await {
                Ok(Ok(())) => debug!(job = label, "dispatch: done"),
                Ok(Err(e)) => error!(job = label, error = %e, "Handler failed"),
                Err(_) => warn!(job = label, ?budget, "Handler timed out"),
            }
        });
        Ok(())
    }

    /// Wait for every running job and flush pending media groups
    ///
    /// Running update handlers may still add album photos, so jobs are joined
    /// before each flush until both are empty.
    pub async fn drain(&mut self) -> Result<()> {
        debug!(running = self.tasks.len(), "drain: called");
        loop {
            while let Some(joined) = self.tasks.join_next().await {
                log_joined(joined);
            }
            let flushed = self.aggregator.flush_all();
            while let Ok(group) = self.groups.try_recv() {
                self.dispatch(Job::Group(group)).await?;
            }
            debug!(flushed, running = self.tasks.len(), "drain: flushed");
            if self.tasks.is_empty() && self.aggregator.pending_count() == 0 {
                return Ok(());
            }
        }
    }
}

fn log_joined(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "Handler task panicked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::mock::MockGenerationBackend;
    use crate::gemini::{ChatOptions, GenerationError, GenerationResponse, ImageInput};
    use crate::handlers::messages;
    use crate::session::HistoryMessage;
    use crate::telegram::mock::MockTransport;
    use crate::telegram::{Chat, Message, PhotoSize, User};
    use async_trait::async_trait;

    fn message(update_id: i64, text: Option<&str>, photo: Option<(&str, &str)>) -> Update {
        Update {
            update_id,
            message: Some(Message {
                message_id: update_id,
                from: Some(User {
                    id: 7,
                    first_name: "Ann".to_string(),
                    ..Default::default()
                }),
                chat: Chat { id: 10 },
                text: text.map(str::to_string),
                photo: photo
                    .map(|(file_id, _)| {
                        vec![PhotoSize {
                            file_id: file_id.to_string(),
                            ..Default::default()
                        }]
                    })
                    .unwrap_or_default(),
                media_group_id: photo.map(|(_, group)| group.to_string()),
                ..Default::default()
            }),
            callback_query: None,
        }
    }

    fn bot(transport: Arc<MockTransport>, backend: Arc<dyn GenerationBackend>) -> Bot {
        let mut config = Config::default();
        config.bot.media_group_debounce_ms = 60_000;
        config.bot.request_timeout_secs = 5;
        Bot::new(transport, backend, &config)
    }

    #[tokio::test]
    async fn test_poll_dispatches_and_advances_offset() {
        let transport = Arc::new(MockTransport::new());
        transport.queue_updates(vec![message(41, Some("/start"), None), message(42, Some("/help"), None)]);
        let mut bot = bot(transport.clone(), Arc::new(MockGenerationBackend::new(vec![])));

        assert_eq!(bot.poll_once().await.unwrap(), 2);
        assert_eq!(bot.offset, 43);
        bot.drain().await.unwrap();

        let mut texts = transport.texts();
        texts.sort();
        let mut expected = vec![messages::START.to_string(), messages::HELP.to_string()];
        expected.sort();
        assert_eq!(texts, expected);
    }

    #[tokio::test]
    async fn test_drain_flushes_pending_media_groups() {
        let transport = Arc::new(
            MockTransport::new()
                .with_file("a", b"\x89PNG\r\n\x1a\n", "image/png")
                .with_file("b", b"\x89PNG\r\n\x1a\n", "image/png"),
        );
        transport.queue_updates(vec![
            message(1, None, Some(("a", "g1"))),
            message(2, None, Some(("b", "g1"))),
        ]);
        let backend = Arc::new(MockGenerationBackend::new(vec![GenerationResponse {
            text: "Ikkala rasm".to_string(),
            images: vec![],
        }]));
        let mut bot = bot(transport.clone(), backend.clone());

        bot.poll_once().await.unwrap();
        bot.drain().await.unwrap();

        assert_eq!(backend.call_count(), 1);
        assert_eq!(backend.calls()[0].image_count, 2);
        assert_eq!(transport.texts(), vec!["Ikkala rasm"]);
    }

    #[tokio::test]
    async fn test_drain_keeps_album_photos_added_by_running_handlers() {
        let transport = Arc::new(
            MockTransport::new()
                .with_file("a", b"\x89PNG\r\n\x1a\n", "image/png")
                .with_file("b", b"\x89PNG\r\n\x1a\n", "image/png")
                .with_file("c", b"\x89PNG\r\n\x1a\n", "image/png"),
        );
        transport.queue_updates(vec![
            message(1, None, Some(("a", "g1"))),
            message(2, None, Some(("b", "g2"))),
            message(3, None, Some(("c", "g2"))),
        ]);
        let backend = Arc::new(MockGenerationBackend::new(vec![
            GenerationResponse {
                text: "birinchi".to_string(),
                images: vec![],
            },
            GenerationResponse {
                text: "ikkinchi".to_string(),
                images: vec![],
            },
        ]));
        let mut bot = bot(transport.clone(), backend.clone());

        // no yield between dispatch and drain, so no handler has run yet
        bot.poll_once().await.unwrap();
        assert_eq!(bot.aggregator.pending_count(), 0);
        bot.drain().await.unwrap();

        assert_eq!(backend.call_count(), 2);
        let mut counts: Vec<usize> = backend.calls().iter().map(|c| c.image_count).collect();
        counts.sort();
        assert_eq!(counts, vec![1, 2]);
        assert_eq!(bot.aggregator.pending_count(), 0);
        assert!(bot.tasks.is_empty());
    }

    struct StuckBackend;

    #[async_trait]
    impl GenerationBackend for StuckBackend {
        async fn chat(
            &self,
            _history: &[HistoryMessage],
            _prompt: &str,
            _images: &[ImageInput],
            _opts: &ChatOptions,
        ) -> Result<GenerationResponse, GenerationError> {
            std::future::pending().await
        }

        async fn generate_image(&self, _prompt: &str) -> Result<GenerationResponse, GenerationError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stuck_handler_is_timed_out() {
        let transport = Arc::new(MockTransport::new());
        transport.queue_updates(vec![message(1, Some("salom"), None)]);
        let mut bot = bot(transport.clone(), Arc::new(StuckBackend));

        bot.poll_once().await.unwrap();
        bot.drain().await.unwrap();

        assert!(transport.texts().is_empty());
        assert_eq!(bot.limiter.available_permits(), Config::default().bot.max_concurrent);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let transport = Arc::new(MockTransport::new());
        let bot = bot(transport, Arc::new(MockGenerationBackend::new(vec![])));
        bot.run(async {}).await.unwrap();
    }
}
