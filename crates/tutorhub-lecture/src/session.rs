//! In-lecture lifecycle: join, heartbeat, reconnect and teardown

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tutorhub_config::LectureSettings;

use crate::api::LiveLectureApi;
use crate::error::{LectureError, LectureResult, VideoError};
use crate::models::JoinTicket;
use crate::video::{ConnectionState, MediaStream, VideoClient, VideoHandle, VideoQuality};

/// What ended a lecture session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitTrigger {
    /// The teacher pressed leave
    Explicit,
    /// The window went to the background
    TabHidden,
    /// The process or page is going away
    Unload,
    /// The lecture view was closed
    Unmount,
    /// The SDK reported the connection closed
    ConnectionClosed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub language: String,
    pub region: String,
    pub user_name: String,
    pub password: String,
    pub heartbeat_interval: Duration,
    pub quality: VideoQuality,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_settings(&LectureSettings::default())
    }
}

impl SessionOptions {
    pub fn from_settings(settings: &LectureSettings) -> Self {
        Self {
            language: settings.language.clone(),
            region: settings.region.clone(),
            user_name: settings.user_name.clone(),
            password: String::new(),
            heartbeat_interval: settings.heartbeat_interval(),
            quality: VideoQuality::default(),
        }
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }
}

struct Inner {
    api: LiveLectureApi,
    client: Arc<dyn VideoClient>,
    stream: Arc<dyn MediaStream>,
    ticket: JoinTicket,
    user_id: Option<u64>,
    quality: VideoQuality,
    video: Mutex<Option<VideoHandle>>,
    exit: Mutex<Option<ExitTrigger>>,
    heartbeat: CancellationToken,
    listener: CancellationToken,
}

/// A joined live lecture
///
/// Leaving is idempotent: whichever [`ExitTrigger`] fires first tears the
/// session down, later ones are ignored. Dropping an active session leaves
/// with [`ExitTrigger::Unmount`].
pub struct LectureSession {
    inner: Arc<Inner>,
}

impl LectureSession {
    /// Join the video session described by `ticket` and start the heartbeat
    pub async fn start(
        api: LiveLectureApi,
        client: Arc<dyn VideoClient>,
        ticket: JoinTicket,
        options: SessionOptions,
    ) -> LectureResult<Self> {
        if ticket.token.is_empty() || ticket.lesson_id.is_empty() {
            error!("Lecture start without token or topic");
            return Err(LectureError::MissingTicket);
        }

        client.init(&options.language, &options.region).await?;
        info!(lesson_id = %ticket.lesson_id, "Video client initialised");
        client
            .join(
                &ticket.lesson_id,
                &ticket.token,
                &options.user_name,
                &options.password,
            )
            .await?;
        info!(lesson_id = %ticket.lesson_id, "Joined video session");

        match api.notify_joined(&ticket.token).await {
            Ok(true) => debug!("Join acknowledged"),
            Ok(false) => warn!("Backend did not acknowledge join"),
            Err(e) => warn!("Join notification failed: {}", e),
        }

        let stream = client.media_stream();
        let user_id = client.current_user_id();
        let video = match start_video(stream.as_ref(), user_id, options.quality).await {
            Ok(video) => video,
            Err(e) => {
                if let Err(leave_err) = client.leave().await {
                    warn!("Leave after failed start: {}", leave_err);
                }
                return Err(e.into());
            }
        };

        let events = client.connection_events();
        let inner = Arc::new(Inner {
            api,
            client,
            stream,
            ticket,
            user_id,
            quality: options.quality,
            video: Mutex::new(video),
            exit: Mutex::new(None),
            heartbeat: CancellationToken::new(),
            listener: CancellationToken::new(),
        });

        spawn_heartbeat(Arc::clone(&inner), options.heartbeat_interval);
        spawn_listener(Arc::clone(&inner), events);

        Ok(Self { inner })
    }

    pub fn ticket(&self) -> &JoinTicket {
        &self.inner.ticket
    }

    pub fn user_id(&self) -> Option<u64> {
        self.inner.user_id
    }

    pub fn video(&self) -> Option<VideoHandle> {
        self.inner.video.lock().clone()
    }

    pub fn heartbeat_active(&self) -> bool {
        !self.inner.heartbeat.is_cancelled()
    }

    pub fn is_left(&self) -> bool {
        self.inner.exit.lock().is_some()
    }

    /// The trigger that ended the session, if any
    pub fn exit_trigger(&self) -> Option<ExitTrigger> {
        *self.inner.exit.lock()
    }

    /// Leave the lecture; `true` only for the call that performed teardown
    pub async fn leave(&self, trigger: ExitTrigger) -> bool {
        if !self.inner.begin_teardown(trigger) {
            return false;
        }
        self.inner.finish_teardown().await;
        true
    }
}

impl Drop for LectureSession {
    fn drop(&mut self) {
        if !self.inner.begin_teardown(ExitTrigger::Unmount) {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let inner = Arc::clone(&self.inner);
                handle.spawn(async move { inner.finish_teardown().await });
            }
            Err(_) => warn!("No runtime on drop, video client not left"),
        }
    }
}

impl Inner {
    /// Claim the teardown and do its synchronous part
    fn begin_teardown(&self, trigger: ExitTrigger) -> bool {
        {
            let mut exit = self.exit.lock();
            if let Some(first) = *exit {
                debug!(?trigger, ?first, "Lecture already left");
                return false;
            }
            *exit = Some(trigger);
        }

        info!(?trigger, lesson_id = %self.ticket.lesson_id, "Leaving lecture");
        self.heartbeat.cancel();
        self.listener.cancel();
        if tokio::runtime::Handle::try_current().is_ok() {
            // Fire and forget
            self.api.exit_detached(&self.ticket.lesson_id);
        } else {
            warn!("No runtime, exit notification not sent");
        }
        true
    }

    async fn finish_teardown(&self) {
        if let Some(user_id) = self.user_id {
            if let Err(e) = self.stream.detach_video(user_id).await {
                warn!("Detach video failed: {}", e);
            }
        }
        self.video.lock().take();
        if let Err(e) = self.client.leave().await {
            warn!("Video client leave failed: {}", e);
        }
    }

    async fn reattach_video(&self) {
        let Some(user_id) = self.user_id else {
            return;
        };
        if let Err(e) = self.stream.detach_video(user_id).await {
            debug!("Detach before reattach failed: {}", e);
        }
        match self.stream.attach_video(user_id, self.quality).await {
            Ok(handle) => {
                *self.video.lock() = Some(handle);
                info!("Video reattached");
            }
            Err(e) => warn!("Reattach video failed: {}", e),
        }
    }
}

async fn start_video(
    stream: &dyn MediaStream,
    user_id: Option<u64>,
    quality: VideoQuality,
) -> Result<Option<VideoHandle>, VideoError> {
    stream.start_video().await?;
    match user_id {
        Some(user_id) => Ok(Some(stream.attach_video(user_id, quality).await?)),
        None => {
            warn!("No current user id, self video not attached");
            Ok(None)
        }
    }
}

fn spawn_heartbeat(inner: Arc<Inner>, period: Duration) {
    let token = inner.heartbeat.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!("Heartbeat started");
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    if let Err(e) = inner.api.heartbeat(&inner.ticket.lesson_id).await {
                        warn!("Heartbeat failed: {}", e);
                    }
                }
            }
        }
        debug!("Heartbeat stopped");
    });
}

fn spawn_listener(inner: Arc<Inner>, mut events: broadcast::Receiver<ConnectionState>) {
    let token = inner.listener.clone();
    tokio::spawn(async move {
        loop {
            let event = tokio::select! {
                _ = token.cancelled() => break,
                event = events.recv() => event,
            };
            match event {
                Ok(ConnectionState::Connected) => {
                    info!("Video connection restored");
                    inner.reattach_video().await;
                }
                Ok(ConnectionState::Reconnecting) => warn!("Video connection reconnecting"),
                Ok(ConnectionState::Connecting) => debug!("Video connection connecting"),
                Ok(ConnectionState::Closed) => {
                    warn!("Video connection closed");
                    if inner.begin_teardown(ExitTrigger::ConnectionClosed) {
                        inner.finish_teardown().await;
                    }
                    break;
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Connection events lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}
