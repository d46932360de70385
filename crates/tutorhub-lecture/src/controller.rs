//! Lesson status polling and the join flow

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{LiveLectureApi, DEFAULT_LESSON_DESCRIPTION};
use crate::error::{LectureError, LectureResult};
use crate::models::{JoinTicket, LessonStatus};

/// Observable state of one course's live lecture slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LectureState {
    pub status: Option<LessonStatus>,
    /// Lesson id reported with the status, used as the video topic
    pub lesson_id: Option<String>,
    /// A status request is in flight
    pub loading: bool,
    /// The join flow is running
    pub joining: bool,
    pub error: Option<String>,
    /// Set once the join flow succeeds
    pub ticket: Option<JoinTicket>,
}

impl LectureState {
    pub fn can_enter(&self) -> bool {
        self.status.map_or(false, LessonStatus::can_enter)
    }
}

struct Shared {
    api: LiveLectureApi,
    course_id: String,
    state: RwLock<LectureState>,
    join_in_flight: AtomicBool,
}

impl Shared {
    async fn refresh_status(&self) {
        self.state.write().loading = true;
        let result = self.api.status(&self.course_id).await;

        let mut state = self.state.write();
        state.loading = false;
        match result {
            Ok(snapshot) => {
                debug!(course_id = %self.course_id, status = ?snapshot.status, "Lesson status");
                state.status = snapshot.status;
                state.lesson_id = snapshot.lesson_id;
                state.error = None;
            }
            Err(e) => {
                warn!(course_id = %self.course_id, "Lesson status failed: {}", e);
                state.error = Some(e.message());
            }
        }
    }
}

/// Clears the in-flight flag even when the join future is dropped midway
struct JoinGuard<'a> {
    shared: &'a Shared,
}

impl<'a> JoinGuard<'a> {
    fn acquire(shared: &'a Shared) -> Option<Self> {
        if shared.join_in_flight.swap(true, Ordering::AcqRel) {
            return None;
        }
        shared.state.write().joining = true;
        Some(Self { shared })
    }
}

impl Drop for JoinGuard<'_> {
    fn drop(&mut self) {
        self.shared.state.write().joining = false;
        self.shared.join_in_flight.store(false, Ordering::Release);
    }
}

/// Status and join flow for one course
///
/// Dropping the controller stops polling.
pub struct LectureController {
    shared: Arc<Shared>,
    description: String,
    poll: Mutex<Option<CancellationToken>>,
}

impl LectureController {
    pub fn new(api: LiveLectureApi, course_id: impl Into<String>) -> Self {
        Self {
            shared: Arc::new(Shared {
                api,
                course_id: course_id.into(),
                state: RwLock::new(LectureState::default()),
                join_in_flight: AtomicBool::new(false),
            }),
            description: DEFAULT_LESSON_DESCRIPTION.to_string(),
            poll: Mutex::new(None),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn course_id(&self) -> &str {
        &self.shared.course_id
    }

    pub fn api(&self) -> &LiveLectureApi {
        &self.shared.api
    }

    pub fn state(&self) -> LectureState {
        self.shared.state.read().clone()
    }

    pub fn can_enter(&self) -> bool {
        self.shared.state.read().can_enter()
    }

    pub fn ticket(&self) -> Option<JoinTicket> {
        self.shared.state.read().ticket.clone()
    }

    /// Fetch the status once; failures land in [`LectureState::error`]
    pub async fn refresh_status(&self) {
        self.shared.refresh_status().await;
    }

    /// Refresh now, then every `interval` until stopped or dropped
    pub fn start_polling(&self, interval: Duration) {
        let token = CancellationToken::new();
        if let Some(previous) = self.poll.lock().replace(token.clone()) {
            previous.cancel();
        }

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => shared.refresh_status().await,
                }
            }
            debug!(course_id = %shared.course_id, "Status polling stopped");
        });
    }

    pub fn stop_polling(&self) {
        if let Some(token) = self.poll.lock().take() {
            token.cancel();
        }
    }

    pub fn is_polling(&self) -> bool {
        self.poll.lock().is_some()
    }

    /// Create the lesson, obtain a join token and verify it
    ///
    /// Returns `Ok(None)` without touching the network unless the last
    /// known status allows entering, and [`LectureError::JoinInProgress`]
    /// while another call is still running. The first failing step ends the
    /// flow; its error is recorded in the state and returned.
    pub async fn begin_join_flow(&self) -> LectureResult<Option<JoinTicket>> {
        let lesson_id = {
            let state = self.shared.state.read();
            if !state.can_enter() {
                debug!(course_id = %self.shared.course_id, "Lecture not enterable, join skipped");
                return Ok(None);
            }
            state.lesson_id.clone()
        };

        // Must outlive `state`: dropping the guard takes the write lock
        let Some(_guard) = JoinGuard::acquire(&self.shared) else {
            debug!(course_id = %self.shared.course_id, "Join flow already running");
            return Err(LectureError::JoinInProgress);
        };
        let result = self.join(lesson_id).await;

        let mut state = self.shared.state.write();
        match result {
            Ok(ticket) => {
                info!(course_id = %ticket.course_id, lesson_id = %ticket.lesson_id, "Join ticket issued");
                state.error = None;
                state.ticket = Some(ticket.clone());
                Ok(Some(ticket))
            }
            Err(e) => {
                warn!(course_id = %self.shared.course_id, "Join flow failed: {}", e);
                state.error = Some(e.message());
                Err(e)
            }
        }
    }

    async fn join(&self, known_lesson: Option<String>) -> LectureResult<JoinTicket> {
        let api = &self.shared.api;
        let course_id = &self.shared.course_id;

        let lesson = api.create(course_id, &self.description).await?;
        let token = api
            .join_token(course_id)
            .await?
            .ok_or(LectureError::MissingJoinToken)?;
        if !api.verify_token(&token).await? {
            return Err(LectureError::TokenRejected);
        }

        let lesson_id = lesson
            .map(|l| l.lesson_id)
            .or(known_lesson)
            .unwrap_or_default();
        Ok(JoinTicket {
            course_id: course_id.clone(),
            lesson_id,
            token,
        })
    }
}

impl Drop for LectureController {
    fn drop(&mut self) {
        self.stop_polling();
    }
}
