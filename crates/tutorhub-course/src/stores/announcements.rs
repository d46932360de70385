//! Per-course announcement cache

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::{debug, warn};
use tutorhub_http::ApiClient;

use crate::announcements::{
    Announcement, AnnouncementApi, AnnouncementCreate, AnnouncementUpdate,
    DEFAULT_ANNOUNCEMENT_PAGE_SIZE,
};
use crate::error::CourseResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnouncementState {
    pub by_course: HashMap<String, Vec<Announcement>>,
    pub unseen: HashMap<String, u32>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Result of a list fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was written to the cache
    Applied,
    /// A newer fetch started meanwhile; the response was dropped
    Stale,
    /// Blank course id, nothing requested
    Skipped,
}

/// Announcements cached by course
///
/// Only the latest list fetch may write to the state. Each fetch takes a
/// sequence number and a response whose number is no longer current is
/// dropped without touching the cache, `loading` or `error`.
pub struct AnnouncementStore {
    api: AnnouncementApi,
    seq: AtomicU64,
    state: RwLock<AnnouncementState>,
}

impl AnnouncementStore {
    pub fn new(client: ApiClient) -> Self {
        Self::with_api(AnnouncementApi::new(client))
    }

    pub fn with_api(api: AnnouncementApi) -> Self {
        Self {
            api,
            seq: AtomicU64::new(0),
            state: RwLock::new(AnnouncementState::default()),
        }
    }

    pub fn state(&self) -> AnnouncementState {
        self.state.read().clone()
    }

    pub fn cached(&self, course_id: &str) -> Option<Vec<Announcement>> {
        self.state.read().by_course.get(course_id).cloned()
    }

    pub fn unseen_count(&self, course_id: &str) -> u32 {
        self.state.read().unseen.get(course_id).copied().unwrap_or(0)
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    /// Fetch one page for a course (page 0 and size 10 when unset)
    pub async fn fetch(
        &self,
        course_id: &str,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> CourseResult<FetchOutcome> {
        let course_id = course_id.trim();
        if course_id.is_empty() {
            return Ok(FetchOutcome::Skipped);
        }

        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.write();
            state.loading = true;
            state.error = None;
        }

        let result = self
            .api
            .list(
                course_id,
                page.unwrap_or(0),
                page_size.unwrap_or(DEFAULT_ANNOUNCEMENT_PAGE_SIZE),
            )
            .await;

        let mut state = self.state.write();
        if self.seq.load(Ordering::SeqCst) != seq {
            debug!(course_id, seq, "Dropping stale announcement response");
            return Ok(FetchOutcome::Stale);
        }
        state.loading = false;
        match result {
            Ok(page) => {
                if let Some(unseen) = &page.unseen {
                    state.unseen.insert(course_id.to_string(), unseen.unseen_count);
                }
                state.by_course.insert(course_id.to_string(), page.items);
                Ok(FetchOutcome::Applied)
            }
            Err(e) => {
                warn!(course_id, "Announcement fetch failed: {}", e);
                state.error = Some(e.message());
                Err(e)
            }
        }
    }

    /// Fetch a single announcement without touching the cache
    pub async fn fetch_one(&self, announcement_id: &str) -> CourseResult<Option<Announcement>> {
        let result = self.api.item(announcement_id).await;
        self.record(result)
    }

    /// Create and prepend to the course's cached list
    pub async fn create(&self, create: &AnnouncementCreate) -> CourseResult<Announcement> {
        let created = self.record(self.api.create(create).await)?;
        self.state
            .write()
            .by_course
            .entry(created.course_id.clone())
            .or_default()
            .insert(0, created.clone());
        Ok(created)
    }

    /// Update and replace the cached copy in place
    pub async fn update(
        &self,
        announcement_id: &str,
        update: &AnnouncementUpdate,
    ) -> CourseResult<Announcement> {
        let updated = self.record(self.api.update(announcement_id, update).await)?;
        if let Some(list) = self.state.write().by_course.get_mut(&updated.course_id) {
            if let Some(slot) = list
                .iter_mut()
                .find(|a| a.announcement_id == updated.announcement_id)
            {
                *slot = updated.clone();
            }
        }
        Ok(updated)
    }

    /// Delete and drop it from the course's cached list
    pub async fn delete(&self, course_id: &str, announcement_id: &str) -> CourseResult<()> {
        self.record(self.api.delete(announcement_id).await)?;
        if let Some(list) = self.state.write().by_course.get_mut(course_id) {
            list.retain(|a| a.announcement_id != announcement_id);
        }
        Ok(())
    }

    fn record<T>(&self, result: CourseResult<T>) -> CourseResult<T> {
        if let Err(e) = &result {
            warn!("Announcement request failed: {}", e);
            self.state.write().error = Some(e.message());
        }
        result
    }
}
