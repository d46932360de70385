//! Seam to the conferencing SDK
//!
//! The SDK itself is opaque to this crate; an embedder supplies an
//! implementation and [`LectureSession`](crate::LectureSession) drives it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::VideoError;

pub type VideoResult<T> = std::result::Result<T, VideoError>;

/// Connection state changes emitted by the SDK
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Reconnecting,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoQuality {
    Video360P,
    Video720P,
    #[default]
    Video1080P,
}

/// A rendered video attached for one participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoHandle {
    pub user_id: u64,
    pub quality: VideoQuality,
}

#[async_trait]
pub trait VideoClient: Send + Sync {
    async fn init(&self, language: &str, region: &str) -> VideoResult<()>;

    async fn join(&self, topic: &str, token: &str, user_name: &str, password: &str)
        -> VideoResult<()>;

    fn media_stream(&self) -> Arc<dyn MediaStream>;

    /// Participant id of this client once joined
    fn current_user_id(&self) -> Option<u64>;

    async fn leave(&self) -> VideoResult<()>;

    fn connection_events(&self) -> broadcast::Receiver<ConnectionState>;
}

#[async_trait]
pub trait MediaStream: Send + Sync {
    async fn start_video(&self) -> VideoResult<()>;

    async fn attach_video(&self, user_id: u64, quality: VideoQuality) -> VideoResult<VideoHandle>;

    async fn detach_video(&self, user_id: u64) -> VideoResult<()>;
}
