//! Live lecture endpoints

use serde_json::json;
use tokio::task::JoinHandle;
use tracing::debug;
use tutorhub_config::{LectureSettings, DEFAULT_LECTURE_NAMESPACE};
use tutorhub_http::{ApiClient, ApiRequest, Envelope, Result};

use crate::models::{JoinToken, Lesson, LessonStatus, StatusSnapshot};

/// Description sent when a teacher opens a lesson
pub const DEFAULT_LESSON_DESCRIPTION: &str = "Teacher started live lecture";

/// Path builder for the lesson endpoints under one namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LectureRoutes {
    namespace: String,
}

impl Default for LectureRoutes {
    fn default() -> Self {
        Self::new(DEFAULT_LECTURE_NAMESPACE)
    }
}

impl LectureRoutes {
    pub fn new(namespace: impl Into<String>) -> Self {
        let namespace: String = namespace.into();
        Self {
            namespace: namespace.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &LectureSettings) -> Self {
        Self::new(settings.route_namespace.as_str())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self, endpoint: &str) -> String {
        format!("{}/{}", self.namespace, endpoint)
    }
}

/// Calls that drive a live lesson
#[derive(Debug, Clone)]
pub struct LiveLectureApi {
    client: ApiClient,
    routes: LectureRoutes,
}

impl LiveLectureApi {
    pub fn new(client: ApiClient, routes: LectureRoutes) -> Self {
        Self { client, routes }
    }

    pub fn routes(&self) -> &LectureRoutes {
        &self.routes
    }

    /// Current lesson state of a course
    pub async fn status(&self, course_id: &str) -> Result<StatusSnapshot> {
        let req = ApiRequest::get(self.routes.path("status"))
            .query("course_id", course_id)
            .auth();
        let env: Envelope<LessonStatus> = self.client.send(&req).await?;
        let env = env.check()?;
        let lesson_id = env.meta_str("lesson_id").map(str::to_string);
        Ok(StatusSnapshot {
            status: env.into_first_opt(),
            lesson_id,
        })
    }

    /// Open (or reopen) the lesson for a course
    pub async fn create(&self, course_id: &str, description: &str) -> Result<Option<Lesson>> {
        let req = ApiRequest::post(self.routes.path("create"))
            .json(&json!({ "course_id": course_id, "description": description }))?
            .auth();
        let env: Envelope<Lesson> = self.client.send(&req).await?;
        Ok(env.check()?.into_first_opt())
    }

    /// Video session token for the teacher; `None` when the backend sent none
    pub async fn join_token(&self, course_id: &str) -> Result<Option<String>> {
        let req = ApiRequest::post(self.routes.path("join-token"))
            .query("course_id", course_id)
            .empty_json()
            .auth();
        let env: Envelope<JoinToken> = self.client.send(&req).await?;
        Ok(env
            .check()?
            .into_first_opt()
            .map(|t| t.token)
            .filter(|t| !t.is_empty()))
    }

    pub async fn verify_token(&self, token: &str) -> Result<bool> {
        let req = ApiRequest::get(self.routes.path("verify-token"))
            .query("token", token)
            .auth();
        let env: Envelope<bool> = self.client.send(&req).await?;
        Ok(env.check()?.into_first_opt().unwrap_or(false))
    }

    /// Tell the backend the host entered the video session
    pub async fn notify_joined(&self, token: &str) -> Result<bool> {
        let req = ApiRequest::post(self.routes.path("join"))
            .query("token", token)
            .empty_json()
            .auth();
        let env: Envelope<bool> = self.client.send(&req).await?;
        Ok(env.check()?.into_first_opt().unwrap_or(false))
    }

    pub async fn heartbeat(&self, lesson_id: &str) -> Result<()> {
        debug!(lesson_id, "Lecture heartbeat");
        self.client.send_empty(&self.heartbeat_request(lesson_id)).await
    }

    pub async fn exit(&self, lesson_id: &str) -> Result<()> {
        self.client.send_empty(&self.exit_request(lesson_id)).await
    }

    /// Send the exit notification without waiting for the answer
    pub fn exit_detached(&self, lesson_id: &str) -> JoinHandle<()> {
        self.client.send_detached(self.exit_request(lesson_id))
    }

    fn heartbeat_request(&self, lesson_id: &str) -> ApiRequest {
        ApiRequest::post(self.routes.path("heartbeat"))
            .query("lesson_id", lesson_id)
            .empty_json()
            .auth()
    }

    fn exit_request(&self, lesson_id: &str) -> ApiRequest {
        ApiRequest::post(self.routes.path("exit"))
            .query("lesson_id", lesson_id)
            .empty_json()
            .auth()
    }
}
