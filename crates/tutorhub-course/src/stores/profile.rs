//! The signed-in teacher's profile and approval state

use parking_lot::RwLock;
use tracing::{info, warn};
use tutorhub_http::ApiClient;

use crate::error::{CourseError, CourseResult};
use crate::profile::{
    ProfileApi, ProfileInfo, ProfileUpdate, SubbranchChange, TeacherApproval, TeacherOverview,
    TeacherSubbranch, TeacherUpdate,
};
use crate::upload::Upload;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileState {
    pub user_id: Option<String>,
    pub profile: Option<ProfileInfo>,
    pub overview: Option<TeacherOverview>,
    pub approvals: Vec<TeacherApproval>,
    pub loading: bool,
    pub error: Option<String>,
}

impl ProfileState {
    /// True until name, surname, birth date and primary branch are all set
    ///
    /// Subbranches are not part of the setup.
    pub fn needs_profile_setup(&self) -> bool {
        let blank = |v: Option<&str>| v.map_or(true, |s| s.trim().is_empty());
        let Some(profile) = &self.profile else {
            return true;
        };
        blank(profile.name.as_deref())
            || blank(profile.surname.as_deref())
            || blank(profile.birth_date.as_deref())
            || blank(self.overview.as_ref().and_then(|o| o.primary_branch.as_deref()))
    }
}

pub struct ProfileStore {
    api: ProfileApi,
    state: RwLock<ProfileState>,
}

impl ProfileStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            api: ProfileApi::new(client),
            state: RwLock::new(ProfileState::default()),
        }
    }

    pub fn state(&self) -> ProfileState {
        self.state.read().clone()
    }

    pub fn profile(&self) -> Option<ProfileInfo> {
        self.state.read().profile.clone()
    }

    pub fn overview(&self) -> Option<TeacherOverview> {
        self.state.read().overview.clone()
    }

    pub fn subbranches(&self) -> Vec<TeacherSubbranch> {
        self.state
            .read()
            .overview
            .as_ref()
            .map(|o| o.subbranches.clone())
            .unwrap_or_default()
    }

    pub fn approvals(&self) -> Vec<TeacherApproval> {
        self.state.read().approvals.clone()
    }

    pub fn needs_profile_setup(&self) -> bool {
        self.state.read().needs_profile_setup()
    }

    /// Load profile, overview and approvals for a user
    ///
    /// Approval history is best effort: a failure there leaves the list
    /// empty and does not fail the refresh.
    pub async fn refresh(&self, user_id: &str) -> CourseResult<()> {
        {
            let mut state = self.state.write();
            state.user_id = Some(user_id.to_string());
            state.loading = true;
            state.error = None;
        }

        let loaded = self.load(user_id).await;

        let mut state = self.state.write();
        state.loading = false;
        match loaded {
            Ok((profile, overview, approvals)) => {
                info!(teacher_id = %profile.teacher_id, "Profile loaded");
                state.profile = Some(profile);
                state.overview = Some(overview);
                state.approvals = approvals;
                Ok(())
            }
            Err(e) => {
                warn!(user_id, "Profile refresh failed: {}", e);
                state.error = Some(e.message());
                Err(e)
            }
        }
    }

    async fn load(&self, user_id: &str) -> CourseResult<(ProfileInfo, TeacherOverview, Vec<TeacherApproval>)> {
        let profile = self.api.profile(user_id).await?;
        let overview = self.api.overview(&profile.teacher_id).await?;
        let approvals = match self.api.approvals(&profile.teacher_id).await {
            Ok(approvals) => approvals,
            Err(e) => {
                warn!("Approval history unavailable: {}", e);
                Vec::new()
            }
        };
        Ok((profile, overview, approvals))
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> CourseResult<()> {
        self.record(self.api.update_profile(update).await)?;
        self.refetch().await
    }

    pub async fn update_picture(&self, file: Upload) -> CourseResult<()> {
        self.record(self.api.update_picture(file).await)?;
        self.refetch().await
    }

    pub async fn update_teacher(&self, update: &TeacherUpdate) -> CourseResult<()> {
        self.record(self.api.update_teacher(update).await)?;
        self.refetch().await
    }

    pub async fn change_subbranches(&self, change: &SubbranchChange) -> CourseResult<()> {
        self.record(self.api.change_subbranches(change).await)?;
        self.refetch().await
    }

    pub async fn request_approval(&self, comment: &str) -> CourseResult<()> {
        self.record(self.api.request_approval(comment).await)?;
        self.refetch().await
    }

    async fn refetch(&self) -> CourseResult<()> {
        let user_id = self.state.read().user_id.clone();
        match user_id {
            Some(user_id) => self.refresh(&user_id).await,
            None => Err(CourseError::invalid("profile was never loaded")),
        }
    }

    fn record<T>(&self, result: CourseResult<T>) -> CourseResult<T> {
        if let Err(e) = &result {
            warn!("Profile request failed: {}", e);
            self.state.write().error = Some(e.message());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ProfileState {
        ProfileState {
            profile: Some(ProfileInfo {
                teacher_id: "t1".into(),
                name: Some("Ada".into()),
                surname: Some("Lovelace".into()),
                birth_date: Some("1990-01-01".into()),
                ..Default::default()
            }),
            overview: Some(TeacherOverview {
                primary_branch: Some("MATEMATIK".into()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_profile_needs_no_setup() {
        assert!(!complete().needs_profile_setup());
    }

    #[test]
    fn test_missing_fields_need_setup() {
        assert!(ProfileState::default().needs_profile_setup());

        let mut state = complete();
        state.overview = None;
        assert!(state.needs_profile_setup());

        let mut state = complete();
        if let Some(p) = state.profile.as_mut() {
            p.surname = Some("  ".into());
        }
        assert!(state.needs_profile_setup());
    }
}
