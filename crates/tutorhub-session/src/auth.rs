//! Calls under `/api/authenticate/`

use serde_json::json;
use tutorhub_http::{ApiClient, ApiRequest, Result};

use crate::models::{
    AuthTokens, ChangeResponse, CodeSentResponse, LookupResponse, RefreshResponse, UserInfo,
    UserType,
};

/// Identity this client reports when obtaining tokens
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub device_token: String,
    pub user_agent: String,
    pub ip_address: String,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            device_token: "web-client".to_string(),
            user_agent: format!("tutorhub/{}", env!("CARGO_PKG_VERSION")),
            ip_address: "127.0.0.1".to_string(),
        }
    }
}

/// Authentication endpoints
///
/// Everything except [`AuthApi::user_info`] is public, so the client given
/// here does not need a session.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
    device: DeviceInfo,
    user_type: UserType,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            device: DeviceInfo::default(),
            user_type: UserType::Teacher,
        }
    }

    pub fn with_device(mut self, device: DeviceInfo) -> Self {
        self.device = device;
        self
    }

    /// Same endpoints through another client, e.g. an authenticated one
    pub fn with_client(&self, client: ApiClient) -> Self {
        Self {
            client,
            device: self.device.clone(),
            user_type: self.user_type,
        }
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    /// Send a one-time code to a registered phone number
    pub async fn login(&self, phone_number: &str, password: &str) -> Result<CodeSentResponse> {
        let req = ApiRequest::post("/api/authenticate/login").json(&json!({
            "phone_number": phone_number,
            "user_type": self.user_type,
            "password": password,
        }))?;
        self.client.send(&req).await
    }

    pub async fn register(
        &self,
        phone_number: &str,
        email: &str,
        password: &str,
    ) -> Result<CodeSentResponse> {
        let req = ApiRequest::post("/api/authenticate/register").json(&json!({
            "phone_number": phone_number,
            "user_type": self.user_type,
            "email": email,
            "password": password,
        }))?;
        self.client.send(&req).await
    }

    /// Exchange the one-time code for a token triple
    pub async fn authenticate(&self, phone_number: &str, login_token: &str) -> Result<AuthTokens> {
        let req = ApiRequest::post("/api/authenticate/authenticate").json(&json!({
            "phone_number": phone_number,
            "user_type": self.user_type,
            "login_token": login_token,
            "device_token": self.device.device_token,
            "user_agent": self.device.user_agent,
            "IP_address": self.device.ip_address,
        }))?;
        self.client.send(&req).await
    }

    pub async fn refresh(
        &self,
        old_access_token: &str,
        refresh_token: &str,
    ) -> Result<RefreshResponse> {
        let req = ApiRequest::post("/api/authenticate/refresh").json(&json!({
            "old_access_token": old_access_token,
            "refresh_token": refresh_token,
            "device_token": self.device.device_token,
            "user_agent": self.device.user_agent,
            "IP_address": self.device.ip_address,
        }))?;
        self.client.send(&req).await
    }

    /// Start a password reset; a code is sent to the phone
    pub async fn request_password_change(&self, phone_number: &str) -> Result<ChangeResponse> {
        let req = ApiRequest::post("/api/authenticate/change/request").json(&json!({
            "phone_number": phone_number,
            "user_type": self.user_type,
            "purpose": "password",
        }))?;
        self.client.send(&req).await
    }

    pub async fn verify_password_change(
        &self,
        phone_number: &str,
        login_token: &str,
    ) -> Result<ChangeResponse> {
        let req = ApiRequest::post("/api/authenticate/change/verify").json(&json!({
            "phone_number": phone_number,
            "user_type": self.user_type,
            "login_token": login_token,
            "purpose": "password",
        }))?;
        self.client.send(&req).await
    }

    pub async fn change_password(
        &self,
        phone_number: &str,
        change_token: &str,
        new_password: &str,
    ) -> Result<ChangeResponse> {
        let req = ApiRequest::post("/api/authenticate/password/change").json(&json!({
            "phone_number": phone_number,
            "user_type": self.user_type,
            "change_token": change_token,
            "new_password": new_password,
        }))?;
        self.client.send(&req).await
    }

    pub async fn logout(&self, old_access_token: &str, refresh_token: &str) -> Result<()> {
        let req = ApiRequest::post("/api/authenticate/logout").json(&json!({
            "old_access_token": old_access_token,
            "refresh_token": refresh_token,
        }))?;
        self.client.send_empty(&req).await
    }

    /// Resolve a phone number or e-mail to a user id
    pub async fn lookup_user(&self, identifier: &str) -> Result<LookupResponse> {
        let req = ApiRequest::post("/api/authenticate/user/lookup").json(&json!({
            "identifier": identifier,
            "user_type": self.user_type,
        }))?;
        self.client.send(&req).await
    }

    /// Authenticated user record
    pub async fn user_info(&self, user_id: &str) -> Result<UserInfo> {
        let req = ApiRequest::get(format!("/api/authenticate/user/{user_id}")).auth();
        self.client.send(&req).await
    }
}
