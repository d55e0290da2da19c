//! Token-bearing REST client for the backend API.
//!
//! Every request goes through [`ApiClient::dispatch`], which reads the
//! session token at dispatch time and attaches it as a bearer header.
//!
//! ERROR HANDLING
//! ==============
//! Network failures, timeouts and non-2xx statuses are returned to the caller
//! as [`ApiError`]; nothing is retried unless the refresh policy is enabled,
//! in which case a 401 triggers one shared refresh and one re-send.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::{RwSignal, Update, WithUntracked};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::refresh::RefreshGate;
use super::transport::{HttpRequest, HttpResponse, Transport, authorize};
use super::types::{LoginRequest, LoginResponse, PasswordChange, RegisterRequest, TokenBody, UserProfile};
use crate::config::{ApiConfig, RefreshPolicy};
use crate::state::session::{Profile, Session};

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const PROFILE_PATH: &str = "/profile";
pub const CHANGE_PASSWORD_PATH: &str = "/change-password";
pub const REFRESH_PATH: &str = "/refresh-token";

/// Access to the session from the request path.
pub trait SessionHandle {
    /// Token to attach right now.
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: String);
    fn set_profile(&self, profile: Profile);
    fn clear(&self);
}

impl SessionHandle for RwSignal<Session> {
    fn token(&self) -> Option<String> {
        self.with_untracked(|s| s.token().map(str::to_owned))
    }

    fn set_token(&self, token: String) {
        self.update(|s| s.set_token(token));
    }

    fn set_profile(&self, profile: Profile) {
        self.update(|s| s.set_profile(profile));
    }

    fn clear(&self) {
        self.update(Session::clear_token);
    }
}

impl SessionHandle for Rc<RefCell<Session>> {
    fn token(&self) -> Option<String> {
        self.borrow().token().map(str::to_owned)
    }

    fn set_token(&self, token: String) {
        self.borrow_mut().set_token(token);
    }

    fn set_profile(&self, profile: Profile) {
        self.borrow_mut().set_profile(profile);
    }

    fn clear(&self) {
        self.borrow_mut().clear_token();
    }
}

/// Request façade configured once with a base endpoint and timeout.
///
/// Clones share the transport, session handle and refresh gate.
#[derive(Clone, Debug)]
pub struct ApiClient<T, S> {
    config: ApiConfig,
    transport: T,
    session: S,
    refresh: Rc<RefreshGate>,
}

impl<T, S> ApiClient<T, S>
where
    T: Transport + Clone + 'static,
    S: SessionHandle,
{
    pub fn new(config: ApiConfig, transport: T, session: S) -> Self {
        Self { config, transport, session, refresh: Rc::new(RefreshGate::default()) }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// `GET {base}{path}` decoded as JSON.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] for transport failures, timeouts, non-2xx
    /// statuses and undecodable bodies.
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let resp = self.dispatch(HttpRequest::get(self.config.url(path))).await?;
        decode_body(&resp)
    }

    /// `POST {base}{path}` with a JSON body, response decoded as JSON.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::get_json`], plus [`ApiError::Encode`] when `body`
    /// cannot be serialized.
    pub async fn post_json<B: Serialize, R: DeserializeOwned>(&self, path: &str, body: &B) -> Result<R, ApiError> {
        let resp = self.post(path, body).await?;
        decode_body(&resp)
    }

    /// `POST {base}{path}` with a JSON body, ignoring the response body.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::post_json`], without body decoding.
    pub async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ApiError> {
        self.post(path, body).await.map(|_| ())
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<HttpResponse, ApiError> {
        let raw = serde_json::to_string(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.dispatch(HttpRequest::post_json(self.config.url(path), raw)).await
    }

    /// Authorize, send, and apply the 401 policy.
    ///
    /// # Errors
    ///
    /// Returns the transport error, or [`ApiError::Status`] for non-2xx
    /// responses that survive the refresh policy.
    pub async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let sent_with = self.session.token();
        let resp = self.send_authorized(request.clone(), sent_with.as_deref()).await?;
        if resp.status == 401 && self.should_refresh(&request) {
            // A refresh that finished while this request was in flight has
            // already replaced the token it was rejected for.
            if self.session.token() == sent_with {
                self.refresh_session().await?;
            } else {
                log::debug!("session token changed while request was in flight");
            }
            log::debug!("retrying request after token refresh");
            let retried = self.send_authorized(request, self.session.token().as_deref()).await?;
            return ensure_success(retried);
        }
        ensure_success(resp)
    }

    async fn send_authorized(&self, mut request: HttpRequest, token: Option<&str>) -> Result<HttpResponse, ApiError> {
        authorize(&mut request, token);
        log::debug!("{:?} {}", request.method, request.url);
        self.transport.send(request, self.config.timeout).await
    }

    fn should_refresh(&self, request: &HttpRequest) -> bool {
        self.config.refresh == RefreshPolicy::RetryOnce
            && request.url != self.config.url(REFRESH_PATH)
            && self.session.token().is_some()
    }

    /// Exchange the current token for a new one and store it in the session.
    /// Concurrent callers share one refresh call; on failure the session is
    /// cleared.
    async fn refresh_session(&self) -> Result<String, ApiError> {
        let transport = self.transport.clone();
        let config = self.config.clone();
        let current = self.session.token();
        let result = self
            .refresh
            .run(move || async move { request_refresh(&transport, &config, current).await })
            .await;
        match &result {
            Ok(token) => self.session.set_token(token.clone()),
            Err(e) => {
                log::warn!("token refresh failed: {e}");
                self.session.clear();
            }
        }
        result
    }

    /// Sign in; on success the token and display profile are stored in the
    /// session.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or is rejected.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest { email: email.to_owned(), password: password.to_owned() };
        let resp: LoginResponse = self.post_json(LOGIN_PATH, &body).await?;
        self.session.set_token(resp.token.clone());
        self.session.set_profile(resp.profile(email));
        log::info!("signed in");
        Ok(resp)
    }

    /// Create an account; on success the issued token is stored in the
    /// session.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or is rejected.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<(), ApiError> {
        let body = RegisterRequest { username: username.to_owned(), email: email.to_owned(), password: password.to_owned() };
        let resp: TokenBody = self.post_json(REGISTER_PATH, &body).await?;
        self.session.set_token(resp.token);
        self.session
            .set_profile(Profile { username: Some(username.to_owned()), email: Some(email.to_owned()) });
        log::info!("registered");
        Ok(())
    }

    /// Fetch the signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or is rejected.
    pub async fn fetch_profile(&self) -> Result<UserProfile, ApiError> {
        self.get_json(PROFILE_PATH).await
    }

    /// Change the signed-in user's password.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or is rejected.
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<(), ApiError> {
        let body = PasswordChange { old_password: old_password.to_owned(), new_password: new_password.to_owned() };
        self.post_unit(CHANGE_PASSWORD_PATH, &body).await
    }

    /// Explicitly exchange the current token for a fresh one.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the refresh call fails; the session is
    /// cleared in that case.
    pub async fn refresh_token(&self) -> Result<String, ApiError> {
        self.refresh_session().await
    }
}

async fn request_refresh<T: Transport>(transport: &T, config: &ApiConfig, current: Option<String>) -> Result<String, ApiError> {
    log::debug!("refreshing session token");
    let raw = serde_json::to_string(&TokenBody { token: current.clone().unwrap_or_default() })
        .map_err(|e| ApiError::Encode(e.to_string()))?;
    let mut request = HttpRequest::post_json(config.url(REFRESH_PATH), raw);
    authorize(&mut request, current.as_deref());
    let resp = ensure_success(transport.send(request, config.timeout).await?)?;
    let body: TokenBody = decode_body(&resp)?;
    Ok(body.token)
}

fn ensure_success(resp: HttpResponse) -> Result<HttpResponse, ApiError> {
    if resp.is_success() {
        Ok(resp)
    } else {
        Err(ApiError::Status { status: resp.status, body: resp.body })
    }
}

fn decode_body<R: DeserializeOwned>(resp: &HttpResponse) -> Result<R, ApiError> {
    serde_json::from_str(&resp.body).map_err(|e| ApiError::Decode(e.to_string()))
}
