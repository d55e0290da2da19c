use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::executor::block_on;

use super::*;
use crate::net::transport::{AUTHORIZATION, Method};
use crate::router::Destination;
use crate::router::guard::{Navigation, before_each};
use crate::test_support::live_token_expiring_in;
use crate::util::token_storage::{MemoryStorage, TokenStorage};

// =============================================================
// Helpers
// =============================================================

type Responder = Rc<dyn Fn(&HttpRequest) -> Result<HttpResponse, ApiError>>;

fn responder(f: impl Fn(&HttpRequest) -> Result<HttpResponse, ApiError> + 'static) -> Responder {
    Rc::new(f)
}

/// Resolves on its second poll so concurrent requests interleave.
#[derive(Default)]
struct YieldOnce(bool);

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 {
            Poll::Ready(())
        } else {
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

#[derive(Clone)]
struct MockTransport {
    sent: Rc<RefCell<Vec<(HttpRequest, Duration)>>>,
    respond: Responder,
}

impl MockTransport {
    fn new(respond: Responder) -> Self {
        Self { sent: Rc::default(), respond }
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.sent.borrow().iter().map(|(r, _)| r.clone()).collect()
    }

    fn count_to(&self, path: &str) -> usize {
        self.sent.borrow().iter().filter(|(r, _)| r.url.ends_with(path)).count()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest, timeout: Duration) -> Result<HttpResponse, ApiError> {
        YieldOnce::default().await;
        let result = (self.respond)(&request);
        self.sent.borrow_mut().push((request, timeout));
        result
    }
}

fn ok(body: &str) -> HttpResponse {
    HttpResponse { status: 200, body: body.to_owned() }
}

fn status(code: u16) -> HttpResponse {
    HttpResponse { status: code, body: String::new() }
}

fn config(refresh: RefreshPolicy) -> ApiConfig {
    ApiConfig { refresh, ..ApiConfig::from_overrides(Some("http://api.test/api"), Some("2500"), None) }
}

fn session_with(token: Option<&str>) -> (Rc<RefCell<Session>>, MemoryStorage) {
    let storage = MemoryStorage::default();
    let mut session = Session::new(Arc::new(storage.clone()));
    if let Some(token) = token {
        session.set_token(token);
    }
    (Rc::new(RefCell::new(session)), storage)
}

fn client(
    refresh: RefreshPolicy,
    token: Option<&str>,
    respond: Responder,
) -> (ApiClient<MockTransport, Rc<RefCell<Session>>>, MockTransport, MemoryStorage) {
    let transport = MockTransport::new(respond);
    let (session, storage) = session_with(token);
    (ApiClient::new(config(refresh), transport.clone(), session), transport, storage)
}

const PROFILE_BODY: &str = r#"{"id":1,"username":"alice"}"#;

/// Accepts only the token `fresh`; the refresh endpoint issues it.
fn refreshing_backend() -> Responder {
    responder(|req: &HttpRequest| {
        if req.url.ends_with(REFRESH_PATH) {
            return Ok(ok(r#"{"token":"fresh"}"#));
        }
        if req.header(AUTHORIZATION) == Some("Bearer fresh") { Ok(ok(PROFILE_BODY)) } else { Ok(status(401)) }
    })
}

// =============================================================
// Authorization header
// =============================================================

#[test]
fn request_carries_bearer_token() {
    let (client, transport, _) = client(RefreshPolicy::Disabled, Some("abc"), responder(|_| Ok(ok(PROFILE_BODY))));
    let profile = block_on(client.fetch_profile()).unwrap();

    assert_eq!(profile.username, "alice");
    let sent = transport.requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, Method::Get);
    assert_eq!(sent[0].url, "http://api.test/api/profile");
    assert_eq!(sent[0].header(AUTHORIZATION), Some("Bearer abc"));
}

#[test]
fn request_without_token_has_no_authorization_header() {
    let (client, transport, _) = client(RefreshPolicy::Disabled, None, responder(|_| Ok(ok(PROFILE_BODY))));
    block_on(client.fetch_profile()).unwrap();
    assert_eq!(transport.requests()[0].header(AUTHORIZATION), None);
}

#[test]
fn token_is_read_at_dispatch_time() {
    let (client, transport, _) = client(RefreshPolicy::Disabled, None, responder(|_| Ok(ok(PROFILE_BODY))));
    client.session().set_token("later".to_owned());
    block_on(client.fetch_profile()).unwrap();
    assert_eq!(transport.requests()[0].header(AUTHORIZATION), Some("Bearer later"));
}

#[test]
fn configured_timeout_is_passed_to_transport() {
    let (client, transport, _) = client(RefreshPolicy::Disabled, None, responder(|_| Ok(ok(PROFILE_BODY))));
    block_on(client.fetch_profile()).unwrap();
    assert_eq!(transport.sent.borrow()[0].1, Duration::from_millis(2500));
}

#[test]
fn valid_session_passes_guard_and_authorizes_requests() {
    let token = live_token_expiring_in(3600);
    let (client, transport, _) = client(RefreshPolicy::Disabled, Some(&token), responder(|_| Ok(ok(PROFILE_BODY))));

    let verdict = before_each(&mut client.session().borrow_mut(), Destination::Profile);
    assert_eq!(verdict, Navigation::Proceed);

    block_on(client.fetch_profile()).unwrap();
    assert_eq!(transport.requests()[0].header(AUTHORIZATION), Some(format!("Bearer {token}").as_str()));
}

// =============================================================
// Failures
// =============================================================

#[test]
fn non_success_status_is_surfaced() {
    let (client, _, _) = client(RefreshPolicy::Disabled, Some("abc"), responder(|_| Ok(HttpResponse { status: 404, body: "missing".to_owned() })));
    let err = block_on(client.fetch_profile()).unwrap_err();
    assert_eq!(err, ApiError::Status { status: 404, body: "missing".to_owned() });
}

#[test]
fn timeout_is_surfaced_without_retry() {
    let (client, transport, _) = client(RefreshPolicy::RetryOnce, Some("abc"), responder(|_| Err(ApiError::Timeout { ms: 2500 })));
    let err = block_on(client.fetch_profile()).unwrap_err();
    assert_eq!(err, ApiError::Timeout { ms: 2500 });
    assert_eq!(transport.requests().len(), 1);
}

#[test]
fn undecodable_body_is_decode_error() {
    let (client, _, _) = client(RefreshPolicy::Disabled, None, responder(|_| Ok(ok("<html>"))));
    assert!(matches!(block_on(client.fetch_profile()), Err(ApiError::Decode(_))));
}

// =============================================================
// 401 handling
// =============================================================

#[test]
fn unauthorized_is_returned_when_refresh_disabled() {
    let (client, transport, storage) = client(RefreshPolicy::Disabled, Some("stale"), refreshing_backend());
    let err = block_on(client.fetch_profile()).unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(transport.count_to(REFRESH_PATH), 0);
    assert_eq!(transport.requests().len(), 1);
    assert_eq!(client.session().token().as_deref(), Some("stale"));
    assert_eq!(storage.load().as_deref(), Some("stale"));
}

#[test]
fn unauthorized_triggers_one_refresh_and_retry() {
    let (client, transport, storage) = client(RefreshPolicy::RetryOnce, Some("stale"), refreshing_backend());
    let profile = block_on(client.fetch_profile()).unwrap();

    assert_eq!(profile.id, 1);
    let sent = transport.requests();
    assert_eq!(sent.len(), 3);
    assert!(sent[1].url.ends_with(REFRESH_PATH));
    assert_eq!(sent[1].body.as_deref(), Some(r#"{"token":"stale"}"#));
    assert_eq!(sent[2].header(AUTHORIZATION), Some("Bearer fresh"));
    assert_eq!(client.session().token().as_deref(), Some("fresh"));
    assert_eq!(storage.load().as_deref(), Some("fresh"));
}

#[test]
fn retry_happens_at_most_once() {
    let respond = responder(|req: &HttpRequest| {
        if req.url.ends_with(REFRESH_PATH) { Ok(ok(r#"{"token":"fresh"}"#)) } else { Ok(status(401)) }
    });
    let (client, transport, _) = client(RefreshPolicy::RetryOnce, Some("stale"), respond);
    let err = block_on(client.fetch_profile()).unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(transport.count_to(REFRESH_PATH), 1);
    assert_eq!(transport.requests().len(), 3);
}

#[test]
fn failed_refresh_clears_session() {
    let respond = responder(|req: &HttpRequest| {
        if req.url.ends_with(REFRESH_PATH) { Ok(status(500)) } else { Ok(status(401)) }
    });
    let (client, transport, storage) = client(RefreshPolicy::RetryOnce, Some("stale"), respond);
    client.session().set_profile(Profile { username: Some("alice".to_owned()), email: None });

    let err = block_on(client.fetch_profile()).unwrap_err();

    assert_eq!(err, ApiError::Status { status: 500, body: String::new() });
    assert_eq!(transport.requests().len(), 2);
    assert!(client.session().token().is_none());
    assert!(client.session().borrow().profile().is_none());
    assert_eq!(storage.load(), None);
}

#[test]
fn no_refresh_without_a_token() {
    let (client, transport, _) = client(RefreshPolicy::RetryOnce, None, refreshing_backend());
    let err = block_on(client.fetch_profile()).unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(transport.count_to(REFRESH_PATH), 0);
}

#[test]
fn concurrent_unauthorized_requests_share_one_refresh() {
    let (client, transport, _) = client(RefreshPolicy::RetryOnce, Some("stale"), refreshing_backend());

    let (a, b) = block_on(async { futures::join!(client.fetch_profile(), client.fetch_profile()) });

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(transport.count_to(REFRESH_PATH), 1);
    assert_eq!(transport.count_to(PROFILE_PATH), 4);
    assert_eq!(client.session().token().as_deref(), Some("fresh"));
}

/// Holds back one request by index for extra polls so its response lands
/// after the others have finished.
#[derive(Clone)]
struct Staggered {
    inner: MockTransport,
    seen: Rc<Cell<usize>>,
    slow_index: usize,
    extra_polls: usize,
}

impl Transport for Staggered {
    async fn send(&self, request: HttpRequest, timeout: Duration) -> Result<HttpResponse, ApiError> {
        let index = self.seen.get();
        self.seen.set(index + 1);
        if index == self.slow_index {
            for _ in 0..self.extra_polls {
                YieldOnce::default().await;
            }
        }
        self.inner.send(request, timeout).await
    }
}

#[test]
fn late_unauthorized_after_refresh_retries_without_refreshing_again() {
    let inner = MockTransport::new(refreshing_backend());
    let transport = Staggered { inner: inner.clone(), seen: Rc::default(), slow_index: 1, extra_polls: 50 };
    let (session, _) = session_with(Some("stale"));
    let client = ApiClient::new(config(RefreshPolicy::RetryOnce), transport, session);

    let (a, b) = block_on(async { futures::join!(client.fetch_profile(), client.fetch_profile()) });

    assert!(a.is_ok());
    assert!(b.is_ok());
    assert_eq!(inner.count_to(REFRESH_PATH), 1);
    assert_eq!(inner.count_to(PROFILE_PATH), 4);
    let last = inner.requests().pop().unwrap();
    assert!(last.url.ends_with(PROFILE_PATH));
    assert_eq!(last.header(AUTHORIZATION), Some("Bearer fresh"));
}

#[test]
fn explicit_refresh_rejected_clears_session() {
    let (client, _, storage) = client(RefreshPolicy::Disabled, Some("stale"), responder(|_| Ok(status(401))));
    let err = block_on(client.refresh_token()).unwrap_err();
    assert!(err.is_unauthorized());
    assert!(client.session().token().is_none());
    assert_eq!(storage.load(), None);
}

// =============================================================
// Endpoints
// =============================================================

#[test]
fn login_stores_token_and_profile() {
    let (client, transport, storage) =
        client(RefreshPolicy::Disabled, None, responder(|_| Ok(ok(r#"{"token":"issued","username":"alice"}"#))));

    let resp = block_on(client.login("alice@example.com", "hunter22")).unwrap();

    assert_eq!(resp.token, "issued");
    let sent = transport.requests();
    assert_eq!(sent[0].method, Method::Post);
    assert_eq!(sent[0].url, "http://api.test/api/login");
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(sent[0].body.as_deref().unwrap()).unwrap(),
        serde_json::json!({"email": "alice@example.com", "password": "hunter22"})
    );
    let session = client.session().borrow();
    assert_eq!(session.token(), Some("issued"));
    assert_eq!(session.profile().and_then(|p| p.username.as_deref()), Some("alice"));
    assert_eq!(session.profile().and_then(|p| p.email.as_deref()), Some("alice@example.com"));
    assert_eq!(storage.load().as_deref(), Some("issued"));
}

#[test]
fn failed_login_leaves_session_empty() {
    let (client, _, storage) = client(RefreshPolicy::RetryOnce, None, responder(|_| Ok(status(401))));
    assert!(block_on(client.login("a@b.c", "wrong")).is_err());
    assert!(client.session().token().is_none());
    assert_eq!(storage.load(), None);
}

#[test]
fn register_stores_issued_token() {
    let (client, transport, _) = client(RefreshPolicy::Disabled, None, responder(|_| Ok(ok(r#"{"token":"new-user"}"#))));
    block_on(client.register("bob", "bob@example.com", "password1")).unwrap();

    assert_eq!(transport.requests()[0].url, "http://api.test/api/register");
    assert_eq!(client.session().token().as_deref(), Some("new-user"));
    assert_eq!(client.session().borrow().profile().and_then(|p| p.username.as_deref()), Some("bob"));
}

#[test]
fn change_password_posts_both_passwords() {
    let (client, transport, _) = client(RefreshPolicy::Disabled, Some("abc"), responder(|_| Ok(ok("Password changed"))));
    block_on(client.change_password("old-pass", "new-pass-123")).unwrap();

    let sent = transport.requests();
    assert_eq!(sent[0].url, "http://api.test/api/change-password");
    assert_eq!(sent[0].header(AUTHORIZATION), Some("Bearer abc"));
    assert_eq!(
        serde_json::from_str::<serde_json::Value>(sent[0].body.as_deref().unwrap()).unwrap(),
        serde_json::json!({"old_password": "old-pass", "new_password": "new-pass-123"})
    );
}

// =============================================================
// Reactive session handle
// =============================================================

#[test]
fn signal_session_handle_reads_and_writes() {
    let storage = MemoryStorage::default();
    let session = RwSignal::new(Session::new(Arc::new(storage.clone())));
    let transport = MockTransport::new(refreshing_backend());
    let client = ApiClient::new(config(RefreshPolicy::RetryOnce), transport, session);

    session.update(|s| s.set_token("stale"));
    block_on(client.fetch_profile()).unwrap();

    assert_eq!(session.with_untracked(|s| s.token().map(str::to_owned)).as_deref(), Some("fresh"));
    assert_eq!(storage.load().as_deref(), Some("fresh"));
}
