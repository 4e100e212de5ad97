//! Browser launch plus a localhost listener that captures the redirect.
//!
//! The implicit grant puts the token in the URL fragment, which browsers do
//! not send to servers. A bare hit on the callback path is answered with a
//! relay page that re-requests `<callback>/fragment?<fragment>`, turning the
//! fragment into a query this listener can read.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::browser::{InteractiveSession, SessionResult};
use super::error::AuthError;
use super::request::RedirectParams;
use crate::config::AuthConfig;

const FRAGMENT_SUFFIX: &str = "/fragment";
const MAX_HEADER_LINES: usize = 100;
/// Longest request or header line read from a connection.
const MAX_LINE_BYTES: u64 = 8 * 1024;
/// How long one connection may take to send its request.
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

type UrlHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Captures the redirect on `127.0.0.1:<port>`.
#[derive(Clone)]
pub struct LoopbackSession {
    port: u16,
    callback_path: String,
    timeout: Duration,
    open_browser: bool,
    on_url: Option<UrlHook>,
}

impl std::fmt::Debug for LoopbackSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackSession")
            .field("port", &self.port)
            .field("callback_path", &self.callback_path)
            .field("timeout", &self.timeout)
            .field("open_browser", &self.open_browser)
            .finish_non_exhaustive()
    }
}

impl LoopbackSession {
    pub fn new(port: u16, callback_path: &str, timeout: Duration) -> Self {
        Self {
            port,
            callback_path: normalize_path(callback_path),
            timeout,
            open_browser: true,
            on_url: None,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.redirect_port,
            &config.callback_path,
            config.callback_timeout(),
        )
        .with_open_browser(config.open_browser)
    }

    #[must_use]
    pub fn with_open_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    /// Called with the authorization URL once the listener is ready.
    #[must_use]
    pub fn with_url_hook(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_url = Some(Arc::new(hook));
        self
    }

    /// Serves each connection on its own task, so an idle socket cannot hold
    /// up the redirect. Pending connections are aborted when this returns.
    async fn accept_loop(&self, listener: &TcpListener) -> Result<SessionResult, AuthError> {
        let (tx, mut rx) = mpsc::channel::<RedirectParams>(1);
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (mut socket, _) =
                        accepted.map_err(|e| AuthError::Session(format!("accept failed: {e}")))?;
                    let tx = tx.clone();
                    let callback_path = self.callback_path.clone();
                    connections.spawn(async move {
                        let handled = tokio::time::timeout(
                            CONNECTION_TIMEOUT,
                            handle_connection(&mut socket, &callback_path),
                        )
                        .await;
                        match handled {
                            Ok(Ok(Some(params))) => {
                                let _ = tx.send(params).await;
                            }
                            Ok(Ok(None)) => {}
                            Ok(Err(e)) => tracing::debug!(error = %e, "Callback connection failed"),
                            Err(_) => tracing::debug!("Callback connection timed out"),
                        }
                    });
                }
                Some(params) = rx.recv() => return Ok(SessionResult::Success { params }),
                Some(_) = connections.join_next() => {}
            }
        }
    }
}

impl InteractiveSession for LoopbackSession {
    async fn start(&self, auth_url: &str) -> Result<SessionResult, AuthError> {
        let addr = format!("127.0.0.1:{}", self.port);
        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::warn!(%addr, "Callback port already in use");
                return Ok(SessionResult::Locked);
            }
            Err(e) => return Err(AuthError::Session(format!("failed to bind {addr}: {e}"))),
        };
        tracing::info!(port = self.port, path = %self.callback_path, "Waiting for sign-in redirect");

        if let Some(hook) = &self.on_url {
            hook(auth_url);
        }
        if self.open_browser
            && let Err(e) = open::that(auth_url)
        {
            tracing::warn!(error = %e, "Failed to open browser");
        }

        if let Ok(result) = tokio::time::timeout(self.timeout, self.accept_loop(&listener)).await {
            result
        } else {
            tracing::info!("Sign-in redirect timed out");
            Ok(SessionResult::Dismiss)
        }
    }
}

/// What the listener does with one request.
#[derive(Debug, PartialEq, Eq)]
enum Route {
    /// Serve the page that forwards the fragment.
    Relay,
    /// Redirect captured.
    Complete(RedirectParams),
    NotFound,
    BadMethod,
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Routes a request line like `GET /callback?x=1 HTTP/1.1`.
fn route_request(request_line: &str, callback_path: &str) -> Route {
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target)) = (parts.next(), parts.next()) else {
        return Route::NotFound;
    };
    if method != "GET" {
        return Route::BadMethod;
    }

    let Ok(url) = url::Url::parse(&format!("http://localhost{target}")) else {
        return Route::NotFound;
    };
    let params = || -> RedirectParams { url.query_pairs().into_owned().collect() };

    let path = url.path().trim_end_matches('/');
    if path == callback_path {
        match url.query() {
            Some(query) if !query.is_empty() => Route::Complete(params()),
            _ => Route::Relay,
        }
    } else if path.strip_prefix(callback_path) == Some(FRAGMENT_SUFFIX) {
        Route::Complete(params())
    } else {
        Route::NotFound
    }
}

async fn handle_connection(
    socket: &mut TcpStream,
    callback_path: &str,
) -> std::io::Result<Option<RedirectParams>> {
    let (reader, writer) = socket.split();
    serve_request(reader, writer, callback_path).await
}

async fn serve_request<R, W>(
    reader: R,
    mut writer: W,
    callback_path: &str,
) -> std::io::Result<Option<RedirectParams>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut request_line = String::new();
    (&mut reader)
        .take(MAX_LINE_BYTES)
        .read_line(&mut request_line)
        .await?;
    if !request_line.ends_with('\n') && request_line.len() as u64 >= MAX_LINE_BYTES {
        send_response(&mut writer, "414 URI Too Long", "text/plain", "URI Too Long").await?;
        return Ok(None);
    }

    // Drain headers so the browser sees a clean close.
    for _ in 0..MAX_HEADER_LINES {
        let mut line = String::new();
        let read = (&mut reader).take(MAX_LINE_BYTES).read_line(&mut line).await?;
        if read == 0 || line.trim().is_empty() {
            break;
        }
    }

    tracing::debug!(request = %request_line.trim(), "Callback request");

    match route_request(&request_line, callback_path) {
        Route::Relay => {
            send_response(&mut writer, "200 OK", "text/html", &relay_page(callback_path)).await?;
            Ok(None)
        }
        Route::Complete(params) => {
            let body = if params.contains_key("error") {
                FAILURE_PAGE
            } else {
                SUCCESS_PAGE
            };
            send_response(&mut writer, "200 OK", "text/html", body).await?;
            Ok(Some(params))
        }
        Route::NotFound => {
            send_response(&mut writer, "404 Not Found", "text/plain", "Not Found").await?;
            Ok(None)
        }
        Route::BadMethod => {
            send_response(
                &mut writer,
                "405 Method Not Allowed",
                "text/plain",
                "Method Not Allowed",
            )
            .await?;
            Ok(None)
        }
    }
}

async fn send_response<W: AsyncWriteExt + Unpin>(
    writer: &mut W,
    status: &str,
    content_type: &str,
    body: &str,
) -> std::io::Result<()> {
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    writer.write_all(response.as_bytes()).await?;
    writer.flush().await
}

fn relay_page(callback_path: &str) -> String {
    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\" /><title>twd</title></head>\
         <body><p>Completing sign-in...</p><script>\
         window.location.replace(\"{callback_path}{FRAGMENT_SUFFIX}?\" + window.location.hash.substring(1));\
         </script></body></html>"
    )
}

const SUCCESS_PAGE: &str = "<!doctype html><html><head><meta charset=\"utf-8\" /><title>Signed in</title></head><body><p>Sign-in complete. Return to your terminal to continue.</p></body></html>";

const FAILURE_PAGE: &str = "<!doctype html><html><head><meta charset=\"utf-8\" /><title>Sign-in failed</title></head><body><p>Sign-in was not completed. Return to your terminal.</p></body></html>";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("callback"), "/callback");
        assert_eq!(normalize_path("/callback/"), "/callback");
        assert_eq!(normalize_path("/auth/cb"), "/auth/cb");
    }

    #[test]
    fn test_bare_callback_serves_relay() {
        assert_eq!(
            route_request("GET /callback HTTP/1.1", "/callback"),
            Route::Relay
        );
        assert_eq!(
            route_request("GET /callback? HTTP/1.1", "/callback"),
            Route::Relay
        );
    }

    #[test]
    fn test_fragment_forward_completes() {
        let route = route_request(
            "GET /callback/fragment?access_token=abc&state=xyz&token_type=bearer HTTP/1.1",
            "/callback",
        );
        let Route::Complete(params) = route else {
            panic!("expected completion, got {route:?}");
        };
        assert_eq!(params["access_token"], "abc");
        assert_eq!(params["state"], "xyz");
    }

    #[test]
    fn test_query_error_completes() {
        let route = route_request(
            "GET /callback?error=access_denied&error_description=The+user+denied+you+access&state=S HTTP/1.1",
            "/callback",
        );
        let Route::Complete(params) = route else {
            panic!("expected completion, got {route:?}");
        };
        assert_eq!(params["error"], "access_denied");
        assert_eq!(params["error_description"], "The user denied you access");
    }

    #[test]
    fn test_other_paths_and_methods() {
        assert_eq!(
            route_request("GET /favicon.ico HTTP/1.1", "/callback"),
            Route::NotFound
        );
        assert_eq!(
            route_request("GET /callbackx HTTP/1.1", "/callback"),
            Route::NotFound
        );
        assert_eq!(
            route_request("POST /callback HTTP/1.1", "/callback"),
            Route::BadMethod
        );
        assert_eq!(route_request("", "/callback"), Route::NotFound);
    }

    #[test]
    fn test_relay_page_targets_fragment_path() {
        let page = relay_page("/cb");
        assert!(page.contains("\"/cb/fragment?\""));
        assert!(page.contains("window.location.hash"));
    }

    async fn get(port: u16, target: &str) -> String {
        let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
        let request = format!("GET {target} HTTP/1.1\r\nHost: localhost\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    fn free_port() -> u16 {
        std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port()
    }

    #[tokio::test]
    async fn test_loopback_captures_forwarded_fragment() {
        let port = free_port();
        let session = LoopbackSession::new(port, "/callback", Duration::from_secs(10))
            .with_open_browser(false);

        let handle = tokio::spawn(async move { session.start("https://example.com/auth").await });
        // Retry until the listener is bound.
        let relay = loop {
            if let Ok(mut stream) = TcpStream::connect(("127.0.0.1", port)).await {
                stream
                    .write_all(b"GET /callback HTTP/1.1\r\nHost: localhost\r\n\r\n")
                    .await
                    .unwrap();
                let mut response = String::new();
                stream.read_to_string(&mut response).await.unwrap();
                break response;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        };
        assert!(relay.starts_with("HTTP/1.1 200 OK"));
        assert!(relay.contains("/callback/fragment?"));

        let done = get(port, "/callback/fragment?access_token=tok&state=s1").await;
        assert!(done.contains("Sign-in complete"));

        let result = handle.await.unwrap().unwrap();
        let SessionResult::Success { params } = result else {
            panic!("expected success, got {result:?}");
        };
        assert_eq!(params["access_token"], "tok");
        assert_eq!(params["state"], "s1");
    }

    #[tokio::test]
    async fn test_idle_connection_does_not_block_redirect() {
        let port = free_port();
        let session = LoopbackSession::new(port, "/callback", Duration::from_secs(2))
            .with_open_browser(false);
        let handle = tokio::spawn(async move { session.start("https://example.com/auth").await });

        // A speculative connection that never sends a request.
        let _idle = loop {
            if let Ok(stream) = TcpStream::connect(("127.0.0.1", port)).await {
                break stream;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        };

        let done = get(port, "/callback/fragment?access_token=tok&state=s1").await;
        assert!(done.contains("Sign-in complete"));

        let result = handle.await.unwrap().unwrap();
        let SessionResult::Success { params } = result else {
            panic!("expected success, got {result:?}");
        };
        assert_eq!(params["access_token"], "tok");
    }

    #[tokio::test]
    async fn test_overlong_request_line_is_rejected() {
        let (mut client, server) = tokio::io::duplex(64 * 1024);
        let target = format!("/callback/fragment?pad={}", "a".repeat(10_000));
        client
            .write_all(format!("GET {target} HTTP/1.1\r\n\r\n").as_bytes())
            .await
            .unwrap();

        let (reader, writer) = tokio::io::split(server);
        let captured = serve_request(reader, writer, "/callback").await.unwrap();
        assert_eq!(captured, None);

        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 414"));
    }

    #[tokio::test]
    async fn test_loopback_times_out_as_dismiss() {
        let session = LoopbackSession::new(free_port(), "/callback", Duration::from_millis(50))
            .with_open_browser(false);
        let result = session.start("https://example.com/auth").await.unwrap();
        assert_eq!(result, SessionResult::Dismiss);
    }

    #[tokio::test]
    async fn test_loopback_port_in_use_is_locked() {
        let held = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = held.local_addr().unwrap().port();
        let session =
            LoopbackSession::new(port, "/callback", Duration::from_secs(1)).with_open_browser(false);
        let result = session.start("https://example.com/auth").await.unwrap();
        assert_eq!(result, SessionResult::Locked);
    }

    #[tokio::test]
    async fn test_url_hook_receives_auth_url() {
        let seen = Arc::new(std::sync::Mutex::new(None::<String>));
        let sink = Arc::clone(&seen);
        let session = LoopbackSession::new(free_port(), "/callback", Duration::from_millis(20))
            .with_open_browser(false)
            .with_url_hook(move |url| *sink.lock().unwrap() = Some(url.to_string()));
        let _ = session.start("https://example.com/auth?x=1").await.unwrap();
        assert_eq!(
            seen.lock().unwrap().as_deref(),
            Some("https://example.com/auth?x=1")
        );
    }
}
