use async_trait::async_trait;
use bytes::Bytes;
use http::header::{COOKIE, SET_COOKIE};
use http::{Response, StatusCode};
use micro_client::connection::HttpConnection;
use micro_client::protocol::{PreparedRequest, TransportError, TransportResponse};
use micro_client::transport::Transport;
use micro_cookie::CookieJar;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Answers `/login` with a session cookie and `/me` with the cookie it received
struct SessionServer;

#[async_trait]
impl Transport for SessionServer {
    async fn send(&self, request: PreparedRequest) -> Result<TransportResponse, TransportError> {
        let builder = Response::builder().status(StatusCode::OK);
        let response = match request.uri().path() {
            "/login" => builder.header(SET_COOKIE, "session=42; Path=/; HttpOnly").body(Bytes::from_static(b"welcome")),
            _ => {
                let cookie = request.headers().get(COOKIE).map(|v| Bytes::copy_from_slice(v.as_bytes()));
                builder.body(cookie.unwrap_or_else(|| Bytes::from_static(b"anonymous")))
            }
        };
        response.map_err(TransportError::other)
    }
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let jar = CookieJar::new();

    let mut login = HttpConnection::new("http://127.0.0.1:8090/login", SessionServer).expect("valid uri");
    login.use_instance(jar.clone()).expect("fresh connection");
    let mut me = HttpConnection::new("http://127.0.0.1:8090/me", SessionServer).expect("valid uri");
    me.use_instance(jar.clone()).expect("fresh connection");

    for conn in [&login, &me] {
        match conn.get().send().await {
            Ok(response) => info!(uri = %conn.uri(), body = ?response.response().as_str(), "received response"),
            Err(e) => error!(cause = %e, "request failed"),
        }
    }

    for cookie in jar.get_cookies("http://127.0.0.1:8090/me").unwrap_or_default() {
        info!(%cookie, "cookie in jar");
    }
}
