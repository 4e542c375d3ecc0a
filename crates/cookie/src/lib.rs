//! A cookie jar middleware for the micro http client
//!
//! [`CookieJar`] remembers the cookies servers set and replays them on later
//! requests without caller intervention. It takes part in both pipeline
//! phases: it attaches a `cookie` header on the way out and stores every
//! `set-cookie` on the way back.
//!
//! Matching is deliberately simple: a cookie is sent when the request host
//! equals its domain or is a subdomain of it, the request path is at or below
//! its path, it is not expired, and, for `Secure` cookies, the scheme is https.
//!
//! # Example
//!
//! ```no_run
//! # use micro_client::connection::HttpConnection;
//! # use micro_client::transport::Transport;
//! # async fn run(transport: impl Transport + 'static) -> Result<(), Box<dyn std::error::Error>> {
//! use micro_cookie::CookieJar;
//!
//! let url = "http://127.0.0.1:8090/cookie_parrot";
//! let jar = CookieJar::new();
//!
//! let mut conn = HttpConnection::new(url, transport)?;
//! conn.use_instance(jar.clone())?;
//!
//! jar.set_cookie(url, "id=1")?;
//! let response = conn.get().send().await?;
//! assert!(response.status().is_success());
//!
//! for cookie in jar.get_cookies(url)? {
//!     println!("{cookie}");
//! }
//! # Ok(())
//! # }
//! ```

mod cookie;
mod error;
mod jar;
mod store;

pub use cookie::Cookie;
pub use error::CookieError;
pub use jar::CookieJar;
pub use store::CookieStore;
