//! The reverse-proxy transport: "given a configured upstream, forward this request and produce
//! an HTTP response." Bound to [`reqwest`] as the HTTP client.

use axum::body::Body;
use axum::extract::Request;
use axum::response::Response;
use bytes::Bytes;
use http::header::HOST;
use http::StatusCode;
use url::Url;

/// A thin reverse-proxy transport bound to one upstream origin.
#[derive(Clone)]
pub struct Upstream {
    client: reqwest::Client,
    base_url: Url,
}

impl Upstream {
    pub fn new(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Forward `req` to the upstream origin verbatim (method, path+query, headers, body) and
    /// return whatever the upstream produced as an `axum` [`Response`].
    ///
    /// Connection-level failures (DNS, connect, timeout) are not propagated as an `Err` — the
    /// transport itself writes the client-visible 502, so a caller never needs to distinguish
    /// "upstream said 502" from "couldn't reach upstream".
    pub async fn forward(&self, req: Request) -> Response {
        let (parts, body) = req.into_parts();

        let mut target = self.base_url.clone();
        target.set_path(parts.uri.path());
        target.set_query(parts.uri.query());

        let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => bytes,
            Err(_) => return bad_gateway("failed to read request body"),
        };

        let method = parts.method.clone();
        let mut builder = self.client.request(method, target.as_str());
        for (name, value) in parts.headers.iter() {
            if name == HOST {
                continue;
            }
            builder = builder.header(name, value);
        }
        builder = builder.body(body_bytes);

        let upstream_response = match builder.send().await {
            Ok(response) => response,
            Err(_) => return bad_gateway("upstream request failed"),
        };

        let status = upstream_response.status();
        let mut response_builder = Response::builder().status(status);
        for (name, value) in upstream_response.headers().iter() {
            response_builder = response_builder.header(name, value);
        }

        let stream = upstream_response.bytes_stream();
        let body = Body::from_stream(stream);
        response_builder.body(body).unwrap_or_else(|_| bad_gateway("malformed upstream response"))
    }
}

fn bad_gateway(message: &'static str) -> Response {
    Response::builder()
        .status(StatusCode::BAD_GATEWAY)
        .body(Body::from(Bytes::from_static(message.as_bytes())))
        .expect("building a bad gateway response cannot fail")
}
