//! Logging, header-injecting, retrying transport.
//!
//! # Responsibilities
//! - Merge additional headers (and `Cache-Control: no-cache`) into requests
//! - Log requests and responses with credentials redacted
//! - Retry immediately when the underlying transport produces no response
//! - Re-attach drained bodies so callers see them unconsumed
//!
//! # Design Decisions
//! - All configuration lives in one immutable [`Settings`] snapshot behind
//!   an `ArcSwap`; a call loads it once and setters publish a new copy
//! - No backoff between attempts
//! - Retries rebuild the request from its head plus the buffered body

use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};

use arc_swap::ArcSwap;
use axum::body::{Body, Bytes, HttpBody};
use axum::http::header::{HeaderValue, CACHE_CONTROL};
use axum::http::{HeaderMap, Method, Request, Response, Uri, Version};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use crate::config::TransportConfig;
use crate::observability::{logging_enabled, DefaultLogger, Logger};
use crate::redaction::{FormatError, RedactionPolicy, SensitiveHeaders};
use crate::transport::error::{BoxError, TransportError, TransportResult};
use crate::transport::format::{format_headers, DEFAULT_SEPARATOR};
use crate::transport::replay::{buffer_body, content_type, replay_body};
use crate::transport::round_tripper::RoundTripper;

/// Replacement for the default JSON masking formatter.
pub type BodyFormatter = Arc<dyn Fn(&[u8]) -> Result<String, FormatError> + Send + Sync>;

/// One immutable view of the transport configuration.
#[derive(Clone, Default)]
pub struct Settings {
    pub inner: Option<Arc<dyn RoundTripper>>,
    pub headers: HeaderMap,
    pub redaction: RedactionPolicy,
    pub max_retries: u32,
    pub logger: Option<Arc<dyn Logger>>,
    pub body_formatter: Option<BodyFormatter>,
    pub no_cache_header: bool,
}

impl Settings {
    fn format_body(&self, raw: &[u8]) -> Result<String, FormatError> {
        match &self.body_formatter {
            Some(formatter) => formatter(raw),
            None => self.redaction.format_body(raw),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("inner", &self.inner.is_some())
            .field("headers", &self.headers.len())
            .field("sensitive_headers", &self.redaction.sensitive_headers().len())
            .field("max_retries", &self.max_retries)
            .field("logger", &self.logger.is_some())
            .field("body_formatter", &self.body_formatter.is_some())
            .field("no_cache_header", &self.no_cache_header)
            .finish()
    }
}

/// HTTP middleware wrapping an underlying [`RoundTripper`].
///
/// Clones share configuration: a setter called on one clone is seen by
/// every other clone on its next call.
#[derive(Clone, Default)]
pub struct Transport {
    settings: Arc<ArcSwap<Settings>>,
}

impl Transport {
    /// Create a transport delegating to `inner`.
    pub fn new<R>(inner: R) -> Self
    where
        R: RoundTripper + 'static,
    {
        let transport = Self::default();
        transport.set_inner(inner);
        transport
    }

    /// Create a transport from a loaded configuration.
    pub fn from_config<R>(inner: R, config: &TransportConfig) -> Self
    where
        R: RoundTripper + 'static,
    {
        let transport = Self::new(inner);
        transport.apply_config(config);
        transport
    }

    /// The configuration snapshot the next call will use.
    pub fn settings(&self) -> Arc<Settings> {
        self.settings.load_full()
    }

    fn update<F>(&self, f: F)
    where
        F: Fn(&mut Settings),
    {
        self.settings.rcu(|current| {
            let mut next = Settings::clone(current);
            f(&mut next);
            next
        });
    }

    pub fn set_inner<R>(&self, inner: R)
    where
        R: RoundTripper + 'static,
    {
        let inner: Arc<dyn RoundTripper> = Arc::new(inner);
        self.update(|s| s.inner = Some(inner.clone()));
    }

    /// Headers set (not appended) on every request.
    pub fn set_headers(&self, headers: HeaderMap) {
        self.update(|s| s.headers = headers.clone());
    }

    /// Replace the masked header set. An empty list disables masking.
    pub fn set_sensitive_headers<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let headers = SensitiveHeaders::new(names);
        self.update(|s| {
            s.redaction = RedactionPolicy::new(headers.clone()).with_fields(s.redaction.fields())
        });
    }

    /// Replace the JSON body paths masked by the default formatter.
    pub fn set_sensitive_fields(&self, fields: &'static [&'static [&'static str]]) {
        self.update(|s| s.redaction = s.redaction.clone().with_fields(fields));
    }

    pub fn set_max_retries(&self, max_retries: u32) {
        self.update(|s| s.max_retries = max_retries);
    }

    /// Enable logging through `logger`; `None` disables all logging.
    pub fn set_logger(&self, logger: Option<Arc<dyn Logger>>) {
        self.update(|s| s.logger = logger.clone());
    }

    pub fn set_body_formatter(&self, formatter: Option<BodyFormatter>) {
        self.update(|s| s.body_formatter = formatter.clone());
    }

    pub fn set_no_cache_header(&self, enabled: bool) {
        self.update(|s| s.no_cache_header = enabled);
    }

    /// Publish every config-driven field in a single swap.
    ///
    /// The underlying transport and formatter override are kept. A custom
    /// logger survives as long as logging stays enabled.
    pub fn apply_config(&self, config: &TransportConfig) {
        let headers = config.header_map();
        let sensitive = config.sensitive_header_set();
        let enable_logger = logging_enabled(config.enable_logger);

        self.update(|s| {
            s.headers = headers.clone();
            s.redaction = RedactionPolicy::new(sensitive.clone()).with_fields(s.redaction.fields());
            s.max_retries = config.max_retries;
            s.no_cache_header = config.no_cache_header;
            let logger = match (s.logger.take(), enable_logger) {
                (_, false) => None,
                (Some(existing), true) => Some(existing),
                (None, true) => Some(Arc::new(DefaultLogger) as Arc<dyn Logger>),
            };
            s.logger = logger;
        });
    }

    /// Perform one logged, retried round trip.
    pub async fn round_trip(&self, mut request: Request<Body>) -> TransportResult<Response<Body>> {
        let settings = self.settings.load_full();

        let Some(inner) = settings.inner.clone() else {
            return Err(TransportError::NilTransport);
        };

        for name in settings.headers.keys() {
            request.headers_mut().remove(name);
        }
        for (name, value) in settings.headers.iter() {
            request.headers_mut().append(name.clone(), value.clone());
        }
        if settings.no_cache_header {
            request
                .headers_mut()
                .insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        }

        let (parts, mut body) = request.into_parts();
        let mut buffered: Option<Bytes> = None;

        if let Some(logger) = settings.logger.as_deref() {
            logger.log(format_args!("OpenStack Request URL: {} {}", parts.method, parts.uri));
            logger.log(format_args!(
                "OpenStack Request Headers:\n{}",
                format_headers(&parts.headers, settings.redaction.sensitive_headers(), DEFAULT_SEPARATOR)
            ));

            if !body.is_end_stream() {
                let replay = replay_body(body, content_type(&parts.headers)).await?;
                match replay.bytes() {
                    Some(bytes) => {
                        log_body(logger, &settings, "Request", bytes, false);
                        buffered = Some(bytes.clone());
                    }
                    None => logger.log(format_args!(
                        "Not logging because OpenStack request body isn't JSON"
                    )),
                }
                body = replay.into_body();
            }
        }

        if settings.max_retries == 0 {
            let request = Request::from_parts(parts, body);
            return Self::send_with_retries(&settings, inner.as_ref(), request, None).await;
        }

        let bytes = match buffered {
            Some(bytes) => bytes,
            None => buffer_body(body).await?,
        };
        let head = RequestHead::capture(&parts);
        let first = Request::from_parts(parts, Body::from(bytes.clone()));
        Self::send_with_retries(&settings, inner.as_ref(), first, Some((head, bytes))).await
    }

    async fn send_with_retries(
        settings: &Settings,
        inner: &dyn RoundTripper,
        first: Request<Body>,
        replay: Option<(RequestHead, Bytes)>,
    ) -> TransportResult<Response<Body>> {
        let logger = settings.logger.as_deref();
        let mut outcome = inner.round_trip(first).await;

        let mut retry: u32 = 1;
        let response = loop {
            let err = match outcome {
                Ok(response) => break response,
                Err(err) => err,
            };

            let Some((head, bytes)) = replay.as_ref().filter(|_| retry <= settings.max_retries) else {
                if let Some(logger) = logger {
                    logger.log(format_args!(
                        "OpenStack connection error, retries exhausted. Aborting"
                    ));
                }
                return Err(TransportError::RetriesExhausted {
                    retries: settings.max_retries,
                    source: err,
                });
            };

            if let Some(logger) = logger {
                logger.log(format_args!(
                    "OpenStack connection error, retry number {}: {}",
                    retry, err
                ));
            }
            outcome = inner.round_trip(head.rebuild(bytes.clone())).await;
            retry += 1;
        };

        let Some(logger) = logger else {
            return Ok(response);
        };

        logger.log(format_args!("OpenStack Response Code: {}", response.status().as_u16()));
        logger.log(format_args!(
            "OpenStack Response Headers:\n{}",
            format_headers(response.headers(), settings.redaction.sensitive_headers(), DEFAULT_SEPARATOR)
        ));

        let (parts, body) = response.into_parts();
        let replay = replay_body(body, content_type(&parts.headers)).await?;
        match replay.bytes() {
            Some(bytes) => log_body(logger, settings, "Response", bytes, true),
            None => logger.log(format_args!(
                "Not logging because OpenStack response body isn't JSON"
            )),
        }

        Ok(Response::from_parts(parts, replay.into_body()))
    }
}

fn log_body(logger: &dyn Logger, settings: &Settings, kind: &str, bytes: &[u8], skip_empty: bool) {
    let formatted = match settings.format_body(bytes) {
        Ok(text) => text,
        Err(e) => {
            logger.log(format_args!("{}", e));
            e.raw
        }
    };
    if skip_empty && formatted.is_empty() {
        return;
    }
    logger.log(format_args!("OpenStack {} Body: {}", kind, formatted));
}

/// The parts of a request needed to send it again.
struct RequestHead {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
}

impl RequestHead {
    fn capture(parts: &axum::http::request::Parts) -> Self {
        Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            version: parts.version,
            headers: parts.headers.clone(),
        }
    }

    fn rebuild(&self, body: Bytes) -> Request<Body> {
        let mut request = Request::new(Body::from(body));
        *request.method_mut() = self.method.clone();
        *request.uri_mut() = self.uri.clone();
        *request.version_mut() = self.version;
        *request.headers_mut() = self.headers.clone();
        request
    }
}

impl RoundTripper for Transport {
    fn round_trip(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, BoxError>> {
        Transport::round_trip(self, request)
            .map(|result| result.map_err(BoxError::from))
            .boxed()
    }
}

impl tower::Service<Request<Body>> for Transport {
    type Response = Response<Body>;
    type Error = TransportError;
    type Future = BoxFuture<'static, TransportResult<Response<Body>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let transport = self.clone();
        async move { transport.round_trip(request).await }.boxed()
    }
}
