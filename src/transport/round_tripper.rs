//! The single-request extension point.
//!
//! # Responsibilities
//! - Define how one outgoing request becomes one response
//! - Adapt the hyper client so it can sit underneath the middleware

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use hyper_util::client::legacy::{connect::Connect, Client};

use crate::transport::error::BoxError;

/// Turns one request into one response.
///
/// An `Err` means no response was produced at all (connection refused,
/// reset, DNS failure). HTTP error statuses are responses, not errors.
pub trait RoundTripper: Send + Sync {
    fn round_trip(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, BoxError>>;
}

impl<C> RoundTripper for Client<C, Body>
where
    C: Connect + Clone + Send + Sync + 'static,
{
    fn round_trip(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, BoxError>> {
        self.request(request)
            .map(|result| match result {
                Ok(response) => {
                    let (parts, body) = response.into_parts();
                    Ok(Response::from_parts(parts, Body::new(body)))
                }
                Err(e) => Err(Box::new(e) as BoxError),
            })
            .boxed()
    }
}

impl<T> RoundTripper for Arc<T>
where
    T: RoundTripper + ?Sized,
{
    fn round_trip(&self, request: Request<Body>) -> BoxFuture<'_, Result<Response<Body>, BoxError>> {
        (**self).round_trip(request)
    }
}
