// crates/adapt/src/http/middleware.rs

//! Tower middleware that clears the shared content response cache whenever
//! a top-level request starts.

use axum::{body::Body, http::Request, response::Response};
use futures::future::BoxFuture;
use serve::content::ResponseCache;
use std::task::{Context, Poll};
use tower::{Layer, Service};

#[derive(Clone)]
pub struct CacheScopeLayer {
    cache: ResponseCache,
}

impl CacheScopeLayer {
    #[tracing::instrument(skip_all)]
    pub fn new(cache: ResponseCache) -> Self {
        Self { cache }
    }
}

impl<S> Layer<S> for CacheScopeLayer {
    type Service = CacheScopeMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CacheScopeMiddleware {
            inner,
            cache: self.cache.clone(),
        }
    }
}

#[derive(Clone)]
pub struct CacheScopeMiddleware<S> {
    inner: S,
    cache: ResponseCache,
}

impl<S> Service<Request<Body>> for CacheScopeMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    #[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
    fn call(&mut self, req: Request<Body>) -> Self::Future {
        self.cache.clear();
        let mut inner = self.inner.clone();

        Box::pin(async move { inner.call(req).await })
    }
}
