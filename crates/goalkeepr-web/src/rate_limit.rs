//! Per-IP token buckets for the sign-in and sign-up forms.
//!
//! Buckets are created lazily on first use and never evicted.

use std::{
  collections::HashMap,
  net::{IpAddr, Ipv4Addr, SocketAddr},
  sync::{Arc, Mutex},
};

use axum::{
  extract::{ConnectInfo, Request, State},
  http::Method,
  middleware::Next,
  response::{IntoResponse, Response},
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

use crate::error::Error;

pub struct RateLimiters {
  quota:    Quota,
  limiters: Mutex<HashMap<IpAddr, Arc<DefaultDirectRateLimiter>>>,
}

impl RateLimiters {
  pub fn new(quota: Quota) -> Self {
    Self {
      quota,
      limiters: Mutex::new(HashMap::new()),
    }
  }

  /// The bucket for `ip`, created on first use.
  pub fn get(&self, ip: IpAddr) -> Arc<DefaultDirectRateLimiter> {
    let mut limiters = self
      .limiters
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner());
    limiters
      .entry(ip)
      .or_insert_with(|| Arc::new(RateLimiter::direct(self.quota)))
      .clone()
  }

  /// Take one token for `ip`. The registry lock is released before the
  /// bucket is consulted.
  pub fn allow(&self, ip: IpAddr) -> bool { self.get(ip).check().is_ok() }

  /// Number of tracked clients.
  pub fn len(&self) -> usize {
    self
      .limiters
      .lock()
      .map(|l| l.len())
      .unwrap_or_else(|poisoned| poisoned.into_inner().len())
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Peer address, or the unspecified address when the server was started
/// without connection info (e.g. in tests).
fn client_ip(req: &Request) -> IpAddr {
  req
    .extensions()
    .get::<ConnectInfo<SocketAddr>>()
    .map(|ConnectInfo(addr)| addr.ip())
    .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Throttle `POST` requests per client; other methods pass through.
pub async fn enforce(
  State(limiters): State<Arc<RateLimiters>>,
  req: Request,
  next: Next,
) -> Response {
  if req.method() != Method::POST {
    return next.run(req).await;
  }

  let ip = client_ip(&req);
  if !limiters.allow(ip) {
    tracing::warn!(%ip, path = %req.uri().path(), "rate limit exceeded");
    return Error::RateLimited.into_response();
  }
  next.run(req).await
}
