//! Admin key middleware.
//!
//! Wraps a route or scope and only lets a request through if its `X-Admin-Key` header matches the configured admin
//! key. Without a configured key every request is refused with a 403.
use std::{future::Future, pin::Pin, rc::Rc};

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
    HttpResponse,
};
use futures::future::{ok, Ready};
use hmac::{Hmac, Mac};
use log::*;
use sha2::Sha256;
use topup_common::Secret;

use crate::errors::ServerError;

pub const ADMIN_KEY_HEADER: &str = "X-Admin-Key";
const ADMIN_KEY_CONTEXT: &[u8] = b"topup-admin-key";

type HmacSha256 = Hmac<Sha256>;

fn admin_key_digest(key: &str) -> Result<HmacSha256, ServerError> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes()).map_err(|e| ServerError::Unspecified(e.to_string()))?;
    mac.update(ADMIN_KEY_CONTEXT);
    Ok(mac)
}

/// Checks `candidate` against the admin key. The keyed digests are compared in constant time, so neither the length
/// nor the contents of the key leak through response timing.
pub fn admin_key_matches(admin_key: &Secret<String>, candidate: &str) -> Result<bool, ServerError> {
    let expected = admin_key_digest(admin_key.reveal())?.finalize().into_bytes();
    Ok(admin_key_digest(candidate)?.verify_slice(&expected).is_ok())
}

pub struct AdminKeyMiddlewareFactory {
    admin_key: Option<Secret<String>>,
}

impl AdminKeyMiddlewareFactory {
    pub fn new(admin_key: Option<Secret<String>>) -> Self {
        AdminKeyMiddlewareFactory { admin_key }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AdminKeyMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AdminKeyMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AdminKeyMiddlewareService { admin_key: self.admin_key.clone(), service: Rc::new(service) })
    }
}

pub struct AdminKeyMiddlewareService<S> {
    admin_key: Option<Secret<String>>,
    service: Rc<S>,
}

impl<S> AdminKeyMiddlewareService<S> {
    fn check(&self, req: &ServiceRequest) -> Result<(), ServerError> {
        let Some(admin_key) = &self.admin_key else {
            return Err(ServerError::InsufficientPermissions("Admin access is disabled on this server".into()));
        };
        let candidate = req
            .headers()
            .get(ADMIN_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ServerError::InsufficientPermissions(format!("The {ADMIN_KEY_HEADER} header is missing")))?;
        if admin_key_matches(admin_key, candidate)? {
            Ok(())
        } else {
            Err(ServerError::InsufficientPermissions("Invalid admin key".into()))
        }
    }
}

impl<S, B> Service<ServiceRequest> for AdminKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match self.check(&req) {
            Ok(()) => {
                let service = Rc::clone(&self.service);
                Box::pin(async move { service.call(req).await.map(ServiceResponse::map_into_left_body) })
            },
            Err(e) => {
                warn!("💻️ Refused admin request to {}. {e}", req.path());
                let (req, _payload) = req.into_parts();
                let res = HttpResponse::from_error(e).map_into_right_body();
                Box::pin(async move { Ok(ServiceResponse::new(req, res)) })
            },
        }
    }
}
