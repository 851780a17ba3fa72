//! Caller identity from trusted gateway headers.
//!
//! Authentication happens upstream; the gateway forwards who the caller is:
//!
//! | header        | required | value                          |
//! |---------------|----------|--------------------------------|
//! | `x-user-id`   | yes      | opaque user id                 |
//! | `x-user-role` | yes      | `admin` or `storekeeper`       |
//! | `x-tenant-id` | no       | UUID; defaults to the default tenant |

use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use shelfkeep_core::validation::validate_uuid;
use shelfkeep_core::{Principal, Role, DEFAULT_TENANT_ID};

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const TENANT_ID_HEADER: &str = "x-tenant-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// The authenticated caller of a request.
#[derive(Debug, Clone)]
pub struct Caller(pub Principal);

impl Deref for Caller {
    type Target = Principal;

    fn deref(&self) -> &Principal {
        &self.0
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, ApiError> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|v| Some(v.trim()).filter(|v| !v.is_empty()))
            .map_err(|_| ApiError::unauthorized(format!("{name} header is not valid text"))),
    }
}

impl Caller {
    /// Reads the caller from request headers.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let user_id = header(headers, USER_ID_HEADER)?
            .ok_or_else(|| ApiError::unauthorized(format!("{USER_ID_HEADER} header is required")))?;

        let role: Role = header(headers, USER_ROLE_HEADER)?
            .ok_or_else(|| ApiError::unauthorized(format!("{USER_ROLE_HEADER} header is required")))?
            .parse()
            .map_err(|_| ApiError::unauthorized(format!("{USER_ROLE_HEADER} header is not a known role")))?;

        let tenant_id = header(headers, TENANT_ID_HEADER)?.unwrap_or(DEFAULT_TENANT_ID);
        validate_uuid(TENANT_ID_HEADER, tenant_id)
            .map_err(|_| ApiError::unauthorized(format!("{TENANT_ID_HEADER} header is not a UUID")))?;

        Ok(Caller(Principal::new(user_id, tenant_id, role)))
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Caller::from_headers(&parts.headers)
    }
}
