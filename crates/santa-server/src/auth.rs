//! Credential extractors for the two trust tiers.
//!
//! - [`TenantAdmin`]: HTTP Basic with user `admin` and a tenant administrator
//!   password. The password selects the tenant.
//! - [`Session`]: a participant presenting their recovery code as a Bearer
//!   token. The code selects both the tenant and the participant.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use santa_core::{
  lifecycle::Actor,
  participant::{ParticipantId, Profile, RecoveryCode},
  store::GroupStore,
  tenant::TenantId,
};

use crate::{AppState, error::ApiError};

/// Basic-auth user name expected from tenant administrators.
pub const ADMIN_USERNAME: &str = "admin";

fn authorization(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
}

fn invalid_admin() -> ApiError { ApiError::Unauthorized("invalid admin password".into()) }

/// Verify tenant administrator credentials against the configured argon2
/// hashes and return the tenant they unlock.
pub fn verify_admin(
  headers: &HeaderMap,
  password_hashes: &[String],
) -> Result<TenantId, ApiError> {
  let encoded = authorization(headers)
    .and_then(|v| v.strip_prefix("Basic "))
    .ok_or_else(invalid_admin)?;

  let decoded = B64.decode(encoded).map_err(|_| invalid_admin())?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| invalid_admin())?;

  let (username, password) = creds.split_once(':').ok_or_else(invalid_admin)?;
  if username != ADMIN_USERNAME {
    return Err(invalid_admin());
  }

  let matches = password_hashes.iter().any(|phc| match PasswordHash::new(phc) {
    Ok(parsed) => Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .is_ok(),
    Err(e) => {
      tracing::warn!(error = %e, "skipping malformed admin password hash");
      false
    }
  });

  if matches {
    Ok(TenantId::from_credential(password))
  } else {
    Err(invalid_admin())
  }
}

/// Extract the recovery code from an `Authorization: Bearer <code>` header.
pub fn bearer_code(headers: &HeaderMap) -> Result<RecoveryCode, ApiError> {
  authorization(headers)
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(RecoveryCode::parse)
    .filter(|code| !code.as_str().is_empty())
    .ok_or_else(|| ApiError::Unauthorized("not authenticated".into()))
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// Present in a handler means the caller holds a tenant admin credential.
pub struct TenantAdmin {
  pub tenant: TenantId,
}

impl<S> FromRequestParts<AppState<S>> for TenantAdmin
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let tenant = verify_admin(&parts.headers, &state.config.admin_password_hashes)?;
    Ok(TenantAdmin { tenant })
  }
}

/// A signed-in participant and the profile their recovery code resolved to.
pub struct Session {
  pub tenant:  TenantId,
  pub profile: Profile,
}

impl Session {
  pub fn participant_id(&self) -> &ParticipantId { &self.profile.participant_id }

  pub fn actor(&self) -> Actor { Actor::Participant(self.participant_id().clone()) }
}

impl<S> FromRequestParts<AppState<S>> for Session
where
  S: GroupStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let code = bearer_code(&parts.headers)?;
    let (tenant, profile) = state
      .store
      .find_by_recovery_code(&code)
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| ApiError::Unauthorized("unknown recovery code".into()))?;
    Ok(Session { tenant, profile })
  }
}

#[cfg(test)]
mod tests {
  use argon2::{PasswordHasher, password_hash::SaltString};
  use axum::http::HeaderValue;
  use rand_core::OsRng;

  use super::*;

  fn hash(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string()
  }

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  #[test]
  fn correct_admin_password_selects_tenant() {
    let hashes = vec![hash("one"), hash("two")];
    let tenant = verify_admin(&headers(&basic("admin", "two")), &hashes).unwrap();
    assert_eq!(tenant, TenantId::from_credential("two"));
  }

  #[test]
  fn wrong_admin_password() {
    let hashes = vec![hash("one")];
    let result = verify_admin(&headers(&basic("admin", "nope")), &hashes);
    assert!(matches!(result, Err(ApiError::Unauthorized(_))));
  }

  #[test]
  fn wrong_admin_username() {
    let hashes = vec![hash("one")];
    let result = verify_admin(&headers(&basic("root", "one")), &hashes);
    assert!(matches!(result, Err(ApiError::Unauthorized(_))));
  }

  #[test]
  fn malformed_hash_is_skipped() {
    let hashes = vec!["not-a-phc-string".to_string(), hash("one")];
    assert!(verify_admin(&headers(&basic("admin", "one")), &hashes).is_ok());
  }

  #[test]
  fn missing_or_invalid_basic_header() {
    let hashes = vec![hash("one")];
    assert!(verify_admin(&HeaderMap::new(), &hashes).is_err());
    assert!(verify_admin(&headers("Basic !!!not-base64!!!"), &hashes).is_err());
  }

  #[test]
  fn bearer_code_is_normalised() {
    let code = bearer_code(&headers("Bearer abc234")).unwrap();
    assert_eq!(code.as_str(), "ABC234");
    assert!(bearer_code(&headers("Bearer   ")).is_err());
    assert!(bearer_code(&HeaderMap::new()).is_err());
  }
}
