//! Tenants: isolated data partitions keyed by an administrator credential.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of hex characters of the credential digest kept as the tenant key.
const TENANT_KEY_LEN: usize = 16;

/// Opaque identifier of a tenant.
///
/// Derived from the tenant administrator's plaintext credential so the
/// credential itself never reaches the store.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
  /// Derive the tenant key from an administrator credential.
  pub fn from_credential(credential: &str) -> Self {
    let digest = Sha256::digest(credential.as_bytes());
    let mut key = hex::encode(digest);
    key.truncate(TENANT_KEY_LEN);
    Self(key)
  }

  /// Wrap an already-derived key, e.g. one read back from the store.
  pub fn from_key(key: impl Into<String>) -> Self { Self(key.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for TenantId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn same_credential_same_tenant() {
    assert_eq!(
      TenantId::from_credential("password"),
      TenantId::from_credential("password")
    );
  }

  #[test]
  fn key_is_truncated_digest() {
    let id = TenantId::from_credential("password");
    assert_eq!(id.as_str().len(), TENANT_KEY_LEN);
    // sha256("password") = 5e884898da28047151d0e56f8dc62927...
    assert_eq!(id.as_str(), "5e884898da280471");
  }

  #[test]
  fn different_credentials_are_isolated() {
    assert_ne!(
      TenantId::from_credential("password"),
      TenantId::from_credential("password2")
    );
  }
}
