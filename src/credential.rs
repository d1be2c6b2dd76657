// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The credential/account service: an external collaborator consumed
//! only through this narrow, mockable interface. The core never owns
//! OAuth tokens or account rotation state itself.

use std::future::Future;
use std::pin::Pin;

use crate::error::CoreError;

/// Usage snapshot for one provider account.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProviderUsage {
    pub used_percent: Option<f64>,
}

/// Future type returned by [`CredentialService`] methods.
pub type CredentialFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, CoreError>> + Send + 'a>>;

/// Narrow view onto account usage the Monitor and Smart Restart Engine
/// consult; the broker itself lives outside this crate.
pub trait CredentialService: Send + Sync {
    fn get_provider_usage<'a>(&'a self, provider: &'a str) -> CredentialFuture<'a, ProviderUsage>;

    fn supported_providers(&self) -> Vec<String>;
}

/// A service with no configured providers; `get_provider_usage` always
/// reports `DEPENDENCY_MISSING`. Used when no credential broker is wired
/// up, so the Monitor can still run context/rate-limit checks.
pub struct NoCredentialService;

impl CredentialService for NoCredentialService {
    fn get_provider_usage<'a>(&'a self, provider: &'a str) -> CredentialFuture<'a, ProviderUsage> {
        let provider = provider.to_owned();
        Box::pin(async move {
            Err(CoreError::new(
                crate::error::ErrorCode::DependencyMissing,
                format!("no credential service configured for provider `{provider}`"),
            ))
        })
    }

    fn supported_providers(&self) -> Vec<String> {
        Vec::new()
    }
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
