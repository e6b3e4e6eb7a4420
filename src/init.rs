//! Runs a repository's one-time setup and caches its outcome.

use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::errors::InitError;

/// What a call to `init` does after an earlier attempt failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InitPolicy {
    /// The first outcome is final; later calls see the same failure.
    Once,
    /// A call arriving after a failed attempt has finished starts a new
    /// one. Success is still final.
    RetryOnFailure,
}

impl Default for InitPolicy {
    fn default() -> Self {
        InitPolicy::Once
    }
}

impl FromStr for InitPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "once" => Ok(InitPolicy::Once),
            "retry" => Ok(InitPolicy::RetryOnFailure),
            _ => Err(format!("unknown initialization policy `{}`", s)),
        }
    }
}

pub type Attempt = Shared<BoxFuture<'static, Result<(), InitError>>>;

/// Shares a single in-flight setup among every caller.
///
/// Callers arriving while an attempt is running await that attempt, so
/// they all observe its result. The lock is only held while choosing
/// the attempt, never while it runs.
pub struct Initializer {
    policy: InitPolicy,
    attempt: Mutex<Option<Attempt>>,
}

impl Initializer {
    pub fn new(policy: InitPolicy) -> Self {
        Self {
            policy,
            attempt: Mutex::new(None),
        }
    }

    /// Returns the attempt to await, starting one with `setup` if none
    /// applies yet.
    pub fn run<F>(&self, setup: F) -> Attempt
    where
        F: FnOnce() -> BoxFuture<'static, Result<(), InitError>>,
    {
        let mut attempt = self.attempt.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(current) = attempt.as_ref() {
            let failed = matches!(current.peek(), Some(Err(_)));

            if !failed || self.policy == InitPolicy::Once {
                return current.clone();
            }
        }

        let next = setup().shared();
        *attempt = Some(next.clone());

        next
    }
}
