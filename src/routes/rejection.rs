use serde::Serialize;
use warp::reject;

use crate::errors::ListingError;

#[derive(Debug)]
pub struct Rejection {
    pub(crate) context: Context,
    pub(crate) error: ListingError,
}

impl Rejection {
    pub fn new(context: Context, error: ListingError) -> Self {
        Rejection { context, error }
    }

    /// Wraps a new rejection so that warp can carry it to
    /// `format_rejection`.
    pub fn reject(context: Context, error: impl Into<ListingError>) -> reject::Rejection {
        reject::custom(Self::new(context, error.into()))
    }

    pub fn flatten(&self) -> FlattenedRejection {
        FlattenedRejection {
            context: self.context.clone(),
            message: format!("{}", self.error),
        }
    }
}

impl reject::Reject for Rejection {}

#[derive(Debug, Serialize)]
pub struct FlattenedRejection {
    #[serde(flatten)]
    pub(crate) context: Context,
    pub(crate) message: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Context {
    Get { domain: &'static str, id: u64 },
    List { domain: &'static str },
}

impl Context {
    pub fn get(domain: &'static str, id: u64) -> Context {
        Context::Get { domain, id }
    }

    pub fn list(domain: &'static str) -> Context {
        Context::List { domain }
    }
}
