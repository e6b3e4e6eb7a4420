use std::sync::Arc;

use log::Logger;

use crate::client::ListingClient;
use crate::config::parse_variable_or;
use crate::init::InitPolicy;
use crate::queries::TieBreak;
use crate::service::ListingService;

/// Everything a listing service's routes need.
#[derive(Clone)]
pub struct Environment {
    pub logger: Arc<Logger>,
    pub service: Arc<ListingService>,
}

impl Environment {
    pub fn new(logger: Arc<Logger>, service: Arc<ListingService>) -> Self {
        Self { logger, service }
    }
}

/// Everything the gateway's routes for one domain need.
#[derive(Clone)]
pub struct Upstream {
    pub logger: Arc<Logger>,
    pub client: Arc<ListingClient>,
}

impl Upstream {
    pub fn new(logger: Arc<Logger>, client: Arc<ListingClient>) -> Self {
        Self { logger, client }
    }
}

/// Repository behaviour that can be changed without rebuilding.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub(crate) init_policy: InitPolicy,
    pub(crate) tie_break: TieBreak,
    pub(crate) seed_count: u32,
}

impl Config {
    pub const DEFAULT_SEED_COUNT: u32 = 100;

    pub fn new(init_policy: InitPolicy, tie_break: TieBreak, seed_count: u32) -> Self {
        Self {
            init_policy,
            tie_break,
            seed_count,
        }
    }

    /// Reads `LISTINGS_INIT_POLICY`, `LISTINGS_TIE_BREAK` and
    /// `LISTINGS_SEED_COUNT`, using the defaults for any that are unset.
    pub fn from_env() -> Self {
        Self::new(
            parse_variable_or("LISTINGS_INIT_POLICY", InitPolicy::default()),
            parse_variable_or("LISTINGS_TIE_BREAK", TieBreak::default()),
            parse_variable_or("LISTINGS_SEED_COUNT", Self::DEFAULT_SEED_COUNT),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            InitPolicy::default(),
            TieBreak::default(),
            Self::DEFAULT_SEED_COUNT,
        )
    }
}
