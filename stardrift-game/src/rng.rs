//! Deterministic RNG streams for settlements.
//!
//! Every settlement window gets its own generator derived from the engine
//! seed, a domain tag, and the window bounds. Replaying the same seed over
//! the same sequence of timestamps reproduces the same rewards, and a
//! preview of an uncommitted window is stable until the window moves.
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sha2::Sha256;

use crate::constants::{RNG_DOMAIN_PREVIEW, RNG_DOMAIN_SETTLE};

/// Which kind of window a generator is drawn for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RngDomain {
    Settle,
    Preview,
}

impl RngDomain {
    const fn tag(self) -> &'static [u8] {
        match self {
            Self::Settle => RNG_DOMAIN_SETTLE,
            Self::Preview => RNG_DOMAIN_PREVIEW,
        }
    }
}

fn derive_window_seed(user_seed: u64, domain: RngDomain, from_ms: u64, to_ms: u64) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed ^ from_ms.rotate_left(17) ^ to_ms;
    };
    mac.update(domain.tag());
    mac.update(&from_ms.to_le_bytes());
    mac.update(&to_ms.to_le_bytes());
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// Build the generator for one window `[from_ms, to_ms]`.
#[must_use]
pub fn window_rng(user_seed: u64, domain: RngDomain, from_ms: u64, to_ms: u64) -> SmallRng {
    SmallRng::seed_from_u64(derive_window_seed(user_seed, domain, from_ms, to_ms))
}
