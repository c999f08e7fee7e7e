//! Request correlation IDs
//!
//! These only tag API calls; they are not secrets, so any `Rng` will do.

use mega_core::config::IdConfig;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// `length` characters drawn uniformly from `[A-Za-z0-9]`.
pub fn make_id<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// A request ID of the configured length from the thread-local generator.
pub fn make_request_id(config: &IdConfig) -> String {
    make_id(&mut rand::thread_rng(), config.request_id_length)
}
