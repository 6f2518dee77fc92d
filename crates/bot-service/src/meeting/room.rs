//! Room slug generation.
//!
//! A room slug names a meeting room in the video service's URL path.
//! Slugs are short, globally unique tokens: a fixed prefix followed by
//! 8 lowercase hex characters drawn from a CSPRNG. They are generated
//! fresh per call and never persisted; uniqueness rests on the 32 bits
//! of randomness, which is ample for throwaway consultation rooms.

use crate::errors::BotError;
use ring::rand::{SecureRandom, SystemRandom};
use std::fmt;

/// Fixed prefix of every generated room slug.
pub const ROOM_SLUG_PREFIX: &str = "cita-";

/// Number of random bytes per slug (hex-encodes to 8 characters).
const ROOM_SLUG_RANDOM_BYTES: usize = 4;

/// A generated video-call room slug.
///
/// Guaranteed to contain only the fixed prefix plus lowercase hex, so it
/// is safe to interpolate into a URL path without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomSlug(String);

impl RoomSlug {
    /// Generate a fresh room slug from the system CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns `BotError::Internal` if the RNG fails (never panics).
    pub fn generate() -> Result<Self, BotError> {
        let rng = SystemRandom::new();
        let mut bytes = [0u8; ROOM_SLUG_RANDOM_BYTES];

        rng.fill(&mut bytes).map_err(|e| {
            tracing::error!(target: "bot.meeting.room", error = %e, "Failed to generate random bytes for room slug");
            BotError::Internal("RNG failure".to_string())
        })?;

        Ok(Self(format!("{}{}", ROOM_SLUG_PREFIX, hex::encode(bytes))))
    }

    /// The slug as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
