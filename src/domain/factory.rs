//! Domain factories for creating identifiers and credentials.

use rand::{Rng, distr::Alphanumeric};

use super::{JoinToken, RoomId, error::ValueObjectError};

/// Number of alphanumeric characters in a generated join token.
const JOIN_TOKEN_LEN: usize = 48;

/// Factory for generating RoomId instances.
pub struct RoomIdFactory;

impl RoomIdFactory {
    /// Generate a new RoomId with a random UUID v4.
    ///
    /// # Errors
    ///
    /// This method should not fail in practice, but returns Result for
    /// consistency with the domain error handling pattern.
    pub fn generate() -> Result<RoomId, ValueObjectError> {
        let uuid = uuid::Uuid::new_v4();
        RoomId::from_uuid(uuid)
    }
}

/// Factory for generating join tokens.
///
/// Tokens are the sole admission credential for a room, so they are minted
/// from the thread-local CSPRNG rather than derived from the room id.
pub struct JoinTokenFactory;

impl JoinTokenFactory {
    /// Generate a new high-entropy alphanumeric join token.
    ///
    /// # Errors
    ///
    /// This method should not fail in practice, but returns Result for
    /// consistency with the domain error handling pattern.
    pub fn generate() -> Result<JoinToken, ValueObjectError> {
        let mut rng = rand::rng();
        let token: String = (0..JOIN_TOKEN_LEN)
            .map(|_| rng.sample(Alphanumeric) as char)
            .collect();
        JoinToken::new(token)
    }
}
