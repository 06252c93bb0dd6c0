use thiserror::Error;

use crate::host::HostError;

pub type Result<T, E = BridgeError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("host error: {0}")]
    Host(#[from] HostError),
    #[error("'{property}' returned {found}, expected {expected}")]
    UnexpectedValue {
        property: String,
        expected: &'static str,
        found: &'static str,
    },
    /// The host answered a relationship with an object of the wrong type.
    /// This means the bridged object model broke its own contract.
    #[error("relationship '{relationship}' resolved to {found}, expected {expected}")]
    RelationshipTypeMismatch {
        relationship: String,
        expected: &'static str,
        found: String,
    },
    /// A collection reported `length` entries but one of them was not an object.
    #[error("collection entry {index} of {length} is {found}, expected an object")]
    CollectionHole {
        index: usize,
        length: usize,
        found: &'static str,
    },
    #[error("token list on {owner} has no companion attribute and is not settable")]
    UnsupportedTokenListShape { owner: String },
}

impl BridgeError {
    /// Errors that indicate a broken host contract rather than a failed call.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            BridgeError::RelationshipTypeMismatch { .. }
                | BridgeError::CollectionHole { .. }
                | BridgeError::UnsupportedTokenListShape { .. }
        )
    }
}
