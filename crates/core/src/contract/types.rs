//! Types exchanged with the marketplace contract.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Length of the metadata string stored on each item.
pub const METADATA_LEN: usize = 20;

/// Decode a hex identifier, with or without the `0x` prefix.
fn decode_hex(raw: &str) -> Result<Vec<u8>, InvalidHexId> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);

    if digits.is_empty() {
        return Err(InvalidHexId::Empty);
    }
    hex::decode(digits).map_err(|source| InvalidHexId::Decode {
        raw: raw.to_string(),
        source,
    })
}

/// Declares a byte identifier newtype, written as `0x`-prefixed hex.
macro_rules! hex_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(Vec<u8>);

        impl $name {
            /// Parse a hex identifier, with or without the `0x` prefix.
            pub fn parse(raw: &str) -> Result<Self, InvalidHexId> {
                decode_hex(raw).map(Self)
            }

            /// The all-zero 32-byte identifier.
            pub fn zeroed() -> Self {
                Self(vec![0; 32])
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            pub fn byte_len(&self) -> usize {
                self.0.len()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(&self.0))
            }
        }

        impl TryFrom<String> for $name {
            type Error = InvalidHexId;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.to_string()
            }
        }
    };
}

/// A string that is not a valid hex identifier.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidHexId {
    #[error("empty hex identifier")]
    Empty,

    #[error("invalid hex identifier {raw:?}: {source}")]
    Decode {
        raw: String,
        #[source]
        source: hex::FromHexError,
    },
}

hex_id!(
    /// Identifier of a fungible asset (the payment currency for purchases).
    AssetId
);

hex_id!(
    /// A wallet address.
    Address
);

hex_id!(
    /// Identifier of a deployed contract.
    ContractId
);

/// Owner of a listed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Identity {
    Address(Address),
    ContractId(ContractId),
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Address(a) => write!(f, "address:{}", a),
            Identity::ContractId(c) => write!(f, "contract:{}", c),
        }
    }
}

/// Fixed-length item description.
///
/// Always exactly [`METADATA_LEN`] ASCII characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Metadata(String);

/// Metadata that does not fit the fixed-length ASCII layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMetadata {
    #[error("metadata must be {expected} characters, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("metadata must be ASCII")]
    NotAscii,
}

impl Metadata {
    pub fn new(raw: &str) -> Result<Self, InvalidMetadata> {
        if !raw.is_ascii() {
            return Err(InvalidMetadata::NotAscii);
        }
        if raw.len() != METADATA_LEN {
            return Err(InvalidMetadata::Length {
                expected: METADATA_LEN,
                actual: raw.len(),
            });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Metadata {
    type Error = InvalidMetadata;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Metadata> for String {
    fn from(value: Metadata) -> Self {
        value.0
    }
}

/// An item listed on the marketplace contract.
///
/// Every field is set by the contract; `total_bought` is the only one that
/// changes after listing, and only the contract changes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Contract-assigned id (1-based).
    pub id: u64,
    /// Price in the smallest unit of the base asset.
    pub price: u64,
    /// Seller.
    pub owner: Identity,
    /// Fixed-length description.
    pub metadata: Metadata,
    /// Number of completed purchases.
    pub total_bought: u64,
}

/// Value attached to a contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Forward {
    pub amount: u64,
    pub asset_id: AssetId,
}

/// Shape of a state-changing contract call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOptions {
    /// Value transferred to the contract with the call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward: Option<Forward>,
    /// Outputs the contract may create during execution (e.g. change).
    #[serde(default)]
    pub variable_outputs: u32,
}

impl CallOptions {
    /// Options for a call that forwards no value.
    pub fn new() -> Self {
        Self {
            forward: None,
            variable_outputs: 0,
        }
    }

    pub fn with_forward(mut self, amount: u64, asset_id: AssetId) -> Self {
        self.forward = Some(Forward { amount, asset_id });
        self
    }

    pub fn with_variable_outputs(mut self, outputs: u32) -> Self {
        self.variable_outputs = outputs;
        self
    }
}

impl Default for CallOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Acknowledgement of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallReceipt {
    /// Transaction id, when the gateway reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
}
