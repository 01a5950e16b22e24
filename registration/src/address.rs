//! `AddressCodec` seam and the CIP-19 reference codec.
//!
//! The normalizer never formats addresses itself; every key → credential →
//! display conversion goes through an [`AddressCodec`]. [`Cip19AddressCodec`]
//! is the production implementation:
//!
//! - key hashing: Blake2b-224 over the raw 32-byte verification key,
//! - header byte: high nibble = address type, low nibble = network id,
//! - display: bech32 with `addr` / `addr_test` (payment types),
//!   `stake` / `stake_test` (reward types) and `ed25519_pk` (raw keys).
//!
//! Byron addresses (type 8) are recognised but displayed as hex.

use bech32::{Bech32, Hrp};
use blake2::digest::consts::U28;
use blake2::{Blake2b, Digest};

use metadecode_kernel::value::hex_text::{is_hex_payload, strip_hex_prefix};

type Blake2b224 = Blake2b<U28>;

/// Length of a credential hash (Blake2b-224).
pub const CREDENTIAL_HASH_LEN: usize = 28;

/// Length of a raw Ed25519 verification key.
pub const VERIFICATION_KEY_LEN: usize = 32;

const HRP_VERIFICATION_KEY: &str = "ed25519_pk";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Cardano network discriminant carried in every Shelley header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    /// Header network id (low nibble).
    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::Mainnet => 1,
            Self::Testnet => 0,
        }
    }

    #[must_use]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::Mainnet),
            0 => Some(Self::Testnet),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }

    /// Parse a CLI/config label: `mainnet`, `testnet`, `1` or `0`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "1" => Some(Self::Mainnet),
            "testnet" | "0" => Some(Self::Testnet),
            _ => None,
        }
    }

    /// Network selected by a `NETWORK` environment value: `"0"` is testnet,
    /// anything else (including unset) is mainnet.
    #[must_use]
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("0") => Self::Testnet,
            _ => Self::Mainnet,
        }
    }

    const fn payment_hrp(self) -> &'static str {
        match self {
            Self::Mainnet => "addr",
            Self::Testnet => "addr_test",
        }
    }

    const fn stake_hrp(self) -> &'static str {
        match self {
            Self::Mainnet => "stake",
            Self::Testnet => "stake_test",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Whether a credential hash names a key or a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    Key,
    Script,
}

/// A payment or staking credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Credential {
    pub kind: CredentialKind,
    pub hash: [u8; CREDENTIAL_HASH_LEN],
}

impl Credential {
    fn from_slice(kind: CredentialKind, bytes: &[u8]) -> Result<Self, AddressError> {
        let hash = bytes
            .try_into()
            .map_err(|_| AddressError::InvalidAddressBytes {
                detail: format!("credential must be {CREDENTIAL_HASH_LEN} bytes, got {}", bytes.len()),
            })?;
        Ok(Self { kind, hash })
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

/// Shelley-era address shapes (CIP-19) plus Byron.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    Base,
    Pointer,
    Enterprise,
    Byron,
    Reward,
}

impl AddressType {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Pointer => "pointer",
            Self::Enterprise => "enterprise",
            Self::Byron => "byron",
            Self::Reward => "reward",
        }
    }
}

/// Input accepted by [`AddressCodec::decode_address`].
#[derive(Debug, Clone, Copy)]
pub enum AddressInput<'a> {
    /// Raw header + payload bytes.
    Bytes(&'a [u8]),
    /// Bech32 display text, or hex text of the raw bytes.
    Text(&'a str),
}

/// A rendered address together with its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAddress {
    pub display: String,
    pub bytes: Vec<u8>,
}

/// Result of [`AddressCodec::decode_address`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAddress {
    /// `None` for Byron addresses, whose network lives in their attributes.
    pub network: Option<Network>,
    pub address_type: AddressType,
    pub payment_credential: Option<Credential>,
    pub staking_credential: Option<Credential>,
    pub bytes: Vec<u8>,
    pub display: String,
}

/// Typed failures of the codec.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    /// Header, length or payload of raw address bytes is not a valid address.
    #[error("invalid address bytes: {detail}")]
    InvalidAddressBytes { detail: String },
    /// A verification key of the wrong size.
    #[error("invalid verification key: {detail}")]
    InvalidKey { detail: String },
    /// Display text that is neither valid bech32 nor hex.
    #[error("invalid address text: {detail}")]
    InvalidDisplay { detail: String },
}

/// Address derivation collaborator used by the normalizer.
pub trait AddressCodec {
    /// Hash a raw verification key into a key credential.
    ///
    /// # Errors
    ///
    /// [`AddressError::InvalidKey`] if the key has the wrong length.
    fn hash_verification_key(&self, key: &[u8]) -> Result<Credential, AddressError>;

    /// Encode a staking credential as a reward (stake) address.
    ///
    /// # Errors
    ///
    /// Propagates display-encoding failures.
    fn encode_address(
        &self,
        credential: &Credential,
        network: Network,
    ) -> Result<EncodedAddress, AddressError>;

    /// Display form of a raw verification key.
    ///
    /// # Errors
    ///
    /// [`AddressError::InvalidKey`] if the key has the wrong length.
    fn encode_verification_key(&self, key: &[u8]) -> Result<String, AddressError>;

    /// Parse raw bytes or display text into its parts.
    ///
    /// # Errors
    ///
    /// [`AddressError::InvalidAddressBytes`] for malformed bytes,
    /// [`AddressError::InvalidDisplay`] for text that is neither bech32 nor hex.
    fn decode_address(&self, input: AddressInput<'_>) -> Result<DecodedAddress, AddressError>;
}

// ---------------------------------------------------------------------------
// CIP-19 codec
// ---------------------------------------------------------------------------

/// Reference codec: Blake2b-224 hashing, CIP-19 headers, bech32 display.
#[derive(Debug, Default, Clone, Copy)]
pub struct Cip19AddressCodec;

impl AddressCodec for Cip19AddressCodec {
    fn hash_verification_key(&self, key: &[u8]) -> Result<Credential, AddressError> {
        check_key_len(key)?;
        let digest = Blake2b224::digest(key);
        let mut hash = [0u8; CREDENTIAL_HASH_LEN];
        hash.copy_from_slice(&digest);
        Ok(Credential {
            kind: CredentialKind::Key,
            hash,
        })
    }

    fn encode_address(
        &self,
        credential: &Credential,
        network: Network,
    ) -> Result<EncodedAddress, AddressError> {
        let type_nibble: u8 = match credential.kind {
            CredentialKind::Key => 0x0e,
            CredentialKind::Script => 0x0f,
        };
        let mut bytes = Vec::with_capacity(1 + CREDENTIAL_HASH_LEN);
        bytes.push((type_nibble << 4) | network.id());
        bytes.extend_from_slice(&credential.hash);
        let display = bech32_encode(network.stake_hrp(), &bytes)?;
        Ok(EncodedAddress { display, bytes })
    }

    fn encode_verification_key(&self, key: &[u8]) -> Result<String, AddressError> {
        check_key_len(key)?;
        bech32_encode(HRP_VERIFICATION_KEY, key)
    }

    fn decode_address(&self, input: AddressInput<'_>) -> Result<DecodedAddress, AddressError> {
        match input {
            AddressInput::Bytes(bytes) => decode_bytes(bytes),
            AddressInput::Text(text) => decode_bytes(&text_to_bytes(text)?),
        }
    }
}

fn check_key_len(key: &[u8]) -> Result<(), AddressError> {
    if key.len() == VERIFICATION_KEY_LEN {
        Ok(())
    } else {
        Err(AddressError::InvalidKey {
            detail: format!("expected {VERIFICATION_KEY_LEN} bytes, got {}", key.len()),
        })
    }
}

fn bech32_encode(hrp: &str, data: &[u8]) -> Result<String, AddressError> {
    let hrp = Hrp::parse(hrp).map_err(|e| AddressError::InvalidDisplay {
        detail: e.to_string(),
    })?;
    bech32::encode::<Bech32>(hrp, data).map_err(|e| AddressError::InvalidDisplay {
        detail: e.to_string(),
    })
}

fn text_to_bytes(text: &str) -> Result<Vec<u8>, AddressError> {
    let trimmed = text.trim();
    let bare = strip_hex_prefix(trimmed);
    if is_hex_payload(bare) {
        return hex::decode(bare).map_err(|e| AddressError::InvalidDisplay {
            detail: e.to_string(),
        });
    }
    let (_hrp, data) = bech32::decode(trimmed).map_err(|e| AddressError::InvalidDisplay {
        detail: e.to_string(),
    })?;
    Ok(data)
}

fn decode_bytes(bytes: &[u8]) -> Result<DecodedAddress, AddressError> {
    let Some((&header, payload)) = bytes.split_first() else {
        return Err(AddressError::InvalidAddressBytes {
            detail: "empty address".into(),
        });
    };
    let type_nibble = header >> 4;

    if type_nibble == 0x08 {
        return Ok(DecodedAddress {
            network: None,
            address_type: AddressType::Byron,
            payment_credential: None,
            staking_credential: None,
            bytes: bytes.to_vec(),
            display: hex::encode(bytes),
        });
    }

    let network =
        Network::from_id(header & 0x0f).ok_or_else(|| AddressError::InvalidAddressBytes {
            detail: format!("unsupported network id {}", header & 0x0f),
        })?;
    let kind = |script: bool| {
        if script {
            CredentialKind::Script
        } else {
            CredentialKind::Key
        }
    };
    let h = CREDENTIAL_HASH_LEN;

    let (address_type, payment, staking) = match type_nibble {
        0x00..=0x03 => {
            expect_len(payload, 2 * h, type_nibble)?;
            (
                AddressType::Base,
                Some(Credential::from_slice(kind(type_nibble & 1 == 1), &payload[..h])?),
                Some(Credential::from_slice(kind(type_nibble & 2 == 2), &payload[h..])?),
            )
        }
        0x04 | 0x05 => {
            if payload.len() <= h {
                return Err(AddressError::InvalidAddressBytes {
                    detail: "pointer address without pointer".into(),
                });
            }
            check_pointer(&payload[h..])?;
            (
                AddressType::Pointer,
                Some(Credential::from_slice(kind(type_nibble == 0x05), &payload[..h])?),
                None,
            )
        }
        0x06 | 0x07 => {
            expect_len(payload, h, type_nibble)?;
            (
                AddressType::Enterprise,
                Some(Credential::from_slice(kind(type_nibble == 0x07), payload)?),
                None,
            )
        }
        0x0e | 0x0f => {
            expect_len(payload, h, type_nibble)?;
            (
                AddressType::Reward,
                None,
                Some(Credential::from_slice(kind(type_nibble == 0x0f), payload)?),
            )
        }
        other => {
            return Err(AddressError::InvalidAddressBytes {
                detail: format!("unknown address type {other:#x}"),
            })
        }
    };

    let hrp = if address_type == AddressType::Reward {
        network.stake_hrp()
    } else {
        network.payment_hrp()
    };
    Ok(DecodedAddress {
        network: Some(network),
        address_type,
        payment_credential: payment,
        staking_credential: staking,
        bytes: bytes.to_vec(),
        display: bech32_encode(hrp, bytes)?,
    })
}

fn expect_len(payload: &[u8], expected: usize, type_nibble: u8) -> Result<(), AddressError> {
    if payload.len() == expected {
        Ok(())
    } else {
        Err(AddressError::InvalidAddressBytes {
            detail: format!(
                "address type {type_nibble:#x} needs {expected} payload bytes, got {}",
                payload.len()
            ),
        })
    }
}

/// A pointer is three variable-length naturals (7 bits per byte, high bit
/// set on every byte but the last) that must consume the rest exactly.
fn check_pointer(mut rest: &[u8]) -> Result<(), AddressError> {
    for field in ["slot", "tx_index", "cert_index"] {
        let end = rest
            .iter()
            .position(|b| b & 0x80 == 0)
            .ok_or_else(|| AddressError::InvalidAddressBytes {
                detail: format!("truncated pointer {field}"),
            })?;
        rest = &rest[end + 1..];
    }
    if rest.is_empty() {
        Ok(())
    } else {
        Err(AddressError::InvalidAddressBytes {
            detail: format!("{} trailing bytes after pointer", rest.len()),
        })
    }
}
