//! `MetadataNormalizer`: per-schema field extraction into a
//! [`NormalizedMetadata`] record.
//!
//! # Isolation
//!
//! Every top-level key is handled on its own. A key whose value cannot be
//! interpreted sets its field(s) to `None`, records a [`FieldError`] and an
//! error diagnostic, and the remaining keys are still processed. Keys the
//! schema does not name are kept verbatim in [`NormalizedMetadata::extras`].
//!
//! # Envelope overrides
//!
//! For [`EnvelopeKind::X509RbacEnvelope`], values found inside the parsed
//! RBAC structure (stake key, delegations, payment address, nonce, voting
//! purpose) replace the corresponding top-level fields.

use metadecode_kernel::compression::CompressionAlgorithm;
use metadecode_kernel::recovery::budget::RecoveryLimits;
use metadecode_kernel::recovery::diagnostics::DiagnosticSink;
use metadecode_kernel::recovery::resolver::resolve;
use metadecode_kernel::value::model::Value;
use metadecode_kernel::value::render::{key_label, to_json};

use crate::address::{AddressCodec, AddressInput, Cip19AddressCodec, Network};
use crate::chunked::{compression_for_key, reconstruct_and_parse, ChunkedPayload};
use crate::envelope::{classify, EnvelopeError, EnvelopeKind};
use crate::fields::{hex_text, key_bytes, key_index};
use crate::purpose::{purpose_info, purpose_uuid_text, PurposeInfo};
use crate::rbac::{self, RbacParseResult, RbacRoleEntry};

/// Transaction-metadata label of Catalyst voter registrations.
pub const LABEL_VOTER_REGISTRATION: i128 = 61284;

/// Transaction-metadata label of role-based (X.509) registrations.
pub const LABEL_RBAC_REGISTRATION: i128 = 509;

/// Labels probed, in order, when the input is a full metadata map.
pub const REGISTRATION_LABELS: [i128; 2] = [LABEL_VOTER_REGISTRATION, LABEL_RBAC_REGISTRATION];

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One voting-power delegation.
#[derive(Debug, Clone, PartialEq)]
pub struct VoterDelegation {
    /// Hex of the raw voting key.
    pub voting_key: String,
    /// Codec display form of the voting key; `None` if the codec rejected it.
    pub derived_address: Option<String>,
    pub weight: Value,
}

impl VoterDelegation {
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "voting_key": self.voting_key,
            "derived_address": self.derived_address,
            "weight": to_json(&self.weight),
        })
    }
}

/// A field that could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Reassembled envelope payload and the RBAC parse of it.
#[derive(Debug, Clone, PartialEq)]
pub struct X509Data {
    pub payload: ChunkedPayload,
    pub rbac: Option<RbacParseResult>,
}

impl X509Data {
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match &self.payload {
            ChunkedPayload::Decoded { data, .. } => serde_json::json!({
                "data": hex::encode(data),
                "parsed_rbac": self.rbac.as_ref().map(RbacParseResult::to_json),
            }),
            ChunkedPayload::Failed { error, compression } => serde_json::json!({
                "error": format!("failed to parse x509 chunked data: {error}"),
                "compression": compression.label(),
            }),
        }
    }
}

/// Envelope-level summary synthesized for the X.509 kind.
#[derive(Debug, Clone, PartialEq)]
pub struct X509Envelope {
    pub purpose_uuid: Option<String>,
    pub purpose_info: Option<PurposeInfo>,
    pub txn_inputs_hash: Option<String>,
    pub previous_transaction_id: Option<String>,
    pub validation_signature: Option<String>,
    pub compression_type: Option<CompressionAlgorithm>,
    pub roles: Vec<RbacRoleEntry>,
}

impl X509Envelope {
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "purpose_uuid": self.purpose_uuid,
            "purpose_info": self.purpose_info.as_ref().map(PurposeInfo::to_json),
            "txn_inputs_hash": self.txn_inputs_hash,
            "previous_transaction_id": self.previous_transaction_id,
            "validation_signature": self.validation_signature,
            "compression_type": self.compression_type.map(CompressionAlgorithm::label),
            "roles": self.roles.iter().map(RbacRoleEntry::to_json).collect::<Vec<_>>(),
        })
    }
}

/// The normalized record. Built fresh per call, never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMetadata {
    pub kind: EnvelopeKind,
    /// Transaction-metadata label the record was read from, if any.
    pub metadata_label: Option<i128>,

    pub stake_pub: Option<String>,
    pub stake_key: Option<String>,
    pub stake_hex: Option<String>,
    pub payment_address: Option<String>,
    pub voter_delegations: Option<Vec<VoterDelegation>>,
    pub nonce: Option<Value>,
    pub voting_purpose: Option<Value>,

    pub purpose_uuid: Option<String>,
    pub purpose_info: Option<PurposeInfo>,
    pub txn_inputs_hash: Option<String>,
    pub previous_transaction_id: Option<String>,
    pub validation_signature: Option<String>,
    pub compression_type: Option<CompressionAlgorithm>,
    pub x509_data: Option<X509Data>,
    pub x509_envelope: Option<X509Envelope>,

    /// Keys the schema does not name, in input order.
    pub extras: Vec<(Value, Value)>,
    pub field_errors: Vec<FieldError>,
}

impl NormalizedMetadata {
    fn empty(kind: EnvelopeKind) -> Self {
        Self {
            kind,
            metadata_label: None,
            stake_pub: None,
            stake_key: None,
            stake_hex: None,
            payment_address: None,
            voter_delegations: None,
            nonce: None,
            voting_purpose: None,
            purpose_uuid: None,
            purpose_info: None,
            txn_inputs_hash: None,
            previous_transaction_id: None,
            validation_signature: None,
            compression_type: None,
            x509_data: None,
            x509_envelope: None,
            extras: Vec::new(),
            field_errors: Vec::new(),
        }
    }

    /// JSON form of the record.
    ///
    /// Unknown keys appear at the top level under their key label; a named
    /// field with the same label takes precedence.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        for (k, v) in &self.extras {
            obj.insert(key_label(k), to_json(v));
        }

        let mut put = |name: &str, value: serde_json::Value| {
            obj.insert(name.to_owned(), value);
        };
        put("tx_type", self.kind.label().into());
        if let Some(label) = self.metadata_label {
            put("metadata_label", to_json(&Value::Integer(label)));
        }
        put("stake_pub", self.stake_pub.clone().into());
        put("stake_key", self.stake_key.clone().into());
        put("stake_hex", self.stake_hex.clone().into());
        put("payment_address", self.payment_address.clone().into());
        put(
            "voter_delegations",
            self.voter_delegations.as_ref().map_or(serde_json::Value::Null, |ds| {
                ds.iter().map(VoterDelegation::to_json).collect()
            }),
        );
        put("nonce", self.nonce.as_ref().map_or(serde_json::Value::Null, to_json));
        put(
            "voting_purpose",
            self.voting_purpose.as_ref().map_or(serde_json::Value::Null, to_json),
        );

        if self.kind == EnvelopeKind::X509RbacEnvelope {
            put("purpose_uuid", self.purpose_uuid.clone().into());
            put(
                "purpose_info",
                self.purpose_info
                    .as_ref()
                    .map_or(serde_json::Value::Null, PurposeInfo::to_json),
            );
            put("txn_inputs_hash", self.txn_inputs_hash.clone().into());
            put(
                "previous_transaction_id",
                self.previous_transaction_id.clone().into(),
            );
            put("validation_signature", self.validation_signature.clone().into());
            put(
                "compression_type",
                self.compression_type.map(CompressionAlgorithm::label).into(),
            );
            put(
                "x509_data",
                self.x509_data
                    .as_ref()
                    .map_or(serde_json::Value::Null, X509Data::to_json),
            );
            put(
                "x509_envelope",
                self.x509_envelope
                    .as_ref()
                    .map_or(serde_json::Value::Null, X509Envelope::to_json),
            );
        }

        put(
            "field_errors",
            self.field_errors
                .iter()
                .map(|e| serde_json::json!({ "field": e.field, "error": e.message }))
                .collect(),
        );
        serde_json::Value::Object(obj)
    }
}

// ---------------------------------------------------------------------------
// Normalizer
// ---------------------------------------------------------------------------

/// Settings for one normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizerConfig {
    /// Network used when deriving stake addresses from raw keys.
    pub network: Network,
    /// Budget for pre-classification recovery; its decompress limits also
    /// cap chunked payloads.
    pub limits: RecoveryLimits,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            network: Network::Mainnet,
            limits: RecoveryLimits::default(),
        }
    }
}

/// Per-schema field extraction over an [`AddressCodec`].
#[derive(Debug, Clone)]
pub struct MetadataNormalizer<C = Cip19AddressCodec> {
    codec: C,
    config: NormalizerConfig,
}

impl Default for MetadataNormalizer<Cip19AddressCodec> {
    fn default() -> Self {
        Self::new(Cip19AddressCodec, NormalizerConfig::default())
    }
}

impl<C: AddressCodec> MetadataNormalizer<C> {
    pub fn new(codec: C, config: NormalizerConfig) -> Self {
        Self { codec, config }
    }

    #[must_use]
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize any decoded metadata value.
    ///
    /// A value that is not a map is first run through the recursive
    /// resolver (it may be hex or bytes wrapping the real map). A full
    /// transaction-metadata map carrying one of [`REGISTRATION_LABELS`] is
    /// narrowed to the value under that label.
    ///
    /// # Errors
    ///
    /// [`EnvelopeError::NotAMap`] when no map can be recovered.
    pub fn normalize_metadata(
        &self,
        value: Value,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<NormalizedMetadata, EnvelopeError> {
        let root = self.recover_map(value, sink)?;

        let labelled = REGISTRATION_LABELS.iter().find_map(|label| {
            root.iter()
                .find(|(k, _)| key_index(k) == Some(*label))
                .map(|(_, v)| (*label, v.clone()))
        });
        let (label, entries) = match labelled {
            Some((label, inner)) => {
                sink.debug("normalize", format!("reading metadata label {label}"));
                (Some(label), self.recover_map(inner, sink)?)
            }
            None => (None, root),
        };

        let mut record = self.normalize_map(&entries, sink);
        record.metadata_label = label;
        Ok(record)
    }

    /// Classify `entries` and normalize them.
    pub fn normalize_map(
        &self,
        entries: &[(Value, Value)],
        sink: &mut dyn DiagnosticSink,
    ) -> NormalizedMetadata {
        let kind = classify(entries);
        sink.debug("normalize", format!("classified as {kind}"));
        self.normalize(entries, kind, sink)
    }

    /// Normalize `entries` under an already-chosen schema.
    pub fn normalize(
        &self,
        entries: &[(Value, Value)],
        kind: EnvelopeKind,
        sink: &mut dyn DiagnosticSink,
    ) -> NormalizedMetadata {
        let mut record = NormalizedMetadata::empty(kind);
        for (key, value) in entries {
            let handled = match kind {
                EnvelopeKind::X509RbacEnvelope => self.x509_field(&mut record, key, value, sink),
                EnvelopeKind::VoterRegistrationV1 | EnvelopeKind::VoterRegistrationV2 => {
                    self.registration_field(&mut record, key, value, sink)
                }
            };
            if !handled {
                record.extras.push((key.clone(), value.clone()));
            }
        }
        if kind == EnvelopeKind::X509RbacEnvelope {
            self.apply_rbac_overrides(&mut record, sink);
        }
        record
    }

    // -----------------------------------------------------------------------
    // Registration schemas (cip15 / cip36)
    // -----------------------------------------------------------------------

    fn registration_field(
        &self,
        record: &mut NormalizedMetadata,
        key: &Value,
        value: &Value,
        sink: &mut dyn DiagnosticSink,
    ) -> bool {
        match key_index(key) {
            Some(1) => {
                let delegations = if record.kind == EnvelopeKind::VoterRegistrationV1 {
                    Ok(vec![self.delegation(value, Value::Integer(1), sink)])
                } else {
                    self.delegations(value, sink)
                };
                record.voter_delegations =
                    ok_or_record(record, "voter_delegations", delegations, sink);
            }
            Some(2) => {
                let stake = self.stake_fields(value);
                if let Some((stake_pub, stake_key, stake_hex)) =
                    ok_or_record(record, "stake_key", stake, sink)
                {
                    record.stake_pub = Some(stake_pub);
                    record.stake_key = Some(stake_key);
                    record.stake_hex = Some(stake_hex);
                }
            }
            Some(3) => {
                let address = key_bytes(value).and_then(|bytes| {
                    self.codec
                        .decode_address(AddressInput::Bytes(&bytes))
                        .map(|decoded| decoded.display)
                        .map_err(|e| e.to_string())
                });
                record.payment_address = ok_or_record(record, "payment_address", address, sink);
            }
            Some(4) => record.nonce = Some(value.clone()),
            Some(5) => record.voting_purpose = Some(value.clone()),
            _ => return false,
        }
        true
    }

    fn delegations(
        &self,
        value: &Value,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Vec<VoterDelegation>, String> {
        let items = value
            .untagged()
            .as_array()
            .ok_or_else(|| format!("expected an array of delegations, found {}", value.kind()))?;
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item.untagged().as_array() {
                Some([voting_key, weight, ..]) => {
                    out.push(self.delegation(voting_key, weight.clone(), sink));
                }
                _ => sink.warn(
                    "normalize.voter_delegations",
                    format!("delegation {i} is not a [key, weight] pair; skipped"),
                ),
            }
        }
        Ok(out)
    }

    fn delegation(
        &self,
        voting_key: &Value,
        weight: Value,
        sink: &mut dyn DiagnosticSink,
    ) -> VoterDelegation {
        let derived = key_bytes(voting_key).and_then(|bytes| {
            self.codec
                .encode_verification_key(&bytes)
                .map_err(|e| e.to_string())
        });
        let derived_address = match derived {
            Ok(display) => Some(display),
            Err(e) => {
                sink.warn(
                    "normalize.voter_delegations",
                    format!("voting key has no display form: {e}"),
                );
                None
            }
        };
        VoterDelegation {
            voting_key: hex_text(voting_key),
            derived_address,
            weight,
        }
    }

    /// `(stake_pub, stake_key, stake_hex)` for a raw stake verification key.
    fn stake_fields(&self, value: &Value) -> Result<(String, String, String), String> {
        let key = key_bytes(value)?;
        let stake_pub = self
            .codec
            .encode_verification_key(&key)
            .map_err(|e| e.to_string())?;
        let credential = self
            .codec
            .hash_verification_key(&key)
            .map_err(|e| e.to_string())?;
        let address = self
            .codec
            .encode_address(&credential, self.config.network)
            .map_err(|e| e.to_string())?;
        Ok((stake_pub, address.display, hex::encode(address.bytes)))
    }

    // -----------------------------------------------------------------------
    // X.509 envelope
    // -----------------------------------------------------------------------

    fn x509_field(
        &self,
        record: &mut NormalizedMetadata,
        key: &Value,
        value: &Value,
        sink: &mut dyn DiagnosticSink,
    ) -> bool {
        let Some(index) = key_index(key) else {
            return false;
        };
        match index {
            0 => {
                let uuid = purpose_uuid_text(value);
                record.purpose_info = Some(purpose_info(&uuid));
                record.purpose_uuid = Some(uuid);
            }
            1 => record.txn_inputs_hash = Some(hex_text(value)),
            2 => record.previous_transaction_id = Some(hex_text(value)),
            99 => record.validation_signature = Some(hex_text(value)),
            _ => {
                let Some(compression) = compression_for_key(index) else {
                    return false;
                };
                let payload =
                    reconstruct_and_parse(value, compression, &self.config.limits.decompress);
                if let ChunkedPayload::Failed { error, .. } = &payload {
                    record_error(record, "x509_data", error.clone(), sink);
                }
                let rbac = payload.value().map(rbac::parse);
                if let Some(RbacParseResult::Failed { error }) = &rbac {
                    sink.error("normalize.rbac", format!("rbac structure: {error}"));
                }
                record.compression_type = Some(compression);
                record.x509_data = Some(X509Data { payload, rbac });
            }
        }
        true
    }

    fn apply_rbac_overrides(&self, record: &mut NormalizedMetadata, sink: &mut dyn DiagnosticSink) {
        let structure = record
            .x509_data
            .as_ref()
            .and_then(|d| d.rbac.as_ref())
            .and_then(RbacParseResult::structure)
            .cloned();

        if let Some(s) = &structure {
            if let Some(stake) = &s.stake_key {
                let stake_hex = match self.codec.decode_address(AddressInput::Text(stake)) {
                    Ok(decoded) => hex::encode(decoded.bytes),
                    Err(e) => {
                        sink.warn(
                            "normalize.stake_key",
                            format!("certificate stake address does not decode: {e}"),
                        );
                        String::new()
                    }
                };
                record.stake_key = Some(stake.clone());
                record.stake_hex = Some(stake_hex);
                record.stake_pub = Some(stake.clone());
            }
            if s.voter_delegations.is_some() {
                record.voter_delegations.clone_from(&s.voter_delegations);
            }
            if s.payment_address.is_some() {
                record.payment_address.clone_from(&s.payment_address);
            }
            if s.nonce.is_some() {
                record.nonce.clone_from(&s.nonce);
            }
            if s.voting_purpose.is_some() {
                record.voting_purpose.clone_from(&s.voting_purpose);
            }
        }

        record.x509_envelope = Some(X509Envelope {
            purpose_uuid: record.purpose_uuid.clone(),
            purpose_info: record.purpose_info.clone(),
            txn_inputs_hash: record.txn_inputs_hash.clone(),
            previous_transaction_id: record.previous_transaction_id.clone(),
            validation_signature: record.validation_signature.clone(),
            compression_type: record.compression_type,
            roles: structure.map(|s| s.roles).unwrap_or_default(),
        });
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Peel encodings off the root one layer at a time until a map appears.
    ///
    /// Each pass runs the resolver with `max_depth = 0`, so the children of
    /// a recovered map keep their raw form for field extraction.
    fn recover_map(
        &self,
        value: Value,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Vec<(Value, Value)>, EnvelopeError> {
        let shallow = RecoveryLimits {
            max_depth: 0,
            ..self.config.limits
        };
        let mut current = value;
        for _ in 0..=self.config.limits.max_depth {
            current = match current {
                Value::Map(entries) => return Ok(entries),
                Value::Tag(_, inner) => *inner,
                other => {
                    sink.debug(
                        "normalize",
                        format!("metadata root is {}; running recovery", other.kind()),
                    );
                    let next = resolve(other.clone(), &shallow, sink);
                    if next == other {
                        return Err(EnvelopeError::NotAMap { found: other.kind() });
                    }
                    next
                }
            };
        }
        match current {
            Value::Map(entries) => Ok(entries),
            other => Err(EnvelopeError::NotAMap { found: other.kind() }),
        }
    }
}

fn record_error(
    record: &mut NormalizedMetadata,
    field: &'static str,
    message: String,
    sink: &mut dyn DiagnosticSink,
) {
    sink.error(field_stage(field), format!("{field}: {message}"));
    record.field_errors.push(FieldError { field, message });
}

fn ok_or_record<T>(
    record: &mut NormalizedMetadata,
    field: &'static str,
    result: Result<T, String>,
    sink: &mut dyn DiagnosticSink,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(message) => {
            record_error(record, field, message, sink);
            None
        }
    }
}

fn field_stage(field: &'static str) -> &'static str {
    match field {
        "voter_delegations" => "normalize.voter_delegations",
        "stake_key" => "normalize.stake_key",
        "payment_address" => "normalize.payment_address",
        "x509_data" => "normalize.x509_data",
        _ => "normalize",
    }
}
