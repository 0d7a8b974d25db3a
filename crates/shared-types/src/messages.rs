//! # Wire Messages
//!
//! Proposals, operation messages and the envelope exchanged over protocol
//! sessions.
//!
//! ## Operation Payload Table
//!
//! Each operation type stores its transaction hash in a fixed payload
//! object:
//!
//! | Operation type | Payload field |
//! |----------------|---------------|
//! | `Transaction` | `txo` |
//! | `BootstrapDeployment` | `bdo` |
//! | `AddWriter`, `RemoveWriter`, `AdminRecovery` | `eko` |
//! | `AddIndexer`, `RemoveIndexer`, `AppendWhitelist`, `BanValidator` | `aco` |
//! | `Transfer` | `tro` |

use serde::{Deserialize, Serialize};

use crate::attestation::Attestation;
use crate::entities::Hash;
use crate::errors::MessageError;
use crate::hashing::{decode_fixed, decode_hex, hash_fields};

// =============================================================================
// PROPOSED TRANSACTION
// =============================================================================

/// A proposed transaction awaiting validator acceptance.
///
/// All byte fields travel as lowercase hex; `va` and `ia` are checksum
/// addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreTransaction {
    /// Base-state reference.
    pub bs: String,
    /// Secondary base-state reference.
    pub mbs: String,
    /// Address of the validator the proposal is addressed to.
    pub va: String,
    /// Issuer writing key.
    pub iw: String,
    /// Issuer address.
    pub ia: String,
    /// Channel identifier.
    pub ch: String,
    /// Nonce.
    #[serde(rename = "in")]
    pub index: String,
    /// Transaction hash.
    pub tx: String,
    /// Issuer signature over the raw bytes of `tx`.
    pub is: String,
}

impl PreTransaction {
    /// Recompute the deterministic hash over `(bs, mbs, va, iw, ia, ch, in)`.
    ///
    /// Hex fields are decoded before hashing; addresses are hashed as their
    /// UTF-8 bytes.
    pub fn compute_hash(&self) -> Result<Hash, MessageError> {
        let bs = decode_hex("bs", &self.bs)?;
        let mbs = decode_hex("mbs", &self.mbs)?;
        let iw = decode_hex("iw", &self.iw)?;
        let ch = decode_hex("ch", &self.ch)?;
        let index = decode_hex("in", &self.index)?;

        Ok(hash_fields(&[
            &bs,
            &mbs,
            self.va.as_bytes(),
            &iw,
            self.ia.as_bytes(),
            &ch,
            &index,
        ]))
    }

    /// The supplied `tx` field as raw bytes.
    pub fn tx_bytes(&self) -> Result<Hash, MessageError> {
        decode_fixed::<32>("tx", &self.tx)
    }
}

// =============================================================================
// OPERATION MESSAGES
// =============================================================================

/// Operation types relayed to validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationType {
    Transaction,
    BootstrapDeployment,
    AddWriter,
    RemoveWriter,
    AdminRecovery,
    AddIndexer,
    RemoveIndexer,
    AppendWhitelist,
    BanValidator,
    Transfer,
}

impl OperationType {
    /// Name of the payload object that carries this operation's `tx`.
    pub const fn payload_field(self) -> &'static str {
        match self {
            OperationType::Transaction => "txo",
            OperationType::BootstrapDeployment => "bdo",
            OperationType::AddWriter | OperationType::RemoveWriter | OperationType::AdminRecovery => {
                "eko"
            }
            OperationType::AddIndexer
            | OperationType::RemoveIndexer
            | OperationType::AppendWhitelist
            | OperationType::BanValidator => "aco",
            OperationType::Transfer => "tro",
        }
    }
}

/// Completed transaction operation (`txo`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOperation {
    pub tx: String,
    pub is: String,
    /// Validator signature.
    pub vs: String,
    pub iw: String,
    #[serde(rename = "in")]
    pub index: String,
    pub ch: String,
    pub bs: String,
    pub mbs: String,
    pub va: String,
}

/// Bootstrap deployment operation (`bdo`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapDeploymentOperation {
    pub tx: String,
    pub bs: String,
    /// Channel the deployment opens.
    pub ic: String,
    #[serde(rename = "in")]
    pub index: String,
    pub is: String,
}

/// Writing-key operation (`eko`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyOperation {
    pub tx: String,
    pub wk: String,
    #[serde(rename = "in")]
    pub index: String,
    pub is: String,
}

/// Admin control operation (`aco`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminControlOperation {
    pub tx: String,
    /// Target address.
    pub ia: String,
    #[serde(rename = "in")]
    pub index: String,
    pub is: String,
}

/// Transfer operation (`tro`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOperation {
    pub tx: String,
    pub to: String,
    /// Amount, hex.
    pub am: String,
    #[serde(rename = "in")]
    pub index: String,
    pub is: String,
}

/// The payload object of an operation message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationPayload {
    #[serde(rename = "txo")]
    Transaction(TransactionOperation),
    #[serde(rename = "bdo")]
    BootstrapDeployment(BootstrapDeploymentOperation),
    #[serde(rename = "eko")]
    Key(KeyOperation),
    #[serde(rename = "aco")]
    AdminControl(AdminControlOperation),
    #[serde(rename = "tro")]
    Transfer(TransferOperation),
}

impl OperationPayload {
    /// Name of this payload object on the wire.
    pub const fn field(&self) -> &'static str {
        match self {
            OperationPayload::Transaction(_) => "txo",
            OperationPayload::BootstrapDeployment(_) => "bdo",
            OperationPayload::Key(_) => "eko",
            OperationPayload::AdminControl(_) => "aco",
            OperationPayload::Transfer(_) => "tro",
        }
    }

    /// The hex transaction hash carried by this payload.
    pub fn tx(&self) -> &str {
        match self {
            OperationPayload::Transaction(op) => &op.tx,
            OperationPayload::BootstrapDeployment(op) => &op.tx,
            OperationPayload::Key(op) => &op.tx,
            OperationPayload::AdminControl(op) => &op.tx,
            OperationPayload::Transfer(op) => &op.tx,
        }
    }
}

/// An operation relayed to a validator for inclusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationMessage {
    #[serde(rename = "type")]
    pub op_type: OperationType,
    /// Address of the requesting node.
    pub address: String,
    pub payload: OperationPayload,
}

impl OperationMessage {
    /// Transaction hash used as the confirmation key in the state store.
    ///
    /// The payload object must be the one the operation type maps to.
    pub fn tx_hash(&self) -> Result<Hash, MessageError> {
        let expected = self.op_type.payload_field();
        let found = self.payload.field();
        if expected != found {
            return Err(MessageError::PayloadMismatch {
                op_type: format!("{:?}", self.op_type),
                expected,
                found,
            });
        }
        decode_fixed::<32>("tx", self.payload.tx())
    }
}

// =============================================================================
// SESSION ENVELOPE
// =============================================================================

/// Messages carried over a protocol session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkMessage {
    /// Operation relayed for inclusion.
    Operation(OperationMessage),
    /// Proposal addressed to a validator.
    PreTransaction(PreTransaction),
    /// Admin attestation.
    AdminAttestation(Attestation),
    /// Validator attestation.
    ValidatorAttestation(Attestation),
    /// Reply to a proposal or attestation.
    Ack { accepted: bool },
}

impl NetworkMessage {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            NetworkMessage::Operation(_) => "operation",
            NetworkMessage::PreTransaction(_) => "pre_transaction",
            NetworkMessage::AdminAttestation(_) => "admin_attestation",
            NetworkMessage::ValidatorAttestation(_) => "validator_attestation",
            NetworkMessage::Ack { .. } => "ack",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_operation(op_type: OperationType, tx: &str) -> OperationMessage {
        OperationMessage {
            op_type,
            address: "peer".into(),
            payload: OperationPayload::Key(KeyOperation {
                tx: tx.into(),
                wk: "00".repeat(32),
                index: "01".repeat(32),
                is: "02".repeat(64),
            }),
        }
    }

    #[test]
    fn test_payload_table() {
        assert_eq!(OperationType::Transaction.payload_field(), "txo");
        assert_eq!(OperationType::BootstrapDeployment.payload_field(), "bdo");
        assert_eq!(OperationType::AddWriter.payload_field(), "eko");
        assert_eq!(OperationType::RemoveWriter.payload_field(), "eko");
        assert_eq!(OperationType::AddIndexer.payload_field(), "aco");
        assert_eq!(OperationType::BanValidator.payload_field(), "aco");
        assert_eq!(OperationType::Transfer.payload_field(), "tro");
    }

    #[test]
    fn test_tx_hash_reads_mapped_payload() {
        let tx = "ab".repeat(32);
        let message = key_operation(OperationType::AddWriter, &tx);
        assert_eq!(message.tx_hash().unwrap(), [0xAB; 32]);
    }

    #[test]
    fn test_tx_hash_rejects_mismatched_payload() {
        let message = key_operation(OperationType::Transfer, &"ab".repeat(32));
        assert!(matches!(
            message.tx_hash(),
            Err(MessageError::PayloadMismatch {
                expected: "tro",
                found: "eko",
                ..
            })
        ));
    }

    #[test]
    fn test_tx_hash_rejects_short_hash() {
        let message = key_operation(OperationType::AddWriter, "abcd");
        assert!(matches!(
            message.tx_hash(),
            Err(MessageError::InvalidLength { field: "tx", .. })
        ));
    }

    #[test]
    fn test_json_shape_uses_wire_names() {
        let message = key_operation(OperationType::AddWriter, &"ab".repeat(32));
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["type"], "AddWriter");
        assert!(json["payload"]["eko"]["in"].is_string());
    }

    #[test]
    fn test_pre_transaction_hash_covers_every_field() {
        let base = PreTransaction {
            bs: "01".repeat(32),
            mbs: "02".repeat(32),
            va: "validator".into(),
            iw: "03".repeat(32),
            ia: "issuer".into(),
            ch: "04".repeat(32),
            index: "05".repeat(32),
            tx: String::new(),
            is: String::new(),
        };
        let reference = base.compute_hash().unwrap();

        let mut changed = base.clone();
        changed.index = "06".repeat(32);
        assert_ne!(changed.compute_hash().unwrap(), reference);

        let mut changed = base.clone();
        changed.va = "other".into();
        assert_ne!(changed.compute_hash().unwrap(), reference);

        // tx and is are not part of the hashed fields.
        let mut changed = base;
        changed.tx = "ff".repeat(32);
        assert_eq!(changed.compute_hash().unwrap(), reference);
    }
}
