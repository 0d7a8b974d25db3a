//! Shared fixtures for the validator test modules.

use std::sync::Arc;

use shared_types::{
    now_ms, AdminEntry, Attestation, AttestationResponse, InMemoryStateStore, NodeEntry,
    PreTransaction,
};
use tr_01_identity::{IdentityProvider, IdentityStrategy, NetworkKeypairIdentity};

use crate::domain::value_objects::AttestationConfig;

pub(crate) struct Fixture {
    pub node: Arc<IdentityProvider>,
    pub admin: NetworkKeypairIdentity,
    pub validator: NetworkKeypairIdentity,
    pub issuer: NetworkKeypairIdentity,
    pub state: Arc<InMemoryStateStore>,
    pub config: AttestationConfig,
    pub admin_wk: [u8; 32],
    pub validator_wk: [u8; 32],
}

impl Fixture {
    /// A node with a registered admin and one writer validator.
    pub fn new() -> Self {
        let node = Arc::new(IdentityProvider::new(IdentityStrategy::NetworkKeypair(
            Arc::new(NetworkKeypairIdentity::generate()),
        )));
        let admin = NetworkKeypairIdentity::generate();
        let validator = NetworkKeypairIdentity::generate();
        let state = Arc::new(InMemoryStateStore::new());

        let admin_wk = [0xA1; 32];
        let validator_wk = [0xB2; 32];

        state.set_admin_entry(AdminEntry {
            address: admin.address().clone(),
            wk: admin_wk,
        });
        state.put_node_entry(NodeEntry {
            address: validator.address().clone(),
            wk: validator_wk,
            is_writer: true,
            is_indexer: false,
        });

        Self {
            node,
            admin,
            validator,
            issuer: NetworkKeypairIdentity::generate(),
            state,
            config: AttestationConfig::default(),
            admin_wk,
            validator_wk,
        }
    }

    fn response(&self, signer: &NetworkKeypairIdentity, wk: [u8; 32]) -> AttestationResponse {
        AttestationResponse {
            wk: hex::encode(wk),
            address: signer.address().to_string(),
            nonce: "bb".repeat(8),
            channel: self.config.channel.clone(),
            issuer: hex::encode(self.node.public_key()),
            timestamp: now_ms(),
        }
    }

    fn sign(signer: &NetworkKeypairIdentity, response: AttestationResponse) -> Attestation {
        let hash = response.signing_hash().unwrap();
        Attestation {
            sig: hex::encode(signer.sign(&hash)),
            response,
        }
    }

    /// Attestation from the registered validator, signed after `mutate`.
    pub fn validator_attestation(
        &self,
        mutate: impl FnOnce(&mut AttestationResponse),
    ) -> Attestation {
        let mut response = self.response(&self.validator, self.validator_wk);
        mutate(&mut response);
        Self::sign(&self.validator, response)
    }

    /// Attestation from the registered admin, signed after `mutate`.
    pub fn admin_attestation(&self, mutate: impl FnOnce(&mut AttestationResponse)) -> Attestation {
        let mut response = self.response(&self.admin, self.admin_wk);
        mutate(&mut response);
        Self::sign(&self.admin, response)
    }

    /// Proposal addressed to this node, hashed and signed after `mutate`.
    pub fn pre_transaction(&self, mutate: impl FnOnce(&mut PreTransaction)) -> PreTransaction {
        let mut pre = PreTransaction {
            bs: "01".repeat(32),
            mbs: "02".repeat(32),
            va: self.node.address().to_string(),
            iw: "03".repeat(32),
            ia: self.issuer.address().to_string(),
            ch: "04".repeat(32),
            index: "05".repeat(32),
            tx: String::new(),
            is: String::new(),
        };
        mutate(&mut pre);

        let tx = pre.compute_hash().unwrap();
        pre.tx = hex::encode(tx);
        pre.is = hex::encode(self.issuer.sign(&tx));
        pre
    }
}
