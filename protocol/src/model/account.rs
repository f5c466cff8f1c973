//! Accounts: a public key bound to a network, and the signing account that
//! owns the private half.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::keys::{KeyPair, PublicKey, SignSchema, Signature};
use crate::error::Result;
use crate::model::address::Address;
use crate::model::network::NetworkType;

/// A public key on a specific network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAccount {
    pub public_key: PublicKey,
    pub network_type: NetworkType,
}

impl PublicAccount {
    pub fn new(public_key: PublicKey, network_type: NetworkType) -> Self {
        Self {
            public_key,
            network_type,
        }
    }

    /// Parses a hex public key.
    pub fn from_public_key(public_key: &str, network_type: NetworkType) -> Result<Self> {
        Ok(Self::new(PublicKey::from_hex(public_key)?, network_type))
    }

    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key, self.network_type)
    }

    pub fn verify_signature(&self, data: &[u8], signature: &Signature) -> bool {
        self.public_key.verify(data, signature)
    }
}

impl fmt::Display for PublicAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.public_key, self.network_type)
    }
}

/// An account able to sign: a key pair plus its network and scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    key_pair: KeyPair,
    network_type: NetworkType,
    schema: SignSchema,
}

impl Account {
    /// Generates a fresh catapult account.
    pub fn generate(network_type: NetworkType) -> Self {
        Self::from_key_pair(KeyPair::generate(), network_type)
    }

    /// Loads a catapult account from a hex private key.
    pub fn from_private_key(private_key: &str, network_type: NetworkType) -> Result<Self> {
        Ok(Self::from_key_pair(KeyPair::from_hex(private_key)?, network_type))
    }

    pub fn from_key_pair(key_pair: KeyPair, network_type: NetworkType) -> Self {
        Self {
            key_pair,
            network_type,
            schema: SignSchema::Catapult,
        }
    }

    /// Same key, different message key-derivation scheme.
    pub fn with_schema(mut self, schema: SignSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    pub fn network_type(&self) -> NetworkType {
        self.network_type
    }

    pub fn schema(&self) -> SignSchema {
        self.schema
    }

    pub fn public_key(&self) -> PublicKey {
        self.key_pair.public_key()
    }

    pub fn public_account(&self) -> PublicAccount {
        PublicAccount::new(self.public_key(), self.network_type)
    }

    pub fn address(&self) -> Address {
        self.public_account().address()
    }

    pub fn sign_data(&self, data: &[u8]) -> Signature {
        self.key_pair.sign(data)
    }
}
