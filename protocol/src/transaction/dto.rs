//! Transactions from the node's REST representation.
//!
//! A node returns confirmed transactions as `{ "meta": ..., "transaction":
//! ... }`. `meta` becomes the [`TransactionInfo`]; `transaction` carries the
//! header fields plus the body fields of its type, named the way the node
//! names them. 64-bit values arrive as decimal strings, ids and keys as hex,
//! addresses as the 48-character hex of their raw bytes.
//!
//! Every malformed or missing field is an [`Error::InvalidFormat`] naming
//! the field.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::TransactionLimits;
use crate::crypto::keys::{PublicKey, Signature};
use crate::error::{Error, Result};
use crate::model::message::Message;
use crate::model::mosaic::{Mosaic, MosaicFlags, MosaicId, MosaicNonce};
use crate::model::namespace::NamespaceId;
use crate::model::network::NetworkType;
use crate::model::uint64::UInt64;
use crate::model::unresolved::{UnresolvedAddress, UnresolvedMosaicId};
use crate::transaction::aggregate::{AggregateBody, AggregateKind};
use crate::transaction::body::TransactionBody;
use crate::transaction::builder::{InnerTransaction, Transaction};
use crate::transaction::cosignature::AggregateCosignature;
use crate::transaction::deadline::Deadline;
use crate::transaction::header::TransactionInfo;
use crate::transaction::key_link::{KeyLinkBody, VotingKey, VotingKeyLinkBody};
use crate::transaction::lock::{HashLockBody, SecretLockBody, SecretProofBody};
use crate::transaction::metadata::{
    AccountMetadataBody, MetadataValue, MosaicMetadataBody, NamespaceMetadataBody,
};
use crate::transaction::mosaic::{
    MosaicDefinitionBody, MosaicSupplyChangeBody, MosaicSupplyRevocationBody,
};
use crate::transaction::multisig::MultisigAccountModificationBody;
use crate::transaction::namespace::{
    AddressAliasBody, MosaicAliasBody, NamespaceRegistration, NamespaceRegistrationBody,
};
use crate::transaction::restriction::{
    AccountRestrictionBody, MosaicAddressRestrictionBody, MosaicGlobalRestrictionBody,
};
use crate::transaction::transfer::TransferBody;
use crate::transaction::types::{
    AliasAction, LinkAction, LockHashAlgorithm, MosaicRestrictionType, MosaicSupplyChangeAction,
    NamespaceRegistrationType, TransactionType,
};

/// The `{ meta, transaction }` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionDto {
    #[serde(default)]
    pub meta: Option<TransactionInfo>,
    pub transaction: Map<String, Value>,
}

impl Transaction {
    /// Builds a transaction from the node's JSON.
    pub fn from_dto_json(json: &str) -> Result<Self> {
        let dto: TransactionDto = serde_json::from_str(json)
            .map_err(|e| Error::invalid_format(format!("transaction dto: {}", e)))?;
        Self::from_dto(&dto)
    }

    pub fn from_dto(dto: &TransactionDto) -> Result<Self> {
        let fields = Fields(&dto.transaction);
        let transaction_type = fields.transaction_type()?;
        let version = fields.u8("version")?;
        let network_type = fields.network_type()?;
        debug!(%transaction_type, version, "mapping transaction dto");

        let body = body_from_dto(&fields, transaction_type, version)?;
        check_encodable(&body, network_type)?;
        let tx = Self::from_parts(
            network_type,
            Deadline::from_adjusted(fields.uint64("deadline")?),
            fields.uint64("maxFee")?,
            fields.optional_signature("signature")?,
            fields.optional_public_key("signerPublicKey")?,
            body,
        );
        Ok(match &dto.meta {
            Some(info) => tx.with_info(info.clone()),
            None => tx,
        })
    }
}

impl InnerTransaction {
    pub fn from_dto(dto: &TransactionDto) -> Result<Self> {
        let fields = Fields(&dto.transaction);
        let transaction_type = fields.transaction_type()?;
        if transaction_type.is_aggregate() {
            return Err(Error::invalid_format("aggregate embedded in an aggregate"));
        }
        let version = fields.u8("version")?;
        let network_type = fields.network_type()?;
        let body = body_from_dto(&fields, transaction_type, version)?;
        check_encodable(&body, network_type)?;
        let inner = Self {
            signer: fields.public_key("signerPublicKey")?,
            network_type,
            body,
            info: None,
        };
        Ok(match &dto.meta {
            Some(info) => inner.with_info(info.clone()),
            None => inner,
        })
    }
}

/// A body read from JSON must fit the wire before anything encodes it.
fn check_encodable(body: &TransactionBody, network_type: NetworkType) -> Result<()> {
    body.validate(network_type, &TransactionLimits::wire())
        .map_err(|e| Error::invalid_format(format!("transaction dto: {}", e)))
}

// ---------------------------------------------------------------------------
// Field access
// ---------------------------------------------------------------------------

struct Fields<'a>(&'a Map<String, Value>);

fn bad(name: &str, detail: impl std::fmt::Display) -> Error {
    Error::invalid_format(format!("field '{}': {}", name, detail))
}

impl<'a> Fields<'a> {
    fn get(&self, name: &str) -> Result<&'a Value> {
        self.0.get(name).ok_or_else(|| bad(name, "missing"))
    }

    fn parse<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Result<T> {
        T::deserialize(self.get(name)?).map_err(|e| bad(name, e))
    }

    fn str(&self, name: &str) -> Result<&'a str> {
        self.get(name)?.as_str().ok_or_else(|| bad(name, "expected a string"))
    }

    fn u8(&self, name: &str) -> Result<u8> {
        self.parse(name)
    }

    fn uint64(&self, name: &str) -> Result<UInt64> {
        self.parse(name)
    }

    fn hex_uint64(&self, name: &str) -> Result<UInt64> {
        UInt64::from_hex(self.str(name)?).map_err(|e| bad(name, e))
    }

    fn bytes(&self, name: &str) -> Result<Vec<u8>> {
        hex::decode(self.str(name)?).map_err(|e| bad(name, e))
    }

    fn hash(&self, name: &str) -> Result<[u8; 32]> {
        let bytes = self.bytes(name)?;
        bytes.as_slice().try_into().map_err(|_| bad(name, "expected 32 bytes"))
    }

    fn public_key(&self, name: &str) -> Result<PublicKey> {
        PublicKey::from_hex(self.str(name)?).map_err(|e| bad(name, e))
    }

    /// Absent or all-zero keys mean "not signed".
    fn optional_public_key(&self, name: &str) -> Result<Option<PublicKey>> {
        if !self.0.contains_key(name) {
            return Ok(None);
        }
        let key = self.public_key(name)?;
        Ok((!key.is_zero()).then_some(key))
    }

    fn optional_signature(&self, name: &str) -> Result<Option<Signature>> {
        if !self.0.contains_key(name) {
            return Ok(None);
        }
        let signature = Signature::from_hex(self.str(name)?).map_err(|e| bad(name, e))?;
        Ok((!signature.is_zero()).then_some(signature))
    }

    fn address(&self, name: &str) -> Result<UnresolvedAddress> {
        UnresolvedAddress::from_encoded(self.str(name)?).map_err(|e| bad(name, e))
    }

    fn addresses(&self, name: &str) -> Result<Vec<UnresolvedAddress>> {
        self.list(name, |v| {
            let hex = v.as_str().ok_or_else(|| bad(name, "expected hex addresses"))?;
            UnresolvedAddress::from_encoded(hex).map_err(|e| bad(name, e))
        })
    }

    fn mosaic_id(&self, name: &str) -> Result<UnresolvedMosaicId> {
        UnresolvedMosaicId::from_hex(self.str(name)?).map_err(|e| bad(name, e))
    }

    fn namespace_id(&self, name: &str) -> Result<NamespaceId> {
        NamespaceId::from_hex(self.str(name)?).map_err(|e| bad(name, e))
    }

    fn list<T>(&self, name: &str, mut item: impl FnMut(&'a Value) -> Result<T>) -> Result<Vec<T>> {
        match self.0.get(name) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(values)) => values.iter().map(&mut item).collect(),
            Some(_) => Err(bad(name, "expected an array")),
        }
    }

    fn enum_u8<T: TryFrom<u8, Error = Error>>(&self, name: &str) -> Result<T> {
        T::try_from(self.u8(name)?).map_err(|e| bad(name, e))
    }

    fn transaction_type(&self) -> Result<TransactionType> {
        let raw: u16 = self.parse("type")?;
        TransactionType::try_from(raw).map_err(|e| bad("type", e))
    }

    fn network_type(&self) -> Result<NetworkType> {
        self.parse("network")
    }

    fn mosaic(&self, id: &str, amount: &str) -> Result<Mosaic> {
        Ok(Mosaic::new(self.mosaic_id(id)?, self.uint64(amount)?))
    }

    fn metadata(&self) -> Result<MetadataValue> {
        Ok(MetadataValue::new(
            self.address("targetAddress")?,
            self.hex_uint64("scopedMetadataKey")?,
            self.parse::<i16>("valueSizeDelta")?,
            self.bytes("value")?,
        ))
    }

    fn account_restriction<F, V>(
        &self,
        value: impl Fn(&'a Value) -> Result<V>,
    ) -> Result<AccountRestrictionBody<F, V>>
    where
        F: TryFrom<u16, Error = Error>,
    {
        let raw: u16 = self.parse("restrictionFlags")?;
        Ok(AccountRestrictionBody {
            flags: F::try_from(raw).map_err(|e| bad("restrictionFlags", e))?,
            additions: self.list("restrictionAdditions", &value)?,
            deletions: self.list("restrictionDeletions", &value)?,
        })
    }
}

fn message_from_dto(value: Option<&Value>) -> Result<Message> {
    let Some(Value::Object(map)) = value else {
        return Ok(Message::empty());
    };
    let fields = Fields(map);
    let mut bytes = vec![fields.u8("type")?];
    bytes.extend(fields.bytes("payload")?);
    Ok(Message::from_bytes(&bytes))
}

fn mosaic_from_dto(value: &Value) -> Result<Mosaic> {
    let Value::Object(map) = value else {
        return Err(bad("mosaics", "expected objects"));
    };
    Fields(map).mosaic("id", "amount")
}

fn cosignature_from_dto(value: &Value) -> Result<AggregateCosignature> {
    let Value::Object(map) = value else {
        return Err(bad("cosignatures", "expected objects"));
    };
    let f = Fields(map);
    let version = match map.get("version") {
        Some(_) => f.uint64("version")?.value(),
        None => 0,
    };
    Ok(AggregateCosignature {
        version,
        signer: f.public_key("signerPublicKey")?,
        signature: Signature::from_hex(f.str("signature")?).map_err(|e| bad("signature", e))?,
    })
}

fn inner_from_dto(value: &Value) -> Result<InnerTransaction> {
    let dto: TransactionDto = serde_json::from_value(value.clone()).map_err(|e| bad("transactions", e))?;
    InnerTransaction::from_dto(&dto)
}

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

fn body_from_dto(f: &Fields<'_>, transaction_type: TransactionType, version: u8) -> Result<TransactionBody> {
    if !transaction_type.supported_versions().contains(&version) {
        return Err(Error::invalid_format(format!(
            "unsupported version {} for {}",
            version, transaction_type
        )));
    }

    Ok(match transaction_type {
        TransactionType::Transfer => TransactionBody::Transfer(TransferBody::new(
            f.address("recipientAddress")?,
            f.list("mosaics", mosaic_from_dto)?,
            message_from_dto(f.0.get("message"))?,
        )),
        TransactionType::NamespaceRegistration => {
            let registration = match f.enum_u8::<NamespaceRegistrationType>("registrationType")? {
                NamespaceRegistrationType::RootNamespace => NamespaceRegistration::Root {
                    duration: f.uint64("duration")?,
                },
                NamespaceRegistrationType::SubNamespace => NamespaceRegistration::Sub {
                    parent_id: f.namespace_id("parentId")?,
                },
            };
            let name = String::from_utf8(f.bytes("name")?).map_err(|e| bad("name", e))?;
            TransactionBody::NamespaceRegistration(NamespaceRegistrationBody {
                registration,
                id: f.namespace_id("id")?,
                name,
            })
        }
        TransactionType::AddressAlias => {
            let address = f
                .address("address")?
                .as_address()
                .copied()
                .ok_or_else(|| bad("address", "alias targets must be canonical"))?;
            TransactionBody::AddressAlias(AddressAliasBody::new(
                f.enum_u8::<AliasAction>("aliasAction")?,
                f.namespace_id("namespaceId")?,
                address,
            ))
        }
        TransactionType::MosaicAlias => TransactionBody::MosaicAlias(MosaicAliasBody::new(
            f.enum_u8::<AliasAction>("aliasAction")?,
            f.namespace_id("namespaceId")?,
            MosaicId::from_hex(f.str("mosaicId")?).map_err(|e| bad("mosaicId", e))?,
        )),
        TransactionType::MosaicDefinition => TransactionBody::MosaicDefinition(MosaicDefinitionBody {
            id: MosaicId::from_hex(f.str("id")?).map_err(|e| bad("id", e))?,
            duration: f.uint64("duration")?,
            nonce: MosaicNonce::new(f.parse("nonce")?),
            flags: MosaicFlags::from_byte(f.u8("flags")?),
            divisibility: f.u8("divisibility")?,
        }),
        TransactionType::MosaicSupplyChange => TransactionBody::MosaicSupplyChange(MosaicSupplyChangeBody::new(
            f.mosaic_id("mosaicId")?,
            f.enum_u8::<MosaicSupplyChangeAction>("action")?,
            f.uint64("delta")?,
        )),
        TransactionType::MosaicSupplyRevocation => {
            TransactionBody::MosaicSupplyRevocation(MosaicSupplyRevocationBody::new(
                f.address("sourceAddress")?,
                f.mosaic("mosaicId", "amount")?,
            ))
        }
        TransactionType::MultisigAccountModification => {
            TransactionBody::MultisigAccountModification(MultisigAccountModificationBody::new(
                f.parse("minApprovalDelta")?,
                f.parse("minRemovalDelta")?,
                f.addresses("addressAdditions")?,
                f.addresses("addressDeletions")?,
            ))
        }
        TransactionType::AggregateComplete | TransactionType::AggregateBonded => {
            let kind = if transaction_type == TransactionType::AggregateComplete {
                AggregateKind::Complete
            } else {
                AggregateKind::Bonded
            };
            TransactionBody::Aggregate(AggregateBody {
                kind,
                version,
                inner_transactions: f.list("transactions", inner_from_dto)?,
                cosignatures: f.list("cosignatures", cosignature_from_dto)?,
            })
        }
        TransactionType::HashLock => TransactionBody::HashLock(HashLockBody {
            mosaic: f.mosaic("mosaicId", "amount")?,
            duration: f.uint64("duration")?,
            hash: f.hash("hash")?,
        }),
        TransactionType::SecretLock => TransactionBody::SecretLock(SecretLockBody::new(
            f.address("recipientAddress")?,
            f.mosaic("mosaicId", "amount")?,
            f.uint64("duration")?,
            f.enum_u8::<LockHashAlgorithm>("hashAlgorithm")?,
            f.hash("secret")?,
        )),
        TransactionType::SecretProof => TransactionBody::SecretProof(SecretProofBody::new(
            f.address("recipientAddress")?,
            f.enum_u8::<LockHashAlgorithm>("hashAlgorithm")?,
            f.hash("secret")?,
            f.bytes("proof")?,
        )),
        TransactionType::AccountAddressRestriction => {
            TransactionBody::AccountAddressRestriction(f.account_restriction(|v| {
                let hex = v.as_str().ok_or_else(|| bad("restrictionAdditions", "expected hex"))?;
                UnresolvedAddress::from_encoded(hex).map_err(|e| bad("restrictionAdditions", e))
            })?)
        }
        TransactionType::AccountMosaicRestriction => {
            TransactionBody::AccountMosaicRestriction(f.account_restriction(|v| {
                let hex = v.as_str().ok_or_else(|| bad("restrictionAdditions", "expected hex"))?;
                UnresolvedMosaicId::from_hex(hex).map_err(|e| bad("restrictionAdditions", e))
            })?)
        }
        TransactionType::AccountOperationRestriction => {
            TransactionBody::AccountOperationRestriction(f.account_restriction(|v| {
                TransactionType::deserialize(v).map_err(|e| bad("restrictionAdditions", e))
            })?)
        }
        TransactionType::AccountKeyLink => TransactionBody::AccountKeyLink(key_link_from_dto(f)?),
        TransactionType::NodeKeyLink => TransactionBody::NodeKeyLink(key_link_from_dto(f)?),
        TransactionType::VrfKeyLink => TransactionBody::VrfKeyLink(key_link_from_dto(f)?),
        TransactionType::VotingKeyLink => {
            let linked_public_key =
                VotingKey::from_hex(f.str("linkedPublicKey")?).map_err(|e| bad("linkedPublicKey", e))?;
            if linked_public_key.version() != version {
                return Err(bad(
                    "linkedPublicKey",
                    format!("key length does not match version {}", version),
                ));
            }
            TransactionBody::VotingKeyLink(VotingKeyLinkBody::new(
                linked_public_key,
                f.parse("startEpoch")?,
                f.parse("endEpoch")?,
                f.enum_u8::<LinkAction>("linkAction")?,
            ))
        }
        TransactionType::AccountMetadata => {
            TransactionBody::AccountMetadata(AccountMetadataBody::new(f.metadata()?))
        }
        TransactionType::MosaicMetadata => TransactionBody::MosaicMetadata(MosaicMetadataBody::new(
            f.metadata()?,
            f.mosaic_id("targetMosaicId")?,
        )),
        TransactionType::NamespaceMetadata => TransactionBody::NamespaceMetadata(NamespaceMetadataBody::new(
            f.metadata()?,
            f.namespace_id("targetNamespaceId")?,
        )),
        TransactionType::MosaicGlobalRestriction => {
            TransactionBody::MosaicGlobalRestriction(MosaicGlobalRestrictionBody {
                mosaic_id: f.mosaic_id("mosaicId")?,
                reference_mosaic_id: f.mosaic_id("referenceMosaicId")?,
                restriction_key: f.hex_uint64("restrictionKey")?,
                previous_restriction_value: f.uint64("previousRestrictionValue")?,
                new_restriction_value: f.uint64("newRestrictionValue")?,
                previous_restriction_type: f.enum_u8::<MosaicRestrictionType>("previousRestrictionType")?,
                new_restriction_type: f.enum_u8::<MosaicRestrictionType>("newRestrictionType")?,
            })
        }
        TransactionType::MosaicAddressRestriction => {
            TransactionBody::MosaicAddressRestriction(MosaicAddressRestrictionBody {
                mosaic_id: f.mosaic_id("mosaicId")?,
                restriction_key: f.hex_uint64("restrictionKey")?,
                previous_restriction_value: f.uint64("previousRestrictionValue")?,
                new_restriction_value: f.uint64("newRestrictionValue")?,
                target_address: f.address("targetAddress")?,
            })
        }
    })
}

fn key_link_from_dto(f: &Fields<'_>) -> Result<KeyLinkBody> {
    Ok(KeyLinkBody::new(
        f.public_key("linkedPublicKey")?,
        f.enum_u8::<LinkAction>("linkAction")?,
    ))
}
