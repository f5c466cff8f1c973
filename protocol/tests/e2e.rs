//! End-to-end tests for the transaction lifecycle.
//!
//! Each test goes through the public API only: build a transaction, sign it
//! for a network, read the payload back, and resolve aliases against a block
//! statement. No test depends on another's state.

use catapult_tx::config::NetworkConfig;
use catapult_tx::crypto::PublicKey;
use catapult_tx::model::{
    Account, Address, Message, Mosaic, MosaicId, NamespaceId, NetworkType, PublicAccount, UInt64,
    UnresolvedAddress, UnresolvedMosaicId,
};
use catapult_tx::receipt::{ReceiptSource, ResolutionEntry, ResolutionStatement, Statement};
use catapult_tx::transaction::{
    transaction_hash, verify_signed_transaction, CosignatureTransaction, Deadline, DeadlineUnit,
    KeyLinkBody, LinkAction, MosaicSupplyRevocationBody, Transaction, TransactionBody,
    TransactionBuilder, TransactionInfo, TransferBody,
};
use catapult_tx::ErrorKind;

const PRIVATE_KEY: &str = "575DBB3062267EFF57C970A336EBBC8FBCFE12C5BD3ED7BC11EB0481D7704CED";
const LINKED_KEY: &str = "F6503F78FBF99544B906872DDB392F4BE707180D285E7919DBACEF2E9573B1E6";
const GENERATION_HASH: [u8; 32] = [0x57; 32];

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// Routes `tracing` output through the test harness. Safe to call from
/// every test; only the first call installs the subscriber.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn signer() -> Account {
    Account::from_private_key(PRIVATE_KEY, NetworkType::TestNet).expect("valid private key")
}

fn address_of(byte: u8) -> Address {
    PublicAccount::new(PublicKey::from_bytes([byte; 32]), NetworkType::TestNet).address()
}

fn key_link() -> Transaction {
    let linked = PublicKey::from_hex(LINKED_KEY).expect("valid key");
    TransactionBuilder::new(
        NetworkType::TestNet,
        TransactionBody::AccountKeyLink(KeyLinkBody::new(linked, LinkAction::Link)),
    )
    .deadline(Deadline::from_adjusted(1u64))
    .build()
    .expect("valid key link")
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[test]
fn account_key_link_layout_is_byte_exact() {
    init_tracing();
    let account = signer();
    let signed = key_link().sign_with(&account, &GENERATION_HASH).unwrap();

    let payload = signed.payload_bytes().unwrap();
    assert_eq!(payload.len(), 161);
    assert_eq!(payload.len(), key_link().size());

    // size, then the reserved word
    assert_eq!(&signed.payload[..16], "A100000000000000");
    // signer slot
    assert_eq!(&payload[72..104], account.public_key().as_bytes());
    // reserved, version 1, testnet, type 0x414C, fee 0, deadline 1
    assert_eq!(
        hex::encode_upper(&payload[104..128]),
        "0000000001984C4100000000000000000100000000000000"
    );
    // body: linked key then the link action
    assert!(signed.payload.ends_with(&format!("{}01", LINKED_KEY)));

    assert_eq!(signed.hash.len(), 64);
    assert!(signed.hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
    assert_eq!(
        signed.hash,
        hex::encode_upper(transaction_hash(&payload, &GENERATION_HASH).unwrap())
    );
}

#[test]
fn transaction_hash_known_answer() {
    // AccountKeyLink with R = 0x11.., S = 0x22.., signer = 0x33..
    let payload = hex::decode(concat!(
        "A100000000000000",
        "1111111111111111111111111111111111111111111111111111111111111111",
        "2222222222222222222222222222222222222222222222222222222222222222",
        "3333333333333333333333333333333333333333333333333333333333333333",
        "0000000001984C4100000000000000000100000000000000",
        "F6503F78FBF99544B906872DDB392F4BE707180D285E7919DBACEF2E9573B1E601",
    ))
    .unwrap();
    let expected = "622910E2EF311BB2F8FC26F0BC2C27D3931C716E996076BABB26A2AED756A6F9";
    assert_eq!(hex::encode_upper(transaction_hash(&payload, &GENERATION_HASH).unwrap()), expected);

    // Only the R half of the signature is hashed.
    let mut other_s = payload.clone();
    other_s[40..72].copy_from_slice(&[0x44; 32]);
    assert_eq!(hex::encode_upper(transaction_hash(&other_s, &GENERATION_HASH).unwrap()), expected);

    let decoded = Transaction::from_payload(&payload).unwrap();
    assert_eq!(decoded.signer(), Some(&PublicKey::from_bytes([0x33; 32])));
    assert_eq!(decoded.serialize(), payload);
}

#[test]
fn signing_is_deterministic_per_network() {
    let account = signer();
    let a = key_link().sign_with(&account, &GENERATION_HASH).unwrap();
    let b = key_link().sign_with(&account, &GENERATION_HASH).unwrap();
    assert_eq!(a, b);

    let other = key_link().sign_with(&account, &[0x58; 32]).unwrap();
    assert_ne!(a.hash, other.hash);
    assert_ne!(a.payload, other.payload);
}

#[test]
fn signed_payload_decodes_and_verifies() {
    let account = signer();
    let signed = key_link().sign_with(&account, &GENERATION_HASH).unwrap();

    let decoded = Transaction::from_hex(&signed.payload).unwrap();
    assert_eq!(decoded.signer(), Some(&account.public_key()));
    assert_eq!(decoded.body(), key_link().body());
    assert_eq!(decoded.serialize(), signed.payload_bytes().unwrap());
    assert!(verify_signed_transaction(&signed, &GENERATION_HASH).is_ok());
}

// ---------------------------------------------------------------------------
// Deadlines
// ---------------------------------------------------------------------------

#[test]
fn deadline_window_is_enforced() {
    let epoch = NetworkConfig::testnet().epoch_adjustment;

    let negative = Deadline::create(epoch, -1, DeadlineUnit::Hours).unwrap_err();
    assert_eq!(negative.kind(), ErrorKind::InvalidArgument);

    let too_far = Deadline::create(epoch, 2, DeadlineUnit::Days).unwrap_err();
    assert_eq!(too_far.kind(), ErrorKind::InvalidArgument);

    assert!(Deadline::create(epoch, 2, DeadlineUnit::Hours).is_ok());
    assert!(Deadline::create(epoch, 24, DeadlineUnit::Hours).is_ok());
}

// ---------------------------------------------------------------------------
// Alias resolution
// ---------------------------------------------------------------------------

#[test]
fn supply_revocation_aliases_resolve_at_block_position() {
    init_tracing();
    let source_alias = NamespaceId::new(0x9A8B_7C6D_5E4F_3021);
    let mosaic_alias = NamespaceId::new(0xD1C2_B3A4_9586_7768);
    let holder = address_of(3);
    let mosaic_id = MosaicId::new(0x0DC6_7FBE_1CAD_29E3).unwrap();
    let height = UInt64::new(42);

    let body = MosaicSupplyRevocationBody::new(source_alias, Mosaic::new(mosaic_alias, 500u64));
    let tx = TransactionBuilder::new(NetworkType::TestNet, TransactionBody::MosaicSupplyRevocation(body))
        .build()
        .unwrap()
        .with_info(TransactionInfo::new(height, 1));

    let statement = Statement::new(
        vec![ResolutionStatement::new(
            height,
            source_alias,
            vec![ResolutionEntry::new(holder, ReceiptSource::new(1, 0))],
        )],
        vec![ResolutionStatement::new(
            height,
            mosaic_alias,
            vec![ResolutionEntry::new(mosaic_id, ReceiptSource::new(2, 0))],
        )],
    );

    let resolved = tx.resolve_aliases(&statement).unwrap();
    match resolved.body() {
        TransactionBody::MosaicSupplyRevocation(b) => {
            assert_eq!(b.source_address, UnresolvedAddress::Address(holder));
            assert_eq!(b.mosaic.id, UnresolvedMosaicId::Mosaic(mosaic_id));
            assert_eq!(b.mosaic.amount, UInt64::new(500));
        }
        other => panic!("unexpected body {:?}", other),
    }
    assert_eq!(resolved.size(), tx.size());

    // Resolving a resolved transaction changes nothing.
    assert_eq!(resolved.resolve_aliases(&statement).unwrap(), resolved);

    // At index 0 the mosaic alias had not been resolved yet.
    let earlier = tx.with_info(TransactionInfo::new(height, 0));
    let err = earlier.resolve_aliases(&statement).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResolutionNotFound);
}

#[test]
fn unconfirmed_transaction_with_aliases_cannot_resolve() {
    let body = TransferBody::new(NamespaceId::new(0x8000_0000_0000_0001), vec![], Message::empty());
    let tx = TransactionBuilder::new(NetworkType::TestNet, TransactionBody::Transfer(body))
        .build()
        .unwrap();
    let err = tx.resolve_aliases(&Statement::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResolutionNotFound);
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

fn transfer_to(byte: u8, text: &str) -> Transaction {
    let body = TransferBody::new(
        address_of(byte),
        vec![Mosaic::new(MosaicId::new(0x6BED_913F_A202_23F8).unwrap(), 10u64)],
        Message::plain(text).unwrap(),
    );
    TransactionBuilder::new(NetworkType::TestNet, TransactionBody::Transfer(body))
        .build()
        .unwrap()
}

#[test]
fn complete_aggregate_with_cosignatories_verifies() {
    init_tracing();
    let initiator = signer();
    let cosigner = Account::generate(NetworkType::TestNet);
    let inner = vec![
        transfer_to(1, "a").to_aggregate(&initiator.public_account()).unwrap(),
        transfer_to(2, "odd").to_aggregate(&cosigner.public_account()).unwrap(),
    ];
    let aggregate =
        Transaction::create_complete(Deadline::from_adjusted(9u64), inner, NetworkType::TestNet, vec![], 0u64)
            .unwrap()
            .set_max_fee_for_aggregate(100, 1)
            .unwrap();

    let signed = aggregate
        .sign_transaction_with_cosignatories(&initiator, &[cosigner.clone()], &GENERATION_HASH)
        .unwrap();
    assert!(verify_signed_transaction(&signed, &GENERATION_HASH).is_ok());

    let decoded = Transaction::from_hex(&signed.payload).unwrap();
    assert_eq!(decoded.inner_transactions().len(), 2);
    assert_eq!(decoded.cosignatures().len(), 1);
    assert_eq!(decoded.size(), signed.payload.len() / 2);
    assert_eq!(decoded.max_fee(), UInt64::new(decoded.size() as u64 * 100));
    assert!(decoded.signed_by_account(&cosigner.public_account()));
}

#[test]
fn detached_cosignature_is_accepted() {
    let initiator = signer();
    let cosigner = Account::generate(NetworkType::TestNet);
    let inner = vec![transfer_to(4, "bonded").to_aggregate(&cosigner.public_account()).unwrap()];
    let aggregate =
        Transaction::create_bonded(Deadline::from_adjusted(9u64), inner, NetworkType::TestNet, vec![], 0u64)
            .unwrap();

    let announced = aggregate.sign_with(&initiator, &GENERATION_HASH).unwrap();
    let confirmed = Transaction::from_hex(&announced.payload)
        .unwrap()
        .with_info(TransactionInfo::new(5u64, 0).with_hash(announced.hash.clone()));
    let cosignature = CosignatureTransaction::create(&confirmed).unwrap().sign_with(&cosigner);
    assert!(cosignature.verify());
    assert_eq!(cosignature.parent_hash, announced.hash);

    let resigned = aggregate
        .sign_transaction_given_signatures(&initiator, &[cosignature], &GENERATION_HASH)
        .unwrap();
    assert_eq!(resigned.hash, announced.hash);
    assert!(verify_signed_transaction(&resigned, &GENERATION_HASH).is_ok());
}

#[test]
fn aggregate_inner_aliases_resolve_by_secondary_index() {
    init_tracing();
    let alias = NamespaceId::from_name("shared.vault").unwrap();
    let early = address_of(21);
    let late = address_of(23);
    let height = UInt64::new(77);
    let signer = signer().public_account();

    let to_alias = |text: &str| {
        let body = TransferBody::new(alias, vec![], Message::plain(text).unwrap());
        TransactionBuilder::new(NetworkType::TestNet, TransactionBody::Transfer(body))
            .build()
            .unwrap()
            .to_aggregate(&signer)
            .unwrap()
    };
    let aggregate = Transaction::create_complete(
        Deadline::from_adjusted(1u64),
        vec![to_alias("one"), to_alias("two"), to_alias("three")],
        NetworkType::TestNet,
        vec![],
        0u64,
    )
    .unwrap();

    // The aggregate is the fourth transaction of its block: primary id 4.
    let confirmed = Transaction::from_payload(&aggregate.serialize())
        .unwrap()
        .with_info(TransactionInfo::new(height, 3));
    let statement = Statement::new(
        vec![ResolutionStatement::new(
            height,
            alias,
            vec![
                ResolutionEntry::new(early, ReceiptSource::new(4, 1)),
                ResolutionEntry::new(late, ReceiptSource::new(4, 3)),
            ],
        )],
        vec![],
    );

    let resolved = confirmed.resolve_aliases(&statement).unwrap();
    let recipients: Vec<_> = resolved
        .inner_transactions()
        .iter()
        .map(|inner| match inner.body() {
            TransactionBody::Transfer(b) => b.recipient,
            other => panic!("unexpected body {:?}", other),
        })
        .collect();
    assert_eq!(
        recipients,
        vec![
            UnresolvedAddress::Address(early),
            UnresolvedAddress::Address(early),
            UnresolvedAddress::Address(late),
        ]
    );
    assert_eq!(resolved.size(), confirmed.size());
    assert_eq!(resolved.resolve_aliases(&statement).unwrap(), resolved);

    // Placed first in the block, the aggregate precedes every entry.
    let first = confirmed.with_info(TransactionInfo::new(height, 0));
    let err = first.resolve_aliases(&statement).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResolutionNotFound);
}

#[test]
fn corrupted_aggregate_payload_size_is_rejected() {
    let inner = vec![transfer_to(5, "x").to_aggregate(&signer().public_account()).unwrap()];
    let aggregate =
        Transaction::create_complete(Deadline::from_adjusted(1u64), inner, NetworkType::TestNet, vec![], 0u64)
            .unwrap();
    let mut bytes = aggregate.serialize();
    // payloadSize sits right after the 32-byte transactions hash
    bytes[160..164].copy_from_slice(&10_000u32.to_le_bytes());
    let err = Transaction::from_payload(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFormat);
}

#[test]
fn non_aggregates_cannot_be_cosigned() {
    let confirmed = key_link().with_info(TransactionInfo::new(1u64, 0).with_hash("AB".repeat(32)));
    let err = CosignatureTransaction::create(&confirmed).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
}
