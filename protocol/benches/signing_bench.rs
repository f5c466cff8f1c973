// Encoding & signing benchmarks for catapult transactions.
//
// Covers transfer serialization and decoding, single-transaction signing,
// payload verification, and aggregate signing with a growing number of
// inner transactions.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use catapult_tx::crypto::PublicKey;
use catapult_tx::model::{Account, Message, Mosaic, MosaicId, NetworkType, PublicAccount};
use catapult_tx::transaction::{
    verify_signed_transaction, Deadline, Transaction, TransactionBody, TransactionBuilder, TransferBody,
};

const GENERATION_HASH: [u8; 32] = [0x57; 32];

fn transfer(seed: u8) -> Transaction {
    let recipient = PublicAccount::new(PublicKey::from_bytes([seed; 32]), NetworkType::TestNet).address();
    let mosaic = Mosaic::new(MosaicId::new(0x6BED_913F_A202_23F8).unwrap(), 1_000_000u64);
    let body = TransferBody::new(recipient, vec![mosaic], Message::plain("benchmark transfer").unwrap());
    TransactionBuilder::new(NetworkType::TestNet, TransactionBody::Transfer(body))
        .deadline(Deadline::from_adjusted(1_000_000u64))
        .max_fee(2_000_000u64)
        .build()
        .unwrap()
}

fn bench_serialize(c: &mut Criterion) {
    let tx = transfer(1);
    c.bench_function("transfer/serialize", |b| {
        b.iter(|| tx.serialize());
    });
}

fn bench_from_payload(c: &mut Criterion) {
    let payload = transfer(1).serialize();
    c.bench_function("transfer/from_payload", |b| {
        b.iter(|| Transaction::from_payload(&payload).unwrap());
    });
}

fn bench_sign(c: &mut Criterion) {
    let account = Account::generate(NetworkType::TestNet);
    let tx = transfer(1);
    c.bench_function("transfer/sign_with", |b| {
        b.iter(|| tx.sign_with(&account, &GENERATION_HASH).unwrap());
    });
}

fn bench_verify(c: &mut Criterion) {
    let account = Account::generate(NetworkType::TestNet);
    let signed = transfer(1).sign_with(&account, &GENERATION_HASH).unwrap();
    c.bench_function("transfer/verify", |b| {
        b.iter(|| verify_signed_transaction(&signed, &GENERATION_HASH).unwrap());
    });
}

fn bench_sign_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate/sign_with_cosignatory");
    let initiator = Account::generate(NetworkType::TestNet);
    let cosigner = Account::generate(NetworkType::TestNet);

    for size in [1usize, 10, 50, 100] {
        let inner = (0..size)
            .map(|i| transfer(i as u8).to_aggregate(&cosigner.public_account()).unwrap())
            .collect();
        let aggregate =
            Transaction::create_complete(Deadline::from_adjusted(1_000_000u64), inner, NetworkType::TestNet, vec![], 0u64)
                .unwrap();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &aggregate, |b, aggregate| {
            b.iter(|| {
                aggregate
                    .sign_transaction_with_cosignatories(&initiator, std::slice::from_ref(&cosigner), &GENERATION_HASH)
                    .unwrap()
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_serialize,
    bench_from_payload,
    bench_sign,
    bench_verify,
    bench_sign_aggregate,
);
criterion_main!(benches);
