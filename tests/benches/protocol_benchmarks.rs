//! Benchmarks for the hot path of the signing protocol: canonical
//! serialization, signature normalization, and RSA-SHA256 verification.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use deal_crypto::test_support::{generate_keypair, sign_canonical, sign_canonical_base64url};
use deal_crypto::{canonicalize, normalize_signature_base64, verify_rsa_sha256, DealCore};
use shared_types::{PropertyId, UserId};

fn bench_core() -> DealCore {
    DealCore::new(
        PropertyId::from("prop-bench-1"),
        UserId::from("owner-bench-1"),
        Some(UserId::from("renter-bench-1")),
    )
}

fn bench_canonicalize(c: &mut Criterion) {
    let core = bench_core();
    c.bench_function("canonicalize_deal_core", |b| {
        b.iter(|| canonicalize(black_box(&core)).unwrap())
    });
}

fn bench_normalize_signature(c: &mut Criterion) {
    let (key, _) = generate_keypair();
    let canonical = canonicalize(&bench_core()).unwrap();
    let url_safe = sign_canonical_base64url(&key, &canonical);
    c.bench_function("normalize_base64url_signature", |b| {
        b.iter(|| normalize_signature_base64(black_box(&url_safe)))
    });
}

fn bench_verify(c: &mut Criterion) {
    let (key, pem) = generate_keypair();
    let canonical = canonicalize(&bench_core()).unwrap();
    let signature = sign_canonical(&key, &canonical);
    c.bench_function("verify_rsa_sha256", |b| {
        b.iter(|| {
            verify_rsa_sha256(
                black_box(&pem),
                black_box(&canonical),
                black_box(&signature),
            )
            .unwrap()
        })
    });
}

criterion_group!(
    benches,
    bench_canonicalize,
    bench_normalize_signature,
    bench_verify
);
criterion_main!(benches);
