use criterion::{criterion_group, criterion_main, Criterion};
use local_assertion::{
    AssertionGenerator, AssertionVerifier, IdentityRegister, LocalAssertionGenerator,
    LocalAssertionVerifier,
};
use std::sync::Arc;

fn bench_local_assertion(c: &mut Criterion) {
    let register = Arc::new(IdentityRegister::new());
    let enclave = register.set_random_identity();
    let _inside = enclave.enter_scoped().unwrap();

    let generator = LocalAssertionGenerator::new(register.clone());
    let verifier = LocalAssertionVerifier::new(register.clone());
    generator.initialize("").unwrap();
    verifier.initialize("").unwrap();

    let request = verifier.create_assertion_request().unwrap();
    let user_data = vec![0x5a; 64];

    c.bench_function("generate_local_assertion_64b", |b| {
        b.iter(|| generator.generate(&user_data, &request).unwrap())
    });

    let assertion = generator.generate(&user_data, &request).unwrap();
    c.bench_function("verify_local_assertion_64b", |b| {
        b.iter(|| verifier.verify(&user_data, &assertion).unwrap())
    });

    c.bench_function("assertion_to_bytes", |b| {
        b.iter(|| assertion.to_bytes().unwrap())
    });
}

criterion_group!(benches, bench_local_assertion);
criterion_main!(benches);
