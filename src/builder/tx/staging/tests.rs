use pallas::ledger::primitives::Fragment;
use pallas::ledger::primitives::conway::{Certificate as PallasCertificate, Tx};
use pallas::ledger::traverse::ComputeHash;

use super::StagingTransaction;
use crate::builder::tx::TxBuilderError;
use crate::primitives::{Certificate, Hash, Input, Output, PoolId, StakeCredential};
use crate::test_utils::{dummy_address, signer_witness_set};

fn staged() -> StagingTransaction {
    let credential = StakeCredential::Key(Hash::new([4u8; 28]));
    StagingTransaction::new()
        .input(Input::new(Hash::new([2u8; 32]), 1))
        .input(Input::new(Hash::new([1u8; 32]), 0))
        .output(Output::lovelace(dummy_address(1), 1_500_000))
        .fee(170_000)
        .add_certificate(Certificate::StakeRegistration { credential })
        .add_certificate(Certificate::StakeDelegation {
            credential,
            pool_id: PoolId::new(Hash::new([5u8; 28])),
        })
}

#[test]
fn build_keeps_certificate_order_and_fee() {
    let built = staged().build_conway().expect("build conway");
    let decoded = Tx::decode_fragment(&built.bytes).expect("decode tx");

    assert_eq!(decoded.transaction_body.fee, 170_000);
    assert_eq!(decoded.transaction_body.inputs.len(), 2);
    assert_eq!(decoded.transaction_body.outputs.len(), 1);

    let certs: Vec<PallasCertificate> = decoded
        .transaction_body
        .certificates
        .as_ref()
        .expect("certificates missing")
        .iter()
        .cloned()
        .collect();
    assert_eq!(certs.len(), 2);
    assert!(matches!(certs[0], PallasCertificate::StakeRegistration(_)));
    assert!(matches!(certs[1], PallasCertificate::StakeDelegation(_, _)));
}

#[test]
fn duplicate_certificates_are_ignored() {
    let credential = StakeCredential::Key(Hash::new([4u8; 28]));
    let tx = staged().add_certificate(Certificate::StakeRegistration { credential });
    assert_eq!(tx.certificates.len(), 2);
}

#[test]
fn build_without_inputs_fails() {
    let tx = StagingTransaction::new().output(Output::lovelace(dummy_address(1), 1));
    assert_eq!(tx.build_conway(), Err(TxBuilderError::NoInputs));
}

#[test]
fn hash_matches_body() {
    let built = staged().build_conway().unwrap();
    let decoded = Tx::decode_fragment(&built.bytes).unwrap();
    assert_eq!(decoded.transaction_body.compute_hash(), built.hash);
}

#[test]
fn dummy_witnesses_grow_the_transaction() {
    let built = staged().build_conway().unwrap();
    let one = built.with_dummy_witnesses(1).unwrap();
    let two = built.with_dummy_witnesses(2).unwrap();

    assert!(one.len() > built.size());
    // each vkey witness is a 32 byte key and a 64 byte signature plus framing
    assert!(two.len() >= one.len() + 96);
}

#[test]
fn attaching_witnesses_keeps_the_hash() {
    let built = staged().build_conway().unwrap();
    let hash = built.hash;

    let signed = built
        .attach_witnesses(&signer_witness_set(7))
        .unwrap()
        .attach_witnesses(&signer_witness_set(8))
        .unwrap();

    assert_eq!(signed.hash, hash);
    assert_eq!(signed.vkey_witness_count().unwrap(), 2);

    let decoded = Tx::decode_fragment(&signed.bytes).unwrap();
    assert_eq!(decoded.transaction_body.compute_hash(), hash);
}

#[test]
fn attaching_the_same_witness_twice_is_idempotent() {
    let built = staged().build_conway().unwrap();
    let signed = built
        .attach_witnesses(&signer_witness_set(7))
        .unwrap()
        .attach_witnesses(&signer_witness_set(7))
        .unwrap();
    assert_eq!(signed.vkey_witness_count().unwrap(), 1);
}

#[test]
fn garbage_witness_set_is_rejected() {
    let built = staged().build_conway().unwrap();
    assert_eq!(
        built.attach_witnesses(&[0xff, 0x00]),
        Err(TxBuilderError::MalformedWitnessSet)
    );
}
