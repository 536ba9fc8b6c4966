//! End-to-end protocol scenarios against the public API.

use std::sync::Arc;

use confession_box::config::ProtocolConfig;
use confession_box::core::{hash_content, ManualClock};
use confession_box::identity::generate_secret;
use confession_box::ledger::{Address, BetOutcome, ConfessionRegistry, ProtocolError, VoteType};
use confession_box::proof::{
    derive_commitment, derive_nullifier, prove_reveal, prove_submission, ProofGenerationError,
};
use rand_core::OsRng;

const NOW: i64 = 1_718_000_000;

fn registry() -> ConfessionRegistry {
    ConfessionRegistry::initialize(
        Address::new("GADMIN"),
        ProtocolConfig::default(),
        Arc::new(ManualClock::new(NOW)),
    )
}

#[test]
fn test_submit_resubmit_reveal_scenario() {
    let mut reg = registry();
    let p1 = reg.current_period();

    // six earlier confessions from other players
    for i in 0..6 {
        let other = generate_secret(&mut OsRng).unwrap();
        let out = prove_submission(&other, p1, &hash_content(&format!("filler {}", i)), &mut OsRng).unwrap();
        reg.submit(&out.public, out.proof.as_bytes()).unwrap();
    }

    let s1 = generate_secret(&mut OsRng).unwrap();
    let h1 = hash_content("I laughed at a funeral");
    let h2 = hash_content("I lied on my resume");

    let out = prove_submission(&s1, p1, &h1, &mut OsRng).unwrap();
    let (n1, c1) = (out.public.nullifier, out.public.commitment);
    assert_eq!(n1, derive_nullifier(&s1, p1));
    assert_eq!(c1, derive_commitment(&s1, &h1));

    let id = reg.submit(&out.public, out.proof.as_bytes()).unwrap();
    assert_eq!(id, 7);

    // same secret and period, different content
    let again = prove_submission(&s1, p1, &h2, &mut OsRng).unwrap();
    assert_eq!(
        reg.submit(&again.public, again.proof.as_bytes()),
        Err(ProtocolError::NullifierAlreadyUsed)
    );

    // wrong secret cannot reveal
    let s2 = generate_secret(&mut OsRng).unwrap();
    let impostor = Address::new("GIMPOSTOR");
    reg.register_player(&impostor, s2.commitment()).unwrap();
    assert_eq!(
        prove_reveal(&s2, id, &h1, &c1, &impostor, &mut OsRng),
        Err(ProofGenerationError::CommitmentMismatch)
    );
    // nor with a proof it did not make
    let author = Address::new("GAUTHOR");
    let lifted = prove_reveal(&s1, id, &h1, &c1, &author, &mut OsRng).unwrap();
    assert_eq!(
        reg.reveal(&impostor, id, lifted.proof.as_bytes()),
        Err(ProtocolError::InvalidProof)
    );
    assert!(!reg.get_confession(id).unwrap().revealed);

    // the author reveals
    reg.register_player(&author, s1.commitment()).unwrap();
    reg.reveal(&author, id, lifted.proof.as_bytes()).unwrap();

    let confession = reg.get_confession(id).unwrap();
    assert!(confession.revealed);
    assert_eq!(confession.author, Some(author));
}

#[test]
fn test_votes_bets_and_settlement() {
    let mut reg = registry();
    let s = generate_secret(&mut OsRng).unwrap();
    let author = Address::new("GAUTHOR");
    reg.register_player(&author, s.commitment()).unwrap();

    let h = hash_content("I have 400 browser tabs open");
    let out = prove_submission(&s, reg.current_period(), &h, &mut OsRng).unwrap();
    let id = reg.submit(&out.public, out.proof.as_bytes()).unwrap();

    let (x, y) = (Address::new("GX"), Address::new("GY"));
    reg.vote(&x, id, VoteType::Relatable).unwrap();
    assert_eq!(reg.vote(&x, id, VoteType::Shocking), Err(ProtocolError::AlreadyVoted(id)));
    reg.vote(&y, id, VoteType::Shocking).unwrap();

    reg.place_bet(&x, id, true, 10).unwrap();
    reg.place_bet(&y, id, false, 10).unwrap();

    let c = reg.get_confession(id).unwrap().clone();
    let proof = prove_reveal(&s, id, &c.content_hash, &c.commitment, &author, &mut OsRng).unwrap();
    let report = reg.reveal(&author, id, proof.proof.as_bytes()).unwrap();
    assert_eq!(report.settled.len(), 2);

    let before = reg.get_bets(id);
    assert!(before.iter().all(|b| b.settled));
    let x_bet = before.iter().find(|b| b.bettor == x).unwrap();
    assert_eq!(x_bet.outcome, Some(BetOutcome::Won));

    // bets are closed and nothing settles twice
    assert_eq!(reg.place_bet(&Address::new("GZ"), id, true, 5), Err(ProtocolError::BetAlreadyClosed(id)));
    assert_eq!(reg.reveal(&author, id, proof.proof.as_bytes()), Err(ProtocolError::Unauthorized));
    assert_eq!(reg.get_bets(id), before);

    // voting stays open after reveal
    reg.vote(&Address::new("GZ"), id, VoteType::Fake).unwrap();
    assert_eq!(reg.get_confession(id).unwrap().total_votes(), 3);
}
