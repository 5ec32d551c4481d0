// Integration tests for Smart Match

use std::sync::Arc;

use smart_match::core::{MatchError, SmartMatchEngine, SwipeIndex};
use smart_match::models::{Candidate, Decision, IntentScope, MatchCategory, MutualMatchOutcome};
use smart_match::services::{MemorySwipeIndex, RecordingSink, StaticSource};

type Engine = SmartMatchEngine<StaticSource, RecordingSink, MemorySwipeIndex>;

fn build_engine(candidates: Vec<Candidate>) -> (Engine, Arc<RecordingSink>, Arc<MemorySwipeIndex>) {
    let sink = Arc::new(RecordingSink::default());
    let index = Arc::new(MemorySwipeIndex::new());
    let engine = SmartMatchEngine::new(
        Arc::new(StaticSource::new(candidates)),
        Arc::clone(&sink),
        Arc::clone(&index),
    );
    (engine, sink, index)
}

#[tokio::test]
async fn test_integration_session_walkthrough() {
    let (engine, sink, _) = build_engine(vec![
        Candidate::new("c1", 0.9, vec![]),
        Candidate::new("c2", 0.5, vec!["study".to_string()]),
    ]);

    let mut session = engine.start_session("me", IntentScope::Friends, 20).await.unwrap();

    let swipes = session.swipes();
    assert_eq!(swipes.size(), 2);
    assert_eq!(swipes.position(), 1);
    assert_eq!(swipes.current().unwrap().category, MatchCategory::PotentialDate);

    let first = engine.swipe(&mut session, Decision::Pass).await.unwrap();
    assert!(!first.exhausted);
    assert_eq!(session.swipes().position(), 2);
    assert_eq!(session.current().unwrap().category, MatchCategory::StudyBuddy);

    let second = engine.swipe(&mut session, Decision::Like).await.unwrap();
    assert!(second.exhausted);
    assert!(session.swipes().is_exhausted());

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].candidate_user_id, "c1");
    assert_eq!(events[0].decision, Decision::Pass);
    assert_eq!(events[1].candidate_user_id, "c2");
    assert_eq!(events[1].decision, Decision::Like);
}

#[tokio::test]
async fn test_integration_mutual_match_across_sessions() {
    let (engine, _, index) = build_engine(vec![
        Candidate::new("alice", 0.7, vec![]),
        Candidate::new("bob", 0.7, vec![]),
    ]);

    let mut alice = engine.start_session("alice", IntentScope::Friends, 20).await.unwrap();
    let outcome = engine.swipe(&mut alice, Decision::Like).await.unwrap();
    assert_eq!(outcome.candidate_user_id, "bob");
    assert_eq!(outcome.mutual_match, MutualMatchOutcome::None);
    assert!(index.has_liked("alice", "bob").await.unwrap());

    let mut bob = engine.start_session("bob", IntentScope::Friends, 20).await.unwrap();
    let outcome = engine.swipe(&mut bob, Decision::Like).await.unwrap();

    match outcome.mutual_match {
        MutualMatchOutcome::Matched(candidate) => assert_eq!(candidate.user_id(), "alice"),
        MutualMatchOutcome::None => panic!("bob liking alice back should be a mutual match"),
    }
}

#[tokio::test]
async fn test_integration_pass_never_matches() {
    let (engine, _, index) = build_engine(vec![
        Candidate::new("alice", 0.7, vec![]),
        Candidate::new("bob", 0.7, vec![]),
    ]);

    index.record_like("alice", "bob").await.unwrap();

    let mut bob = engine.start_session("bob", IntentScope::Friends, 20).await.unwrap();
    let outcome = engine.swipe(&mut bob, Decision::Pass).await.unwrap();

    assert!(!outcome.mutual_match.is_matched());
    assert!(!index.has_liked("bob", "alice").await.unwrap());
}

#[tokio::test]
async fn test_integration_source_unavailable() {
    let engine = SmartMatchEngine::new(
        Arc::new(StaticSource::unavailable()),
        Arc::new(RecordingSink::default()),
        Arc::new(MemorySwipeIndex::new()),
    );

    let err = engine.start_session("me", IntentScope::Dating, 20).await.err().unwrap();
    assert!(matches!(err, MatchError::SourceUnavailable(_)));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_integration_failed_feedback_skips_index() {
    let (engine, sink, index) = build_engine(vec![Candidate::new("bob", 0.7, vec![])]);

    let mut session = engine.start_session("alice", IntentScope::Friends, 20).await.unwrap();
    sink.fail_next(1);

    let err = engine.swipe(&mut session, Decision::Like).await.unwrap_err();
    assert!(matches!(err, MatchError::TransmissionFailure(_)));
    assert!(!index.has_liked("alice", "bob").await.unwrap());
    assert_eq!(session.swipes().cursor(), 0);
}

#[tokio::test]
async fn test_integration_one_notification_per_candidate() {
    let (engine, sink, _) = build_engine(vec![Candidate::new("bob", 0.7, vec![])]);
    let session = engine.start_session("alice", IntentScope::Friends, 20).await.unwrap();
    let bob = session.current().unwrap().clone();

    session.dispatcher().submit("alice", &bob, Decision::Like).await.unwrap();
    let err = session.dispatcher().submit("alice", &bob, Decision::Like).await.unwrap_err();

    assert!(matches!(err, MatchError::AlreadyResolved(_)));
    assert!(!err.is_recoverable());
    assert_eq!(sink.events().len(), 1);
}
