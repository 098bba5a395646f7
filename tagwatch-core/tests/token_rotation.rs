use tagwatch_core::contract::MockTokenSource;
use tagwatch_core::token::{token_index, TokenError, TokenRotation};

fn two_tokens() -> TokenRotation {
    TokenRotation::new(vec!["t0".into(), "t1".into()]).expect("non-empty")
}

#[test]
fn test_index_is_a_pure_function_of_time() {
    let rotation = two_tokens();
    struct TestCase {
        now_ms: u64,
        expected: usize,
    }
    let test_cases = vec![
        TestCase { now_ms: 0, expected: 0 },
        TestCase { now_ms: 999, expected: 0 },
        TestCase { now_ms: 1_000, expected: 1 },
        TestCase { now_ms: 1_800_000, expected: 0 },
        TestCase { now_ms: 1_801_000, expected: 1 },
        // 3600 s wraps back to slot 0.
        TestCase { now_ms: 3_600_000, expected: 0 },
    ];
    for tc in test_cases {
        let first = rotation.index_at(tc.now_ms, 3600, 1);
        let second = rotation.index_at(tc.now_ms, 3600, 1);
        assert_eq!(first, tc.expected, "now_ms {}", tc.now_ms);
        assert_eq!(first, second, "same inputs, same token");
    }
}

#[test]
fn test_cycle_slots_bound_the_rotation() {
    // Three tokens over a 10 s cycle with a 5 s interval: only two slots, so token 2
    // is never chosen.
    for now_secs in 0..100u64 {
        let index = token_index(now_secs * 1000, 10, 5, 3);
        assert_eq!(index, (now_secs % 2) as usize);
    }
}

#[test]
fn test_degenerate_cycle_uses_one_slot() {
    assert_eq!(token_index(123_456, 0, 1, 4), 0);
    assert_eq!(token_index(123_456, 5, 10, 4), 0);
    assert_eq!(token_index(123_456, 3600, 0, 4), token_index(123_456, 3600, 1, 4));
}

#[test]
fn test_pick_returns_token_at_index() {
    let rotation = two_tokens();
    assert_eq!(rotation.pick(0, 3600, 1), (0, "t0"));
    assert_eq!(rotation.pick(1_000, 3600, 1), (1, "t1"));
}

#[test]
fn test_empty_token_list_fails_fast() {
    assert!(matches!(TokenRotation::new(vec![]), Err(TokenError::NoTokens)));
}

#[tokio::test]
async fn test_load_from_source() {
    let mut source = MockTokenSource::new();
    source
        .expect_load_access_tokens()
        .times(1)
        .returning(|| Ok(vec!["a".into(), "b".into(), "c".into()]));
    let rotation = TokenRotation::load(&source).await.expect("tokens load");
    assert_eq!(rotation.len(), 3);

    let mut empty = MockTokenSource::new();
    empty.expect_load_access_tokens().returning(|| Ok(vec![]));
    assert!(matches!(
        TokenRotation::load(&empty).await,
        Err(TokenError::NoTokens)
    ));

    let mut failing = MockTokenSource::new();
    failing
        .expect_load_access_tokens()
        .returning(|| Err("store offline".into()));
    assert!(matches!(
        TokenRotation::load(&failing).await,
        Err(TokenError::Load(_))
    ));
}
