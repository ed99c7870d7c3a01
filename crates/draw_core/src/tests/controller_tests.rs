use super::*;
use chrono::TimeZone;
use rand::{rngs::StdRng, SeedableRng};
use shared::error::FailureKind;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 15, 9, 30, 0).unwrap()
}

fn list(entries: &[&str]) -> SourceList {
    SourceList::from_entries(entries.iter().copied())
}

fn state(history: &[&str]) -> DrawState {
    DrawState::new(history.iter().map(|e| e.to_string()).collect(), None)
}

#[test]
fn future_deadline_waits() {
    let deadline = now() + TimeDelta::minutes(1);
    assert_eq!(check_deadline(Some(deadline), now()), Gate::Wait(deadline));
}

#[test]
fn reached_deadline_expires() {
    assert_eq!(check_deadline(Some(now()), now()), Gate::Expired);
    assert_eq!(
        check_deadline(Some(now() - TimeDelta::hours(1)), now()),
        Gate::Expired
    );
    assert_eq!(check_deadline(None, now()), Gate::Open);
}

#[test]
fn only_remaining_entry_is_always_drawn() {
    for seed in 0..32 {
        let mut rng = StdRng::seed_from_u64(seed);
        let (next, action) = decide(
            state(&["A"]),
            Ok(list(&["A", "B"])),
            &mut rng,
            now(),
            &DrawPolicy::default(),
        );
        assert_eq!(action, DrawAction::Navigate("B".into()));
        assert_eq!(next, state(&["A", "B"]));
    }
}

#[test]
fn exhausted_list_sets_deadline_without_navigation() {
    let mut rng = StdRng::seed_from_u64(7);
    let (next, action) = decide(
        state(&["A"]),
        Ok(list(&["A"])),
        &mut rng,
        now(),
        &DrawPolicy::default(),
    );
    let expected = now() + TimeDelta::hours(24);
    assert_eq!(action, DrawAction::Wait(expected));
    assert_eq!(next.reset_deadline, Some(expected));
    assert_eq!(next.history, vec!["A".to_string()]);
}

#[test]
fn empty_source_counts_as_exhausted() {
    let mut rng = StdRng::seed_from_u64(1);
    let (_, action) = decide(
        state(&[]),
        Ok(list(&[])),
        &mut rng,
        now(),
        &DrawPolicy::default(),
    );
    assert!(matches!(action, DrawAction::Wait(_)));
}

#[test]
fn fetch_failure_leaves_state_untouched() {
    let mut rng = StdRng::seed_from_u64(1);
    let before = state(&["A", "B"]);
    let (next, action) = decide(
        before.clone(),
        Err(SourceError::Status(503)),
        &mut rng,
        now(),
        &DrawPolicy::default(),
    );
    assert_eq!(next, before);
    assert_eq!(action, DrawAction::Error(SourceError::Status(503)));
    assert!(matches!(action, DrawAction::Error(ref err) if err.kind() == FailureKind::HttpStatus));
}

#[test]
fn history_is_capped_at_limit_with_latest_last() {
    let policy = DrawPolicy {
        history_limit: 3,
        ..DrawPolicy::default()
    };
    let mut rng = StdRng::seed_from_u64(42);
    let (next, action) = decide(
        state(&["1", "2", "3"]),
        Ok(list(&["1", "2", "3", "4"])),
        &mut rng,
        now(),
        &policy,
    );
    assert_eq!(action, DrawAction::Navigate("4".into()));
    assert_eq!(next, state(&["2", "3", "4"]));
}

#[test]
fn repeated_draws_never_repeat_until_exhausted() {
    let entries: Vec<String> = (0..10).map(|i| format!("https://example.com/{i}")).collect();
    let source = SourceList::from_entries(entries.clone());
    let mut rng = StdRng::seed_from_u64(99);
    let mut current = DrawState::default();
    let mut drawn = Vec::new();

    loop {
        let (next, action) = decide(
            current,
            Ok(source.clone()),
            &mut rng,
            now(),
            &DrawPolicy::default(),
        );
        current = next;
        match action {
            DrawAction::Navigate(url) => drawn.push(url),
            DrawAction::Wait(_) => break,
            DrawAction::Error(err) => panic!("unexpected failure {err}"),
        }
    }

    drawn.sort();
    let mut expected = entries;
    expected.sort();
    assert_eq!(drawn, expected);
}

#[test]
fn selection_covers_every_eligible_entry() {
    let source = list(&["A", "B", "C"]);
    let mut rng = StdRng::seed_from_u64(5);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..200 {
        let (_, action) = decide(
            state(&[]),
            Ok(source.clone()),
            &mut rng,
            now(),
            &DrawPolicy::default(),
        );
        if let DrawAction::Navigate(url) = action {
            seen.insert(url);
        }
    }
    assert_eq!(seen.len(), 3);
}

#[test]
fn deadline_after_saturates() {
    let far = deadline_after(now(), Duration::from_secs(u64::MAX));
    assert_eq!(far, DateTime::<Utc>::MAX_UTC);
}
