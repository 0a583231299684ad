use std::time::{Duration, Instant};

use proptest::prelude::*;

use ogwatch::engine::{Debouncer, StaleState};

const WINDOW: Duration = Duration::from_millis(50);

#[test]
fn test_starts_clear() {
    let t0 = Instant::now();
    let debouncer = Debouncer::new(WINDOW, t0);
    assert!(!debouncer.is_pending());
    assert_eq!(debouncer.state(), StaleState::Clear { last_notice: t0 });
}

#[test]
fn test_first_notice_waits_out_window() {
    let t0 = Instant::now();
    let mut debouncer = Debouncer::new(WINDOW, t0);
    debouncer.mark_stale();

    assert_eq!(debouncer.remaining(t0 + Duration::from_millis(20)), Duration::from_millis(30));
    assert_eq!(debouncer.remaining(t0 + Duration::from_millis(80)), Duration::ZERO);
}

#[test]
fn test_settle_fires_and_clears() {
    let t0 = Instant::now();
    let mut debouncer = Debouncer::new(WINDOW, t0);
    debouncer.mark_stale();

    let fired_at = t0 + WINDOW;
    assert!(debouncer.settle(fired_at, false));
    assert!(!debouncer.is_pending());
    assert_eq!(debouncer.state(), StaleState::Clear { last_notice: fired_at });
    assert_eq!(debouncer.remaining(fired_at), WINDOW);
}

#[test]
fn test_ready_event_suppresses_and_keeps_pending() {
    let t0 = Instant::now();
    let mut debouncer = Debouncer::new(WINDOW, t0);
    debouncer.mark_stale();

    assert!(!debouncer.settle(t0 + Duration::from_millis(10), true));
    assert!(debouncer.is_pending());
    assert_eq!(debouncer.state(), StaleState::Pending { last_notice: t0 });
}

#[test]
fn test_settle_without_pending_is_noop() {
    let t0 = Instant::now();
    let mut debouncer = Debouncer::new(WINDOW, t0);
    assert!(!debouncer.settle(t0 + WINDOW, false));
}

#[test]
fn test_repeated_marks_stay_single_pending() {
    let t0 = Instant::now();
    let mut debouncer = Debouncer::new(WINDOW, t0);
    for _ in 0..10 {
        debouncer.mark_stale();
    }
    assert!(debouncer.settle(t0 + WINDOW, false));
    assert!(!debouncer.settle(t0 + WINDOW * 2, false));
}

proptest! {
    /// Drive the debouncer the way the watch loop does: stale references
    /// arrive at arbitrary offsets; before each next arrival the loop waits
    /// `remaining` and settles. Notices must be at least a window apart.
    #[test]
    fn test_notices_at_least_one_window_apart(
        mut offsets in proptest::collection::vec(0u64..1_000, 1..40),
    ) {
        offsets.sort_unstable();
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW, t0);
        let mut fired: Vec<Instant> = Vec::new();

        let arrivals: Vec<Instant> = offsets.iter().map(|ms| t0 + Duration::from_millis(*ms)).collect();
        for (i, &arrival) in arrivals.iter().enumerate() {
            debouncer.mark_stale();

            let now = arrival;
            let deadline = now + debouncer.remaining(now);
            let next = arrivals.get(i + 1).copied();
            let ready = next.is_some_and(|n| n < deadline);
            let settle_at = if ready { next.unwrap_or(deadline) } else { deadline };
            if debouncer.settle(settle_at, ready) {
                fired.push(settle_at);
            }
        }

        for pair in fired.windows(2) {
            prop_assert!(pair[1].duration_since(pair[0]) >= WINDOW);
        }
        // The last arrival is never followed by a ready event, so the
        // burst always ends with a notice.
        prop_assert!(!fired.is_empty());
        prop_assert!(!debouncer.is_pending());
    }
}
