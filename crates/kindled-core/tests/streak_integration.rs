//! Integration tests for streak calculation through the public API.

use chrono::{DateTime, Duration, Utc};
use kindled_core::{HabitCalendar, Session, StreakCalculator};

fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

/// Fixed reference time at noon to stay clear of the day boundary.
fn noon() -> DateTime<Utc> {
    at("2026-03-10T12:00:00+00:00")
}

fn calc() -> StreakCalculator {
    StreakCalculator::new(HabitCalendar::default())
}

fn sessions_on(now: DateTime<Utc>, days_ago: i64, count: u32) -> Vec<Session> {
    let when = now - Duration::days(days_ago);
    (0..count)
        .map(|i| Session::new(1500, 1500, when + Duration::minutes(i64::from(i))))
        .collect()
}

#[test]
fn test_late_night_session_attributed_to_previous_day() {
    // A session at 01:30 under a 03:00 boundary belongs to March 9,
    // not the date a naive clock read would give.
    let cal = HabitCalendar::default();
    let session = Session::new(1500, 1500, at("2026-03-10T01:30:00+00:00"));
    assert_eq!(session.day(&cal).unwrap(), "2026-03-09".parse().unwrap());

    // Which means two late-night sessions complete March 9, and a
    // strict streak read at March 10 noon sees a broken today but a
    // grace-aware read keeps the March 9 day counted.
    let sessions = vec![
        Session::new(1500, 1500, at("2026-03-10T01:00:00+00:00")),
        Session::new(1500, 1500, at("2026-03-10T02:00:00+00:00")),
    ];
    assert_eq!(calc().streak(&sessions, 2, true, noon()).unwrap(), 1);
    assert_eq!(calc().streak(&sessions, 2, false, noon()).unwrap(), 0);
}

#[test]
fn test_ten_day_pattern_reconstruction() {
    // Oldest to newest: S S F S S S F S S S(today). Expect periods of
    // 2 and 3 plus the trailing open 3-day period reaching today,
    // sorted [3 (more recent), 3, 2].
    let now = noon();
    let mut sessions = Vec::new();
    for days_ago in [9, 8, 6, 5, 4, 2, 1, 0] {
        sessions.extend(sessions_on(now, days_ago, 2));
    }

    let history = calc().history(&sessions, 2, 365, now).unwrap();
    let durations: Vec<u32> = history.periods.iter().map(|p| p.duration).collect();
    assert_eq!(durations, vec![3, 3, 2]);
    assert!(history.periods[0].start_day > history.periods[1].start_day);
    assert_eq!(
        history.periods[0].end_day,
        calc().calendar().today(now),
        "trailing period stays open through today"
    );
}

#[test]
fn test_empty_input_and_invalid_target() {
    assert_eq!(calc().streak(&[], 7, true, noon()).unwrap(), 0);
    assert!(calc().streak(&sessions_on(noon(), 0, 2), 0, true, noon()).is_err());
}

#[test]
fn test_grace_period_equivalence() {
    // With an incomplete today, the grace-aware streak equals the
    // strict streak over the same data minus today's sessions, with the
    // walk anchored at yesterday (grace skips exactly one day).
    let now = noon();
    let mut sessions = sessions_on(now, 0, 1);
    sessions.extend(sessions_on(now, 1, 2));
    sessions.extend(sessions_on(now, 2, 2));
    sessions.extend(sessions_on(now, 3, 2));

    let without_today: Vec<Session> = sessions
        .iter()
        .filter(|s| s.day(calc().calendar()) != Some(calc().calendar().today(now)))
        .cloned()
        .collect();

    assert_eq!(
        calc().streak(&sessions, 2, true, now).unwrap(),
        calc()
            .streak(&without_today, 2, false, now - Duration::days(1))
            .unwrap(),
    );
}

#[test]
fn test_status_tracks_grace_state() {
    let now = noon();
    let mut sessions = sessions_on(now, 1, 2);
    sessions.extend(sessions_on(now, 2, 2));

    // Nothing today yet: streak held open purely by grace.
    let status = calc().status(&sessions, 2, now).unwrap();
    assert_eq!(status.current_streak, 2);
    assert_eq!(status.strict_streak, 0);
    assert!(!status.today_completed);
    assert!(status.is_streak_continuing);

    // Completing today collapses the two readings.
    sessions.extend(sessions_on(now, 0, 2));
    let status = calc().status(&sessions, 2, now).unwrap();
    assert_eq!(status.current_streak, 3);
    assert_eq!(status.strict_streak, 3);
    assert!(status.today_completed);
}

#[test]
fn test_single_day_target_counts_every_active_day() {
    let now = noon();
    let mut sessions = Vec::new();
    for days_ago in 0..4 {
        sessions.extend(sessions_on(now, days_ago, 1));
    }
    assert_eq!(calc().streak(&sessions, 1, false, now).unwrap(), 4);
}
