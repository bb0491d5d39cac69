use crate::models::{Criterion, DurationNeed, DurationTier, UrgencyNeed, UrgencyTier, WeekSchedule};
use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike};
use std::collections::BTreeMap;

/// Urgency fit scores, seeker rows x shelter columns
///
/// Rows: Today, FewDays, WeekOrMore. Columns: Immediate, High, Moderate.
/// Kept as data rather than branching logic so the policy is auditable
/// independently of the traversal.
pub const URGENCY_SCORES: [[f64; 3]; 3] = [
    [0.0, 0.75, 1.0],
    [0.25, 0.0, 0.75],
    [0.75, 0.25, 0.0],
];

/// Duration fit scores, seeker rows x shelter columns
///
/// Rows: Overnight, UpToMonth, CoupleMonths, YearOrMore.
/// Columns: Overnight, Temporary, Transitional, LongTerm.
pub const DURATION_SCORES: [[f64; 4]; 4] = [
    [0.0, 0.5, 0.75, 1.0],
    [0.5, 0.0, 0.25, 0.75],
    [0.75, 0.25, 0.0, 0.5],
    [1.0, 0.75, 0.5, 0.0],
];

/// Availability is counted three times when the seeker needs help today
pub const TODAY_AVAILABILITY_WEIGHT: f64 = 3.0;

/// Score urgency alignment by table lookup; 0 = perfect fit
#[inline]
pub fn urgency_score(need: UrgencyNeed, tier: UrgencyTier) -> f64 {
    URGENCY_SCORES[need as usize][tier as usize]
}

/// Score stay-duration alignment by table lookup; 0 = perfect fit
#[inline]
pub fn duration_score(need: DurationNeed, tier: DurationTier) -> f64 {
    DURATION_SCORES[need as usize][tier as usize]
}

/// Score current open/closed status: 0 open, 1 closed
///
/// `now` is the current date-time in the seeker-facing timezone. Comparison
/// is at minute precision. A window whose end precedes its start spans
/// midnight and is open outside the [end, start) gap.
pub fn availability_score(schedule: &WeekSchedule, now: NaiveDateTime) -> f64 {
    let window = match schedule.window_for(now.weekday()) {
        Some(window) => window,
        // No listed hours for this weekday: closed
        None => return 1.0,
    };

    let current = NaiveTime::from_hms_opt(now.hour(), now.minute(), 0)
        .expect("hour and minute taken from a valid datetime");

    let open = if window.start <= window.end {
        window.start <= current && current <= window.end
    } else {
        current >= window.start || current <= window.end
    };

    if open {
        0.0
    } else {
        1.0
    }
}

/// How many times the availability criterion counts in the aggregate
///
/// `None` means availability is not scored at all: near-term open/closed
/// status is irrelevant to someone planning a week out.
pub fn availability_weight(urgency: UrgencyNeed) -> Option<f64> {
    match urgency {
        UrgencyNeed::Today => Some(TODAY_AVAILABILITY_WEIGHT),
        UrgencyNeed::FewDays => Some(1.0),
        UrgencyNeed::WeekOrMore => None,
    }
}

#[inline]
fn criterion_weight(criterion: Criterion, urgency: UrgencyNeed) -> f64 {
    if criterion == Criterion::Availability {
        availability_weight(urgency).unwrap_or(0.0)
    } else {
        1.0
    }
}

/// Combine the per-criterion scores actually computed into one total
///
/// The total is the weighted mean of exactly the criteria present in the
/// map: an omitted criterion appears in neither the numerator nor the
/// denominator, so its absence cannot distort the average. Returns `None`
/// when no criterion applies; the caller falls back to a neutral ranking.
pub fn aggregate_scores(scores: &BTreeMap<Criterion, f64>, urgency: UrgencyNeed) -> Option<f64> {
    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for (criterion, score) in scores {
        let weight = criterion_weight(*criterion, urgency);
        numerator += weight * score;
        denominator += weight;
    }

    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}
