//! Interval-set intersection across device timelines.
//!
//! Each input list is sorted, non-overlapping and right-open. An `end` of
//! `None` is unbounded and compares above every concrete timestamp. The
//! result of every pairwise step is canonical (sorted, disjoint, touching
//! intervals merged), so the fold order does not change the outcome.

use std::cmp::Ordering;

use crate::types::{DeviceIncidentSet, Incident, IncidentKind, Interval, Timestamp};

/// Order two right-hand bounds with `None` as +infinity.
fn cmp_end(a: Option<Timestamp>, b: Option<Timestamp>) -> Ordering {
  match (a, b) {
    (None, None) => Ordering::Equal,
    (None, Some(_)) => Ordering::Greater,
    (Some(_), None) => Ordering::Less,
    (Some(x), Some(y)) => x.cmp(&y),
  }
}

/// The earlier of two right-hand bounds; bounded beats unbounded.
fn min_end(a: Option<Timestamp>, b: Option<Timestamp>) -> Option<Timestamp> {
  match cmp_end(a, b) {
    Ordering::Greater => b,
    _ => a,
  }
}

/// Append `next`, merging it into the last interval when they touch.
fn push_merged(out: &mut Vec<Interval>, next: Interval) {
  if let Some(last) = out.last_mut() {
    if last.end == Some(next.start) {
      last.end = next.end;
      return;
    }
  }
  out.push(next);
}

/// Intersect two sorted, disjoint interval lists with a two-cursor walk.
pub fn intersect_pair(a: &[Interval], b: &[Interval]) -> Vec<Interval> {
  let mut out = Vec::new();
  let (mut i, mut j) = (0, 0);

  while i < a.len() && j < b.len() {
    let (x, y) = (a[i], b[j]);
    let start = x.start.max(y.start);
    let end = min_end(x.end, y.end);
    let overlap = Interval::new(start, end);
    if !overlap.is_empty() {
      push_merged(&mut out, overlap);
    }

    match cmp_end(x.end, y.end) {
      Ordering::Less => i += 1,
      Ordering::Greater => j += 1,
      Ordering::Equal => {
        i += 1;
        j += 1;
      }
    }
  }

  out
}

/// Intervals covered by every input list.
///
/// No inputs, or any empty input, gives an empty result. A single input is
/// returned unchanged.
pub fn intersect_all(sets: &[Vec<Interval>]) -> Vec<Interval> {
  let Some((first, rest)) = sets.split_first() else {
    return Vec::new();
  };
  if sets.iter().any(Vec::is_empty) {
    return Vec::new();
  }

  let mut acc = first.clone();
  for set in rest {
    acc = intersect_pair(&acc, set);
    if acc.is_empty() {
      break;
    }
  }
  acc
}

/// Network-level failures of `subnet_id`: periods in which every device's
/// failure set had an incident.
///
/// The emitted incidents carry `sample_count = 0`; the count has no meaning
/// for an interval derived from several devices.
pub fn subnet_failures(subnet_id: &str, device_sets: &[&DeviceIncidentSet]) -> DeviceIncidentSet {
  let intervals: Vec<Vec<Interval>> = device_sets
    .iter()
    .map(|set| set.iter().map(Incident::interval).collect())
    .collect();

  intersect_all(&intervals)
    .into_iter()
    .map(|iv| Incident {
      kind: IncidentKind::Failure,
      subject_id: subnet_id.to_string(),
      start: iv.start,
      end: iv.end,
      sample_count: 0,
    })
    .collect()
}
