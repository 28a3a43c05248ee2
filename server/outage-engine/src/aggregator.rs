//! Group finalized incidents by device and devices by subnet.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{DeviceId, DeviceIncidentSet, Incident, SubnetId};

/// Partition incidents by subject, keeping each subject's incidents sorted by start.
///
/// Detectors emit closed incidents as they happen and open ones at the end,
/// so a device's incidents may arrive out of start order; the sort restores it.
pub fn group_by_device<I>(incidents: I) -> BTreeMap<DeviceId, DeviceIncidentSet>
where
  I: IntoIterator<Item = Incident>,
{
  let mut groups: BTreeMap<DeviceId, DeviceIncidentSet> = BTreeMap::new();
  for incident in incidents {
    groups.entry(incident.subject_id.clone()).or_default().push(incident);
  }
  for set in groups.values_mut() {
    set.sort_by_key(|i| i.start);
  }
  groups
}

/// Distinct devices per subnet.
pub fn devices_of_subnet<'a, I, F>(device_ids: I, subnet_of: F) -> BTreeMap<SubnetId, BTreeSet<DeviceId>>
where
  I: IntoIterator<Item = &'a DeviceId>,
  F: Fn(&str) -> SubnetId,
{
  let mut subnets: BTreeMap<SubnetId, BTreeSet<DeviceId>> = BTreeMap::new();
  for id in device_ids {
    subnets.entry(subnet_of(id)).or_default().insert(id.clone());
  }
  subnets
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::subnet::subnet_of;
  use crate::types::IncidentKind;
  use chrono::NaiveDate;

  fn incident(subject: &str, hour: u32) -> Incident {
    Incident {
      kind: IncidentKind::Failure,
      subject_id: subject.into(),
      start: NaiveDate::from_ymd_opt(2022, 1, 1)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap(),
      end: None,
      sample_count: 1,
    }
  }

  #[test]
  fn groups_and_sorts_by_start() {
    let grouped = group_by_device(vec![
      incident("10.0.0.2/24", 5),
      incident("10.0.0.1/24", 3),
      incident("10.0.0.2/24", 1),
    ]);
    assert_eq!(grouped.len(), 2);
    let second = &grouped["10.0.0.2/24"];
    assert_eq!(second.len(), 2);
    assert!(second[0].start < second[1].start);
  }

  #[test]
  fn devices_are_bucketed_by_subnet() {
    let ids: Vec<DeviceId> = vec![
      "10.10.10.1/24".into(),
      "10.10.10.2/24".into(),
      "30.30.0.1/16".into(),
      "10.10.10.1/24".into(),
    ];
    let subnets = devices_of_subnet(&ids, subnet_of);
    assert_eq!(subnets.len(), 2);
    assert_eq!(subnets["10.10.10.0/24"].len(), 2);
    assert!(subnets["30.30.0.0/16"].contains("30.30.0.1/16"));
  }
}
