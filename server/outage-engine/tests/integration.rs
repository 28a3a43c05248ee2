//! Integration tests for the outage engine.

use std::io::{BufReader, Write};

use chrono::{Duration, NaiveDate};
use outage_engine::types::Timestamp;
use outage_engine::{analyze, parse, subnet, Config, EngineError, Interval, Sample};

fn t(min: i64) -> Timestamp {
  NaiveDate::from_ymd_opt(2022, 1, 1)
    .unwrap()
    .and_hms_opt(0, 0, 0)
    .unwrap()
    + Duration::minutes(min)
}

fn iv(start: i64, end: Option<i64>) -> Interval {
  Interval::new(t(start), end.map(t))
}

/// One sample per minute per device over `0..until`; `down(device, minute)` decides timeouts.
fn minute_samples(devices: &[&str], until: i64, down: impl Fn(&str, i64) -> bool) -> Vec<Sample> {
  let mut samples = Vec::new();
  for m in 0..until {
    for &d in devices {
      let latency = if down(d, m) { None } else { Some(5) };
      samples.push(Sample::new(t(m), d, latency));
    }
  }
  samples
}

const X: &str = "10.10.10.1/24";
const Y: &str = "10.10.10.2/24";
const NET: &str = "10.10.10.0/24";

#[test]
fn two_devices_overlap_into_subnet_incident() {
  let samples = minute_samples(&[X, Y], 60, |d, m| match d {
    X => (10..40).contains(&m),
    _ => (20..50).contains(&m),
  });
  let config = Config {
    failure_tolerance: 2,
    ..Config::default()
  };
  let analysis = analyze(samples, &config).unwrap();

  let x: Vec<_> = analysis.device_failures[X].iter().map(|i| i.interval()).collect();
  let y: Vec<_> = analysis.device_failures[Y].iter().map(|i| i.interval()).collect();
  let net: Vec<_> = analysis.subnet_failures[NET].iter().map(|i| i.interval()).collect();
  assert_eq!(x, vec![iv(10, Some(40))]);
  assert_eq!(y, vec![iv(20, Some(50))]);
  assert_eq!(net, vec![iv(20, Some(40))]);
}

#[test]
fn one_healthy_device_means_no_network_incident() {
  let samples = minute_samples(&[X, Y], 20, |d, m| d == X && m < 10);
  let analysis = analyze(samples, &Config::default()).unwrap();
  assert_eq!(analysis.device_failures[X].len(), 1);
  assert!(analysis.device_failures[Y].is_empty());
  assert!(analysis.subnet_failures[NET].is_empty());
}

#[test]
fn open_incidents_intersect_to_open_subnet_incident() {
  let samples = minute_samples(&[X, Y], 30, |d, m| match d {
    X => m >= 12,
    _ => m >= 17,
  });
  let analysis = analyze(samples, &Config::default()).unwrap();
  let net = &analysis.subnet_failures[NET];
  assert_eq!(net.len(), 1);
  assert_eq!(net[0].interval(), iv(17, None));
  assert!(net[0].is_open());
}

#[test]
fn single_device_subnet_mirrors_device() {
  let solo = "30.30.0.1/16";
  let samples = minute_samples(&[solo], 40, |_, m| (3..9).contains(&m) || m >= 30);
  let analysis = analyze(samples, &Config::default()).unwrap();
  let device: Vec<_> = analysis.device_failures[solo].iter().map(|i| i.interval()).collect();
  let net: Vec<_> = analysis.subnet_failures["30.30.0.0/16"].iter().map(|i| i.interval()).collect();
  assert_eq!(device, net);
  assert_eq!(device.len(), 2);
}

#[test]
fn subnets_are_analyzed_independently() {
  let a = "10.10.10.1/24";
  let b = "20.20.20.1/24";
  let samples = minute_samples(&[a, b], 10, |d, m| d == a && m < 5);
  let analysis = analyze(samples, &Config::default()).unwrap();
  assert_eq!(analysis.subnet_failures["10.10.10.0/24"].len(), 1);
  assert!(analysis.subnet_failures["20.20.20.0/24"].is_empty());
}

#[test]
fn overloads_are_debounced_separately() {
  let latencies = [5, 100, 5, 100, 100, 100, 5, 100];
  let samples: Vec<Sample> = latencies
    .iter()
    .enumerate()
    .map(|(m, &ms)| Sample::new(t(m as i64), X, Some(ms)))
    .collect();
  let config = Config {
    overload_tolerance: 2,
    overload_threshold: Some(50),
    ..Config::default()
  };
  let analysis = analyze(samples, &config).unwrap();
  let overloads: Vec<_> = analysis.device_overloads[X].iter().map(|i| i.interval()).collect();
  assert_eq!(overloads, vec![iv(3, Some(6))]);
  assert!(analysis.device_failures[X].is_empty());
}

#[test]
fn log_file_end_to_end() {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  write!(
    file,
    "20220101000000,10.10.10.1/24,5\n\
     20220101000000,10.10.10.2/24,5\n\
     20220101000010,10.10.10.1/24,-\n\
     20220101000010,10.10.10.2/24,-\n\
     20220101000020,10.10.10.1/24,-\n\
     20220101000020,10.10.10.2/24,5\n\
     20220101000030,10.10.10.1/24,5\n\
     20220101000030,10.10.10.2/24,5\n"
  )
  .unwrap();

  let reader = BufReader::new(file.reopen().unwrap());
  let analysis =
    outage_engine::analyze_results(parse::read_samples(reader), &Config::default(), subnet::subnet_of).unwrap();

  let net = &analysis.subnet_failures[NET];
  assert_eq!(net.len(), 1);
  assert_eq!(net[0].duration().unwrap().num_seconds(), 10);
  assert_eq!(analysis.device_failures[X][0].sample_count, 2);
}

#[test]
fn malformed_line_aborts_whole_analysis() {
  let log = "20220101000000,10.10.10.1/24,5\n20220101000010,10.10.10.1/24,-7\n";
  let err = outage_engine::analyze_results(
    parse::read_samples(log.as_bytes()),
    &Config::default(),
    subnet::subnet_of,
  )
  .unwrap_err();
  assert!(matches!(err, EngineError::MalformedSample { .. }));
}
