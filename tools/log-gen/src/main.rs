//! log-gen: synthetic ping log for exercising the outage engine
//!
//! Usage:
//!   log-gen                    # scenario starting 2022-01-01 00:00:00
//!   log-gen --start <YYYYMMDDHHMMSS>
//!
//! Prints `timestamp,address/prefix,latency` lines to stdout, nine devices
//! on three subnets, one probe round every 10 seconds. Timeouts are `-`.

use std::env;
use std::process;

use chrono::{Duration, NaiveDateTime};

const LOG_DATETIME_FORMAT: &str = "%Y%m%d%H%M%S";
const DEFAULT_START: &str = "20220101000000";
const HEALTHY_MS: u32 = 5;
const OVERLOADED_MS: u32 = 100;

#[derive(Debug, Clone, Copy)]
struct Device {
    subnet: u8,
    host: u8,
    overload: bool,
    failing: bool,
}

impl Device {
    fn address(&self) -> String {
        match self.subnet {
            1 => format!("10.10.10.{}/24", self.host),
            2 => format!("20.20.20.{}/24", self.host),
            _ => format!("30.30.0.{}/16", self.host),
        }
    }
}

struct Scenario {
    now: NaiveDateTime,
    step: Duration,
    devices: Vec<Device>,
    failing_subnets: Vec<u8>,
}

impl Scenario {
    fn new(start: NaiveDateTime) -> Self {
        let mut devices = Vec::new();
        for subnet in 1..=3 {
            for host in 1..=3 {
                devices.push(Device {
                    subnet,
                    host,
                    overload: false,
                    failing: false,
                });
            }
        }
        Self {
            now: start,
            step: Duration::seconds(10),
            devices,
            failing_subnets: Vec::new(),
        }
    }

    fn dev(&mut self, subnet: u8, host: u8) -> &mut Device {
        let idx = usize::from((subnet - 1) * 3 + (host - 1));
        &mut self.devices[idx]
    }

    fn fail(&mut self, subnet: u8, host: u8, failing: bool) {
        self.dev(subnet, host).failing = failing;
    }

    fn overload(&mut self, subnet: u8, host: u8, overload: bool) {
        self.dev(subnet, host).overload = overload;
    }

    fn ping_all(&self) {
        let ts = self.now.format(LOG_DATETIME_FORMAT);
        for d in &self.devices {
            let latency = if self.failing_subnets.contains(&d.subnet) || d.failing {
                "-".to_string()
            } else if d.overload {
                OVERLOADED_MS.to_string()
            } else {
                HEALTHY_MS.to_string()
            };
            println!("{},{},{}", ts, d.address(), latency);
        }
    }

    /// Advance one probe interval and emit a round.
    fn tick(&mut self) {
        self.now += self.step;
        self.ping_all();
    }
}

fn run(start: NaiveDateTime) {
    let mut s = Scenario::new(start);
    s.ping_all();

    // Staggered device failures on subnet 1: never all down together.
    s.fail(1, 1, true);
    s.fail(1, 3, true);
    s.tick();
    s.fail(1, 2, true);
    s.fail(1, 3, false);
    s.tick();
    s.fail(1, 1, false);
    s.tick();
    s.fail(1, 2, false);
    s.tick();

    // Subnet 2 degrades device by device, then the whole link drops.
    s.fail(2, 3, true);
    s.tick();
    s.fail(2, 1, true);
    s.tick();
    s.failing_subnets.push(2);
    s.tick();
    s.tick();
    s.tick();
    s.tick();

    s.overload(1, 1, true);
    s.overload(1, 2, true);
    s.fail(1, 3, true);
    s.fail(2, 1, false);
    s.fail(2, 3, false);
    s.overload(2, 2, true);
    s.tick();
    s.tick();
    s.fail(1, 2, true);
    s.tick();
    s.failing_subnets.retain(|&n| n != 2);
    s.tick();
    s.fail(1, 2, false);
    s.tick();
    s.overload(2, 2, false);
    s.fail(2, 3, false);
    s.tick();

    // Subnet 3 goes down and stays down past the end of the log.
    s.overload(1, 1, false);
    s.overload(1, 2, false);
    s.fail(1, 3, false);
    s.failing_subnets.push(3);
    s.tick();
    s.fail(1, 1, true);
    s.overload(1, 2, true);
    s.tick();
    s.tick();
    s.tick();
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let start = match args.iter().position(|a| a == "--start") {
        Some(i) => match args.get(i + 1) {
            Some(v) => v.as_str(),
            None => {
                eprintln!("Usage: log-gen [--start <YYYYMMDDHHMMSS>]");
                process::exit(2);
            }
        },
        None => DEFAULT_START,
    };

    let start = NaiveDateTime::parse_from_str(start, LOG_DATETIME_FORMAT).unwrap_or_else(|e| {
        eprintln!("log-gen: invalid start time {}: {}", start, e);
        process::exit(2);
    });

    run(start);
}
