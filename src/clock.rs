// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LearnCoin Simulation Suite ("The Arena") - Fixed-Interval Clock

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::{ConfigError, OverlapPolicy, SimConfig};
use crate::simulation::Simulation;

/// Something that advances by one block per call.
pub trait Tickable {
    fn step(&mut self);
}

impl Tickable for Simulation {
    fn step(&mut self) {
        self.tick_core();
    }
}

/// Cloneable flag that halts a running clock before its next tick.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClockReport {
    pub ticks_run: u64,
    pub slots_skipped: u64,
    pub stopped: bool,
}

/// Drives a [`Tickable`] once per interval on the calling thread. Ticks never
/// overlap; `policy` decides what happens to slots a slow tick ran through.
#[derive(Debug, Clone)]
pub struct Clock {
    interval: Duration,
    policy: OverlapPolicy,
    stop: StopHandle,
}

impl Clock {
    pub fn new(interval: Duration, policy: OverlapPolicy) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }
        Ok(Self { interval, policy, stop: StopHandle::default() })
    }

    pub fn from_config(config: &SimConfig) -> Result<Self, ConfigError> {
        Self::new(config.tick_interval(), config.overlap_policy)
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Tick until stopped or until `max_ticks` have run. `None` runs forever.
    pub fn run<T: Tickable + ?Sized>(&self, target: &mut T, max_ticks: Option<u64>) -> ClockReport {
        let mut report = ClockReport::default();
        let mut next = Instant::now() + self.interval;

        loop {
            if max_ticks.map_or(false, |max| report.ticks_run >= max) {
                break;
            }
            let now = Instant::now();
            if next > now {
                std::thread::sleep(next - now);
            }
            if self.stop.is_stopped() {
                report.stopped = true;
                break;
            }

            target.step();
            report.ticks_run += 1;
            next += self.interval;

            let now = Instant::now();
            if now > next && self.policy == OverlapPolicy::Skip {
                let behind = (now - next).as_nanos() / self.interval.as_nanos();
                let missed = behind as u64 + 1;
                next += self.interval * missed as u32;
                report.slots_skipped += missed;
                log::warn!("tick overran its interval; skipped {} slot(s)", missed);
            }
        }
        report
    }
}
