// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LearnCoin Simulation Suite ("The Arena") - Snapshot Emission

use serde::Serialize;
use std::io::Write;

use crate::types::{Problem, User};

/// Read-only view of the world handed to sinks every snapshot interval.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SnapshotView<'a> {
    pub tick: u64,
    pub company_wallet: f64,
    pub users: &'a [User],
    pub problems: &'a [Problem],
}

pub trait SnapshotSink {
    fn emit(&mut self, view: &SnapshotView<'_>);
}

/// Logs a one-line summary at info and the full view at debug.
#[derive(Debug, Default)]
pub struct LogSink;

impl SnapshotSink for LogSink {
    fn emit(&mut self, view: &SnapshotView<'_>) {
        log::info!(
            "iteration {}: {} users, {} problems, company wallet {:.4}",
            view.tick,
            view.users.len(),
            view.problems.len(),
            view.company_wallet
        );
        if log::log_enabled!(log::Level::Debug) {
            match serde_json::to_string_pretty(view) {
                Ok(json) => log::debug!("{}", json),
                Err(e) => log::warn!("snapshot serialization failed: {}", e),
            }
        }
    }
}

/// Writes one JSON object per snapshot, one per line.
pub struct JsonLinesSink<W: Write> {
    out: W,
    written: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SnapshotSink for JsonLinesSink<W> {
    fn emit(&mut self, view: &SnapshotView<'_>) {
        let line = match serde_json::to_string(view) {
            Ok(line) => line,
            Err(e) => {
                log::warn!("snapshot {} not serialized: {}", view.tick, e);
                return;
            }
        };
        match writeln!(self.out, "{}", line) {
            Ok(()) => self.written += 1,
            Err(e) => log::warn!("snapshot {} not written: {}", view.tick, e),
        }
    }
}
