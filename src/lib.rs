// Copyright 2026 Hypermesh Foundation. All rights reserved.
// LearnCoin Simulation Suite ("The Arena")

pub mod types;
pub mod config;
pub mod population;
pub mod matching;
pub mod rewards;
pub mod statistics;
pub mod scenario;
pub mod snapshot;
pub mod conservation;
pub mod simulation;
#[cfg(not(target_arch = "wasm32"))]
pub mod clock;

pub use types::*;
pub use config::{ConfigError, OverlapPolicy, SimConfig};
pub use scenario::{ScenarioAction, ScenarioHandler};
pub use simulation::Simulation;

use wasm_bindgen::prelude::*;

fn js_error(e: ConfigError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl Simulation {
    /// Default economy with the given seed.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32) -> Result<Simulation, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let config = SimConfig { seed: u64::from(seed), ..SimConfig::default() };
        Simulation::with_config(config).map_err(js_error)
    }

    /// Economy built from a JSON config; missing fields take defaults.
    pub fn from_json(config: &str) -> Result<Simulation, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let config = SimConfig::from_json_str(config).map_err(js_error)?;
        Simulation::with_config(config).map_err(js_error)
    }

    pub fn tick(&mut self) -> JsValue {
        let result = self.tick_core();
        serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
    }

    /// Run N ticks without returning results.
    pub fn run_batch(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.tick_core();
        }
    }

    pub fn get_users(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.users()).unwrap_or(JsValue::NULL)
    }

    pub fn get_problems(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.problems()).unwrap_or(JsValue::NULL)
    }

    pub fn get_snapshot(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.snapshot_view()).unwrap_or(JsValue::NULL)
    }

    pub fn get_stats(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.stats()).unwrap_or(JsValue::NULL)
    }

    pub fn get_company_wallet(&self) -> f64 {
        self.company_wallet()
    }

    pub fn get_tick(&self) -> u32 {
        u32::try_from(self.tick_index).unwrap_or(u32::MAX)
    }

    /// Reset simulation to its initial state.
    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.restart().map_err(js_error)
    }
}
