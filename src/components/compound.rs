//! Devices defined by another circuit file.
//!
//! The sub-circuit's switches become the device inputs and its unaliased
//! monitors become the device outputs. Each parent pass runs one pass of the
//! sub-network, so the parent keeps relaxing until both have settled.

use std::path::PathBuf;

use crate::circuit::{DeviceId, Network, OutputId, OutputPin, Signal};

use super::DeviceKind;

#[derive(Debug, Clone)]
pub struct Subcircuit {
    /// File the sub-circuit was compiled from
    pub path: PathBuf,
    pub network: Network,
    /// Input pin name and the switch it drives
    pub inputs: Vec<(String, DeviceId)>,
    /// Output pin name and the signal it reads
    pub outputs: Vec<(String, OutputId)>,
}

impl Subcircuit {
    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|(name, _)| name.as_str())
    }

    pub fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(|(name, _)| name.as_str())
    }

    pub fn execute(&mut self, inputs: &[Signal], outputs: &mut [OutputPin]) -> bool {
        for (signal, (_, switch)) in inputs.iter().zip(&self.inputs) {
            if let DeviceKind::Switch(sw) = &mut self.network.device_mut(*switch).kind {
                sw.level = signal.level();
            }
        }

        let mut changed = self.network.execute_pass();

        for (pin, (_, source)) in outputs.iter_mut().zip(&self.outputs) {
            let target = self.network.output_signal(*source);
            changed |= pin.drive(target);
        }
        changed
    }
}
