//! Fixed-point relaxation over a network.

use log::trace;

use crate::circuit::Network;
use crate::components::DeviceKind;

impl Network {
    /// Advance every clock by one tick, including clocks inside compound
    /// devices.
    pub fn tick_clocks(&mut self) {
        for device in self.devices_mut() {
            match &mut device.kind {
                DeviceKind::Clock(clock) => clock.tick(&mut device.outputs[0]),
                DeviceKind::Compound(sub) => sub.network.tick_clocks(),
                _ => {}
            }
        }
    }

    /// Evaluate every device once, in network order.
    ///
    /// Each device reads whatever its inputs hold at that moment, so a pass
    /// may see values from devices not yet updated in this pass. Returns true
    /// if any output changed.
    pub fn execute_pass(&mut self) -> bool {
        let mut changed = false;
        for i in 0..self.order().len() {
            let id = self.order()[i];
            let inputs = self.input_signals(id);
            changed |= self.device_mut(id).execute(&inputs);
        }
        changed
    }

    /// Run one tick: advance the clocks, then relax until a pass changes
    /// nothing.
    ///
    /// Returns false if the network is still changing after `max_passes`
    /// passes.
    pub fn execute_devices(&mut self, max_passes: usize) -> bool {
        self.tick_clocks();
        for pass in 1..=max_passes {
            if !self.execute_pass() {
                trace!("steady after {} pass(es)", pass);
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{OutputId, Signal};
    use crate::components::DeviceType;
    use crate::dsl::{FileId, SourcePos};

    fn pos() -> SourcePos {
        SourcePos::start_of(FileId(0))
    }

    #[test]
    fn test_and_gate_settles() {
        let mut net = Network::new();
        let a = net.symbols.intern("A");
        let b = net.symbols.intern("B");
        let g = net.symbols.intern("G");
        let i1 = net.symbols.intern("I1");
        let i2 = net.symbols.intern("I2");

        let mut switch = DeviceKind::new(DeviceType::Switch);
        if let DeviceKind::Switch(sw) = &mut switch {
            sw.set(true);
        }
        let a = net.add_device(a, switch.clone(), pos());
        let b = net.add_device(b, switch, pos());
        let g = net.add_device(g, DeviceKind::new(DeviceType::And), pos());
        net.add_input(g, i1, pos());
        net.add_input(g, i2, pos());
        net.connect(g, 0, OutputId { device: a, pin: 0 });
        net.connect(g, 1, OutputId { device: b, pin: 0 });

        assert!(net.execute_devices(20));
        assert_eq!(net.output_signal(OutputId { device: g, pin: 0 }), Signal::High);
    }

    #[test]
    fn test_inverter_loop_oscillates() {
        let mut net = Network::new();
        let g = net.symbols.intern("G");
        let i1 = net.symbols.intern("I1");
        let g = net.add_device(g, DeviceKind::new(DeviceType::Nand), pos());
        net.add_input(g, i1, pos());
        net.connect(g, 0, OutputId { device: g, pin: 0 });

        assert!(!net.execute_devices(20));
        assert!(!net.execute_devices(20));
    }

    #[test]
    fn test_clock_edge_visible_same_tick() {
        let mut net = Network::new();
        let clk = net.symbols.intern("CLK");
        let clk = net.add_device(clk, DeviceKind::new(DeviceType::Clock), pos());
        if let DeviceKind::Clock(clock) = &mut net.device_mut(clk).kind {
            clock.set_period(1);
        }
        let out = OutputId { device: clk, pin: 0 };

        net.tick_clocks();
        assert_eq!(net.output_signal(out), Signal::Rising);
        assert!(net.execute_pass());
        assert_eq!(net.output_signal(out), Signal::High);
        assert!(!net.execute_pass());
    }
}
