use crate::{
    bus::CpuBus,
    controller::ControllerPorts,
    nmi::NmiScheduler,
    ppu::{Ppu, PpuConfig},
    ram::SharedRam,
};

/// Everything one frame needs, owned as a unit so it can travel with a
/// watchdog attempt and come back when the handler returns.
#[derive(Debug)]
pub struct Console {
    ppu: Ppu,
    controllers: ControllerPorts,
    scheduler: NmiScheduler,
    ram: SharedRam,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Powered-on console with cleared memory.
    pub fn new() -> Self {
        Self::with_parts(PpuConfig::default(), SharedRam::new())
    }

    /// Console over caller-provided memory, e.g. RAM preloaded from a snapshot.
    pub fn with_parts(ppu_config: PpuConfig, ram: SharedRam) -> Self {
        Self {
            ppu: Ppu::with_config(ppu_config),
            controllers: ControllerPorts::new(),
            scheduler: NmiScheduler::new(),
            ram,
        }
    }

    /// Dispatcher view over the devices and memory.
    pub fn bus(&mut self) -> CpuBus<'_> {
        CpuBus::new(&mut self.ppu, &mut self.controllers, &self.ram)
    }

    /// Power cycle: devices, scheduler history and memory are all cleared.
    pub fn reset(&mut self) {
        self.ppu.reset();
        self.controllers.reset();
        self.scheduler = NmiScheduler::new();
        self.ram.clear();
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    pub fn controllers(&self) -> &ControllerPorts {
        &self.controllers
    }

    pub fn controllers_mut(&mut self) -> &mut ControllerPorts {
        &mut self.controllers
    }

    pub fn scheduler(&self) -> &NmiScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut NmiScheduler {
        &mut self.scheduler
    }

    pub fn ram(&self) -> &SharedRam {
        &self.ram
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nmi::WARMUP_SKIPS;

    #[test]
    fn reset_is_a_power_cycle() {
        let mut console = Console::new();
        {
            let mut bus = console.bus();
            bus.write(0x2000, 0x80);
            bus.write(0x0010, 0xAA);
        }
        console.scheduler_mut().disable(0, 0);
        console.reset();

        assert!(!console.ppu().control().nmi_enabled());
        assert_eq!(console.ram().read(0x0010), 0);
        assert_eq!(console.scheduler().pending_skips(), WARMUP_SKIPS);
    }
}
