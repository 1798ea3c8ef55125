use crate::{
    cartridge::Cartridge,
    cpu::Cpu,
    input::Buttons,
    mmu::Mmu,
    ppu::{FRAME_CYCLES, SCREEN_HEIGHT, SCREEN_WIDTH},
};

/// High-level DMG machine: the CPU plus the bus that owns everything else.
///
/// The host drives it with [`GameBoy::step`] (one instruction) or
/// [`GameBoy::step_frame`] (until the next VBlank), then reads the
/// framebuffer and feeds fresh input.
pub struct GameBoy {
    pub cpu: Cpu,
    pub mmu: Mmu,
}

impl GameBoy {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            mmu: Mmu::new(),
        }
    }

    /// Load a parsed cartridge. PC already points at the entry point
    /// (`0x0100`) from the simulated boot state.
    pub fn load_cart(&mut self, cart: Cartridge) {
        self.mmu.load_cart(cart);
    }

    /// Reset to the power-on state, preserving the loaded cartridge.
    pub fn reset(&mut self) {
        let cart = self.mmu.cart.take();
        self.cpu = Cpu::new();
        self.mmu = Mmu::new();
        self.mmu.cart = cart;
    }

    /// Execute one CPU step and clock the PPU by its cost.
    ///
    /// Returns `true` when the PPU just entered VBlank, i.e. exactly once
    /// per frame.
    pub fn step(&mut self) -> bool {
        let cycles = self.cpu.step(&mut self.mmu);
        self.mmu.ppu.step(cycles, &mut self.mmu.if_reg)
    }

    /// Run until the next completed frame.
    ///
    /// Bounded by two frames' worth of cycles so a disabled LCD (which never
    /// reports a frame) cannot hang the caller.
    pub fn step_frame(&mut self) {
        let limit = self.cpu.cycles + 2 * FRAME_CYCLES as u64;
        while !self.step() {
            if self.cpu.cycles >= limit {
                break;
            }
        }
    }

    /// The current frame as 160x144 shade indices.
    pub fn framebuffer(&self) -> &[u8; SCREEN_WIDTH * SCREEN_HEIGHT] {
        self.mmu.ppu.framebuffer()
    }

    /// Apply a fresh joypad snapshot from the host.
    pub fn set_buttons(&mut self, buttons: Buttons) {
        self.mmu.set_buttons(buttons);
    }

    /// Drain the serial debug side-channel.
    pub fn take_serial(&mut self) -> Vec<u8> {
        self.mmu.take_serial()
    }
}

impl Default for GameBoy {
    fn default() -> Self {
        Self::new()
    }
}
