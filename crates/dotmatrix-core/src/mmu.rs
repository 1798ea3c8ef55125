use log::warn;

use crate::{
    cartridge::Cartridge,
    input::{Buttons, Input},
    interrupts,
    ppu::Ppu,
    serial::Serial,
    timer::Timer,
};

/// The memory bus: owns every addressable component and routes 16-bit
/// reads/writes to whichever one claims the address.
pub struct Mmu {
    pub wram: [u8; 0x2000],
    pub hram: [u8; 0x7F],
    pub cart: Option<Cartridge>,
    pub if_reg: u8,
    pub ie_reg: u8,
    pub serial: Serial,
    pub ppu: Ppu,
    pub timer: Timer,
    pub input: Input,
}

impl Mmu {
    pub fn new() -> Self {
        Self {
            wram: [0; 0x2000],
            hram: [0; 0x7F],
            cart: None,
            // Post-boot interrupt-flag state: VBlank already latched.
            if_reg: 0xE1,
            ie_reg: 0,
            serial: Serial::new(),
            ppu: Ppu::new(),
            timer: Timer::new(),
            input: Input::new(),
        }
    }

    pub fn load_cart(&mut self, cart: Cartridge) {
        self.cart = Some(cart);
    }

    pub fn read_byte(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x7FFF | 0xA000..=0xBFFF => {
                self.cart.as_ref().map(|c| c.read(addr)).unwrap_or(0xFF)
            }
            0x8000..=0x9FFF => self.ppu.vram[(addr - 0x8000) as usize],
            0xC000..=0xDFFF => self.wram[(addr - 0xC000) as usize],
            // Echo RAM mirrors 0xC000-0xDDFF.
            0xE000..=0xFDFF => self.wram[(addr - 0x2000 - 0xC000) as usize],
            0xFE00..=0xFE9F => self.ppu.oam[(addr - 0xFE00) as usize],
            0xFEA0..=0xFEFF => 0xFF,
            0xFF00 => self.input.read(),
            0xFF01 | 0xFF02 => self.serial.read(addr),
            0xFF04..=0xFF07 => self.timer.read(addr),
            0xFF0F => self.if_reg | 0xE0,
            0xFF40..=0xFF45 | 0xFF47..=0xFF4B => self.ppu.read_reg(addr),
            0xFF46 => self.ppu.dma,
            0xFF80..=0xFFFE => self.hram[(addr - 0xFF80) as usize],
            0xFFFF => self.ie_reg,
            _ => 0xFF,
        }
    }

    pub fn write_byte(&mut self, addr: u16, val: u8) {
        match addr {
            // ROM-range writes are bank-control commands for the MBC.
            0x0000..=0x7FFF | 0xA000..=0xBFFF => {
                if let Some(cart) = self.cart.as_mut() {
                    cart.write(addr, val);
                }
            }
            0x8000..=0x9FFF => self.ppu.vram[(addr - 0x8000) as usize] = val,
            0xC000..=0xDFFF => self.wram[(addr - 0xC000) as usize] = val,
            0xE000..=0xFDFF => self.wram[(addr - 0x2000 - 0xC000) as usize] = val,
            0xFE00..=0xFE9F => self.ppu.oam[(addr - 0xFE00) as usize] = val,
            0xFEA0..=0xFEFF => {}
            0xFF00 => self.input.write(val),
            0xFF01 | 0xFF02 => self.serial.write(addr, val),
            0xFF04..=0xFF07 => self.timer.write(addr, val),
            0xFF0F => self.if_reg = (val & interrupts::MASK) | (self.if_reg & 0xE0),
            0xFF40..=0xFF45 | 0xFF47..=0xFF4B => self.ppu.write_reg(addr, val),
            0xFF46 => self.oam_dma(val),
            0xFF80..=0xFFFE => self.hram[(addr - 0xFF80) as usize] = val,
            0xFFFF => self.ie_reg = val,
            _ => {}
        }
    }

    /// OAM DMA: copy 160 bytes from `val * 0x100` into OAM. Performed
    /// synchronously; the CPU-stall window of real hardware is not modeled.
    fn oam_dma(&mut self, val: u8) {
        self.ppu.dma = val;
        let src = (val as u16) << 8;
        for i in 0..0xA0u16 {
            let byte = self.read_byte(src.wrapping_add(i));
            self.ppu.oam[i as usize] = byte;
        }
    }

    /// Advance the timer unit; returns `true` when TIMA overflowed so the
    /// CPU can drop out of HALT.
    pub fn tick(&mut self, cycles: u32) -> bool {
        self.timer.step(cycles, &mut self.if_reg)
    }

    /// Apply a fresh joypad snapshot, raising the joypad interrupt on new
    /// presses.
    pub fn set_buttons(&mut self, buttons: Buttons) {
        self.input.set_buttons(buttons, &mut self.if_reg);
    }

    pub fn take_serial(&mut self) -> Vec<u8> {
        self.serial.take_output()
    }

    pub fn save_cart_ram(&mut self) {
        if let Some(cart) = &self.cart {
            if let Err(e) = cart.save_ram() {
                warn!("failed to save cartridge RAM: {e}");
            }
        }
    }
}

impl Default for Mmu {
    fn default() -> Self {
        Self::new()
    }
}
