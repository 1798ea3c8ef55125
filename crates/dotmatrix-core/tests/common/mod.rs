#![allow(dead_code)]

use dotmatrix_core::{cartridge::Cartridge, gameboy::GameBoy};

/// Wrap a program in a minimal ROM-only image with the program placed at the
/// entry point (`0x0100`).
pub fn rom_with_program(program: &[u8]) -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];
    rom[0x0100..0x0100 + program.len()].copy_from_slice(program);
    rom
}

/// Boot a machine with `program` at `0x0100` and interrupts quiesced so
/// tests control IF/IE themselves.
pub fn boot_with_program(program: &[u8]) -> GameBoy {
    let mut gb = GameBoy::new();
    gb.load_cart(Cartridge::load(rom_with_program(program)).expect("test ROM must load"));
    gb.mmu.if_reg = 0;
    gb
}

/// Step until the CPU halts, with a step bound so a broken test fails
/// instead of spinning.
pub fn step_until_halt(gb: &mut GameBoy) {
    for _ in 0..10_000 {
        gb.step();
        if gb.cpu.halted {
            return;
        }
    }
    panic!("CPU did not halt; state: {}", gb.cpu.debug_state());
}
