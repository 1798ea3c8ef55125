mod common;

use dotmatrix_core::{
    cartridge::Cartridge,
    input::Buttons,
    mmu::Mmu,
};

fn mbc1_rom(banks: usize) -> Vec<u8> {
    let mut rom = vec![0u8; banks * 0x4000];
    rom[0x0147] = 0x01; // MBC1
    for bank in 0..banks {
        rom[bank * 0x4000] = bank as u8;
    }
    rom
}

#[test]
fn wram_echo_mirrors_both_ways() {
    let mut mmu = Mmu::new();
    mmu.write_byte(0xC000, 0xAA);
    assert_eq!(mmu.read_byte(0xE000), 0xAA);
    mmu.write_byte(0xE123, 0xBB);
    assert_eq!(mmu.read_byte(0xC123), 0xBB);
}

#[test]
fn unusable_region_reads_ff() {
    let mut mmu = Mmu::new();
    for addr in 0xFEA0..=0xFEFF {
        mmu.write_byte(addr, 0x12);
        assert_eq!(mmu.read_byte(addr), 0xFF);
    }
}

#[test]
fn unmapped_io_reads_ff() {
    let mmu = Mmu::new();
    assert_eq!(mmu.read_byte(0xFF03), 0xFF);
    assert_eq!(mmu.read_byte(0xFF4C), 0xFF);
    assert_eq!(mmu.read_byte(0xFF7F), 0xFF);
}

#[test]
fn reads_without_cartridge_are_open_bus() {
    let mmu = Mmu::new();
    assert_eq!(mmu.read_byte(0x0000), 0xFF);
    assert_eq!(mmu.read_byte(0x4000), 0xFF);
    assert_eq!(mmu.read_byte(0xA000), 0xFF);
}

#[test]
fn oam_dma_copies_synchronously() {
    let mut mmu = Mmu::new();
    for i in 0..0xA0u16 {
        mmu.write_byte(0xC000 + i, i as u8);
    }
    mmu.write_byte(0xFF46, 0xC0);
    assert_eq!(mmu.ppu.oam[0x00], 0x00);
    assert_eq!(mmu.ppu.oam[0x42], 0x42);
    assert_eq!(mmu.ppu.oam[0x9F], 0x9F);
    assert_eq!(mmu.read_byte(0xFF46), 0xC0);
}

#[test]
fn rom_writes_are_ignored_without_mbc() {
    let mut rom = vec![0u8; 0x8000];
    rom[0x1234] = 0x5A;
    let mut mmu = Mmu::new();
    mmu.load_cart(Cartridge::load(rom).unwrap());
    mmu.write_byte(0x1234, 0x00);
    assert_eq!(mmu.read_byte(0x1234), 0x5A);
}

#[test]
fn mbc1_rom_bank_switching() {
    let mut mmu = Mmu::new();
    mmu.load_cart(Cartridge::load(mbc1_rom(64)).unwrap());

    // Default switchable bank is 1.
    assert_eq!(mmu.read_byte(0x4000), 1);

    mmu.write_byte(0x2000, 0x02);
    assert_eq!(mmu.read_byte(0x4000), 2);

    // High bits from the secondary register apply in mode 0.
    mmu.write_byte(0x4000, 0x01);
    assert_eq!(mmu.read_byte(0x4000), 0x22);

    // In mode 1 the secondary register stops affecting the ROM bank.
    mmu.write_byte(0x6000, 0x01);
    assert_eq!(mmu.read_byte(0x4000), 2);

    // Bank 0 stays fixed at 0x0000-0x3FFF throughout.
    assert_eq!(mmu.read_byte(0x0000), 0);
}

#[test]
fn mbc1_bank_zero_write_selects_bank_one() {
    let mut mmu = Mmu::new();
    mmu.load_cart(Cartridge::load(mbc1_rom(8)).unwrap());
    mmu.write_byte(0x2000, 0x00);
    assert_eq!(mmu.read_byte(0x4000), 1);
}

#[test]
fn mbc1_ram_enable_gate() {
    let mut rom = mbc1_rom(4);
    rom[0x0147] = 0x03; // MBC1+RAM+BATTERY
    rom[0x0149] = 0x03; // 32KB
    let mut mmu = Mmu::new();
    mmu.load_cart(Cartridge::load(rom).unwrap());

    mmu.write_byte(0xA000, 0x55);
    assert_eq!(mmu.read_byte(0xA000), 0xFF);

    mmu.write_byte(0x0000, 0x0A);
    mmu.write_byte(0xA000, 0x55);
    assert_eq!(mmu.read_byte(0xA000), 0x55);

    mmu.write_byte(0x0000, 0x00);
    assert_eq!(mmu.read_byte(0xA000), 0xFF);
}

#[test]
fn mbc1_ram_banking_in_mode_one() {
    let mut rom = mbc1_rom(4);
    rom[0x0147] = 0x02; // MBC1+RAM
    rom[0x0149] = 0x03; // 32KB, four banks
    let mut mmu = Mmu::new();
    mmu.load_cart(Cartridge::load(rom).unwrap());

    mmu.write_byte(0x0000, 0x0A); // enable RAM
    mmu.write_byte(0x6000, 0x01); // mode 1

    mmu.write_byte(0x4000, 0x00);
    mmu.write_byte(0xA000, 0x11);
    mmu.write_byte(0x4000, 0x01);
    mmu.write_byte(0xA000, 0x22);

    mmu.write_byte(0x4000, 0x00);
    assert_eq!(mmu.read_byte(0xA000), 0x11);
    mmu.write_byte(0x4000, 0x01);
    assert_eq!(mmu.read_byte(0xA000), 0x22);

    // Mode 0 pins RAM accesses to bank 0.
    mmu.write_byte(0x6000, 0x00);
    assert_eq!(mmu.read_byte(0xA000), 0x11);
}

#[test]
fn serial_debug_side_channel() {
    let mut mmu = Mmu::new();
    for &b in b"Passed" {
        mmu.write_byte(0xFF01, b);
        mmu.write_byte(0xFF02, 0x81);
    }
    assert_eq!(mmu.take_serial(), b"Passed");
    assert!(mmu.take_serial().is_empty());
    // No serial interrupt is raised by the side-channel.
    assert_eq!(mmu.if_reg & 0x08, 0);
}

#[test]
fn joypad_row_selection() {
    let mut mmu = Mmu::new();
    mmu.if_reg = 0;
    mmu.set_buttons(Buttons {
        a: true,
        ..Buttons::default()
    });

    // Action row selected (bit 5 low): A reads as 0 in bit 0.
    mmu.write_byte(0xFF00, 0x10);
    assert_eq!(mmu.read_byte(0xFF00), 0xDE);

    // Direction row selected: nothing pressed there.
    mmu.write_byte(0xFF00, 0x20);
    assert_eq!(mmu.read_byte(0xFF00), 0xEF);

    // Both rows selected: nibbles AND together.
    mmu.write_byte(0xFF00, 0x00);
    assert_eq!(mmu.read_byte(0xFF00), 0xCE);
}

#[test]
fn joypad_interrupt_only_on_new_press() {
    let mut mmu = Mmu::new();
    mmu.if_reg = 0;

    let pressed = Buttons {
        start: true,
        ..Buttons::default()
    };
    mmu.set_buttons(pressed);
    assert_eq!(mmu.if_reg & 0x10, 0x10);

    mmu.if_reg = 0;
    mmu.set_buttons(pressed); // held, no edge
    assert_eq!(mmu.if_reg & 0x10, 0);

    mmu.set_buttons(Buttons::default()); // release, no interrupt
    assert_eq!(mmu.if_reg & 0x10, 0);
}

#[test]
fn if_register_masks_to_five_bits() {
    let mut mmu = Mmu::new();
    mmu.write_byte(0xFF0F, 0xFF);
    assert_eq!(mmu.read_byte(0xFF0F), 0xFF);
    mmu.write_byte(0xFF0F, 0x00);
    assert_eq!(mmu.read_byte(0xFF0F), 0xE0); // unused bits read as 1
}

#[test]
fn ie_register_roundtrip() {
    let mut mmu = Mmu::new();
    mmu.write_byte(0xFFFF, 0x15);
    assert_eq!(mmu.read_byte(0xFFFF), 0x15);
}

#[test]
fn timer_register_masks() {
    let mut mmu = Mmu::new();
    mmu.write_byte(0xFF07, 0x05);
    assert_eq!(mmu.read_byte(0xFF07), 0xFD);

    mmu.tick(256);
    assert_eq!(mmu.read_byte(0xFF04), 1);
    mmu.write_byte(0xFF04, 0x77); // any write clears DIV
    assert_eq!(mmu.read_byte(0xFF04), 0);
}

#[test]
fn stat_mode_bits_are_read_only() {
    let mut mmu = Mmu::new();
    mmu.write_byte(0xFF41, 0xFF);
    // Bits 3-6 stick, bits 0-2 stay under PPU control, bit 7 reads 1.
    assert_eq!(mmu.read_byte(0xFF41), 0xF8);
}

#[test]
fn ly_is_read_only() {
    let mut mmu = Mmu::new();
    mmu.write_byte(0xFF44, 0x7F);
    assert_eq!(mmu.read_byte(0xFF44), 0);
}

#[test]
fn hram_roundtrip() {
    let mut mmu = Mmu::new();
    mmu.write_byte(0xFF80, 0x01);
    mmu.write_byte(0xFFFE, 0xFE);
    assert_eq!(mmu.read_byte(0xFF80), 0x01);
    assert_eq!(mmu.read_byte(0xFFFE), 0xFE);
}

#[test]
fn vram_and_oam_roundtrip() {
    let mut mmu = Mmu::new();
    mmu.write_byte(0x8000, 0x12);
    mmu.write_byte(0x9FFF, 0x34);
    mmu.write_byte(0xFE00, 0x56);
    assert_eq!(mmu.read_byte(0x8000), 0x12);
    assert_eq!(mmu.read_byte(0x9FFF), 0x34);
    assert_eq!(mmu.read_byte(0xFE00), 0x56);
}
