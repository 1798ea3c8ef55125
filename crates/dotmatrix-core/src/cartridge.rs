use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{info, warn};
use thiserror::Error;

const ROM_BANK_SIZE: usize = 0x4000;
const RAM_BANK_SIZE: usize = 0x2000;

/// Minimum image that still contains the full 0x150-byte header.
const HEADER_END: usize = 0x150;

/// Errors surfaced to the host before emulation begins. Everything here is
/// fatal: a machine is never constructed from a cartridge that failed to
/// load.
#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("ROM image truncated: {0} bytes, header needs at least 0x150")]
    Truncated(usize),
    #[error("unsupported cartridge type {0:#04X} (only ROM-only and MBC1 are supported)")]
    UnsupportedMapper(u8),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MbcType {
    NoMbc,
    Mbc1,
}

#[derive(Debug)]
enum MbcState {
    NoMbc,
    Mbc1 {
        /// Low five bits of the switchable ROM bank number.
        rom_bank: u8,
        /// Two-bit secondary register: RAM bank in mode 1, ROM bank bits 5-6
        /// in mode 0.
        ram_bank: u8,
        /// Banking mode select (`0x6000-0x7FFF` writes, one bit).
        mode: u8,
        ram_enable: bool,
    },
}

#[derive(Debug)]
pub struct Cartridge {
    pub rom: Vec<u8>,
    pub ram: Vec<u8>,
    pub mbc: MbcType,
    pub title: String,
    cart_type: u8,
    save_path: Option<PathBuf>,
    mbc_state: MbcState,
}

impl Cartridge {
    /// Parse a raw ROM image and construct the matching bank controller.
    ///
    /// The header checksum is deliberately ignored; plenty of homebrew and
    /// test ROMs carry a bad one.
    pub fn load(data: Vec<u8>) -> Result<Self, CartridgeError> {
        if data.len() < HEADER_END {
            return Err(CartridgeError::Truncated(data.len()));
        }

        let header = Header::parse(&data);
        let cart_type = header.cart_type();
        let mbc = match cart_type {
            0x00 | 0x08 | 0x09 => MbcType::NoMbc,
            0x01..=0x03 => MbcType::Mbc1,
            other => return Err(CartridgeError::UnsupportedMapper(other)),
        };
        let ram_size = header.ram_size();
        let title = header.title();

        info!(
            "cartridge {:?}: type {:#04X} ({:?}), {} ROM banks, {} bytes RAM, {}",
            title,
            cart_type,
            mbc,
            header.rom_banks(),
            ram_size,
            header.destination(),
        );
        if header.cgb_only() {
            warn!("{title:?} is marked CGB-only; running it in DMG mode anyway");
        }

        let mbc_state = match mbc {
            MbcType::NoMbc => MbcState::NoMbc,
            MbcType::Mbc1 => MbcState::Mbc1 {
                rom_bank: 1,
                ram_bank: 0,
                mode: 0,
                ram_enable: false,
            },
        };

        Ok(Self {
            rom: data,
            ram: vec![0; ram_size],
            mbc,
            title,
            cart_type,
            save_path: None,
            mbc_state,
        })
    }

    /// Load a ROM from disk, picking up a `.sav` file for battery-backed
    /// cartridges if one exists next to it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CartridgeError> {
        let data = fs::read(&path)?;
        let mut cart = Self::load(data)?;

        if cart.has_battery() {
            let mut save = PathBuf::from(path.as_ref());
            save.set_extension("sav");
            cart.save_path = Some(save.clone());
            if let Ok(bytes) = fs::read(&save) {
                for (d, s) in cart.ram.iter_mut().zip(bytes.iter()) {
                    *d = *s;
                }
            }
        }

        Ok(cart)
    }

    pub fn read(&self, addr: u16) -> u8 {
        match (&self.mbc_state, addr) {
            (MbcState::NoMbc, 0x0000..=0x7FFF) => {
                self.rom.get(addr as usize).copied().unwrap_or(0xFF)
            }
            (MbcState::NoMbc, 0xA000..=0xBFFF) => {
                let idx = addr as usize - 0xA000;
                self.ram.get(idx).copied().unwrap_or(0xFF)
            }
            (MbcState::Mbc1 { .. }, 0x0000..=0x3FFF) => {
                self.rom.get(addr as usize).copied().unwrap_or(0xFF)
            }
            (
                MbcState::Mbc1 {
                    rom_bank,
                    ram_bank,
                    mode,
                    ..
                },
                0x4000..=0x7FFF,
            ) => {
                let bank_count = (self.rom.len() / ROM_BANK_SIZE).max(1);
                let bank = if *mode == 0 {
                    (*rom_bank as usize) | ((*ram_bank as usize) << 5)
                } else {
                    *rom_bank as usize
                };
                let offset = (bank % bank_count) * ROM_BANK_SIZE + (addr as usize - 0x4000);
                self.rom.get(offset).copied().unwrap_or(0xFF)
            }
            (
                MbcState::Mbc1 {
                    ram_bank,
                    mode,
                    ram_enable,
                    ..
                },
                0xA000..=0xBFFF,
            ) => {
                if !*ram_enable {
                    return 0xFF;
                }
                let bank = if *mode == 1 { *ram_bank as usize } else { 0 };
                let idx = bank * RAM_BANK_SIZE + (addr as usize - 0xA000);
                self.ram.get(idx).copied().unwrap_or(0xFF)
            }
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, addr: u16, val: u8) {
        match (&mut self.mbc_state, addr) {
            (MbcState::NoMbc, 0xA000..=0xBFFF) => {
                let idx = addr as usize - 0xA000;
                if let Some(b) = self.ram.get_mut(idx) {
                    *b = val;
                }
            }
            // Writes anywhere in ROM space on a plain cartridge are ignored.
            (MbcState::NoMbc, _) => {}
            (MbcState::Mbc1 { ram_enable, .. }, 0x0000..=0x1FFF) => {
                *ram_enable = val & 0x0F == 0x0A;
            }
            (MbcState::Mbc1 { rom_bank, .. }, 0x2000..=0x3FFF) => {
                *rom_bank = val & 0x1F;
                // Banks 0x00/0x20/0x40/0x60 are unreachable; the hardware
                // substitutes the next bank up.
                if *rom_bank == 0 {
                    *rom_bank = 1;
                }
            }
            (MbcState::Mbc1 { ram_bank, .. }, 0x4000..=0x5FFF) => {
                *ram_bank = val & 0x03;
            }
            (MbcState::Mbc1 { mode, .. }, 0x6000..=0x7FFF) => {
                *mode = val & 0x01;
            }
            (
                MbcState::Mbc1 {
                    ram_bank,
                    mode,
                    ram_enable,
                    ..
                },
                0xA000..=0xBFFF,
            ) => {
                if !*ram_enable {
                    return;
                }
                let bank = if *mode == 1 { *ram_bank as usize } else { 0 };
                let idx = bank * RAM_BANK_SIZE + (addr as usize - 0xA000);
                if let Some(b) = self.ram.get_mut(idx) {
                    *b = val;
                }
            }
            _ => {}
        }
    }

    fn has_battery(&self) -> bool {
        matches!(self.cart_type, 0x03 | 0x09)
    }

    /// Flush battery-backed RAM to the `.sav` file, if any.
    pub fn save_ram(&self) -> io::Result<()> {
        if let (true, Some(path)) = (self.has_battery(), &self.save_path) {
            if !self.ram.is_empty() {
                fs::write(path, &self.ram)?;
            }
        }
        Ok(())
    }
}

/// Borrowed view over the 0x150-byte cartridge header at `0x100`.
struct Header<'a> {
    data: &'a [u8],
}

impl<'a> Header<'a> {
    fn parse(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn title(&self) -> String {
        let mut slice = &self.data[0x0134..0x0144];
        if let Some(pos) = slice.iter().position(|&b| b == 0) {
            slice = &slice[..pos];
        }
        String::from_utf8_lossy(slice).trim().to_string()
    }

    fn cart_type(&self) -> u8 {
        self.data[0x0147]
    }

    fn cgb_only(&self) -> bool {
        self.data[0x0143] == 0xC0
    }

    /// Number of 16KB ROM banks encoded in the size byte at `0x148`.
    fn rom_banks(&self) -> usize {
        match self.data[0x0148] {
            code @ 0x00..=0x08 => 2usize << code,
            _ => 2,
        }
    }

    fn destination(&self) -> &'static str {
        if self.data[0x014A] == 0x00 {
            "Japanese"
        } else {
            "non-Japanese"
        }
    }

    fn ram_size(&self) -> usize {
        match self.data[0x0149] {
            0x00 => 0,
            0x01 => 0x800,  // 2KB
            0x02 => 0x2000, // 8KB
            0x03 => 0x8000, // 32KB (4 banks)
            _ => 0x2000,
        }
    }
}
