//! SM83 disassembler used by the debugger.

const REG_NAMES: [&str; 8] = ["B", "C", "D", "E", "H", "L", "(HL)", "A"];
const ALU_NAMES: [&str; 8] = ["ADD A,", "ADC A,", "SUB ", "SBC A,", "AND ", "XOR ", "OR ", "CP "];
const ROT_NAMES: [&str; 8] = ["RLC", "RRC", "RL", "RR", "SLA", "SRA", "SWAP", "SRL"];

/// Decode one instruction from `mem` (a slice starting at the instruction).
/// `addr` is its absolute address, used to display relative-jump targets.
///
/// Returns the mnemonic and the instruction length in bytes.
pub fn decode(mem: &[u8], addr: u16) -> (String, u16) {
    let get = |offset: usize| mem.get(offset).copied().unwrap_or(0);
    let op = get(0);
    let d8 = || get(1);
    let d16 = || ((get(2) as u16) << 8) | get(1) as u16;
    // Relative target from the end of the 2-byte instruction.
    let rel = || addr.wrapping_add(2).wrapping_add(get(1) as i8 as u16);

    if op == 0xCB {
        return (decode_cb(get(1)), 2);
    }

    // The regular blocks decode from the opcode's bit fields.
    match op {
        0x76 => return ("HALT".into(), 1),
        0x40..=0x7F => {
            let dst = REG_NAMES[((op >> 3) & 7) as usize];
            let src = REG_NAMES[(op & 7) as usize];
            return (format!("LD {dst},{src}"), 1);
        }
        0x80..=0xBF => {
            let name = ALU_NAMES[((op >> 3) & 7) as usize];
            let src = REG_NAMES[(op & 7) as usize];
            return (format!("{name}{src}"), 1);
        }
        _ => {}
    }

    let (text, len) = match op {
        0x00 => ("NOP".into(), 1),
        0x01 => (format!("LD BC,${:04X}", d16()), 3),
        0x02 => ("LD (BC),A".into(), 1),
        0x03 => ("INC BC".into(), 1),
        0x04 => ("INC B".into(), 1),
        0x05 => ("DEC B".into(), 1),
        0x06 => (format!("LD B,${:02X}", d8()), 2),
        0x07 => ("RLCA".into(), 1),
        0x08 => (format!("LD (${:04X}),SP", d16()), 3),
        0x09 => ("ADD HL,BC".into(), 1),
        0x0A => ("LD A,(BC)".into(), 1),
        0x0B => ("DEC BC".into(), 1),
        0x0C => ("INC C".into(), 1),
        0x0D => ("DEC C".into(), 1),
        0x0E => (format!("LD C,${:02X}", d8()), 2),
        0x0F => ("RRCA".into(), 1),
        0x10 => ("STOP".into(), 2),
        0x11 => (format!("LD DE,${:04X}", d16()), 3),
        0x12 => ("LD (DE),A".into(), 1),
        0x13 => ("INC DE".into(), 1),
        0x14 => ("INC D".into(), 1),
        0x15 => ("DEC D".into(), 1),
        0x16 => (format!("LD D,${:02X}", d8()), 2),
        0x17 => ("RLA".into(), 1),
        0x18 => (format!("JR ${:04X}", rel()), 2),
        0x19 => ("ADD HL,DE".into(), 1),
        0x1A => ("LD A,(DE)".into(), 1),
        0x1B => ("DEC DE".into(), 1),
        0x1C => ("INC E".into(), 1),
        0x1D => ("DEC E".into(), 1),
        0x1E => (format!("LD E,${:02X}", d8()), 2),
        0x1F => ("RRA".into(), 1),
        0x20 => (format!("JR NZ,${:04X}", rel()), 2),
        0x21 => (format!("LD HL,${:04X}", d16()), 3),
        0x22 => ("LD (HL+),A".into(), 1),
        0x23 => ("INC HL".into(), 1),
        0x24 => ("INC H".into(), 1),
        0x25 => ("DEC H".into(), 1),
        0x26 => (format!("LD H,${:02X}", d8()), 2),
        0x27 => ("DAA".into(), 1),
        0x28 => (format!("JR Z,${:04X}", rel()), 2),
        0x29 => ("ADD HL,HL".into(), 1),
        0x2A => ("LD A,(HL+)".into(), 1),
        0x2B => ("DEC HL".into(), 1),
        0x2C => ("INC L".into(), 1),
        0x2D => ("DEC L".into(), 1),
        0x2E => (format!("LD L,${:02X}", d8()), 2),
        0x2F => ("CPL".into(), 1),
        0x30 => (format!("JR NC,${:04X}", rel()), 2),
        0x31 => (format!("LD SP,${:04X}", d16()), 3),
        0x32 => ("LD (HL-),A".into(), 1),
        0x33 => ("INC SP".into(), 1),
        0x34 => ("INC (HL)".into(), 1),
        0x35 => ("DEC (HL)".into(), 1),
        0x36 => (format!("LD (HL),${:02X}", d8()), 2),
        0x37 => ("SCF".into(), 1),
        0x38 => (format!("JR C,${:04X}", rel()), 2),
        0x39 => ("ADD HL,SP".into(), 1),
        0x3A => ("LD A,(HL-)".into(), 1),
        0x3B => ("DEC SP".into(), 1),
        0x3C => ("INC A".into(), 1),
        0x3D => ("DEC A".into(), 1),
        0x3E => (format!("LD A,${:02X}", d8()), 2),
        0x3F => ("CCF".into(), 1),
        0xC0 => ("RET NZ".into(), 1),
        0xC1 => ("POP BC".into(), 1),
        0xC2 => (format!("JP NZ,${:04X}", d16()), 3),
        0xC3 => (format!("JP ${:04X}", d16()), 3),
        0xC4 => (format!("CALL NZ,${:04X}", d16()), 3),
        0xC5 => ("PUSH BC".into(), 1),
        0xC6 => (format!("ADD A,${:02X}", d8()), 2),
        0xC8 => ("RET Z".into(), 1),
        0xC9 => ("RET".into(), 1),
        0xCA => (format!("JP Z,${:04X}", d16()), 3),
        0xCC => (format!("CALL Z,${:04X}", d16()), 3),
        0xCD => (format!("CALL ${:04X}", d16()), 3),
        0xCE => (format!("ADC A,${:02X}", d8()), 2),
        0xD0 => ("RET NC".into(), 1),
        0xD1 => ("POP DE".into(), 1),
        0xD2 => (format!("JP NC,${:04X}", d16()), 3),
        0xD4 => (format!("CALL NC,${:04X}", d16()), 3),
        0xD5 => ("PUSH DE".into(), 1),
        0xD6 => (format!("SUB ${:02X}", d8()), 2),
        0xD8 => ("RET C".into(), 1),
        0xD9 => ("RETI".into(), 1),
        0xDA => (format!("JP C,${:04X}", d16()), 3),
        0xDC => (format!("CALL C,${:04X}", d16()), 3),
        0xDE => (format!("SBC A,${:02X}", d8()), 2),
        0xE0 => (format!("LDH (${:02X}),A", d8()), 2),
        0xE1 => ("POP HL".into(), 1),
        0xE2 => ("LD (C),A".into(), 1),
        0xE5 => ("PUSH HL".into(), 1),
        0xE6 => (format!("AND ${:02X}", d8()), 2),
        0xE8 => (format!("ADD SP,{}", get(1) as i8), 2),
        0xE9 => ("JP (HL)".into(), 1),
        0xEA => (format!("LD (${:04X}),A", d16()), 3),
        0xEE => (format!("XOR ${:02X}", d8()), 2),
        0xF0 => (format!("LDH A,(${:02X})", d8()), 2),
        0xF1 => ("POP AF".into(), 1),
        0xF2 => ("LD A,(C)".into(), 1),
        0xF3 => ("DI".into(), 1),
        0xF5 => ("PUSH AF".into(), 1),
        0xF6 => (format!("OR ${:02X}", d8()), 2),
        0xF8 => (format!("LD HL,SP{:+}", get(1) as i8), 2),
        0xF9 => ("LD SP,HL".into(), 1),
        0xFA => (format!("LD A,(${:04X})", d16()), 3),
        0xFB => ("EI".into(), 1),
        0xFE => (format!("CP ${:02X}", d8()), 2),
        0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => {
            (format!("RST ${:02X}", op & 0x38), 1)
        }
        // Undefined opcodes.
        _ => (format!("DB ${op:02X}"), 1),
    };
    (text, len)
}

fn decode_cb(op: u8) -> String {
    let reg = REG_NAMES[(op & 7) as usize];
    match op {
        0x00..=0x3F => format!("{} {reg}", ROT_NAMES[(op >> 3) as usize]),
        0x40..=0x7F => format!("BIT {},{reg}", (op - 0x40) >> 3),
        0x80..=0xBF => format!("RES {},{reg}", (op - 0x80) >> 3),
        0xC0..=0xFF => format!("SET {},{reg}", (op - 0xC0) >> 3),
    }
}
