//! Interactive breakpoint/step debugger driven from the terminal.

use std::collections::HashSet;
use std::io::{self, BufRead, Write};

use dotmatrix_core::gameboy::GameBoy;

use crate::disasm;

pub struct Debugger {
    breakpoints: HashSet<u16>,
}

impl Debugger {
    pub fn new() -> Self {
        Self {
            breakpoints: HashSet::new(),
        }
    }

    /// Run the command loop until the user quits.
    pub fn run(&mut self, gb: &mut GameBoy) {
        println!("dotmatrix debugger. Type 'h' for help.");
        self.show_context(gb);

        let stdin = io::stdin();
        loop {
            print!("(dbg) ");
            let _ = io::stdout().flush();
            let mut line = String::new();
            if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
                return;
            }
            let mut words = line.split_whitespace();
            match words.next() {
                None => {}
                Some("h") | Some("help") => {
                    println!("  s [n]    step n instructions (default 1)");
                    println!("  c        continue to the next breakpoint");
                    println!("  b ADDR   toggle a breakpoint (hex address)");
                    println!("  l [ADDR] disassemble from ADDR (default PC)");
                    println!("  r        dump CPU registers");
                    println!("  q        quit");
                }
                Some("s") | Some("step") => {
                    let n = words
                        .next()
                        .and_then(|w| w.parse::<u32>().ok())
                        .unwrap_or(1);
                    for _ in 0..n {
                        gb.step();
                    }
                    self.show_context(gb);
                }
                Some("c") | Some("continue") => {
                    self.continue_to_breakpoint(gb);
                    self.show_context(gb);
                }
                Some("b") | Some("break") => match words.next().map(parse_addr) {
                    Some(Some(addr)) => self.toggle_breakpoint(addr),
                    _ => println!("usage: b ADDR (hex)"),
                },
                Some("l") | Some("list") => {
                    let addr = words.next().and_then(parse_addr).unwrap_or(gb.cpu.pc);
                    self.disassemble(gb, addr, 10);
                }
                Some("r") | Some("regs") => println!("{}", gb.cpu.debug_state()),
                Some("q") | Some("quit") => return,
                Some(other) => println!("unknown command {other:?}"),
            }
        }
    }

    pub fn toggle_breakpoint(&mut self, addr: u16) {
        if self.breakpoints.remove(&addr) {
            println!("breakpoint cleared at ${addr:04X}");
        } else {
            self.breakpoints.insert(addr);
            println!("breakpoint set at ${addr:04X}");
        }
    }

    /// Step past the current instruction, then run until PC lands on a
    /// breakpoint.
    fn continue_to_breakpoint(&mut self, gb: &mut GameBoy) {
        if self.breakpoints.is_empty() {
            println!("no breakpoints set");
            return;
        }
        gb.step();
        while !self.breakpoints.contains(&gb.cpu.pc) {
            gb.step();
        }
    }

    fn show_context(&self, gb: &GameBoy) {
        println!("{}", gb.cpu.debug_state());
        self.disassemble(gb, gb.cpu.pc, 5);
    }

    /// Walk the instruction stream from `addr`, printing one line per
    /// instruction with breakpoint and PC markers.
    fn disassemble(&self, gb: &GameBoy, mut addr: u16, count: usize) {
        for _ in 0..count {
            let bytes = [
                gb.mmu.read_byte(addr),
                gb.mmu.read_byte(addr.wrapping_add(1)),
                gb.mmu.read_byte(addr.wrapping_add(2)),
            ];
            let (text, len) = disasm::decode(&bytes, addr);
            let pc_marker = if addr == gb.cpu.pc { '>' } else { ' ' };
            let bp_marker = if self.breakpoints.contains(&addr) { '*' } else { ' ' };
            println!("{pc_marker}{bp_marker} {addr:04X}: {text}");
            addr = addr.wrapping_add(len);
        }
    }
}

impl Default for Debugger {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_addr(word: &str) -> Option<u16> {
    let trimmed = word.trim_start_matches("0x").trim_start_matches('$');
    u16::from_str_radix(trimmed, 16).ok()
}
