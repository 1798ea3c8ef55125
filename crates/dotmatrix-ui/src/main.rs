mod debugger;
mod disasm;

use clap::Parser;
use log::info;
use pixels::{Pixels, SurfaceTexture};
use std::time::Duration;
use winit::{
    event::{ElementState, Event, VirtualKeyCode, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

use dotmatrix_core::{cartridge::Cartridge, gameboy::GameBoy, input::Buttons};

const SCREEN_WIDTH: u32 = 160;
const SCREEN_HEIGHT: u32 = 144;

/// DMG shade indices mapped to RGBA pixels (lightest to darkest).
const SHADES: [u32; 4] = [0xFFFF_FFFF, 0xFFAA_AAAA, 0xFF55_5555, 0xFF00_0000];

#[derive(Parser)]
struct Args {
    /// Path to ROM file
    rom: std::path::PathBuf,

    /// Start the interactive debugger instead of the window
    #[arg(long)]
    debugger: bool,

    /// Enable periodic dumps of CPU state and serial output
    #[arg(long)]
    debug: bool,

    /// Run without opening a window
    #[arg(long)]
    headless: bool,

    /// Number of frames to run in headless mode
    #[arg(long)]
    frames: Option<usize>,

    /// Number of seconds to run in headless mode
    #[arg(long)]
    seconds: Option<u64>,

    /// Number of CPU cycles to run in headless mode
    #[arg(long)]
    cycles: Option<u64>,

    /// Window scale factor
    #[arg(long, default_value_t = 3)]
    scale: u32,
}

/// Dump serial output and CPU state, used by the `--debug` paths.
fn print_debug_dump(gb: &mut GameBoy) {
    let serial = gb.take_serial();
    if !serial.is_empty() {
        print!("[SERIAL] ");
        for b in &serial {
            if b.is_ascii_graphic() || *b == b' ' {
                print!("{}", *b as char);
            } else {
                print!("\\x{:02X}", b);
            }
        }
        println!();
    }
    println!("{}", gb.cpu.debug_state());
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let cart = match Cartridge::from_file(&args.rom) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load ROM: {e}");
            std::process::exit(1);
        }
    };

    let mut gb = GameBoy::new();
    gb.load_cart(cart);
    info!("emulator initialized");

    if args.debugger {
        debugger::Debugger::new().run(&mut gb);
        gb.mmu.save_cart_ram();
        return;
    }

    if args.headless {
        run_headless(gb, &args);
        return;
    }

    let mut frame = vec![0u32; (SCREEN_WIDTH * SCREEN_HEIGHT) as usize];
    let mut frame_count = 0u64;
    let mut buttons = Buttons::default();

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("dotmatrix")
        .with_inner_size(winit::dpi::LogicalSize::new(
            (SCREEN_WIDTH * args.scale) as f64,
            (SCREEN_HEIGHT * args.scale) as f64,
        ))
        .build(&event_loop)
        .expect("Failed to create window");

    let size = window.inner_size();
    let surface = SurfaceTexture::new(size.width, size.height, &window);
    let mut pixels =
        Pixels::new(SCREEN_WIDTH, SCREEN_HEIGHT, surface).expect("Pixels error");

    let debug = args.debug;
    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    gb.mmu.save_cart_ram();
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(size) => {
                    let _ = pixels.resize_surface(size.width, size.height);
                }
                WindowEvent::KeyboardInput { input, .. } => {
                    if let Some(key) = input.virtual_keycode {
                        let pressed = input.state == ElementState::Pressed;
                        let handled = match key {
                            VirtualKeyCode::Right => {
                                buttons.right = pressed;
                                true
                            }
                            VirtualKeyCode::Left => {
                                buttons.left = pressed;
                                true
                            }
                            VirtualKeyCode::Up => {
                                buttons.up = pressed;
                                true
                            }
                            VirtualKeyCode::Down => {
                                buttons.down = pressed;
                                true
                            }
                            VirtualKeyCode::Z => {
                                buttons.a = pressed;
                                true
                            }
                            VirtualKeyCode::X => {
                                buttons.b = pressed;
                                true
                            }
                            VirtualKeyCode::A => {
                                buttons.select = pressed;
                                true
                            }
                            VirtualKeyCode::S => {
                                buttons.start = pressed;
                                true
                            }
                            VirtualKeyCode::Escape => {
                                if pressed {
                                    gb.mmu.save_cart_ram();
                                    *control_flow = ControlFlow::Exit;
                                }
                                false
                            }
                            _ => false,
                        };
                        if handled {
                            gb.set_buttons(buttons);
                        }
                    }
                }
                _ => {}
            },
            Event::MainEventsCleared => {
                gb.step_frame();

                for (dst, &shade) in frame.iter_mut().zip(gb.framebuffer().iter()) {
                    *dst = SHADES[shade as usize];
                }
                window.request_redraw();

                if debug && frame_count % 60 == 0 {
                    print_debug_dump(&mut gb);
                }
                frame_count += 1;
            }
            Event::RedrawRequested(_) => {
                pixels
                    .frame_mut()
                    .copy_from_slice(bytemuck::cast_slice(&frame));
                if pixels.render().is_err() {
                    *control_flow = ControlFlow::Exit;
                }
            }
            _ => {}
        }
    });
}

fn run_headless(mut gb: GameBoy, args: &Args) {
    let frame_limit = args.frames;
    let cycle_limit = args.cycles;
    let second_limit = args.seconds.map(Duration::from_secs);

    let start = std::time::Instant::now();
    let mut frame_count = 0u64;
    loop {
        gb.step_frame();
        frame_count += 1;

        if args.debug && frame_count % 60 == 0 {
            print_debug_dump(&mut gb);
        }

        if let Some(max) = frame_limit {
            if frame_count >= max as u64 {
                break;
            }
        }
        if let Some(max) = cycle_limit {
            if gb.cpu.cycles >= max {
                break;
            }
        }
        if let Some(limit) = second_limit {
            if start.elapsed() >= limit {
                break;
            }
        }
    }

    if args.debug {
        print_debug_dump(&mut gb);
    }
    gb.mmu.save_cart_ram();
}
