//! Application wiring: window, renderer, glyph cache, session, frame loop.
//!
//! One loop iteration (driven by winit at the 20 ms frame interval):
//! 1. drain a bounded number of queued input events,
//! 2. repaint fully if the scroll anchor moved,
//! 3. poll the PTY, parse and apply what arrived,
//! 4. retry queued outbound bytes,
//! 5. request a present when anything changed.

use std::cell::Cell;
use std::collections::VecDeque;
use std::error::Error;
use std::rc::Rc;
use std::time::Instant;

use matcha_core::{CELL_HEIGHT, SCREEN_HEIGHT, SCREEN_WIDTH};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::config::Config;
use crate::event::{TermEvent, MAX_EVENTS_PER_FRAME};
use crate::font::{self, CellFont};
use crate::glyph_cache::GlyphCache;
use crate::input;
use crate::renderer::{Renderer, ScreenPainter};
use crate::terminal::{PtyPoll, Session, FRAME_INTERVAL};

pub fn run(config: Config) -> Result<(), Box<dyn Error>> {
    let font = font::load_font(config.font.as_deref())?;
    let cell_font = CellFont::new(font);
    let baseline = cell_font.baseline();
    let mut cache = GlyphCache::new(cell_font);

    let event_loop = EventLoop::new()?;
    let window = Rc::new(
        WindowBuilder::new()
            .with_title("matcha")
            .with_inner_size(PhysicalSize::new(
                SCREEN_WIDTH as u32,
                SCREEN_HEIGHT as u32,
            ))
            .with_resizable(false)
            .build(&event_loop)?,
    );

    let background = config.background_color();
    let mut renderer = Renderer::new(window.clone(), baseline)?;
    renderer.clear(background);

    let mut session = Session::spawn(&config)?;
    let mut pending: VecDeque<TermEvent> = VecDeque::new();
    let mut needs_full_redraw = false;

    // read back after the loop to pick the process exit status
    let fatal = Rc::new(Cell::new(false));
    let fatal_flag = fatal.clone();

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::WaitUntil(Instant::now() + FRAME_INTERVAL));

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),

                WindowEvent::KeyboardInput { event, .. } => {
                    if event.state == ElementState::Pressed {
                        if let Some(bytes) = input::encode_key(&event.logical_key) {
                            pending.push_back(TermEvent::Input(bytes));
                        }
                    }
                }

                WindowEvent::MouseWheel { delta, .. } => {
                    let lines = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y as i32,
                        MouseScrollDelta::PixelDelta(pos) => {
                            (pos.y / f64::from(CELL_HEIGHT)) as i32
                        }
                    };
                    if lines != 0 {
                        pending.push_back(TermEvent::Scroll(lines));
                    }
                }

                WindowEvent::RedrawRequested => {
                    if let Err(e) = renderer.present() {
                        log::warn!("present failed: {e}");
                    }
                }

                _ => {}
            },

            Event::AboutToWait => {
                for _ in 0..MAX_EVENTS_PER_FRAME {
                    let Some(ev) = pending.pop_front() else { break };
                    match ev {
                        TermEvent::Input(bytes) => {
                            if let Err(e) = session.send(&bytes) {
                                log::error!("PTY write failed: {e}");
                                fatal_flag.set(true);
                                elwt.exit();
                                return;
                            }
                        }
                        TermEvent::Scroll(lines) => {
                            session.screen.scroll(lines);
                            needs_full_redraw = true;
                        }
                    }
                }

                let mut dirty = false;

                if needs_full_redraw {
                    needs_full_redraw = false;
                    renderer.clear(background);
                    let mut painter = ScreenPainter {
                        renderer: &mut renderer,
                        cache: &mut cache,
                    };
                    session.screen.redraw(&mut painter);
                    dirty = true;
                }

                {
                    let mut painter = ScreenPainter {
                        renderer: &mut renderer,
                        cache: &mut cache,
                    };
                    match session.poll(&mut painter) {
                        Ok(PtyPoll::Idle) => {}
                        Ok(PtyPoll::Dirty) => dirty = true,
                        Ok(PtyPoll::Exited) => {
                            log::info!("shell exited, closing session");
                            elwt.exit();
                            return;
                        }
                        Err(e) => {
                            log::error!("PTY read failed: {e}");
                            fatal_flag.set(true);
                            elwt.exit();
                            return;
                        }
                    }
                }

                if session.has_pending_output() {
                    if let Err(e) = session.flush_output() {
                        log::error!("PTY write failed: {e}");
                        fatal_flag.set(true);
                        elwt.exit();
                        return;
                    }
                }

                if dirty {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    })?;

    if fatal.get() {
        return Err("session ended on an I/O error".into());
    }
    Ok(())
}
