// Headless demo driver. Stands in for the excluded windowing collaborator:
// synthesizes the assets a real host would load from disk, then feeds the app
// a scripted stream of frames and pointer events.

use anyhow::Result;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::Ordering;

use tintile::app::{App, Assets, MouseButton, Scene, UiEvent};
use tintile::config::Config;
use tintile::gfx::canvas::Canvas;
use tintile::gfx::math::Vec2;

const SURFACE_W: u32 = 800;
const SURFACE_H: u32 = 600;
const DEMO_FRAMES: usize = 240;

fn main() -> Result<()> {
    env_logger::init();
    println!("Starting tintile demo...");

    let config = Config::load().unwrap_or_default();
    let fps = config.fps_cap.max(1);

    let mut app = App::new(config, SURFACE_W, SURFACE_H, demo_assets())?;

    // Stand-in for the audio playback thread: the single writer of the
    // shared amplitude cell the pulse reads.
    let amplitude = app.amplitude_handle();
    let writer = std::thread::spawn(move || {
        for i in 0..DEMO_FRAMES as u32 {
            let level = 400.0 + 350.0 * (i as f32 * 0.3).sin();
            amplitude.store(level.to_bits(), Ordering::Relaxed);
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
    });

    let mut canvas = Canvas::new(SURFACE_W, SURFACE_H);
    let dt = 1.0 / fps as f32;
    let script = demo_script();

    println!("Running {DEMO_FRAMES} frames at {fps} fps...");
    for frame in 0..DEMO_FRAMES {
        for (_, event) in script.iter().filter(|(at, _)| *at == frame) {
            app.handle_event(*event)?;
        }
        app.update(dt)?;
        app.draw(&mut canvas, dt);
    }
    let _ = writer.join();

    if app.scene == Scene::Level {
        if let Some(level) = &app.level {
            let painted = level
                .builder
                .tiles()
                .iter()
                .filter(|t| t.fill[3] != 0)
                .count();
            info!(
                "demo finished: {} tiles ({} painted), {} palette colors, tile size {:?}",
                level.builder.tiles().len(),
                painted,
                level.colors().len(),
                level.builder.tiles()[0].size,
            );
            println!(
                "Puzzle state: {}x{} grid, {} colors on the palette",
                level.builder.columns(),
                level.builder.rows(),
                level.colors().len(),
            );
        }
    }
    println!("Done.");
    Ok(())
}

// A short session: browse the menu, open the first puzzle, pick a swatch,
// paint a stripe of tiles, zoom both ways, drag the frame aside.
fn demo_script() -> Vec<(usize, UiEvent)> {
    let menu_center = Vec2::new(150.0, 150.0);
    let level_center = Vec2::new(SURFACE_W as f32 / 2.0, SURFACE_H as f32 / 2.0);

    let mut script = vec![
        (5, UiEvent::PointerMove { pos: menu_center }),
        (8, UiEvent::Scroll { delta: -1.0 }),
        (9, UiEvent::Scroll { delta: 1.0 }),
        (12, UiEvent::PointerMove { pos: menu_center }),
        (
            15,
            UiEvent::PointerDown {
                pos: menu_center,
                button: MouseButton::Left,
            },
        ),
    ];

    // Walk down the palette strip until one click lands on a swatch.
    for i in 0..6 {
        script.push((
            40 + i,
            UiEvent::PointerDown {
                pos: Vec2::new(30.0, 30.0 + 20.0 * i as f32),
                button: MouseButton::Left,
            },
        ));
    }

    // Paint a stripe through the middle of the grid.
    for i in 0..10 {
        script.push((
            60 + 2 * i,
            UiEvent::PointerDown {
                pos: Vec2::new(level_center.x - 50.0 + 10.0 * i as f32, level_center.y),
                button: MouseButton::Left,
            },
        ));
    }

    // Zoom in, then back out.
    script.push((140, UiEvent::Scroll { delta: 1.0 }));
    script.push((170, UiEvent::Scroll { delta: -1.0 }));

    // Right-drag the frame a little to the side.
    script.push((
        200,
        UiEvent::PointerDown {
            pos: level_center,
            button: MouseButton::Right,
        },
    ));
    script.push((
        202,
        UiEvent::PointerMove {
            pos: Vec2::new(level_center.x + 40.0, level_center.y + 25.0),
        },
    ));
    script.push((
        204,
        UiEvent::PointerUp {
            button: MouseButton::Right,
        },
    ));
    script
}

fn demo_assets() -> Assets {
    let mut rng = StdRng::seed_from_u64(7);

    let mut background = Canvas::new(SURFACE_W, SURFACE_H);
    for y in 0..SURFACE_H {
        let shade = (20 + y * 30 / SURFACE_H) as u8;
        for x in 0..SURFACE_W {
            background.put_pixel(x, y, [shade, shade, shade + 8, 255]);
        }
    }

    let mut transition = Canvas::new(SURFACE_W, SURFACE_H);
    for y in 0..SURFACE_H {
        for x in 0..SURFACE_W {
            let shade: u8 = rng.gen_range(8..32);
            transition.put_pixel(x, y, [shade, shade / 2, shade, 255]);
        }
    }

    let mut pulse = Canvas::new(64, 64);
    for y in 0..64u32 {
        for x in 0..64u32 {
            let dx = x as f32 - 31.5;
            let dy = y as f32 - 31.5;
            if dx * dx + dy * dy < 30.0 * 30.0 {
                pulse.put_pixel(x, y, [200, 30, 40, 255]);
            }
        }
    }

    let mut play_button = Canvas::new(150, 50);
    play_button.fill([235, 235, 235, 255]);

    let mut palette_strip = Canvas::new(50, 400);
    palette_strip.fill([250, 250, 250, 255]);

    let puzzles = (0..5).map(|_| random_puzzle(&mut rng)).collect();

    Assets {
        background,
        transition,
        pulse,
        play_button,
        palette_strip,
        puzzles,
    }
}

// Blobby stand-in for a saved puzzle image: a base wash with a few dozen
// random colored rectangles.
fn random_puzzle(rng: &mut StdRng) -> Canvas {
    let mut canvas = Canvas::new(256, 256);
    canvas.fill([
        rng.gen_range(100..200u8),
        rng.gen_range(100..200u8),
        rng.gen_range(100..200u8),
        255,
    ]);
    for _ in 0..40 {
        let w = rng.gen_range(20..90u32);
        let h = rng.gen_range(20..90u32);
        let x = rng.gen_range(0..256 - w);
        let y = rng.gen_range(0..256 - h);
        let color = [
            rng.gen_range(0..=255u8),
            rng.gen_range(0..=255u8),
            rng.gen_range(0..=255u8),
            255,
        ];
        for py in y..y + h {
            for px in x..x + w {
                canvas.put_pixel(px, py, color);
            }
        }
    }
    canvas
}
