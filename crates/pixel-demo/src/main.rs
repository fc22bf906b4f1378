use std::time::Instant;

use anyhow::{Context, Result};
use pixel_engine::logging::{init_logging, LoggingConfig};
use pixel_engine::{keys, Canvas, Color, Opacity, Window, WindowConfig, BASE_SCALE};

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = WindowConfig {
        clear_color: Color::new(0.08, 0.08, 0.12, 1.0),
        ..WindowConfig::new(WIDTH, HEIGHT, "pixel demo")
    };
    let mut window = Window::with_config(config).context("failed to open window")?;

    let backdrop = stripes(64, 64);
    let mut ship = ship_sprite();
    let glass = glass_pane(32, 32);
    let mut pulse = Canvas::new(8, 8);

    let start = Instant::now();
    let mut frames: u64 = 0;
    let mut zoom = 1.0_f32;

    while !window.should_exit() {
        let t = start.elapsed().as_secs_f32();

        zoom = (zoom + window.scroll() as f32 * 0.1).clamp(0.2, 3.0);
        if window.key_down(u32::from(b'r')) {
            zoom = 1.0;
        }
        if window.key_down(keys::SPACE) {
            ship.set_opacity(Opacity::Opaque);
        } else {
            ship.set_opacity(Opacity::Keyed);
        }

        let level = 0.5 + 0.5 * (t * 3.0).sin();
        pulse.fill(Color::new(level, 0.2, 1.0 - level, 1.0));

        // Backdrop across the whole frame, then the bottom half of the
        // stripes again as a small tile.
        window.draw(&backdrop.full(), 0.0, 0.0, BASE_SCALE, 0.0);
        window.draw(&backdrop.subcanvas(0, 0, 64, 32), -0.75, -0.75, 0.2 * BASE_SCALE, 0.0);

        let (mx, my) = pointer_ndc(&window);
        window.draw(&ship.full(), mx, my, 0.15 * zoom * BASE_SCALE, t);

        for i in 0..4 {
            let phase = t + i as f32 * std::f32::consts::FRAC_PI_2;
            window.draw(
                &glass.full(),
                0.5 * phase.cos(),
                0.5 * phase.sin(),
                0.2 * BASE_SCALE,
                -phase,
            );
        }

        window.draw(&pulse.full(), 0.8, 0.8, 0.1 * BASE_SCALE, 0.0);

        window.present();
        frames += 1;

        if window.mouse_right() {
            let frame = window.read().context("failed to read back frame")?;
            if let Some([b, g, r, a]) = frame.pixel(frame.width() / 2, frame.height() / 2) {
                log::info!("center pixel: rgba({r}, {g}, {b}, {a})");
            }
        }
    }

    let secs = start.elapsed().as_secs_f64();
    log::info!(
        "{frames} frames in {secs:.1}s ({:.1} fps)",
        frames as f64 / secs.max(f64::EPSILON)
    );
    Ok(())
}

/// Pointer position in NDC; left button pins the ship to the center.
fn pointer_ndc(window: &Window) -> (f32, f32) {
    if window.mouse_left() {
        return (0.0, 0.0);
    }
    let (w, h) = window.size();
    let x = window.mouse_x() / w.max(1) as f32 * 2.0 - 1.0;
    let y = window.mouse_y() / h.max(1) as f32 * 2.0 - 1.0;
    (x, y)
}

fn stripes(width: u32, height: u32) -> Canvas {
    let mut c = Canvas::new(width, height);
    let dark = Color::new(0.15, 0.15, 0.2, 1.0).to_bgra8();
    let light = Color::new(0.25, 0.25, 0.35, 1.0).to_bgra8();

    let row_bytes = width as usize * 4;
    for (y, row) in c.pixels_mut().chunks_exact_mut(row_bytes).enumerate() {
        let px = if (y / 8) % 2 == 0 { dark } else { light };
        for chunk in row.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
    }
    c.mark_dirty();
    c
}

/// A diamond on a magenta background that keyed drawing cuts away.
fn ship_sprite() -> Canvas {
    const SIZE: i32 = 32;
    let mut c = Canvas::new(SIZE as u32, SIZE as u32);
    c.fill(Color::MAGENTA);
    c.set_opacity(Opacity::Keyed);

    let hull = Color::new(0.9, 0.8, 0.2, 1.0).to_bgra8();
    let half = SIZE / 2;
    for (i, chunk) in c.pixels_mut().chunks_exact_mut(4).enumerate() {
        let x = i as i32 % SIZE - half;
        let y = i as i32 / SIZE - half;
        if x.abs() + y.abs() < half {
            chunk.copy_from_slice(&hull);
        }
    }
    c.mark_dirty();
    c
}

fn glass_pane(width: u32, height: u32) -> Canvas {
    let mut c = Canvas::new(width, height);
    c.fill(Color::new(0.3, 0.9, 1.0, 0.4));
    c.set_opacity(Opacity::Translucent);
    c
}
