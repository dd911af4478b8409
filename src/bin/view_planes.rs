//! Synthetic plane-renderer demo.
//!
//! ```bash
//! cargo run --release -- --width 960 --height 600
//! ```
//!
//! There is no level here: a fabricated "traversal" claims the lower half of
//! the screen for a floor (with a swirling water band in the middle third)
//! and the upper half for the sky, which is exactly the input the plane
//! pipeline would receive from a BSP walk over one big open sector.
//! WASD moves, arrow keys turn, Escape quits.

use anyhow::Result;
use clap::Parser;
use glam::Vec3;
use minifb::{Key, Window, WindowOptions};

use visplane_rs::engine::PlaneRenderer;
use visplane_rs::fixed::FRACUNIT;
use visplane_rs::renderer::software::SoftBuffer;
use visplane_rs::world::flats::{FLAT_DIM, FLAT_LEN, Flat, FlatBank, SKY_FLAT};
use visplane_rs::world::{Camera, LightTables, SkyBox, SkyTexture};

#[derive(Parser)]
#[command(about = "software plane renderer demo")]
struct Args {
    #[arg(long, default_value_t = 960)]
    width: usize,

    #[arg(long, default_value_t = 600)]
    height: usize,

    /// Disable the water distortion band.
    #[arg(long)]
    no_swirl: bool,

    /// Sector light level (0-255).
    #[arg(long, default_value_t = 192)]
    light: i32,
}

fn checker_flat(name: &str, a: u8, b: u8) -> Flat {
    let mut texels = Box::new([0u8; FLAT_LEN]);
    for y in 0..FLAT_DIM {
        for x in 0..FLAT_DIM {
            texels[y * FLAT_DIM + x] = if ((x >> 4) ^ (y >> 4)) & 1 == 0 { a } else { b };
        }
    }
    Flat {
        name: name.into(),
        texels,
    }
}

fn water_flat() -> Flat {
    let mut texels = Box::new([0u8; FLAT_LEN]);
    for y in 0..FLAT_DIM {
        for x in 0..FLAT_DIM {
            let ripple = ((x as f32 / 6.0).sin() + (y as f32 / 9.0).cos()) * 20.0;
            texels[y * FLAT_DIM + x] = (150.0 + ripple) as u8;
        }
    }
    Flat {
        name: "WATER".into(),
        texels,
    }
}

fn cloudy_sky() -> SkyTexture {
    let (w, h) = (256, 128);
    let mut texels = vec![0u8; w * h];
    for c in 0..w {
        for y in 0..h {
            let band = (c as f32 / 17.0).sin() * (y as f32 / 11.0).cos();
            texels[c * h + y] = (90.0 + y as f32 / 2.0 + band * 40.0) as u8;
        }
    }
    SkyTexture::new("SKY1", w, h, texels)
}

fn sepia_palette() -> [u32; 256] {
    let mut pal = [0u32; 256];
    for (i, p) in pal.iter_mut().enumerate() {
        let (r, g, b) = (i as u32, i as u32 * 8 / 10, i as u32 * 6 / 10);
        *p = (r << 16) | (g << 8) | b;
    }
    pal
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (w, h) = (args.width, args.height);

    let mut flats = FlatBank::new();
    let floor = flats.insert("FLOOR", checker_flat("FLOOR", 120, 210))?;
    let water = flats.insert("WATER", water_flat())?;
    if !args.no_swirl {
        flats.set_swirling(water, true)?;
    }

    let lights = LightTables::grayscale(w);
    let sky = SkyBox::new(cloudy_sky());
    let palette = sepia_palette();

    let mut renderer = PlaneRenderer::default();
    let mut fb = SoftBuffer::new(w, h);
    let mut display = Vec::with_capacity(w * h);

    let mut camera = Camera::new(Vec3::new(0.0, 0.0, 41.0), 0.0);
    let mut window = Window::new("visplane_rs", w, h, WindowOptions::default())?;
    window.set_target_fps(35);

    let mut tick: u32 = 0;
    while window.is_open() && !window.is_key_down(Key::Escape) {
        // ───────── input ─────────
        let speed = 6.0;
        if window.is_key_down(Key::W) {
            camera.step(speed, 0.0);
        }
        if window.is_key_down(Key::S) {
            camera.step(-speed, 0.0);
        }
        if window.is_key_down(Key::A) {
            camera.step(0.0, -speed);
        }
        if window.is_key_down(Key::D) {
            camera.step(0.0, speed);
        }
        if window.is_key_down(Key::Left) {
            camera.turn(0.04);
        }
        if window.is_key_down(Key::Right) {
            camera.turn(-0.04);
        }

        // ───────── fabricated visibility pass ─────────
        let view = camera.view_setup(w, h);
        let center_y = view.center_y();
        renderer.begin_frame(view);

        let last = w as i32 - 1;
        let third = w as i32 / 3;

        let f = renderer.find_plane(0, floor, args.light);
        let f = renderer.check_plane(f, 0, third - 1, false);
        let f = renderer.check_plane(f, 2 * third, last, false);
        for x in (0..third).chain(2 * third..=last) {
            renderer
                .plane_mut(f)
                .set_column(x, center_y as u16 + 1, h as u16 - 1);
        }

        let wp = renderer.find_plane(-8 * FRACUNIT, water, args.light);
        let wp = renderer.check_plane(wp, third, 2 * third - 1, false);
        for x in third..2 * third {
            renderer
                .plane_mut(wp)
                .set_column(x, center_y as u16 + 1, h as u16 - 1);
        }

        let s = renderer.find_plane(128 * FRACUNIT, SKY_FLAT, 0);
        let s = renderer.check_plane(s, 0, last, false);
        for x in 0..=last {
            renderer.plane_mut(s).set_column(x, 0, center_y as u16 - 1);
        }

        // ───────── draw & present ─────────
        fb.begin_frame(w, h);
        renderer.end_frame(&flats, &lights, &sky, tick, &mut fb);
        fb.resolve(&palette, &mut display);
        window.update_with_buffer(&display, w, h)?;
        tick = tick.wrapping_add(1);
    }
    Ok(())
}
