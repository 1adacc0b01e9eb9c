//! softras: software triangle rasterizer demo
//!
//! Renders a textured vertex grid through the CPU rasterizer every frame
//! and blits the framebuffer to the window. Camera: WASD to move, hold
//! the right mouse button to look around, Tab to switch the mesh between
//! triangle-strip and triangle-list assembly, -/= to change the FOV.

mod rasterizer;

use macroquad::prelude::*;
use rasterizer::{render_mesh, Camera, Framebuffer, Mesh, Rgb, HEIGHT, WIDTH};

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const BACKGROUND: Rgb = Rgb { r: 0.39, g: 0.39, b: 0.39 };
const MOVE_SPEED: f32 = 5.0;
const ROTATION_SPEED: f32 = 0.25;

fn window_conf() -> Conf {
    Conf {
        window_title: format!("softras v{}", VERSION),
        window_width: WIDTH as i32,
        window_height: HEIGHT as i32,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Texture: explicit path argument must load or we bail out; without
    // one the built-in UV grid keeps the demo self-contained.
    let texture = match std::env::args().nth(1) {
        Some(path) => match rasterizer::Texture::from_file(&path) {
            Ok(tex) => {
                println!("Loaded texture {} ({}x{})", path, tex.width, tex.height);
                tex
            }
            Err(e) => {
                eprintln!("Texture unavailable: {}", e);
                return;
            }
        },
        None => rasterizer::Texture::uv_grid(256, 256),
    };

    let strip_mesh = Mesh::from_ron_file("assets/meshes/grid.ron").unwrap_or_else(|e| {
        eprintln!("{} (using built-in grid)", e);
        Mesh::grid_strip()
    });
    let list_mesh = Mesh::grid_list();
    let mut use_strip = true;

    let mut fb = Framebuffer::new(WIDTH, HEIGHT);
    let mut camera = Camera::new(rasterizer::Vec3::new(0.0, 0.0, -10.0), 60.0);
    let mut last_mouse = mouse_position();

    println!("=== softras v{} ===", VERSION);

    loop {
        let dt = get_frame_time();

        // Keyboard: move along the camera basis
        let mut local = rasterizer::Vec3::ZERO;
        if is_key_down(KeyCode::W) {
            local.z += MOVE_SPEED * dt;
        }
        if is_key_down(KeyCode::S) {
            local.z -= MOVE_SPEED * dt;
        }
        if is_key_down(KeyCode::A) {
            local.x -= MOVE_SPEED * dt;
        }
        if is_key_down(KeyCode::D) {
            local.x += MOVE_SPEED * dt;
        }
        camera.move_local(local);

        // Mouse: right-drag rotates forward by yaw/pitch
        let mouse = mouse_position();
        let (dx, dy) = (mouse.0 - last_mouse.0, mouse.1 - last_mouse.1);
        last_mouse = mouse;
        if is_mouse_button_down(MouseButton::Right) {
            camera.rotate(dx * ROTATION_SPEED * dt, -dy * ROTATION_SPEED * dt);
        }

        if is_key_pressed(KeyCode::Tab) {
            use_strip = !use_strip;
        }
        if is_key_pressed(KeyCode::Equal) {
            camera.set_fov_angle((camera.fov_angle + 5.0).min(170.0));
        }
        if is_key_pressed(KeyCode::Minus) {
            camera.set_fov_angle((camera.fov_angle - 5.0).max(10.0));
        }

        camera.calculate_view_matrix();

        let mesh = if use_strip { &strip_mesh } else { &list_mesh };
        fb.clear(BACKGROUND);
        let stats = render_mesh(&mut fb, mesh, &camera, Some(&texture));

        // Blit the framebuffer, scaled to the window with aspect kept
        clear_background(BLACK);
        let frame = Texture2D::from_rgba8(fb.width as u16, fb.height as u16, &fb.pixels);
        frame.set_filter(FilterMode::Nearest);

        let scale = (screen_width() / fb.width as f32).min(screen_height() / fb.height as f32);
        let draw_w = fb.width as f32 * scale;
        let draw_h = fb.height as f32 * scale;
        draw_texture_ex(
            &frame,
            (screen_width() - draw_w) / 2.0,
            (screen_height() - draw_h) / 2.0,
            WHITE,
            DrawTextureParams {
                dest_size: Some(Vec2::new(draw_w, draw_h)),
                ..Default::default()
            },
        );

        draw_text(
            &format!(
                "{} | tris {} drawn {} culled {} skipped {} | cam ({:.1}, {:.1}, {:.1}) | {} fps",
                if use_strip { "strip" } else { "list" },
                stats.triangles,
                stats.drawn,
                stats.culled,
                stats.skipped,
                camera.origin.x,
                camera.origin.y,
                camera.origin.z,
                get_fps(),
            ),
            5.0,
            15.0,
            14.0,
            Color::from_rgba(220, 220, 220, 255),
        );

        next_frame().await;
    }
}
