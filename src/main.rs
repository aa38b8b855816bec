use retrorast::engine::DEFAULT_RESOLUTION;
use retrorast::window::{FpsCounter, FrameLimiter, Key, Window, WindowEvent};
use retrorast::{Engine, RenderConfig, Texture};

const TEXTURE_PATH: &str = "testTexture.png";
const MODEL_PATH: &str = "testModel.obj";

fn toggle(config: &mut RenderConfig, key: Key) {
    match key {
        Key::Num1 => config.fill = !config.fill,
        Key::Num2 => config.wireframe = !config.wireframe,
        Key::Num3 => config.fog = !config.fog,
        Key::Num4 => config.face_lighting = !config.face_lighting,
        Key::Num5 => config.light_tracks_camera = !config.light_tracks_camera,
        Key::Num6 => config.vertex_color = !config.vertex_color,
        Key::Num7 => config.shade_flat = !config.shade_flat,
        Key::Num8 => config.texture_filter = !config.texture_filter,
        Key::Num9 => config.bloom = !config.bloom,
        Key::Num0 => config.dof_blur = !config.dof_blur,
        Key::Space => config.spin = !config.spin,
    }
}

fn main() -> Result<(), String> {
    let mut engine = Engine::new(DEFAULT_RESOLUTION);

    // Missing assets are not fatal: the renderer starts with an empty
    // scene and/or a black texture.
    if let Err(e) = engine.load_mesh(MODEL_PATH) {
        eprintln!("warning: {}: {}", MODEL_PATH, e);
    }
    match Texture::from_file(TEXTURE_PATH) {
        Ok(texture) => engine.set_texture(texture),
        Err(e) => eprintln!("warning: {}: {}", TEXTURE_PATH, e),
    }

    let mut window = Window::new("retrorast", DEFAULT_RESOLUTION as u32)?;
    let mut limiter = FrameLimiter::new(&window);
    let mut fps = FpsCounter::new();

    'running: loop {
        for event in window.poll_events() {
            match event {
                WindowEvent::Quit => break 'running,
                WindowEvent::KeyPress(key) => toggle(&mut engine.config, key),
            }
        }

        let input = window.input();
        let delta_ms = limiter.wait_and_get_delta(&window) as f32;

        engine.update(&input, delta_ms);
        engine.render();
        window.present(engine.frame_buffer())?;

        if let Some(fps) = fps.tick() {
            window.set_title(&format!("retrorast - {:.1} fps", fps));
        }
    }

    Ok(())
}
