//! Lienzo demo entry point.
//!
//! Builds a small scene — a key-steered ship bouncing inside the display
//! rectangle, a group of drifting debris — and drives it headless for a
//! fixed number of frames on a recording surface. With `--trace` the final
//! frame's draw operations are written as JSON, which is handy for
//! eyeballing the camera transform stream without a real canvas.
//!
//! Synthetic key events are fed through the same channel a real host would
//! use, so the input path is exercised end to end.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- --frames 300 --trace trace.json
//! ```

use std::path::PathBuf;

use clap::Parser;
use log::{error, info};

use lienzo::behaviors::bounds::{Rect, bounded};
use lienzo::behaviors::input::{OnKeyConfig, ThrustBindings, on_key, thrust_keys};
use lienzo::behaviors::motion::{momentum, speed_ramp};
use lienzo::behaviors::steering::rotate_keys;
use lienzo::config::GameConfig;
use lienzo::game::Game;
use lienzo::keys::KeyEvent;
use lienzo::sprite::{Body, Sprite, Token};
use lienzo::surface::{DrawSurface, RecordingSurface};
use lienzo::time::Duration;
use lienzo::vector::{Position, Velocity};

/// Lienzo 2D sprite engine demo
#[derive(Parser)]
#[command(version, about = "Headless demo scene for the lienzo sprite engine")]
struct Cli {
    /// Config file path (INI). Missing file falls back to defaults.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Number of fixed-step frames to simulate.
    #[arg(long, default_value_t = 300)]
    frames: u32,

    /// Write the final frame's draw operations as JSON to this path.
    #[arg(long, value_name = "PATH")]
    trace: Option<PathBuf>,

    /// Stroke each sprite's bounding box after its own draw call.
    #[arg(long)]
    debug_bounds: bool,
}

fn bounce() -> impl FnMut(&lienzo::behaviors::TickCtx, &mut lienzo::sprite::SpriteState, (f32, f32)) {
    |_ctx, sprite, (ex, ey)| {
        if ex != 0.0 {
            sprite.pos.x -= ex;
            sprite.vel.x = -sprite.vel.x;
        }
        if ey != 0.0 {
            sprite.pos.y -= ey;
            sprite.vel.y = -sprite.vel.y;
        }
    }
}

fn ship(bounds: Rect) -> Sprite {
    Sprite::at(Position::zero())
        .with_body(Body::Box {
            half_w: 8.0,
            half_h: 5.0,
        })
        .with_behavior(rotate_keys(3.0, &["d", "ArrowRight"], &["a", "ArrowLeft"]))
        // a/d steer by rotation, so thrust only acts along the facing axis.
        .with_behavior(thrust_keys(ThrustBindings {
            left: Vec::new(),
            right: Vec::new(),
            ..ThrustBindings::default()
        }))
        .with_behavior(speed_ramp(220.0, 1.5, 2.5))
        .with_behavior(bounded(bounds, bounce()))
        .with_behavior(on_key(
            OnKeyConfig::new(["Space"]).token(Token::new("fire")),
        ))
        .with_event_handler(|state, event| {
            info!(
                "fire! token={} at={}ms pos=({:.1},{:.1})",
                event.token.as_str(),
                event.at.millis(),
                state.pos.x,
                state.pos.y
            );
        })
        .with_drawable(|surface: &mut dyn DrawSurface| {
            surface.begin_path();
            surface.rect(-8.0, -5.0, 16.0, 10.0);
            surface.stroke();
        })
}

fn debris(bounds: Rect) -> Sprite {
    let x = fastrand::f32() * bounds.w + bounds.min_x();
    let y = fastrand::f32() * bounds.h + bounds.min_y();
    let vx = fastrand::f32() * 80.0 - 40.0;
    let vy = fastrand::f32() * 80.0 - 40.0;
    Sprite::at(Position::new(x, y))
        .with_velocity(Velocity::new(vx, vy))
        .with_body(Body::Circle { radius: 3.0 })
        .with_behavior(momentum())
        .with_behavior(bounded(bounds, bounce()))
        .without_auto_rotate()
        .with_drawable(|surface: &mut dyn DrawSurface| {
            surface.begin_path();
            surface.rect(-3.0, -3.0, 6.0, 6.0);
            surface.stroke();
        })
}

/// Scripted input: thrust for the first half of the run, a few steering
/// taps, one fire.
fn feed_input(frame: u32, keys: &crossbeam_channel::Sender<KeyEvent>) {
    match frame {
        10 => keys.send(KeyEvent::down("w")).unwrap(),
        60 => keys.send(KeyEvent::down("ArrowRight")).unwrap(),
        90 => keys.send(KeyEvent::up("ArrowRight")).unwrap(),
        120 => keys.send(KeyEvent::down("Space")).unwrap(),
        121 => keys.send(KeyEvent::up("Space")).unwrap(),
        150 => keys.send(KeyEvent::up("w")).unwrap(),
        _ => {}
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = GameConfig::with_path(cli.config);
    config.load_from_file().ok(); // ignore errors, use defaults
    config.debug_bounds |= cli.debug_bounds;

    let (width, height) = config.display_size();
    let frame_ms = config.frame_millis();

    let mut game = match Game::new(config) {
        Ok(game) => game,
        Err(e) => {
            error!("Failed to create game: {e}");
            std::process::exit(1);
        }
    };

    let bounds = Rect::centered(width, height);
    game.scene_mut().add_sprite(ship(bounds));

    let mut field = lienzo::scene::Scene::new();
    for _ in 0..12 {
        field.add_sprite(debris(bounds));
    }
    game.scene_mut().add_group(field);

    info!(
        "Simulating {} frames at {:.1}ms per frame, {} sprites",
        cli.frames,
        frame_ms,
        game.scene().sprite_count()
    );

    let keys = game.keyboard().sender();
    let mut surface = RecordingSurface::new(width, height);
    for frame in 0..cli.frames {
        feed_input(frame, &keys);
        surface.take_ops(); // keep only the current frame
        game.advance(Duration::from_millis(frame_ms));
        game.render(&mut surface);
    }

    info!(
        "Done: {:.1}s of game time, {} draw ops in the final frame",
        game.elapsed().seconds(),
        surface.ops().len()
    );

    if let Some(path) = cli.trace {
        let ops = surface.take_ops();
        match serde_json::to_string_pretty(&ops) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    error!("Failed to write trace to {}: {e}", path.display());
                    std::process::exit(1);
                }
                info!("Trace written to {}", path.display());
            }
            Err(e) => {
                error!("Failed to serialize trace: {e}");
                std::process::exit(1);
            }
        }
    }
}
