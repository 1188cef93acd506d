//! Flockwork headless host
//!
//! Drives a scene the way a browser/native frame loop would: frames arrive with a
//! measured delta, the accumulator feeds fixed-size simulation ticks, and the final
//! state is printed as JSON for whoever renders or inspects it.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use flockwork::consts::{MAX_SUBSTEPS, SIM_DT};
use flockwork::sim::{
    BoidReport, BounceConfig, BounceScene, CollisionCounts, FlockConfig, FlockScene, Scene,
};
use flockwork::{Settings, SettingsStore};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SceneKind {
    Flock,
    Bounce,
}

#[derive(Debug, Parser)]
#[command(name = "flockwork", about = "Run a headless flocking/bounce simulation")]
struct Args {
    /// Scene to run
    #[arg(long, value_enum, default_value = "flock")]
    scene: SceneKind,

    /// Number of boids (or balls)
    #[arg(long, default_value_t = 20)]
    count: usize,

    /// Placement seed; omit for a different layout every run
    #[arg(long)]
    seed: Option<u32>,

    /// Host frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Host frame delta in seconds (may differ from the fixed sim step)
    #[arg(long, default_value_t = 1.0 / 60.0)]
    frame_dt: f32,

    #[arg(long, default_value_t = 800.0)]
    width: f32,

    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Resize the viewport to WIDTHxHEIGHT halfway through
    #[arg(long, value_parser = parse_size)]
    resize_to: Option<(f32, f32)>,

    /// Flocking settings (JSON); defaults are used if the file doesn't exist
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Enable the leader boid
    #[arg(long)]
    leader: bool,

    /// Write the effective settings back to this path
    #[arg(long)]
    save_settings: Option<PathBuf>,
}

fn parse_size(s: &str) -> Result<(f32, f32), String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", s))?;
    let w = w.trim().parse::<f32>().map_err(|e| e.to_string())?;
    let h = h.trim().parse::<f32>().map_err(|e| e.to_string())?;
    Ok((w, h))
}

/// Fixed-timestep driver around a scene
struct Host<S: Scene> {
    scene: S,
    accumulator: f32,
    ticks: u64,
}

impl<S: Scene> Host<S> {
    fn new(scene: S) -> Self {
        Self {
            scene,
            accumulator: 0.0,
            ticks: 0,
        }
    }

    /// Run as many fixed ticks as the elapsed frame time allows
    fn frame(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.scene.update(SIM_DT);
            self.accumulator -= SIM_DT;
            self.ticks += 1;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            // Behind; drop the backlog rather than spiral
            self.accumulator = 0.0;
        }
    }
}

#[derive(Serialize)]
struct FlockSummary {
    ticks: u64,
    initial_heading_variance: f32,
    final_heading_variance: f32,
    settings: Settings,
    boids: Vec<BoidReport>,
}

#[derive(Serialize)]
struct BounceSummary {
    ticks: u64,
    balls: usize,
    collisions: CollisionCounts,
}

fn run_frames<S: Scene>(host: &mut Host<S>, args: &Args) {
    for frame in 0..args.frames {
        if frame == args.frames / 2 {
            if let Some((w, h)) = args.resize_to {
                host.scene.resize(Some(w), Some(h));
            }
        }
        host.frame(args.frame_dt);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    log::info!("Flockwork (headless) starting: {:?} scene", args.scene);

    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if args.leader {
        settings.leader_boid_enabled = true;
    }
    let store = SettingsStore::new(settings);
    if let Some(path) = &args.save_settings {
        store.snapshot().save(path)?;
    }

    let viewport = flockwork::sim::Viewport::new(args.width, args.height);
    let output = match args.scene {
        SceneKind::Flock => {
            let config = FlockConfig {
                boid_count: args.count,
                seed: args.seed,
            };
            let mut host = Host::new(FlockScene::new(config, store.clone(), viewport));
            host.scene.create()?;
            let initial_heading_variance = host.scene.heading_variance();
            run_frames(&mut host, &args);
            let summary = FlockSummary {
                ticks: host.ticks,
                initial_heading_variance,
                final_heading_variance: host.scene.heading_variance(),
                settings: (*store.snapshot()).clone(),
                boids: host.scene.reports(),
            };
            host.scene.shutdown();
            serde_json::to_string_pretty(&summary)?
        }
        SceneKind::Bounce => {
            let config = BounceConfig {
                ball_count: args.count,
                seed: args.seed,
                ..Default::default()
            };
            let mut host = Host::new(BounceScene::new(config, viewport));
            host.scene.create()?;
            run_frames(&mut host, &args);
            let summary = BounceSummary {
                ticks: host.ticks,
                balls: host.scene.arena().len(),
                collisions: host.scene.counts(),
            };
            host.scene.shutdown();
            serde_json::to_string_pretty(&summary)?
        }
    };

    println!("{}", output);
    Ok(())
}
