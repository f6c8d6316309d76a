use antler_input::{KeyCode, KeySnapshot};
use antler_kernel::{EngineConfig, Entity, Mesh, Scene};
use antler_render::{BasicMaterial, CameraContext, GpuCommand, RecordingGpu, RenderContext};
use antler_tools::SceneInspector;
use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec3;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "antler-cli", about = "CLI tool for the antler scene engine")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Engine configuration (YAML); defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print engine version and effective configuration
    Info,
    /// Drive a keyboard-controlled entity through the input pipeline
    Simulate {
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "60")]
        ticks: u32,
        /// Milliseconds per tick
        #[arg(short, long, default_value = "16")]
        elapsed_ms: f32,
        /// Keys held for every tick, by name or code (e.g. w,left,32)
        #[arg(short, long, value_delimiter = ',')]
        keys: Vec<String>,
    },
    /// Half-turned monster under a camera root, rendered once
    Scenario,
    /// Build a demo tree and dump its render traversal
    Render {
        /// Levels below the root
        #[arg(short, long, default_value = "2")]
        depth: usize,
        /// Children per entity
        #[arg(short, long, default_value = "2")]
        fanout: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Info => info(&config),
        Commands::Simulate {
            ticks,
            elapsed_ms,
            keys,
        } => simulate(&config, ticks, elapsed_ms, &keys)?,
        Commands::Scenario => scenario(&config)?,
        Commands::Render { depth, fanout } => render_tree(&config, depth, fanout)?,
    }

    Ok(())
}

fn info(config: &EngineConfig) {
    println!("antler-cli v{}", env!("CARGO_PKG_VERSION"));
    println!("render: {}", antler_render::crate_info());
    println!(
        "movement: move_speed={} rotate_speed={}",
        config.movement.move_speed, config.movement.rotate_speed
    );
    println!("frame: max_elapsed_ms={}", config.frame.max_elapsed_ms);
    println!("bindings ({}):", config.bindings.len());
    for code in 0..=255 {
        if let Some(direction) = config.bindings.direction(KeyCode(code)) {
            println!("  {code:>3} -> {direction:?}");
        }
    }
}

fn parse_keys(names: &[String]) -> anyhow::Result<KeySnapshot> {
    names
        .iter()
        .map(|name| {
            KeyCode::from_name(name.trim()).with_context(|| format!("unknown key {name:?}"))
        })
        .collect()
}

fn simulate(config: &EngineConfig, ticks: u32, elapsed_ms: f32, keys: &[String]) -> anyhow::Result<()> {
    let keys = parse_keys(keys)?;
    let elapsed = config.frame.clamp_elapsed(elapsed_ms);
    if elapsed != elapsed_ms {
        tracing::warn!(requested = elapsed_ms, used = elapsed, "elapsed time clamped");
    }

    let mut gpu = RecordingGpu::new();
    let mut scene = Scene::from_config(config);
    let rig = config
        .entity_builder()
        .name("rig")
        .keyboard_controlled(true)
        .build(&mut gpu);
    let id = scene.spawn_root(rig);

    println!("Simulate: ticks={ticks} elapsed_ms={elapsed} keys={:?}", keys.iter().collect::<Vec<_>>());
    if let Some(info) = SceneInspector::inspect_entity(&scene, id) {
        println!("start: {info}");
    }
    for _ in 0..ticks {
        scene.update(&keys, elapsed);
    }
    let info = SceneInspector::inspect_entity(&scene, id).context("rig vanished")?;
    println!("end:   {info}");
    println!("drift: {:.3e}", info.basis_error);
    Ok(())
}

fn scenario(config: &EngineConfig) -> anyhow::Result<()> {
    let mut gpu = RecordingGpu::new();
    let mut scene = Scene::from_config(config);

    let camera = config
        .entity_builder()
        .name("camera")
        .position(Vec3::new(0.0, -20.0, 10.0))
        .build(&mut gpu);
    let view = camera.view_matrix();
    let camera = scene.spawn_root(camera);

    let mut monster = config
        .entity_builder()
        .name("monster")
        .position(Vec3::new(0.0, 0.0, 10.0))
        .scale(Vec3::splat(0.002))
        .color("#ff00ff")
        .renderable(Box::new(BasicMaterial::new()), Mesh::cube(4.0))
        .try_build(&mut gpu)?;
    monster.rotate_left_right(std::f32::consts::PI);
    let monster = scene.spawn_child(camera, monster)?;

    scene.update(&KeySnapshot::new(), 16.0);
    gpu.drain_commands();

    let context = CameraContext::new(
        glam::Mat4::perspective_rh(60f32.to_radians(), 16.0 / 9.0, 0.1, 1000.0),
        view,
    );
    let stats = scene.render(&mut RenderContext::new(&context, &mut gpu));

    let info = SceneInspector::inspect_entity(&scene, monster).context("monster vanished")?;
    println!("{info}");
    if let Some(world) = scene.get(monster).and_then(Entity::world_transform) {
        println!("world transform:");
        for row in 0..4 {
            let r = world.row(row);
            println!("  [{:>8.4} {:>8.4} {:>8.4} {:>8.4}]", r.x, r.y, r.z, r.w);
        }
    }
    println!(
        "drawn={} failed={} skipped={} commands={}",
        stats.drawn,
        stats.failed,
        stats.skipped,
        gpu.commands().len()
    );
    Ok(())
}

/// Root with `fanout` children per entity, `depth` levels deep, named by path.
fn demo_tree(config: &EngineConfig, gpu: &mut RecordingGpu, depth: usize, fanout: usize) -> anyhow::Result<Scene> {
    let mut scene = Scene::from_config(config);
    let cube = |gpu: &mut RecordingGpu, name: String, offset: Vec3| {
        config
            .entity_builder()
            .name(name)
            .position(offset)
            .scale(Vec3::splat(0.5))
            .renderable(Box::new(BasicMaterial::new()), Mesh::cube(1.0))
            .try_build(gpu)
    };
    let root = scene.spawn_root(cube(gpu, "root".into(), Vec3::ZERO)?);
    let mut level = vec![(root, String::from("root"))];
    for d in 0..depth {
        let mut next = Vec::new();
        for (parent, path) in &level {
            for i in 0..fanout {
                let name = format!("{path}/{i}");
                let offset = Vec3::new(i as f32 * 2.0, 0.0, (d + 1) as f32);
                let id = scene.spawn_child(*parent, cube(gpu, name.clone(), offset)?)?;
                next.push((id, name));
            }
        }
        level = next;
    }
    Ok(scene)
}

fn render_tree(config: &EngineConfig, depth: usize, fanout: usize) -> anyhow::Result<()> {
    let mut gpu = RecordingGpu::new();
    let mut scene = demo_tree(config, &mut gpu, depth, fanout)?;
    scene.update(&KeySnapshot::new(), 16.0);
    gpu.drain_commands();

    let camera = CameraContext::default();
    let stats = scene.render(&mut RenderContext::new(&camera, &mut gpu));

    println!("{}", SceneInspector::summary(&scene));
    println!("draw order:");
    for id in scene.traversal_order() {
        if let Some(info) = SceneInspector::inspect_entity(&scene, id) {
            println!("  {}", info.name.as_deref().unwrap_or("?"));
        }
    }

    let mut counts = [0usize; 4];
    for command in gpu.commands() {
        match command {
            GpuCommand::UseProgram(_) => counts[0] += 1,
            GpuCommand::UniformMat4 { .. } | GpuCommand::UniformVec4 { .. } => counts[1] += 1,
            GpuCommand::BindVertexAttrib { .. } | GpuCommand::BindIndexBuffer(_) => counts[2] += 1,
            GpuCommand::DrawElements { .. } => counts[3] += 1,
            _ => {}
        }
    }
    println!(
        "commands: programs={} uniforms={} binds={} draws={} (drawn={} failed={} skipped={})",
        counts[0], counts[1], counts[2], counts[3], stats.drawn, stats.failed, stats.skipped
    );
    Ok(())
}
