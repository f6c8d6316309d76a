use antler_common::EntityId;
use antler_kernel::{EngineConfig, Entity, Mesh, Scene};
use antler_render::{BasicMaterial, GpuContext};
use glam::Vec3;

/// Where the keyboard-controlled camera starts.
pub const CAMERA_START: Vec3 = Vec3::new(0.0, -14.0, 6.0);

/// Spinner yaw rate in radians per second.
pub const SPIN_RATE: f32 = 0.6;

const SATELLITES: [(Vec3, &str); 4] = [
    (Vec3::new(2.5, 0.0, 0.0), "#a3be8c"),
    (Vec3::new(-2.5, 0.0, 0.0), "#88c0d0"),
    (Vec3::new(0.0, 2.5, 0.0), "#b48ead"),
    (Vec3::new(0.0, -2.5, 0.0), "#ebcb8b"),
];

/// The viewer's starting scene and the handles the host drives directly.
pub struct Demo {
    pub scene: Scene,
    pub camera: EntityId,
    pub spinner: EntityId,
}

/// Camera, a ground slab, a spinning cube with satellites and a moon, and
/// the half-turned monster.
pub fn build(config: &EngineConfig, gpu: &mut dyn GpuContext) -> anyhow::Result<Demo> {
    let mut scene = Scene::from_config(config);

    let camera = config
        .entity_builder()
        .name("camera")
        .position(CAMERA_START)
        .keyboard_controlled(true)
        .build(gpu);
    let camera = scene.spawn_root(camera);

    let ground = cube(config, "ground", "#4c566a")
        .position(Vec3::new(0.0, 0.0, -0.6))
        .scale(Vec3::new(16.0, 16.0, 0.1))
        .try_build(gpu)?;
    scene.spawn_root(ground);

    let spinner = cube(config, "spinner", "#d08770")
        .position(Vec3::new(0.0, 0.0, 1.0))
        .try_build(gpu)?;
    let spinner = scene.spawn_root(spinner);

    for (i, (offset, color)) in SATELLITES.into_iter().enumerate() {
        let satellite = cube(config, &format!("satellite-{i}"), color)
            .position(offset)
            .scale(Vec3::splat(0.4))
            .try_build(gpu)?;
        let satellite = scene.spawn_child(spinner, satellite)?;
        if i == 0 {
            let moon = cube(config, "moon", "#eceff4")
                .position(Vec3::new(0.0, 0.0, 1.5))
                .scale(Vec3::splat(0.5))
                .try_build(gpu)?;
            scene.spawn_child(satellite, moon)?;
        }
    }

    let mut monster = config
        .entity_builder()
        .name("monster")
        .position(Vec3::new(4.0, 3.0, 1.0))
        .scale(Vec3::splat(0.25))
        .color("#ff00ff")
        .renderable(Box::new(BasicMaterial::new()), Mesh::cube(4.0))
        .try_build(gpu)?;
    monster.rotate_left_right(std::f32::consts::PI);
    scene.spawn_root(monster);

    tracing::info!(entities = scene.len(), "demo scene built");
    Ok(Demo {
        scene,
        camera,
        spinner,
    })
}

fn cube(config: &EngineConfig, name: &str, color: &str) -> antler_kernel::EntityBuilder {
    config
        .entity_builder()
        .name(name)
        .color(color)
        .renderable(Box::new(BasicMaterial::new()), Mesh::cube(1.0))
}

/// Yaw the spinner for one frame.
pub fn spin(scene: &mut Scene, spinner: EntityId, elapsed_ms: f32) {
    if let Some(entity) = scene.get_mut(spinner) {
        entity.rotate_left_right(elapsed_ms / 1000.0 * SPIN_RATE);
    }
}

/// View matrix of the camera entity, or identity if it was removed.
pub fn camera_view(scene: &Scene, camera: EntityId) -> glam::Mat4 {
    scene
        .get(camera)
        .map(Entity::view_matrix)
        .unwrap_or(glam::Mat4::IDENTITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use antler_input::{KeyCode, KeySnapshot};
    use antler_render::{CameraContext, RecordingGpu, RenderContext};

    fn demo() -> (Demo, RecordingGpu) {
        let mut gpu = RecordingGpu::new();
        let demo = build(&EngineConfig::default(), &mut gpu).unwrap();
        (demo, gpu)
    }

    #[test]
    fn demo_scene_shape() {
        let (demo, _) = demo();
        let scene = &demo.scene;
        assert_eq!(scene.len(), 9);
        assert_eq!(scene.roots().len(), 4);
        assert_eq!(scene.roots()[0], demo.camera);
        assert_eq!(scene.children(demo.spinner).len(), 4);
        assert_eq!(scene.iter().filter(|(_, e)| e.is_renderable()).count(), 8);
        let moon = scene
            .iter()
            .find(|(_, e)| e.name() == Some("moon"))
            .map(|(id, _)| id)
            .unwrap();
        assert_eq!(scene.depth(moon), Some(2));
    }

    #[test]
    fn every_renderable_draws_after_one_update() {
        let (mut demo, mut gpu) = demo();
        demo.scene.update(&KeySnapshot::new(), 16.0);
        let ctx = CameraContext::default();
        let stats = demo.scene.render(&mut RenderContext::new(&ctx, &mut gpu));
        assert_eq!(stats.drawn, 8);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn camera_flies_forward_on_w() {
        let (mut demo, _) = demo();
        let before = demo.scene.get(demo.camera).unwrap().position;
        let forward = demo.scene.get(demo.camera).unwrap().forward();
        let keys: KeySnapshot = [KeyCode::W].into_iter().collect();
        demo.scene.update(&keys, 1000.0);
        let after = demo.scene.get(demo.camera).unwrap().position;
        assert!((after - before).abs_diff_eq(forward * 3.5, 1e-4));
    }

    #[test]
    fn spin_turns_only_the_spinner() {
        let (mut demo, _) = demo();
        let right = demo.scene.get(demo.spinner).unwrap().right();
        let camera_right = demo.scene.get(demo.camera).unwrap().right();
        spin(&mut demo.scene, demo.spinner, 500.0);
        assert!(!demo.scene.get(demo.spinner).unwrap().right().abs_diff_eq(right, 1e-4));
        assert_eq!(demo.scene.get(demo.camera).unwrap().right(), camera_right);
    }

    #[test]
    fn camera_view_tracks_the_camera_entity() {
        let (demo, _) = demo();
        let view = camera_view(&demo.scene, demo.camera);
        let eye = view.inverse().transform_point3(Vec3::ZERO);
        assert!(eye.abs_diff_eq(CAMERA_START, 1e-3));
        assert_eq!(camera_view(&demo.scene, EntityId::new()), glam::Mat4::IDENTITY);
    }
}
