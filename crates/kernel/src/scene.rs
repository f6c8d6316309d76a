use crate::config::EngineConfig;
use crate::entity::{Entity, Payload};
use antler_common::EntityId;
use antler_input::{DirectionFlags, KeyBindings, KeySnapshot};
use antler_render::{DrawItem, RenderContext};
use glam::Mat4;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),
    #[error("entity {0} is already attached")]
    AlreadyAttached(EntityId),
    #[error("attaching {child} under {parent} would create a cycle")]
    Cycle { parent: EntityId, child: EntityId },
}

/// Outcome of one render traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Entities whose material drew successfully.
    pub drawn: usize,
    /// Entities whose material reported an error.
    pub failed: usize,
    /// Renderable entities skipped: unprepared material or no transform yet.
    pub skipped: usize,
}

/// Owns every entity and the tree linking them.
///
/// Entities live in an id-keyed arena; `roots` lists the top-level
/// entities in attach order. Only attached entities take part in
/// update and render.
#[derive(Debug, Default)]
pub struct Scene {
    entities: BTreeMap<EntityId, Entity>,
    roots: Vec<EntityId>,
    bindings: KeyBindings,
    frame: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bindings(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            ..Self::default()
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_bindings(config.bindings.clone())
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn set_bindings(&mut self, bindings: KeyBindings) {
        self.bindings = bindings;
    }

    /// Number of completed updates.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Insert a detached entity.
    pub fn spawn(&mut self, mut entity: Entity) -> EntityId {
        entity.parent = None;
        entity.children.clear();
        entity.world_transform = None;
        let id = EntityId::new();
        self.entities.insert(id, entity);
        tracing::trace!(%id, "entity spawned");
        id
    }

    pub fn spawn_root(&mut self, entity: Entity) -> EntityId {
        let id = self.spawn(entity);
        self.roots.push(id);
        id
    }

    pub fn spawn_child(&mut self, parent: EntityId, entity: Entity) -> Result<EntityId, SceneError> {
        if !self.entities.contains_key(&parent) {
            return Err(SceneError::UnknownEntity(parent));
        }
        let id = self.spawn(entity);
        self.add(parent, id)?;
        Ok(id)
    }

    /// Attach `child` as a top-level entity.
    pub fn add_root(&mut self, child: EntityId) -> Result<(), SceneError> {
        self.check_detached(child)?;
        self.roots.push(child);
        Ok(())
    }

    /// Attach `child` as the last child of `parent`.
    pub fn add(&mut self, parent: EntityId, child: EntityId) -> Result<(), SceneError> {
        if !self.entities.contains_key(&parent) {
            return Err(SceneError::UnknownEntity(parent));
        }
        self.check_detached(child)?;
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(SceneError::Cycle { parent, child });
            }
            cursor = self.entities.get(&id).and_then(|e| e.parent);
        }
        if let Some(c) = self.entities.get_mut(&child) {
            c.parent = Some(parent);
        }
        if let Some(p) = self.entities.get_mut(&parent) {
            p.children.push(child);
        }
        Ok(())
    }

    fn check_detached(&self, id: EntityId) -> Result<(), SceneError> {
        let entity = self.entities.get(&id).ok_or(SceneError::UnknownEntity(id))?;
        if entity.parent.is_some() || self.roots.contains(&id) {
            return Err(SceneError::AlreadyAttached(id));
        }
        Ok(())
    }

    /// Unlink `id` from its parent or the root list; its subtree stays with it.
    pub fn detach(&mut self, id: EntityId) -> Result<(), SceneError> {
        let parent = self
            .entities
            .get_mut(&id)
            .ok_or(SceneError::UnknownEntity(id))?
            .parent
            .take();
        match parent {
            Some(parent) => {
                if let Some(p) = self.entities.get_mut(&parent) {
                    p.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
        Ok(())
    }

    /// Remove `id` and its whole subtree. Returns how many entities were removed.
    pub fn despawn(&mut self, id: EntityId) -> usize {
        if self.detach(id).is_err() {
            return 0;
        }
        let mut stack = vec![id];
        let mut removed = 0;
        while let Some(next) = stack.pop() {
            if let Some(entity) = self.entities.remove(&next) {
                stack.extend(entity.children);
                removed += 1;
            }
        }
        tracing::debug!(%id, removed, "subtree despawned");
        removed
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    pub fn children(&self, id: EntityId) -> &[EntityId] {
        self.entities
            .get(&id)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All entities in id order, attached or not.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().map(|(id, e)| (*id, e))
    }

    /// Number of ancestors of `id`; roots and detached entities are at depth 0.
    pub fn depth(&self, id: EntityId) -> Option<usize> {
        let mut depth = 0;
        let mut cursor = self.entities.get(&id)?.parent;
        while let Some(parent) = cursor {
            depth += 1;
            cursor = self.entities.get(&parent).and_then(|e| e.parent);
        }
        Some(depth)
    }

    /// Pre-order ids of every attached entity, roots first in attach order.
    pub fn traversal_order(&self) -> Vec<EntityId> {
        let mut order = Vec::with_capacity(self.entities.len());
        let mut stack: Vec<EntityId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        order
    }

    /// Advance one frame: integrate input on controlled entities and derive
    /// world transforms top-down.
    pub fn update(&mut self, keys: &KeySnapshot, elapsed_ms: f32) {
        let _span = tracing::debug_span!("scene_update", frame = self.frame, elapsed_ms).entered();
        let input = self.bindings.resolve(keys);
        for i in 0..self.roots.len() {
            let root = self.roots[i];
            self.update_entity(root, None, input, elapsed_ms);
        }
        self.frame += 1;
    }

    fn update_entity(
        &mut self,
        id: EntityId,
        parent: Option<Mat4>,
        input: DirectionFlags,
        elapsed_ms: f32,
    ) {
        let Some(entity) = self.entities.get_mut(&id) else {
            return;
        };
        if !entity.is_active() {
            return;
        }
        if entity.keyboard_controlled {
            entity.set_input(input);
            entity.do_step(elapsed_ms);
        }
        if !entity.needs_transform() {
            entity.world_transform = None;
            return;
        }
        let world = entity.compute_world_transform(parent);
        entity.world_transform = Some(world);

        let count = entity.children.len();
        for i in 0..count {
            let Some(child) = self.entities.get(&id).and_then(|e| e.children.get(i).copied()) else {
                break;
            };
            self.update_entity(child, Some(world), input, elapsed_ms);
        }
    }

    /// Draw every attached renderable in pre-order. Never touches transforms.
    pub fn render(&self, ctx: &mut RenderContext<'_>) -> RenderStats {
        let _span = tracing::debug_span!("scene_render", frame = self.frame).entered();
        let mut stats = RenderStats::default();
        for root in &self.roots {
            self.render_entity(*root, ctx, &mut stats);
        }
        tracing::trace!(?stats, "scene rendered");
        stats
    }

    fn render_entity(&self, id: EntityId, ctx: &mut RenderContext<'_>, stats: &mut RenderStats) {
        let Some(entity) = self.entities.get(&id) else {
            return;
        };
        if !entity.is_active() {
            return;
        }
        if let Payload::Renderable(renderable) = entity.payload() {
            match entity.world_transform {
                Some(world) if renderable.material.is_prepared() => {
                    let item = DrawItem {
                        id,
                        name: entity.name(),
                        world,
                        color: renderable.color.to_vec4(),
                        geometry: &renderable.geometry,
                    };
                    match renderable.material.render(&item, ctx) {
                        Ok(()) => stats.drawn += 1,
                        Err(error) => {
                            tracing::warn!(%id, %error, "material render failed");
                            stats.failed += 1;
                        }
                    }
                }
                Some(_) => {
                    tracing::trace!(%id, material = renderable.material.name(), "material not prepared");
                    stats.skipped += 1;
                }
                None => {
                    tracing::debug!(%id, "renderable has no world transform yet");
                    stats.skipped += 1;
                }
            }
        }
        for child in &entity.children {
            self.render_entity(*child, ctx, stats);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityBuilder;
    use crate::geometry::Mesh;
    use antler_input::KeyCode;
    use antler_render::{
        BasicMaterial, CameraContext, GpuCommand, GpuContext, Material, MaterialError,
        ProgramHandle, RecordingGpu,
    };
    use glam::Vec3;
    use std::cell::RefCell;
    use std::f32::consts::PI;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records the name of every item it is asked to draw.
    struct StubMaterial {
        log: Log,
        fail: bool,
        prepared: bool,
    }

    impl Material for StubMaterial {
        fn name(&self) -> &str {
            "stub"
        }

        fn prepare(&mut self, _gpu: &mut dyn GpuContext) -> Result<ProgramHandle, MaterialError> {
            self.prepared = true;
            Ok(ProgramHandle(0))
        }

        fn is_prepared(&self) -> bool {
            self.prepared
        }

        fn render(&self, item: &DrawItem<'_>, _ctx: &mut RenderContext<'_>) -> Result<(), MaterialError> {
            self.log
                .borrow_mut()
                .push(item.name.unwrap_or("?").to_string());
            if self.fail {
                return Err(MaterialError::NotPrepared("stub".into()));
            }
            Ok(())
        }
    }

    fn triangle() -> Mesh {
        Mesh::new(
            vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            vec![0, 1, 2],
            vec![Vec3::Z; 3],
        )
    }

    fn stub(gpu: &mut RecordingGpu, log: &Log, name: &str, position: Vec3) -> Entity {
        EntityBuilder::new()
            .name(name)
            .position(position)
            .renderable(
                Box::new(StubMaterial {
                    log: log.clone(),
                    fail: false,
                    prepared: false,
                }),
                triangle(),
            )
            .build(gpu)
    }

    fn render(scene: &Scene, gpu: &mut RecordingGpu) -> RenderStats {
        let camera = CameraContext::default();
        let mut ctx = RenderContext::new(&camera, gpu);
        scene.render(&mut ctx)
    }

    /// root -> (a -> a1), b
    fn three_level(gpu: &mut RecordingGpu, log: &Log) -> (Scene, [EntityId; 4]) {
        let mut scene = Scene::new();
        let root = scene.spawn_root(stub(gpu, log, "root", Vec3::new(1.0, 0.0, 0.0)));
        let a = scene
            .spawn_child(root, stub(gpu, log, "a", Vec3::new(0.0, 2.0, 0.0)))
            .unwrap();
        let a1 = scene
            .spawn_child(a, stub(gpu, log, "a1", Vec3::new(0.0, 0.0, 3.0)))
            .unwrap();
        let b = scene
            .spawn_child(root, stub(gpu, log, "b", Vec3::new(-1.0, 0.0, 0.0)))
            .unwrap();
        (scene, [root, a, a1, b])
    }

    #[test]
    fn add_rejects_unknown_ids() {
        let mut scene = Scene::new();
        let known = scene.spawn(Entity::new(Vec3::ZERO));
        let missing = EntityId::new();
        assert_eq!(scene.add(missing, known), Err(SceneError::UnknownEntity(missing)));
        assert_eq!(scene.add(known, missing), Err(SceneError::UnknownEntity(missing)));
        assert_eq!(scene.add_root(missing), Err(SceneError::UnknownEntity(missing)));
    }

    #[test]
    fn add_rejects_second_attachment() {
        let mut scene = Scene::new();
        let root = scene.spawn_root(Entity::new(Vec3::ZERO));
        let other = scene.spawn_root(Entity::new(Vec3::ZERO));
        let child = scene.spawn(Entity::new(Vec3::ZERO));
        scene.add(root, child).unwrap();
        assert_eq!(scene.add(other, child), Err(SceneError::AlreadyAttached(child)));
        assert_eq!(scene.add_root(child), Err(SceneError::AlreadyAttached(child)));
        assert_eq!(scene.add_root(root), Err(SceneError::AlreadyAttached(root)));
        assert_eq!(scene.add(other, root), Err(SceneError::AlreadyAttached(root)));
    }

    #[test]
    fn add_rejects_cycles() {
        let mut scene = Scene::new();
        let a = scene.spawn(Entity::new(Vec3::ZERO));
        assert_eq!(scene.add(a, a), Err(SceneError::Cycle { parent: a, child: a }));

        let b = scene.spawn_child(a, Entity::new(Vec3::ZERO)).unwrap();
        let c = scene.spawn_child(b, Entity::new(Vec3::ZERO)).unwrap();
        // `a` is detached, so only the cycle check can reject this.
        assert_eq!(scene.add(c, a), Err(SceneError::Cycle { parent: c, child: a }));
        assert_eq!(scene.depth(c), Some(2));
    }

    #[test]
    fn traversal_is_pre_order_in_insertion_order() {
        let mut gpu = RecordingGpu::new();
        let log = Log::default();
        let (mut scene, [root, a, a1, b]) = three_level(&mut gpu, &log);
        assert_eq!(scene.traversal_order(), vec![root, a, a1, b]);

        scene.update(&KeySnapshot::new(), 16.0);
        let stats = render(&scene, &mut gpu);
        assert_eq!(stats.drawn, 4);
        assert_eq!(*log.borrow(), vec!["root", "a", "a1", "b"]);
    }

    #[test]
    fn child_world_transform_composes_parent() {
        let mut gpu = RecordingGpu::new();
        let log = Log::default();
        let (mut scene, [root, a, a1, b]) = three_level(&mut gpu, &log);
        scene.update(&KeySnapshot::new(), 16.0);

        let world = |id| scene.get(id).unwrap().world_transform().unwrap();
        let local = |id: EntityId| scene.get(id).unwrap().compute_world_transform(None);
        assert_eq!(world(root), local(root));
        assert!(world(a).abs_diff_eq(world(root) * local(a), 1e-5));
        assert!(world(a1).abs_diff_eq(world(a) * local(a1), 1e-5));
        assert!(world(b).abs_diff_eq(world(root) * local(b), 1e-5));
    }

    #[test]
    fn leaf_without_payload_has_no_world_transform() {
        let mut scene = Scene::new();
        let group = scene.spawn_root(Entity::new(Vec3::new(0.0, 0.0, 1.0)));
        let leaf = scene.spawn_child(group, Entity::new(Vec3::ZERO)).unwrap();
        scene.update(&KeySnapshot::new(), 16.0);
        assert!(scene.get(group).unwrap().world_transform().is_some());
        assert!(scene.get(leaf).unwrap().world_transform().is_none());
    }

    #[test]
    fn render_before_update_draws_nothing() {
        let mut gpu = RecordingGpu::new();
        let log = Log::default();
        let (scene, _) = three_level(&mut gpu, &log);
        let stats = render(&scene, &mut gpu);
        assert_eq!(stats, RenderStats { drawn: 0, failed: 0, skipped: 4 });
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn render_does_not_touch_transforms() {
        let mut gpu = RecordingGpu::new();
        let log = Log::default();
        let (mut scene, ids) = three_level(&mut gpu, &log);
        scene.update(&KeySnapshot::new(), 16.0);
        let before: Vec<_> = ids
            .iter()
            .map(|id| scene.get(*id).unwrap().world_transform())
            .collect();
        render(&scene, &mut gpu);
        render(&scene, &mut gpu);
        let after: Vec<_> = ids
            .iter()
            .map(|id| scene.get(*id).unwrap().world_transform())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn failing_material_does_not_stop_traversal() {
        let mut gpu = RecordingGpu::new();
        let log = Log::default();
        let mut scene = Scene::new();
        let root = scene.spawn_root(stub(&mut gpu, &log, "root", Vec3::ZERO));
        let broken = EntityBuilder::new()
            .name("broken")
            .renderable(
                Box::new(StubMaterial {
                    log: log.clone(),
                    fail: true,
                    prepared: false,
                }),
                triangle(),
            )
            .build(&mut gpu);
        scene.spawn_child(root, broken).unwrap();
        scene
            .spawn_child(root, stub(&mut gpu, &log, "after", Vec3::ZERO))
            .unwrap();
        scene.update(&KeySnapshot::new(), 16.0);
        let stats = render(&scene, &mut gpu);
        assert_eq!(stats.drawn, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(*log.borrow(), vec!["root", "broken", "after"]);
    }

    #[test]
    fn inactive_subtree_is_skipped() {
        let mut gpu = RecordingGpu::new();
        let log = Log::default();
        let (mut scene, [_, a, a1, _]) = three_level(&mut gpu, &log);
        scene.get_mut(a).unwrap().set_active(false);
        scene.update(&KeySnapshot::new(), 16.0);
        assert!(scene.get(a1).unwrap().world_transform().is_none());
        render(&scene, &mut gpu);
        assert_eq!(*log.borrow(), vec!["root", "b"]);
    }

    #[test]
    fn controlled_entity_moves_and_carries_children() {
        let mut scene = Scene::new();
        let rig = EntityBuilder::new()
            .position(Vec3::new(0.0, -2.0, 1.85))
            .keyboard_controlled(true)
            .build(&mut RecordingGpu::new());
        let rig = scene.spawn_root(rig);
        let passenger = scene.spawn_child(rig, Entity::new(Vec3::ZERO)).unwrap();
        scene
            .spawn_child(passenger, Entity::new(Vec3::ZERO))
            .unwrap();

        let keys: KeySnapshot = [KeyCode::W].into_iter().collect();
        scene.update(&keys, 1000.0);
        let position = scene.get(rig).unwrap().position;
        assert!(position.abs_diff_eq(Vec3::new(0.0, 1.5, 1.85), 1e-5));

        let rig_world = scene.get(rig).unwrap().world_transform().unwrap();
        let passenger_world = scene.get(passenger).unwrap().world_transform().unwrap();
        assert!(
            passenger_world
                .w_axis
                .truncate()
                .abs_diff_eq(rig_world.w_axis.truncate(), 1e-5)
        );
    }

    #[test]
    fn controlled_children_receive_elapsed_time() {
        let mut scene = Scene::new();
        let root = scene.spawn_root(Entity::new(Vec3::ZERO));
        let mut child = Entity::new(Vec3::new(0.0, -2.0, 1.85));
        child.keyboard_controlled = true;
        let child = scene.spawn_child(root, child).unwrap();

        let keys: KeySnapshot = [KeyCode::Q].into_iter().collect();
        scene.update(&keys, 500.0);
        let position = scene.get(child).unwrap().position;
        assert!(position.abs_diff_eq(Vec3::new(0.0, -2.0, 1.85 + 1.75), 1e-5));
    }

    #[test]
    fn scene_bindings_drive_input() {
        let mut bindings = KeyBindings::empty();
        bindings.bind(KeyCode(32), antler_input::Direction::Up);
        let mut scene = Scene::with_bindings(bindings);
        let mut e = Entity::new(Vec3::new(0.0, -2.0, 1.85));
        e.keyboard_controlled = true;
        let id = scene.spawn_root(e);

        scene.update(&[KeyCode::W].into_iter().collect(), 1000.0);
        assert!(scene.get(id).unwrap().position.abs_diff_eq(Vec3::new(0.0, -2.0, 1.85), 1e-6));
        scene.update(&[KeyCode(32)].into_iter().collect(), 1000.0);
        assert!(scene.get(id).unwrap().position.abs_diff_eq(Vec3::new(0.0, -2.0, 5.35), 1e-5));
        assert_eq!(scene.frame(), 2);
    }

    #[test]
    fn detach_and_despawn() {
        let mut gpu = RecordingGpu::new();
        let log = Log::default();
        let (mut scene, [root, a, a1, b]) = three_level(&mut gpu, &log);

        scene.detach(b).unwrap();
        assert_eq!(scene.children(root), &[a]);
        assert_eq!(scene.get(b).unwrap().parent(), None);
        assert_eq!(scene.traversal_order(), vec![root, a, a1]);
        scene.add_root(b).unwrap();
        assert_eq!(scene.roots(), &[root, b]);

        assert_eq!(scene.despawn(a), 2);
        assert!(!scene.contains(a1));
        assert_eq!(scene.children(root), &[] as &[EntityId]);
        assert_eq!(scene.despawn(a), 0);
        assert_eq!(scene.despawn(root), 1);
        assert_eq!(scene.roots(), &[b]);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn detached_entities_are_not_updated() {
        let mut scene = Scene::new();
        let mut loose = Entity::new(Vec3::new(0.0, -2.0, 1.85));
        loose.keyboard_controlled = true;
        let loose = scene.spawn(loose);
        scene.update(&[KeyCode::W].into_iter().collect(), 1000.0);
        assert!(
            scene
                .get(loose)
                .unwrap()
                .position
                .abs_diff_eq(Vec3::new(0.0, -2.0, 1.85), 1e-6)
        );
        assert!(scene.traversal_order().is_empty());
    }

    #[test]
    fn update_is_deterministic() {
        let build = || {
            let mut gpu = RecordingGpu::new();
            let log = Log::default();
            let (mut scene, ids) = three_level(&mut gpu, &log);
            for id in ids {
                scene.get_mut(id).unwrap().keyboard_controlled = true;
            }
            let keys: KeySnapshot = [KeyCode::W, KeyCode::LEFT, KeyCode::UP].into_iter().collect();
            for _ in 0..30 {
                scene.update(&keys, 16.0);
            }
            ids.map(|id| scene.get(id).unwrap().world_transform())
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn half_turned_monster_under_camera_root() {
        let mut gpu = RecordingGpu::new();
        let mut scene = Scene::new();
        let camera = scene.spawn_root(Entity::new(Vec3::ZERO));
        let mut monster = EntityBuilder::new()
            .name("monster")
            .position(Vec3::new(0.0, 0.0, 10.0))
            .scale(Vec3::splat(0.002))
            .color("#ff00ff")
            .renderable(Box::new(BasicMaterial::new()), Mesh::cube(1.0))
            .try_build(&mut gpu)
            .unwrap();
        let forward = monster.forward();
        monster.rotate_left_right(PI);
        assert!(monster.forward().abs_diff_eq(-forward, 1e-4));
        let monster = scene.spawn_child(camera, monster).unwrap();

        scene.update(&KeySnapshot::new(), 16.0);
        let camera_world = scene.get(camera).unwrap().world_transform().unwrap();
        let m = scene.get(monster).unwrap();
        let expected = m.compute_world_transform(Some(camera_world));
        assert_eq!(m.world_transform(), Some(expected));

        gpu.drain_commands();
        let stats = render(&scene, &mut gpu);
        assert_eq!(stats.drawn, 1);
        assert_eq!(gpu.draw_count(), 1);
        assert!(gpu.commands().iter().any(|c| matches!(
            c,
            GpuCommand::UniformMat4 { value, .. } if *value == expected
        )));
        assert!(gpu.commands().contains(&GpuCommand::DrawElements {
            program: ProgramHandle(0),
            count: 36
        }));
    }

    #[test]
    fn root_and_children_draw_in_order() {
        let mut gpu = RecordingGpu::new();
        let mut scene = Scene::new();
        let cube = |gpu: &mut RecordingGpu, name: &str, hex: &str| {
            EntityBuilder::new()
                .name(name)
                .color(hex)
                .renderable(Box::new(BasicMaterial::new()), Mesh::cube(1.0))
                .try_build(gpu)
                .unwrap()
        };
        let root = scene.spawn_root(cube(&mut gpu, "root", "#ff0000"));
        scene.spawn_child(root, cube(&mut gpu, "a", "#00ff00")).unwrap();
        scene.spawn_child(root, cube(&mut gpu, "b", "#0000ff")).unwrap();
        scene.update(&KeySnapshot::new(), 16.0);
        gpu.drain_commands();

        render(&scene, &mut gpu);
        let colors: Vec<Vec3> = gpu
            .commands()
            .iter()
            .filter_map(|c| match c {
                GpuCommand::UniformVec4 { value, .. } => Some(value.truncate()),
                _ => None,
            })
            .collect();
        assert_eq!(colors, vec![Vec3::X, Vec3::Y, Vec3::Z]);
        assert_eq!(gpu.draw_count(), 3);
    }
}
