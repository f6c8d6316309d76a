use antler_common::EntityId;
use antler_kernel::{Entity, Scene};
use glam::Vec3;

/// Read-only queries against a [`Scene`] for diagnostics and development UI.
pub struct SceneInspector;

impl SceneInspector {
    pub fn summary(scene: &Scene) -> SceneSummary {
        let attached = scene.traversal_order();
        let max_depth = attached
            .iter()
            .filter_map(|id| scene.depth(*id))
            .max()
            .unwrap_or(0);
        let mut summary = SceneSummary {
            frame: scene.frame(),
            total: scene.len(),
            attached: attached.len(),
            roots: scene.roots().len(),
            renderable: 0,
            controlled: 0,
            max_depth,
            max_basis_error: 0.0,
        };
        for (_, entity) in scene.iter() {
            if entity.is_renderable() {
                summary.renderable += 1;
            }
            if entity.keyboard_controlled {
                summary.controlled += 1;
            }
            summary.max_basis_error = summary.max_basis_error.max(basis_error(entity));
        }
        summary
    }

    pub fn inspect_entity(scene: &Scene, id: EntityId) -> Option<EntityInfo> {
        let entity = scene.get(id)?;
        Some(EntityInfo {
            id,
            name: entity.name().map(str::to_string),
            position: entity.position,
            scale: entity.scale,
            forward: entity.forward(),
            right: entity.right(),
            up: entity.up(),
            depth: scene.depth(id).unwrap_or(0),
            children: entity.children().len(),
            renderable: entity.is_renderable(),
            controlled: entity.keyboard_controlled,
            active: entity.is_active(),
            has_world_transform: entity.world_transform().is_some(),
            basis_error: basis_error(entity),
        })
    }

    /// Attached entities in traversal order, then detached ones in id order.
    pub fn list_entities(scene: &Scene) -> Vec<EntityId> {
        let mut ids = scene.traversal_order();
        let detached: Vec<EntityId> = scene
            .iter()
            .map(|(id, _)| id)
            .filter(|id| !ids.contains(id))
            .collect();
        ids.extend(detached);
        ids
    }
}

/// Largest deviation of an entity basis from orthonormality.
///
/// `max(| |f|-1 |, | |r|-1 |, | |u|-1 |, |f·r|, |f·u|, |r·u|)`
pub fn basis_error(entity: &Entity) -> f32 {
    let (f, r, u) = (entity.forward(), entity.right(), entity.up());
    [
        (f.length() - 1.0).abs(),
        (r.length() - 1.0).abs(),
        (u.length() - 1.0).abs(),
        f.dot(r).abs(),
        f.dot(u).abs(),
        r.dot(u).abs(),
    ]
    .into_iter()
    .fold(0.0, f32::max)
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSummary {
    pub frame: u64,
    pub total: usize,
    pub attached: usize,
    pub roots: usize,
    pub renderable: usize,
    pub controlled: usize,
    pub max_depth: usize,
    pub max_basis_error: f32,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scene: frame={} entities={} attached={} roots={} renderable={} controlled={} depth={} drift={:.2e}",
            self.frame,
            self.total,
            self.attached,
            self.roots,
            self.renderable,
            self.controlled,
            self.max_depth,
            self.max_basis_error,
        )
    }
}

/// Pose and basis of a single entity.
#[derive(Debug, Clone)]
pub struct EntityInfo {
    pub id: EntityId,
    pub name: Option<String>,
    pub position: Vec3,
    pub scale: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub depth: usize,
    pub children: usize,
    pub renderable: bool,
    pub controlled: bool,
    pub active: bool,
    pub has_world_transform: bool,
    pub basis_error: f32,
}

fn fmt_vec(v: Vec3) -> String {
    format!("({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)
}

impl std::fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}Entity [{}] {}pos={} scale={} fwd={} right={} up={} depth={} children={}",
            "  ".repeat(self.depth),
            self.id.short(),
            self.name
                .as_deref()
                .map(|n| format!("{n:?} "))
                .unwrap_or_default(),
            fmt_vec(self.position),
            fmt_vec(self.scale),
            fmt_vec(self.forward),
            fmt_vec(self.right),
            fmt_vec(self.up),
            self.depth,
            self.children,
        )?;
        if self.renderable {
            write!(f, " [renderable]")?;
        }
        if self.controlled {
            write!(f, " [controlled]")?;
        }
        if !self.active {
            write!(f, " [inactive]")?;
        }
        Ok(())
    }
}
