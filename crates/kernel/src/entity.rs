use crate::geometry::{GeometryError, Mesh};
use antler_common::math::{self, DIAGONAL_AXIS, WORLD_X, WORLD_Y, WORLD_Z};
use antler_common::{Color, ColorError, EntityId};
use antler_input::DirectionFlags;
use antler_render::{GeometryBuffers, GpuContext, Material};
use glam::{Mat4, Vec3};

/// Point every new entity initially faces.
pub const DEFAULT_LOOK_AT: Vec3 = Vec3::new(0.0, -1.0, 1.85);
/// World up used to seed the basis.
pub const WORLD_UP: Vec3 = Vec3::Z;
/// Units per second.
pub const DEFAULT_MOVE_SPEED: f32 = 3.5;
/// Radians per second.
pub const DEFAULT_ROTATE_SPEED: f32 = 1.5;

#[derive(Debug, thiserror::Error)]
pub enum EntityError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Color(#[from] ColorError),
    #[error("entity has no renderable payload")]
    NotRenderable,
}

/// Material, colour and uploaded geometry of a drawable entity.
#[derive(Debug)]
pub struct Renderable {
    pub material: Box<dyn Material>,
    pub color: Color,
    pub geometry: GeometryBuffers,
}

/// What an entity carries besides its transform.
#[derive(Debug, Default)]
pub enum Payload {
    #[default]
    None,
    Renderable(Renderable),
}

/// A node in the scene: pose, orthonormal basis, optional renderable
/// payload and tree links.
#[derive(Debug)]
pub struct Entity {
    name: Option<String>,
    pub position: Vec3,
    /// Carried for inspection; not part of the world transform.
    pub rotation: Vec3,
    pub origin: Vec3,
    pub scale: Vec3,
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    payload: Payload,
    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Vec<EntityId>,
    pub(crate) world_transform: Option<Mat4>,
    input: DirectionFlags,
    pub keyboard_controlled: bool,
    pub move_speed: f32,
    pub rotate_speed: f32,
    active: bool,
}

impl Entity {
    /// Transform-only entity at `position` facing [`DEFAULT_LOOK_AT`].
    pub fn new(position: Vec3) -> Self {
        let forward = math::normalize(math::subtract(DEFAULT_LOOK_AT, position));
        let right = math::normalize(math::cross(forward, WORLD_UP));
        let up = math::normalize(math::cross(right, forward));
        Self {
            name: None,
            position,
            rotation: Vec3::ZERO,
            origin: Vec3::ZERO,
            scale: Vec3::ONE,
            forward,
            right,
            up,
            payload: Payload::None,
            parent: None,
            children: Vec::new(),
            world_transform: None,
            input: DirectionFlags::default(),
            keyboard_controlled: false,
            move_speed: DEFAULT_MOVE_SPEED,
            rotate_speed: DEFAULT_ROTATE_SPEED,
            active: true,
        }
    }

    pub fn builder() -> EntityBuilder {
        EntityBuilder::new()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn renderable(&self) -> Option<&Renderable> {
        match &self.payload {
            Payload::Renderable(r) => Some(r),
            Payload::None => None,
        }
    }

    pub fn is_renderable(&self) -> bool {
        matches!(self.payload, Payload::Renderable(_))
    }

    /// Replace the payload; the caller supplies already-uploaded buffers.
    pub fn set_payload(&mut self, payload: Payload) {
        self.payload = payload;
    }

    pub fn color(&self) -> Option<Color> {
        self.renderable().map(|r| r.color)
    }

    /// Set the renderable colour from a hex string, keeping opacity.
    pub fn set_color(&mut self, hex: &str) -> Result<(), EntityError> {
        match &mut self.payload {
            Payload::Renderable(r) => Ok(r.color.set_hex(hex)?),
            Payload::None => Err(EntityError::NotRenderable),
        }
    }

    pub fn set_opacity(&mut self, opacity: f32) -> Result<(), EntityError> {
        match &mut self.payload {
            Payload::Renderable(r) => {
                r.color.opacity = opacity;
                Ok(())
            }
            Payload::None => Err(EntityError::NotRenderable),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    /// World transform from the last update, if the entity needed one.
    pub fn world_transform(&self) -> Option<Mat4> {
        self.world_transform
    }

    pub fn input(&self) -> DirectionFlags {
        self.input
    }

    /// Latch the direction flags consumed by the next [`Entity::do_step`].
    pub fn set_input(&mut self, input: DirectionFlags) {
        self.input = input;
    }

    /// Whether update must derive a world transform for this entity.
    pub fn needs_transform(&self) -> bool {
        self.is_renderable() || !self.children.is_empty()
    }

    /// Yaw: turn `forward` about the current `up`.
    pub fn rotate_left_right(&mut self, rad: f32) {
        let m = math::rotate(math::identity(), rad, self.up);
        self.forward = math::transform_point(m, self.forward);
        self.realign();
    }

    /// Pitch: turn `forward` about the current `right`.
    pub fn rotate_up_down(&mut self, rad: f32) {
        let m = math::rotate(math::identity(), rad, self.right);
        self.forward = math::transform_point(m, self.forward);
        self.realign();
    }

    /// Rebuild `right` and `up` from `forward` so the basis is orthonormal.
    pub fn realign(&mut self) {
        self.right = math::normalize(math::cross(self.forward, self.up));
        self.up = math::normalize(math::cross(self.right, self.forward));
        self.forward = math::normalize(self.forward);
    }

    pub fn move_forward(&mut self, distance: f32) {
        self.position = math::scale_and_add(self.position, self.forward, distance);
    }

    pub fn move_right(&mut self, distance: f32) {
        self.position = math::scale_and_add(self.position, self.right, distance);
    }

    pub fn move_up(&mut self, distance: f32) {
        self.position = math::scale_and_add(self.position, self.up, distance);
    }

    /// Integrate the latched input over `elapsed_ms` milliseconds.
    pub fn do_step(&mut self, elapsed_ms: f32) {
        let seconds = elapsed_ms / 1000.0;
        let distance = seconds * self.move_speed;
        let angle = seconds * self.rotate_speed;
        let input = self.input;

        let forward = input.forward_axis();
        if forward != 0.0 {
            self.move_forward(forward * distance);
        }
        let right = input.right_axis();
        if right != 0.0 {
            self.move_right(right * distance);
        }
        let up = input.up_axis();
        if up != 0.0 {
            self.move_up(up * distance);
        }
        let yaw = input.yaw_axis();
        if yaw != 0.0 {
            self.rotate_left_right(yaw * angle);
        }
        let pitch = input.pitch_axis();
        if pitch != 0.0 {
            self.rotate_up_down(pitch * angle);
        }
    }

    /// View matrix looking along `forward` from `position`.
    pub fn view_matrix(&self) -> Mat4 {
        math::look_at(
            self.position,
            math::add(self.position, self.forward),
            self.up,
        )
    }

    /// World transform under `parent`, or under identity for a top-level entity.
    ///
    /// Each basis vector contributes a rotation about the diagonal axis
    /// `(1,1,1)` by its angle to the matching world axis.
    pub fn compute_world_transform(&self, parent: Option<Mat4>) -> Mat4 {
        let m = parent.unwrap_or_else(math::identity);
        let m = math::translate(m, self.position);
        let m = math::translate(m, -self.origin);
        let m = math::rotate(m, math::angle_between(WORLD_X, self.right), DIAGONAL_AXIS);
        let m = math::rotate(m, math::angle_between(WORLD_Y, self.forward), DIAGONAL_AXIS);
        let m = math::rotate(m, math::angle_between(WORLD_Z, self.up), DIAGONAL_AXIS);
        let m = math::translate(m, self.origin);
        math::scale(m, self.scale)
    }
}

struct PendingRenderable {
    material: Box<dyn Material>,
    mesh: Mesh,
}

impl PendingRenderable {
    /// Upload the mesh and prepare the material.
    ///
    /// A material whose program fails to prepare is logged and left
    /// unprepared; the entity then renders nothing.
    fn resolve(
        self,
        color: Color,
        entity: Option<&str>,
        gpu: &mut dyn GpuContext,
    ) -> Result<Renderable, GeometryError> {
        let PendingRenderable { mut material, mesh } = self;
        let geometry = mesh.upload(gpu)?;
        if let Err(error) = material.prepare(gpu) {
            tracing::error!(
                %error,
                material = material.name(),
                entity = ?entity,
                "material failed to prepare"
            );
        }
        Ok(Renderable {
            material,
            color,
            geometry,
        })
    }
}

/// Configures and constructs an [`Entity`], uploading its geometry once.
pub struct EntityBuilder {
    name: Option<String>,
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
    origin: Vec3,
    keyboard_controlled: bool,
    move_speed: f32,
    rotate_speed: f32,
    active: bool,
    color: Option<String>,
    renderable: Option<PendingRenderable>,
}

impl Default for EntityBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityBuilder {
    pub fn new() -> Self {
        Self {
            name: None,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            origin: Vec3::ZERO,
            keyboard_controlled: false,
            move_speed: DEFAULT_MOVE_SPEED,
            rotate_speed: DEFAULT_ROTATE_SPEED,
            active: true,
            color: None,
            renderable: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    pub fn keyboard_controlled(mut self, controlled: bool) -> Self {
        self.keyboard_controlled = controlled;
        self
    }

    pub fn move_speed(mut self, speed: f32) -> Self {
        self.move_speed = speed;
        self
    }

    pub fn rotate_speed(mut self, speed: f32) -> Self {
        self.rotate_speed = speed;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Hex colour of the renderable; white when unset.
    pub fn color(mut self, hex: impl Into<String>) -> Self {
        self.color = Some(hex.into());
        self
    }

    pub fn renderable(mut self, material: Box<dyn Material>, mesh: Mesh) -> Self {
        self.renderable = Some(PendingRenderable { material, mesh });
        self
    }

    fn into_parts(self) -> (Entity, Option<String>, Option<PendingRenderable>) {
        let mut entity = Entity::new(self.position);
        entity.name = self.name;
        entity.rotation = self.rotation;
        entity.scale = self.scale;
        entity.origin = self.origin;
        entity.keyboard_controlled = self.keyboard_controlled;
        entity.move_speed = self.move_speed;
        entity.rotate_speed = self.rotate_speed;
        entity.active = self.active;
        (entity, self.color, self.renderable)
    }

    /// Build, failing on an invalid colour or invalid geometry.
    pub fn try_build(self, gpu: &mut dyn GpuContext) -> Result<Entity, EntityError> {
        let (mut entity, color, pending) = self.into_parts();
        let color = match color {
            Some(hex) => Color::from_hex(&hex)?,
            None => Color::default(),
        };
        if let Some(pending) = pending {
            let renderable = pending.resolve(color, entity.name(), gpu)?;
            entity.payload = Payload::Renderable(renderable);
        }
        Ok(entity)
    }

    /// Build, logging failures instead of returning them.
    ///
    /// An invalid colour falls back to white; invalid geometry leaves the
    /// entity without a payload.
    pub fn build(self, gpu: &mut dyn GpuContext) -> Entity {
        let (mut entity, color, pending) = self.into_parts();
        let color = match color.as_deref().map(Color::from_hex) {
            Some(Ok(color)) => color,
            Some(Err(error)) => {
                tracing::warn!(%error, entity = ?entity.name, "invalid colour, using white");
                Color::default()
            }
            None => Color::default(),
        };
        if let Some(pending) = pending {
            match pending.resolve(color, entity.name(), gpu) {
                Ok(renderable) => entity.payload = Payload::Renderable(renderable),
                Err(error) => {
                    tracing::error!(%error, entity = ?entity.name, "renderable disabled")
                }
            }
        }
        entity
    }
}
