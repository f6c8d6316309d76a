use serde::{Deserialize, Serialize};

/// A movement or rotation intent a key can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
    PitchUp,
    PitchDown,
    YawRight,
    YawLeft,
}

impl Direction {
    pub const ALL: [Direction; 10] = [
        Direction::Forward,
        Direction::Back,
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
        Direction::PitchUp,
        Direction::PitchDown,
        Direction::YawRight,
        Direction::YawLeft,
    ];
}

/// Directions active during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionFlags {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub pitch_up: bool,
    pub pitch_down: bool,
    pub yaw_right: bool,
    pub yaw_left: bool,
}

impl DirectionFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, direction: Direction, active: bool) {
        *self.slot(direction) = active;
    }

    pub fn with(mut self, direction: Direction) -> Self {
        self.set(direction, true);
        self
    }

    pub fn is_set(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.forward,
            Direction::Back => self.back,
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::PitchUp => self.pitch_up,
            Direction::PitchDown => self.pitch_down,
            Direction::YawRight => self.yaw_right,
            Direction::YawLeft => self.yaw_left,
        }
    }

    pub fn any(&self) -> bool {
        Direction::ALL.iter().any(|d| self.is_set(*d))
    }

    /// `+1` forward, `-1` back, `0` when neither or both are held.
    pub fn forward_axis(&self) -> f32 {
        axis(self.forward, self.back)
    }

    /// `+1` right, `-1` left.
    pub fn right_axis(&self) -> f32 {
        axis(self.right, self.left)
    }

    /// `+1` up, `-1` down.
    pub fn up_axis(&self) -> f32 {
        axis(self.up, self.down)
    }

    /// `+1` yaw left, `-1` yaw right.
    pub fn yaw_axis(&self) -> f32 {
        axis(self.yaw_left, self.yaw_right)
    }

    /// `+1` pitch up, `-1` pitch down.
    pub fn pitch_axis(&self) -> f32 {
        axis(self.pitch_up, self.pitch_down)
    }

    fn slot(&mut self, direction: Direction) -> &mut bool {
        match direction {
            Direction::Forward => &mut self.forward,
            Direction::Back => &mut self.back,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
            Direction::PitchUp => &mut self.pitch_up,
            Direction::PitchDown => &mut self.pitch_down,
            Direction::YawRight => &mut self.yaw_right,
            Direction::YawLeft => &mut self.yaw_left,
        }
    }
}

/// Positive only when the positive flag is set and the negative one is not.
fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}
