//! Level entity model: the static shapes a level is built from and the
//! addressing the editor uses to find and remove them.

use glam::Vec2;

use crate::collision::{Passage, Rect};
use crate::ghost::Ghost;
use crate::moving_platform::MovingPlatform;

pub const SPIKE_SIZE: f32 = 30.0;
pub const SPIKE_HITBOX_INSET: f32 = 3.0;
pub const COLLECTABLE_RADIUS: f32 = 7.0;
const COLLECTABLE_BOB_AMPLITUDE: f32 = 10.0;
const COLLECTABLE_BOB_PERIOD: f32 = 15.0;
const COLLECTABLE_COUNTER_WRAP: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformKind {
    Platform,
    Bouncy,
    JumpThrough,
    Wall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStyle {
    Rounded,
    Square,
}

impl PlatformKind {
    pub const ALL: [PlatformKind; 4] = [
        PlatformKind::Platform,
        PlatformKind::Bouncy,
        PlatformKind::JumpThrough,
        PlatformKind::Wall,
    ];

    pub fn is_passable_upward(self) -> bool {
        matches!(self, PlatformKind::JumpThrough)
    }

    pub fn is_solid_for(self, passage: Passage) -> bool {
        !self.is_passable_upward() || passage.lands_on_jump_through()
    }

    /// Vertical velocity imparted to an actor resting on this surface.
    pub fn landing_impulse(self, bounce_speed: f32) -> Option<f32> {
        match self {
            PlatformKind::Bouncy => Some(-bounce_speed),
            _ => None,
        }
    }

    pub fn render_style(self) -> RenderStyle {
        match self {
            PlatformKind::Wall => RenderStyle::Square,
            _ => RenderStyle::Rounded,
        }
    }

    pub fn color(self) -> [u8; 3] {
        match self {
            PlatformKind::Platform | PlatformKind::Wall => [0, 0, 255],
            PlatformKind::Bouncy => [255, 255, 0],
            PlatformKind::JumpThrough => [140, 137, 129],
        }
    }

    /// Walls may be arbitrarily thick; other platforms are capped by the editor.
    pub fn has_width_limit(self) -> bool {
        !matches!(self, PlatformKind::Wall)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Static rectangle. `length` is the horizontal extent, `width` the vertical one.
#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    pub pos: Vec2,
    pub length: f32,
    pub width: f32,
    pub kind: PlatformKind,
}

impl Platform {
    pub fn new(kind: PlatformKind, x: f32, y: f32, length: f32, width: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            length,
            width,
            kind,
        }
    }

    pub fn hit_box(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.length, self.width)
    }

    pub fn intersects(&self, rect: &Rect) -> bool {
        self.hit_box().intersects(rect)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spike {
    /// Left end of the baseline.
    pub pos: Vec2,
    pub count: u32,
    /// Pointing down, hanging from `pos.y`.
    pub flip: bool,
}

impl Spike {
    pub fn new(x: f32, y: f32, count: u32, flip: bool) -> Self {
        Self {
            pos: Vec2::new(x, y),
            count: count.max(1),
            flip,
        }
    }

    pub fn row_length(&self) -> f32 {
        SPIKE_SIZE * self.count as f32
    }

    pub fn hit_box(&self) -> Rect {
        let height = if self.flip { -SPIKE_SIZE } else { SPIKE_SIZE };
        Rect::new(
            self.pos.x + SPIKE_HITBOX_INSET,
            self.pos.y - height,
            self.row_length() - SPIKE_HITBOX_INSET * 2.0,
            height,
        )
        .normalized()
    }

    pub fn intersects(&self, rect: &Rect) -> bool {
        self.hit_box().intersects(rect)
    }

    /// Triangle vertices (base left, tip, base right) for each tooth.
    pub fn teeth(&self) -> Vec<[Vec2; 3]> {
        let tip_dy = if self.flip { SPIKE_SIZE } else { -SPIKE_SIZE };
        (0..self.count)
            .map(|i| {
                let left = self.pos.x + SPIKE_SIZE * i as f32;
                [
                    Vec2::new(left, self.pos.y),
                    Vec2::new(left + SPIKE_SIZE * 0.5, self.pos.y + tip_dy),
                    Vec2::new(left + SPIKE_SIZE, self.pos.y),
                ]
            })
            .collect()
    }
}

/// Pellet the player eats. The level is won once every one is eaten.
#[derive(Debug, Clone, PartialEq)]
pub struct Collectable {
    /// Centre, including the current bob offset.
    pub pos: Vec2,
    /// Resting centre height; what gets saved.
    pub anchor_y: f32,
    pub counter: u32,
    pub eaten: bool,
}

impl Collectable {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            anchor_y: y,
            counter: 0,
            eaten: false,
        }
    }

    pub fn hit_box(&self) -> Rect {
        Rect::around(self.pos, COLLECTABLE_RADIUS)
    }

    pub fn intersects(&self, rect: &Rect) -> bool {
        self.hit_box().intersects(rect)
    }

    pub fn bob(&mut self) {
        self.counter += 1;
        if self.counter > COLLECTABLE_COUNTER_WRAP {
            self.counter = 0;
        }
        let phase = self.counter as f32 / COLLECTABLE_BOB_PERIOD;
        self.pos.y = self.anchor_y + phase.sin() * COLLECTABLE_BOB_AMPLITUDE;
    }

    /// Mark eaten. Returns false if it already was.
    pub fn eat(&mut self) -> bool {
        if self.eaten {
            return false;
        }
        self.eaten = true;
        true
    }

    pub fn reset(&mut self) {
        self.eaten = false;
        self.counter = 0;
        self.pos.y = self.anchor_y;
    }

    pub fn is_visible(&self, scroll: Vec2, view: Vec2) -> bool {
        let screen = self.hit_box().to_screen(scroll);
        screen.right() > 0.0 && screen.x < view.x && screen.bottom() > 0.0 && screen.y < view.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GhostColor {
    Red,
    Orange,
    Pink,
    Blue,
}

impl GhostColor {
    pub const ALL: [GhostColor; 4] = [
        GhostColor::Red,
        GhostColor::Orange,
        GhostColor::Pink,
        GhostColor::Blue,
    ];

    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> u32 {
        match self {
            GhostColor::Red => 0,
            GhostColor::Orange => 1,
            GhostColor::Pink => 2,
            GhostColor::Blue => 3,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() as usize + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() as usize + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            GhostColor::Red => [236, 28, 36],
            GhostColor::Orange => [255, 202, 24],
            GhostColor::Pink => [255, 174, 200],
            GhostColor::Blue => [0, 168, 243],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Platform,
    Spike,
    Ghost,
    Collectable,
    MovingPlatform,
}

/// Index into one of the world's per-kind collections. Invalidated by any
/// removal from the same collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub index: usize,
}

#[derive(Debug, Clone)]
pub enum Entity {
    Platform(Platform),
    Spike(Spike),
    Ghost(Ghost),
    Collectable(Collectable),
    MovingPlatform(MovingPlatform),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Platform(_) => EntityKind::Platform,
            Entity::Spike(_) => EntityKind::Spike,
            Entity::Ghost(_) => EntityKind::Ghost,
            Entity::Collectable(_) => EntityKind::Collectable,
            Entity::MovingPlatform(_) => EntityKind::MovingPlatform,
        }
    }

    pub fn hit_box(&self, actor_size: f32) -> Rect {
        match self {
            Entity::Platform(platform) => platform.hit_box(),
            Entity::Spike(spike) => spike.hit_box(),
            Entity::Ghost(ghost) => ghost.hit_box(actor_size),
            Entity::Collectable(collectable) => collectable.hit_box(),
            Entity::MovingPlatform(platform) => platform.hit_box(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spike_hit_box_is_inset_and_above_baseline() {
        let spike = Spike::new(100.0, 500.0, 3, false);
        assert_eq!(spike.hit_box(), Rect::new(103.0, 470.0, 84.0, 30.0));
    }

    #[test]
    fn flipped_spike_hangs_below_baseline() {
        let spike = Spike::new(100.0, 200.0, 1, true);
        assert_eq!(spike.hit_box(), Rect::new(103.0, 200.0, 24.0, 30.0));
        let teeth = spike.teeth();
        assert_eq!(teeth.len(), 1);
        assert_eq!(teeth[0][1], Vec2::new(115.0, 230.0));
    }

    #[test]
    fn spike_count_is_at_least_one() {
        assert_eq!(Spike::new(0.0, 0.0, 0, false).count, 1);
    }

    #[test]
    fn collectable_hit_box_is_centred() {
        let c = Collectable::new(50.0, 60.0);
        assert_eq!(c.hit_box(), Rect::new(43.0, 53.0, 14.0, 14.0));
    }

    #[test]
    fn collectable_bob_wraps_counter() {
        let mut c = Collectable::new(0.0, 100.0);
        c.counter = 1000;
        c.bob();
        assert_eq!(c.counter, 0);
        assert_eq!(c.pos.y, 100.0);
        c.bob();
        assert!((c.pos.y - (100.0 + (1.0f32 / 15.0).sin() * 10.0)).abs() < 1e-4);
    }

    #[test]
    fn collectable_eat_is_idempotent_until_reset() {
        let mut c = Collectable::new(0.0, 0.0);
        assert!(c.eat());
        assert!(!c.eat());
        c.reset();
        assert!(!c.eaten);
        assert!(c.eat());
    }

    #[test]
    fn platform_hooks() {
        assert!(PlatformKind::JumpThrough.is_passable_upward());
        assert!(!PlatformKind::Wall.is_passable_upward());
        assert_eq!(PlatformKind::Bouncy.landing_impulse(25.0), Some(-25.0));
        assert_eq!(PlatformKind::Platform.landing_impulse(25.0), None);
        assert_eq!(PlatformKind::Wall.render_style(), RenderStyle::Square);
        assert_eq!(PlatformKind::Bouncy.render_style(), RenderStyle::Rounded);
        assert!(!PlatformKind::Wall.has_width_limit());
    }

    #[test]
    fn ghost_colour_cycles_both_ways() {
        assert_eq!(GhostColor::Blue.next(), GhostColor::Red);
        assert_eq!(GhostColor::Red.previous(), GhostColor::Blue);
        assert_eq!(GhostColor::from_index(2), Some(GhostColor::Pink));
        assert_eq!(GhostColor::from_index(4), None);
    }
}
