//! Level editor state: which tool is selected, its parameters, and the
//! operations that place, pick and erase entities in a world.
//!
//! Every position is in world space; the presentation layer converts the
//! cursor with `scroll + cursor` before calling in.

use glam::Vec2;

use crate::collision::Rect;
use crate::entity::{
    Collectable, Entity, EntityRef, GhostColor, Platform, PlatformKind, Spike,
    COLLECTABLE_RADIUS, SPIKE_SIZE,
};
use crate::ghost::Ghost;
use crate::moving_platform::MovingPlatform;
use crate::world::WorldState;

pub const MIN_PLATFORM_SIZE: f32 = 14.0;
pub const MAX_PLATFORM_WIDTH: f32 = 50.0;
pub const MIN_PLATFORM_SPEED: u32 = 1;
pub const MAX_PLATFORM_SPEED: u32 = 15;
/// Half the side of the square under the cursor that erase and pick test.
const CURSOR_HALF_SIZE: f32 = 3.0;
const ERASE_COOLDOWN_FRAMES: u32 = 10;
pub const PAN_SPEED: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Platform,
    Bouncy,
    Spike,
    JumpThrough,
    Ghost,
    Wall,
    MovingPlatform,
    Collectable,
    StartPosition,
}

impl Tool {
    pub const ALL: [Tool; 9] = [
        Tool::Platform,
        Tool::Bouncy,
        Tool::Spike,
        Tool::JumpThrough,
        Tool::Ghost,
        Tool::Wall,
        Tool::MovingPlatform,
        Tool::Collectable,
        Tool::StartPosition,
    ];

    /// Tools are bound to the number keys in this order.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn platform_kind(self) -> Option<PlatformKind> {
        match self {
            Tool::Platform => Some(PlatformKind::Platform),
            Tool::Bouncy => Some(PlatformKind::Bouncy),
            Tool::JumpThrough => Some(PlatformKind::JumpThrough),
            Tool::Wall => Some(PlatformKind::Wall),
            _ => None,
        }
    }

    fn for_platform(kind: PlatformKind) -> Self {
        match kind {
            PlatformKind::Platform => Tool::Platform,
            PlatformKind::Bouncy => Tool::Bouncy,
            PlatformKind::JumpThrough => Tool::JumpThrough,
            PlatformKind::Wall => Tool::Wall,
        }
    }

    fn limits_width(self) -> bool {
        self.platform_kind()
            .map_or(true, PlatformKind::has_width_limit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Added(EntityRef),
    /// First click of a moving platform: the path start is remembered.
    PathStarted(Vec2),
    StartMoved(Vec2),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Editor {
    pub tool: Tool,
    pub length: f32,
    pub width: f32,
    pub spike_count: u32,
    pub spike_flip: bool,
    pub ghost_color: GhostColor,
    pub platform_speed: u32,
    path_start: Option<Vec2>,
    erase_cooldown: u32,
}

impl Default for Editor {
    fn default() -> Self {
        Self {
            tool: Tool::Platform,
            length: 100.0,
            width: MIN_PLATFORM_SIZE,
            spike_count: 3,
            spike_flip: false,
            ghost_color: GhostColor::Red,
            platform_speed: 3,
            path_start: None,
            erase_cooldown: 0,
        }
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Per-frame housekeeping.
    pub fn tick(&mut self) {
        self.erase_cooldown = self.erase_cooldown.saturating_sub(1);
    }

    pub fn select(&mut self, tool: Tool) {
        if tool != self.tool {
            self.path_start = None;
        }
        self.tool = tool;
        self.clamp_size();
    }

    pub fn pending_path_start(&self) -> Option<Vec2> {
        self.path_start
    }

    pub fn resize(&mut self, d_length: f32, d_width: f32) {
        self.length += d_length;
        self.width += d_width;
        self.clamp_size();
    }

    fn clamp_size(&mut self) {
        self.length = self.length.max(MIN_PLATFORM_SIZE);
        self.width = self.width.max(MIN_PLATFORM_SIZE);
        if self.tool.limits_width() {
            self.width = self.width.min(MAX_PLATFORM_WIDTH);
        }
    }

    pub fn change_spike_count(&mut self, delta: i32) {
        self.spike_count = self.spike_count.saturating_add_signed(delta).max(1);
    }

    pub fn toggle_spike_flip(&mut self) {
        self.spike_flip = !self.spike_flip;
    }

    pub fn cycle_ghost_color(&mut self, forward: bool) {
        self.ghost_color = if forward {
            self.ghost_color.next()
        } else {
            self.ghost_color.previous()
        };
    }

    pub fn change_speed(&mut self, delta: i32) {
        self.platform_speed = self
            .platform_speed
            .saturating_add_signed(delta)
            .clamp(MIN_PLATFORM_SPEED, MAX_PLATFORM_SPEED);
    }

    /// Height the current tool's object occupies below its anchor point.
    fn footprint_height(&self, actor_size: f32) -> f32 {
        match self.tool {
            Tool::Spike if self.spike_flip => SPIKE_SIZE,
            Tool::Spike => 0.0,
            Tool::Ghost | Tool::StartPosition => actor_size,
            Tool::Collectable => COLLECTABLE_RADIUS,
            _ => self.width,
        }
    }

    /// Keep placements from sinking below the floor line.
    pub fn clamp_to_ground(&self, at: Vec2, world: &WorldState) -> Vec2 {
        let physics = &world.config.physics;
        clamp_above(at, physics.ground_y, self.footprint_height(physics.actor_size))
    }

    pub fn place(&mut self, world: &mut WorldState, at: Vec2) -> Placement {
        let at = self.clamp_to_ground(at, world);
        let entity = match self.tool {
            Tool::Platform | Tool::Bouncy | Tool::JumpThrough | Tool::Wall => {
                let kind = self.tool.platform_kind().unwrap_or(PlatformKind::Platform);
                Entity::Platform(Platform::new(kind, at.x, at.y, self.length, self.width))
            }
            Tool::Spike => {
                Entity::Spike(Spike::new(at.x, at.y, self.spike_count, self.spike_flip))
            }
            Tool::Ghost => Entity::Ghost(Ghost::new(at, self.ghost_color)),
            Tool::Collectable => Entity::Collectable(Collectable::new(at.x, at.y)),
            Tool::MovingPlatform => match self.path_start.take() {
                None => {
                    self.path_start = Some(at);
                    return Placement::PathStarted(at);
                }
                Some(start) => Entity::MovingPlatform(MovingPlatform::new(
                    start,
                    at,
                    self.length,
                    self.width,
                    self.platform_speed as f32,
                )),
            },
            Tool::StartPosition => {
                world.set_start(at);
                return Placement::StartMoved(at);
            }
        };
        Placement::Added(world.add(entity))
    }

    /// Preview of the moving platform the next click would create.
    pub fn preview_path(&self, world: &WorldState, at: Vec2) -> Option<MovingPlatform> {
        let start = self.path_start?;
        let end = self.clamp_to_ground(at, world);
        Some(MovingPlatform::new(
            start,
            end,
            self.length,
            self.width,
            self.platform_speed as f32,
        ))
    }

    /// Delete everything under the cursor. Returns how many entities went.
    pub fn erase(&mut self, world: &mut WorldState, at: Vec2) -> usize {
        if self.erase_cooldown > 0 {
            return 0;
        }
        let hits = world.entities_at(&Rect::around(at, CURSOR_HALF_SIZE));
        let removed = world.remove_all(hits).len();
        if removed > 0 {
            self.erase_cooldown = ERASE_COOLDOWN_FRAMES;
            log::debug!("Erased {removed} entities at ({}, {})", at.x, at.y);
        }
        removed
    }

    /// Eyedropper: adopt the tool and parameters of the entity under the
    /// cursor. Moving platforms take precedence, then collectables, ghosts,
    /// spikes and static platforms.
    pub fn pick(&mut self, world: &WorldState, at: Vec2) -> bool {
        let hits = world.entities_at(&Rect::around(at, CURSOR_HALF_SIZE));
        let Some(picked) = hits.last().and_then(|hit| world.get(*hit)) else {
            return false;
        };

        match picked {
            Entity::Platform(platform) => {
                self.select(Tool::for_platform(platform.kind));
                self.length = platform.length;
                self.width = platform.width;
            }
            Entity::Spike(spike) => {
                self.select(Tool::Spike);
                self.spike_count = spike.count;
                self.spike_flip = spike.flip;
            }
            Entity::Ghost(ghost) => {
                self.select(Tool::Ghost);
                self.ghost_color = ghost.color;
            }
            Entity::Collectable(_) => self.select(Tool::Collectable),
            Entity::MovingPlatform(platform) => {
                self.select(Tool::MovingPlatform);
                self.length = platform.length;
                self.width = platform.width;
                self.platform_speed = (platform.speed.round() as u32)
                    .clamp(MIN_PLATFORM_SPEED, MAX_PLATFORM_SPEED);
            }
        }
        self.clamp_size();
        true
    }

    /// Drop the player at `at` without moving the spawn point.
    pub fn teleport_player(&self, world: &mut WorldState, at: Vec2) {
        let physics = &world.config.physics;
        let at = clamp_above(at, physics.ground_y, physics.actor_size);
        world.player.respawn(at);
    }

    /// Scroll the camera; used with arrow keys while editing.
    pub fn pan(&self, world: &mut WorldState, direction: Vec2) {
        world.scroll += direction * PAN_SPEED;
    }
}

fn clamp_above(at: Vec2, ground_y: Option<f32>, height: f32) -> Vec2 {
    match ground_y {
        Some(ground_y) => Vec2::new(at.x, at.y.min(ground_y - height)),
        None => at,
    }
}
