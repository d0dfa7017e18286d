use glam::Vec2;
use pmp_core::input::FrameInput;

use crate::collision::{Passage, Rect, Terrain};
use crate::config::PhysicsConfig;
use crate::entity::{Collectable, Facing, Spike};
use crate::ghost::Ghost;
use crate::particles::Burst;

pub const PLAYER_COLOR: [u8; 3] = [255, 255, 0];
const RESPAWN_AIRTIME: u32 = 5;
const TICKS_PER_MOUTH_FRAME: u32 = 5;
/// Open to closed and back again.
const MOUTH_SEQUENCE: [usize; 7] = [0, 1, 2, 3, 3, 2, 1];

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerState {
    Alive,
    Dead(Burst),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouthAnimation {
    ticks: u32,
    frame: usize,
}

impl MouthAnimation {
    pub fn tick(&mut self) {
        self.ticks += 1;
        if self.ticks == TICKS_PER_MOUTH_FRAME {
            self.ticks = 0;
            self.frame = (self.frame + 1) % MOUTH_SEQUENCE.len();
        }
    }

    /// Index of the sprite to draw, 0 (open) to 3 (closed).
    pub fn sprite(&self) -> usize {
        MOUTH_SEQUENCE[self.frame]
    }
}

/// Contacts observed during the last step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactState {
    pub down: bool,
    pub up: bool,
    pub wall: bool,
}

/// Things that kill the player on touch.
#[derive(Debug, Clone, Copy)]
pub struct Hazards<'a> {
    pub spikes: &'a [Spike],
    pub ghosts: &'a [Ghost],
}

impl Hazards<'_> {
    pub fn is_lethal(&self, hit_box: &Rect, actor_size: f32) -> bool {
        self.spikes.iter().any(|spike| spike.intersects(hit_box))
            || self
                .ghosts
                .iter()
                .any(|ghost| ghost.is_alive() && ghost.hit_box(actor_size).intersects(hit_box))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerStep {
    pub died: bool,
    pub collected: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Sprite top-left corner.
    pub pos: Vec2,
    pub velocity_y: f32,
    pub facing: Facing,
    /// Frames since last landing.
    pub airtime: u32,
    pub state: PlayerState,
    pub contacts: ContactState,
    pub mouth: MouthAnimation,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            velocity_y: 0.0,
            facing: Facing::Right,
            airtime: RESPAWN_AIRTIME,
            state: PlayerState::Alive,
            contacts: ContactState::default(),
            mouth: MouthAnimation::default(),
        }
    }

    pub fn hit_box(&self, physics: &PhysicsConfig) -> Rect {
        Rect::new(
            self.pos.x + physics.player_inset,
            self.pos.y,
            physics.actor_size - physics.player_inset * 2.0,
            physics.actor_size,
        )
    }

    /// Hit-box plus the strip under the feet; what moving platforms test to
    /// decide whether they carry the player.
    pub fn contact_box(&self, physics: &PhysicsConfig) -> Rect {
        self.hit_box(physics).grow_down(1.0)
    }

    pub fn center(&self, physics: &PhysicsConfig) -> Vec2 {
        self.pos + Vec2::splat(physics.actor_size * 0.5)
    }

    pub fn is_alive(&self) -> bool {
        matches!(self.state, PlayerState::Alive)
    }

    pub fn can_jump(&self, physics: &PhysicsConfig) -> bool {
        self.airtime <= physics.jump_grace_frames && self.velocity_y >= -physics.jump_speed
    }

    pub fn die(&mut self, burst: Burst) {
        self.state = PlayerState::Dead(burst);
    }

    pub fn respawn(&mut self, start: Vec2) {
        self.pos = start;
        self.velocity_y = 0.0;
        self.airtime = RESPAWN_AIRTIME;
        self.state = PlayerState::Alive;
        self.contacts = ContactState::default();
    }

    /// One frame of player physics. Returns early on lethal contact; the
    /// caller turns that into a death burst.
    pub fn step(
        &mut self,
        input: FrameInput,
        terrain: &Terrain,
        hazards: &Hazards,
        collectables: &mut [Collectable],
        physics: &PhysicsConfig,
    ) -> PlayerStep {
        let mut result = PlayerStep::default();
        self.contacts = ContactState::default();

        self.pos.y += self.velocity_y;
        self.velocity_y = (self.velocity_y + physics.gravity).min(physics.max_fall_speed);
        self.airtime = self.airtime.saturating_add(1);
        self.mouth.tick();

        let hit_box = self.hit_box(physics);
        if hazards.is_lethal(&hit_box, physics.actor_size) {
            result.died = true;
            return result;
        }
        result.collected = collect(collectables, &hit_box);

        let passage = Passage::new(self.velocity_y, input.drop);
        let vertical = terrain.resolve_vertical(
            hit_box,
            self.velocity_y,
            passage,
            physics.max_resolve_steps,
        );
        if vertical.residual {
            log::warn!("Player still embedded after {} steps", physics.max_resolve_steps);
        }
        if vertical.collided {
            self.pos.y += vertical.offset_y;
            if self.velocity_y >= 0.0 {
                self.airtime = 0;
                self.contacts.down = true;
            } else {
                self.contacts.up = true;
            }
            self.velocity_y = 0.0;
        }

        let passage = Passage::new(self.velocity_y, input.drop);
        if input.wants_left() {
            self.facing = Facing::Left;
            self.walk(-physics.player_speed, terrain, passage, physics);
        } else if input.wants_right() {
            self.facing = Facing::Right;
            self.walk(physics.player_speed, terrain, passage, physics);
        }

        if input.jump && self.can_jump(physics) {
            self.velocity_y = -physics.jump_speed;
        }

        let passage = Passage::new(self.velocity_y, input.drop);
        if let Some(surface) = terrain.surface_under(&self.hit_box(physics), passage) {
            self.contacts.down = true;
            if let Some(impulse) = surface.landing_impulse(physics.bounce_speed) {
                self.velocity_y = impulse;
            }
        }

        result
    }

    fn walk(&mut self, dx: f32, terrain: &Terrain, passage: Passage, physics: &PhysicsConfig) {
        let step = terrain.step_horizontal(
            self.hit_box(physics),
            dx,
            passage,
            physics.max_wall_height,
        );
        if step.blocked {
            self.contacts.wall = true;
            return;
        }
        self.pos.x += step.dx;
        self.pos.y += step.climb;
    }
}

fn collect(collectables: &mut [Collectable], hit_box: &Rect) -> u32 {
    collectables
        .iter_mut()
        .filter(|c| !c.eaten && c.intersects(hit_box))
        .map(|c| u32::from(c.eat()))
        .sum()
}
