//! Patrolling ghost: walks until it meets a wall or a ledge, then turns back.

use glam::Vec2;

use crate::collision::{Passage, Rect, Terrain};
use crate::config::PhysicsConfig;
use crate::entity::{Facing, GhostColor, Spike};
use crate::particles::Burst;

#[derive(Debug, Clone, PartialEq)]
pub enum GhostState {
    Alive,
    Dead(Burst),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ghost {
    pub pos: Vec2,
    /// Where the level placed it.
    pub spawn: Vec2,
    pub color: GhostColor,
    pub velocity_y: f32,
    pub facing: Facing,
    pub state: GhostState,
}

impl Ghost {
    pub fn new(pos: Vec2, color: GhostColor) -> Self {
        Self {
            pos,
            spawn: pos,
            color,
            velocity_y: 0.0,
            facing: Facing::Right,
            state: GhostState::Alive,
        }
    }

    pub fn hit_box(&self, actor_size: f32) -> Rect {
        Rect::new(self.pos.x, self.pos.y, actor_size, actor_size)
    }

    pub fn center(&self, actor_size: f32) -> Vec2 {
        self.pos + Vec2::splat(actor_size * 0.5)
    }

    pub fn is_alive(&self) -> bool {
        matches!(self.state, GhostState::Alive)
    }

    pub fn die(&mut self, burst: Burst) {
        self.state = GhostState::Dead(burst);
    }

    /// Dead and every particle has left the screen.
    pub fn is_gone(&self) -> bool {
        match &self.state {
            GhostState::Alive => false,
            GhostState::Dead(burst) => burst.is_finished(),
        }
    }

    /// One frame of ghost physics. Returns true when a spike killed it.
    pub fn step(&mut self, terrain: &Terrain, spikes: &[Spike], physics: &PhysicsConfig) -> bool {
        let size = physics.actor_size;

        self.pos.y += self.velocity_y;
        self.velocity_y = (self.velocity_y + physics.gravity).min(physics.max_fall_speed);

        let hit_box = self.hit_box(size);
        if spikes.iter().any(|spike| spike.intersects(&hit_box)) {
            return true;
        }

        // Rising ghosts ignore jump-through platforms like the player does.
        let passage = Passage::new(self.velocity_y, false);
        let vertical =
            terrain.resolve_vertical(hit_box, self.velocity_y, passage, physics.max_resolve_steps);
        let falling = self.velocity_y >= 0.0;
        if vertical.collided {
            self.pos.y += vertical.offset_y;
            self.velocity_y = 0.0;
            if !falling {
                return false;
            }
        }

        let passage = Passage::new(self.velocity_y, false);
        let grounded = vertical.collided
            || (falling && terrain.surface_under(&self.hit_box(size), passage).is_some());
        if grounded {
            self.patrol(terrain, passage, physics);
        }

        if let Some(surface) = terrain.surface_under(&self.hit_box(size), passage) {
            if let Some(impulse) = surface.landing_impulse(physics.bounce_speed) {
                self.velocity_y = impulse;
            }
        }

        false
    }

    fn patrol(&mut self, terrain: &Terrain, passage: Passage, physics: &PhysicsConfig) {
        let size = physics.actor_size;
        let dx = physics.ghost_speed * self.facing.sign();
        let step = terrain.step_horizontal(self.hit_box(size), dx, passage, physics.max_wall_height);
        if step.blocked {
            self.facing = self.facing.reversed();
            return;
        }
        self.pos.x += step.dx;
        self.pos.y += step.climb;

        if terrain.surface_under(&self.hit_box(size), passage).is_none() {
            self.pos.x -= step.dx;
            self.facing = self.facing.reversed();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Platform, PlatformKind};

    fn physics() -> PhysicsConfig {
        PhysicsConfig {
            ground_y: None,
            ..PhysicsConfig::default()
        }
    }

    fn run(ghost: &mut Ghost, platforms: &[Platform], spikes: &[Spike], frames: usize) -> bool {
        let terrain = Terrain::new(platforms, &[], None);
        (0..frames).any(|_| ghost.step(&terrain, spikes, &physics()))
    }

    #[test]
    fn turns_around_at_ledge_and_stays_on_platform() {
        let platforms = vec![Platform::new(PlatformKind::Platform, 0.0, 500.0, 200.0, 20.0)];
        let mut ghost = Ghost::new(Vec2::new(100.0, 450.0), GhostColor::Red);

        let mut turned = false;
        let terrain = Terrain::new(&platforms, &[], None);
        for _ in 0..400 {
            ghost.step(&terrain, &[], &physics());
            if ghost.facing == Facing::Left {
                turned = true;
            }
            let hit_box = ghost.hit_box(50.0);
            assert!(hit_box.x < 200.0 && hit_box.right() > 0.0, "walked off the platform");
        }
        assert!(turned);
        assert!(ghost.pos.y <= 450.0);
    }

    #[test]
    fn turns_around_at_wall() {
        let platforms = vec![
            Platform::new(PlatformKind::Platform, 0.0, 500.0, 1000.0, 20.0),
            Platform::new(PlatformKind::Wall, 300.0, 300.0, 30.0, 200.0),
        ];
        let mut ghost = Ghost::new(Vec2::new(200.0, 450.0), GhostColor::Blue);
        let terrain = Terrain::new(&platforms, &[], None);
        let mut max_right: f32 = 0.0;
        for _ in 0..100 {
            ghost.step(&terrain, &[], &physics());
            max_right = max_right.max(ghost.hit_box(50.0).right());
        }
        assert!(max_right <= 300.0);
        assert_eq!(ghost.facing, Facing::Left);
        assert!(ghost.pos.x < 240.0);
    }

    #[test]
    fn dies_on_spike() {
        let platforms = vec![Platform::new(PlatformKind::Platform, 0.0, 500.0, 1000.0, 20.0)];
        let spikes = vec![Spike::new(200.0, 500.0, 2, false)];
        let mut ghost = Ghost::new(Vec2::new(100.0, 450.0), GhostColor::Pink);
        assert!(run(&mut ghost, &platforms, &spikes, 60));
    }

    #[test]
    fn rises_through_jump_through() {
        let platforms = vec![Platform::new(PlatformKind::JumpThrough, 0.0, 400.0, 400.0, 14.0)];
        let mut ghost = Ghost::new(Vec2::new(100.0, 420.0), GhostColor::Orange);
        ghost.velocity_y = -20.0;
        run(&mut ghost, &platforms, &[], 1);
        assert_eq!(ghost.pos.y, 400.0);
        assert_eq!(ghost.velocity_y, -19.0);
    }

    #[test]
    fn bounces_on_bouncy() {
        let platforms = vec![Platform::new(PlatformKind::Bouncy, 0.0, 500.0, 400.0, 14.0)];
        let mut ghost = Ghost::new(Vec2::new(100.0, 440.0), GhostColor::Red);
        ghost.velocity_y = 12.0;
        run(&mut ghost, &platforms, &[], 1);
        assert_eq!(ghost.velocity_y, -25.0);
    }

    #[test]
    fn gone_only_after_burst_finishes() {
        let mut ghost = Ghost::new(Vec2::ZERO, GhostColor::Red);
        assert!(!ghost.is_gone());
        ghost.die(Burst {
            particles: Vec::new(),
            color: GhostColor::Red.rgb(),
        });
        assert!(!ghost.is_alive());
        assert!(ghost.is_gone());
    }
}
