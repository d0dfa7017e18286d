//! Death bursts: a fixed set of particles thrown upward that fall out of view.

use glam::Vec2;
use rand::Rng;

pub const PARTICLE_RADIUS: f32 = 10.0;
const HORIZONTAL_DRAG: f32 = 0.9;
const GRAVITY: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub velocity: Vec2,
    pub alive: bool,
}

impl Particle {
    fn update(&mut self, scroll_y: f32, view_height: f32) {
        self.pos.y += self.velocity.y;
        self.velocity.y += GRAVITY;
        self.pos.x += self.velocity.x;
        self.velocity.x *= HORIZONTAL_DRAG;
        self.alive = self.pos.y - scroll_y < view_height + PARTICLE_RADIUS;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Burst {
    pub particles: Vec<Particle>,
    pub color: [u8; 3],
}

impl Burst {
    pub fn spawn<R: Rng>(center: Vec2, count: usize, color: [u8; 3], rng: &mut R) -> Self {
        let particles = (0..count)
            .map(|_| Particle {
                pos: center,
                velocity: Vec2::new(
                    rng.gen_range(-13i32..=13) as f32,
                    rng.gen_range(-17i32..=-10) as f32,
                ),
                alive: true,
            })
            .collect();
        Self { particles, color }
    }

    /// Advance every live particle. Particles that leave the bottom of the
    /// view stay dead even if the camera later catches up with them.
    pub fn update(&mut self, scroll_y: f32, view_height: f32) {
        for particle in self.particles.iter_mut().filter(|p| p.alive) {
            particle.update(scroll_y, view_height);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.particles.iter().all(|p| !p.alive)
    }

    pub fn live_particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.alive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn spawn_velocities_are_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let burst = Burst::spawn(Vec2::new(100.0, 100.0), 20, [255, 255, 0], &mut rng);
        assert_eq!(burst.particles.len(), 20);
        for p in &burst.particles {
            assert!((-13.0..=13.0).contains(&p.velocity.x));
            assert!((-17.0..=-10.0).contains(&p.velocity.y));
            assert_eq!(p.velocity.x.fract(), 0.0);
            assert!(p.alive);
        }
    }

    #[test]
    fn integrates_then_applies_drag() {
        let mut burst = Burst {
            particles: vec![Particle {
                pos: Vec2::new(0.0, 0.0),
                velocity: Vec2::new(10.0, -12.0),
                alive: true,
            }],
            color: [0, 0, 0],
        };
        burst.update(0.0, 720.0);
        let p = &burst.particles[0];
        assert_eq!(p.pos, Vec2::new(10.0, -12.0));
        assert_eq!(p.velocity.y, -11.0);
        assert!((p.velocity.x - 9.0).abs() < 1e-6);
    }

    #[test]
    fn burst_finishes_once_everything_falls_out_of_view() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut burst = Burst::spawn(Vec2::new(640.0, 500.0), 20, [255, 255, 0], &mut rng);
        let mut frames = 0;
        while !burst.is_finished() {
            burst.update(0.0, 720.0);
            frames += 1;
            assert!(frames < 200, "burst never finished");
        }
        assert_eq!(burst.live_particles().count(), 0);
    }

    #[test]
    fn same_seed_same_burst() {
        let a = Burst::spawn(Vec2::ZERO, 20, [0, 0, 0], &mut StdRng::seed_from_u64(11));
        let b = Burst::spawn(Vec2::ZERO, 20, [0, 0, 0], &mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
    }
}
