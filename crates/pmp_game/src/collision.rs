//! Collision primitives: the rectangle overlap test every entity pair reduces
//! to, and the `Terrain` view actors query while they move.
//!
//! All gameplay tests run in **world space**. Screen-space rectangles only
//! exist for rendering (`Rect::to_screen`), so a camera move between two
//! checks can never shift one side of a comparison.
//!
//! Resolution is **iterative pixel stepping**: an actor that ends a move
//! overlapping solid geometry is nudged one unit at a time until it is clear.
//! The loop is bounded by `max_resolve_steps`; if the budget runs out the
//! residual overlap is accepted rather than looping forever. Falls are bounded
//! by the terminal velocity, so the usual cost is a handful of steps.

use glam::Vec2;

use crate::entity::{Platform, PlatformKind};
use crate::moving_platform::MovingPlatform;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Square of side `2 * half` centred on `point`.
    pub fn around(point: Vec2, half: f32) -> Self {
        Self::new(point.x - half, point.y - half, half * 2.0, half * 2.0)
    }

    /// Flip negative extents so `x`/`y` is always the top-left corner.
    pub fn normalized(self) -> Self {
        let (x, w) = if self.w < 0.0 {
            (self.x + self.w, -self.w)
        } else {
            (self.x, self.w)
        };
        let (y, h) = if self.h < 0.0 {
            (self.y + self.h, -self.h)
        } else {
            (self.y, self.h)
        };
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// The rectangle extended `amount` units downward. Used as a foot contact box:
    /// an actor resting exactly on a surface does not overlap it, but its contact box does.
    pub fn grow_down(self, amount: f32) -> Self {
        Self {
            h: self.h + amount,
            ..self
        }
    }

    /// The 1-unit strip directly beneath the rectangle.
    pub fn foot_contact(&self) -> Self {
        Self::new(self.x, self.bottom(), self.w, 1.0)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        rects_intersect(self, other)
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    pub fn to_screen(self, scroll: Vec2) -> Self {
        self.translate(-scroll.x, -scroll.y)
    }
}

/// Half-open axis-aligned overlap. Rectangles that only share an edge do not intersect.
pub fn rects_intersect(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.w && a.x + a.w > b.x && a.y < b.y + b.h && a.y + a.h > b.y
}

/// How the querying actor is moving, which decides whether jump-through
/// platforms are solid for it this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Passage {
    pub velocity_y: f32,
    pub dropping: bool,
}

impl Passage {
    pub fn new(velocity_y: f32, dropping: bool) -> Self {
        Self {
            velocity_y,
            dropping,
        }
    }

    /// Jump-through platforms hold actors that are falling or standing and
    /// not asking to drop.
    pub fn lands_on_jump_through(&self) -> bool {
        self.velocity_y >= 0.0 && !self.dropping
    }
}

/// What an actor is standing on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Ground,
    Platform(PlatformKind),
    Moving,
}

impl Surface {
    pub fn landing_impulse(self, bounce_speed: f32) -> Option<f32> {
        match self {
            Surface::Platform(kind) => kind.landing_impulse(bounce_speed),
            Surface::Ground | Surface::Moving => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VerticalResolution {
    /// Offset to add to the actor's y to separate it from terrain.
    pub offset_y: f32,
    pub collided: bool,
    /// The step budget ran out before the actor was clear.
    pub residual: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HorizontalStep {
    pub dx: f32,
    /// Upward adjustment from stepping onto a ledge (zero or negative).
    pub climb: f32,
    pub blocked: bool,
}

/// Borrowed view over everything an actor can stand on or bump into.
#[derive(Debug, Clone, Copy)]
pub struct Terrain<'a> {
    pub platforms: &'a [Platform],
    pub moving: &'a [MovingPlatform],
    pub ground_y: Option<f32>,
}

impl<'a> Terrain<'a> {
    pub fn new(
        platforms: &'a [Platform],
        moving: &'a [MovingPlatform],
        ground_y: Option<f32>,
    ) -> Self {
        Self {
            platforms,
            moving,
            ground_y,
        }
    }

    pub fn blocks(&self, rect: &Rect, passage: Passage) -> bool {
        if let Some(ground_y) = self.ground_y {
            if rect.bottom() > ground_y {
                return true;
            }
        }
        let platform_hit = self
            .platforms
            .iter()
            .any(|platform| platform.kind.is_solid_for(passage) && platform.intersects(rect));
        platform_hit || self.moving.iter().any(|platform| platform.intersects(rect))
    }

    /// The surface directly below `rect`, if any. A bouncy pad wins over
    /// anything else under the same contact box.
    pub fn surface_under(&self, rect: &Rect, passage: Passage) -> Option<Surface> {
        let contact = rect.foot_contact();
        let mut found = None;

        for platform in self.platforms {
            if platform.kind.is_solid_for(passage) && platform.intersects(&contact) {
                if platform.kind == PlatformKind::Bouncy {
                    return Some(Surface::Platform(PlatformKind::Bouncy));
                }
                found.get_or_insert(Surface::Platform(platform.kind));
            }
        }
        if found.is_none() && self.moving.iter().any(|platform| platform.intersects(&contact)) {
            found = Some(Surface::Moving);
        }
        if found.is_none() {
            if let Some(ground_y) = self.ground_y {
                if contact.bottom() > ground_y {
                    found = Some(Surface::Ground);
                }
            }
        }
        found
    }

    /// Push `rect` out of solid terrain one unit at a time, against the
    /// direction of travel: up when falling or resting, down when rising.
    pub fn resolve_vertical(
        &self,
        rect: Rect,
        velocity_y: f32,
        passage: Passage,
        max_steps: u32,
    ) -> VerticalResolution {
        let step = if velocity_y >= 0.0 { -1.0 } else { 1.0 };
        let mut current = rect;
        let mut result = VerticalResolution::default();
        let mut steps = 0;

        while self.blocks(&current, passage) {
            if steps >= max_steps {
                result.residual = true;
                log::trace!(
                    "Vertical resolution gave up after {max_steps} steps at ({}, {})",
                    current.x,
                    current.y
                );
                break;
            }
            current = current.translate(0.0, step);
            result.offset_y += step;
            result.collided = true;
            steps += 1;
        }

        result
    }

    /// Move `rect` horizontally by `dx`. If the destination is blocked, try
    /// stepping up to `max_wall_height` units to clear a ledge; if that fails
    /// the move is rejected.
    pub fn step_horizontal(
        &self,
        rect: Rect,
        dx: f32,
        passage: Passage,
        max_wall_height: u32,
    ) -> HorizontalStep {
        let moved = rect.translate(dx, 0.0);
        if !self.blocks(&moved, passage) {
            return HorizontalStep {
                dx,
                climb: 0.0,
                blocked: false,
            };
        }

        for rise in 1..=max_wall_height {
            let climb = -(rise as f32);
            if !self.blocks(&moved.translate(0.0, climb), passage) {
                return HorizontalStep {
                    dx,
                    climb,
                    blocked: false,
                };
            }
        }

        HorizontalStep {
            dx: 0.0,
            climb: 0.0,
            blocked: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor_and_wall() -> Vec<Platform> {
        vec![
            Platform::new(PlatformKind::Platform, 0.0, 500.0, 400.0, 20.0),
            // 15 tall step: climbable
            Platform::new(PlatformKind::Platform, 200.0, 485.0, 50.0, 15.0),
            // 100 tall wall: not climbable
            Platform::new(PlatformKind::Wall, 350.0, 400.0, 20.0, 100.0),
        ]
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        let c = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!rects_intersect(&a, &b));
        assert!(!rects_intersect(&a, &c));
        assert!(rects_intersect(&a, &b.translate(-0.5, 0.0)));
    }

    #[test]
    fn normalized_flips_negative_extent() {
        let r = Rect::new(10.0, 40.0, 20.0, -30.0).normalized();
        assert_eq!(r, Rect::new(10.0, 10.0, 20.0, 30.0));
    }

    #[test]
    fn screen_space_is_world_minus_scroll() {
        let r = Rect::new(100.0, 50.0, 10.0, 10.0).to_screen(Vec2::new(30.0, -20.0));
        assert_eq!(r, Rect::new(70.0, 70.0, 10.0, 10.0));
    }

    #[test]
    fn falling_actor_is_pushed_out_of_platform() {
        let platforms = floor_and_wall();
        let terrain = Terrain::new(&platforms, &[], None);
        // 7 units into the floor.
        let actor = Rect::new(50.0, 457.0, 40.0, 50.0);
        let passage = Passage::new(7.0, false);

        let res = terrain.resolve_vertical(actor, 7.0, passage, 256);
        assert!(res.collided);
        assert_eq!(res.offset_y, -7.0);
        let resolved = actor.translate(0.0, res.offset_y);
        for platform in &platforms {
            assert!(!platform.intersects(&resolved));
        }
        assert!(terrain.surface_under(&resolved, passage).is_some());
    }

    #[test]
    fn rising_actor_is_pushed_below_ceiling() {
        let platforms = vec![Platform::new(PlatformKind::Platform, 0.0, 100.0, 400.0, 20.0)];
        let terrain = Terrain::new(&platforms, &[], None);
        let actor = Rect::new(50.0, 115.0, 40.0, 50.0);
        let res = terrain.resolve_vertical(actor, -10.0, Passage::new(-10.0, false), 256);
        assert!(res.collided);
        assert_eq!(actor.y + res.offset_y, 120.0);
    }

    #[test]
    fn resolution_budget_accepts_residual_overlap() {
        let platforms = vec![Platform::new(PlatformKind::Platform, 0.0, 0.0, 400.0, 400.0)];
        let terrain = Terrain::new(&platforms, &[], None);
        let actor = Rect::new(50.0, 200.0, 40.0, 50.0);
        let res = terrain.resolve_vertical(actor, 1.0, Passage::new(1.0, false), 16);
        assert!(res.residual);
        assert_eq!(res.offset_y, -16.0);
    }

    #[test]
    fn jump_through_is_solid_only_when_falling_and_not_dropping() {
        let platforms = vec![Platform::new(PlatformKind::JumpThrough, 0.0, 100.0, 400.0, 14.0)];
        let terrain = Terrain::new(&platforms, &[], None);
        let actor = Rect::new(50.0, 60.0, 40.0, 50.0);
        assert!(terrain.blocks(&actor, Passage::new(3.0, false)));
        assert!(terrain.blocks(&actor, Passage::new(0.0, false)));
        assert!(!terrain.blocks(&actor, Passage::new(-3.0, false)));
        assert!(!terrain.blocks(&actor, Passage::new(3.0, true)));
    }

    #[test]
    fn ground_line_blocks_everything_below_it() {
        let terrain = Terrain::new(&[], &[], Some(650.0));
        let standing = Rect::new(0.0, 600.0, 40.0, 50.0);
        assert!(!terrain.blocks(&standing, Passage::new(0.0, false)));
        assert!(terrain.blocks(&standing.translate(0.0, 0.5), Passage::new(0.0, false)));
        assert_eq!(
            terrain.surface_under(&standing, Passage::new(0.0, false)),
            Some(Surface::Ground)
        );
    }

    #[test]
    fn horizontal_step_climbs_low_ledge() {
        let platforms = floor_and_wall();
        let terrain = Terrain::new(&platforms, &[], None);
        let actor = Rect::new(155.0, 450.0, 40.0, 50.0);
        let step = terrain.step_horizontal(actor, 7.0, Passage::new(0.0, false), 20);
        assert!(!step.blocked);
        assert_eq!(step.dx, 7.0);
        assert_eq!(step.climb, -15.0);
    }

    #[test]
    fn horizontal_step_blocked_by_tall_wall() {
        let platforms = floor_and_wall();
        let terrain = Terrain::new(&platforms, &[], None);
        let actor = Rect::new(305.0, 450.0, 40.0, 50.0);
        let step = terrain.step_horizontal(actor, 7.0, Passage::new(0.0, false), 20);
        assert!(step.blocked);
        assert_eq!(step.dx, 0.0);
        assert_eq!(step.climb, 0.0);
    }

    #[test]
    fn bouncy_surface_wins_under_shared_contact() {
        let platforms = vec![
            Platform::new(PlatformKind::Platform, 0.0, 100.0, 60.0, 14.0),
            Platform::new(PlatformKind::Bouncy, 60.0, 100.0, 60.0, 14.0),
        ];
        let terrain = Terrain::new(&platforms, &[], None);
        let actor = Rect::new(40.0, 50.0, 40.0, 50.0);
        assert_eq!(
            terrain.surface_under(&actor, Passage::new(0.0, false)),
            Some(Surface::Platform(PlatformKind::Bouncy))
        );
    }
}
