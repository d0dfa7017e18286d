//! Platforms that shuttle between two points and carry whatever stands on them.

use glam::Vec2;

use crate::collision::Rect;

pub const DEFAULT_END_PAUSE: u32 = 15;
pub const MOVING_PLATFORM_COLOR: [u8; 3] = [255, 200, 0];
pub const PATH_COLOR: [u8; 3] = [179, 179, 179];

#[derive(Debug, Clone, PartialEq)]
pub struct MovingPlatform {
    pub pos1: Vec2,
    pub pos2: Vec2,
    /// Current top-left corner.
    pub pos: Vec2,
    pub length: f32,
    pub width: f32,
    pub speed: f32,
    /// +1 heading to `pos2`, -1 heading back to `pos1`.
    pub direction: f32,
    /// Frames left to rest at an endpoint.
    pub pause: u32,
    pub end_pause: u32,
}

impl MovingPlatform {
    pub fn new(pos1: Vec2, pos2: Vec2, length: f32, width: f32, speed: f32) -> Self {
        Self {
            pos1,
            pos2,
            pos: pos1,
            length,
            width,
            speed,
            direction: 1.0,
            pause: 0,
            end_pause: DEFAULT_END_PAUSE,
        }
    }

    pub fn with_end_pause(mut self, end_pause: u32) -> Self {
        self.end_pause = end_pause;
        self
    }

    pub fn hit_box(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.length, self.width)
    }

    pub fn intersects(&self, rect: &Rect) -> bool {
        self.hit_box().intersects(rect)
    }

    /// Unit vector from `pos1` to `pos2`. Endpoints sharing an x coordinate
    /// travel straight along y; identical endpoints fall back to +y.
    fn path_unit(&self) -> Vec2 {
        let delta = self.pos2 - self.pos1;
        if delta.x == 0.0 {
            return if delta.y < 0.0 { Vec2::NEG_Y } else { Vec2::Y };
        }
        delta.normalize()
    }

    fn target(&self) -> Vec2 {
        if self.direction > 0.0 {
            self.pos2
        } else {
            self.pos1
        }
    }

    /// Advance one frame. Returns the distance actually travelled.
    ///
    /// A step that would reach or pass the endpoint being approached snaps
    /// exactly onto it, reverses direction and starts the end pause. A
    /// non-positive speed leaves the platform where it is.
    pub fn advance(&mut self) -> Vec2 {
        if self.pause > 0 {
            self.pause -= 1;
            return Vec2::ZERO;
        }

        if self.speed <= 0.0 {
            return Vec2::ZERO;
        }

        let previous = self.pos;
        let target = self.target();
        let remaining = target.distance(previous);

        if self.speed >= remaining {
            self.pos = target;
            self.direction = -self.direction;
            self.pause = self.end_pause;
        } else {
            self.pos += self.path_unit() * self.speed * self.direction;
        }

        self.pos - previous
    }

    /// Advance and return the displacement to apply to a passenger whose
    /// contact box is `contact`. Contact is judged before the platform moves.
    pub fn advance_carrying(&mut self, contact: &Rect) -> Vec2 {
        let carrying = self.intersects(contact);
        let delta = self.advance();
        if carrying {
            delta
        } else {
            Vec2::ZERO
        }
    }

    /// Move the end point and put the platform back at the start of its path.
    pub fn set_end(&mut self, pos2: Vec2) {
        self.pos2 = pos2;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.pos = self.pos1;
        self.direction = 1.0;
        self.pause = 0;
    }
}
