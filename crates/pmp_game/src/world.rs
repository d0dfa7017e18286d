//! Live level state and the per-frame update order.
//!
//! One `step` runs, in order: camera follow, moving platforms (summing the
//! player's carry), carry applied, player physics or death burst, ghosts,
//! collectable bobbing, timer tick and win check. Renderers read the public
//! collections between steps; the editor mutates them through
//! `add`/`remove`.

use glam::Vec2;
use pmp_core::input::FrameInput;
use pmp_core::time::LevelTimer;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::collision::{Rect, Terrain};
use crate::config::GameConfig;
use crate::controller::{Hazards, Player, PlayerState, PLAYER_COLOR};
use crate::entity::{Collectable, Entity, EntityKind, EntityRef, Platform, Spike};
use crate::ghost::{Ghost, GhostState};
use crate::level::LevelData;
use crate::moving_platform::MovingPlatform;
use crate::particles::Burst;

pub const DEFAULT_START: Vec2 = Vec2::new(640.0, 360.0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub player_died: bool,
    pub player_respawned: bool,
    pub ghosts_killed: u32,
    pub collected: u32,
    /// Every collectable is eaten.
    pub won: bool,
}

pub struct WorldState {
    pub config: GameConfig,
    pub scroll: Vec2,
    /// Camera tracks the player each step. Off while editing.
    pub camera_follow: bool,
    pub player: Player,
    pub start: Vec2,
    pub score: u32,
    pub platforms: Vec<Platform>,
    pub spikes: Vec<Spike>,
    pub moving_platforms: Vec<MovingPlatform>,
    pub collectables: Vec<Collectable>,
    pub ghosts: Vec<Ghost>,
    timer: LevelTimer,
    rng: StdRng,
}

impl WorldState {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            scroll: Vec2::ZERO,
            camera_follow: true,
            player: Player::new(DEFAULT_START),
            start: DEFAULT_START,
            score: 0,
            platforms: Vec::new(),
            spikes: Vec::new(),
            moving_platforms: Vec::new(),
            collectables: Vec::new(),
            ghosts: Vec::new(),
            timer: LevelTimer::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_level(level: LevelData, config: GameConfig, seed: u64) -> Self {
        let mut world = Self::new(config, seed);
        world.load_level(level);
        world
    }

    /// Replace everything in the world with `level` and restart the run.
    pub fn load_level(&mut self, level: LevelData) {
        self.clear();
        self.platforms = level.platforms;
        self.spikes = level.spikes;
        self.moving_platforms = level
            .moving_platforms
            .into_iter()
            .map(|platform| platform.with_end_pause(self.config.physics.end_pause_frames))
            .collect();
        self.collectables = level.collectables;
        self.ghosts = level.ghosts;
        self.set_start(level.start);
        self.center_camera();
        log::debug!(
            "World loaded: {} platforms, {} spikes, {} moving, {} collectables, {} ghosts",
            self.platforms.len(),
            self.spikes.len(),
            self.moving_platforms.len(),
            self.collectables.len(),
            self.ghosts.len()
        );
    }

    /// Snapshot the level design. Ghosts are saved at their spawn points and
    /// collectables at their resting height.
    pub fn to_level_data(&self) -> LevelData {
        LevelData {
            start: self.start,
            personal_best: None,
            platforms: self.platforms.clone(),
            spikes: self.spikes.clone(),
            moving_platforms: self
                .moving_platforms
                .iter()
                .map(|p| MovingPlatform::new(p.pos1, p.pos2, p.length, p.width, p.speed))
                .collect(),
            collectables: self
                .collectables
                .iter()
                .map(|c| Collectable::new(c.pos.x, c.anchor_y))
                .collect(),
            ghosts: self
                .ghosts
                .iter()
                .map(|g| Ghost::new(g.spawn, g.color))
                .collect(),
        }
    }

    pub fn clear(&mut self) {
        self.platforms.clear();
        self.spikes.clear();
        self.moving_platforms.clear();
        self.collectables.clear();
        self.ghosts.clear();
        self.score = 0;
        self.timer.restart();
    }

    /// Move the spawn point and put the player on it.
    pub fn set_start(&mut self, start: Vec2) {
        self.start = start;
        self.player.respawn(start);
    }

    pub fn center_camera(&mut self) {
        let view = self.view_size();
        self.scroll = self.player.center(&self.config.physics) - view * 0.5;
    }

    pub fn view_size(&self) -> Vec2 {
        Vec2::new(self.config.view.width, self.config.view.height)
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.timer.elapsed_seconds()
    }

    pub fn timer(&self) -> &LevelTimer {
        &self.timer
    }

    pub fn all_collected(&self) -> bool {
        self.collectables.iter().all(|c| c.eaten)
    }

    pub fn screen_rect(&self, world: Rect) -> Rect {
        world.to_screen(self.scroll)
    }

    pub fn step(&mut self, input: &FrameInput) -> FrameReport {
        let mut report = FrameReport::default();

        if self.camera_follow {
            self.follow_camera();
        }

        let contact = self.player.contact_box(&self.config.physics);
        let carry: Vec2 = self
            .moving_platforms
            .iter_mut()
            .map(|platform| platform.advance_carrying(&contact))
            .sum();
        if self.player.is_alive() {
            self.player.pos += carry;
        }

        self.step_player(input, &mut report);
        self.step_ghosts(&mut report);

        let view = self.view_size();
        for collectable in &mut self.collectables {
            if !collectable.eaten && collectable.is_visible(self.scroll, view) {
                collectable.bob();
            }
        }

        self.timer.tick();
        report.won = self.all_collected();
        report
    }

    fn follow_camera(&mut self) {
        let target = self.player.center(&self.config.physics) - self.view_size() * 0.5;
        self.scroll += (target - self.scroll) / self.config.view.camera_lag;
    }

    fn step_player(&mut self, input: &FrameInput, report: &mut FrameReport) {
        let view_height = self.config.view.height;
        let finished = match &mut self.player.state {
            PlayerState::Dead(burst) => {
                burst.update(self.scroll.y, view_height);
                Some(burst.is_finished())
            }
            PlayerState::Alive => None,
        };
        match finished {
            Some(true) => {
                self.respawn();
                report.player_respawned = true;
                return;
            }
            Some(false) => return,
            None => {}
        }

        if input.restart {
            self.kill_player();
            report.player_died = true;
            return;
        }

        let physics = &self.config.physics;
        let terrain = Terrain::new(&self.platforms, &self.moving_platforms, physics.ground_y);
        let hazards = Hazards {
            spikes: &self.spikes,
            ghosts: &self.ghosts,
        };
        let outcome =
            self.player
                .step(*input, &terrain, &hazards, &mut self.collectables, physics);

        self.score += outcome.collected;
        report.collected = outcome.collected;
        if outcome.died {
            self.kill_player();
            report.player_died = true;
        }
    }

    fn step_ghosts(&mut self, report: &mut FrameReport) {
        let physics = &self.config.physics;
        let terrain = Terrain::new(&self.platforms, &self.moving_platforms, physics.ground_y);
        for ghost in &mut self.ghosts {
            if let GhostState::Dead(burst) = &mut ghost.state {
                burst.update(self.scroll.y, self.config.view.height);
                continue;
            }
            if ghost.step(&terrain, &self.spikes, physics) {
                let burst = Burst::spawn(
                    ghost.center(physics.actor_size),
                    physics.particle_count,
                    ghost.color.rgb(),
                    &mut self.rng,
                );
                ghost.die(burst);
                report.ghosts_killed += 1;
                log::debug!("Ghost died at ({}, {})", ghost.pos.x, ghost.pos.y);
            }
        }
        self.ghosts.retain(|ghost| !ghost.is_gone());
    }

    fn kill_player(&mut self) {
        let physics = &self.config.physics;
        let burst = Burst::spawn(
            self.player.center(physics),
            physics.particle_count,
            PLAYER_COLOR,
            &mut self.rng,
        );
        log::debug!(
            "Player died at ({}, {})",
            self.player.pos.x,
            self.player.pos.y
        );
        self.player.die(burst);
    }

    fn respawn(&mut self) {
        self.player.respawn(self.start);
        self.score = 0;
        for collectable in &mut self.collectables {
            collectable.reset();
        }
        self.timer.restart();
        log::debug!("Player respawned at ({}, {})", self.start.x, self.start.y);
    }

    pub fn add(&mut self, entity: Entity) -> EntityRef {
        let kind = entity.kind();
        let index = match entity {
            Entity::Platform(platform) => push(&mut self.platforms, platform),
            Entity::Spike(spike) => push(&mut self.spikes, spike),
            Entity::Ghost(ghost) => push(&mut self.ghosts, ghost),
            Entity::Collectable(collectable) => push(&mut self.collectables, collectable),
            Entity::MovingPlatform(platform) => push(
                &mut self.moving_platforms,
                platform.with_end_pause(self.config.physics.end_pause_frames),
            ),
        };
        EntityRef { kind, index }
    }

    pub fn remove(&mut self, entity: EntityRef) -> Option<Entity> {
        let index = entity.index;
        match entity.kind {
            EntityKind::Platform => take(&mut self.platforms, index).map(Entity::Platform),
            EntityKind::Spike => take(&mut self.spikes, index).map(Entity::Spike),
            EntityKind::Ghost => take(&mut self.ghosts, index).map(Entity::Ghost),
            EntityKind::Collectable => {
                take(&mut self.collectables, index).map(Entity::Collectable)
            }
            EntityKind::MovingPlatform => {
                take(&mut self.moving_platforms, index).map(Entity::MovingPlatform)
            }
        }
    }

    /// Remove several entities at once. Later indices go first so earlier
    /// references stay valid.
    pub fn remove_all(&mut self, mut entities: Vec<EntityRef>) -> Vec<Entity> {
        entities.sort();
        entities.dedup();
        entities
            .into_iter()
            .rev()
            .filter_map(|entity| self.remove(entity))
            .collect()
    }

    pub fn get(&self, entity: EntityRef) -> Option<Entity> {
        let index = entity.index;
        match entity.kind {
            EntityKind::Platform => self.platforms.get(index).cloned().map(Entity::Platform),
            EntityKind::Spike => self.spikes.get(index).cloned().map(Entity::Spike),
            EntityKind::Ghost => self.ghosts.get(index).cloned().map(Entity::Ghost),
            EntityKind::Collectable => {
                self.collectables.get(index).cloned().map(Entity::Collectable)
            }
            EntityKind::MovingPlatform => self
                .moving_platforms
                .get(index)
                .cloned()
                .map(Entity::MovingPlatform),
        }
    }

    /// Every entity whose hit-box overlaps `rect`, grouped by kind in
    /// `EntityKind` order.
    pub fn entities_at(&self, rect: &Rect) -> Vec<EntityRef> {
        let size = self.config.physics.actor_size;
        let mut hits = Vec::new();
        let mut gather = |kind: EntityKind, boxes: Vec<Rect>| {
            hits.extend(
                boxes
                    .iter()
                    .enumerate()
                    .filter(|(_, hit_box)| hit_box.intersects(rect))
                    .map(|(index, _)| EntityRef { kind, index }),
            );
        };
        gather(
            EntityKind::Platform,
            self.platforms.iter().map(Platform::hit_box).collect(),
        );
        gather(
            EntityKind::Spike,
            self.spikes.iter().map(Spike::hit_box).collect(),
        );
        gather(
            EntityKind::Ghost,
            self.ghosts.iter().map(|g| g.hit_box(size)).collect(),
        );
        gather(
            EntityKind::Collectable,
            self.collectables.iter().map(Collectable::hit_box).collect(),
        );
        gather(
            EntityKind::MovingPlatform,
            self.moving_platforms
                .iter()
                .map(MovingPlatform::hit_box)
                .collect(),
        );
        hits
    }
}

fn push<T>(items: &mut Vec<T>, item: T) -> usize {
    items.push(item);
    items.len() - 1
}

fn take<T>(items: &mut Vec<T>, index: usize) -> Option<T> {
    (index < items.len()).then(|| items.remove(index))
}
