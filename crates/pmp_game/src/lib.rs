//! Pacman platformer core: level entities, actor physics, the frame-stepped
//! world, level persistence and the level editor. Rendering and windowing
//! live outside this crate; they read `WorldState` and feed it `FrameInput`s.

pub mod collision;
pub mod config;
pub mod controller;
pub mod editor;
pub mod entity;
pub mod ghost;
pub mod level;
pub mod moving_platform;
pub mod particles;
pub mod replay;
pub mod session;
pub mod store;
pub mod world;
