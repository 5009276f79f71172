//! # Gridhunt Levels System
//!
//! This crate loads the game map and answers spatial queries against it.
//!
//! ## Features
//! - Text layout parser (fixed-width rows of terrain characters)
//! - Obstacle, spawn point and item markers
//! - Random item generation for layouts that place none
//! - Lazily chosen random spawn point
//! - Redacted row rendering for map requests
//!
//! ## Layout Format
//!
//! ```text
//! #####
//! #S.4#
//! #..*#
//! #####
//! ```
//!
//! - `#` obstacle
//! - `S` spawn point (at most one)
//! - `0`-`9` item worth ten times the digit
//! - `*` item with a random value
//! - anything else is open floor

pub mod error;
pub mod item;
pub mod map;

pub use error::{LevelError, Result};
pub use item::Item;
pub use map::{GameMap, OBSTACLE, REVEAL_RADIUS};
