//! Game map
//!
//! Loads the fixed-size terrain grid and tracks the items placed on it.

use crate::item::Item;
use crate::{LevelError, Result};
use gridhunt_core::{ItemId, Position};
use parking_lot::{Mutex, RwLock};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::path::Path;

/// Terrain character that blocks movement
pub const OBSTACLE: char = '#';

/// Layout marker for the spawn point
const SPAWN: char = 'S';

/// Layout marker for an item with a random value
const RANDOM_ITEM: char = '*';

/// Chebyshev radius of the cells revealed to a player after moving
pub const REVEAL_RADIUS: i32 = 1;

/// Upper bound on generated items as a fraction of all cells
const ITEM_DENSITY: f64 = 0.05;

/// Item values are drawn from `0..MAX_ITEM_VALUE`
const MAX_ITEM_VALUE: u32 = 100;

/// The shared game map
///
/// # Thread Safety
/// Terrain is immutable after load. The item list is behind a `RwLock` so
/// collection can remove items while other connections read them, and the
/// lazily chosen spawn point is cached behind a `Mutex`.
#[derive(Debug)]
pub struct GameMap {
    rows: usize,
    cols: usize,
    terrain: Vec<Vec<char>>,
    spawn: Mutex<Option<Position>>,
    items: RwLock<Vec<Item>>,
}

impl GameMap {
    /// Load a map layout from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let map = Self::parse(&content)?;
        tracing::info!(
            "Loaded map {:?}: {}x{} with {} items",
            path,
            map.rows,
            map.cols,
            map.item_count()
        );
        Ok(map)
    }

    /// Parse a layout using the thread-local random source
    pub fn parse(layout: &str) -> Result<Self> {
        Self::parse_with_rng(layout, &mut rand::thread_rng())
    }

    /// Parse a layout, drawing random item values and placements from `rng`
    pub fn parse_with_rng<R: Rng>(layout: &str, rng: &mut R) -> Result<Self> {
        let mut lines: Vec<&str> = layout.lines().collect();
        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }

        let cols = match lines.first() {
            Some(first) => first.chars().count(),
            None => return Err(LevelError::InvalidFormat("map has no rows".into())),
        };
        if cols == 0 {
            return Err(LevelError::InvalidFormat("map has no columns".into()));
        }

        let mut terrain = Vec::with_capacity(lines.len());
        let mut spawn = None;
        let mut items = Vec::new();
        let mut next_id = 1u32;

        for (y, line) in lines.iter().enumerate() {
            let row: Vec<char> = line.chars().collect();
            if row.len() != cols {
                return Err(LevelError::ParseError {
                    line: y + 1,
                    message: format!("expected {} columns, found {}", cols, row.len()),
                });
            }

            for (x, &cell) in row.iter().enumerate() {
                let position = Position::new(x as i32, y as i32);
                let value = match cell {
                    SPAWN => {
                        if spawn.replace(position).is_some() {
                            return Err(LevelError::ParseError {
                                line: y + 1,
                                message: "more than one spawn point".into(),
                            });
                        }
                        continue;
                    }
                    RANDOM_ITEM => rng.gen_range(0..MAX_ITEM_VALUE),
                    digit => match digit.to_digit(10) {
                        Some(d) => d * 10,
                        None => continue,
                    },
                };

                items.push(Item::new(ItemId::new(next_id), position, value));
                next_id += 1;
            }

            terrain.push(row);
        }

        let mut map = Self {
            rows: terrain.len(),
            cols,
            terrain,
            spawn: Mutex::new(spawn),
            items: RwLock::new(items),
        };

        if map.items.get_mut().is_empty() {
            let generated = map.generate_items(rng);
            tracing::debug!("Layout defines no items, generated {}", generated.len());
            *map.items.get_mut() = generated;
        }

        Ok(map)
    }

    /// Place `uniform(0, floor(rows * cols * density))` items on distinct free cells
    fn generate_items<R: Rng>(&self, rng: &mut R) -> Vec<Item> {
        let max_items = ((self.rows * self.cols) as f64 * ITEM_DENSITY).floor() as usize;
        let count = rng.gen_range(0..=max_items);

        let spawn = *self.spawn.lock();
        let free: Vec<Position> = self
            .positions()
            .filter(|&pos| self.is_valid_position(pos) && Some(pos) != spawn)
            .collect();

        let chosen: Vec<Position> = free.choose_multiple(rng, count).copied().collect();

        chosen
            .into_iter()
            .zip(1u32..)
            .map(|(position, id)| Item::new(ItemId::new(id), position, rng.gen_range(0..MAX_ITEM_VALUE)))
            .collect()
    }

    fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |y| (0..self.cols).map(move |x| Position::new(x as i32, y as i32)))
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Terrain character at `pos`, or `None` when out of bounds
    pub fn terrain_at(&self, pos: Position) -> Option<char> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        self.terrain
            .get(pos.y as usize)
            .and_then(|row| row.get(pos.x as usize))
            .copied()
    }

    /// Whether a player may stand on `pos`
    ///
    /// False for out-of-bounds cells and obstacles.
    pub fn is_valid_position(&self, pos: Position) -> bool {
        matches!(self.terrain_at(pos), Some(cell) if cell != OBSTACLE)
    }

    /// The item lying on `pos`, if any
    pub fn item_at(&self, pos: Position) -> Option<Item> {
        self.items.read().iter().find(|item| item.position == pos).copied()
    }

    /// Remove and return the item lying on `pos`
    ///
    /// Concurrent callers racing for the same cell see the item at most once.
    pub fn take_item_at(&self, pos: Position) -> Option<Item> {
        let mut items = self.items.write();
        let index = items.iter().position(|item| item.position == pos)?;
        Some(items.remove(index))
    }

    /// Items within `radius` of `center`, excluding `center` itself, in row-major order
    pub fn items_near(&self, center: Position, radius: i32) -> Vec<Item> {
        let items = self.items.read();
        center
            .surrounding(radius)
            .filter_map(|pos| items.iter().find(|item| item.position == pos).copied())
            .collect()
    }

    /// Snapshot of every item still on the map
    pub fn items(&self) -> Vec<Item> {
        self.items.read().clone()
    }

    pub fn item_count(&self) -> usize {
        self.items.read().len()
    }

    /// Spawn point for newly logged-in players
    ///
    /// Returns the layout's `S` cell if there is one. Otherwise a random free
    /// cell is chosen on first call and reused afterwards.
    pub fn spawn_point(&self) -> Result<Position> {
        self.spawn_point_with_rng(&mut rand::thread_rng())
    }

    pub fn spawn_point_with_rng<R: Rng>(&self, rng: &mut R) -> Result<Position> {
        let mut spawn = self.spawn.lock();
        if let Some(pos) = *spawn {
            return Ok(pos);
        }

        let free: Vec<Position> = {
            let items = self.items.read();
            self.positions()
                .filter(|&pos| self.is_valid_position(pos))
                .filter(|&pos| !items.iter().any(|item| item.position == pos))
                .collect()
        };

        let chosen = *free.choose(rng).ok_or(LevelError::NoFreeCell)?;
        tracing::debug!("Picked random spawn point ({})", chosen);
        *spawn = Some(chosen);
        Ok(chosen)
    }

    /// Row `index` rendered with only obstacles visible
    ///
    /// Spawn and item markers are blanked out; every cell is `#` or a space.
    pub fn row_view(&self, index: usize) -> Option<String> {
        self.terrain.get(index).map(|row| {
            row.iter()
                .map(|&cell| if cell == OBSTACLE { OBSTACLE } else { ' ' })
                .collect()
        })
    }
}
