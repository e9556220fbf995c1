//! Tile animation driven by a shared, wrapping tick counter.
//!
//! Animation state belongs to the tile *definition*: every placement of the same
//! source tile shows the same frame. State advances lazily, only when a tile is
//! queried, and by at most one frame per query.

use std::collections::HashMap;

use log::trace;

use crate::gid::TileSetId;
use crate::model::{Frame, Tile};

/// Map-wide tick counter in `[0, ticks_per_second * wrap_seconds)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationClock {
    tick: u32,
    ticks_per_second: u32,
    modulus: u32,
}

impl AnimationClock {
    /// Clock starting at tick 0. Zero arguments are clamped to 1.
    pub fn new(ticks_per_second: u32, wrap_seconds: u32) -> Self {
        let ticks_per_second = ticks_per_second.max(1);
        Self {
            tick: 0,
            ticks_per_second,
            modulus: ticks_per_second.saturating_mul(wrap_seconds.max(1)),
        }
    }

    /// Current tick.
    #[inline]
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Host simulation rate.
    #[inline]
    pub fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second
    }

    /// Tick count after which the counter wraps to 0.
    #[inline]
    pub fn modulus(&self) -> u32 {
        self.modulus
    }

    /// One simulation step.
    pub fn advance(&mut self) {
        self.tick = (self.tick + 1) % self.modulus;
    }

    /// Jump to `tick`, reduced modulo the wrap.
    pub fn set_tick(&mut self, tick: u32) {
        self.tick = tick % self.modulus;
    }

    /// Ticks from `since` to `now`, accounting for at most one wrap.
    pub fn elapsed_ticks(&self, since: u32, now: u32) -> u32 {
        if now < since {
            now + (self.modulus - since)
        } else {
            now - since
        }
    }
}

/// Per-tile animation progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    /// Never queried.
    #[default]
    Unstarted,
    /// Showing `frame` since `last_tick`.
    Running { frame: usize, last_tick: u32 },
}

impl AnimationState {
    /// Current frame index, `None` before the first query.
    pub fn frame_index(&self) -> Option<usize> {
        match self {
            AnimationState::Unstarted => None,
            AnimationState::Running { frame, .. } => Some(*frame),
        }
    }

    /// Advance against the clock and return the tile id of the frame to display.
    ///
    /// Moves to the next frame only when the time since the last change strictly
    /// exceeds the current frame's duration, and never by more than one frame.
    /// Returns `None` for an empty frame list.
    pub fn step(&mut self, frames: &[Frame], clock: &AnimationClock) -> Option<u32> {
        if frames.is_empty() {
            return None;
        }
        let now = clock.tick();
        let frame = match *self {
            AnimationState::Unstarted => {
                *self = AnimationState::Running { frame: 0, last_tick: now };
                0
            }
            AnimationState::Running { frame, last_tick } => {
                let frame = frame % frames.len();
                let elapsed = clock.elapsed_ticks(last_tick, now) as f64
                    / clock.ticks_per_second() as f64;
                if elapsed > frames[frame].duration_ms as f64 / 1000.0 {
                    let next = (frame + 1) % frames.len();
                    trace!("animation frame {frame} -> {next} at tick {now}");
                    *self = AnimationState::Running { frame: next, last_tick: now };
                    next
                } else {
                    frame
                }
            }
        };
        Some(frames[frame].tile_id)
    }
}

/// Animation state per `(tileset, local tile id)`.
///
/// Mutation requires `&mut`, so concurrent queries need external synchronisation.
#[derive(Debug, Clone, Default)]
pub struct AnimationRegistry {
    states: HashMap<(TileSetId, u32), AnimationState>,
}

impl AnimationRegistry {
    /// Empty registry; every tile starts `Unstarted`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Local tile id to display for `tile`; the tile's own id when it is not animated.
    pub fn display_id(&mut self, tileset: TileSetId, tile: &Tile, clock: &AnimationClock) -> u32 {
        if !tile.is_animated() {
            return tile.id;
        }
        self.states
            .entry((tileset, tile.id))
            .or_default()
            .step(&tile.animation, clock)
            .unwrap_or(tile.id)
    }

    /// State of one tile definition.
    pub fn state(&self, tileset: TileSetId, tile_id: u32) -> AnimationState {
        self.states
            .get(&(tileset, tile_id))
            .copied()
            .unwrap_or_default()
    }

    /// Forget all progress.
    pub fn reset(&mut self) {
        self.states.clear();
    }
}
