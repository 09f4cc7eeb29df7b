// Puzzle grid: one builder bound to a background frame. Pan, zoom with
// re-tiling, click-to-paint, and the distinct-color set behind the palette.

use std::collections::HashMap;

use log::info;

use crate::color::Quantized;
use crate::entity::Frame;
use crate::error::GridError;
use crate::gfx::canvas::Canvas;
use crate::gfx::math::{Rgba, Vec2};
use crate::grid::builder::GridBuilder;

/// Per-tile size band enforced by zoom; degenerate requests clamp here
/// silently instead of erroring.
pub const TILE_MIN: i64 = 5;
pub const TILE_MAX: i64 = 50;

pub struct Level {
    pub frame: Frame,
    pub builder: GridBuilder,
    colors: Vec<Quantized>,
}

impl Level {
    /// Builds the grid from the frame's image and snaps the frame to exactly
    /// cover the lattice.
    pub fn new(
        mut frame: Frame,
        particles: usize,
        depth: u8,
        mut builder: GridBuilder,
    ) -> Result<Self, GridError> {
        let set = builder.build(&frame.sprite.image, particles, depth)?;
        frame.sprite.resize(
            builder.tile_size() * builder.columns() as u32,
            builder.tile_size() * builder.rows() as u32,
        );

        // Identity order keeps the palette numbering deterministic.
        let mut colors: Vec<_> = set.into_iter().collect();
        colors.sort();
        Ok(Self {
            frame,
            builder,
            colors,
        })
    }

    /// Distinct quantized colors of the grid, sentinel first.
    pub fn colors(&self) -> &[Quantized] {
        &self.colors
    }

    /// Right-drag translation; only starts inside the frame.
    pub fn pan(&mut self, from: Vec2, to: Vec2) {
        if self.frame.sprite.contains(from) {
            self.frame.sprite.x += to.x - from.x;
            self.frame.sprite.y += to.y - from.y;
        }
    }

    /// Scales the frame by `k`, floors both dimensions to multiples of the
    /// current counts so tiles stay exactly uniform, clamps the per-tile size
    /// to the [TILE_MIN, TILE_MAX] band, re-tiles in place and re-centers.
    pub fn zoom(&mut self, k: f32, surface_w: f32, surface_h: f32) -> Result<(), GridError> {
        let columns = self.builder.columns() as i64;
        let rows = self.builder.rows() as i64;
        if columns == 0 || rows == 0 {
            return Ok(());
        }
        let (fw, fh) = (
            self.frame.sprite.image.width() as i64,
            self.frame.sprite.image.height() as i64,
        );

        let mut width = ((fw as f32 * k) as i64).div_euclid(columns) * columns;
        let mut height = ((fh as f32 * k) as i64).div_euclid(rows) * rows;

        let first = self.builder.first()?;
        let mut tile_w = first.size.x as i64 + (width - fw).div_euclid(columns);
        let mut tile_h = first.size.y as i64 + (height - fh).div_euclid(rows);

        if tile_w > TILE_MAX {
            (tile_w, tile_h) = (TILE_MAX, TILE_MAX);
            (width, height) = (columns * TILE_MAX, rows * TILE_MAX);
        } else if tile_w < TILE_MIN {
            (tile_w, tile_h) = (TILE_MIN, TILE_MIN);
            (width, height) = (columns * TILE_MIN, rows * TILE_MIN);
        }

        self.frame.sprite.resize(width as u32, height as u32);
        self.builder
            .rebuild(Vec2::new(tile_w as f32, tile_h as f32));
        self.frame.sprite.center_on(surface_w, surface_h);
        info!("zoom x{k}: frame {width}x{height}, tile {tile_w}x{tile_h}");
        Ok(())
    }

    /// Paints the first tile containing `p` with `color`; the sentinel's
    /// transparent display color erases. Returns whether a tile was hit.
    pub fn paint(&mut self, p: Vec2, color: Rgba) -> bool {
        let (x, y) = (self.frame.sprite.x, self.frame.sprite.y);
        for tile in self.builder.tiles_mut() {
            tile.x = x;
            tile.y = y;
            if tile.contains(p) {
                tile.fill = color;
                return true;
            }
        }
        false
    }

    /// Numbers every tile after its target color, from the palette's
    /// identity-to-label map. Zoom clears labels, so callers relabel after.
    pub fn label_tiles(&mut self, numbers: &HashMap<u64, String>) {
        for tile in self.builder.tiles_mut() {
            tile.label = numbers
                .get(&tile.data.identity())
                .cloned()
                .unwrap_or_default();
        }
    }

    pub fn draw(&mut self, canvas: &mut Canvas, dt: f32) {
        self.frame.draw(canvas, dt);
        let (x, y) = (self.frame.sprite.x, self.frame.sprite.y);
        for tile in self.builder.tiles_mut() {
            tile.x = x;
            tile.y = y;
            tile.draw(canvas);
        }
    }
}
