// Uniform-grid decomposition of a source region: tile layout with remainder
// distribution, average-color sampling per tile, and in-place re-tiling.

use std::collections::HashSet;

use log::debug;

use crate::color::Quantized;
use crate::error::GridError;
use crate::gfx::anim::{Curve, Progress};
use crate::gfx::canvas::Canvas;
use crate::gfx::math::{Rect, Rgba, Vec2, TRANSPARENT};

/// One grid cell. Created in bulk by the builder; repositioned and resized in
/// place afterwards, never destroyed individually.
#[derive(Debug, Clone)]
pub struct Tile {
    /// Lattice coordinates with the spacing multiplier folded in.
    pub col: f32,
    pub row: f32,
    pub size: Vec2,
    pub x: f32,
    pub y: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    /// Target color sampled from the source at build time.
    pub data: Quantized,
    /// Current paint; transparent means untouched.
    pub fill: Rgba,
    pub label: String,
    pub progress: Progress,
}

impl Tile {
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.x + self.margin_x,
            self.y + self.margin_y,
            self.size.x,
            self.size.y,
        )
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.rect().contains(p)
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        if self.fill[3] != 0 {
            canvas.fill_rect(self.rect(), self.fill);
        }
    }
}

/// Partitions a rectangular source into uniform tiles sized to hit a target
/// count. `columns` counts along the width, `rows` along the height; the
/// `remain_*` flags are cross-wired to the opposite dimension on purpose
/// (rounding up trades overshoot for full coverage).
#[derive(Debug, Clone)]
pub struct GridBuilder {
    tiles: Vec<Tile>,
    columns: usize,
    rows: usize,
    tile_size: u32,
    pub remain_width: bool,
    pub remain_height: bool,
    pub limit: bool,
    pub pad: f32,
}

impl Default for GridBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GridBuilder {
    pub fn new() -> Self {
        Self {
            tiles: Vec::new(),
            columns: 0,
            rows: 0,
            tile_size: 0,
            remain_width: false,
            remain_height: false,
            limit: false,
            pad: 1.0,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    pub fn built(&self) -> bool {
        !self.tiles.is_empty()
    }

    pub fn first(&self) -> Result<&Tile, GridError> {
        self.tiles.first().ok_or(GridError::NotBuilt)
    }

    /// Lays out the grid over `source`, sampling and quantizing each tile's
    /// average color. Returns the set of distinct quantized colors, always
    /// including the transparent sentinel. Building twice is an error.
    pub fn build(
        &mut self,
        source: &Canvas,
        particles: usize,
        depth: u8,
    ) -> Result<HashSet<Quantized>, GridError> {
        if self.built() {
            return Err(GridError::AlreadyBuilt);
        }
        let (w, h) = (source.width(), source.height());
        if w == 0 || h == 0 || particles == 0 {
            return Err(GridError::EmptySource);
        }
        self.tile_size = ((w as u64 * h as u64) as f64 / particles as f64).sqrt() as u32;
        if self.tile_size == 0 {
            return Err(GridError::EmptySource);
        }

        self.columns = if self.remain_height {
            w.div_ceil(self.tile_size) as usize
        } else {
            (w / self.tile_size) as usize
        };
        self.rows = if self.remain_width {
            h.div_ceil(self.tile_size) as usize
        } else {
            (h / self.tile_size) as usize
        };

        let mut colors = HashSet::new();
        for row in 0..self.rows {
            for col in 0..self.columns {
                colors.insert(self.push_tile(
                    source,
                    col as f32 * self.pad,
                    row as f32 * self.pad,
                    depth,
                ));
            }
        }

        // Fill out the requested count; the column count grows exactly once,
        // on the first appended tile.
        let area = self.rows * self.columns;
        for i in 0..particles.saturating_sub(area) {
            colors.insert(self.push_tile(source, self.pad, i as f32 * self.pad, depth));
            if i == 0 {
                self.columns += 1;
            }
        }

        colors.insert(Quantized::sentinel(depth));
        if self.limit {
            self.tiles.truncate(particles);
        }
        debug!(
            "grid built: {} columns x {} rows, tile size {}, {} tiles, {} colors",
            self.columns,
            self.rows,
            self.tile_size,
            self.tiles.len(),
            colors.len()
        );
        Ok(colors)
    }

    fn push_tile(&mut self, source: &Canvas, col: f32, row: f32, depth: u8) -> Quantized {
        let size = self.tile_size as f32;
        let offset = Vec2::new(col * size, row * size);
        let sample = source.average_color(Rect::new(offset.x, offset.y, size, size));
        let data = Quantized::new([sample[0], sample[1], sample[2], 255], depth);

        self.tiles.push(Tile {
            col,
            row,
            size: Vec2::new(size, size),
            x: 0.0,
            y: 0.0,
            margin_x: offset.x,
            margin_y: offset.y,
            data,
            fill: TRANSPARENT,
            label: String::new(),
            progress: Progress::new(0.5, Curve::EaseOut),
        });
        data
    }

    /// In-place re-tiling at a new uniform size: every tile keeps its lattice
    /// coordinates and target color, gets the new size and the pixel offset
    /// derived from it, has its fill restored to the target color and its
    /// label cleared (the caller redraws numbers at the new scale).
    pub fn rebuild(&mut self, new_size: Vec2) {
        for tile in &mut self.tiles {
            tile.size = new_size;
            tile.margin_x = tile.col * new_size.x;
            tile.margin_y = tile.row * new_size.y;
            tile.fill = tile.data.rgba();
            tile.label.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn source(w: u32, h: u32, color: Rgba) -> Canvas {
        let mut c = Canvas::new(w, h);
        c.fill(color);
        c
    }

    #[test]
    fn square_source_tiles_exactly() {
        let mut b = GridBuilder::new();
        let colors = b.build(&source(400, 400, [200, 10, 10, 255]), 100, 20).unwrap();

        assert_eq!(b.tile_size(), 40);
        assert_eq!(b.columns(), 10);
        assert_eq!(b.rows(), 10);
        assert_eq!(b.tiles().len(), 100);
        // Uniform source: one sampled color plus the sentinel.
        assert_eq!(colors.len(), 2);
        assert!(colors.contains(&Quantized::sentinel(20)));
    }

    #[test]
    fn lattice_offsets_are_integer_multiples() {
        let mut b = GridBuilder::new();
        b.build(&source(400, 400, [0, 0, 0, 255]), 100, 20).unwrap();

        let t = &b.tiles()[23]; // row 2, col 3
        assert_eq!(t.col, 3.0);
        assert_eq!(t.row, 2.0);
        assert_eq!(t.margin_x, 120.0);
        assert_eq!(t.margin_y, 80.0);
        assert_eq!(t.fill, TRANSPARENT);
    }

    #[test]
    fn undershoot_appends_remainder_tiles() {
        // 210x100 at N=7: tile 54, 3x1 lattice, 4 appended tiles.
        let mut b = GridBuilder::new();
        let colors = b.build(&source(210, 100, [5, 5, 5, 255]), 7, 20).unwrap();

        assert_eq!(b.tile_size(), 54);
        assert_eq!(b.rows(), 1);
        // Incremented once, on the first appended tile only.
        assert_eq!(b.columns(), 4);
        assert_eq!(b.tiles().len(), 7);
        assert!(colors.contains(&Quantized::sentinel(20)));

        let extra = &b.tiles()[4];
        assert_eq!((extra.col, extra.row), (1.0, 1.0));
    }

    #[test]
    fn limit_truncates_to_the_requested_count() {
        let mut b = GridBuilder::new();
        b.remain_height = true;
        b.limit = true;
        let colors = b.build(&source(50, 400, [90, 90, 90, 255]), 6, 20).unwrap();

        assert_eq!(b.tiles().len(), 6);
        assert!(colors.contains(&Quantized::sentinel(20)));
    }

    #[test]
    fn pad_spreads_the_lattice() {
        let mut b = GridBuilder::new();
        b.pad = 1.5;
        b.build(&source(100, 100, [0, 0, 0, 255]), 4, 20).unwrap();

        assert_eq!(b.tile_size(), 50);
        let t = &b.tiles()[1]; // col 1
        assert_eq!(t.col, 1.5);
        assert_eq!(t.margin_x, 75.0);
    }

    #[test]
    fn building_twice_is_a_precondition_violation() {
        let mut b = GridBuilder::new();
        let img = source(100, 100, [0, 0, 0, 255]);
        b.build(&img, 4, 20).unwrap();
        assert_eq!(b.build(&img, 4, 20), Err(GridError::AlreadyBuilt));
    }

    #[test]
    fn first_before_build_is_uninitialized_access() {
        let b = GridBuilder::new();
        assert_eq!(b.first().err(), Some(GridError::NotBuilt));
    }

    #[test]
    fn degenerate_sources_are_rejected() {
        let mut b = GridBuilder::new();
        assert_eq!(
            b.build(&Canvas::new(0, 10), 4, 20),
            Err(GridError::EmptySource)
        );
        assert_eq!(
            b.build(&source(2, 2, [0, 0, 0, 255]), 1000, 20),
            Err(GridError::EmptySource)
        );
    }

    #[test]
    fn rebuild_keeps_identity_and_recomputes_geometry() {
        let mut b = GridBuilder::new();
        b.build(&source(400, 400, [120, 60, 30, 255]), 100, 20).unwrap();
        let before: Vec<_> = b
            .tiles()
            .iter()
            .map(|t| (t.col, t.row, t.data.identity()))
            .collect();

        b.rebuild(Vec2::new(10.0, 10.0));

        assert_eq!(b.tiles().len(), 100);
        for (tile, (col, row, identity)) in b.tiles().iter().zip(before) {
            assert_eq!((tile.col, tile.row), (col, row));
            assert_eq!(tile.data.identity(), identity);
            assert_eq!(tile.size, Vec2::new(10.0, 10.0));
            assert_eq!(tile.margin_x, col * 10.0);
            assert_eq!(tile.margin_y, row * 10.0);
            assert_eq!(tile.fill, tile.data.rgba());
            assert!(tile.label.is_empty());
        }
    }
}
