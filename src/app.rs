// Scene orchestration: the saved-puzzle menu, the active puzzle with its
// palette strip, and the slide transition between them. The host loop feeds
// events and per-frame delta time; everything here is synchronous per frame.

use std::collections::HashMap;
use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use anyhow::Result;
use log::info;

use crate::color::Quantized;
use crate::config::Config;
use crate::entity::{BorderCycle, Button, ButtonAction, Frame, Pulse, Sprite, Transition};
use crate::gfx::anim::Curve;
use crate::gfx::canvas::Canvas;
use crate::gfx::math::{Rgba, Vec2, TRANSPARENT};
use crate::grid::builder::GridBuilder;
use crate::grid::level::Level;
use crate::grid::menu::MenuGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    Menu,
    Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    PointerMove { pos: Vec2 },
    PointerDown { pos: Vec2, button: MouseButton },
    PointerUp { button: MouseButton },
    Scroll { delta: f32 },
}

/// Opaque images supplied by the excluded asset-loading collaborator.
pub struct Assets {
    pub background: Canvas,
    pub transition: Canvas,
    pub pulse: Canvas,
    pub play_button: Canvas,
    pub palette_strip: Canvas,
    pub puzzles: Vec<Canvas>,
}

/// Numbered swatch strip beside the puzzle. Swatch tiles carry the level's
/// distinct colors; the sentinel swatch is the eraser.
pub struct Palette {
    pub level: Level,
    numbers: HashMap<u64, String>,
    selected: usize,
    base_size: Vec2,
}

impl Palette {
    const SELECT_GROWTH: f32 = 5.0;
    const ERASER_FILL: Rgba = [150, 150, 150, 255];

    fn new(mut level: Level) -> Self {
        let colors = level.colors().to_vec();
        let mut numbers = HashMap::new();
        let mut next_number = 0usize;
        for (tile, q) in level.builder.tiles_mut().iter_mut().zip(&colors) {
            tile.data = *q;
            if q.is_sentinel() {
                tile.fill = Self::ERASER_FILL;
                tile.label = "R".to_string();
            } else {
                next_number += 1;
                tile.fill = q.rgba();
                tile.label = next_number.to_string();
            }
            numbers.insert(q.identity(), tile.label.clone());
        }
        let base_size = level
            .builder
            .tiles()
            .first()
            .map(|t| t.size)
            .unwrap_or_default();

        let mut palette = Self {
            level,
            numbers,
            selected: 0,
            base_size,
        };
        palette.grow(0);
        palette
    }

    /// Identity-to-label map used to number the puzzle tiles.
    pub fn numbers(&self) -> &HashMap<u64, String> {
        &self.numbers
    }

    pub fn selected_color(&self) -> Quantized {
        self.level.builder.tiles()[self.selected].data
    }

    /// Resolves a click against the swatches; a hit swaps the enlarged
    /// selection marker over and returns the picked color.
    pub fn select(&mut self, p: Vec2) -> Option<Quantized> {
        let (x, y) = (self.level.frame.sprite.x, self.level.frame.sprite.y);
        let mut hit = None;
        for (i, tile) in self.level.builder.tiles_mut().iter_mut().enumerate() {
            tile.x = x;
            tile.y = y;
            if hit.is_none() && tile.contains(p) {
                hit = Some(i);
            }
        }
        let index = hit?;
        self.level.builder.tiles_mut()[self.selected].size = self.base_size;
        self.grow(index);
        self.selected = index;
        info!("palette: swatch {} selected", index);
        Some(self.selected_color())
    }

    fn grow(&mut self, index: usize) {
        if let Some(tile) = self.level.builder.tiles_mut().get_mut(index) {
            tile.size = Vec2::new(
                self.base_size.x + Self::SELECT_GROWTH,
                self.base_size.y + Self::SELECT_GROWTH,
            );
        }
    }

    pub fn draw(&mut self, canvas: &mut Canvas, dt: f32) {
        self.level.draw(canvas, dt);
    }
}

pub struct App {
    pub config: Config,
    pub scene: Scene,
    pending: Scene,
    pub menu: MenuGrid,
    pub background: Sprite,
    pub transition: Transition,
    pub pulse: Pulse,
    pub level: Option<Level>,
    pub palette: Option<Palette>,
    amplitude: Arc<AtomicU32>,
    puzzles: Vec<Canvas>,
    palette_strip: Canvas,
    selected_puzzle: Option<usize>,
    selected_color: Rgba,
    last_pointer: Option<Vec2>,
    right_held: bool,
    surface_w: f32,
    surface_h: f32,
    pub time: f32,
}

impl App {
    pub fn new(config: Config, surface_w: u32, surface_h: u32, assets: Assets) -> Result<Self> {
        anyhow::ensure!(
            !assets.puzzles.is_empty(),
            "no saved puzzles found; nothing to put on the menu"
        );
        let (w, h) = (surface_w as f32, surface_h as f32);
        let amplitude = Arc::new(AtomicU32::new(0));

        let [r, g, b] = config.theme.menu_border;
        let mut cycle = BorderCycle::new();
        let mut menu = MenuGrid::new(config.menu_pad_fraction);
        for (i, puzzle) in assets.puzzles.iter().enumerate() {
            let mut frame = Frame::new(
                puzzle.clone(),
                config.menu_frame_width,
                [r, g, b, 255],
                Some(cycle.next()),
                5,
                config.hover_duration,
                Curve::EaseOut,
            );
            let play = Frame::new(
                assets.play_button.clone(),
                assets.play_button.width(),
                [r, g, b, 255],
                None,
                0,
                config.hover_duration,
                Curve::EaseOut,
            );
            frame.attach(Button::new(play, "Play", ButtonAction::OpenPuzzle(i)));
            menu.push(frame);
        }

        let mut background = Sprite::new(assets.background, true, 0.5, Curve::EaseOut);
        background.fit_cover(w, h);
        let transition = Transition::new(assets.transition, w, h, config.transition_duration);
        let mut pulse = Pulse::new(assets.pulse, amplitude.clone());
        pulse.sprite.center_on(w, h);

        info!("app ready: {} saved puzzles on the menu", assets.puzzles.len());
        Ok(Self {
            config,
            scene: Scene::Menu,
            pending: Scene::Menu,
            menu,
            background,
            transition,
            pulse,
            level: None,
            palette: None,
            amplitude,
            puzzles: assets.puzzles,
            palette_strip: assets.palette_strip,
            selected_puzzle: None,
            selected_color: TRANSPARENT,
            last_pointer: None,
            right_held: false,
            surface_w: w,
            surface_h: h,
            time: 0.0,
        })
    }

    /// Handle for the external audio thread; it writes f32 amplitude bits,
    /// the render path only reads.
    pub fn amplitude_handle(&self) -> Arc<AtomicU32> {
        self.amplitude.clone()
    }

    pub fn selected_color(&self) -> Rgba {
        self.selected_color
    }

    pub fn handle_event(&mut self, event: UiEvent) -> Result<()> {
        match event {
            UiEvent::PointerDown {
                button: MouseButton::Right,
                pos,
            } => {
                self.right_held = true;
                self.last_pointer = Some(pos);
                return Ok(());
            }
            UiEvent::PointerUp {
                button: MouseButton::Right,
            } => {
                self.right_held = false;
                return Ok(());
            }
            _ => {}
        }
        match self.scene {
            Scene::Menu => self.handle_menu_event(event),
            Scene::Level => self.handle_level_event(event)?,
        }
        Ok(())
    }

    fn handle_menu_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Scroll { delta } => {
                self.menu
                    .scroll(delta * self.config.scroll_step, self.surface_h);
            }
            UiEvent::PointerMove { pos } => {
                self.menu.hover(pos);
                self.last_pointer = Some(pos);
            }
            UiEvent::PointerDown { pos, .. } => {
                if let Some(ButtonAction::OpenPuzzle(index)) = self.menu.click(pos) {
                    info!("menu: puzzle {index} requested");
                    self.selected_puzzle = Some(index);
                    self.pending = Scene::Level;
                }
                self.last_pointer = Some(pos);
            }
            UiEvent::PointerUp { .. } => {}
        }
    }

    fn handle_level_event(&mut self, event: UiEvent) -> Result<()> {
        match event {
            UiEvent::Scroll { delta } => {
                let k = if delta > 0.0 {
                    self.config.zoom_in
                } else {
                    self.config.zoom_out
                };
                if let (Some(level), Some(palette)) = (&mut self.level, &self.palette) {
                    level.zoom(k, self.surface_w, self.surface_h)?;
                    // Rebuild cleared the numbers; redraw them at the new scale.
                    level.label_tiles(palette.numbers());
                }
            }
            UiEvent::PointerMove { pos } => {
                if self.right_held {
                    if let (Some(level), Some(from)) = (&mut self.level, self.last_pointer) {
                        level.pan(from, pos);
                    }
                }
                self.last_pointer = Some(pos);
            }
            UiEvent::PointerDown { pos, .. } => {
                let picked = match &mut self.palette {
                    Some(palette) => palette.select(pos),
                    None => None,
                };
                if let Some(color) = picked {
                    self.selected_color = color.rgba();
                } else if let Some(level) = &mut self.level {
                    level.paint(pos, self.selected_color);
                }
                self.last_pointer = Some(pos);
            }
            UiEvent::PointerUp { .. } => {}
        }
        Ok(())
    }

    pub fn update(&mut self, dt: f32) -> Result<()> {
        self.time += dt;
        if self.pending != self.scene {
            self.scene = self.pending;
            self.transition.activate();
            info!("scene -> {:?}", self.scene);
        }
        // Deferred level construction, masked by the running transition.
        if self.scene == Scene::Level && self.level.is_none() {
            self.open_selected_puzzle()?;
        }
        Ok(())
    }

    fn open_selected_puzzle(&mut self) -> Result<()> {
        let index = self
            .selected_puzzle
            .ok_or_else(|| anyhow::anyhow!("level scene entered without a puzzle selection"))?;
        let source = self
            .puzzles
            .get(index)
            .ok_or_else(|| anyhow::anyhow!("puzzle {index} is gone"))?
            .clone();

        let [r, g, b] = self.config.theme.level_border;
        let frame = Frame::new(
            source,
            self.config.level_frame_width,
            [r, g, b, 255],
            None,
            5,
            self.config.hover_duration,
            Curve::EaseOut,
        );
        let mut level = Level::new(
            frame,
            self.config.particles,
            self.config.color_depth,
            GridBuilder::new(),
        )?;
        level.frame.sprite.progress.activate();
        level.frame.sprite.center_on(self.surface_w, self.surface_h);
        level.frame.sprite.grayscale();
        level.zoom(1.0, self.surface_w, self.surface_h)?;

        let mut strip_builder = GridBuilder::new();
        strip_builder.remain_height = true;
        strip_builder.limit = true;
        strip_builder.pad = 1.5;
        let strip = Frame::new(
            self.palette_strip.clone(),
            self.config.palette_width,
            [0, 0, 0, 0],
            None,
            0,
            self.config.hover_duration,
            Curve::EaseOut,
        );
        let mut swatches = Level::new(
            strip,
            level.colors().len(),
            self.config.color_depth,
            strip_builder,
        )?;
        swatches.frame.sprite.x = 25.0;
        swatches.frame.sprite.y = 25.0;
        swatches.frame.sprite.progress.activate();

        let palette = Palette::new(swatches);
        level.label_tiles(palette.numbers());
        self.selected_color = palette.selected_color().rgba();
        info!(
            "puzzle {index} opened: {} tiles, {} colors",
            level.builder.tiles().len(),
            level.colors().len()
        );
        self.level = Some(level);
        self.palette = Some(palette);
        Ok(())
    }

    pub fn draw(&mut self, canvas: &mut Canvas, dt: f32) {
        self.background.draw(canvas);
        match self.scene {
            Scene::Menu => {
                self.menu.draw(canvas, dt);
                self.pulse.draw(canvas);
            }
            Scene::Level => {
                if let Some(level) = &mut self.level {
                    level.draw(canvas, dt);
                }
                if let Some(palette) = &mut self.palette {
                    palette.draw(canvas, dt);
                }
            }
        }
        self.transition.draw(canvas, dt);
    }
}
