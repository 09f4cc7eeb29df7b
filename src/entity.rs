// Animated drawable entities. The original class ladder is flattened into
// explicit structs: optional state lives in Option fields, and the
// "require active before animating" wrapper is a guard at the top of the
// advancing methods.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use log::debug;

use crate::gfx::anim::{Curve, Progress};
use crate::gfx::canvas::Canvas;
use crate::gfx::math::{Rect, Rgba, Vec2};

/// Rectangular drawable region: an owned image, position, margins and an
/// easing progress. Everything animated in the engine wraps one of these.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub image: Canvas,
    origin: Option<Canvas>,
    pub x: f32,
    pub y: f32,
    pub margin_x: f32,
    pub margin_y: f32,
    pub progress: Progress,
}

impl Sprite {
    pub fn new(image: Canvas, keep_origin: bool, duration: f32, curve: Curve) -> Self {
        let origin = keep_origin.then(|| image.clone());
        Self {
            image,
            origin,
            x: 0.0,
            y: 0.0,
            margin_x: 0.0,
            margin_y: 0.0,
            progress: Progress::new(duration, curve),
        }
    }

    pub fn width(&self) -> f32 {
        self.image.width() as f32
    }

    pub fn height(&self) -> f32 {
        self.image.height() as f32
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            self.x + self.margin_x,
            self.y + self.margin_y,
            self.width(),
            self.height(),
        )
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.rect().contains(p)
    }

    /// Rescales from the origin image when one was kept (lossless across
    /// repeated zooms), repositioning proportionally to the size change.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (old_w, old_h) = (self.width(), self.height());
        let source = self.origin.as_ref().unwrap_or(&self.image);
        let resized = source.resize(width, height);
        if old_w > 0.0 && old_h > 0.0 {
            self.x *= resized.width() as f32 / old_w;
            self.y *= resized.height() as f32 / old_h;
        }
        self.image = resized;
    }

    /// Aspect-cover rescale against a surface, centering via negative margins.
    pub fn fit_cover(&mut self, surface_w: f32, surface_h: f32) {
        let (src_w, src_h) = match &self.origin {
            Some(o) => (o.width() as f32, o.height() as f32),
            None => (self.width(), self.height()),
        };
        let origin_ratio = src_w / src_h;
        let ratio = surface_w / surface_h;
        let (w, h) = if origin_ratio >= ratio {
            (surface_h * origin_ratio, surface_h)
        } else {
            (surface_w, surface_w / origin_ratio)
        };
        self.resize(w.round() as u32, h.round() as u32);
        self.margin_x = -((w - surface_w) / 2.0).floor();
        self.margin_y = -((h - surface_h) / 2.0).floor();
    }

    pub fn grayscale(&mut self) {
        self.image = self.image.grayscale();
        if let Some(origin) = &self.origin {
            self.origin = Some(origin.grayscale());
        }
    }

    pub fn center_on(&mut self, surface_w: f32, surface_h: f32) {
        self.x = ((surface_w - self.width()) / 2.0).floor();
        self.y = ((surface_h - self.height()) / 2.0).floor();
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        canvas.blit(
            &self.image,
            Vec2::new(self.x + self.margin_x, self.y + self.margin_y),
        );
    }
}

/// Click payload carried by a button; resolution returns it to the caller
/// instead of invoking a stored callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    OpenPuzzle(usize),
}

/// A sprite with a crossfading border ring and attached buttons. While the
/// frame is active every draw first advances the color crossfade, then paints
/// the border, then the image; buttons draw last and only while active.
#[derive(Debug, Clone)]
pub struct Frame {
    pub sprite: Sprite,
    pub border_width: u32,
    pub first_color: [f32; 4],
    second_color: Option<[f32; 4]>,
    default_colors: Option<([f32; 4], [f32; 4])>,
    pub buttons: Vec<Button>,
}

impl Frame {
    pub fn new(
        image: Canvas,
        width: u32,
        first_color: Rgba,
        second_color: Option<Rgba>,
        border_width: u32,
        duration: f32,
        curve: Curve,
    ) -> Self {
        let ratio = image.width() as f32 / image.height() as f32;
        let mut sprite = Sprite::new(image, true, duration, curve);
        sprite.resize(width, (width as f32 / ratio).round().max(1.0) as u32);

        let first = to_f32(first_color);
        let second = second_color.map(to_f32);
        Self {
            sprite,
            border_width,
            first_color: first,
            second_color: second,
            default_colors: second.map(|s| (first, s)),
            buttons: Vec::new(),
        }
    }

    pub fn second_color(&self) -> [f32; 4] {
        self.second_color.unwrap_or(self.first_color)
    }

    /// Pins a button to this frame, centered inside it by its margins.
    pub fn attach(&mut self, mut button: Button) {
        button.frame.sprite.margin_x =
            ((self.sprite.width() - button.frame.sprite.width()) / 2.0).floor();
        button.frame.sprite.margin_y =
            ((self.sprite.height() - button.frame.sprite.height()) / 2.0).floor();
        button.frame.sprite.x = self.sprite.x;
        button.frame.sprite.y = self.sprite.y;
        self.buttons.push(button);
    }

    // Crossfade both border colors between the default pair: the first eases
    // toward the second's rest color and vice versa. RGB only, alpha rests.
    fn advance_crossfade(&mut self, dt: f32) {
        if !self.sprite.progress.active() {
            return;
        }
        self.sprite.progress.advance(dt);
        if let Some((rest_a, rest_b)) = self.default_colors {
            for ch in 0..3 {
                self.first_color[ch] = self.sprite.progress.value(rest_a[ch], rest_b[ch]);
                if let Some(second) = self.second_color.as_mut() {
                    second[ch] = self.sprite.progress.value(rest_b[ch], rest_a[ch]);
                }
            }
        }
    }

    pub fn draw(&mut self, canvas: &mut Canvas, dt: f32) {
        if self.default_colors.is_some() {
            self.advance_crossfade(dt);
        }
        if self.border_width > 0 {
            let inner = self.sprite.rect();
            canvas.frame_gradient(
                inner.inflate(self.border_width as f32),
                inner,
                to_u8(self.first_color),
                to_u8(self.second_color()),
            );
        }
        self.sprite.draw(canvas);
        if self.sprite.progress.active() {
            let (x, y) = (self.sprite.x, self.sprite.y);
            for button in &mut self.buttons {
                button.frame.sprite.x = x;
                button.frame.sprite.y = y;
                button.draw(canvas, dt);
            }
        }
    }
}

/// A frame carrying a label and a click payload.
#[derive(Debug, Clone)]
pub struct Button {
    pub frame: Frame,
    pub label: String,
    pub action: ButtonAction,
}

impl Button {
    pub fn new(frame: Frame, label: impl Into<String>, action: ButtonAction) -> Self {
        Self {
            frame,
            label: label.into(),
            action,
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        self.frame.sprite.contains(p)
    }

    pub fn draw(&mut self, canvas: &mut Canvas, dt: f32) {
        // Label glyphs are rasterized by the host; the engine only carries
        // the text.
        self.frame.draw(canvas, dt);
    }
}

/// Full-surface scene transition. Activation parks the image one full width
/// to the left so the eased motion always starts from the same offscreen
/// origin; a settled transition is no longer active and renders offscreen.
#[derive(Debug, Clone)]
pub struct Transition {
    pub sprite: Sprite,
}

impl Transition {
    pub fn new(image: Canvas, surface_w: f32, surface_h: f32, duration: f32) -> Self {
        let mut sprite = Sprite::new(image, true, duration, Curve::StopInCenter);
        sprite.fit_cover(surface_w, surface_h);
        Self { sprite }
    }

    pub fn activate(&mut self) {
        self.sprite.progress.restart();
        self.sprite.x = -self.sprite.width();
        debug!("transition activated");
    }

    pub fn active(&self) -> bool {
        self.sprite.progress.transition_active()
    }

    /// Advance strictly precedes the blit, so the frame shows this frame's
    /// elapsed time.
    pub fn draw(&mut self, canvas: &mut Canvas, dt: f32) {
        if self.active() {
            self.sprite.progress.advance(dt);
            let start = -self.sprite.width() + self.sprite.margin_x;
            self.sprite.x = self.sprite.progress.value(start, start.abs());
        }
        self.sprite.draw(canvas);
    }
}

/// Amplitude-driven scale bump (the menu heartbeat). The amplitude cell is
/// written by the external audio thread and only read here; f32 bits in an
/// AtomicU32, single writer, single reader.
#[derive(Debug, Clone)]
pub struct Pulse {
    pub sprite: Sprite,
    amplitude: Arc<AtomicU32>,
    base_w: u32,
    base_h: u32,
}

impl Pulse {
    /// Amplitude read when the audio collaborator has not written yet.
    const RESTING_AMPLITUDE: f32 = 200.0;

    pub fn new(image: Canvas, amplitude: Arc<AtomicU32>) -> Self {
        let base_w = image.width();
        let base_h = image.height();
        Self {
            sprite: Sprite::new(image, true, 0.5, Curve::EaseOut),
            amplitude,
            base_w,
            base_h,
        }
    }

    fn bump(&mut self) {
        let mut amp = f32::from_bits(self.amplitude.load(Ordering::Relaxed));
        if amp == 0.0 {
            amp = Self::RESTING_AMPLITUDE;
        }
        let k = 1.0 + amp * 0.0008;
        let w = (self.base_w as f32 * k).round() as u32;
        let h = (self.base_h as f32 * k).round() as u32;
        self.sprite.image = match &self.sprite.origin {
            Some(origin) => origin.resize(w, h),
            None => self.sprite.image.resize(w, h),
        };
        self.sprite.margin_x = -((w as f32 - self.base_w as f32) / 2.0).floor();
        self.sprite.margin_y = -((h as f32 - self.base_h as f32) / 2.0).floor();
    }

    pub fn draw(&mut self, canvas: &mut Canvas) {
        self.bump();
        self.sprite.draw(canvas);
    }
}

/// Border accent colors for menu entries: every combination of three warm
/// levels per channel, cycling.
#[derive(Debug, Clone, Default)]
pub struct BorderCycle {
    index: usize,
}

impl BorderCycle {
    const STEPS: [u8; 3] = [220, 180, 160];

    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> Rgba {
        let i = self.index;
        self.index = (self.index + 1) % 27;
        [
            Self::STEPS[i / 9 % 3],
            Self::STEPS[i / 3 % 3],
            Self::STEPS[i % 3],
            255,
        ]
    }
}

fn to_f32(c: Rgba) -> [f32; 4] {
    [c[0] as f32, c[1] as f32, c[2] as f32, c[3] as f32]
}

fn to_u8(c: [f32; 4]) -> Rgba {
    [
        c[0].round() as u8,
        c[1].round() as u8,
        c[2].round() as u8,
        c[3].round() as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn image(w: u32, h: u32) -> Canvas {
        let mut c = Canvas::new(w, h);
        c.fill([90, 90, 90, 255]);
        c
    }

    #[test]
    fn frame_scales_to_width_keeping_ratio() {
        let f = Frame::new(image(100, 50), 200, [0, 0, 0, 255], None, 0, 0.5, Curve::EaseOut);
        assert_eq!(f.sprite.image.width(), 200);
        assert_eq!(f.sprite.image.height(), 100);
    }

    #[test]
    fn crossfade_swaps_the_default_pair() {
        let mut f = Frame::new(
            image(10, 10),
            10,
            [0, 0, 0, 255],
            Some([220, 220, 220, 255]),
            5,
            0.5,
            Curve::EaseOut,
        );
        f.sprite.progress.activate();
        let mut canvas = Canvas::new(32, 32);
        f.draw(&mut canvas, 0.5);
        assert_eq!(to_u8(f.first_color), [220, 220, 220, 255]);
        assert_eq!(to_u8(f.second_color()), [0, 0, 0, 255]);
    }

    #[test]
    fn inactive_frame_does_not_crossfade() {
        let mut f = Frame::new(
            image(10, 10),
            10,
            [0, 0, 0, 255],
            Some([220, 220, 220, 255]),
            5,
            0.5,
            Curve::EaseOut,
        );
        let mut canvas = Canvas::new(32, 32);
        f.draw(&mut canvas, 0.25);
        assert_eq!(to_u8(f.first_color), [0, 0, 0, 255]);
    }

    #[test]
    fn attach_centers_the_button() {
        let mut f = Frame::new(image(100, 100), 100, [0, 0, 0, 255], None, 0, 0.5, Curve::EaseOut);
        let inner = Frame::new(image(40, 20), 40, [0, 0, 0, 255], None, 0, 0.5, Curve::EaseOut);
        f.attach(Button::new(inner, "Play", ButtonAction::OpenPuzzle(0)));
        let b = &f.buttons[0];
        assert_eq!(b.frame.sprite.margin_x, 30.0);
        assert_eq!(b.frame.sprite.margin_y, 40.0);
    }

    #[test]
    fn transition_starts_offscreen_and_settles_inactive() {
        let mut t = Transition::new(image(100, 100), 100.0, 100.0, 3.0);
        t.activate();
        assert!(t.active());
        assert_eq!(t.sprite.x, -100.0);

        let mut canvas = Canvas::new(100, 100);
        t.draw(&mut canvas, 1.5);
        let mid = t.sprite.x;
        assert!(mid > -100.0 && mid < 100.0, "mid-slide x was {mid}");

        t.draw(&mut canvas, 5.0);
        assert!(!t.active());
    }

    #[test]
    fn transition_reactivation_resets_the_origin() {
        let mut t = Transition::new(image(100, 100), 100.0, 100.0, 3.0);
        t.activate();
        let mut canvas = Canvas::new(100, 100);
        t.draw(&mut canvas, 1.0);
        t.activate();
        assert_eq!(t.sprite.x, -t.sprite.width());
        assert!(t.active());
    }

    #[test]
    fn pulse_scales_with_amplitude() {
        let amplitude = Arc::new(AtomicU32::new(1000.0f32.to_bits()));
        let mut p = Pulse::new(image(100, 100), amplitude.clone());
        let mut canvas = Canvas::new(256, 256);
        p.draw(&mut canvas);
        // k = 1.8 at amplitude 1000; non-compounding across frames.
        assert_eq!(p.sprite.image.width(), 180);
        p.draw(&mut canvas);
        assert_eq!(p.sprite.image.width(), 180);

        amplitude.store(0.0f32.to_bits(), Ordering::Relaxed);
        p.draw(&mut canvas);
        // Silent channel falls back to the resting amplitude.
        assert_eq!(p.sprite.image.width(), 116);
    }

    #[test]
    fn border_cycle_walks_all_combinations() {
        let mut cycle = BorderCycle::new();
        assert_eq!(cycle.next(), [220, 220, 220, 255]);
        assert_eq!(cycle.next(), [220, 220, 180, 255]);
        assert_eq!(cycle.next(), [220, 220, 160, 255]);
        assert_eq!(cycle.next(), [220, 180, 220, 255]);
        for _ in 0..23 {
            cycle.next();
        }
        assert_eq!(cycle.next(), [220, 220, 220, 255]);
    }
}
