// Saved-puzzle menu: frames flow into two columns, hover drives the border
// crossfade forward and everything else backward, scroll is clamped to the
// laid-out content height.

use log::debug;

use crate::entity::{ButtonAction, Frame};
use crate::gfx::canvas::Canvas;
use crate::gfx::math::Vec2;

pub struct MenuGrid {
    pub frames: Vec<Frame>,
    pub hovered: Option<usize>,
    pub scroll_offset: f32,
    content_height: f32,
    pad_fraction: f32,
}

impl MenuGrid {
    pub fn new(pad_fraction: f32) -> Self {
        Self {
            frames: Vec::new(),
            hovered: None,
            scroll_offset: 0.0,
            content_height: 0.0,
            pad_fraction,
        }
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn content_height(&self) -> f32 {
        self.content_height
    }

    /// Lays out and draws every frame. The hovered frame advances its
    /// animation by `dt`, the rest rewind by `-dt` back to rest.
    pub fn draw(&mut self, canvas: &mut Canvas, dt: f32) {
        let width = canvas.width() as f32;
        let padding = self.pad_fraction * width;
        let mut y = padding;

        let hovered = self.hovered;
        let mut index = 0;
        for pair in self.frames.chunks_mut(2) {
            let mut pair_height = 0.0f32;
            for (side, frame) in pair.iter_mut().enumerate() {
                pair_height = pair_height.max(frame.sprite.height());
                frame.sprite.x = if side == 0 {
                    padding
                } else {
                    width - padding - frame.sprite.width()
                };
                frame.sprite.y = y + self.scroll_offset;
                let signed_dt = if hovered == Some(index) { dt } else { -dt };
                frame.draw(canvas, signed_dt);
                index += 1;
            }
            y += padding + pair_height;
        }
        self.content_height = y;
    }

    /// Clamped scroll: down only while content still extends past the
    /// viewport bottom, up only while the top is still above it.
    pub fn scroll(&mut self, offset: f32, viewport_h: f32) {
        let next_height = viewport_h - self.scroll_offset - offset;
        if (next_height <= self.content_height && offset < 0.0)
            || (viewport_h <= next_height && offset > 0.0)
        {
            self.scroll_offset += offset;
        }
    }

    /// Marks and activates the first frame under the pointer. Returns true
    /// when something is hovered (the host may switch the cursor).
    pub fn hover(&mut self, p: Vec2) -> bool {
        for (i, frame) in self.frames.iter_mut().enumerate() {
            if frame.sprite.contains(p) {
                if self.hovered != Some(i) {
                    debug!("menu hover -> frame {i}");
                }
                self.hovered = Some(i);
                frame.sprite.progress.activate();
                return true;
            }
        }
        self.hovered = None;
        false
    }

    /// Resolves a click against every frame's attached buttons.
    pub fn click(&self, p: Vec2) -> Option<ButtonAction> {
        for frame in &self.frames {
            for button in &frame.buttons {
                if button.contains(p) {
                    return Some(button.action);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Button;
    use crate::gfx::anim::Curve;
    use pretty_assertions::assert_eq;

    fn frame(size: u32) -> Frame {
        let mut image = Canvas::new(size, size);
        image.fill([50, 50, 50, 255]);
        Frame::new(
            image,
            size,
            [34, 34, 34, 255],
            Some([220, 180, 160, 255]),
            5,
            0.5,
            Curve::EaseOut,
        )
    }

    #[test]
    fn frames_flow_into_two_columns() {
        let mut menu = MenuGrid::new(0.0625);
        for _ in 0..3 {
            menu.push(frame(200));
        }
        let mut canvas = Canvas::new(800, 600);
        menu.draw(&mut canvas, 0.016);

        let padding = 50.0;
        assert_eq!(menu.frames[0].sprite.x, padding);
        assert_eq!(menu.frames[1].sprite.x, 800.0 - padding - 200.0);
        assert_eq!(menu.frames[0].sprite.y, padding);
        // Odd frame wraps to the left of the next band.
        assert_eq!(menu.frames[2].sprite.x, padding);
        assert_eq!(menu.frames[2].sprite.y, padding + 200.0 + padding);
        assert_eq!(menu.content_height(), padding * 3.0 + 200.0 * 2.0);
    }

    #[test]
    fn scroll_is_clamped_to_content() {
        let mut menu = MenuGrid::new(0.0625);
        for _ in 0..6 {
            menu.push(frame(200));
        }
        let mut canvas = Canvas::new(800, 600);
        menu.draw(&mut canvas, 0.016);
        let viewport = 600.0;

        // Scrolling up from the top is rejected.
        menu.scroll(25.0, viewport);
        assert_eq!(menu.scroll_offset, 0.0);

        // Scrolling down walks until the content bottom meets the viewport.
        for _ in 0..100 {
            menu.scroll(-25.0, viewport);
        }
        let max_down = viewport - menu.content_height();
        assert!(menu.scroll_offset >= max_down);
        assert!(menu.scroll_offset < max_down + 25.0);

        // And back up stops at zero.
        for _ in 0..100 {
            menu.scroll(25.0, viewport);
        }
        assert_eq!(menu.scroll_offset, 0.0);
    }

    #[test]
    fn hover_activates_only_the_frame_under_the_pointer() {
        let mut menu = MenuGrid::new(0.0625);
        menu.push(frame(200));
        menu.push(frame(200));
        let mut canvas = Canvas::new(800, 600);
        menu.draw(&mut canvas, 0.016);

        assert!(menu.hover(Vec2::new(60.0, 60.0)));
        assert_eq!(menu.hovered, Some(0));
        assert!(menu.frames[0].sprite.progress.active());
        assert!(!menu.frames[1].sprite.progress.active());

        assert!(!menu.hover(Vec2::new(400.0, 599.0)));
        assert_eq!(menu.hovered, None);
    }

    #[test]
    fn unhovered_frames_rewind_to_rest() {
        let mut menu = MenuGrid::new(0.0625);
        menu.push(frame(200));
        let mut canvas = Canvas::new(800, 600);
        menu.draw(&mut canvas, 0.016);

        menu.hover(Vec2::new(60.0, 60.0));
        menu.draw(&mut canvas, 0.1);
        assert!(menu.frames[0].sprite.progress.active());

        menu.hovered = None;
        for _ in 0..5 {
            menu.draw(&mut canvas, 0.1);
        }
        assert!(!menu.frames[0].sprite.progress.active());
    }

    #[test]
    fn click_resolves_attached_buttons() {
        let mut menu = MenuGrid::new(0.0625);
        let mut f = frame(200);
        let inner = frame(100);
        f.attach(Button::new(inner, "Play", ButtonAction::OpenPuzzle(7)));
        menu.push(f);
        let mut canvas = Canvas::new(800, 600);
        menu.draw(&mut canvas, 0.016);

        // Button is centered inside the frame at (50, 50) + 200x200.
        assert_eq!(
            menu.click(Vec2::new(150.0, 150.0)),
            Some(ButtonAction::OpenPuzzle(7))
        );
        assert_eq!(menu.click(Vec2::new(700.0, 10.0)), None);
    }
}
