//! The shared coordinator all surfaces render through.
//!
//! One renderer exists per registry; it must be created before the first
//! surface and outlives every surface it served. Passes are synchronous on
//! the calling thread, there is no timer and no background work.

use std::path::Path;

use crate::view::View;

pub struct Renderer {
    frames: u64,
}

impl Renderer {
    pub fn new() -> Self {
        log::info!("renderer created");
        Self { frames: 0 }
    }

    /// One update pass: pending loads and queued input for every live
    /// surface.
    pub fn update(&mut self, slots: &mut [Option<View>], file_root: &Path) {
        for view in slots.iter_mut().flatten() {
            view.update(file_root);
        }
    }

    /// One paint pass over every live dirty surface. Every call repaints
    /// fully; there is no incremental-rendering contract.
    pub fn render(&mut self, slots: &mut [Option<View>]) {
        for view in slots.iter_mut().flatten() {
            if view.needs_repaint() || view.bitmap().is_none() {
                view.paint();
            }
        }
    }

    /// Display-refresh hook. There is no host compositor on this side, so
    /// this only advances the frame counter.
    pub fn refresh_display(&mut self) {
        self.frames = self.frames.wrapping_add(1);
        log::trace!("display refresh, frame {}", self.frames);
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewConfig;

    #[test]
    fn render_realizes_bitmaps_for_live_views_only() {
        let mut renderer = Renderer::new();
        let mut slots = vec![
            Some(View::new(ViewConfig::new(8, 8), "<body>a</body>")),
            None,
            Some(View::new(ViewConfig::new(8, 8), "<body>b</body>")),
        ];

        renderer.update(&mut slots, std::env::temp_dir().as_path());
        renderer.render(&mut slots);
        renderer.refresh_display();

        assert!(slots[0].as_ref().unwrap().bitmap().is_some());
        assert!(slots[2].as_ref().unwrap().bitmap().is_some());
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn render_does_not_overwrite_a_locked_frame() {
        let mut renderer = Renderer::new();
        let mut slots = vec![Some(View::new(ViewConfig::new(8, 8), "<body>x</body>"))];

        renderer.render(&mut slots);

        let view = slots[0].as_mut().unwrap();
        {
            let _frame = view.lock_pixels().unwrap();
        }
        // Lock is still held until unlock_pixels. A repaint while locked is
        // skipped rather than racing the reader.
        view.fire_scroll(0, -5);
        renderer.update(&mut slots, std::env::temp_dir().as_path());
        renderer.render(&mut slots);

        let view = slots[0].as_mut().unwrap();
        assert!(view.needs_repaint());
        view.unlock_pixels();
        renderer.render(&mut slots);
        assert!(!slots[0].as_ref().unwrap().needs_repaint());
    }
}
