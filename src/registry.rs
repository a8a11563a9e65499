//! Surface registry: an append-only arena of view slots.
//!
//! Handles are slot indices, stable for the life of the registry. Destroyed
//! slots become tombstones and are never reused or compacted, so a handle
//! can never silently start pointing at a different surface.

use crate::config::ViewConfig;
use crate::errors::{Result, SurfaceError};
use crate::platform;
use crate::renderer::Renderer;
use crate::script::EvalOutcome;
use crate::view::View;

/// Caller-visible surface handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(usize);

impl SurfaceId {
    pub fn index(self) -> usize {
        self.0
    }

    /// Handle from a raw C-side integer; negative values are never valid.
    pub fn from_raw(raw: i64) -> Option<Self> {
        usize::try_from(raw).ok().map(SurfaceId)
    }
}

#[derive(Default)]
pub struct Registry {
    renderer: Option<Renderer>,
    slots: Vec<Option<View>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a surface, append it, and return its handle.
    ///
    /// Bootstraps the platform and the shared renderer if they do not exist
    /// yet, and runs one update pass so the content is parsed and ready.
    /// The first paint happens on the first [`render`](Self::render) call;
    /// until then pixel export reports [`SurfaceError::NoBitmap`].
    pub fn create_surface(&mut self, config: ViewConfig, html: &str) -> Result<SurfaceId> {
        if config.width == 0 || config.height == 0 {
            return Err(SurfaceError::InvalidArgument(format!(
                "surface dimensions must be positive, got {}x{}",
                config.width, config.height
            )));
        }

        platform::init();
        if self.renderer.is_none() {
            self.renderer = Some(Renderer::new());
        }

        let mut view = View::new(config, html);
        view.update(&platform::file_root());

        let id = SurfaceId(self.slots.len());
        self.slots.push(Some(view));
        log::info!("surface {} created", id.0);
        Ok(id)
    }

    /// Tombstone a slot. Out-of-range or already-destroyed handles are
    /// silently ignored.
    pub fn destroy_surface(&mut self, id: SurfaceId) {
        if let Some(slot) = self.slots.get_mut(id.0) {
            if slot.take().is_some() {
                log::info!("surface {} destroyed", id.0);
            }
        }
    }

    /// Drop the shared renderer. Refused while any surface is live; destroy
    /// the surfaces first.
    pub fn destroy_renderer(&mut self) -> Result<()> {
        if self.live_count() > 0 {
            return Err(SurfaceError::RendererInUse);
        }
        self.renderer = None;
        Ok(())
    }

    /// One synchronous update + paint + display-refresh pass over all live
    /// surfaces. No-op before the first surface exists.
    pub fn render(&mut self) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        let file_root = platform::file_root();
        renderer.update(&mut self.slots, &file_root);
        renderer.render(&mut self.slots);
        renderer.refresh_display();
    }

    pub fn view(&self, id: SurfaceId) -> Result<&View> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(SurfaceError::InvalidHandle)
    }

    pub fn view_mut(&mut self, id: SurfaceId) -> Result<&mut View> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(SurfaceError::InvalidHandle)
    }

    /// Evaluate script against one surface's isolated context.
    pub fn evaluate_script(&mut self, id: SurfaceId, source: &str) -> Result<EvalOutcome> {
        Ok(self.view_mut(id)?.evaluate(source))
    }

    /// Queue a navigation on one surface.
    pub fn load_url(&mut self, id: SurfaceId, raw_url: &str) -> Result<()> {
        let file_root = platform::file_root();
        self.view_mut(id)?.request_url(raw_url, &file_root)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{MouseButton, MouseEventKind};

    const HTML: &str = "<html><title>t</title><body>content</body></html>";

    #[test]
    fn create_returns_sequential_stable_handles() {
        let mut reg = Registry::new();
        let a = reg.create_surface(ViewConfig::new(8, 8), HTML).unwrap();
        let b = reg.create_surface(ViewConfig::new(8, 8), HTML).unwrap();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert!(reg.has_renderer());
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let mut reg = Registry::new();
        assert!(matches!(
            reg.create_surface(ViewConfig::new(0, 10), HTML),
            Err(SurfaceError::InvalidArgument(_))
        ));
        assert!(matches!(
            reg.create_surface(ViewConfig::new(10, 0), HTML),
            Err(SurfaceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn destroyed_slots_are_tombstoned_not_reused() {
        let mut reg = Registry::new();
        let a = reg.create_surface(ViewConfig::new(8, 8), HTML).unwrap();
        reg.destroy_surface(a);

        assert!(matches!(reg.view(a), Err(SurfaceError::InvalidHandle)));
        assert_eq!(reg.len(), 1);

        let b = reg.create_surface(ViewConfig::new(8, 8), HTML).unwrap();
        assert_ne!(a, b);
        assert_eq!(b.index(), 1);
    }

    #[test]
    fn invalid_handles_are_errors_or_silent_noops_never_panics() {
        let mut reg = Registry::new();
        let bogus = SurfaceId(42);

        // Checked operations error out.
        assert!(reg.view(bogus).is_err());
        assert!(reg.evaluate_script(bogus, "1+1").is_err());
        assert!(reg.load_url(bogus, "file:///x").is_err());

        // Destruction is documented as a silent no-op.
        reg.destroy_surface(bogus);
        assert!(SurfaceId::from_raw(-1).is_none());
    }

    #[test]
    fn destroyed_handle_behaves_like_an_always_invalid_one() {
        let mut reg = Registry::new();
        let id = reg.create_surface(ViewConfig::new(8, 8), HTML).unwrap();
        reg.destroy_surface(id);

        assert!(matches!(
            reg.evaluate_script(id, "1+1"),
            Err(SurfaceError::InvalidHandle)
        ));
        reg.destroy_surface(id); // still a no-op
        reg.render(); // skips tombstones
    }

    #[test]
    fn pixels_become_available_after_first_render() {
        let mut reg = Registry::new();
        let id = reg.create_surface(ViewConfig::new(8, 8), HTML).unwrap();

        assert!(matches!(
            reg.view_mut(id).unwrap().lock_pixels(),
            Err(SurfaceError::NoBitmap)
        ));

        reg.render();
        {
            let view = reg.view_mut(id).unwrap();
            let frame = view.lock_pixels().unwrap();
            assert_eq!((frame.width, frame.height), (8, 8));
        }
        reg.view_mut(id).unwrap().unlock_pixels();
    }

    #[test]
    fn renderer_destruction_requires_all_surfaces_dead() {
        let mut reg = Registry::new();
        let id = reg.create_surface(ViewConfig::new(8, 8), HTML).unwrap();

        assert!(matches!(
            reg.destroy_renderer(),
            Err(SurfaceError::RendererInUse)
        ));

        reg.destroy_surface(id);
        reg.destroy_renderer().unwrap();
        assert!(!reg.has_renderer());
    }

    #[test]
    fn input_flows_through_the_render_pump() {
        let mut reg = Registry::new();
        let id = reg.create_surface(ViewConfig::new(8, 8), HTML).unwrap();

        let view = reg.view_mut(id).unwrap();
        view.fire_mouse(MouseEventKind::Down, MouseButton::Left, 2, 3);
        view.fire_scroll(0, -4);
        reg.render();

        assert_eq!(reg.view(id).unwrap().scroll_offset(), (0, 4));
    }
}
