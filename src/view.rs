//! One embedded page instance and its pixel backing store.

use std::collections::VecDeque;
use std::path::Path;

use scraper::{Html, Selector};

use crate::bitmap::Bitmap;
use crate::config::ViewConfig;
use crate::errors::{Result, SurfaceError};
use crate::event::{InputEvent, MouseButton, MouseEventKind};
use crate::net;
use crate::script::{self, EvalOutcome};

#[derive(Debug, Clone, PartialEq)]
enum LoadState {
    Idle,
    Pending(url::Url),
}

pub struct View {
    config: ViewConfig,
    state: LoadState,
    current_url: Option<url::Url>,
    raw_html: String,
    title: String,
    page_text: String,

    focused: bool,
    scroll: (i32, i32),
    cursor: (i32, i32),
    held_button: MouseButton,
    typed: String,
    pending_input: VecDeque<InputEvent>,

    // Per-surface JS world, created on first evaluation.
    js: Option<boa_engine::Context>,

    bitmap: Option<Bitmap>,
    dirty: bool,
}

impl View {
    pub fn new(config: ViewConfig, html: &str) -> Self {
        let mut view = Self {
            config,
            state: LoadState::Idle,
            current_url: None,
            raw_html: String::new(),
            title: String::new(),
            page_text: String::new(),
            focused: false,
            scroll: (0, 0),
            cursor: (0, 0),
            held_button: MouseButton::None,
            typed: String::new(),
            pending_input: VecDeque::new(),
            js: None,
            bitmap: None,
            dirty: true,
        };
        view.load_html(html);
        view
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn current_url(&self) -> Option<&url::Url> {
        self.current_url.as_ref()
    }

    pub fn scroll_offset(&self) -> (i32, i32) {
        self.scroll
    }

    pub fn typed_text(&self) -> &str {
        &self.typed
    }

    /// Replace the surface content and reparse.
    pub fn load_html(&mut self, html: &str) {
        self.raw_html = html.to_string();

        let document = Html::parse_document(html);
        self.title = select_text(&document, "title");
        self.page_text = document
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join(" ");

        self.scroll = (0, 0);
        self.dirty = true;
    }

    /// Queue a navigation; the load happens on the next update pass.
    pub fn request_url(&mut self, raw_url: &str, file_root: &Path) -> Result<()> {
        let url = net::parse(raw_url, file_root)?;
        log::info!("surface queued load of {url}");
        self.state = LoadState::Pending(url);
        Ok(())
    }

    /// One update pass: perform a pending load, then drain queued input.
    /// Returns whether the surface needs a repaint.
    pub fn update(&mut self, file_root: &Path) -> bool {
        if let LoadState::Pending(url) = std::mem::replace(&mut self.state, LoadState::Idle) {
            match net::fetch(url.as_str(), file_root, &self.config.user_agent) {
                Ok(resp) => {
                    log::info!("loaded {} ({} bytes)", resp.url, resp.body.len());
                    let html = String::from_utf8_lossy(&resp.body).into_owned();
                    self.load_html(&html);
                    self.current_url = Some(resp.url);
                }
                Err(e) => {
                    log::warn!("load of {url} failed: {e}");
                    self.load_html(&format!(
                        "<html><title>Load error</title><body>{e}</body></html>"
                    ));
                }
            }
        }

        while let Some(event) = self.pending_input.pop_front() {
            self.apply_input(event);
        }

        self.dirty
    }

    fn apply_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::MouseDown { button, x, y } => {
                self.held_button = button;
                self.cursor = (x, y);
            }
            InputEvent::MouseUp { x, y, .. } => {
                self.held_button = MouseButton::None;
                self.cursor = (x, y);
            }
            InputEvent::MouseMove { x, y, .. } => {
                self.cursor = (x, y);
            }
            InputEvent::Scroll { dx, dy } => {
                self.scroll.0 = (self.scroll.0 - dx).max(0);
                self.scroll.1 = (self.scroll.1 - dy).max(0);
                self.dirty = true;
            }
            InputEvent::KeyDown {
                key_code,
                key_identifier,
                ..
            } => {
                log::trace!("key down {key_code} ({key_identifier})");
            }
            InputEvent::KeyUp { key_code, .. } => {
                log::trace!("key up {key_code}");
            }
            InputEvent::Char { text } => {
                self.typed.push_str(&text);
                self.dirty = true;
            }
        }
    }

    /// Mouse events are delivered regardless of focus.
    pub fn fire_mouse(&mut self, kind: MouseEventKind, button: MouseButton, x: i32, y: i32) {
        let y = if self.config.flip_vertical {
            self.config.height as i32 - y
        } else {
            y
        };

        let event = match kind {
            MouseEventKind::Down => InputEvent::MouseDown { button, x, y },
            MouseEventKind::Up => InputEvent::MouseUp { button, x, y },
            MouseEventKind::Move => InputEvent::MouseMove { button, x, y },
        };
        self.pending_input.push_back(event);
    }

    pub fn fire_scroll(&mut self, dx: i32, dy: i32) {
        self.pending_input.push_back(InputEvent::Scroll { dx, dy });
    }

    /// Key events are only delivered to a focused surface.
    pub fn fire_key(&mut self, event: InputEvent) -> Result<()> {
        if !self.focused {
            return Err(SurfaceError::NotFocused);
        }
        self.pending_input.push_back(event);
        Ok(())
    }

    /// Committed text input (post-IME), also gated on focus.
    pub fn fire_char(&mut self, text: &str) -> Result<()> {
        if !self.focused {
            return Err(SurfaceError::NotFocused);
        }
        self.pending_input.push_back(InputEvent::Char {
            text: text.to_string(),
        });
        Ok(())
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn unfocus(&mut self) {
        self.focused = false;
    }

    pub fn has_input_focus(&self) -> bool {
        self.focused
    }

    /// One paint pass. Realizes the bitmap on first call; skipped while a
    /// reader holds the pixel lock.
    pub fn paint(&mut self) {
        if self.bitmap.as_ref().is_some_and(|b| b.is_locked()) {
            log::warn!("skipping paint of a locked surface");
            return;
        }

        let bitmap = self
            .bitmap
            .get_or_insert_with(|| Bitmap::new(self.config.width, self.config.height));

        bitmap.clear([0xff, 0xff, 0xff, 0xff]);
        bitmap.blit_text(&self.page_text, self.scroll);
        self.dirty = false;
    }

    pub fn needs_repaint(&self) -> bool {
        self.dirty
    }

    pub fn bitmap(&self) -> Option<&Bitmap> {
        self.bitmap.as_ref()
    }

    /// Acquire the pixel lock, returning the frame geometry with the pixel
    /// view. [`SurfaceError::NoBitmap`] before the first paint.
    pub fn lock_pixels(&mut self) -> Result<PixelView<'_>> {
        let bitmap = self.bitmap.as_mut().ok_or(SurfaceError::NoBitmap)?;
        let (width, height, stride) = (bitmap.width(), bitmap.height(), bitmap.stride());
        let pixels = bitmap.lock()?;
        Ok(PixelView {
            pixels,
            width,
            height,
            stride,
        })
    }

    /// Release the pixel lock. No-op if nothing is locked.
    pub fn unlock_pixels(&mut self) {
        if let Some(bitmap) = self.bitmap.as_mut() {
            if bitmap.unlock().is_err() {
                log::trace!("unlock without a held pixel lock");
            }
        }
    }

    /// Evaluate script in this surface's isolated JS context.
    pub fn evaluate(&mut self, source: &str) -> EvalOutcome {
        let ctx = self.js.get_or_insert_with(boa_engine::Context::default);
        script::evaluate(ctx, source)
    }
}

/// Read-only view of the most recent frame, valid until the matching
/// unlock.
pub struct PixelView<'a> {
    pub pixels: &'a [u8],
    pub width: u32,
    pub height: u32,
    pub stride: u32,
}

fn select_text(document: &Html, selector: &str) -> String {
    let Ok(sel) = Selector::parse(selector) else {
        return String::new();
    };
    document
        .select(&sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}
