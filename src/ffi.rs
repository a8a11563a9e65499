//! Flat C ABI over the surface registry.
//!
//! The registry behind these entry points is thread-local: a surface's JS
//! context and parsed document are not `Send`, so the exported surface is
//! single-threaded by contract — every call must come from the thread that
//! created the surfaces. Errors never cross the boundary; they degrade to
//! the documented null/false/no-op results and a log line.
//!
//! Every string returned to the caller is heap-allocated and must be
//! released with [`websurface_free_string`].

use std::cell::RefCell;
use std::ffi::{c_char, c_int, c_void, CStr, CString};

use crate::config::ViewConfig;
use crate::event::{self, InputEvent, KeyEventKind, Modifiers, MouseButton, MouseEventKind};
use crate::registry::{Registry, SurfaceId};

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::new());
}

fn with_registry<R>(f: impl FnOnce(&mut Registry) -> R) -> R {
    REGISTRY.with(|reg| f(&mut reg.borrow_mut()))
}

/// Lossy view of a caller string; null pointers read as empty.
fn cstr_arg(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

fn surface_id(raw: c_int) -> Option<SurfaceId> {
    SurfaceId::from_raw(raw as i64)
}

/// Interior NULs cannot survive the C boundary.
fn into_cstring(text: String) -> *mut c_char {
    let sanitized = if text.contains('\0') {
        text.replace('\0', "")
    } else {
        text
    };
    match CString::new(sanitized) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

/// Create a surface sized `width`x`height` with `html` as initial content.
/// Returns the surface handle, or `-1` on invalid dimensions.
#[no_mangle]
pub extern "C" fn websurface_init(width: c_int, height: c_int, html: *const c_char) -> c_int {
    let html = cstr_arg(html);
    if width <= 0 || height <= 0 {
        log::warn!("websurface_init rejected dimensions {width}x{height}");
        return -1;
    }

    let config = ViewConfig::new(width as u32, height as u32);
    with_registry(|reg| match reg.create_surface(config, &html) {
        Ok(id) => id.index() as c_int,
        Err(e) => {
            log::warn!("websurface_init failed: {e}");
            -1
        }
    })
}

/// One synchronous update + paint pass over every live surface.
#[no_mangle]
pub extern "C" fn websurface_render() {
    with_registry(|reg| reg.render());
}

/// Lock and return the surface's RGBA8 frame. Null if the handle is invalid,
/// the surface has not been rendered yet, or the frame is already locked.
/// Pair every non-null return with one [`websurface_release_pixels`].
#[no_mangle]
pub extern "C" fn websurface_get_pixels(
    id: c_int,
    out_width: *mut c_int,
    out_height: *mut c_int,
    out_stride: *mut c_int,
) -> *const c_void {
    let Some(id) = surface_id(id) else {
        return std::ptr::null();
    };

    with_registry(|reg| {
        let Ok(view) = reg.view_mut(id) else {
            return std::ptr::null();
        };
        match view.lock_pixels() {
            Ok(frame) => {
                unsafe {
                    if !out_width.is_null() {
                        *out_width = frame.width as c_int;
                    }
                    if !out_height.is_null() {
                        *out_height = frame.height as c_int;
                    }
                    if !out_stride.is_null() {
                        *out_stride = frame.stride as c_int;
                    }
                }
                frame.pixels.as_ptr() as *const c_void
            }
            Err(e) => {
                log::debug!("websurface_get_pixels({}): {e}", id.index());
                std::ptr::null()
            }
        }
    })
}

/// Release the pixel lock. No-op on invalid handles or when nothing is
/// locked.
#[no_mangle]
pub extern "C" fn websurface_release_pixels(id: c_int) {
    let Some(id) = surface_id(id) else { return };
    with_registry(|reg| {
        if let Ok(view) = reg.view_mut(id) {
            view.unlock_pixels();
        }
    });
}

/// `button`: 0=none 1=left 2=middle 3=right. `kind`: "down", "up" or
/// "move"; anything else is treated as "up".
#[no_mangle]
pub extern "C" fn websurface_dispatch_mouse_event(
    id: c_int,
    x: c_int,
    y: c_int,
    button: c_int,
    kind: *const c_char,
) {
    let Some(id) = surface_id(id) else { return };
    let kind = MouseEventKind::parse(&cstr_arg(kind));
    let button = MouseButton::from_code(button);

    with_registry(|reg| {
        if let Ok(view) = reg.view_mut(id) {
            view.fire_mouse(kind, button, x, y);
        }
    });
}

/// Pixel-granularity scroll delta.
#[no_mangle]
pub extern "C" fn websurface_dispatch_scroll_event(id: c_int, dx: c_int, dy: c_int) {
    let Some(id) = surface_id(id) else { return };
    with_registry(|reg| {
        if let Ok(view) = reg.view_mut(id) {
            view.fire_scroll(dx, dy);
        }
    });
}

/// `kind`: "down" or "up". Dropped unless the surface has input focus.
#[no_mangle]
pub extern "C" fn websurface_dispatch_key_event(
    id: c_int,
    kind: *const c_char,
    key_code: c_int,
    modifiers: c_int,
    _text: *const c_char,
) {
    let Some(id) = surface_id(id) else { return };
    let kind = match KeyEventKind::parse(&cstr_arg(kind)) {
        Ok(kind) => kind,
        Err(e) => {
            log::debug!("websurface_dispatch_key_event: {e}");
            return;
        }
    };

    let modifiers = Modifiers::from_bits_truncate(modifiers as u32);
    let key_identifier = event::key_identifier(key_code);
    let input = match kind {
        KeyEventKind::Down => InputEvent::KeyDown {
            key_code,
            modifiers,
            key_identifier,
        },
        KeyEventKind::Up => InputEvent::KeyUp {
            key_code,
            modifiers,
            key_identifier,
        },
    };

    with_registry(|reg| {
        if let Ok(view) = reg.view_mut(id) {
            if let Err(e) = view.fire_key(input) {
                log::debug!("key event dropped on surface {}: {e}", id.index());
            }
        }
    });
}

/// Committed UTF-8 text input. Dropped unless the surface has input focus.
#[no_mangle]
pub extern "C" fn websurface_dispatch_char_event(id: c_int, text: *const c_char) {
    let Some(id) = surface_id(id) else { return };
    let text = cstr_arg(text);

    with_registry(|reg| {
        if let Ok(view) = reg.view_mut(id) {
            if let Err(e) = view.fire_char(&text) {
                log::debug!("char event dropped on surface {}: {e}", id.index());
            }
        }
    });
}

/// Queue a navigation. Returns false on an invalid handle or unparseable
/// URL; the load itself happens on the next render pass.
#[no_mangle]
pub extern "C" fn websurface_load_url(id: c_int, url: *const c_char) -> bool {
    let Some(id) = surface_id(id) else {
        return false;
    };
    let url = cstr_arg(url);

    with_registry(|reg| match reg.load_url(id, &url) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("websurface_load_url({}): {e}", id.index());
            false
        }
    })
}

#[no_mangle]
pub extern "C" fn websurface_is_focused(id: c_int) -> bool {
    let Some(id) = surface_id(id) else {
        return false;
    };
    with_registry(|reg| {
        reg.view(id)
            .map(|view| view.has_input_focus())
            .unwrap_or(false)
    })
}

/// Give the surface input focus. Surfaces are never auto-focused.
#[no_mangle]
pub extern "C" fn websurface_focus_view(id: c_int) {
    let Some(id) = surface_id(id) else { return };
    with_registry(|reg| {
        if let Ok(view) = reg.view_mut(id) {
            view.focus();
        }
    });
}

/// Tombstone the handle. Silently ignores invalid handles.
#[no_mangle]
pub extern "C" fn websurface_destroy_surface(id: c_int) {
    let Some(id) = surface_id(id) else { return };
    with_registry(|reg| reg.destroy_surface(id));
}

/// Drop the shared renderer. Ignored (with a warning) while surfaces are
/// still live.
#[no_mangle]
pub extern "C" fn websurface_destroy_renderer() {
    with_registry(|reg| {
        if let Err(e) = reg.destroy_renderer() {
            log::warn!("websurface_destroy_renderer: {e}");
        }
    });
}

/// Evaluate script, returning the string conversion of the result or of the
/// thrown value — the classic conflated shape. Null only on an invalid
/// handle. Release with [`websurface_free_string`].
#[no_mangle]
pub extern "C" fn websurface_evaluate_script(id: c_int, source: *const c_char) -> *mut c_char {
    let Some(id) = surface_id(id) else {
        return std::ptr::null_mut();
    };
    let source = cstr_arg(source);

    with_registry(|reg| match reg.evaluate_script(id, &source) {
        Ok(outcome) => into_cstring(outcome.text_compat().to_owned()),
        Err(e) => {
            log::debug!("websurface_evaluate_script({}): {e}", id.index());
            std::ptr::null_mut()
        }
    })
}

/// Evaluate script, returning `{"ok":bool,"text":string}` so callers can
/// tell success from a thrown value. Release with
/// [`websurface_free_string`].
#[no_mangle]
pub extern "C" fn websurface_evaluate_script_json(id: c_int, source: *const c_char) -> *mut c_char {
    let Some(id) = surface_id(id) else {
        return std::ptr::null_mut();
    };
    let source = cstr_arg(source);

    with_registry(|reg| match reg.evaluate_script(id, &source) {
        Ok(outcome) => match serde_json::to_string(&outcome) {
            Ok(json) => into_cstring(json),
            Err(e) => {
                log::warn!("cannot serialize eval outcome: {e}");
                std::ptr::null_mut()
            }
        },
        Err(e) => {
            log::debug!("websurface_evaluate_script_json({}): {e}", id.index());
            std::ptr::null_mut()
        }
    })
}

/// Release a string returned by this library. Null is a no-op.
#[no_mangle]
pub extern "C" fn websurface_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            drop(CString::from_raw(ptr));
        }
    }
}
