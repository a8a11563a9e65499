//! Headless snapshot: create a surface, pump one render pass, and write the
//! resulting frame to `snapshot.png` in the working directory.

use websurface::{Registry, SurfaceError, ViewConfig};

fn main() -> Result<(), SurfaceError> {
    let mut registry = Registry::new();

    let id = registry.create_surface(
        ViewConfig::new(320, 240),
        "<html>\
           <title>Snapshot demo</title>\
           <body><h1>Hello from an off-screen surface</h1></body>\
         </html>",
    )?;

    // Poke the page's JS world before rendering.
    let outcome = registry.evaluate_script(id, "var greeting = 'hi'; greeting + '!'")?;
    println!("script said: {} (ok: {})", outcome.text, outcome.ok);

    registry.render();

    {
        let view = registry.view_mut(id)?;
        let title = view.title().to_string();
        let frame = view.lock_pixels()?;
        println!(
            "rendered {:?}: {}x{} stride {}",
            title, frame.width, frame.height, frame.stride
        );
    }

    let view = registry.view_mut(id)?;
    view.unlock_pixels();

    if let Some(bitmap) = view.bitmap() {
        let file = std::fs::File::create("snapshot.png")
            .map_err(|e| SurfaceError::Load(e.to_string()))?;
        bitmap
            .write_png(file)
            .map_err(|e| SurfaceError::Load(e.to_string()))?;
        println!("wrote snapshot.png");
    }

    registry.destroy_surface(id);
    registry.destroy_renderer()?;
    Ok(())
}
