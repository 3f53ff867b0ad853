//! Painting the dashboard: static chrome, the field table and the periodic
//! render loop.

mod screen;

use anyhow::{bail, Result};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::fields::{static_labels, CellStyle, FieldRegistry};
use crate::lock::lock_or_recover;
use crate::tasks::StopFlag;
use crate::utf8_safe::glyph_width;

pub use screen::{Cell, CrosstermScreen, MemoryScreen, Screen};

pub const MIN_COLS: u16 = 80;
pub const MIN_ROWS: u16 = 24;
pub const RENDER_PERIOD: Duration = Duration::from_millis(50);

/// Screen shared by the render loop and the input loop's manual redraw.
pub type SharedScreen = Arc<Mutex<Box<dyn Screen>>>;

pub fn shared_screen(screen: impl Screen + 'static) -> SharedScreen {
    Arc::new(Mutex::new(Box::new(screen)))
}

/// Draw `text` starting at (x, y), advancing by each glyph's display width.
fn print_at(screen: &mut dyn Screen, x: u16, y: u16, text: &str, style: CellStyle) -> Result<()> {
    let mut col = x;
    for ch in text.chars() {
        screen.set_cell(col, y, ch, style)?;
        col = col.saturating_add(glyph_width(ch) as u16);
    }
    Ok(())
}

pub fn check_terminal_size(screen: &dyn Screen) -> Result<()> {
    let (cols, rows) = screen.size()?;
    if cols < MIN_COLS || rows < MIN_ROWS {
        bail!(
            "Please resize terminal window to at least {MIN_COLS}x{MIN_ROWS} and restart program."
        );
    }
    Ok(())
}

/// Clear the screen and draw the title and section headings.
pub fn paint_static(screen: &mut dyn Screen) -> Result<()> {
    screen.clear()?;
    for label in static_labels() {
        print_at(screen, label.x, label.y, label.text, label.style)?;
    }
    screen.flush()
}

/// Draw every field label and padded value under one registry read lock.
pub fn paint_fields(screen: &mut dyn Screen, registry: &FieldRegistry) -> Result<()> {
    let mut result = Ok(());
    registry.for_each(|field| {
        if result.is_err() {
            return;
        }
        let label = &field.label;
        result = print_at(screen, label.x, label.y, label.text, label.style);
        if result.is_ok() {
            result = print_at(screen, field.x, field.y, &field.padded_value(), field.style);
        }
    });
    result?;
    screen.flush()
}

/// Full repaint: discard the terminal contents, then chrome and fields.
/// Running it twice leaves the same picture as once.
pub fn repaint_all(screen: &mut dyn Screen, registry: &FieldRegistry) -> Result<()> {
    screen.sync()?;
    paint_static(screen)?;
    paint_fields(screen, registry)
}

/// Manual redraw requested by the operator (`r` / Ctrl-L).
pub fn redraw(screen: &SharedScreen, registry: &FieldRegistry) -> Result<()> {
    let mut screen = lock_or_recover(screen, "redraw");
    repaint_all(&mut **screen, registry)
}

/// Repaint the field table every `RENDER_PERIOD` until stopped.
pub fn run_render_loop(
    screen: SharedScreen,
    registry: Arc<FieldRegistry>,
    stop: StopFlag,
) -> Result<()> {
    let mut frames = 0u64;
    while !stop.is_set() {
        {
            let mut screen = lock_or_recover(&screen, "render loop");
            if let Err(err) = paint_fields(&mut **screen, &registry) {
                tracing::warn!("render frame failed: {err:#}");
            }
        }
        frames += 1;
        thread::sleep(RENDER_PERIOD);
    }
    tracing::debug!("render loop stopped after {frames} frames");
    Ok(())
}
