//! Terminal front-end: all terminal I/O lives here.
//!
//! The simulation hands sprites to [`TerminalCanvas`] through the
//! [`Canvas`] trait; the canvas maps world pixels onto terminal cells and
//! buffers one glyph per cell. `render` then writes the border, the buffered
//! cells, the HUD and any overlay in one flush.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use shmup_core::context::{Playfield, SimulationContext};
use shmup_core::entities::{ImageFrame, Level, ShotOwner};
use shmup_core::render::{draw_world, Canvas, Layer, Mask};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_ENERGY: Color = Color::Red;
const C_HUD_GUNS: Color = Color::Cyan;
const C_SHIP: Color = Color::White;
const C_ENEMY: Color = Color::Green;
const C_SHOT_FRIEND: Color = Color::Cyan;
const C_SHOT_ENEMY: Color = Color::Magenta;
const C_GEM: Color = Color::Yellow;
const C_ATTACHMENT: Color = Color::Blue;
const C_HINT: Color = Color::DarkGrey;
const C_PAUSED: Color = Color::Yellow;

/// Rows above and below the playfield: HUD + top border, bottom border + hint.
const TOP_ROWS: u16 = 2;
const BOTTOM_ROWS: u16 = 2;

// ── Canvas ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
struct Cell {
    col: u16,
    row: u16,
    glyph: char,
    color: Color,
}

/// Buffers the world as terminal cells, scaled from world pixels.
pub struct TerminalCanvas {
    cols: u16,
    rows: u16,
    field: Playfield,
    cells: Vec<Cell>,
}

impl TerminalCanvas {
    pub fn new(cols: u16, rows: u16, field: Playfield) -> Self {
        Self {
            cols,
            rows,
            field,
            cells: Vec::new(),
        }
    }

    fn inner_size(&self) -> (f32, f32) {
        (
            f32::from(self.cols.saturating_sub(2).max(1)),
            f32::from(self.rows.saturating_sub(TOP_ROWS + BOTTOM_ROWS).max(1)),
        )
    }

    /// Cell span covered by a sprite, clipped to the playfield interior.
    fn span(&self, image: &ImageFrame, x: f32, y: f32) -> Option<(u16, u16, u16, u16)> {
        let (iw, ih) = self.inner_size();
        let sx = iw / self.field.width;
        let sy = ih / self.field.height;
        let c0 = (x * sx).floor();
        let r0 = (y * sy).floor();
        let c1 = ((x + image.width as f32) * sx).ceil().max(c0 + 1.0);
        let r1 = ((y + image.height as f32) * sy).ceil().max(r0 + 1.0);
        if c1 <= 0.0 || r1 <= 0.0 || c0 >= iw || r0 >= ih {
            return None;
        }
        let clip = |v: f32, max: f32| v.clamp(0.0, max) as u16;
        Some((clip(c0, iw), clip(r0, ih), clip(c1, iw), clip(r1, ih)))
    }

    fn fill(&mut self, image: &ImageFrame, x: f32, y: f32, glyph: char, color: Color) {
        let Some((c0, r0, c1, r1)) = self.span(image, x, y) else {
            return;
        };
        for row in r0..r1 {
            for col in c0..c1 {
                self.cells.push(Cell {
                    col: col + 1,
                    row: row + TOP_ROWS,
                    glyph,
                    color,
                });
            }
        }
    }
}

fn layer_style(layer: Layer) -> (char, Color) {
    match layer {
        Layer::Gem => ('◆', C_GEM),
        Layer::Enemy => ('▓', C_ENEMY),
        Layer::Shot(ShotOwner::Friend) => ('║', C_SHOT_FRIEND),
        Layer::Shot(ShotOwner::Enemy) => ('•', C_SHOT_ENEMY),
        Layer::Attachment => ('o', C_ATTACHMENT),
        Layer::Ship => ('▲', C_SHIP),
    }
}

/// Darkening grey ramp, step 0 brightest.
fn fade_color(step: u32) -> Color {
    let v = 255u32.saturating_sub(step * 23) as u8;
    Color::Rgb { r: v, g: v, b: v }
}

impl Canvas for TerminalCanvas {
    fn draw_sprite(&mut self, layer: Layer, image: &ImageFrame, x: f32, y: f32) {
        let (glyph, color) = layer_style(layer);
        self.fill(image, x, y, glyph, color);
    }

    fn draw_sprite_masked(&mut self, layer: Layer, mask: Mask, image: &ImageFrame, x: f32, y: f32) {
        let (glyph, _) = layer_style(layer);
        let color = match mask {
            Mask::White => Color::White,
            Mask::Fade(step) => fade_color(step),
        };
        self.fill(image, x, y, glyph, color);
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, ctx: &SimulationContext, paused: bool) -> std::io::Result<()> {
    let (cols, rows) = terminal::size()?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, cols, rows)?;

    let mut canvas = TerminalCanvas::new(cols, rows, ctx.field);
    draw_world(ctx, &mut canvas);
    for cell in &canvas.cells {
        out.queue(cursor::MoveTo(cell.col, cell.row))?;
        out.queue(style::SetForegroundColor(cell.color))?;
        out.queue(Print(cell.glyph))?;
    }

    draw_hud(out, ctx, cols)?;
    draw_controls_hint(out, rows)?;

    if ctx.is_game_over() {
        draw_game_over(out, ctx, cols, rows)?;
    } else if paused {
        draw_centered(out, cols, rows / 2, "-- PAUSED --", C_PAUSED)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, cols: u16, rows: u16) -> std::io::Result<()> {
    let w = cols as usize;
    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, rows.saturating_sub(BOTTOM_ROWS)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in TOP_ROWS..rows.saturating_sub(BOTTOM_ROWS) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, ctx: &SimulationContext, cols: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!(
        "Score:{:>8}  Hi:{:>8}  x{}",
        ctx.score,
        ctx.high_score,
        1u32 << ctx.multiplier
    )))?;

    let level_str = match ctx.level {
        Level::Easy => "[ EASY ]",
        Level::Medium => "[ MEDIUM ]",
        Level::Hard => "[ HARD ]",
    };
    let level_color = match ctx.level {
        Level::Easy => Color::Green,
        Level::Medium => Color::Yellow,
        Level::Hard => Color::Red,
    };
    let lx = (cols / 2).saturating_sub(level_str.len() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(level_color))?;
    out.queue(Print(level_str))?;

    // Guns + energy gauge, right-aligned
    let ship = &ctx.ship.sprite;
    let filled = if ship.max_energy > 0 {
        (ship.energy.max(0) * 10 / ship.max_energy) as usize
    } else {
        0
    };
    let guns_str = format!(
        "Gun:{} Sat:{} Stage:{} ",
        ctx.ship.gun_level,
        ctx.satellites.len(),
        ctx.stage + 1
    );
    let energy_str = format!("[{}{}]", "█".repeat(filled), "·".repeat(10 - filled.min(10)));
    let width = guns_str.chars().count() + energy_str.chars().count();
    let rx = cols.saturating_sub(width as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_GUNS))?;
    out.queue(Print(&guns_str))?;
    out.queue(style::SetForegroundColor(C_HUD_ENERGY))?;
    out.queue(Print(&energy_str))?;
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, rows: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("←↑↓→ / WASD : Move   SPACE : Fire   P : Pause   Q : Quit"))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_centered<W: Write>(
    out: &mut W,
    cols: u16,
    row: u16,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    let col = (cols / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

fn draw_game_over<W: Write>(
    out: &mut W,
    ctx: &SimulationContext,
    cols: u16,
    rows: u16,
) -> std::io::Result<()> {
    let new_best = ctx.score >= ctx.high_score && ctx.score > 0;
    let score_line = format!("Final Score: {:>8}", ctx.score);
    let best_line = if new_best {
        format!("★ NEW BEST: {:>8} ★", ctx.high_score)
    } else {
        format!("Best Score:  {:>8}", ctx.high_score)
    };

    let lines: [(&str, Color); 6] = [
        ("╔════════════════════╗", Color::Red),
        ("║    GAME  OVER      ║", Color::Red),
        ("╚════════════════════╝", Color::Red),
        (&score_line, Color::Yellow),
        (
            &best_line,
            if new_best { Color::Yellow } else { Color::DarkGrey },
        ),
        ("R - Play Again  Q - Quit", Color::White),
    ];
    let start_row = (rows / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (text, color)) in lines.iter().enumerate() {
        draw_centered(out, cols, start_row + i as u16, text, *color)?;
    }
    Ok(())
}
