//! Bar spectrum over a fixed radial glow.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    widgets::{Block, Widget},
};

const EIGHTHS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

// Gradient endpoints, bottom to top.
const LOW: (u8, u8, u8) = (32, 196, 178);
const HIGH: (u8, u8, u8) = (214, 84, 226);
const GLOW: (u8, u8, u8) = (58, 30, 82);
const BACKDROP: (u8, u8, u8) = (12, 10, 20);

pub struct Spectrum<'a> {
    bins: &'a [f32],
    block: Option<Block<'a>>,
}

impl<'a> Spectrum<'a> {
    pub fn new(bins: &'a [f32]) -> Self {
        Self { bins, block: None }
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

fn lerp(a: (u8, u8, u8), b: (u8, u8, u8), t: f32) -> Color {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f32 + (y as f32 - x as f32) * t).round() as u8;
    Color::Rgb(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Collapse or stretch `bins` onto `cols` columns. When there are more bins
/// than columns, neighbouring bins are averaged.
pub(crate) fn columns(bins: &[f32], cols: usize) -> Vec<f32> {
    if bins.is_empty() || cols == 0 {
        return vec![0.0; cols];
    }
    (0..cols)
        .map(|c| {
            let lo = c * bins.len() / cols;
            let hi = ((c + 1) * bins.len() / cols).max(lo + 1).min(bins.len());
            let slice = &bins[lo..hi];
            slice.iter().sum::<f32>() / slice.len() as f32
        })
        .collect()
}

impl Widget for Spectrum<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let cols = inner.width as usize;
        let rows = inner.height as usize;

        // Glow: brightest at the centre, fading towards the corners. Cells
        // are about twice as tall as wide, hence the vertical stretch.
        let cx = (cols as f32 - 1.0) / 2.0;
        let cy = (rows as f32 - 1.0) / 2.0;
        let radius = (cx * cx + (cy * 2.0) * (cy * 2.0)).sqrt().max(1.0);
        for y in 0..rows {
            for x in 0..cols {
                let dx = x as f32 - cx;
                let dy = (y as f32 - cy) * 2.0;
                let d = (dx * dx + dy * dy).sqrt() / radius;
                let bg = lerp(GLOW, BACKDROP, d);
                buf[(inner.x + x as u16, inner.y + y as u16)]
                    .set_char(' ')
                    .set_bg(bg);
            }
        }

        let levels = columns(self.bins, cols);
        let total = rows * 8;
        for (x, level) in levels.iter().enumerate() {
            let height = (level.clamp(0.0, 1.0) * total as f32).round() as usize;
            for row in 0..rows {
                // row 0 is the bottom line
                let filled = height.saturating_sub(row * 8).min(8);
                if filled == 0 {
                    break;
                }
                let y = inner.y + (rows - 1 - row) as u16;
                let fg = lerp(LOW, HIGH, row as f32 / rows.max(2).saturating_sub(1) as f32);
                buf[(inner.x + x as u16, y)]
                    .set_char(EIGHTHS[filled - 1])
                    .set_fg(fg);
            }
        }
    }
}
