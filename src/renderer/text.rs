//! ASCII arena for terminals
//!
//! The arena is scaled onto a character grid. Layers are drawn back to
//! front: particles, power-up, paddles, ball, then the overlay banner.

use std::io::Write;

use glam::Vec2;

use super::Renderer;
use crate::sim::{PowerUpKind, Snapshot};

const DEFAULT_COLS: usize = 80;
const DEFAULT_ROWS: usize = 30;

pub struct TextRenderer<W: Write> {
    out: W,
    cols: usize,
    rows: usize,
    clear_screen: bool,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            clear_screen: false,
        }
    }

    /// Grid size in characters, at least 2x2
    pub fn with_size(mut self, cols: usize, rows: usize) -> Self {
        self.cols = cols.max(2);
        self.rows = rows.max(2);
        self
    }

    /// Home the cursor and clear the terminal before every frame
    pub fn with_clear_screen(mut self, clear: bool) -> Self {
        self.clear_screen = clear;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn column(&self, x: f32, arena: Vec2) -> Option<usize> {
        scale(x, arena.x, self.cols)
    }

    fn row(&self, y: f32, arena: Vec2) -> Option<usize> {
        scale(y, arena.y, self.rows)
    }

    fn plot(&self, grid: &mut [Vec<char>], arena: Vec2, pos: Vec2, glyph: char) {
        if let (Some(c), Some(r)) = (self.column(pos.x, arena), self.row(pos.y, arena)) {
            grid[r][c] = glyph;
        }
    }

    /// Draw the frame as text, header line included
    pub fn draw(&self, snap: &Snapshot) -> String {
        let mut grid = vec![vec![' '; self.cols]; self.rows];

        for particle in &snap.particles {
            self.plot(&mut grid, snap.arena, particle.pos, '.');
        }

        if let Some(powerup) = &snap.powerup {
            let glyph = match powerup.kind {
                PowerUpKind::SpeedBoost => '>',
                PowerUpKind::SizeBoost => '+',
            };
            self.plot(&mut grid, snap.arena, powerup.pos, glyph);
        }

        for paddle in &snap.paddles {
            let Some(col) = self.column(paddle.pos.x + paddle.size.x / 2.0, snap.arena) else {
                continue;
            };
            let top = self.row(paddle.pos.y, snap.arena).unwrap_or(0);
            // Half a pixel in so an edge on a row boundary doesn't spill over
            let bottom = self
                .row(paddle.pos.y + paddle.size.y - 0.5, snap.arena)
                .unwrap_or(self.rows - 1);
            for row in grid.iter_mut().take(bottom + 1).skip(top) {
                row[col] = '#';
            }
        }

        if snap.ball.active {
            self.plot(&mut grid, snap.arena, snap.ball.pos, 'O');
        }

        if let Some(banner) = &snap.banner {
            let lines: Vec<&str> = banner.lines().collect();
            let first = (self.rows / 2).saturating_sub(lines.len() / 2);
            for (i, line) in lines.iter().enumerate() {
                let Some(row) = grid.get_mut(first + i) else {
                    break;
                };
                let text: Vec<char> = line.chars().take(self.cols).collect();
                let start = (self.cols - text.len()) / 2;
                row[start..start + text.len()].copy_from_slice(&text);
            }
        }

        let mut frame = String::with_capacity((self.cols + 3) * (self.rows + 3));
        frame.push_str(&header(snap));
        frame.push('\n');
        let border = format!("+{}+\n", "-".repeat(self.cols));
        frame.push_str(&border);
        for row in &grid {
            frame.push('|');
            frame.extend(row.iter());
            frame.push_str("|\n");
        }
        frame.push_str(&border);
        frame
    }
}

/// Map an arena coordinate to a cell index, `None` when outside
fn scale(value: f32, extent: f32, cells: usize) -> Option<usize> {
    if !(value >= 0.0 && value < extent) {
        return None;
    }
    let cell = (value / extent * cells as f32) as usize;
    Some(cell.min(cells - 1))
}

fn header(snap: &Snapshot) -> String {
    let mut line = format!("P1 {:>2}  |  P2 {:>2}", snap.scores[0], snap.scores[1]);
    if let Some(effect) = &snap.effect {
        line.push_str(&format!(
            "   boost P{} ({})",
            effect.beneficiary.number(),
            effect.ticks_left
        ));
    }
    if !snap.sound_enabled {
        line.push_str("   [muted]");
    }
    line
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, snapshot: &Snapshot) -> std::io::Result<()> {
        let frame = self.draw(snapshot);
        if self.clear_screen {
            self.out.write_all(b"\x1b[2J\x1b[H")?;
        }
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::RecordingSink;
    use crate::config::MatchConfig;
    use crate::platform::TimerQueue;
    use crate::sim::{Command, Match};

    fn new_match() -> Match<RecordingSink, TimerQueue> {
        Match::new(
            MatchConfig::default(),
            3,
            RecordingSink::default(),
            TimerQueue::new(),
        )
        .expect("default config is valid")
    }

    fn grid_rows(frame: &str) -> Vec<Vec<char>> {
        // Skip header and top border, strip side borders
        frame
            .lines()
            .skip(2)
            .take(DEFAULT_ROWS)
            .map(|line| line.chars().skip(1).take(DEFAULT_COLS).collect())
            .collect()
    }

    #[test]
    fn test_scale() {
        assert_eq!(scale(0.0, 800.0, 80), Some(0));
        assert_eq!(scale(799.9, 800.0, 80), Some(79));
        assert_eq!(scale(800.0, 800.0, 80), None);
        assert_eq!(scale(-1.0, 800.0, 80), None);
        assert_eq!(scale(f32::NAN, 800.0, 80), None);
    }

    #[test]
    fn test_playing_frame_layout() {
        let mut game = new_match();
        game.command(Command::Start);
        let renderer = TextRenderer::new(Vec::new());
        let frame = renderer.draw(&game.snapshot());

        assert!(frame.starts_with("P1  0  |  P2  0"));
        let rows = grid_rows(&frame);
        assert_eq!(rows.len(), DEFAULT_ROWS);
        assert_eq!(rows[15][40], 'O');
        // Left paddle covers y 250..350 -> rows 12..=17 at column 3
        for row in 12..=17 {
            assert_eq!(rows[row][3], '#');
        }
        assert_eq!(rows[11][3], ' ');
        assert_eq!(rows[18][3], ' ');
        // Right paddle at x 755..770 -> column 76
        assert_eq!(rows[15][76], '#');
    }

    #[test]
    fn test_banner_overlay() {
        let game = new_match();
        let frame = TextRenderer::new(Vec::new()).draw(&game.snapshot());
        assert!(frame.contains("Press ENTER to Start"));
    }

    #[test]
    fn test_muted_header() {
        let mut game = new_match();
        game.command(Command::ToggleSound);
        let frame = TextRenderer::new(Vec::new()).draw(&game.snapshot());
        assert!(frame.lines().next().is_some_and(|l| l.ends_with("[muted]")));
    }

    #[test]
    fn test_render_writes_frame() {
        let game = new_match();
        let mut renderer = TextRenderer::new(Vec::new())
            .with_size(40, 10)
            .with_clear_screen(true);
        renderer.render(&game.snapshot()).expect("render");
        let out = String::from_utf8(renderer.into_inner()).expect("utf8");
        assert!(out.starts_with("\x1b[2J\x1b[H"));
        // Header, two borders, ten rows
        assert_eq!(out.lines().count(), 13);
    }
}
