use crate::scale::Rgb;

/// Braille Unicode canvas for high-resolution terminal graphics.
/// Each character cell represents a 2x4 dot grid (8 dots) and carries one
/// foreground color for its dots and one background color.
/// Unicode Braille patterns: U+2800 to U+28FF
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    cells: Vec<Cell>,
    pen: Rgb,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub bits: u8,
    pub fg: Rgb,
    pub bg: Rgb,
}

impl BrailleCanvas {
    /// Create a new canvas with the given character dimensions, filled with
    /// `background`. Effective dot resolution: width*2 x height*4
    pub fn new(width: usize, height: usize, background: Rgb) -> Self {
        Self {
            width,
            height,
            cells: vec![
                Cell {
                    bits: 0,
                    fg: Rgb::WHITE,
                    bg: background,
                };
                width * height
            ],
            pen: Rgb::WHITE,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Color used by subsequent `set_pixel` calls
    pub fn set_pen(&mut self, color: Rgb) {
        self.pen = color;
    }

    /// Set a dot at the given coordinates in the pen color.
    /// Braille dot layout per character:
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let cx = x / 2;
        let cy = y / 4;

        if cx >= self.width || cy >= self.height {
            return;
        }

        let bit = match (x % 2, y % 4) {
            (0, 0) => 0x01,
            (1, 0) => 0x08,
            (0, 1) => 0x02,
            (1, 1) => 0x10,
            (0, 2) => 0x04,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => 0,
        };

        let pen = self.pen;
        let cell = &mut self.cells[cy * self.width + cx];
        cell.bits |= bit;
        cell.fg = pen;
    }

    /// Set a dot using signed coordinates (ignores negative values)
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    /// Composite `color` at `alpha` over a cell's background
    pub fn tint_cell(&mut self, cx: usize, cy: usize, color: Rgb, alpha: f64) {
        if cx >= self.width || cy >= self.height {
            return;
        }
        let cell = &mut self.cells[cy * self.width + cx];
        cell.bg = color.over(cell.bg, alpha);
    }

    pub fn cell(&self, cx: usize, cy: usize) -> Option<&Cell> {
        if cx >= self.width || cy >= self.height {
            return None;
        }
        self.cells.get(cy * self.width + cx)
    }

    /// Cells of one row with their Braille characters
    pub fn row(&self, row: usize) -> impl Iterator<Item = (char, &Cell)> + '_ {
        let start = row.min(self.height) * self.width;
        let end = if row < self.height { start + self.width } else { start };
        self.cells[start..end]
            .iter()
            .map(|c| (char::from_u32(0x2800 + c.bits as u32).unwrap_or(' '), c))
    }

    /// Convert the canvas dots to a string of Braille characters
    #[cfg(test)]
    pub fn to_string(&self) -> String {
        (0..self.height)
            .map(|r| self.row(r).map(|(ch, _)| ch).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pixel() {
        let mut canvas = BrailleCanvas::new(1, 1, Rgb::BLACK);
        canvas.set_pixel(0, 0);
        assert_eq!(canvas.to_string(), "⠁"); // U+2801
    }

    #[test]
    fn test_all_dots() {
        let mut canvas = BrailleCanvas::new(1, 1, Rgb::BLACK);
        for x in 0..2 {
            for y in 0..4 {
                canvas.set_pixel(x, y);
            }
        }
        assert_eq!(canvas.to_string(), "⣿"); // U+28FF (all dots)
    }

    #[test]
    fn test_diagonal() {
        let mut canvas = BrailleCanvas::new(2, 1, Rgb::BLACK);
        canvas.set_pixel(0, 0);
        canvas.set_pixel(1, 1);
        canvas.set_pixel(2, 2);
        canvas.set_pixel(3, 3);
        // First char: (0,0) and (1,1) = 0x01 | 0x10 = 0x11
        // Second char: (0,2) and (1,3) = 0x04 | 0x80 = 0x84
        assert_eq!(canvas.to_string(), "⠑⢄");
    }

    #[test]
    fn test_pen_colors_cell() {
        let mut canvas = BrailleCanvas::new(2, 1, Rgb::BLACK);
        canvas.set_pen(Rgb::new(230, 57, 70));
        canvas.set_pixel(3, 0);
        assert_eq!(canvas.cell(1, 0).unwrap().fg, Rgb::new(230, 57, 70));
        assert_eq!(canvas.cell(0, 0).unwrap().bits, 0);
    }

    #[test]
    fn test_tint_blends_background() {
        let mut canvas = BrailleCanvas::new(1, 1, Rgb::BLACK);
        canvas.tint_cell(0, 0, Rgb::new(200, 100, 0), 0.5);
        assert_eq!(canvas.cell(0, 0).unwrap().bg, Rgb::new(100, 50, 0));
        canvas.tint_cell(5, 5, Rgb::WHITE, 1.0);
    }
}
