/// Braille Unicode canvas for region outlines.
///
/// Each terminal cell holds a 2x4 dot grid (U+2800 to U+28FF), so borders
/// are drawn at twice the horizontal and four times the vertical resolution
/// of the choropleth fill underneath.
#[derive(Clone, Debug)]
pub struct BrailleCanvas {
    cols: usize,
    rows: usize,
    dots: Vec<u8>,
}

impl BrailleCanvas {
    /// Canvas of `cols` x `rows` cells (pixel size `cols*2` x `rows*4`)
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            dots: vec![0; cols * rows],
        }
    }

    /// Set a dot. Layout per cell:
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    pub fn set(&mut self, x: i32, y: i32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let (cx, cy) = (x / 2, y / 4);
        if cx >= self.cols || cy >= self.rows {
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
            _ => 0x80,
        };
        self.dots[cy * self.cols + cx] |= bit;
    }

    /// Braille glyph for a cell, or `None` when no dot is set
    pub fn glyph(&self, col: usize, row: usize) -> Option<char> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        match self.dots[row * self.cols + col] {
            0 => None,
            bits => char::from_u32(0x2800 + bits as u32),
        }
    }
}
