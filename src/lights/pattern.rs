use smart_leds::RGB8;

pub const BLACK: RGB8 = RGB8 { r: 0, g: 0, b: 0 };
pub const RED: RGB8 = RGB8 { r: 255, g: 0, b: 0 };
pub const GREEN: RGB8 = RGB8 { r: 0, g: 255, b: 0 };
pub const BLUE: RGB8 = RGB8 { r: 0, g: 0, b: 255 };
pub const ORANGE: RGB8 = RGB8 { r: 255, g: 128, b: 0 };
pub const MAGENTA: RGB8 = RGB8 { r: 255, g: 0, b: 255 };
pub const WHITE: RGB8 = RGB8 { r: 255, g: 255, b: 255 };

/// Dimmed white used by the solid white pattern
pub const SOFT_WHITE: RGB8 = RGB8 { r: 200, g: 200, b: 200 };
pub const AMBER: RGB8 = RGB8 { r: 255, g: 110, b: 0 };
pub const PINK: RGB8 = RGB8 { r: 224, g: 25, b: 80 };

const FIVE_COLOR_CYCLE: [RGB8; 5] = [RED, GREEN, ORANGE, BLUE, MAGENTA];

/// Static single-frame patterns, in pattern id order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pattern {
    RedGreen,
    RedClearGreenClear,
    FiveColor,
    RedWhite,
    White,
    Orange,
    Pink,
}

impl Pattern {
    pub const ALL: [Pattern; 7] = [
        Pattern::RedGreen,
        Pattern::RedClearGreenClear,
        Pattern::FiveColor,
        Pattern::RedWhite,
        Pattern::White,
        Pattern::Orange,
        Pattern::Pink,
    ];

    /// Look up a pattern by its id. Anything outside the table is `None`,
    /// which callers treat as a clear.
    pub fn from_id(id: usize) -> Option<Pattern> {
        Self::ALL.get(id).copied()
    }

    /// Color of the pixel at `index`
    pub fn color_at(self, index: usize) -> RGB8 {
        match self {
            Pattern::RedGreen => {
                if index % 2 == 0 {
                    RED
                } else {
                    GREEN
                }
            }
            Pattern::RedClearGreenClear => {
                if index % 4 == 0 {
                    RED
                } else if index % 2 == 0 {
                    GREEN
                } else {
                    BLACK
                }
            }
            Pattern::FiveColor => FIVE_COLOR_CYCLE[index % FIVE_COLOR_CYCLE.len()],
            Pattern::RedWhite => {
                if index % 2 == 0 {
                    RED
                } else {
                    WHITE
                }
            }
            Pattern::White => SOFT_WHITE,
            Pattern::Orange => AMBER,
            Pattern::Pink => PINK,
        }
    }

    /// Fill a whole buffer. Does not touch the hardware.
    pub fn render(self, pixels: &mut [RGB8]) {
        for (i, pixel) in pixels.iter_mut().enumerate() {
            *pixel = self.color_at(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(pattern: Pattern, count: usize) -> Vec<RGB8> {
        let mut pixels = vec![BLACK; count];
        pattern.render(&mut pixels);
        pixels
    }

    #[test]
    fn ids_follow_table_order() {
        for (id, pattern) in Pattern::ALL.iter().enumerate() {
            assert_eq!(Pattern::from_id(id), Some(*pattern));
        }
        assert_eq!(Pattern::from_id(7), None);
        assert_eq!(Pattern::from_id(usize::MAX), None);
    }

    #[test]
    fn red_green_alternates() {
        assert_eq!(rendered(Pattern::RedGreen, 4), vec![RED, GREEN, RED, GREEN]);
    }

    #[test]
    fn red_clear_green_clear() {
        assert_eq!(
            rendered(Pattern::RedClearGreenClear, 9),
            vec![RED, BLACK, GREEN, BLACK, RED, BLACK, GREEN, BLACK, RED]
        );
    }

    #[test]
    fn five_color_cycle_on_99_pixels() {
        let pixels = rendered(Pattern::FiveColor, 99);
        assert_eq!(pixels[0], RED);
        assert_eq!(pixels[1], GREEN);
        assert_eq!(pixels[2], ORANGE);
        assert_eq!(pixels[3], BLUE);
        assert_eq!(pixels[4], MAGENTA);
        assert_eq!(pixels[5], RED);
        assert_eq!(pixels[6], GREEN);
        assert_eq!(pixels[98], BLUE);
    }

    #[test]
    fn red_white_alternates() {
        assert_eq!(rendered(Pattern::RedWhite, 3), vec![RED, WHITE, RED]);
    }

    #[test]
    fn solid_patterns_fill_everything() {
        for (pattern, color) in [
            (Pattern::White, RGB8::new(200, 200, 200)),
            (Pattern::Orange, RGB8::new(255, 110, 0)),
            (Pattern::Pink, RGB8::new(224, 25, 80)),
        ] {
            assert!(rendered(pattern, 17).iter().all(|&p| p == color));
        }
    }

    #[test]
    fn empty_buffer_is_fine() {
        assert!(rendered(Pattern::FiveColor, 0).is_empty());
    }
}
