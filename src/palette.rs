use std::fmt;

use ratatui::style::Color;

use crate::scoring::LEARNED_THRESHOLD;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaletteColor {
    tui: Color,
    ansi: &'static str,
}

impl PaletteColor {
    pub const fn new(tui: Color, ansi: &'static str) -> Self {
        Self { tui, ansi }
    }

    pub const fn tui(self) -> Color {
        self.tui
    }

    pub const fn ansi(self) -> &'static str {
        self.ansi
    }
}

pub struct Palette;

/// Growth-stage colors, soil to blossom. Mastery displays walk this ramp.
impl Palette {
    pub const RESET: &'static str = "\x1b[0m";
    pub const DIM: &'static str = "\x1b[2m";

    pub const BLOSSOM: PaletteColor =
        PaletteColor::new(Color::Rgb(215, 95, 135), "\x1b[38;5;168m");
    pub const LEAF: PaletteColor = PaletteColor::new(Color::Rgb(95, 175, 95), "\x1b[38;5;71m");
    pub const POLLEN: PaletteColor = PaletteColor::new(Color::Rgb(215, 175, 0), "\x1b[38;5;178m");
    pub const SKY: PaletteColor = PaletteColor::new(Color::Rgb(95, 175, 215), "\x1b[38;5;74m");
    pub const SOIL: PaletteColor = PaletteColor::new(Color::Rgb(135, 95, 0), "\x1b[38;5;94m");

    pub fn mastery(correct_count: u32) -> PaletteColor {
        if correct_count >= LEARNED_THRESHOLD {
            Self::LEAF
        } else {
            match correct_count {
                0 => Self::SOIL,
                1 => Self::POLLEN,
                _ => Self::SKY,
            }
        }
    }

    pub fn paint(color: PaletteColor, value: impl fmt::Display) -> String {
        format!("{}{}{}", color.ansi(), value, Self::RESET)
    }

    pub fn dim(value: impl fmt::Display) -> String {
        format!("{}{}{}", Self::DIM, value, Self::RESET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mastery_ramp_ends_at_leaf() {
        assert_eq!(Palette::mastery(0), Palette::SOIL);
        assert_eq!(Palette::mastery(1), Palette::POLLEN);
        assert_eq!(Palette::mastery(2), Palette::SKY);
        assert_eq!(Palette::mastery(3), Palette::LEAF);
        assert_eq!(Palette::mastery(9), Palette::LEAF);
    }

    #[test]
    fn paint_wraps_in_escape_codes() {
        let painted = Palette::paint(Palette::BLOSSOM, "rose");
        assert!(painted.starts_with(Palette::BLOSSOM.ansi()));
        assert!(painted.ends_with(Palette::RESET));
    }
}
