//! Theme colors for the command line output.
//!
//! - TABULA_SLATE: Main Color
//! - TABULA_AMBER: Errors

use colored::Color;

pub(crate) const TABULA_SLATE: Color = Color::TrueColor {
    r: 96,
    g: 165,
    b: 250,
};

pub(crate) const TABULA_AMBER: Color = Color::TrueColor {
    r: 245,
    g: 158,
    b: 11,
};
