//! Image placement pattern selection.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Aspect ratio (`width / height`) at and above which `auto` places the image beside the text.
pub const SIDE_ASPECT_THRESHOLD: f32 = 1.3;
/// Below this aspect the canvas counts as tall for the shuffled odds.
const TALL_ASPECT_THRESHOLD: f32 = 0.8;

/// Placement requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternChoice {
    #[default]
    Auto,
    Side,
    Top,
    Left,
    None,
}

/// Resolved placement of the image relative to the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    /// Image column on the right.
    Side,
    /// Image band above the text.
    Top,
    /// Image column on the left.
    Left,
    None,
    /// Placed by the grid alternative.
    Grid,
}

impl Pattern {
    pub fn is_column(self) -> bool {
        matches!(self, Pattern::Side | Pattern::Left)
    }
}

/// Deterministic rule: no image → `None`; explicit choices are honored
/// verbatim; `auto` picks `Side` for wide canvases and `Top` otherwise.
pub fn choose(choice: PatternChoice, aspect: f32, has_image: bool) -> Pattern {
    if !has_image {
        return Pattern::None;
    }
    match choice {
        PatternChoice::Side => Pattern::Side,
        PatternChoice::Top => Pattern::Top,
        PatternChoice::Left => Pattern::Left,
        PatternChoice::None => Pattern::None,
        PatternChoice::Auto => {
            if aspect >= SIDE_ASPECT_THRESHOLD {
                Pattern::Side
            } else {
                Pattern::Top
            }
        }
    }
}

/// Aspect-banded random variant used for shuffled compositions.
///
/// Explicit choices still win; only `auto` is randomized.
pub fn choose_shuffled<R: Rng + ?Sized>(
    choice: PatternChoice,
    aspect: f32,
    has_image: bool,
    rng: &mut R,
) -> Pattern {
    if !has_image || choice != PatternChoice::Auto {
        return choose(choice, aspect, has_image);
    }
    // (side, left); the remainder goes to top.
    let (side, left) = if aspect >= SIDE_ASPECT_THRESHOLD {
        (0.5, 0.3)
    } else if aspect >= TALL_ASPECT_THRESHOLD {
        (0.3, 0.3)
    } else {
        (0.15, 0.15)
    };
    let roll: f64 = rng.gen();
    if roll < side {
        Pattern::Side
    } else if roll < side + left {
        Pattern::Left
    } else {
        Pattern::Top
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
