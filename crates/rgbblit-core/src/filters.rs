use std::fmt;

use serde::{Deserialize, Serialize};

use crate::point::Rgb;

const TINT_FACTOR: f32 = 0.25;
const SHADE_FACTOR: f32 = 0.25;

/// A per-pixel color transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Filter {
    Grayscale,
    Invert,
    Lighten,
    Darken,
}

impl Filter {
    /// Look up a filter by its single-character code (`g`, `i`, `l`, `d`).
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'g' => Some(Self::Grayscale),
            'i' => Some(Self::Invert),
            'l' => Some(Self::Lighten),
            'd' => Some(Self::Darken),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Self::Grayscale => 'g',
            Self::Invert => 'i',
            Self::Lighten => 'l',
            Self::Darken => 'd',
        }
    }

    /// All built-in filters.
    pub fn all_builtin() -> Vec<Filter> {
        vec![Self::Grayscale, Self::Invert, Self::Lighten, Self::Darken]
    }

    pub fn apply(&self, color: Rgb) -> Rgb {
        match self {
            Self::Grayscale => {
                let avg = ((color.r as u16 + color.g as u16 + color.b as u16) / 3) as u8;
                Rgb::new(avg, avg, avg)
            }
            Self::Invert => color.map(|c| 0xff - c),
            // Float result truncates on the cast back to u8.
            Self::Lighten => color.map(|c| (c as f32 + (0xff - c) as f32 * TINT_FACTOR) as u8),
            Self::Darken => color.map(|c| (c as f32 * (1.0 - SHADE_FACTOR)) as u8),
        }
    }
}

/// Ordered list of filters applied to every pixel before it is sent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FilterChain {
    filters: Vec<Filter>,
}

impl FilterChain {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self { filters }
    }

    /// Parse a filter string such as `"gil"`. Unrecognized characters are skipped.
    pub fn parse(codes: &str) -> Self {
        Self {
            filters: codes.chars().filter_map(Filter::from_code).collect(),
        }
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run every filter in order.
    pub fn apply(&self, color: Rgb) -> Rgb {
        self.filters.iter().fold(color, |c, f| f.apply(c))
    }
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for filter in &self.filters {
            write!(f, "{}", filter.code())?;
        }
        Ok(())
    }
}
