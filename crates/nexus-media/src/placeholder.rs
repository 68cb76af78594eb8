//! Placeholder PNGs for species without a fetched image.
//!
//! The picture is a softened colour field with a darker border and, for
//! plants and animals, a small ellipse icon near the bottom edge. Colours
//! come from keywords in the species description, else from a stable hash
//! of the name.

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};

use crate::error::MediaError;
use crate::hash::stable_hash;

/// Colour families picked from description keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Organism {
    Plant,
    Animal,
    Fungus,
    Microbe,
}

impl Organism {
    /// First matching family for a description, checked in declaration order.
    #[must_use]
    pub fn from_description(description: &str) -> Option<Self> {
        let lower = description.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|word| lower.contains(word));
        if has(&["plant", "planta", "vegetal", "flora"]) {
            Some(Self::Plant)
        } else if has(&["animal", "fauna", "mammal", "bird"]) {
            Some(Self::Animal)
        } else if has(&["fungi", "fungo", "mushroom"]) {
            Some(Self::Fungus)
        } else if has(&["bacteria", "microb"]) {
            Some(Self::Microbe)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn base_colour(self) -> u32 {
        match self {
            Self::Plant => 0x4C_AF50,
            Self::Animal => 0xFF_9800,
            Self::Fungus => 0x8B_C34A,
            Self::Microbe => 0x21_96F3,
        }
    }
}

const BORDER_WIDTH: u32 = 3;
const BORDER_DARKEN: u8 = 40;
const SOFTEN: u8 = 80;
const SOFTEN_FLOOR: u8 = 50;

const LIGHT_GREEN: Rgb<u8> = Rgb([144, 238, 144]);
const DARK_GREEN: Rgb<u8> = Rgb([0, 100, 0]);
const LIGHT_YELLOW: Rgb<u8> = Rgb([255, 255, 224]);
const ORANGE: Rgb<u8> = Rgb([255, 165, 0]);

/// Base colour before softening.
#[must_use]
pub fn base_colour(name: &str, description: Option<&str>) -> u32 {
    description
        .and_then(Organism::from_description)
        .map_or_else(
            || {
                #[allow(clippy::cast_possible_truncation)]
                let hashed = (stable_hash(name) % 0xFF_FFFF) as u32;
                hashed
            },
            Organism::base_colour,
        )
}

/// Lift every channel by 80, keeping it within 50..=255.
#[must_use]
pub fn soften(colour: u32) -> Rgb<u8> {
    let channel = |shift: u32| {
        let value = u8::try_from((colour >> shift) & 0xFF).unwrap_or(u8::MAX);
        value.saturating_add(SOFTEN).max(SOFTEN_FLOOR)
    };
    Rgb([channel(16), channel(8), channel(0)])
}

fn darken(colour: Rgb<u8>) -> Rgb<u8> {
    Rgb(colour.0.map(|c| c.saturating_sub(BORDER_DARKEN)))
}

/// Fill the ellipse inscribed in `[x0, x1] x [y0, y1]`, with a one-pixel
/// outline.
fn draw_ellipse(img: &mut RgbImage, bounds: (i64, i64, i64, i64), fill: Rgb<u8>, outline: Rgb<u8>) {
    let (x0, y0, x1, y1) = bounds;
    #[allow(clippy::cast_precision_loss)]
    let (cx, cy, rx, ry) = (
        (x0 + x1) as f64 / 2.0,
        (y0 + y1) as f64 / 2.0,
        (x1 - x0) as f64 / 2.0,
        (y1 - y0) as f64 / 2.0,
    );
    if rx <= 0.0 || ry <= 0.0 {
        return;
    }
    let inner = |dx: f64, dy: f64, shrink: f64| {
        let (ax, ay) = (rx - shrink, ry - shrink);
        ax > 0.0 && ay > 0.0 && (dx / ax).powi(2) + (dy / ay).powi(2) <= 1.0
    };
    for y in y0.max(0)..=y1 {
        for x in x0.max(0)..=x1 {
            let (Ok(px), Ok(py)) = (u32::try_from(x), u32::try_from(y)) else {
                continue;
            };
            if px >= img.width() || py >= img.height() {
                continue;
            }
            #[allow(clippy::cast_precision_loss)]
            let (dx, dy) = (x as f64 - cx, y as f64 - cy);
            if inner(dx, dy, 1.0) {
                img.put_pixel(px, py, fill);
            } else if inner(dx, dy, 0.0) {
                img.put_pixel(px, py, outline);
            }
        }
    }
}

/// Render the placeholder as an RGB image.
///
/// # Errors
///
/// [`MediaError::InvalidSize`] for a zero width or height.
pub fn placeholder_image(
    name: &str,
    description: Option<&str>,
    width: u32,
    height: u32,
) -> Result<RgbImage, MediaError> {
    if width == 0 || height == 0 {
        return Err(MediaError::InvalidSize { width, height });
    }
    let colour = soften(base_colour(name, description));
    let border = darken(colour);
    let mut img = RgbImage::from_pixel(width, height, colour);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let edge = x < BORDER_WIDTH
            || y < BORDER_WIDTH
            || x >= width.saturating_sub(BORDER_WIDTH)
            || y >= height.saturating_sub(BORDER_WIDTH);
        if edge {
            *pixel = border;
        }
    }

    let lower = description.map(str::to_lowercase).unwrap_or_default();
    let cx = i64::from(width / 2);
    let icon_y = i64::from(height) - 50;
    if lower.contains("plant") {
        draw_ellipse(&mut img, (cx - 10, icon_y, cx + 10, icon_y + 20), LIGHT_GREEN, DARK_GREEN);
    } else if lower.contains("animal") {
        draw_ellipse(&mut img, (cx - 8, icon_y, cx + 8, icon_y + 16), LIGHT_YELLOW, ORANGE);
    }
    Ok(img)
}

/// Render the placeholder and encode it as PNG.
///
/// # Errors
///
/// [`MediaError::InvalidSize`] for a zero size, [`MediaError::Image`] if PNG
/// encoding fails.
pub fn placeholder_png(
    name: &str,
    description: Option<&str>,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, MediaError> {
    let img = placeholder_image(name, description, width, height)?;
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}
