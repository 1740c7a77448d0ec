use crate::error::RenderError;
use crate::media::decode_data_url;
use crate::render::CardRenderer;
use common::model::design::{CardConfig, Orientation};
use image::imageops::{self, FilterType};
use image::{load_from_memory, DynamicImage, Rgba, RgbaImage};
use log::debug;
use png::{BitDepth as PngBitDepth, ColorType as PngColorType, Encoder as PngEncoder};
use std::time::Duration;

/// CR80 card at 96 dpi, landscape.
const BASE_WIDTH: u32 = 324;
const BASE_HEIGHT: u32 = 204;
const PHOTO_WIDTH: u32 = 80;
const PHOTO_HEIGHT: u32 = 100;
const MARGIN: u32 = 12;
const LINE_HEIGHT: u32 = 14;
const BAR_HEIGHT: u32 = 6;
const CHAR_WIDTH: u32 = 6;

struct LoadedCard {
    config: CardConfig,
    photo: Option<DynamicImage>,
    primary: Rgba<u8>,
    secondary: Rgba<u8>,
    text: Rgba<u8>,
}

/// Offline render target that lays out a card raster directly.
///
/// Colours and the photo are drawn as configured; each visible field is drawn as
/// a text-coloured bar sized to its value. Remote photo URLs are not fetched.
#[derive(Default)]
pub struct RasterRenderer {
    loaded: Option<LoadedCard>,
}

impl RasterRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Parse `#rrggbb` (or `rrggbb`) into an opaque colour.
pub fn parse_hex_color(value: &str) -> Result<Rgba<u8>, RenderError> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(RenderError::Config(format!("invalid colour '{value}'")));
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0);
    Ok(Rgba([channel(0), channel(2), channel(4), 255]))
}

fn load_photo(reference: Option<&str>) -> Result<Option<DynamicImage>, RenderError> {
    let Some(reference) = reference.filter(|r| !r.trim().is_empty()) else {
        return Ok(None);
    };
    match decode_data_url(reference) {
        Some(Ok(bytes)) => Ok(Some(load_from_memory(&bytes)?)),
        Some(Err(e)) => Err(RenderError::Config(format!("photo is not valid base64: {e}"))),
        None => {
            debug!("Photo reference is not inline data; leaving the slot empty");
            Ok(None)
        }
    }
}

fn fill_rect(canvas: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    let x_end = (x + w).min(canvas.width());
    let y_end = (y + h).min(canvas.height());
    for py in y.min(y_end)..y_end {
        for px in x.min(x_end)..x_end {
            canvas.put_pixel(px, py, color);
        }
    }
}

impl LoadedCard {
    fn draw(&self, scale: u32) -> RgbaImage {
        let (base_w, base_h) = match self.config.design.orientation {
            Orientation::Horizontal => (BASE_WIDTH, BASE_HEIGHT),
            Orientation::Vertical => (BASE_HEIGHT, BASE_WIDTH),
        };
        let s = |v: u32| v * scale;
        let mut canvas = RgbaImage::from_pixel(s(base_w), s(base_h), self.secondary);

        let header = base_h * 22 / 100;
        fill_rect(&mut canvas, 0, 0, s(base_w), s(header), self.primary);

        let (photo_x, photo_y) = match self.config.design.orientation {
            Orientation::Horizontal => (MARGIN, header + MARGIN),
            Orientation::Vertical => ((base_w - PHOTO_WIDTH) / 2, header + MARGIN),
        };
        match &self.photo {
            Some(photo) => {
                let fitted = photo
                    .resize_to_fill(s(PHOTO_WIDTH), s(PHOTO_HEIGHT), FilterType::Lanczos3)
                    .to_rgba8();
                imageops::overlay(&mut canvas, &fitted, s(photo_x) as i64, s(photo_y) as i64);
            }
            None => fill_rect(
                &mut canvas,
                s(photo_x),
                s(photo_y),
                s(PHOTO_WIDTH),
                s(PHOTO_HEIGHT),
                Rgba([229, 231, 235, 255]),
            ),
        }

        let (text_x, mut text_y) = match self.config.design.orientation {
            Orientation::Horizontal => (photo_x + PHOTO_WIDTH + MARGIN, header + MARGIN),
            Orientation::Vertical => (MARGIN, photo_y + PHOTO_HEIGHT + MARGIN),
        };
        let max_bar = base_w.saturating_sub(text_x + MARGIN);
        for field in self.config.visible_fields() {
            if text_y + BAR_HEIGHT > base_h.saturating_sub(MARGIN) {
                break;
            }
            let width = (field.value.chars().count() as u32 * CHAR_WIDTH).min(max_bar);
            fill_rect(&mut canvas, s(text_x), s(text_y), s(width), s(BAR_HEIGHT), self.text);
            text_y += LINE_HEIGHT;
        }
        canvas
    }
}

impl CardRenderer for RasterRenderer {
    fn load(&mut self, config: &CardConfig) -> Result<(), RenderError> {
        let design = &config.design;
        let card = LoadedCard {
            primary: parse_hex_color(&design.primary_color)?,
            secondary: parse_hex_color(&design.secondary_color)?,
            text: parse_hex_color(&design.text_color)?,
            photo: load_photo(config.photo.as_deref())?,
            config: config.clone(),
        };
        self.loaded = Some(card);
        Ok(())
    }

    /// Layout happens synchronously in `capture`, so the target is always ready.
    fn wait_until_ready(&mut self, _bound: Duration) {}

    fn capture(&mut self, scale: u32) -> Result<Vec<u8>, RenderError> {
        let card = self.loaded.as_ref().ok_or(RenderError::NotLoaded)?;
        let canvas = card.draw(scale.max(1));
        let (w, h) = canvas.dimensions();

        let mut out = Vec::new();
        {
            let mut encoder = PngEncoder::new(&mut out, w, h);
            encoder.set_color(PngColorType::Rgba);
            encoder.set_depth(PngBitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(canvas.as_raw())?;
            writer.finish()?;
        }
        Ok(out)
    }
}
