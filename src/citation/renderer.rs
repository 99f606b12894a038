//! Citation rendering: text overlay onto a template image.
//!
//! Each field is drawn in solid black, centered on its configured position:
//! the text box is measured first and the draw origin is shifted by half its
//! width and height.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageOutputFormat, RgbImage};
use rusttype::{point, Font, PositionedGlyph, Scale};
use tracing::debug;

use crate::promotion::error::RenderError;
use crate::promotion::rules::CitationLayout;
use crate::promotion::traits::{CitationRenderer, TextField};

/// Encoded format of rendered citations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg { quality: u8 },
    Png,
}

impl OutputFormat {
    /// Pick the encoder from an output file extension. Anything that is not
    /// PNG is written as JPEG.
    pub fn from_extension(extension: &str, jpeg_quality: u8) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "png" => Self::Png,
            _ => Self::Jpeg {
                quality: jpeg_quality.clamp(1, 100),
            },
        }
    }
}

/// Pixel extent of a line of text measured from its layout origin
/// (top-left, baseline at the font ascent).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    pub width: f32,
    pub height: f32,
}

/// Renders citations with TrueType fonts onto decoded template images.
pub struct ImageCitationRenderer {
    fonts_dir: PathBuf,
    format: OutputFormat,
}

impl ImageCitationRenderer {
    pub fn new(fonts_dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
            format,
        }
    }

    /// Absolute or existing paths are used as-is, bare names resolve under
    /// the fonts directory.
    pub fn resolve_font(&self, font: &str) -> PathBuf {
        let path = Path::new(font);
        if path.is_absolute() || path.exists() {
            path.to_path_buf()
        } else {
            self.fonts_dir.join(path)
        }
    }
}

impl CitationRenderer for ImageCitationRenderer {
    fn render(
        &self,
        template: &Path,
        layout: &CitationLayout,
        fields: &[TextField],
    ) -> Result<Vec<u8>, RenderError> {
        // Every requested field must be placed before any drawing happens.
        let placements = fields
            .iter()
            .map(|field| {
                layout
                    .field(&field.name)
                    .map(|placement| (field, placement))
                    .ok_or_else(|| RenderError::MissingLayoutField(field.name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut canvas = load_template(template)?;
        let mut fonts: HashMap<PathBuf, Font<'static>> = HashMap::new();

        for (field, placement) in placements {
            let font = match fonts.entry(self.resolve_font(&placement.font)) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => {
                    let font = load_font(entry.key())?;
                    entry.insert(font)
                }
            };

            let scale = em_scale(font, placement.font_size);
            let extent = measure_text(font, scale, &field.value);
            let origin = (
                placement.pos.0 - extent.width / 2.0,
                placement.pos.1 - extent.height / 2.0,
            );
            debug!(
                field = %field.name,
                width = extent.width,
                height = extent.height,
                "Placing citation text"
            );
            draw_text(&mut canvas, font, scale, origin, &field.value);
        }

        encode(canvas, self.format)
    }
}

fn load_template(path: &Path) -> Result<RgbImage, RenderError> {
    let unreadable = |reason: String| RenderError::TemplateUnreadable {
        path: path.to_path_buf(),
        reason,
    };
    let bytes = fs::read(path).map_err(|e| unreadable(e.to_string()))?;
    let img = image::load_from_memory(&bytes).map_err(|e| unreadable(e.to_string()))?;
    Ok(img.to_rgb8())
}

fn load_font(path: &Path) -> Result<Font<'static>, RenderError> {
    let bytes = fs::read(path).map_err(|e| RenderError::FontUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Font::try_from_vec(bytes).ok_or_else(|| RenderError::FontUnreadable {
        path: path.to_path_buf(),
        reason: "not a TrueType/OpenType font".into(),
    })
}

/// Scale for a font size given as em pixels (TrueType point-size semantics).
pub fn em_scale(font: &Font<'_>, size: f32) -> Scale {
    let units_per_em = f32::from(font.units_per_em().max(1));
    let v = font.v_metrics_unscaled();
    Scale::uniform(size * (v.ascent - v.descent) / units_per_em)
}

fn layout_at(
    font: &Font<'static>,
    scale: Scale,
    origin: (f32, f32),
    text: &str,
) -> Vec<PositionedGlyph<'static>> {
    let ascent = font.v_metrics(scale).ascent;
    font.layout(text, scale, point(origin.0, origin.1 + ascent))
        .collect()
}

/// Extent from the layout origin to the far corner of the inked glyphs,
/// falling back to advance width and ascent for blank text.
pub fn measure_text(font: &Font<'static>, scale: Scale, text: &str) -> TextExtent {
    let glyphs = layout_at(font, scale, (0.0, 0.0), text);
    let mut width: f32 = 0.0;
    let mut height: f32 = font.v_metrics(scale).ascent;
    let mut inked = false;

    for glyph in &glyphs {
        let advance = glyph.position().x + glyph.unpositioned().h_metrics().advance_width;
        width = width.max(advance);
        if let Some(bb) = glyph.pixel_bounding_box() {
            if !inked {
                height = 0.0;
                inked = true;
            }
            width = width.max(bb.max.x as f32);
            height = height.max(bb.max.y as f32);
        }
    }

    TextExtent { width, height }
}

fn draw_text(
    canvas: &mut RgbImage,
    font: &Font<'static>,
    scale: Scale,
    origin: (f32, f32),
    text: &str,
) {
    let (w, h) = canvas.dimensions();
    for glyph in layout_at(font, scale, origin, text) {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let x = gx as i32 + bb.min.x;
            let y = gy as i32 + bb.min.y;
            if x < 0 || y < 0 || x as u32 >= w || y as u32 >= h {
                return;
            }
            let keep = 1.0 - coverage.clamp(0.0, 1.0);
            let pixel = canvas.get_pixel_mut(x as u32, y as u32);
            for channel in pixel.0.iter_mut() {
                *channel = (f32::from(*channel) * keep).round() as u8;
            }
        });
    }
}

fn encode(canvas: RgbImage, format: OutputFormat) -> Result<Vec<u8>, RenderError> {
    let output = match format {
        OutputFormat::Jpeg { quality } => ImageOutputFormat::Jpeg(quality),
        OutputFormat::Png => ImageOutputFormat::Png,
    };
    let mut cursor = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(canvas)
        .write_to(&mut cursor, output)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promotion::rules::FieldLayout;
    use image::Rgb;
    use std::collections::BTreeMap;

    const SYSTEM_FONTS: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/Library/Fonts/Arial.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];

    fn system_font() -> Option<PathBuf> {
        SYSTEM_FONTS.iter().map(PathBuf::from).find(|p| p.exists())
    }

    fn write_template(dir: &Path, width: u32, height: u32) -> PathBuf {
        let path = dir.join("SGT.png");
        let img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        DynamicImage::ImageRgb8(img).save(&path).unwrap();
        path
    }

    fn layout(font: &str, pos: (f32, f32)) -> CitationLayout {
        let mut fields = BTreeMap::new();
        fields.insert(
            "name".to_string(),
            FieldLayout {
                pos,
                font: font.to_string(),
                font_size: 40.0,
                date_text: None,
            },
        );
        CitationLayout::new(fields)
    }

    fn ink_bounds(img: &RgbImage) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (x, y, p) in img.enumerate_pixels() {
            if p.0.iter().any(|c| *c < 128) {
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
        bounds
    }

    #[test]
    fn output_format_from_extension() {
        assert_eq!(OutputFormat::from_extension("png", 90), OutputFormat::Png);
        assert_eq!(OutputFormat::from_extension("PNG", 90), OutputFormat::Png);
        assert_eq!(
            OutputFormat::from_extension("jpeg", 90),
            OutputFormat::Jpeg { quality: 90 }
        );
        assert_eq!(
            OutputFormat::from_extension("jpg", 0),
            OutputFormat::Jpeg { quality: 1 }
        );
    }

    #[test]
    fn bare_font_names_resolve_under_fonts_dir() {
        let renderer = ImageCitationRenderer::new("/srv/fonts", OutputFormat::Png);
        assert_eq!(
            renderer.resolve_font("OldEnglish.ttf"),
            PathBuf::from("/srv/fonts/OldEnglish.ttf")
        );
        assert_eq!(
            renderer.resolve_font("/opt/fonts/Garamond.ttf"),
            PathBuf::from("/opt/fonts/Garamond.ttf")
        );
    }

    #[test]
    fn missing_layout_field_fails_before_reading_template() {
        let renderer = ImageCitationRenderer::new("/srv/fonts", OutputFormat::Png);
        let err = renderer
            .render(
                Path::new("/nonexistent/SGT.png"),
                &layout("Serif.ttf", (10.0, 10.0)),
                &[TextField::new("date", "17TH of MARCH, 2020")],
            )
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingLayoutField(ref f) if f == "date"));
        assert!(err.is_configuration());
    }

    #[test]
    fn unreadable_template() {
        let renderer = ImageCitationRenderer::new("/srv/fonts", OutputFormat::Png);
        let err = renderer
            .render(
                Path::new("/nonexistent/SGT.png"),
                &layout("Serif.ttf", (10.0, 10.0)),
                &[TextField::new("name", "JOHN SMITH")],
            )
            .unwrap_err();
        assert!(matches!(err, RenderError::TemplateUnreadable { .. }));
    }

    #[test]
    fn corrupt_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SGT.jpeg");
        fs::write(&path, b"not an image").unwrap();
        let renderer = ImageCitationRenderer::new(dir.path(), OutputFormat::Png);
        let err = renderer
            .render(
                &path,
                &layout("Serif.ttf", (10.0, 10.0)),
                &[TextField::new("name", "JOHN SMITH")],
            )
            .unwrap_err();
        assert!(matches!(err, RenderError::TemplateUnreadable { .. }));
    }

    #[test]
    fn missing_font_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_template(dir.path(), 64, 32);
        let renderer = ImageCitationRenderer::new(dir.path(), OutputFormat::Png);
        let err = renderer
            .render(
                &template,
                &layout("Missing.ttf", (32.0, 16.0)),
                &[TextField::new("name", "JOHN SMITH")],
            )
            .unwrap_err();
        assert!(matches!(err, RenderError::FontUnreadable { ref path, .. } if path.ends_with("Missing.ttf")));
        assert!(!err.is_configuration());
    }

    #[test]
    fn invalid_font_file_is_render_error() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_template(dir.path(), 64, 32);
        fs::write(dir.path().join("Broken.ttf"), b"garbage").unwrap();
        let renderer = ImageCitationRenderer::new(dir.path(), OutputFormat::Png);
        let err = renderer
            .render(
                &template,
                &layout("Broken.ttf", (32.0, 16.0)),
                &[TextField::new("name", "JOHN SMITH")],
            )
            .unwrap_err();
        assert!(matches!(err, RenderError::FontUnreadable { .. }));
    }

    #[test]
    fn no_fields_reencodes_template() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_template(dir.path(), 40, 20);
        let renderer = ImageCitationRenderer::new(dir.path(), OutputFormat::Png);
        let bytes = renderer
            .render(&template, &CitationLayout::default(), &[])
            .unwrap();
        let img = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (40, 20));
        assert!(ink_bounds(&img).is_none());
    }

    #[test]
    fn text_is_centered_on_position() {
        let Some(font) = system_font() else {
            return;
        };
        let dir = tempfile::tempdir().unwrap();
        let template = write_template(dir.path(), 600, 200);
        let renderer = ImageCitationRenderer::new(dir.path(), OutputFormat::Png);
        let bytes = renderer
            .render(
                &template,
                &layout(&font.to_string_lossy(), (300.0, 100.0)),
                &[TextField::new("name", "JOHN ALLEN SMITH")],
            )
            .unwrap();

        let img = image::load_from_memory(&bytes).unwrap().to_rgb8();
        let (x0, y0, x1, y1) = ink_bounds(&img).expect("text drawn");
        let cx = (x0 + x1) as f32 / 2.0;
        let cy = (y0 + y1) as f32 / 2.0;
        assert!((cx - 300.0).abs() < 12.0, "horizontal center {cx}");
        assert!((cy - 100.0).abs() < 20.0, "vertical center {cy}");
    }

    #[test]
    fn fields_sharing_a_font_are_all_drawn() {
        let Some(font) = system_font() else {
            return;
        };
        let font = font.to_string_lossy().to_string();
        let mut fields = BTreeMap::new();
        for (name, y) in [("name", 50.0), ("date", 150.0)] {
            fields.insert(
                name.to_string(),
                FieldLayout {
                    pos: (300.0, y),
                    font: font.clone(),
                    font_size: 30.0,
                    date_text: None,
                },
            );
        }
        let dir = tempfile::tempdir().unwrap();
        let template = write_template(dir.path(), 600, 200);
        let renderer = ImageCitationRenderer::new(dir.path(), OutputFormat::Png);
        let bytes = renderer
            .render(
                &template,
                &CitationLayout::new(fields),
                &[
                    TextField::new("name", "JOHN ALLEN SMITH"),
                    TextField::new("date", "17th of March, 2020"),
                ],
            )
            .unwrap();

        let img = image::load_from_memory(&bytes).unwrap().to_rgb8();
        let inked = |rows: std::ops::Range<u32>| {
            img.enumerate_pixels()
                .any(|(_, y, p)| rows.contains(&y) && p.0.iter().any(|c| *c < 128))
        };
        assert!(inked(0..100));
        assert!(inked(100..200));
    }

    #[test]
    fn measured_extent_grows_with_text() {
        let Some(path) = system_font() else {
            return;
        };
        let font = load_font(&path).unwrap();
        let scale = em_scale(&font, 40.0);
        let short = measure_text(&font, scale, "SGT");
        let long = measure_text(&font, scale, "SERGEANT JOHN SMITH");
        assert!(long.width > short.width);
        assert!(short.height > 0.0);
    }

    #[test]
    fn jpeg_output_decodes() {
        let dir = tempfile::tempdir().unwrap();
        let template = write_template(dir.path(), 32, 32);
        let renderer =
            ImageCitationRenderer::new(dir.path(), OutputFormat::Jpeg { quality: 85 });
        let bytes = renderer
            .render(&template, &CitationLayout::default(), &[])
            .unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
