// Preview module: decodes images on demand and renders them with half-block characters

use crate::domain::FileDescriptor;
use crate::tui::format_file_size;
use image::{DynamicImage, GenericImageView, ImageError, Pixel};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

const MAX_IMAGE_WIDTH: u32 = 160;
/// Height is halved because we render 2 pixels per terminal row using half-blocks
const MAX_IMAGE_HEIGHT: u32 = 100;

/// Represents preview content that can be either plain text or styled image lines
#[derive(Debug, Clone)]
pub enum PreviewContent {
    /// Plain text lines
    Text(Vec<String>),
    /// Styled lines with color information
    Styled(Vec<Line<'static>>),
}

/// Why a preview could not be produced
#[derive(Debug, Error)]
pub enum PreviewError {
    /// The file vanished or cannot be read
    #[error("cannot read file: {0}")]
    Io(#[from] io::Error),

    /// The extension names an image format we have no decoder for
    #[error("no built-in preview for {0}")]
    Unsupported(String),

    /// The extension promised a decodable image but the content is not one
    #[error("not a valid image: {0}")]
    Decode(String),
}

/// Loads an image from a file path, sniffing the content before trusting the extension
pub fn load_image(path: &Path) -> Result<DynamicImage, PreviewError> {
    let reader = image::ImageReader::open(path)?.with_guessed_format()?;
    reader.decode().map_err(|e| match e {
        ImageError::IoError(io_err) => PreviewError::Io(io_err),
        other => PreviewError::Decode(other.to_string()),
    })
}

/// Calculates new dimensions to fit image within max width and height while preserving aspect ratio
pub fn calculate_resize_dimensions(
    original_width: u32,
    original_height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    if original_width == 0 || original_height == 0 {
        return (0, 0);
    }

    let width_ratio = max_width as f64 / original_width as f64;
    let height_ratio = max_height as f64 / original_height as f64;

    let ratio = width_ratio.min(height_ratio);

    if ratio >= 1.0 {
        // Never upscale
        (original_width, original_height)
    } else {
        let new_width = ((original_width as f64 * ratio) as u32).max(1);
        let new_height = ((original_height as f64 * ratio) as u32).max(1);
        (new_width, new_height)
    }
}

/// Converts an image to styled lines using half-block characters for terminal display.
///
/// The upper half block (▀) takes the upper pixel as foreground and the lower
/// pixel as background, so each cell shows two pixels.
pub fn image_to_halfblock_lines(img: &DynamicImage, width: u32, height: u32) -> Vec<Line<'static>> {
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let height = if height % 2 == 0 { height } else { height + 1 };

    // Triangle is fast enough for full-size sensor frames
    let img = img.resize_exact(width, height, image::imageops::FilterType::Triangle);
    let img = img.to_rgb8();

    let term_height = height / 2;
    let mut lines = Vec::with_capacity(term_height as usize);

    for y in 0..term_height {
        let upper_y = y * 2;
        let lower_y = upper_y + 1;

        let mut spans = Vec::with_capacity(width as usize);

        for x in 0..width {
            let upper_pixel = img.get_pixel(x, upper_y).to_rgb();
            let lower_pixel = if lower_y < height {
                img.get_pixel(x, lower_y).to_rgb()
            } else {
                upper_pixel
            };

            let style = Style::default()
                .fg(Color::Rgb(upper_pixel[0], upper_pixel[1], upper_pixel[2]))
                .bg(Color::Rgb(lower_pixel[0], lower_pixel[1], lower_pixel[2]));

            spans.push(Span::styled("▀", style));
        }

        lines.push(Line::from(spans));
    }

    lines
}

/// Decodes the descriptor's file and renders it for the preview pane.
///
/// Nothing is decoded while listing; this is the only place pixels are read.
pub fn generate_preview(descriptor: &FileDescriptor) -> Result<PreviewContent, PreviewError> {
    // Distinguish "gone" from "undecodable" before looking at the format
    fs::metadata(&descriptor.path)?;

    if !descriptor.format.is_decodable() {
        return Err(PreviewError::Unsupported(descriptor.type_label.clone()));
    }

    let img = load_image(&descriptor.path)?;
    let (original_width, original_height) = img.dimensions();

    let (new_width, new_height) = calculate_resize_dimensions(
        original_width,
        original_height,
        MAX_IMAGE_WIDTH,
        MAX_IMAGE_HEIGHT,
    );

    let header_style = Style::default().add_modifier(Modifier::BOLD);
    let info_style = Style::default().fg(Color::Gray);

    let mut lines: Vec<Line<'static>> = vec![
        Line::from(vec![
            Span::styled("Image: ", header_style),
            Span::styled(descriptor.name.clone(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::styled(descriptor.type_label.clone(), info_style),
            Span::raw("  "),
            Span::styled(
                format!("{}×{} px", original_width, original_height),
                info_style,
            ),
            Span::raw("  "),
            Span::styled(format_file_size(descriptor.size), info_style),
        ]),
        Line::from(""),
    ];

    lines.extend(image_to_halfblock_lines(&img, new_width, new_height));

    Ok(PreviewContent::Styled(lines))
}

/// Fallback text for a descriptor whose preview failed
pub fn describe_failure(descriptor: &FileDescriptor, error: &str) -> Vec<String> {
    vec![
        format!("Image: {}", descriptor.name),
        format!("Type: {}", descriptor.type_label),
        format!("Size: {}", format_file_size(descriptor.size)),
        String::new(),
        format!("[{}]", error),
        String::new(),
        "Press 'o' to open in your default viewer.".to_string(),
    ]
}
