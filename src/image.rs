use std::fmt::Display;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

pub type Pixel = u8;

#[derive(Error, Debug, Diagnostic)]
pub enum ImageError {
    #[error("an image needs a non-zero width and height, got {width}x{height}")]
    ZeroDimension { width: usize, height: usize },

    #[error("a {width}x{height} image has more pixels than can be addressed")]
    TooLarge { width: usize, height: usize },

    #[error("a {width}x{height} image needs {expected} pixels, got {actual}")]
    PixelCount {
        width: usize,
        height: usize,
        expected: usize,
        actual: usize,
    },

    #[error("row {row} has {actual} pixels, expected {expected}")]
    #[diagnostic(help("every row of an image must have the same width"))]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("'{token}' is not a pixel value")]
    #[diagnostic(help("pixels are decimal codes between 0 and 255"))]
    InvalidPixel {
        token: String,

        #[source_code]
        src: NamedSource<String>,

        #[label("this pixel")]
        bad_bit: SourceSpan,
    },
}

/// `width * height`, or [`ImageError::TooLarge`] when that overflows.
pub fn pixel_count(width: usize, height: usize) -> Result<usize, ImageError> {
    width
        .checked_mul(height)
        .ok_or(ImageError::TooLarge { width, height })
}

/// A grayscale grid of `width * height` pixels, stored row by row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl Image {
    pub fn new(width: usize, height: usize, pixels: Vec<Pixel>) -> Result<Self, ImageError> {
        if width == 0 || height == 0 {
            return Err(ImageError::ZeroDimension { width, height });
        }
        let expected = pixel_count(width, height)?;
        if pixels.len() != expected {
            return Err(ImageError::PixelCount {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Image {
            width,
            height,
            pixels,
        })
    }

    /// Same pixel value everywhere.
    pub fn filled(width: usize, height: usize, value: Pixel) -> Result<Self, ImageError> {
        let count = pixel_count(width, height)?;
        Image::new(width, height, vec![value; count])
    }

    pub fn from_rows<R: AsRef<[Pixel]>>(rows: &[R]) -> Result<Self, ImageError> {
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        let mut pixels = Vec::new();
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            if line.len() != width {
                return Err(ImageError::RaggedRow {
                    row,
                    expected: width,
                    actual: line.len(),
                });
            }
            pixels.extend_from_slice(line);
        }
        Image::new(width, rows.len(), pixels)
    }

    /// Parses the text form: one row per line, pixels as whitespace separated
    /// decimal codes. Blank lines are skipped.
    pub fn parse(filename: Option<&str>, whole: &str) -> Result<Self, ImageError> {
        let mut rows = Vec::new();
        let mut offset = 0;
        for line in whole.split_inclusive('\n') {
            let mut row = Vec::new();
            for token in line.split_whitespace() {
                // `token` borrows from `line`, so the pointer difference is its byte offset.
                let start = offset + (token.as_ptr() as usize - line.as_ptr() as usize);
                let pixel = token.parse::<Pixel>().map_err(|_| ImageError::InvalidPixel {
                    token: token.to_string(),
                    src: NamedSource::new(filename.unwrap_or("<input>"), whole.to_string()),
                    bad_bit: SourceSpan::from(start..start + token.len()),
                })?;
                row.push(pixel);
            }
            if !row.is_empty() {
                rows.push(row);
            }
            offset += line.len();
        }
        Image::from_rows(&rows)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn get(&self, row: usize, column: usize) -> Option<Pixel> {
        if row >= self.height || column >= self.width {
            return None;
        }
        self.pixels.get(row * self.width + column).copied()
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[Pixel]> {
        self.pixels.chunks_exact(self.width)
    }
}

impl Display for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.rows() {
            let mut pixels = row.iter();
            if let Some(first) = pixels.next() {
                write!(f, "{first}")?;
            }
            for pixel in pixels {
                write!(f, " {pixel}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
