use bytes::{Buf, BufMut, Bytes, BytesMut};
use miette::Diagnostic;
use thiserror::Error;

use crate::image::{Image, ImageError, Pixel, pixel_count};

const MAGIC: [u8; 4] = *b"PXRL";
const HEADER_LEN: usize = 12;
const RUN_LEN: usize = 5;

#[derive(Error, Debug, Diagnostic)]
pub enum DecodeError {
    #[error("run {index} has length zero")]
    #[diagnostic(help("every run covers at least one pixel"))]
    EmptyRun { index: usize },

    #[error(
        "run {index} of length {length} starts at column {column} of row {row} and does not fit in it"
    )]
    #[diagnostic(help("a run never continues past the end of its row"))]
    RunCrossesRow {
        index: usize,
        row: usize,
        column: usize,
        length: usize,
    },

    #[error("{count} run(s) left over after the last row")]
    TrailingRuns { count: usize },

    #[error("the runs cover {actual} pixels, the image needs {expected}")]
    MissingPixels { expected: usize, actual: usize },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Image(#[from] ImageError),
}

#[derive(Error, Debug, Diagnostic)]
pub enum PackError {
    #[error("packed stream starts with {0:?}, not a compressed image")]
    InvalidMagic([u8; 4]),

    #[error("packed stream is truncated: needed {needed} more byte(s), {remaining} left")]
    Truncated { needed: usize, remaining: usize },

    #[error("{what} {value} does not fit in 32 bits")]
    TooLarge { what: &'static str, value: usize },
}

/// `length` consecutive pixels of one row sharing `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub value: Pixel,
    pub length: usize,
}

impl Run {
    pub fn new(value: Pixel, length: usize) -> Self {
        Run { value, length }
    }
}

/// Runs of an image in row-major order, along with the image dimensions.
///
/// Built by [`compress`] or taken as-is from the caller; nothing is checked
/// until [`decompress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    width: usize,
    height: usize,
    runs: Vec<Run>,
}

impl CompressedImage {
    pub fn new(width: usize, height: usize, runs: Vec<Run>) -> Self {
        CompressedImage {
            width,
            height,
            runs,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Groups the runs by the row they start in. A row ends once its runs add
    /// up to at least `width`, so for well-formed streams every group sums to
    /// exactly `width`.
    pub fn row_runs(&self) -> RowRuns<'_> {
        RowRuns {
            width: self.width,
            rest: &self.runs,
        }
    }

    pub fn to_bytes(&self) -> Result<Bytes, PackError> {
        let fit = |what, value: usize| {
            u32::try_from(value).map_err(|_| PackError::TooLarge { what, value })
        };

        let mut buf = BytesMut::with_capacity(HEADER_LEN + self.runs.len() * RUN_LEN);
        buf.put_slice(&MAGIC);
        buf.put_u32(fit("width", self.width)?);
        buf.put_u32(fit("height", self.height)?);
        for run in &self.runs {
            buf.put_u8(run.value);
            buf.put_u32(fit("run length", run.length)?);
        }
        Ok(buf.freeze())
    }

    pub fn from_bytes(mut buf: impl Buf) -> Result<Self, PackError> {
        if buf.remaining() < HEADER_LEN {
            return Err(PackError::Truncated {
                needed: HEADER_LEN,
                remaining: buf.remaining(),
            });
        }
        let mut magic = [0; 4];
        buf.copy_to_slice(&mut magic);
        if magic != MAGIC {
            return Err(PackError::InvalidMagic(magic));
        }
        let width = buf.get_u32() as usize;
        let height = buf.get_u32() as usize;

        let mut runs = Vec::with_capacity(buf.remaining() / RUN_LEN);
        while buf.has_remaining() {
            if buf.remaining() < RUN_LEN {
                return Err(PackError::Truncated {
                    needed: RUN_LEN,
                    remaining: buf.remaining(),
                });
            }
            let value = buf.get_u8();
            let length = buf.get_u32() as usize;
            runs.push(Run { value, length });
        }

        Ok(CompressedImage::new(width, height, runs))
    }
}

pub struct RowRuns<'a> {
    width: usize,
    rest: &'a [Run],
}

impl<'a> Iterator for RowRuns<'a> {
    type Item = &'a [Run];

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let mut covered = 0;
        let mut end = self.rest.len();
        for (i, run) in self.rest.iter().enumerate() {
            covered = run.length.saturating_add(covered);
            if covered >= self.width {
                end = i + 1;
                break;
            }
        }
        let (row, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(row)
    }
}

/// Accumulates pixels fed in row-major order into runs, starting a new run at
/// the beginning of every row.
struct Compressor {
    width: usize,
    column: usize,
    runs: Vec<Run>,
}

impl Compressor {
    fn new(width: usize) -> Self {
        Compressor {
            width,
            column: 0,
            runs: Vec::new(),
        }
    }

    fn push(&mut self, value: Pixel) {
        if self.column == self.width {
            self.column = 0;
        }
        match self.runs.last_mut() {
            Some(run) if self.column != 0 && run.value == value => run.length += 1,
            _ => self.runs.push(Run::new(value, 1)),
        }
        self.column += 1;
    }
}

pub fn compress(image: &Image) -> CompressedImage {
    let mut compressor = Compressor::new(image.width());
    for row in image.rows() {
        for &pixel in row {
            compressor.push(pixel);
        }
    }
    log::debug!(
        "compressed {}x{} image ({} pixels) into {} runs",
        image.width(),
        image.height(),
        image.pixels().len(),
        compressor.runs.len()
    );
    CompressedImage::new(image.width(), image.height(), compressor.runs)
}

/// Rebuilds the image. Malformed streams are rejected as a whole: a zero
/// length run, a run overflowing its row, runs past the last row, or too few
/// runs to fill the image all fail without a partial image.
///
/// The runs are checked before any pixel is allocated, so the dimensions a
/// stream claims are only trusted once its runs actually cover them.
pub fn decompress(compressed: &CompressedImage) -> Result<Image, DecodeError> {
    let (width, height) = (compressed.width(), compressed.height());
    if width == 0 || height == 0 {
        return Err(ImageError::ZeroDimension { width, height }.into());
    }
    let expected = pixel_count(width, height)?;

    let runs = compressed.runs();
    let (mut row, mut column, mut covered) = (0, 0, 0);

    for (index, run) in runs.iter().enumerate() {
        if row == height {
            return Err(DecodeError::TrailingRuns {
                count: runs.len() - index,
            });
        }
        if run.length == 0 {
            return Err(DecodeError::EmptyRun { index });
        }
        if run.length > width - column {
            return Err(DecodeError::RunCrossesRow {
                index,
                row,
                column,
                length: run.length,
            });
        }

        covered += run.length;
        column += run.length;
        if column == width {
            column = 0;
            row += 1;
        }
    }

    if row != height {
        return Err(DecodeError::MissingPixels {
            expected,
            actual: covered,
        });
    }

    let mut pixels = Vec::with_capacity(expected);
    for run in runs {
        pixels.resize(pixels.len() + run.length, run.value);
    }

    log::debug!("decompressed {} runs into a {width}x{height} image", runs.len());
    Ok(Image::new(width, height, pixels)?)
}
