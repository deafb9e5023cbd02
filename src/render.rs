use std::{
    convert::Infallible,
    io::{self, Write},
};

use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    image::{Image, Pixel},
    rle::CompressedImage,
};

/// Codes from here up are shown as they are, on top of the printable ASCII range.
pub const EXTENDED_FROM: Pixel = 127;

/// The byte shown for a pixel code: the code itself when it is printable
/// (`0x20..=0x7E`) or at least [`EXTENDED_FROM`], a space otherwise.
pub fn convert(code: Pixel) -> u8 {
    if code.is_ascii_graphic() || code == b' ' || code >= EXTENDED_FROM {
        code
    } else {
        b' '
    }
}

/// One line per row, every line exactly `width` bytes before its `\n`.
pub fn render_image(image: &Image) -> Bytes {
    let mut buf = BytesMut::with_capacity((image.width() + 1) * image.height());
    for row in image.rows() {
        for &code in row {
            buf.put_u8(convert(code));
        }
        buf.put_u8(b'\n');
    }
    buf.freeze()
}

/// Output is handed to the sink in pieces of about this many bytes.
const CHUNK: usize = 8 * 1024;

/// Expands the runs and breaks the line every `width` bytes. A run that does
/// not fit in the current line is split across lines, and an unfinished last
/// line is still terminated, so malformed streams render too.
pub fn render_compressed(compressed: &CompressedImage) -> Bytes {
    let mut out = BytesMut::new();
    let Ok(()) = emit_compressed(compressed, |chunk| {
        out.extend_from_slice(chunk);
        Ok::<(), Infallible>(())
    });
    out.freeze()
}

pub fn write_image(out: &mut impl Write, image: &Image) -> io::Result<()> {
    out.write_all(&render_image(image))
}

/// Streams the rendering, so the memory used does not depend on the run
/// lengths the stream claims.
pub fn write_compressed(out: &mut impl Write, compressed: &CompressedImage) -> io::Result<()> {
    emit_compressed(compressed, |chunk| out.write_all(chunk))
}

fn emit_compressed<E>(
    compressed: &CompressedImage,
    mut sink: impl FnMut(&[u8]) -> Result<(), E>,
) -> Result<(), E> {
    let width = compressed.width();
    if width == 0 {
        return Ok(());
    }

    let mut buf = BytesMut::with_capacity(CHUNK + 1);
    let mut column = 0;
    for run in compressed.runs() {
        let code = convert(run.value);
        let mut left = run.length;
        while left > 0 {
            let take = left.min(width - column).min(CHUNK);
            buf.put_bytes(code, take);
            left -= take;
            column += take;
            if column == width {
                buf.put_u8(b'\n');
                column = 0;
            }
            if buf.len() >= CHUNK {
                sink(&buf[..])?;
                buf.clear();
            }
        }
    }
    if column != 0 {
        buf.put_u8(b'\n');
    }
    if !buf.is_empty() {
        sink(&buf[..])?;
    }
    Ok(())
}
