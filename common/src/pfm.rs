//! Portable Float Map (`.pfm`) reading and writing.
//!
//! Layout:
//!   `PF` (RGB) or `Pf` (grayscale), whitespace
//!   `<width> <height>`, whitespace
//!   `<scale>`: negative means little-endian, positive big-endian
//!   a single whitespace byte, then `width * height * channels` f32 samples,
//!   rows stored bottom-to-top.
//!
//! Buffers handed out by this module are top-to-bottom like every other
//! [`ImageBuffer`].

use std::path::Path;

use crate::buffer::{ImageBuffer, ImageError, Sample, Shape};

pub fn read_pfm(path: &Path) -> Result<ImageBuffer<f32>, PfmError> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Write `image` as a little-endian PFM. Only 1- and 3-channel images can be
/// represented.
pub fn write_pfm<T: Sample>(path: &Path, image: &ImageBuffer<T>) -> Result<(), PfmError> {
    let bytes = encode(image)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

pub fn decode(bytes: &[u8]) -> Result<ImageBuffer<f32>, PfmError> {
    let mut header = HeaderReader { bytes, pos: 0 };

    let channels = match header.token()? {
        b"PF" => 3,
        b"Pf" => 1,
        other => return Err(PfmError::BadMagic(String::from_utf8_lossy(other).into_owned())),
    };
    let width: usize = header.parse("width")?;
    let height: usize = header.parse("height")?;
    let scale: f32 = header.parse("scale")?;
    if scale == 0.0 || !scale.is_finite() {
        return Err(PfmError::BadHeader(format!("invalid scale {scale}")));
    }
    header.single_whitespace()?;

    let expected = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| PfmError::BadHeader(format!("raster size {width}x{height} overflows")))?;
    let shape = Shape::new(height, width, channels);
    let raster = &bytes[header.pos..];
    if raster.len() < expected {
        return Err(PfmError::Truncated {
            got: raster.len(),
            expected,
        });
    }

    let little_endian = scale < 0.0;
    let row_len = width * channels;
    let mut data = Vec::with_capacity(shape.len());
    // File rows run bottom-to-top.
    for row in (0..height).rev() {
        let start = row * row_len * 4;
        for chunk in raster[start..start + row_len * 4].chunks_exact(4) {
            let word = [chunk[0], chunk[1], chunk[2], chunk[3]];
            data.push(if little_endian {
                f32::from_le_bytes(word)
            } else {
                f32::from_be_bytes(word)
            });
        }
    }

    Ok(ImageBuffer::new(shape, data)?)
}

pub fn encode<T: Sample>(image: &ImageBuffer<T>) -> Result<Vec<u8>, PfmError> {
    let shape = image.shape();
    let magic = match shape.channels {
        3 => "PF",
        1 => "Pf",
        n => return Err(PfmError::UnsupportedChannels(n)),
    };

    let header = format!("{magic}\n{} {}\n-1.0\n", shape.width, shape.height);
    let mut out = Vec::with_capacity(header.len() + shape.len() * 4);
    out.extend_from_slice(header.as_bytes());

    let row_len = shape.width * shape.channels;
    let data = image.as_slice();
    for row in (0..shape.height).rev() {
        for &v in &data[row * row_len..(row + 1) * row_len] {
            out.extend_from_slice(&v.to_f32().to_le_bytes());
        }
    }
    Ok(out)
}

struct HeaderReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> HeaderReader<'a> {
    fn token(&mut self) -> Result<&'a [u8], PfmError> {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        let start = self.pos;
        while self.pos < self.bytes.len() && !self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(PfmError::BadHeader("unexpected end of header".into()));
        }
        Ok(&self.bytes[start..self.pos])
    }

    fn parse<V: std::str::FromStr>(&mut self, field: &str) -> Result<V, PfmError> {
        let token = self.token()?;
        std::str::from_utf8(token)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                PfmError::BadHeader(format!(
                    "invalid {field} {:?}",
                    String::from_utf8_lossy(token)
                ))
            })
    }

    fn single_whitespace(&mut self) -> Result<(), PfmError> {
        match self.bytes.get(self.pos) {
            Some(b) if b.is_ascii_whitespace() => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(PfmError::BadHeader("missing separator before raster".into())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PfmError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a PFM file (magic {0:?})")]
    BadMagic(String),
    #[error("malformed PFM header: {0}")]
    BadHeader(String),
    #[error("PFM raster truncated: got {got} bytes, expected {expected}")]
    Truncated { got: usize, expected: usize },
    #[error("PFM cannot hold {0} channels")]
    UnsupportedChannels(usize),
    #[error(transparent)]
    Image(#[from] ImageError),
}
