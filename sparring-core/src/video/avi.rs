//! Motion-JPEG video in an AVI container.
//!
//! The file has a single video stream whose frames are JPEG images, laid out as
//!
//! ```text
//! RIFF 'AVI '
//!   LIST 'hdrl'
//!     avih
//!     LIST 'strl'
//!       strh
//!       strf
//!   LIST 'movi'
//!     00dc (one chunk per frame)
//!   idx1
//! ```
use super::VideoEncoder;
use crate::error::HarnessError;
use anyhow::Result;
use image::{codecs::jpeg::JpegEncoder, ColorType, RgbImage};
use log::trace;
use std::{fs::File, io::Write, path::Path};

const AVIF_HASINDEX: u32 = 0x10;
const AVIIF_KEYFRAME: u32 = 0x10;

/// Writes frames as a Motion-JPEG AVI file.
#[derive(Debug, Clone)]
pub struct MjpegAviEncoder {
    quality: u8,
}

impl Default for MjpegAviEncoder {
    fn default() -> Self {
        Self { quality: 90 }
    }
}

impl MjpegAviEncoder {
    /// Sets the JPEG quality in `1..=100`.
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    fn encode_jpeg(&self, frame: &RgbImage) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, self.quality).encode(
            frame.as_raw(),
            frame.width(),
            frame.height(),
            ColorType::Rgb8,
        )?;
        Ok(buf)
    }

    fn build(&self, frames: &[RgbImage], fps: u32, (w, h): (u32, u32)) -> Result<Vec<u8>> {
        let jpegs = frames
            .iter()
            .map(|f| self.encode_jpeg(f))
            .collect::<Result<Vec<_>>>()?;
        let n_frames = jpegs.len() as u32;
        let max_size = jpegs.iter().map(|j| j.len()).max().unwrap_or(0) as u32;
        let total_size = jpegs.iter().map(|j| j.len()).sum::<usize>() as u32;
        let bytes_per_sec = total_size / n_frames.max(1) * fps;

        let mut avih = Vec::with_capacity(56);
        for v in [
            1_000_000 / fps.max(1),
            bytes_per_sec,
            0,
            AVIF_HASINDEX,
            n_frames,
            0,
            1,
            max_size,
            w,
            h,
            0,
            0,
            0,
            0,
        ] {
            put_u32(&mut avih, v);
        }

        let mut strh = Vec::with_capacity(56);
        strh.extend_from_slice(b"vids");
        strh.extend_from_slice(b"MJPG");
        put_u32(&mut strh, 0); // flags
        put_u16(&mut strh, 0); // priority
        put_u16(&mut strh, 0); // language
        put_u32(&mut strh, 0); // initial frames
        put_u32(&mut strh, 1); // scale
        put_u32(&mut strh, fps); // rate
        put_u32(&mut strh, 0); // start
        put_u32(&mut strh, n_frames);
        put_u32(&mut strh, max_size);
        put_u32(&mut strh, u32::MAX); // default quality
        put_u32(&mut strh, 0); // sample size
        put_u16(&mut strh, 0);
        put_u16(&mut strh, 0);
        put_u16(&mut strh, w as u16);
        put_u16(&mut strh, h as u16);

        let mut strf = Vec::with_capacity(40);
        put_u32(&mut strf, 40);
        put_u32(&mut strf, w);
        put_u32(&mut strf, h);
        put_u16(&mut strf, 1); // planes
        put_u16(&mut strf, 24); // bits per pixel
        strf.extend_from_slice(b"MJPG");
        put_u32(&mut strf, w * h * 3);
        for _ in 0..4 {
            put_u32(&mut strf, 0);
        }

        let strl = list(b"LIST", b"strl", &[chunk(b"strh", &strh), chunk(b"strf", &strf)].concat());
        let hdrl = list(b"LIST", b"hdrl", &[chunk(b"avih", &avih), strl].concat());

        let mut movi_content = Vec::with_capacity(total_size as usize + 8 * jpegs.len());
        let mut idx1 = Vec::with_capacity(16 * jpegs.len());
        // Offsets in the index count from the 'movi' fourcc.
        let mut offset = 4u32;
        for jpeg in jpegs.iter() {
            let c = chunk(b"00dc", jpeg);
            idx1.extend_from_slice(b"00dc");
            put_u32(&mut idx1, AVIIF_KEYFRAME);
            put_u32(&mut idx1, offset);
            put_u32(&mut idx1, jpeg.len() as u32);
            offset += c.len() as u32;
            movi_content.extend_from_slice(&c);
        }
        let movi = list(b"LIST", b"movi", &movi_content);

        let body = [hdrl, movi, chunk(b"idx1", &idx1)].concat();
        Ok(list(b"RIFF", b"AVI ", &body))
    }
}

impl VideoEncoder for MjpegAviEncoder {
    fn encode(&self, path: &Path, frames: &[RgbImage], size: (u32, u32), fps: u32) -> Result<()> {
        if frames.is_empty() {
            return Err(HarnessError::EmptyVideo(path.display().to_string()).into());
        }
        if let Some(f) = frames.iter().find(|f| f.dimensions() != size) {
            return Err(HarnessError::FrameSizeMismatch {
                expected: size,
                got: f.dimensions(),
            }
            .into());
        }

        let data = self.build(frames, fps, size)?;
        let mut file = File::create(path)?;
        file.write_all(&data)?;
        trace!("Wrote {} frames ({} bytes) to {:?}", frames.len(), data.len(), path);
        Ok(())
    }

    fn extension(&self) -> &'static str {
        "avi"
    }
}

fn put_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn put_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

/// A chunk padded to an even size.
fn chunk(id: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(data.len() + 9);
    buf.extend_from_slice(id);
    put_u32(&mut buf, data.len() as u32);
    buf.extend_from_slice(data);
    if data.len() % 2 == 1 {
        buf.push(0);
    }
    buf
}

/// A `RIFF` or `LIST` chunk whose data starts with a fourcc.
fn list(tag: &[u8; 4], fourcc: &[u8; 4], content: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(content.len() + 12);
    buf.extend_from_slice(tag);
    put_u32(&mut buf, content.len() as u32 + 4);
    buf.extend_from_slice(fourcc);
    buf.extend_from_slice(content);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempdir::TempDir;

    fn u32_at(data: &[u8], pos: usize) -> u32 {
        u32::from_le_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
    }

    fn find(data: &[u8], pat: &[u8]) -> Option<usize> {
        data.windows(pat.len()).position(|w| w == pat)
    }

    #[test]
    fn riff_layout_of_three_frames() -> Result<()> {
        let dir = TempDir::new("avi")?;
        let path = dir.path().join("100.avi");
        let frames = (0..3u8)
            .map(|i| RgbImage::from_pixel(16, 8, Rgb([i * 80, 0, 255])))
            .collect::<Vec<_>>();

        MjpegAviEncoder::default().encode(&path, &frames, (16, 8), 30)?;
        let data = std::fs::read(&path)?;

        assert_eq!(&data[0..4], b"RIFF");
        assert_eq!(u32_at(&data, 4) as usize, data.len() - 8);
        assert_eq!(&data[8..12], b"AVI ");

        let avih = find(&data, b"avih").unwrap();
        assert_eq!(u32_at(&data, avih + 4), 56);
        assert_eq!(u32_at(&data, avih + 8), 1_000_000 / 30);
        assert_eq!(u32_at(&data, avih + 8 + 16), 3);
        assert_eq!(u32_at(&data, avih + 8 + 32), 16);
        assert_eq!(u32_at(&data, avih + 8 + 36), 8);

        let idx1 = find(&data, b"idx1").unwrap();
        assert_eq!(u32_at(&data, idx1 + 4), 3 * 16);

        // The first index entry points to the first frame chunk.
        let movi = find(&data, b"movi").unwrap();
        let first_offset = u32_at(&data, idx1 + 8 + 8) as usize;
        assert_eq!(&data[movi + first_offset..movi + first_offset + 4], b"00dc");
        // JPEG start-of-image marker.
        assert_eq!(&data[movi + first_offset + 8..movi + first_offset + 10], &[0xFF, 0xD8]);
        Ok(())
    }

    #[test]
    fn no_frames_is_an_error() -> Result<()> {
        let dir = TempDir::new("avi")?;
        let path = dir.path().join("0.avi");
        assert!(MjpegAviEncoder::default().encode(&path, &[], (4, 4), 30).is_err());
        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn frames_of_different_sizes_are_rejected() -> Result<()> {
        let dir = TempDir::new("avi")?;
        let path = dir.path().join("0.avi");
        let frames = vec![RgbImage::new(4, 4), RgbImage::new(4, 2)];
        assert!(MjpegAviEncoder::default().encode(&path, &frames, (4, 4), 30).is_err());
        Ok(())
    }

    #[test]
    fn frames_must_have_the_declared_size() -> Result<()> {
        let dir = TempDir::new("avi")?;
        let path = dir.path().join("0.avi");
        let frames = vec![RgbImage::new(4, 4), RgbImage::new(4, 4)];
        let err = MjpegAviEncoder::default()
            .encode(&path, &frames, (8, 4), 30)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HarnessError>(),
            Some(HarnessError::FrameSizeMismatch {
                expected: (8, 4),
                got: (4, 4)
            })
        ));
        assert!(!path.exists());
        Ok(())
    }
}
