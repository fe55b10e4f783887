//! Recording of evaluation episodes.
mod avi;
use crate::FrameSource;
use anyhow::Result;
pub use avi::MjpegAviEncoder;
use image::RgbImage;
use std::path::Path;

/// Frame rate of recorded videos.
pub const VIDEO_FPS: u32 = 30;

/// Encodes frames into a video file.
pub trait VideoEncoder {
    /// Writes `frames` of `size` (width, height) to `path` at `fps` frames per second.
    ///
    /// Fails without writing if there is no frame or if a frame is not of `size`.
    fn encode(&self, path: &Path, frames: &[RgbImage], size: (u32, u32), fps: u32) -> Result<()>;

    /// File extension of the produced videos.
    fn extension(&self) -> &'static str;
}

/// Keeps frame retention of an environment turned on while alive.
///
/// Retention is turned off when the guard is dropped, whichever way the
/// capture ended.
pub struct FrameRetention<'a, E: FrameSource> {
    env: &'a mut E,
}

impl<'a, E: FrameSource> FrameRetention<'a, E> {
    /// Turns retention on.
    pub fn new(env: &'a mut E) -> Self {
        env.set_frame_retention(true);
        Self { env }
    }

    /// The environment whose frames are retained.
    pub fn env(&mut self) -> &mut E {
        self.env
    }
}

impl<'a, E: FrameSource> Drop for FrameRetention<'a, E> {
    fn drop(&mut self) {
        self.env.set_frame_retention(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dummy::{ScriptedEnv, ScriptedEnvConfig},
        Env,
    };

    #[test]
    fn retention_is_released_on_early_return() -> Result<()> {
        let mut env = ScriptedEnv::build(&ScriptedEnvConfig::default(), 0)?;

        let capture = |env: &mut ScriptedEnv| -> Result<()> {
            let mut guard = FrameRetention::new(env);
            assert!(guard.env().is_retaining_frames());
            guard.env().reset()?;
            anyhow::bail!("capture failed")
        };

        assert!(capture(&mut env).is_err());
        assert!(!env.is_retaining_frames());
        assert!(env.take_frames().is_empty());
        Ok(())
    }
}
