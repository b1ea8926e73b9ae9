//! Raw RGB frame decoding through an FFmpeg pipe.
//!
//! FFmpeg decodes the requested frame range and writes packed `rgb24`
//! frames to stdout. Frames are pulled one at a time so memory stays at a
//! single frame regardless of how many are sampled.

use async_trait::async_trait;
use image::RgbImage;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Command line for a raw frame decode.
#[derive(Debug, Clone)]
pub struct RawFrameCommand {
    input: PathBuf,
    start_secs: f64,
    frame_count: u64,
}

impl RawFrameCommand {
    /// Decode `frame_count` frames of `input` starting at `start_secs`.
    pub fn new(input: impl AsRef<Path>, start_secs: f64, frame_count: u64) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            start_secs: start_secs.max(0.0),
            frame_count,
        }
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            // Keep the coded frame size so it matches what ffprobe reported
            "-noautorotate".to_string(),
        ];

        if self.start_secs > 0.0 {
            args.push("-ss".to_string());
            args.push(format!("{:.3}", self.start_secs));
        }

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.push("-an".to_string());
        args.push("-frames:v".to_string());
        args.push(self.frame_count.to_string());
        args.extend(
            ["-pix_fmt", "rgb24", "-f", "rawvideo", "-"]
                .iter()
                .map(|s| s.to_string()),
        );

        args
    }
}

/// A sequential source of decoded frames.
#[async_trait]
pub trait FrameSource: Send {
    /// Next frame, `None` at end of stream.
    async fn next_frame(&mut self) -> MediaResult<Option<RgbImage>>;
}

/// Sequential reader over FFmpeg's raw frame output.
///
/// The FFmpeg child is killed when the reader is dropped.
pub struct FrameReader {
    child: Child,
    stdout: BufReader<ChildStdout>,
    width: u32,
    height: u32,
    frames_read: u64,
}

impl FrameReader {
    /// Spawn FFmpeg for `cmd`, expecting frames of `width` x `height`.
    pub fn spawn(cmd: &RawFrameCommand, width: u32, height: u32) -> MediaResult<Self> {
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        if width == 0 || height == 0 {
            return Err(MediaError::video_unreadable(format!(
                "invalid frame size {}x{}",
                width, height
            )));
        }

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                MediaError::ffmpeg_failed(format!("Failed to spawn FFmpeg: {}", e), None)
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            MediaError::ffmpeg_failed("Failed to capture FFmpeg stdout", None)
        })?;

        Ok(Self {
            child,
            stdout: BufReader::new(stdout),
            width,
            height,
            frames_read: 0,
        })
    }

    /// Bytes in one packed RGB frame.
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    /// Frames returned so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Read the next frame, `None` at end of stream.
    ///
    /// A truncated final frame is treated as end of stream.
    pub async fn next_frame(&mut self) -> MediaResult<Option<RgbImage>> {
        let mut buffer = vec![0u8; self.frame_len()];

        match self.stdout.read_exact(&mut buffer).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        }

        self.frames_read += 1;
        RgbImage::from_raw(self.width, self.height, buffer)
            .map(Some)
            .ok_or_else(|| MediaError::internal("frame buffer does not match frame size"))
    }

    /// Reap the FFmpeg process.
    ///
    /// A non-zero exit after frames were delivered is only logged; the
    /// frames already read are still usable.
    pub async fn finish(mut self) -> MediaResult<u64> {
        // Unread output would block FFmpeg on a full pipe
        drop(self.stdout);

        let status = self.child.wait().await?;
        if !status.success() {
            if self.frames_read == 0 {
                return Err(MediaError::ffmpeg_failed(
                    "FFmpeg exited with non-zero status",
                    status.code(),
                ));
            }
            warn!(
                "FFmpeg returned non-zero status {:?} after {} frames",
                status.code(),
                self.frames_read
            );
        }

        Ok(self.frames_read)
    }
}

#[async_trait]
impl FrameSource for FrameReader {
    async fn next_frame(&mut self) -> MediaResult<Option<RgbImage>> {
        FrameReader::next_frame(self).await
    }
}
