//! Frame activity sampling over the trailing window of a video.

use image::{GrayImage, RgbImage};
use ndarray::Array2;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::signals::{edge_map, is_skin, to_luma, MASK_ON};
use crate::error::{MediaError, MediaResult};
use crate::frames::{FrameReader, FrameSource, RawFrameCommand};
use crate::probe::{probe_video, VideoInfo};

/// Averaged per-pixel activity signals, indexed `[row, col]`.
#[derive(Debug, Clone)]
pub struct ActivityMap {
    /// Mean absolute luminance change between consecutive frames
    pub motion: Array2<f32>,
    /// Mean edge response
    pub edge: Array2<f32>,
    /// Mean skin mask response
    pub skin: Array2<f32>,
    /// Frames that contributed
    pub frames_read: u64,
}

impl ActivityMap {
    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.motion.ncols() as u32
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.motion.nrows() as u32
    }
}

/// Which frames of a video to sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingPlan {
    /// First frame to decode
    pub start_frame: u64,
    /// Number of frames requested
    pub frame_count: u64,
    /// Seek position of `start_frame`
    pub start_secs: f64,
}

impl SamplingPlan {
    /// Plan the last `window_secs` seconds of a video.
    pub fn trailing_window(info: &VideoInfo, window_secs: f64) -> MediaResult<Self> {
        if info.total_frames == 0 {
            return Err(MediaError::EmptyVideo);
        }

        let requested = (info.fps * window_secs).floor();
        let requested = if requested.is_finite() && requested > 0.0 {
            requested as u64
        } else {
            0
        };
        let frame_count = requested.min(info.total_frames);
        let start_frame = info.total_frames - frame_count;

        Ok(Self {
            start_frame,
            frame_count,
            start_secs: start_frame as f64 / info.fps,
        })
    }
}

/// Accumulates motion, edge and skin signals frame by frame.
///
/// Separate from the decoder so it can be driven by any frame source.
#[derive(Debug)]
pub struct ActivityAccumulator {
    motion: Array2<f32>,
    edge: Array2<f32>,
    skin: Array2<f32>,
    previous: Option<GrayImage>,
    frames: u64,
    width: u32,
    height: u32,
}

impl ActivityAccumulator {
    /// Create zeroed accumulators for `width` x `height` frames.
    pub fn new(width: u32, height: u32) -> Self {
        let shape = (height as usize, width as usize);
        Self {
            motion: Array2::zeros(shape),
            edge: Array2::zeros(shape),
            skin: Array2::zeros(shape),
            previous: None,
            frames: 0,
            width,
            height,
        }
    }

    /// Frames added so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Add one frame. Frames of the wrong size are rejected.
    pub fn add_frame(&mut self, frame: &RgbImage) -> MediaResult<()> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(MediaError::video_unreadable(format!(
                "frame is {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }

        let gray = to_luma(frame);

        if let Some(previous) = &self.previous {
            for (x, y, p) in gray.enumerate_pixels() {
                let before = previous.get_pixel(x, y).0[0];
                self.motion[[y as usize, x as usize]] += p.0[0].abs_diff(before) as f32;
            }
        }

        let edges = edge_map(&gray);
        for (x, y, p) in edges.enumerate_pixels() {
            if p.0[0] > 0 {
                self.edge[[y as usize, x as usize]] += MASK_ON;
            }
        }

        for (x, y, p) in frame.enumerate_pixels() {
            let [r, g, b] = p.0;
            if is_skin(r, g, b) {
                self.skin[[y as usize, x as usize]] += MASK_ON;
            }
        }

        self.previous = Some(gray);
        self.frames += 1;
        Ok(())
    }

    /// Divide by the number of frames added.
    pub fn finish(self) -> MediaResult<ActivityMap> {
        if self.frames == 0 {
            return Err(MediaError::video_unreadable("no frames could be decoded"));
        }

        let n = self.frames as f32;
        Ok(ActivityMap {
            motion: self.motion / n,
            edge: self.edge / n,
            skin: self.skin / n,
            frames_read: self.frames,
        })
    }
}

/// Samples the trailing window of a video into an [`ActivityMap`].
#[derive(Debug, Clone)]
pub struct FrameActivitySampler {
    window_secs: f64,
    timeout: Option<Duration>,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl FrameActivitySampler {
    /// Create a sampler for the last `window_secs` seconds.
    pub fn new(window_secs: f64) -> Self {
        Self {
            window_secs,
            timeout: None,
            cancel_rx: None,
        }
    }

    /// Set cancellation signal, checked before every frame.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Set an overall timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Probe, decode and accumulate the trailing window.
    ///
    /// Any failure to open or decode the video is reported as
    /// [`MediaError::VideoUnreadable`].
    pub async fn sample(&self, video_path: impl AsRef<Path>) -> MediaResult<ActivityMap> {
        let video_path = video_path.as_ref();
        self.limited(self.sample_video(video_path)).await
    }

    /// Accumulate up to `frame_count` frames of `width` x `height` from `source`.
    ///
    /// Subject to the same cancellation and timeout as [`Self::sample`].
    pub async fn sample_frames<S: FrameSource>(
        &self,
        source: &mut S,
        width: u32,
        height: u32,
        frame_count: u64,
    ) -> MediaResult<ActivityMap> {
        self.limited(self.accumulate(source, width, height, frame_count))
            .await
    }

    async fn limited<F>(&self, work: F) -> MediaResult<ActivityMap>
    where
        F: Future<Output = MediaResult<ActivityMap>>,
    {
        let Some(limit) = self.timeout else {
            return work.await;
        };

        match tokio::time::timeout(limit, work).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Activity sampling timed out after {} seconds",
                    limit.as_secs()
                );
                Err(MediaError::Timeout(limit.as_secs()))
            }
        }
    }

    async fn sample_video(&self, video_path: &Path) -> MediaResult<ActivityMap> {
        let info = probe_video(video_path)
            .await
            .map_err(MediaError::into_unreadable)?;

        let plan = SamplingPlan::trailing_window(&info, self.window_secs)?;
        info!(
            "Sampling {} of {} frames from {} ({}x{} @ {:.2} fps)",
            plan.frame_count,
            info.total_frames,
            video_path.display(),
            info.width,
            info.height,
            info.fps
        );

        let cmd = RawFrameCommand::new(video_path, plan.start_secs, plan.frame_count);
        let mut reader =
            FrameReader::spawn(&cmd, info.width, info.height).map_err(MediaError::into_unreadable)?;

        let map = self
            .accumulate(&mut reader, info.width, info.height, plan.frame_count)
            .await?;

        if let Err(e) = reader.finish().await {
            warn!("FFmpeg frame decode failed: {}", e);
        }

        Ok(map)
    }

    async fn accumulate<S: FrameSource>(
        &self,
        source: &mut S,
        width: u32,
        height: u32,
        frame_count: u64,
    ) -> MediaResult<ActivityMap> {
        let mut accumulator = ActivityAccumulator::new(width, height);

        while accumulator.frames() < frame_count {
            if self.is_cancelled() {
                info!("Activity sampling cancelled after {} frames", accumulator.frames());
                return Err(MediaError::Cancelled);
            }

            let Some(frame) = source
                .next_frame()
                .await
                .map_err(MediaError::into_unreadable)?
            else {
                debug!(
                    "Stream ended after {} of {} frames",
                    accumulator.frames(),
                    frame_count
                );
                break;
            };

            // Edge detection on full-size frames is CPU heavy
            accumulator = tokio::task::spawn_blocking(move || {
                accumulator.add_frame(&frame).map(|_| accumulator)
            })
            .await
            .map_err(|e| MediaError::internal(format!("frame task failed: {}", e)))??;
        }

        accumulator.finish()
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_rx.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn info(fps: f64, total_frames: u64) -> VideoInfo {
        VideoInfo {
            duration: total_frames as f64 / fps,
            width: 64,
            height: 48,
            fps,
            total_frames,
            codec: "h264".to_string(),
        }
    }

    #[test]
    fn test_trailing_window_plan() {
        let plan = SamplingPlan::trailing_window(&info(30.0, 900), 15.0).unwrap();
        assert_eq!(plan.frame_count, 450);
        assert_eq!(plan.start_frame, 450);
        assert!((plan.start_secs - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_video_samples_everything() {
        let plan = SamplingPlan::trailing_window(&info(25.0, 100), 15.0).unwrap();
        assert_eq!(plan.frame_count, 100);
        assert_eq!(plan.start_frame, 0);
        assert_eq!(plan.start_secs, 0.0);
    }

    #[test]
    fn test_fractional_frame_rate_truncates() {
        // 29.97 * 15 = 449.55
        let plan = SamplingPlan::trailing_window(&info(29.97, 1000), 15.0).unwrap();
        assert_eq!(plan.frame_count, 449);
    }

    #[test]
    fn test_empty_video() {
        assert!(matches!(
            SamplingPlan::trailing_window(&info(30.0, 0), 15.0),
            Err(MediaError::EmptyVideo)
        ));
    }

    #[test]
    fn test_accumulator_without_frames() {
        let result = ActivityAccumulator::new(8, 8).finish();
        assert!(matches!(result, Err(MediaError::VideoUnreadable(_))));
    }

    #[test]
    fn test_accumulator_rejects_wrong_size() {
        let mut acc = ActivityAccumulator::new(8, 8);
        let frame = RgbImage::new(4, 4);
        assert!(acc.add_frame(&frame).is_err());
        assert_eq!(acc.frames(), 0);
    }

    #[test]
    fn test_motion_averaged_over_frames_read() {
        let mut acc = ActivityAccumulator::new(16, 12);
        let dark = RgbImage::from_pixel(16, 12, Rgb([0, 0, 0]));
        let mut moved = dark.clone();
        moved.put_pixel(3, 5, Rgb([255, 255, 255]));

        acc.add_frame(&dark).unwrap();
        acc.add_frame(&moved).unwrap();
        acc.add_frame(&moved).unwrap();

        let map = acc.finish().unwrap();
        assert_eq!(map.frames_read, 3);
        assert_eq!((map.width(), map.height()), (16, 12));
        // One change of 255, divided by three frames
        assert!((map.motion[[5, 3]] - 85.0).abs() < 1e-4);
        assert_eq!(map.motion[[0, 0]], 0.0);
    }

    #[test]
    fn test_first_frame_has_no_motion() {
        let mut acc = ActivityAccumulator::new(8, 8);
        acc.add_frame(&RgbImage::from_pixel(8, 8, Rgb([200, 10, 10])))
            .unwrap();
        let map = acc.finish().unwrap();
        assert!(map.motion.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_skin_signal() {
        let mut acc = ActivityAccumulator::new(8, 8);
        let mut frame = RgbImage::from_pixel(8, 8, Rgb([40, 60, 200]));
        frame.put_pixel(2, 6, Rgb([224, 172, 105]));
        acc.add_frame(&frame).unwrap();
        acc.add_frame(&RgbImage::from_pixel(8, 8, Rgb([40, 60, 200])))
            .unwrap();

        let map = acc.finish().unwrap();
        assert!((map.skin[[6, 2]] - 127.5).abs() < 1e-4);
        assert_eq!(map.skin[[0, 0]], 0.0);
    }

    #[tokio::test]
    async fn test_sample_missing_video() {
        let result = FrameActivitySampler::new(15.0)
            .sample("/no/such/video.mp4")
            .await;
        assert!(matches!(result, Err(MediaError::VideoUnreadable(_))));
    }

    /// Yields copies of `frame`, optionally raising the cancel flag after
    /// `cancel_after` frames.
    struct RepeatingSource {
        frame: RgbImage,
        remaining: u64,
        served: u64,
        cancel: Option<(u64, watch::Sender<bool>)>,
    }

    impl RepeatingSource {
        fn new(width: u32, height: u32, remaining: u64) -> Self {
            Self {
                frame: RgbImage::from_pixel(width, height, Rgb([90, 90, 90])),
                remaining,
                served: 0,
                cancel: None,
            }
        }
    }

    #[async_trait::async_trait]
    impl FrameSource for RepeatingSource {
        async fn next_frame(&mut self) -> MediaResult<Option<RgbImage>> {
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            self.served += 1;
            if let Some((after, tx)) = &self.cancel {
                if self.served >= *after {
                    let _ = tx.send(true);
                }
            }
            Ok(Some(self.frame.clone()))
        }
    }

    /// Never produces a frame.
    struct StalledSource;

    #[async_trait::async_trait]
    impl FrameSource for StalledSource {
        async fn next_frame(&mut self) -> MediaResult<Option<RgbImage>> {
            std::future::pending().await
        }
    }

    /// Fails like a broken pipe.
    struct FailingSource;

    #[async_trait::async_trait]
    impl FrameSource for FailingSource {
        async fn next_frame(&mut self) -> MediaResult<Option<RgbImage>> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe).into())
        }
    }

    #[tokio::test]
    async fn test_sample_frames_stops_at_frame_count() {
        let mut source = RepeatingSource::new(8, 6, 10);
        let map = FrameActivitySampler::new(15.0)
            .sample_frames(&mut source, 8, 6, 4)
            .await
            .unwrap();
        assert_eq!(map.frames_read, 4);
        assert_eq!(source.served, 4);
    }

    #[tokio::test]
    async fn test_sample_frames_short_stream() {
        let mut source = RepeatingSource::new(8, 6, 3);
        let map = FrameActivitySampler::new(15.0)
            .sample_frames(&mut source, 8, 6, 450)
            .await
            .unwrap();
        assert_eq!(map.frames_read, 3);

        let mut empty = RepeatingSource::new(8, 6, 0);
        let result = FrameActivitySampler::new(15.0)
            .sample_frames(&mut empty, 8, 6, 450)
            .await;
        assert!(matches!(result, Err(MediaError::VideoUnreadable(_))));
    }

    #[tokio::test]
    async fn test_sample_frames_timeout() {
        let sampler =
            FrameActivitySampler::new(15.0).with_timeout(Some(Duration::from_millis(10)));
        let result = sampler.sample_frames(&mut StalledSource, 8, 6, 10).await;
        assert!(matches!(result, Err(MediaError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_sample_frames_cancelled_before_first_frame() {
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let mut source = RepeatingSource::new(8, 6, 10);
        let result = FrameActivitySampler::new(15.0)
            .with_cancel(rx)
            .sample_frames(&mut source, 8, 6, 10)
            .await;
        assert!(matches!(result, Err(MediaError::Cancelled)));
        assert_eq!(source.served, 0);
    }

    #[tokio::test]
    async fn test_sample_frames_cancelled_mid_stream() {
        let (tx, rx) = watch::channel(false);
        let mut source = RepeatingSource::new(8, 6, 10);
        source.cancel = Some((2, tx));

        let result = FrameActivitySampler::new(15.0)
            .with_cancel(rx)
            .sample_frames(&mut source, 8, 6, 10)
            .await;
        assert!(matches!(result, Err(MediaError::Cancelled)));
        assert_eq!(source.served, 2);
    }

    #[tokio::test]
    async fn test_sample_frames_read_error_is_unreadable() {
        let result = FrameActivitySampler::new(15.0)
            .sample_frames(&mut FailingSource, 8, 6, 10)
            .await;
        assert!(matches!(result, Err(MediaError::VideoUnreadable(_))));
    }
}
