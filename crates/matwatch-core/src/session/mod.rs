//! Watch sessions.
//!
//! A [`Session`] owns the process handle, the target address, the change
//! tracker and the current frame. Each [`Session::refresh`] runs
//! decode, change detection, copy and colorization, and swaps in a new
//! [`FrameSample`] only after it is fully built.

mod state;

pub use state::{FrameState, Refresh};

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::color::{Colorizer, MapperFactory};
use crate::config::SessionOptions;
use crate::decode::{
    ExpressionValue, HeaderDecoder, TypeMetadata, classify_expression, read_stride,
};
use crate::error::{Error, Result};
use crate::frame::{
    ChangeTracker, Fingerprint, FrameSample, content_checksum, copy_pixels, is_contiguous,
    query_pixel, warn_on_range_mismatch,
};
use crate::matrix::{MatrixDescriptor, StrideInfo};
use crate::process::{ProcessInfo, ProcessProvider};

pub struct Session<P: ProcessProvider> {
    provider: P,
    pid: u32,
    process: Option<P::Process>,
    target: u64,
    disposed: bool,
    decoder: HeaderDecoder,
    options: SessionOptions,
    colorizer: Colorizer,
    tracker: ChangeTracker,
    current: Option<Arc<FrameSample>>,
    descriptor: Option<MatrixDescriptor>,
    stride: Option<StrideInfo>,
    state: FrameState,
}

impl<P: ProcessProvider> Session<P> {
    /// Open `pid` through `provider`. Failing to open is the only fatal error.
    pub fn attach(provider: P, pid: u32, options: SessionOptions) -> Result<Self> {
        let process = provider.open_process(pid)?;
        info!("Attached to process {}", pid);

        Ok(Self {
            provider,
            pid,
            process: Some(process),
            target: 0,
            disposed: false,
            decoder: HeaderDecoder::Fixed,
            options,
            colorizer: Colorizer::new(options.hsv_two_channel),
            tracker: ChangeTracker::new(),
            current: None,
            descriptor: None,
            stride: None,
            state: FrameState::Absent,
        })
    }

    /// Decode headers through runtime metadata instead of fixed offsets.
    pub fn with_reflective(mut self, metadata: Box<dyn TypeMetadata>) -> Self {
        self.decoder = HeaderDecoder::reflective(metadata);
        self
    }

    pub fn with_colorizer(mut self, colorizer: Colorizer) -> Self {
        self.colorizer = colorizer;
        self
    }

    pub fn with_mapper_factory(mut self, factory: Box<dyn MapperFactory>) -> Self {
        self.colorizer = Colorizer::software_only(self.options.hsv_two_channel).with_factory(factory);
        self
    }

    /// Make sure the handle belongs to `pid`, reopening when the target changed.
    pub fn ensure_process(&mut self, pid: u32) -> Result<()> {
        if pid == self.pid && self.process.is_some() {
            return Ok(());
        }

        // Release the old handle before asking for a new one.
        self.process = None;
        self.clear_frame();
        self.pid = pid;

        let process = self.provider.open_process(pid)?;
        info!("Switched to process {}", pid);
        self.process = Some(process);
        Ok(())
    }

    /// Watch the header at `address`. Zero means nothing to watch.
    pub fn set_target(&mut self, address: u64) {
        self.disposed = false;
        if address != self.target {
            debug!("Target {:#x} -> {:#x}", self.target, address);
            self.target = address;
            self.tracker.reset();
            self.descriptor = None;
            self.stride = None;
        }
    }

    /// Set the target from debugger expression text.
    pub fn set_target_expression(&mut self, text: &str) -> ExpressionValue {
        let value = classify_expression(text);
        match value {
            ExpressionValue::Address(address) => self.set_target(address),
            ExpressionValue::Disposed => {
                self.set_target(0);
                self.disposed = true;
            }
            ExpressionValue::Unavailable => self.set_target(0),
        }
        value
    }

    pub fn set_options(&mut self, options: SessionOptions) {
        self.options = options;
        self.colorizer.set_hsv_two_channel(options.hsv_two_channel);
    }

    /// Make the next refresh re-sample regardless of change detection.
    pub fn force_refresh(&mut self) {
        self.tracker.reset();
    }

    /// Poll the target once.
    ///
    /// Absent objects are `Ok(Refresh::Absent)`. Any other failure leaves the
    /// previous sample in place and returns the error.
    pub fn refresh(&mut self) -> Result<Refresh> {
        self.state = FrameState::Decoding;

        match self.poll() {
            Ok(Some(refresh)) => {
                self.state = FrameState::Ready;
                Ok(refresh)
            }
            Ok(None) => Ok(self.enter_absent()),
            Err(e) if e.is_absent() => {
                if matches!(e, Error::LayoutMismatch(_)) {
                    self.decoder.invalidate();
                }
                debug!("Object absent: {}", e);
                Ok(self.enter_absent())
            }
            Err(e) => {
                if !self.is_process_alive() {
                    info!("Process {} exited during refresh", self.pid);
                    return Ok(self.enter_absent());
                }
                warn!("Refresh of {:#x} failed: {}", self.target, e);
                self.state = FrameState::Failed;
                Err(e)
            }
        }
    }

    /// `None` when there is nothing to show.
    fn poll(&mut self) -> Result<Option<Refresh>> {
        if self.target == 0 {
            return Ok(None);
        }
        let Some(process) = self.process.as_ref() else {
            return Ok(None);
        };
        if !process.is_alive() {
            info!("Process {} is gone", self.pid);
            return Ok(None);
        }

        let descriptor = self.decoder.decode(process, self.target)?;
        if descriptor.is_absent() {
            return Ok(None);
        }
        let stride = read_stride(process, &descriptor)?;
        let (rows, cols) = descriptor.geometry()?;
        let contiguous = is_contiguous(&descriptor, &stride);
        if self.options.verify_pointer_range {
            warn_on_range_mismatch(&descriptor, &stride);
        }

        let fingerprint = Fingerprint::new(&descriptor, &stride);
        let checksum = if self.options.check_content && !descriptor.is_empty() {
            Some(content_checksum(
                process,
                descriptor.data,
                stride.packed_len(rows),
            )?)
        } else {
            None
        };

        let change = self.tracker.assess(&fingerprint, checksum);
        if !change.needs_resample() {
            if let Some(current) = self.current.clone() {
                debug!("Frame at {:#x} unchanged", descriptor.data);
                self.descriptor = Some(descriptor);
                self.stride = Some(stride);
                return Ok(Some(Refresh::Stale(current)));
            }
        }

        let pixels = copy_pixels(process, descriptor.data, rows, &stride, contiguous)?;
        let sample = FrameSample::build(
            cols,
            rows,
            descriptor.matrix_type(),
            stride,
            contiguous,
            checksum,
            pixels,
            &self.colorizer,
        )?;

        info!(
            "Sampled {}x{} {} ({:?}, step {}{})",
            cols,
            rows,
            descriptor.matrix_type(),
            change,
            stride.actual,
            if contiguous { ", contiguous" } else { "" }
        );
        self.tracker.record(fingerprint, checksum);
        self.descriptor = Some(descriptor);
        self.stride = Some(stride);
        let sample = Arc::new(sample);
        self.current = Some(sample.clone());
        Ok(Some(Refresh::Ready(sample)))
    }

    /// False once detached or after the target process exits.
    pub fn is_process_alive(&self) -> bool {
        self.process.as_ref().is_some_and(|p| p.is_alive())
    }

    fn clear_frame(&mut self) {
        self.current = None;
        self.descriptor = None;
        self.stride = None;
        self.tracker.reset();
    }

    fn enter_absent(&mut self) -> Refresh {
        self.clear_frame();
        self.state = FrameState::Absent;
        Refresh::Absent
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn current(&self) -> Option<Arc<FrameSample>> {
        self.current.clone()
    }

    /// Header decoded by the last successful poll.
    pub fn descriptor(&self) -> Option<&MatrixDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn stride(&self) -> Option<&StrideInfo> {
        self.stride.as_ref()
    }

    pub fn decoder(&self) -> &HeaderDecoder {
        &self.decoder
    }

    /// True when the watched object was released or there is nothing to show.
    pub fn is_disposed(&self) -> bool {
        self.disposed || self.state == FrameState::Absent
    }

    pub fn type_description(&self) -> String {
        self.descriptor
            .map(|d| d.matrix_type().description())
            .unwrap_or_default()
    }

    pub fn width(&self) -> usize {
        self.descriptor
            .and_then(|d| d.geometry().ok())
            .map_or(0, |(_, cols)| cols)
    }

    pub fn height(&self) -> usize {
        self.descriptor
            .and_then(|d| d.geometry().ok())
            .map_or(0, |(rows, _)| rows)
    }

    /// Formatted live value of the pixel at `(x, y)`, or an empty string.
    pub fn pixel_value(&self, x: i64, y: i64) -> String {
        match (&self.process, &self.descriptor, &self.stride) {
            (Some(process), Some(descriptor), Some(stride)) => {
                query_pixel(process, descriptor, stride, x, y)
            }
            _ => String::new(),
        }
    }

    /// Release the process handle and the current frame.
    pub fn detach(&mut self) {
        if self.process.take().is_some() {
            info!("Detached from process {}", self.pid);
        }
        self.enter_absent();
    }
}
