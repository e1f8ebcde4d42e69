//! Binding to the external pseudo-color mapper library.
//!
//! Compiled with the `native-mapper` feature. The library is linked as
//! `pseudocolor` (`pseudocolor.dll` / `libpseudocolor.so`).

use std::ffi::{c_int, c_void};
use std::ptr::NonNull;

use tracing::debug;

use crate::color::PseudoColorMode;
use crate::color::mapper::{MapperFactory, PseudoColorMapper, RawFrame, check_destination};
use crate::error::{Error, Result};

#[link(name = "pseudocolor")]
unsafe extern "C" {
    fn create_pseudo_color_mapper(mode: c_int) -> *mut c_void;
    fn delete_pseudo_color_mapper(mapper: *mut c_void);
    fn set_color_mode(mapper: *mut c_void, mode: c_int);
    fn apply_pseudo_color(
        mapper: *mut c_void,
        input_data: *const u8,
        input_width: c_int,
        input_height: c_int,
        input_channels: c_int,
        output_data: *mut u8,
        target_channel: c_int,
    ) -> c_int;
    fn get_color_bar(mapper: *mut c_void, output_data: *mut u8, width: c_int, height: c_int)
    -> c_int;
}

/// All channels, as opposed to a single selected one.
const ALL_CHANNELS: c_int = -1;

fn to_c_int(value: usize, what: &str) -> Result<c_int> {
    c_int::try_from(value)
        .map_err(|_| Error::MapperFailure(format!("{} {} exceeds the native range", what, value)))
}

/// Owned native mapper instance, destroyed on drop.
pub struct NativeMapper {
    handle: NonNull<c_void>,
    mode: PseudoColorMode,
}

impl NativeMapper {
    pub fn new(mode: PseudoColorMode) -> Result<Self> {
        // SAFETY: plain constructor call; a null return is handled below.
        let raw = unsafe { create_pseudo_color_mapper(mode.code()) };
        let handle = NonNull::new(raw)
            .ok_or_else(|| Error::MapperFailure("create_pseudo_color_mapper returned null".into()))?;
        debug!("Created native mapper ({})", mode);
        Ok(Self { handle, mode })
    }
}

impl Drop for NativeMapper {
    fn drop(&mut self) {
        // SAFETY: the handle came from create_pseudo_color_mapper and is released exactly once.
        unsafe { delete_pseudo_color_mapper(self.handle.as_ptr()) };
    }
}

impl PseudoColorMapper for NativeMapper {
    fn mode(&self) -> PseudoColorMode {
        self.mode
    }

    fn set_mode(&mut self, mode: PseudoColorMode) -> Result<()> {
        // SAFETY: the handle is live for the lifetime of self.
        unsafe { set_color_mode(self.handle.as_ptr(), mode.code()) };
        self.mode = mode;
        Ok(())
    }

    fn apply(&mut self, frame: &RawFrame<'_>, dst: &mut [u8], dst_step: usize) -> Result<()> {
        let row_len = frame.width * 3;
        check_destination(dst, row_len, dst_step, frame.height)?;
        if frame.data.len() < frame.height * frame.row_len() {
            return Err(Error::MapperFailure("source frame is truncated".into()));
        }

        // The library writes tightly packed BGR rows.
        let mut packed = vec![0u8; frame.height * row_len];
        // SAFETY: `frame.data` covers height * width * bytes_per_pixel bytes and `packed`
        // covers height * width * 3 bytes, the sizes the library reads and writes.
        let ok = unsafe {
            apply_pseudo_color(
                self.handle.as_ptr(),
                frame.data.as_ptr(),
                to_c_int(frame.width, "width")?,
                to_c_int(frame.height, "height")?,
                to_c_int(frame.matrix_type.channels as usize, "channels")?,
                packed.as_mut_ptr(),
                ALL_CHANNELS,
            )
        };
        if ok == 0 {
            return Err(Error::MapperFailure(format!(
                "apply_pseudo_color rejected {}x{} {}",
                frame.width, frame.height, frame.matrix_type
            )));
        }

        for (y, row) in packed.chunks_exact(row_len.max(1)).enumerate().take(frame.height) {
            dst[y * dst_step..y * dst_step + row_len].copy_from_slice(row);
        }
        Ok(())
    }

    fn color_bar(&mut self, dst: &mut [u8], width: usize, height: usize) -> Result<()> {
        let step = width * 3;
        check_destination(dst, step, step, height)?;
        // SAFETY: `dst` holds at least width * 3 * height bytes.
        let ok = unsafe {
            get_color_bar(
                self.handle.as_ptr(),
                dst.as_mut_ptr(),
                to_c_int(width, "width")?,
                to_c_int(height, "height")?,
            )
        };
        if ok == 0 {
            return Err(Error::MapperFailure("get_color_bar failed".into()));
        }
        Ok(())
    }
}

/// Factory for [`NativeMapper`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeMapperFactory;

impl MapperFactory for NativeMapperFactory {
    fn name(&self) -> &str {
        "native"
    }

    fn create(&self, mode: PseudoColorMode) -> Result<Box<dyn PseudoColorMapper>> {
        Ok(Box::new(NativeMapper::new(mode)?))
    }
}
