//! Bounded formatting over `core::fmt::Arguments`.
//!
//! The capture path measures first (`written_len`), reserves exactly that
//! many bytes, then renders into the reserved slot (`format_to_buffer`).
//! The synchronous logger renders in one pass into a fixed buffer and
//! needs to know whether the render was clipped (`format_clipped`).

use core::fmt::{self, Write};

/// Measure the rendered length of `args` without storing the output.
pub fn written_len(args: fmt::Arguments<'_>) -> usize {
    struct CountWriter {
        len: usize,
    }

    impl Write for CountWriter {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            self.len += s.len();
            Ok(())
        }
    }

    let mut writer = CountWriter { len: 0 };
    let _ = fmt::write(&mut writer, args);
    writer.len
}

/// Render `args` into `buf`, clipping at capacity.
///
/// Returns the number of bytes written and whether output was clipped.
pub fn format_clipped(buf: &mut [u8], args: fmt::Arguments<'_>) -> (usize, bool) {
    struct BufWriter<'a> {
        buf: &'a mut [u8],
        pos: usize,
        clipped: bool,
    }

    impl Write for BufWriter<'_> {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            let bytes = s.as_bytes();
            let remaining = self.buf.len() - self.pos;
            let to_write = bytes.len().min(remaining);
            self.buf[self.pos..self.pos + to_write].copy_from_slice(&bytes[..to_write]);
            self.pos += to_write;
            if to_write < bytes.len() {
                self.clipped = true;
            }
            Ok(())
        }
    }

    let mut writer = BufWriter {
        buf,
        pos: 0,
        clipped: false,
    };
    let _ = fmt::write(&mut writer, args);
    (writer.pos, writer.clipped)
}

/// Render `args` into `buf`, truncating at capacity.
///
/// Returns the number of bytes written.
#[inline]
pub fn format_to_buffer(buf: &mut [u8], args: fmt::Arguments<'_>) -> usize {
    format_clipped(buf, args).0
}
