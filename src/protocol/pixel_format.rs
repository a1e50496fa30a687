use crate::VncError;
use tokio::io::{AsyncRead, AsyncReadExt};

/// The 16-byte pixel format descriptor from ServerInit / SetPixelFormat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormat {
    pub bits_per_pixel: u8,
    pub depth: u8,
    pub big_endian: bool,
    pub true_colour: bool,
    pub red_max: u16,
    pub green_max: u16,
    pub blue_max: u16,
    pub red_shift: u8,
    pub green_shift: u8,
    pub blue_shift: u8,
}

impl PixelFormat {
    /// The canonical client format: 32-bit true colour, little-endian,
    /// red in the lowest byte. Decoding this format is a straight copy
    /// into the RGBA framebuffer.
    pub fn rgba() -> Self {
        Self {
            bits_per_pixel: 32,
            depth: 24,
            big_endian: false,
            true_colour: true,
            red_max: 255,
            green_max: 255,
            blue_max: 255,
            red_shift: 0,
            green_shift: 8,
            blue_shift: 16,
        }
    }

    pub(crate) fn is_rgba(&self) -> bool {
        *self == Self::rgba()
    }

    pub(crate) async fn read<S>(reader: &mut S) -> Result<Self, VncError>
    where
        S: AsyncRead + Unpin,
    {
        let mut bytes = [0u8; 16];
        reader.read_exact(&mut bytes).await?;
        Ok(Self {
            bits_per_pixel: bytes[0],
            depth: bytes[1],
            big_endian: bytes[2] != 0,
            true_colour: bytes[3] != 0,
            red_max: u16::from_be_bytes([bytes[4], bytes[5]]),
            green_max: u16::from_be_bytes([bytes[6], bytes[7]]),
            blue_max: u16::from_be_bytes([bytes[8], bytes[9]]),
            red_shift: bytes[10],
            green_shift: bytes[11],
            blue_shift: bytes[12],
            // bytes[13..16] are padding
        })
    }

    pub(crate) fn to_bytes(self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[0] = self.bits_per_pixel;
        bytes[1] = self.depth;
        bytes[2] = self.big_endian.into();
        bytes[3] = self.true_colour.into();
        bytes[4..6].copy_from_slice(&self.red_max.to_be_bytes());
        bytes[6..8].copy_from_slice(&self.green_max.to_be_bytes());
        bytes[8..10].copy_from_slice(&self.blue_max.to_be_bytes());
        bytes[10] = self.red_shift;
        bytes[11] = self.green_shift;
        bytes[12] = self.blue_shift;
        bytes
    }

    /// Converts wire pixels in this format to RGBA memory order.
    ///
    /// Servers are expected to honour the SetPixelFormat we send right
    /// after ServerInit, making this a pass-through; the shift/mask path
    /// covers servers that ignore it but stay at 32 bpp.
    pub(crate) fn decode_to_rgba(&self, src: Vec<u8>) -> Result<Vec<u8>, VncError> {
        if self.bits_per_pixel != 32 {
            return Err(VncError::Protocol(format!(
                "unsupported bits-per-pixel {}",
                self.bits_per_pixel
            )));
        }
        if src.len() % 4 != 0 {
            return Err(VncError::Protocol("pixel data length not a multiple of 4".into()));
        }
        if self.is_rgba() {
            return Ok(src);
        }
        let mut out = vec![0u8; src.len()];
        for (px, dst) in src.chunks_exact(4).zip(out.chunks_exact_mut(4)) {
            let raw = if self.big_endian {
                u32::from_be_bytes([px[0], px[1], px[2], px[3]])
            } else {
                u32::from_le_bytes([px[0], px[1], px[2], px[3]])
            };
            dst[0] = Self::channel(raw, self.red_shift, self.red_max);
            dst[1] = Self::channel(raw, self.green_shift, self.green_max);
            dst[2] = Self::channel(raw, self.blue_shift, self.blue_max);
            dst[3] = 255;
        }
        Ok(out)
    }

    fn channel(raw: u32, shift: u8, max: u16) -> u8 {
        if max == 0 {
            return 0;
        }
        let value = (raw >> shift) & max as u32;
        if max == 255 {
            value as u8
        } else {
            (value * 255 / max as u32) as u8
        }
    }
}
