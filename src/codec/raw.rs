use crate::protocol::{PixelFormat, Rect};
use crate::VncError;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Raw-encoding decoder: the rectangle is exactly w * h * bpp wire
/// pixels.
pub(crate) struct Decoder;

impl Decoder {
    pub(crate) fn new() -> Self {
        Self
    }

    /// Reads one Raw rectangle and returns its pixels in RGBA order.
    pub(crate) async fn decode<S>(
        &mut self,
        format: &PixelFormat,
        rect: &Rect,
        input: &mut S,
    ) -> Result<Vec<u8>, VncError>
    where
        S: AsyncRead + Unpin,
    {
        let bytes_per_pixel = (format.bits_per_pixel / 8) as usize;
        let mut pixels = vec![0u8; rect.pixel_count() * bytes_per_pixel];
        input.read_exact(&mut pixels).await?;
        format.decode_to_rgba(pixels)
    }
}
