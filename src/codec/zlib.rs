use crate::protocol::{PixelFormat, Rect};
use crate::VncError;
use flate2::{Decompress, FlushDecompress, Status};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Zlib-encoding decoder.
///
/// The server compresses every zlib rectangle into one deflate stream
/// for the whole session, so the inflate state here must live as long as
/// the connection and is never reset between rectangles or updates.
pub(crate) struct Decoder {
    inflate: Decompress,
}

impl Decoder {
    pub(crate) fn new() -> Self {
        Self {
            inflate: Decompress::new(true),
        }
    }

    /// Reads one zlib rectangle (u32 length + compressed bytes) and
    /// returns its pixels in RGBA order.
    pub(crate) async fn decode<S>(
        &mut self,
        format: &PixelFormat,
        rect: &Rect,
        input: &mut S,
    ) -> Result<Vec<u8>, VncError>
    where
        S: AsyncRead + Unpin,
    {
        let compressed_len = input.read_u32().await? as usize;
        let mut compressed = vec![0u8; compressed_len];
        input.read_exact(&mut compressed).await?;

        let bytes_per_pixel = (format.bits_per_pixel / 8) as usize;
        let expected = rect.pixel_count() * bytes_per_pixel;
        let pixels = self.inflate_exact(&compressed, expected)?;
        format.decode_to_rgba(pixels)
    }

    /// Feeds the whole payload to the shared inflate stream, expecting
    /// exactly `expected` bytes of output. The spare output byte lets
    /// zlib consume the sync-flush trailer that ends each rectangle.
    fn inflate_exact(&mut self, compressed: &[u8], expected: usize) -> Result<Vec<u8>, VncError> {
        let mut output = Vec::with_capacity(expected + 1);
        let mut offset = 0;
        while offset < compressed.len() {
            let consumed_before = self.inflate.total_in();
            let produced_before = output.len();
            let status = self
                .inflate
                .decompress_vec(&compressed[offset..], &mut output, FlushDecompress::None)
                .map_err(|e| VncError::Protocol(format!("inflate failed: {e}")))?;
            offset += (self.inflate.total_in() - consumed_before) as usize;
            if output.len() > expected {
                return Err(VncError::Protocol(
                    "zlib rectangle produced too much data".into(),
                ));
            }
            match status {
                Status::StreamEnd => break,
                Status::Ok | Status::BufError => {
                    let stalled = output.len() == produced_before
                        && self.inflate.total_in() == consumed_before;
                    if stalled {
                        return Err(VncError::Protocol("zlib rectangle stalled".into()));
                    }
                }
            }
        }
        if output.len() != expected {
            return Err(VncError::Protocol(format!(
                "zlib rectangle decoded {} bytes, expected {expected}",
                output.len()
            )));
        }
        Ok(output)
    }
}
