use std::sync::{Arc, Mutex as StdMutex};

use tokio::io::AsyncWrite;
use tokio::sync::Mutex;

use crate::protocol::messages::ClientMsg;
use crate::protocol::{Rect, Screen};
use crate::VncError;

/// The client-side mirror of the server's screen contents.
///
/// Pixels are RGBA in memory order regardless of the wire format; the
/// parallel `written` mask records which pixels any update has ever
/// touched and drives [`Framebuffer::detect_screens`].
pub(crate) struct Framebuffer {
    width: u16,
    height: u16,
    data: Vec<u8>,
    written: Vec<bool>,
}

impl Framebuffer {
    pub(crate) fn new(width: u16, height: u16) -> Self {
        let pixels = width as usize * height as usize;
        Self {
            width,
            height,
            data: vec![0u8; pixels * 4],
            written: vec![false; pixels],
        }
    }

    pub(crate) fn width(&self) -> u16 {
        self.width
    }

    pub(crate) fn height(&self) -> u16 {
        self.height
    }

    /// Copies an RGBA rectangle into the buffer, forcing alpha opaque
    /// and marking the pixels written. macOS servers send zero alpha
    /// for everything, so the source alpha channel is not trusted.
    pub(crate) fn blit(&mut self, rect: &Rect, rgba: &[u8]) -> Result<(), VncError> {
        let (x, y) = (rect.x as usize, rect.y as usize);
        let (w, h) = (rect.width as usize, rect.height as usize);
        if x + w > self.width as usize || y + h > self.height as usize {
            return Err(VncError::Protocol(format!(
                "rectangle {rect:?} exceeds the {}x{} framebuffer",
                self.width, self.height
            )));
        }
        if rgba.len() != w * h * 4 {
            return Err(VncError::Protocol(format!(
                "rectangle {rect:?} carried {} bytes, expected {}",
                rgba.len(),
                w * h * 4
            )));
        }
        for row in 0..h {
            let src = row * w * 4;
            let pixel = (y + row) * self.width as usize + x;
            let dst = pixel * 4;
            self.data[dst..dst + w * 4].copy_from_slice(&rgba[src..src + w * 4]);
            for px in self.data[dst..dst + w * 4].chunks_exact_mut(4) {
                px[3] = 255;
            }
            self.written[pixel..pixel + w].fill(true);
        }
        Ok(())
    }

    pub(crate) fn as_rgba(&self) -> Vec<u8> {
        self.data.clone()
    }

    /// Partitions the written mask into screens: consecutive non-empty
    /// rows form bands, consecutive non-empty columns within a band form
    /// rectangles, ordered by y then x.
    ///
    /// A mask that is completely full or completely empty carries no
    /// layout information and yields nothing.
    pub(crate) fn detect_screens(&self) -> Vec<Screen> {
        let (w, h) = (self.width as usize, self.height as usize);
        if w == 0 || h == 0 {
            return Vec::new();
        }
        let written = self.written.iter().filter(|&&p| p).count();
        if written == 0 || written == w * h {
            return Vec::new();
        }

        let row_used: Vec<bool> = (0..h)
            .map(|y| self.written[y * w..(y + 1) * w].iter().any(|&p| p))
            .collect();

        let mut screens = Vec::new();
        let mut y = 0;
        while y < h {
            if !row_used[y] {
                y += 1;
                continue;
            }
            let top = y;
            while y < h && row_used[y] {
                y += 1;
            }
            let bottom = y;

            let col_used =
                |x: usize| (top..bottom).any(|row| self.written[row * w + x]);
            let mut x = 0;
            while x < w {
                if !col_used(x) {
                    x += 1;
                    continue;
                }
                let left = x;
                while x < w && col_used(x) {
                    x += 1;
                }
                screens.push(Screen {
                    x: left as u16,
                    y: top as u16,
                    width: (x - left) as u16,
                    height: (bottom - top) as u16,
                });
            }
        }
        screens
    }
}

/// The video surface: update requests out, decoded pixels in.
///
/// Cheaply cloneable; reads return snapshots of the framebuffer taken
/// under a short lock, so a clone never observes a partially applied
/// rectangle.
pub struct Video<W> {
    writer: Arc<Mutex<W>>,
    framebuffer: Arc<StdMutex<Framebuffer>>,
}

impl<W> Clone for Video<W> {
    fn clone(&self) -> Self {
        Self {
            writer: self.writer.clone(),
            framebuffer: self.framebuffer.clone(),
        }
    }
}

impl<W> Video<W>
where
    W: AsyncWrite + Unpin,
{
    pub(crate) fn new(writer: Arc<Mutex<W>>, framebuffer: Arc<StdMutex<Framebuffer>>) -> Self {
        Self {
            writer,
            framebuffer,
        }
    }

    /// Requests an update of the whole framebuffer. Pass
    /// `incremental = false` to make the server resend everything it
    /// has, not just what changed.
    pub async fn refresh(&self, incremental: bool) -> Result<(), VncError> {
        let (width, height) = self.size();
        self.request(incremental, 0, 0, width, height).await
    }

    /// Requests an update of a region, clamped to the framebuffer
    /// bounds.
    pub async fn refresh_area(
        &self,
        incremental: bool,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Result<(), VncError> {
        let (fb_width, fb_height) = self.size();
        let x = x.min(fb_width);
        let y = y.min(fb_height);
        let width = width.min(fb_width - x);
        let height = height.min(fb_height - y);
        self.request(incremental, x, y, width, height).await
    }

    async fn request(
        &self,
        incremental: bool,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    ) -> Result<(), VncError> {
        ClientMsg::FramebufferUpdateRequest {
            incremental,
            x,
            y,
            width,
            height,
        }
        .write(&mut *self.writer.lock().await)
        .await
    }

    /// A snapshot of the framebuffer as height * width * 4 RGBA bytes.
    pub fn as_rgba(&self) -> Vec<u8> {
        self.framebuffer.lock().unwrap().as_rgba()
    }

    /// Framebuffer dimensions as (width, height).
    pub fn size(&self) -> (u16, u16) {
        let fb = self.framebuffer.lock().unwrap();
        (fb.width(), fb.height())
    }

    /// Detects attached screens from the written-pixel mask. Only
    /// meaningful against servers (macOS, chiefly) that never paint the
    /// unoccupied regions between monitors.
    pub fn detect_screens(&self) -> Vec<Screen> {
        self.framebuffer.lock().unwrap().detect_screens()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: u16, y: u16, width: u16, height: u16) -> Rect {
        Rect { x, y, width, height }
    }

    #[test]
    fn blit_places_pixels_and_forces_alpha() {
        let mut fb = Framebuffer::new(4, 4);
        fb.blit(&rect(1, 2, 2, 1), &[1, 2, 3, 0, 5, 6, 7, 9]).unwrap();
        let data = fb.as_rgba();
        let at = |x: usize, y: usize| &data[(y * 4 + x) * 4..(y * 4 + x) * 4 + 4];
        assert_eq!(at(1, 2), [1, 2, 3, 255]);
        assert_eq!(at(2, 2), [5, 6, 7, 255]);
        assert_eq!(at(0, 2), [0, 0, 0, 0]);
    }

    #[test]
    fn blit_rejects_out_of_bounds_rectangles() {
        let mut fb = Framebuffer::new(4, 4);
        assert!(fb.blit(&rect(3, 0, 2, 1), &[0; 8]).is_err());
        assert!(fb.blit(&rect(0, 0, 1, 1), &[0; 8]).is_err());
    }

    #[test]
    fn two_disjoint_rectangles_are_detected_in_order() {
        let mut fb = Framebuffer::new(400, 300);
        fb.blit(&rect(200, 0, 100, 100), &vec![9; 100 * 100 * 4]).unwrap();
        fb.blit(&rect(0, 0, 100, 100), &vec![9; 100 * 100 * 4]).unwrap();
        assert_eq!(
            fb.detect_screens(),
            vec![
                Screen { x: 0, y: 0, width: 100, height: 100 },
                Screen { x: 200, y: 0, width: 100, height: 100 },
            ]
        );
    }

    #[test]
    fn stacked_bands_order_by_y() {
        let mut fb = Framebuffer::new(100, 100);
        fb.blit(&rect(40, 60, 20, 20), &vec![1; 20 * 20 * 4]).unwrap();
        fb.blit(&rect(10, 10, 20, 20), &vec![1; 20 * 20 * 4]).unwrap();
        assert_eq!(
            fb.detect_screens(),
            vec![
                Screen { x: 10, y: 10, width: 20, height: 20 },
                Screen { x: 40, y: 60, width: 20, height: 20 },
            ]
        );
    }

    #[tokio::test]
    async fn refresh_area_clamps_to_the_framebuffer() {
        use tokio::io::AsyncReadExt;

        let (client, mut server) = tokio::io::duplex(4096);
        let framebuffer = Arc::new(StdMutex::new(Framebuffer::new(100, 200)));
        let video = Video::new(Arc::new(Mutex::new(client)), framebuffer);

        video.refresh_area(false, 11, 12, 123, 224).await.unwrap();
        video.refresh_area(true, 11, 12, 23, 24).await.unwrap();

        let mut requests = [0u8; 20];
        server.read_exact(&mut requests).await.unwrap();
        assert_eq!(
            requests,
            [
                3, 0, 0, 11, 0, 12, 0, 89, 0, 188, // clamped to the edges
                3, 1, 0, 11, 0, 12, 0, 23, 0, 24, // already in bounds
            ]
        );
    }

    #[test]
    fn full_and_empty_masks_detect_nothing() {
        let mut fb = Framebuffer::new(8, 8);
        assert!(fb.detect_screens().is_empty());
        fb.blit(&rect(0, 0, 8, 8), &vec![7; 8 * 8 * 4]).unwrap();
        assert!(fb.detect_screens().is_empty());
    }
}
