use std::sync::{Arc, Mutex as StdMutex};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::client::video::Framebuffer;
use crate::client::{Clipboard, Keyboard, Mouse, Video};
use crate::codec::{RawDecoder, ZlibDecoder};
use crate::events::ServerEvent;
use crate::protocol::messages::ServerMsgType;
use crate::protocol::{wire, Encoding, PixelFormat, Rect};
use crate::VncError;

/// An authenticated RFB session.
///
/// Exactly one task should drive [`read`]; the input and video handles
/// are clones that serialise their writes on the session's write lock
/// and may live anywhere.
///
/// [`read`]: Session::read
pub struct Session<S> {
    reader: ReadHalf<S>,
    writer: Arc<Mutex<WriteHalf<S>>>,
    format: PixelFormat,
    framebuffer: Arc<StdMutex<Framebuffer>>,
    raw: RawDecoder,
    zlib: ZlibDecoder,
    keyboard: Keyboard<WriteHalf<S>>,
    mouse: Mouse<WriteHalf<S>>,
    clipboard: Clipboard<WriteHalf<S>>,
    video: Video<WriteHalf<S>>,
    name: String,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub(crate) fn new(
        stream: S,
        format: PixelFormat,
        width: u16,
        height: u16,
        name: String,
    ) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        let writer = Arc::new(Mutex::new(writer));
        let framebuffer = Arc::new(StdMutex::new(Framebuffer::new(width, height)));
        Self {
            reader,
            keyboard: Keyboard::new(writer.clone()),
            mouse: Mouse::new(writer.clone()),
            clipboard: Clipboard::new(writer.clone()),
            video: Video::new(writer.clone(), framebuffer.clone()),
            writer,
            format,
            framebuffer,
            raw: RawDecoder::new(),
            zlib: ZlibDecoder::new(),
            name,
        }
    }

    /// The desktop name from ServerInit.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The virtual keyboard.
    pub fn keyboard(&self) -> Keyboard<WriteHalf<S>> {
        self.keyboard.clone()
    }

    /// The virtual mouse.
    pub fn mouse(&self) -> Mouse<WriteHalf<S>> {
        self.mouse.clone()
    }

    /// The shared clipboard.
    pub fn clipboard(&self) -> Clipboard<WriteHalf<S>> {
        self.clipboard.clone()
    }

    /// The video surface.
    pub fn video(&self) -> Video<WriteHalf<S>> {
        self.video.clone()
    }

    /// Reads server messages until one produces an event.
    ///
    /// FramebufferUpdate rectangles are applied to the framebuffer
    /// before the event is returned, so no caller ever observes half a
    /// rectangle. SetColourMapEntries is read and dropped: the client
    /// forces true colour during the handshake, so colour maps carry
    /// nothing.
    pub async fn read(&mut self) -> Result<ServerEvent, VncError> {
        loop {
            let msg_type = ServerMsgType::try_from(self.reader.read_u8().await?)?;
            trace!("Server message: {msg_type:?}");
            match msg_type {
                ServerMsgType::FramebufferUpdate => {
                    let _padding = self.reader.read_u8().await?;
                    let rects = self.reader.read_u16().await?;
                    for _ in 0..rects {
                        self.read_rectangle().await?;
                    }
                    return Ok(ServerEvent::Framebuffer { rects });
                }
                ServerMsgType::SetColourMapEntries => {
                    let _padding = self.reader.read_u8().await?;
                    let _first_colour = self.reader.read_u16().await?;
                    let colours = self.reader.read_u16().await?;
                    let mut entries = vec![0u8; colours as usize * 6];
                    self.reader.read_exact(&mut entries).await?;
                    debug!("Ignoring colour map of {colours} entries");
                }
                ServerMsgType::Bell => return Ok(ServerEvent::Bell),
                ServerMsgType::ServerCutText => {
                    let mut padding = [0u8; 3];
                    self.reader.read_exact(&mut padding).await?;
                    let text = wire::read_latin1(&mut self.reader).await?;
                    self.clipboard.set_text(text.clone());
                    return Ok(ServerEvent::Clipboard(text));
                }
            }
        }
    }

    async fn read_rectangle(&mut self) -> Result<(), VncError> {
        let rect = Rect::read(&mut self.reader).await?;
        let encoding = Encoding::try_from(self.reader.read_i32().await?)?;
        trace!("Rectangle {rect:?} encoded as {encoding:?}");
        let rgba = match encoding {
            Encoding::Raw => self.raw.decode(&self.format, &rect, &mut self.reader).await?,
            Encoding::Zlib => self.zlib.decode(&self.format, &rect, &mut self.reader).await?,
        };
        self.framebuffer.lock().unwrap().blit(&rect, &rgba)
    }

    /// Tears the session down: releases anything still held, then
    /// flushes and shuts the transport. Release and flush failures are
    /// ignored; a dead transport cannot be torn down more.
    pub async fn close(self) -> Result<(), VncError> {
        self.keyboard.release_all().await;
        self.mouse.release_all().await;
        let mut writer = self.writer.lock().await;
        let _ = writer.flush().await;
        let _ = writer.shutdown().await;
        Ok(())
    }
}
