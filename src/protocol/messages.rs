use crate::protocol::{Encoding, PixelFormat};
use crate::VncError;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Client-to-server messages (RFB 3.8 §7.5).
///
/// Each message is serialised into a single buffer and written with one
/// `write_all`, so messages from different tasks never interleave as long
/// as writes go through the session's write lock.
#[derive(Debug, Clone)]
pub enum ClientMsg {
    SetPixelFormat(PixelFormat),
    SetEncodings(Vec<Encoding>),
    FramebufferUpdateRequest {
        incremental: bool,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
    },
    KeyEvent {
        down: bool,
        keysym: u32,
    },
    PointerEvent {
        buttons: u8,
        x: u16,
        y: u16,
    },
    ClientCutText(Vec<u8>),
}

impl ClientMsg {
    pub(crate) async fn write<S>(&self, writer: &mut S) -> Result<(), VncError>
    where
        S: AsyncWrite + Unpin,
    {
        let mut buf = Vec::with_capacity(20);
        match self {
            ClientMsg::SetPixelFormat(format) => {
                buf.extend_from_slice(&[0, 0, 0, 0]);
                buf.extend_from_slice(&format.to_bytes());
            }
            ClientMsg::SetEncodings(encodings) => {
                buf.extend_from_slice(&[2, 0]);
                buf.extend_from_slice(&(encodings.len() as u16).to_be_bytes());
                for &encoding in encodings {
                    buf.extend_from_slice(&i32::from(encoding).to_be_bytes());
                }
            }
            ClientMsg::FramebufferUpdateRequest { incremental, x, y, width, height } => {
                buf.push(3);
                buf.push((*incremental).into());
                buf.extend_from_slice(&x.to_be_bytes());
                buf.extend_from_slice(&y.to_be_bytes());
                buf.extend_from_slice(&width.to_be_bytes());
                buf.extend_from_slice(&height.to_be_bytes());
            }
            ClientMsg::KeyEvent { down, keysym } => {
                buf.push(4);
                buf.push((*down).into());
                buf.extend_from_slice(&[0, 0]);
                buf.extend_from_slice(&keysym.to_be_bytes());
            }
            ClientMsg::PointerEvent { buttons, x, y } => {
                buf.push(5);
                buf.push(*buttons);
                buf.extend_from_slice(&x.to_be_bytes());
                buf.extend_from_slice(&y.to_be_bytes());
            }
            ClientMsg::ClientCutText(data) => {
                buf.extend_from_slice(&[6, 0, 0, 0]);
                buf.extend_from_slice(&(data.len() as u32).to_be_bytes());
                buf.extend_from_slice(data);
            }
        }
        writer.write_all(&buf).await?;
        writer.flush().await?;
        Ok(())
    }
}

/// Server-to-client message type codes (RFB 3.8 §7.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum ServerMsgType {
    FramebufferUpdate = 0,
    SetColourMapEntries = 1,
    Bell = 2,
    ServerCutText = 3,
}

impl TryFrom<u8> for ServerMsgType {
    type Error = VncError;
    fn try_from(num: u8) -> Result<Self, Self::Error> {
        match num {
            0 => Ok(ServerMsgType::FramebufferUpdate),
            1 => Ok(ServerMsgType::SetColourMapEntries),
            2 => Ok(ServerMsgType::Bell),
            3 => Ok(ServerMsgType::ServerCutText),
            unknown => Err(VncError::Protocol(format!("unknown server message {unknown}"))),
        }
    }
}
