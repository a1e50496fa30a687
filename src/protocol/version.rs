use crate::VncError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// A protocol version as exchanged in the first 12 bytes of the session.
///
/// The client accepts any well-formed `RFB xxx.yyy\n` announcement and
/// always answers with 3.8; servers announcing anything else either speak
/// 3.8 anyway or fail the security handshake on their side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolVersion {
    pub major: u16,
    pub minor: u16,
}

impl ProtocolVersion {
    pub const RFB38: ProtocolVersion = ProtocolVersion { major: 3, minor: 8 };

    pub(crate) async fn read<S>(reader: &mut S) -> Result<Self, VncError>
    where
        S: AsyncRead + Unpin,
    {
        let mut buffer = [0_u8; 12];
        reader.read_exact(&mut buffer).await?;
        Self::parse(&buffer)
            .ok_or_else(|| VncError::Protocol(format!("bad protocol version {buffer:?}")))
    }

    pub(crate) async fn write<S>(self, writer: &mut S) -> Result<(), VncError>
    where
        S: AsyncWrite + Unpin,
    {
        let line = format!("RFB {:03}.{:03}\n", self.major, self.minor);
        writer.write_all(line.as_bytes()).await?;
        Ok(())
    }

    fn parse(buffer: &[u8; 12]) -> Option<Self> {
        if &buffer[..4] != b"RFB " || buffer[7] != b'.' || buffer[11] != b'\n' {
            return None;
        }
        let digits = |bytes: &[u8]| -> Option<u16> {
            let text = std::str::from_utf8(bytes).ok()?;
            text.parse().ok()
        };
        Some(Self {
            major: digits(&buffer[4..7])?,
            minor: digits(&buffer[8..11])?,
        })
    }
}
