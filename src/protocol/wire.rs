//! Length-prefixed string helpers shared by the handshake and the
//! message loop.

use crate::VncError;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Reads a u32-length-prefixed UTF-8 string.
pub(crate) async fn read_string<S>(reader: &mut S) -> Result<String, VncError>
where
    S: AsyncRead + Unpin,
{
    let length = reader.read_u32().await? as usize;
    let mut buffer = vec![0u8; length];
    reader.read_exact(&mut buffer).await?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Reads a u32-length-prefixed Latin-1 string (RFB cut text).
pub(crate) async fn read_latin1<S>(reader: &mut S) -> Result<String, VncError>
where
    S: AsyncRead + Unpin,
{
    let length = reader.read_u32().await? as usize;
    let mut buffer = vec![0u8; length];
    reader.read_exact(&mut buffer).await?;
    Ok(buffer.iter().map(|&b| b as char).collect())
}

/// Encodes text as Latin-1, refusing characters above U+00FF.
pub(crate) fn to_latin1(text: &str) -> Result<Vec<u8>, VncError> {
    text.chars()
        .map(|c| {
            u8::try_from(c as u32)
                .map_err(|_| VncError::Protocol(format!("character {c:?} is not Latin-1")))
        })
        .collect()
}
