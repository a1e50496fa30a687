use crate::protocol::wire;
use crate::VncError;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// The security types this client can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SecurityType {
    None = 1,
    VncAuth = 2,
    AppleRemoteDesktop = 30,
}

impl From<SecurityType> for u8 {
    fn from(e: SecurityType) -> Self {
        e as u8
    }
}

impl SecurityType {
    /// Reads the server's security-type list.
    ///
    /// A count of zero means the server refused the connection and is
    /// followed by a reason string.
    pub(crate) async fn read_offers<S>(reader: &mut S) -> Result<Vec<u8>, VncError>
    where
        S: AsyncRead + Unpin,
    {
        // +--------------------------+-------------+--------------------------+
        // | No. of bytes             | Type        | Description              |
        // +--------------------------+-------------+--------------------------+
        // | 1                        | U8          | number-of-security-types |
        // | number-of-security-types | U8 array    | security-types           |
        // +--------------------------+-------------+--------------------------+
        let num = reader.read_u8().await?;
        if num == 0 {
            let reason = wire::read_string(reader).await?;
            return Err(VncError::HandshakeRejected(reason));
        }
        let mut offers = vec![0u8; num as usize];
        reader.read_exact(&mut offers).await?;
        tracing::trace!("Server supported security types: {:?}", offers);
        Ok(offers)
    }

    pub(crate) async fn write<S>(self, writer: &mut S) -> Result<(), VncError>
    where
        S: AsyncWrite + Unpin,
    {
        writer.write_all(&[self.into()]).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn offers_are_read_verbatim() {
        let (mut client, mut server) = tokio::io::duplex(64);
        server.write_all(&[3, 30, 2, 1]).await.unwrap();
        assert_eq!(
            SecurityType::read_offers(&mut client).await.unwrap(),
            vec![30, 2, 1]
        );
    }

    #[tokio::test]
    async fn zero_offers_surface_the_reason() {
        let (mut client, mut server) = tokio::io::duplex(64);
        server.write_all(&[0]).await.unwrap();
        server.write_all(&7u32.to_be_bytes()).await.unwrap();
        server.write_all(b"blocked").await.unwrap();
        let err = SecurityType::read_offers(&mut client).await.unwrap_err();
        assert!(matches!(err, VncError::HandshakeRejected(reason) if reason == "blocked"));
    }
}
