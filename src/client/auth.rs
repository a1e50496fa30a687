use crate::VncError;
use des::cipher::generic_array::GenericArray;
use des::cipher::{BlockEncrypt, KeyInit};
use des::Des;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Credentials for the security handshake.
///
/// A username selects the Apple Remote Desktop scheme (which also needs
/// the password); a bare password selects VNC authentication; neither
/// selects the None type.
#[derive(Debug, Default, Clone)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// No authentication.
    pub fn none() -> Self {
        Self::default()
    }

    /// Password-only VNC authentication.
    pub fn password(password: impl Into<String>) -> Self {
        Self {
            username: None,
            password: Some(password.into()),
        }
    }

    /// Username and password for Apple Remote Desktop authentication.
    pub fn user_password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
        }
    }
}

/// The VNC authentication challenge-response.
///
/// Despite the name on the wire this is single DES: the password is
/// null-padded or truncated to 8 bytes, each key byte is bit-reversed
/// (the historical VNC quirk), and the two 8-byte halves of the
/// challenge are encrypted in ECB mode.
pub(crate) struct VncChallenge {
    challenge: [u8; 16],
    key: [u8; 8],
}

impl VncChallenge {
    pub(crate) async fn read<S>(reader: &mut S, password: &str) -> Result<Self, VncError>
    where
        S: AsyncRead + Unpin,
    {
        let mut challenge = [0u8; 16];
        reader.read_exact(&mut challenge).await?;

        let mut key = [0u8; 8];
        for (slot, &byte) in key.iter_mut().zip(password.as_bytes().iter().take(8)) {
            *slot = byte.reverse_bits();
        }
        Ok(Self { challenge, key })
    }

    pub(crate) async fn respond<S>(&self, writer: &mut S) -> Result<(), VncError>
    where
        S: AsyncWrite + Unpin,
    {
        writer.write_all(&self.encrypt()).await?;
        writer.flush().await?;
        Ok(())
    }

    fn encrypt(&self) -> [u8; 16] {
        let cipher = Des::new(&self.key.into());
        let mut response = self.challenge;
        let (first, second) = response.split_at_mut(8);
        cipher.encrypt_block(GenericArray::from_mut_slice(first));
        cipher.encrypt_block(GenericArray::from_mut_slice(second));
        response
    }
}
