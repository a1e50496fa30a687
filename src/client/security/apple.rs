//! Apple Remote Desktop authentication (security type 30).
//!
//! The scheme is Diffie-Hellman key agreement followed by AES-128-ECB:
//! the server sends its DH group and public key, the client answers with
//! the credentials encrypted under MD5(shared secret) plus its own
//! public key. The byte layout is not part of any published spec; this
//! matches the behaviour observed against macOS Screen Sharing.

use crate::VncError;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;
use md5::{Digest, Md5};
use num_bigint::BigUint;
use num_traits::One;
use rand::RngCore;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

/// Performs the whole type-30 exchange on `stream`.
///
/// There is no scheme-specific status byte; the RFB SecurityResult that
/// follows is read by the caller like any other security type.
pub(crate) async fn authenticate<S>(
    stream: &mut S,
    username: &str,
    password: &str,
) -> Result<(), VncError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // u16 generator, u16 key length, then the prime modulus and the
    // server public key, both key-length bytes, big-endian.
    let generator = stream.read_u16().await?;
    let key_len = stream.read_u16().await? as usize;
    debug!("Apple auth: generator {generator}, key length {key_len}");

    let mut prime = vec![0u8; key_len];
    stream.read_exact(&mut prime).await?;
    let mut server_key = vec![0u8; key_len];
    stream.read_exact(&mut server_key).await?;

    let p = BigUint::from_bytes_be(&prime);
    let y = BigUint::from_bytes_be(&server_key);
    if p <= BigUint::one() {
        return Err(VncError::Crypto("degenerate DH modulus".into()));
    }
    if y <= BigUint::one() || y >= &p - BigUint::one() {
        return Err(VncError::Crypto("server DH public key out of range".into()));
    }

    // Our side of the key agreement.
    let mut exponent = vec![0u8; key_len];
    rand::thread_rng().fill_bytes(&mut exponent);
    let x = BigUint::from_bytes_be(&exponent);
    let g = BigUint::from(generator);
    let public = g.modpow(&x, &p);
    let secret = y.modpow(&x, &p);

    let aes_key = Md5::digest(left_pad(&secret, key_len));
    let cipher = Aes128::new(&aes_key);

    let mut block = credentials_block(username, password)?;
    for chunk in block.chunks_exact_mut(16) {
        cipher.encrypt_block(GenericArray::from_mut_slice(chunk));
    }

    trace!("Apple auth: sending credentials and public key");
    stream.write_all(&block).await?;
    stream.write_all(&left_pad(&public, key_len)).await?;
    stream.flush().await?;
    Ok(())
}

/// Two 64-byte fields, username then password: the UTF-8 bytes, a NUL
/// terminator, and random fill for the remainder.
fn credentials_block(username: &str, password: &str) -> Result<[u8; 128], VncError> {
    let mut block = [0u8; 128];
    rand::thread_rng().fill_bytes(&mut block);
    for (field, value) in [(0, username), (64, password)] {
        let bytes = value.as_bytes();
        if bytes.len() > 63 {
            return Err(VncError::Crypto(format!(
                "credential field longer than 63 bytes ({} bytes)",
                bytes.len()
            )));
        }
        block[field..field + bytes.len()].copy_from_slice(bytes);
        block[field + bytes.len()] = 0;
    }
    Ok(block)
}

/// Big-endian bytes of `value`, left-padded with zeros to `len`.
fn left_pad(value: &BigUint, len: usize) -> Vec<u8> {
    let bytes = value.to_bytes_be();
    let mut padded = vec![0u8; len.saturating_sub(bytes.len())];
    padded.extend_from_slice(&bytes);
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes::cipher::BlockDecrypt;

    #[test]
    fn credentials_block_layout() {
        let block = credentials_block("admin", "hunter2").unwrap();
        assert_eq!(&block[..5], b"admin");
        assert_eq!(block[5], 0);
        assert_eq!(&block[64..71], b"hunter2");
        assert_eq!(block[71], 0);
    }

    #[test]
    fn oversized_credentials_are_refused() {
        let long = "x".repeat(64);
        assert!(credentials_block(&long, "pw").is_err());
        assert!(credentials_block("user", &long).is_err());
    }

    #[test]
    fn left_pad_preserves_value() {
        let value = BigUint::from(0x1234u32);
        assert_eq!(left_pad(&value, 4), [0, 0, 0x12, 0x34]);
        assert_eq!(left_pad(&value, 2), [0x12, 0x34]);
    }

    #[tokio::test]
    async fn exchange_agrees_on_the_shared_secret() {
        // 2^255 - 19 as a 32-byte test modulus; any odd modulus works
        // for exercising the arithmetic.
        let mut prime = [0xffu8; 32];
        prime[0] = 0x7f;
        prime[31] = 0xed;
        let p = BigUint::from_bytes_be(&prime);
        let g = BigUint::from(2u32);
        let server_secret = BigUint::from(0x1001u32);
        let server_public = g.modpow(&server_secret, &p);

        let (mut client, mut server) = tokio::io::duplex(4096);
        let auth = tokio::spawn(async move {
            authenticate(&mut client, "admin", "hunter2").await.unwrap();
            client
        });

        server.write_all(&2u16.to_be_bytes()).await.unwrap();
        server.write_all(&32u16.to_be_bytes()).await.unwrap();
        server.write_all(&prime).await.unwrap();
        server.write_all(&left_pad(&server_public, 32)).await.unwrap();

        let mut ciphertext = [0u8; 128];
        server.read_exact(&mut ciphertext).await.unwrap();
        let mut client_public = [0u8; 32];
        server.read_exact(&mut client_public).await.unwrap();
        auth.await.unwrap();

        // Derive the same AES key on the server side and decrypt.
        let secret = BigUint::from_bytes_be(&client_public).modpow(&server_secret, &p);
        let key = Md5::digest(left_pad(&secret, 32));
        let cipher = Aes128::new(&key);
        for chunk in ciphertext.chunks_exact_mut(16) {
            cipher.decrypt_block(GenericArray::from_mut_slice(chunk));
        }
        assert_eq!(&ciphertext[..6], b"admin\0");
        assert_eq!(&ciphertext[64..72], b"hunter2\0");
    }

    #[tokio::test]
    async fn out_of_range_server_key_is_rejected() {
        let mut prime = [0xffu8; 32];
        prime[0] = 0x7f;
        prime[31] = 0xed;

        let (mut client, mut server) = tokio::io::duplex(4096);
        let auth = tokio::spawn(async move {
            authenticate(&mut client, "admin", "hunter2").await
        });

        server.write_all(&2u16.to_be_bytes()).await.unwrap();
        server.write_all(&32u16.to_be_bytes()).await.unwrap();
        server.write_all(&prime).await.unwrap();
        server.write_all(&[0u8; 32]).await.unwrap(); // public key = 0

        let result = auth.await.unwrap();
        assert!(matches!(result, Err(VncError::Crypto(_))));
    }
}
