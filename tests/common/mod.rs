//! A scripted RFB server half for wire-level tests.
#![allow(dead_code)]

use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

/// The canonical 32-bit RGBA pixel format as 16 ServerInit bytes.
pub const RGBA_FORMAT: [u8; 16] = [
    0x20, 0x18, 0x00, 0x01, 0x00, 0xff, 0x00, 0xff, 0x00, 0xff, 0x00, 0x08, 0x10, 0, 0, 0,
];

/// Bytes the client must send after ServerInit: SetPixelFormat with the
/// canonical format, then SetEncodings [zlib, raw].
pub fn expected_negotiation() -> Vec<u8> {
    let mut bytes = vec![0, 0, 0, 0];
    bytes.extend_from_slice(&RGBA_FORMAT);
    bytes.extend_from_slice(b"\x02\x00\x00\x02\x00\x00\x00\x06\x00\x00\x00\x00");
    bytes
}

/// Drives the version and security-type-None stages, then ServerInit,
/// and consumes the client's format/encoding negotiation.
pub async fn serve_none_handshake(
    server: &mut DuplexStream,
    width: u16,
    height: u16,
    name: &str,
) {
    server.write_all(b"RFB 003.008\n").await.unwrap();
    let mut version = [0u8; 12];
    server.read_exact(&mut version).await.unwrap();
    assert_eq!(&version, b"RFB 003.008\n");

    server.write_all(&[1, 1]).await.unwrap();
    let mut choice = [0u8; 1];
    server.read_exact(&mut choice).await.unwrap();
    assert_eq!(choice[0], 1);
    server.write_all(&0u32.to_be_bytes()).await.unwrap();

    serve_init(server, width, height, name).await;
}

/// ClientInit + ServerInit + the client's negotiation messages.
pub async fn serve_init(server: &mut DuplexStream, width: u16, height: u16, name: &str) {
    let mut shared = [0u8; 1];
    server.read_exact(&mut shared).await.unwrap();
    assert_eq!(shared[0], 1);

    server.write_all(&width.to_be_bytes()).await.unwrap();
    server.write_all(&height.to_be_bytes()).await.unwrap();
    server.write_all(&RGBA_FORMAT).await.unwrap();
    server
        .write_all(&(name.len() as u32).to_be_bytes())
        .await
        .unwrap();
    server.write_all(name.as_bytes()).await.unwrap();

    let mut negotiated = vec![0u8; expected_negotiation().len()];
    server.read_exact(&mut negotiated).await.unwrap();
    assert_eq!(negotiated, expected_negotiation());
}

/// A FramebufferUpdate header for `rects` rectangles.
pub fn update_header(rects: u16) -> Vec<u8> {
    let mut bytes = vec![0, 0];
    bytes.extend_from_slice(&rects.to_be_bytes());
    bytes
}

/// One rectangle header: geometry plus encoding.
pub fn rect_header(x: u16, y: u16, width: u16, height: u16, encoding: i32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(12);
    bytes.extend_from_slice(&x.to_be_bytes());
    bytes.extend_from_slice(&y.to_be_bytes());
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&encoding.to_be_bytes());
    bytes
}
