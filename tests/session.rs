//! Message-loop, input and screen-detection tests against a scripted
//! server.

mod common;

use common::{rect_header, serve_none_handshake, update_header};
use flate2::{Compress, Compression, FlushCompress};
use rfb::{Connector, Screen, ServerEvent, VncError};
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};

async fn session_over(
    width: u16,
    height: u16,
) -> (rfb::Session<DuplexStream>, DuplexStream) {
    let (client, mut server) = tokio::io::duplex(1 << 20);
    let handshake = Connector::new(client).handshake();
    let serve = async {
        serve_none_handshake(&mut server, width, height, "testdesk").await;
    };
    let (session, ()) = tokio::join!(handshake, serve);
    (session.unwrap(), server)
}

#[tokio::test]
async fn raw_update_lands_in_the_framebuffer() {
    let (mut session, mut server) = session_over(2, 2).await;

    let mut update = update_header(1);
    update.extend_from_slice(&rect_header(0, 0, 2, 2, 0));
    update.extend_from_slice(&[
        0xff, 0x00, 0x00, 0xff, // red
        0x00, 0xff, 0x00, 0xff, // green
        0x00, 0x00, 0xff, 0xff, // blue
        0xff, 0xff, 0xff, 0xff, // white
    ]);
    server.write_all(&update).await.unwrap();

    assert_eq!(
        session.read().await.unwrap(),
        ServerEvent::Framebuffer { rects: 1 }
    );
    let video = session.video();
    let rgba = video.as_rgba();
    assert_eq!(rgba[..4], [255, 0, 0, 255]);
    assert_eq!(rgba[12..16], [255, 255, 255, 255]);
}

#[tokio::test]
async fn zlib_rectangles_share_one_inflate_stream() {
    let (mut session, mut server) = session_over(4, 2).await;

    let row: Vec<u8> = (1..=16u8).map(|b| if b % 4 == 0 { 0xff } else { b }).collect();
    let mut compressor = Compress::new(Compression::default(), true);
    let deflate = |compressor: &mut Compress, data: &[u8]| {
        let mut out = Vec::with_capacity(data.len() * 2 + 128);
        compressor
            .compress_vec(data, &mut out, FlushCompress::Sync)
            .unwrap();
        out
    };
    // The second chunk back-references the first chunk's window; it is
    // only decodable if the session keeps one stream across rectangles.
    let first = deflate(&mut compressor, &row);
    let second = deflate(&mut compressor, &row);

    let mut update = update_header(2);
    update.extend_from_slice(&rect_header(0, 0, 4, 1, 6));
    update.extend_from_slice(&(first.len() as u32).to_be_bytes());
    update.extend_from_slice(&first);
    update.extend_from_slice(&rect_header(0, 1, 4, 1, 6));
    update.extend_from_slice(&(second.len() as u32).to_be_bytes());
    update.extend_from_slice(&second);
    server.write_all(&update).await.unwrap();

    assert_eq!(
        session.read().await.unwrap(),
        ServerEvent::Framebuffer { rects: 2 }
    );
    let rgba = session.video().as_rgba();
    assert_eq!(&rgba[..16], &row[..]);
    assert_eq!(&rgba[16..], &row[..]);
}

#[tokio::test]
async fn two_screens_are_detected_in_order() {
    let (mut session, mut server) = session_over(400, 300).await;

    let pixels = vec![0x80u8; 100 * 100 * 4];
    let mut update = update_header(2);
    update.extend_from_slice(&rect_header(0, 0, 100, 100, 0));
    update.extend_from_slice(&pixels);
    update.extend_from_slice(&rect_header(200, 0, 100, 100, 0));
    update.extend_from_slice(&pixels);

    server.write_all(&update).await.unwrap();
    assert_eq!(
        session.read().await.unwrap(),
        ServerEvent::Framebuffer { rects: 2 }
    );

    assert_eq!(
        session.video().detect_screens(),
        vec![
            Screen { x: 0, y: 0, width: 100, height: 100 },
            Screen { x: 200, y: 0, width: 100, height: 100 },
        ]
    );
}

#[tokio::test]
async fn server_cut_text_updates_the_clipboard() {
    let (mut session, mut server) = session_over(8, 8).await;

    let mut msg = vec![3, 0, 0, 0];
    msg.extend_from_slice(&5u32.to_be_bytes());
    msg.extend_from_slice(&[b'h', b'o', b'l', b'a', 0xa1]);
    server.write_all(&msg).await.unwrap();

    let event = session.read().await.unwrap();
    assert_eq!(event, ServerEvent::Clipboard("hola\u{a1}".into()));
    assert_eq!(session.clipboard().text(), "hola\u{a1}");
}

#[tokio::test]
async fn bell_is_surfaced() {
    let (mut session, mut server) = session_over(8, 8).await;
    server.write_all(&[2]).await.unwrap();
    assert_eq!(session.read().await.unwrap(), ServerEvent::Bell);
}

#[tokio::test]
async fn colour_maps_are_skipped() {
    let (mut session, mut server) = session_over(8, 8).await;
    // SetColourMapEntries with two entries, then a bell.
    let mut msg = vec![1, 0, 0, 0, 0, 2];
    msg.extend_from_slice(&[0u8; 12]);
    msg.push(2);
    server.write_all(&msg).await.unwrap();
    assert_eq!(session.read().await.unwrap(), ServerEvent::Bell);
}

#[tokio::test]
async fn unknown_message_is_a_protocol_error() {
    let (mut session, mut server) = session_over(8, 8).await;
    server.write_all(&[0x99]).await.unwrap();
    assert!(matches!(
        session.read().await,
        Err(VncError::Protocol(_))
    ));
}

#[tokio::test]
async fn unknown_encoding_is_a_protocol_error() {
    let (mut session, mut server) = session_over(8, 8).await;
    let mut update = update_header(1);
    update.extend_from_slice(&rect_header(0, 0, 8, 8, 7)); // Tight: not ours
    server.write_all(&update).await.unwrap();
    assert!(matches!(
        session.read().await,
        Err(VncError::Protocol(_))
    ));
}

#[tokio::test]
async fn truncated_update_is_a_transport_error() {
    let (mut session, mut server) = session_over(8, 8).await;
    let mut update = update_header(1);
    update.extend_from_slice(&rect_header(0, 0, 8, 8, 0));
    update.extend_from_slice(&[0u8; 16]); // far short of 8*8*4
    server.write_all(&update).await.unwrap();
    drop(server);
    assert!(matches!(
        session.read().await,
        Err(VncError::Transport(_))
    ));
}

#[tokio::test]
async fn input_handles_write_through_the_session() {
    let (session, mut server) = session_over(64, 64).await;

    let keyboard = session.keyboard();
    let mouse = session.mouse();
    keyboard.press(&["Return"]).await.unwrap();
    mouse.move_to(10, 20).await.unwrap();

    let mut bytes = [0u8; 22];
    server.read_exact(&mut bytes).await.unwrap();
    assert_eq!(
        bytes,
        [
            4, 1, 0, 0, 0, 0, 0xff, 0x0d, // Return down
            4, 0, 0, 0, 0, 0, 0xff, 0x0d, // Return up
            5, 0, 0, 10, 0, 20, // pointer
        ]
    );
}

#[tokio::test]
async fn refresh_requests_the_full_area() {
    let (session, mut server) = session_over(11, 22).await;
    session.video().refresh(false).await.unwrap();
    let mut bytes = [0u8; 10];
    server.read_exact(&mut bytes).await.unwrap();
    assert_eq!(&bytes, b"\x03\x00\x00\x00\x00\x00\x00\x0b\x00\x16");
}

#[tokio::test]
async fn close_shuts_the_transport_down() {
    let (session, mut server) = session_over(8, 8).await;
    session.close().await.unwrap();
    // Nothing was held, so the server sees a clean EOF and no stray
    // release events.
    let mut buf = [0u8; 16];
    assert_eq!(server.read(&mut buf).await.unwrap(), 0);
}
