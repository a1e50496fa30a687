//! # RFB
//!
//! ## Description
//! + An async client implementation of the Remote Framebuffer (VNC) protocol
//!
//! Supports RFB 3.8 with the None, VNC (DES challenge-response) and Apple
//! Remote Desktop (Diffie-Hellman + AES-128-ECB) security types, Raw and
//! zlib-compressed Raw rectangle encodings, keyboard/mouse injection with
//! scoped holds, the shared clipboard, and heuristic multi-head screen
//! detection.
//!
//! ## Simple example
//!
//! ```no_run
//! use rfb::{connect, Credentials, ServerEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and authenticate
//!     let mut session = connect("127.0.0.1:5900")
//!         .await?
//!         .set_credentials(Credentials::password("password"))
//!         .handshake()
//!         .await?;
//!
//!     // Type into the remote desktop
//!     let keyboard = session.keyboard();
//!     keyboard.write("Hello, world!").await?;
//!
//!     // Request the whole screen and wait for it to arrive
//!     let video = session.video();
//!     video.refresh(false).await?;
//!     loop {
//!         match session.read().await? {
//!             ServerEvent::Framebuffer { .. } => break,
//!             ServerEvent::Bell => println!("Bell!"),
//!             ServerEvent::Clipboard(text) => println!("Clipboard: {text}"),
//!             _ => {}
//!         }
//!     }
//!     let (width, height) = video.size();
//!     let pixels = video.as_rgba();
//!     println!("Got {width}x{height} ({} bytes)", pixels.len());
//!
//!     session.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! A session is driven by calling [`Session::read`] from exactly one task;
//! the [`Keyboard`], [`Mouse`], [`Clipboard`] and [`Video`] handles are
//! cheaply cloneable and may be used from anywhere, serializing their
//! writes on the session's write lock.
//!
//! ## License
//!
//! Licensed under either of
//!
//!  * Apache License, Version 2.0
//!    ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//!  * MIT license
//!    ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

pub mod client;
pub mod codec;
pub mod error;
pub mod events;
pub mod protocol;

pub use client::{
    connect, Clipboard, Connector, Credentials, Keyboard, Mouse, MouseButton, Session, Video,
};
pub use error::VncError;
pub use events::ServerEvent;
pub use protocol::{Encoding, PixelFormat, Rect, Screen, SecurityType};
