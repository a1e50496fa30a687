pub mod encoding;
pub mod keysym;
pub mod messages;
pub mod pixel_format;
pub mod rect;
pub mod security;
pub mod version;
pub(crate) mod wire;

pub use encoding::Encoding;
pub use messages::ClientMsg;
pub use pixel_format::PixelFormat;
pub use rect::{Rect, Screen};
pub use security::SecurityType;
pub use version::ProtocolVersion;
