use crate::VncError;

/// The rectangle encodings the client advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Encoding {
    Raw = 0,
    Zlib = 6,
}

impl TryFrom<i32> for Encoding {
    type Error = VncError;
    fn try_from(num: i32) -> Result<Self, Self::Error> {
        match num {
            0 => Ok(Encoding::Raw),
            6 => Ok(Encoding::Zlib),
            unknown => Err(VncError::Protocol(format!("unknown encoding {unknown}"))),
        }
    }
}

impl From<Encoding> for i32 {
    fn from(e: Encoding) -> Self {
        e as i32
    }
}
