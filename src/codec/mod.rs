mod raw;
mod zlib;

pub(crate) use raw::Decoder as RawDecoder;
pub(crate) use zlib::Decoder as ZlibDecoder;
