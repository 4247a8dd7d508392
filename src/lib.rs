pub mod bits;
pub mod burst;
pub mod classify;
pub mod codec;
pub mod decode;
pub mod decoder;
pub mod error;
pub mod frame;
pub mod interleave;
pub mod pretty;
pub mod time;
pub mod tracing_init;

pub use decoder::{decode, DecoderOptions};
pub use error::DecodeError;
pub use frame::{Frame, FrameVariant};
