pub mod codec;
pub mod message;

pub use codec::{DecodeError, FrameError, decode, encode, read_frame, write_frame};
pub use message::Message;
