//! Audio container handling at the pipeline boundary.

pub mod wav;

pub use wav::{DecodedAudio, decode_for_stt, decode_wav, encode_wav};
