//! External interfaces: asset fetch, audio decode and WAV encode.

pub mod assets;
pub mod decode;
pub mod wav;

pub use assets::{AssetSource, DirAssetSource, MemoryAssetSource};
pub use decode::{decode, resample, DecodedAudio};
