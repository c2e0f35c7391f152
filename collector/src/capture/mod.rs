pub mod duowav;

pub use duowav::DuoWavCapturer;
