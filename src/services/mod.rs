pub mod captcha_relay;
pub mod shot_writer;
pub mod slot_detector;
pub mod status_store;

pub use captcha_relay::CaptchaRelay;
pub use shot_writer::ShotWriter;
pub use slot_detector::{SlotDetector, SLOT_SELECTOR};
pub use status_store::StatusStore;
