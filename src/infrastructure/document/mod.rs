//! Document intake infrastructure - content sniffing and upload staging

mod sniffer;
mod validator;

pub use sniffer::MagicByteSniffer;
pub use validator::{DocumentValidator, StagedUpload};
