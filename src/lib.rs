#![forbid(unsafe_code)]

pub mod capture;
pub mod config;
pub mod error;
pub mod gpio;
pub mod layout;
pub mod merge;
pub mod pipeline;
pub mod ringlight;
pub mod session;
pub mod thumbs;
pub mod upload;

pub use capture::{CameraBackend, DryRunCamera, Gphoto2Camera};
pub use config::{BoothConfig, CameraChoice, GpioConfig, RinglightConfig, WebdavConfig};
pub use error::{BoothError, BoothResult};
pub use gpio::{GpioBackend, NoopGpio};
pub use layout::{GridLayout, Margins};
pub use merge::MergeOptions;
pub use pipeline::{Booth, Stage};
pub use ringlight::RingLight;
pub use thumbs::OrientationFix;
