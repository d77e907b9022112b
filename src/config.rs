//! Booth configuration. One explicit struct, loaded from a JSON file,
//! passed to every stage; no global mutable settings.

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;

use crate::{
    error::{BoothError, BoothResult},
    layout::Margins,
};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BoothConfig {
    /// Installation root. Captured frames, the composite and diagnostic
    /// transcripts live in `img/`, `output/` and `logs/` below it.
    pub root: PathBuf,

    /// Pictures per session.
    pub pictures: u32,
    /// Pause between shots, seconds.
    pub interval_secs: f64,
    /// Ready countdown before the first shot, seconds.
    pub ready_delay_secs: f64,

    /// Thumbnail bounding-box side length.
    pub basewidth: u32,
    pub margins: Margins,
    /// Canvas background, RGBA.
    pub background: [u8; 4],
    /// Logo asset composited bottom-right onto the composite.
    pub logo: PathBuf,
    /// Camera hangs upside down: rotate every shot 180 degrees instead of
    /// applying its EXIF orientation tag.
    pub top_mount: bool,

    pub camera: CameraChoice,
    /// Placeholder frame size for dry-run captures.
    pub dry_run_size: (u32, u32),

    pub gpio: GpioConfig,
    pub ringlight: Option<RinglightConfig>,
    pub webdav: Option<WebdavConfig>,

    /// Also persist a transcript for successful cycles.
    pub logging: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CameraChoice {
    /// Tethered camera driven through the `gphoto2` CLI.
    Gphoto2,
    /// Solid-colour placeholder frames, no hardware needed.
    DryRun,
}

#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GpioConfig {
    /// BCM pin of the status LED.
    pub led_pin: u8,
    /// BCM pin of the trigger button (pulled up, pressed = low).
    pub button_pin: u8,
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            led_pin: 17,
            button_pin: 27,
        }
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct RinglightConfig {
    /// Serial device, e.g. `/dev/ttyUSB0`.
    pub port: String,
    #[serde(default = "default_baud")]
    pub baud: u32,
    #[serde(default = "default_on_command")]
    pub on_command: String,
    #[serde(default = "default_off_command")]
    pub off_command: String,
}

fn default_baud() -> u32 {
    115_200
}

fn default_on_command() -> String {
    "1".to_string()
}

fn default_off_command() -> String {
    "0".to_string()
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct WebdavConfig {
    /// Endpoint base URL, e.g. `https://dav.example.net/remote.php/dav/files/booth`.
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Remote collection the composites go into.
    pub dir: String,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            pictures: 9,
            interval_secs: 1.0,
            ready_delay_secs: 3.0,
            basewidth: 500,
            margins: Margins::default(),
            background: [255, 255, 255, 255],
            logo: PathBuf::from("logo/logo.png"),
            top_mount: false,
            camera: CameraChoice::Gphoto2,
            dry_run_size: (2000, 1500),
            gpio: GpioConfig::default(),
            ringlight: None,
            webdav: None,
            logging: false,
        }
    }
}

impl BoothConfig {
    pub fn load(path: &Path) -> BoothResult<Self> {
        let f = File::open(path)
            .with_context(|| format!("open booth config '{}'", path.display()))?;
        let cfg: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| BoothError::config(format!("parse '{}': {e}", path.display())))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> BoothResult<()> {
        if self.pictures == 0 {
            return Err(BoothError::config("pictures must be >= 1"));
        }
        if self.basewidth == 0 {
            return Err(BoothError::config("basewidth must be >= 1"));
        }
        if self.dry_run_size.0 == 0 || self.dry_run_size.1 == 0 {
            return Err(BoothError::config("dry_run_size must be non-zero"));
        }
        for delay in [self.interval_secs, self.ready_delay_secs] {
            if delay.is_nan() || delay < 0.0 {
                return Err(BoothError::config("delays must be non-negative numbers"));
            }
        }
        Ok(())
    }

    pub fn img_dir(&self) -> PathBuf {
        self.root.join("img")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join("output")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn composite_path(&self) -> PathBuf {
        self.output_dir().join("merged_image.png")
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_secs)
    }

    pub fn ready_delay(&self) -> Duration {
        Duration::from_secs_f64(self.ready_delay_secs)
    }
}
