//! Camera capability. The real backend drives a tethered camera through
//! the `gphoto2` CLI (preferring the system binary over native libgphoto2
//! bindings); the dry-run backend writes solid placeholder frames so the
//! rest of the pipeline can run without hardware.

use std::{
    io,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::Context as _;
use image::{Rgba, RgbaImage};

use crate::{
    config::{BoothConfig, CameraChoice},
    error::{BoothError, BoothResult},
};

pub trait CameraBackend {
    fn name(&self) -> &'static str;

    /// Cheap availability check run once per cycle, before the ready
    /// countdown. Fails with a device error when no camera is attached.
    fn probe(&mut self) -> BoothResult<()>;

    /// Capture one frame into `dir`, returning the saved path.
    fn capture_to(&mut self, dir: &Path, index: u32) -> BoothResult<PathBuf>;
}

pub fn create_camera(cfg: &BoothConfig) -> Box<dyn CameraBackend> {
    match cfg.camera {
        CameraChoice::Gphoto2 => Box::new(Gphoto2Camera::new()),
        CameraChoice::DryRun => Box::new(DryRunCamera::new(cfg.dry_run_size)),
    }
}

pub struct Gphoto2Camera {
    program: String,
}

impl Gphoto2Camera {
    pub fn new() -> Self {
        Self {
            program: "gphoto2".to_string(),
        }
    }
}

impl Default for Gphoto2Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for Gphoto2Camera {
    fn name(&self) -> &'static str {
        "gphoto2"
    }

    fn probe(&mut self) -> BoothResult<()> {
        let status = Command::new(&self.program)
            .arg("--auto-detect")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(s) if s.success() => Ok(()),
            Ok(s) => Err(BoothError::device(format!(
                "'{} --auto-detect' exited with {s}",
                self.program
            ))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(BoothError::device(format!(
                "'{}' is not installed",
                self.program
            ))),
            Err(err) => Err(BoothError::device(format!(
                "could not run '{}': {err}",
                self.program
            ))),
        }
    }

    fn capture_to(&mut self, dir: &Path, index: u32) -> BoothResult<PathBuf> {
        let target = dir.join(format!("capture_{index:02}.jpg"));
        let output = Command::new(&self.program)
            .args(["--capture-image-and-download", "--force-overwrite", "--filename"])
            .arg(&target)
            .output()
            .map_err(|err| BoothError::device(format!("could not run '{}': {err}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BoothError::device(format!(
                "capture failed ({}): {}",
                output.status,
                stderr.trim()
            )));
        }
        if !target.is_file() {
            return Err(BoothError::device(format!(
                "camera reported success but '{}' was not written",
                target.display()
            )));
        }
        Ok(target)
    }
}

/// Placeholder backend: solid dark frames of the configured size.
pub struct DryRunCamera {
    size: (u32, u32),
}

impl DryRunCamera {
    pub fn new(size: (u32, u32)) -> Self {
        Self { size }
    }
}

impl CameraBackend for DryRunCamera {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    fn probe(&mut self) -> BoothResult<()> {
        Ok(())
    }

    fn capture_to(&mut self, dir: &Path, index: u32) -> BoothResult<PathBuf> {
        let target = dir.join(format!("dryrun_{index:02}.png"));
        let frame = RgbaImage::from_pixel(self.size.0, self.size.1, Rgba([0, 0, 0, 255]));
        frame
            .save(&target)
            .with_context(|| format!("write placeholder '{}'", target.display()))?;
        Ok(target)
    }
}
