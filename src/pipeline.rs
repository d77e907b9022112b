//! The sequencer: capture -> merge -> upload -> cleanup, once per trigger.
//! A stage failure aborts the rest of the cycle, writes a diagnostic
//! transcript and surfaces a stage-specific exit code. In attend mode a
//! failed cycle never takes the supervising loop down with it; the loop
//! logs, cleans up and re-arms the button.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use crate::{
    capture::{self, CameraBackend},
    config::BoothConfig,
    error::{BoothError, BoothResult},
    gpio::{self, GpioBackend},
    merge::{self, MergeOptions},
    ringlight::RingLight,
    session, upload,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Capture,
    Merge,
    Upload,
    Cleanup,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Capture => "capture",
            Self::Merge => "merge",
            Self::Upload => "upload",
            Self::Cleanup => "cleanup",
        }
    }
}

const BUTTON_POLL: Duration = Duration::from_millis(250);

pub struct Booth {
    cfg: BoothConfig,
    camera: Box<dyn CameraBackend>,
    gpio: Box<dyn GpioBackend>,
    light: RingLight,
    stop: Arc<AtomicBool>,
}

impl Booth {
    /// Select the capability backends from config and prepare the booth
    /// directory layout. `stop` is tripped by the signal handler; it is
    /// checked between shots and between attend-loop polls.
    pub fn new(cfg: BoothConfig, stop: Arc<AtomicBool>) -> BoothResult<Self> {
        cfg.validate()?;
        session::ensure_layout(&cfg)?;
        let camera = capture::create_camera(&cfg);
        let gpio = gpio::create_gpio(&cfg.gpio);
        let light = RingLight::from_config(cfg.ringlight.as_ref());
        Ok(Self {
            cfg,
            camera,
            gpio,
            light,
            stop,
        })
    }

    pub fn config(&self) -> &BoothConfig {
        &self.cfg
    }

    fn interrupted(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// One full cycle. On failure the diagnostic transcript is written
    /// before the error is returned; a clean interrupt writes none.
    pub fn run_once(&mut self) -> BoothResult<()> {
        let stamp = session::capture_stamp();
        match self.cycle(&stamp) {
            Ok(()) => {
                if self.cfg.logging {
                    let note =
                        format!("cycle {stamp}\ncompleted: capture, merge, upload, cleanup\n");
                    if let Err(err) = session::write_transcript(&self.cfg.log_dir(), &stamp, &note)
                    {
                        tracing::warn!(%err, "could not write success transcript");
                    }
                }
                tracing::info!(%stamp, "cycle completed");
                Ok(())
            }
            Err((_, BoothError::Interrupted)) => {
                tracing::info!("cycle interrupted");
                Err(BoothError::Interrupted)
            }
            Err((stage, err)) => {
                tracing::error!(stage = stage.as_str(), %err, "cycle failed");
                match session::write_diagnostic(&self.cfg.log_dir(), &stamp, stage.as_str(), &err)
                {
                    Ok(path) => tracing::info!(path = %path.display(), "diagnostic saved"),
                    Err(diag_err) => tracing::warn!(%diag_err, "could not write diagnostic"),
                }
                Err(err)
            }
        }
    }

    /// Wait for the hardware button and run cycles until interrupted.
    pub fn attend(&mut self) -> BoothResult<()> {
        if !self.gpio.has_button() {
            return Err(BoothError::config(
                "attend mode needs a gpio button; this host has no gpio controller",
            ));
        }

        tracing::info!("photobooth ready, waiting for the button");
        self.gpio.set_led(false);

        loop {
            if self.interrupted() {
                tracing::info!("photobooth stopped");
                self.gpio.set_led(false);
                return Ok(());
            }
            thread::sleep(BUTTON_POLL);
            if !self.gpio.button_pressed() {
                continue;
            }

            tracing::info!("button pressed");
            self.gpio.set_led(true);
            match self.run_once() {
                Ok(()) => {}
                Err(BoothError::Interrupted) => {
                    self.gpio.set_led(false);
                    return Ok(());
                }
                Err(err) => {
                    // The cycle is lost, the loop is not: scrub the working
                    // files and re-arm.
                    tracing::error!(%err, "cycle failed, re-arming");
                    if let Err(clean_err) = self.cleanup() {
                        tracing::warn!(%clean_err, "post-failure cleanup failed");
                    }
                }
            }
            self.gpio.set_led(false);
            tracing::info!("photobooth ready, waiting for the button");
        }
    }

    fn cycle(&mut self, stamp: &str) -> Result<(), (Stage, BoothError)> {
        self.capture().map_err(|e| (Stage::Capture, e))?;
        self.merge().map_err(|e| (Stage::Merge, e))?;
        self.upload(stamp).map_err(|e| (Stage::Upload, e))?;
        self.cleanup().map_err(|e| (Stage::Cleanup, e))?;
        Ok(())
    }

    fn capture(&mut self) -> BoothResult<()> {
        tracing::info!(
            backend = self.camera.name(),
            pictures = self.cfg.pictures,
            "taking pictures"
        );
        self.camera.probe()?;

        self.gpio.set_led(true);
        self.gpio.ready_countdown(self.cfg.ready_delay());

        let img_dir = self.cfg.img_dir();
        for index in 0..self.cfg.pictures {
            if self.interrupted() {
                return Err(BoothError::Interrupted);
            }
            self.light.set(true);
            self.gpio.set_led(false);
            let path = self.camera.capture_to(&img_dir, index)?;
            self.gpio.set_led(true);
            self.light.set(false);
            tracing::info!(path = %path.display(), "captured frame");
            thread::sleep(self.cfg.interval());
        }
        Ok(())
    }

    fn merge(&self) -> BoothResult<()> {
        tracing::info!("merging images");
        let opts = MergeOptions::from_config(&self.cfg);
        let (width, height) =
            merge::merge_directory(&self.cfg.img_dir(), &self.cfg.composite_path(), &opts)?;
        tracing::info!(width, height, "composite written");
        Ok(())
    }

    fn upload(&self, stamp: &str) -> BoothResult<()> {
        let Some(webdav) = &self.cfg.webdav else {
            tracing::info!("no webdav endpoint configured, skipping upload");
            return Ok(());
        };
        let remote_name = format!("img_{stamp}.png");
        tracing::info!(%remote_name, "uploading composite");
        upload::upload_composite(webdav, &self.cfg.composite_path(), &remote_name)
    }

    /// Delete working and output files. Also run at startup, before the
    /// first cycle, so a crashed previous run cannot leak frames into the
    /// next composite.
    pub fn cleanup(&self) -> BoothResult<()> {
        tracing::info!("cleaning up");
        session::clean_dir(&self.cfg.img_dir())?;
        session::clean_dir(&self.cfg.output_dir())?;
        Ok(())
    }

    /// Merge the frames already on disk, without uploading or cleaning.
    pub fn merge_only(&self) -> BoothResult<()> {
        self.merge()
    }
}
