//! Serial ring light. Fire-and-forget: one command byte string for ON,
//! one for OFF, no acknowledgement protocol. A missing or unopenable port
//! only degrades the booth to shooting without the light.

use std::{io::Write as _, time::Duration};

use crate::config::RinglightConfig;

pub struct RingLight {
    port: Option<Box<dyn serialport::SerialPort>>,
    on_command: Vec<u8>,
    off_command: Vec<u8>,
}

impl RingLight {
    pub fn disabled() -> Self {
        Self {
            port: None,
            on_command: Vec::new(),
            off_command: Vec::new(),
        }
    }

    pub fn from_config(cfg: Option<&RinglightConfig>) -> Self {
        match cfg {
            Some(cfg) => Self::open(cfg),
            None => Self::disabled(),
        }
    }

    pub fn open(cfg: &RinglightConfig) -> Self {
        let port = match serialport::new(cfg.port.as_str(), cfg.baud)
            .timeout(Duration::from_millis(100))
            .open()
        {
            Ok(port) => Some(port),
            Err(err) => {
                tracing::warn!(port = %cfg.port, %err, "ring light unavailable");
                None
            }
        };
        Self {
            port,
            on_command: cfg.on_command.clone().into_bytes(),
            off_command: cfg.off_command.clone().into_bytes(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.port.is_some()
    }

    pub fn set(&mut self, on: bool) {
        let Some(port) = self.port.as_mut() else {
            return;
        };
        let command: &[u8] = if on { &self.on_command } else { &self.off_command };
        if let Err(err) = port.write_all(command) {
            tracing::warn!(%err, "ring light write failed");
        }
    }
}
