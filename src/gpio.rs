//! Status-LED / trigger-button capability. On a Raspberry Pi the rppal
//! backend drives the configured BCM pins; everywhere else the controller
//! cannot be opened and the no-op backend is selected silently, so the
//! pipeline runs unchanged without the hardware.

use std::{thread, time::Duration};

use anyhow::anyhow;

use crate::{config::GpioConfig, error::BoothResult};

pub trait GpioBackend {
    fn set_led(&mut self, on: bool);
    fn toggle_led(&mut self);

    /// Level poll of the trigger button; pressed = true. The attend loop
    /// samples this every 250 ms.
    fn button_pressed(&mut self) -> bool;

    /// Whether this backend has a physical button to wait on.
    fn has_button(&self) -> bool {
        false
    }

    /// Pre-capture countdown. The hardware backend blinks the LED; the
    /// default is a plain wait of the same overall pacing.
    fn ready_countdown(&mut self, delay: Duration) {
        thread::sleep(delay);
    }
}

pub fn create_gpio(cfg: &GpioConfig) -> Box<dyn GpioBackend> {
    match RppalGpio::open(cfg) {
        Ok(gpio) => Box::new(gpio),
        Err(err) => {
            tracing::debug!(%err, "gpio controller unavailable, using no-op backend");
            Box::new(NoopGpio)
        }
    }
}

pub struct NoopGpio;

impl GpioBackend for NoopGpio {
    fn set_led(&mut self, _on: bool) {}

    fn toggle_led(&mut self) {}

    fn button_pressed(&mut self) -> bool {
        false
    }
}

pub struct RppalGpio {
    led: rppal::gpio::OutputPin,
    button: rppal::gpio::InputPin,
}

impl RppalGpio {
    pub fn open(cfg: &GpioConfig) -> BoothResult<Self> {
        let gpio = rppal::gpio::Gpio::new().map_err(|e| anyhow!("open gpio controller: {e}"))?;
        let led = gpio
            .get(cfg.led_pin)
            .map_err(|e| anyhow!("claim led pin {}: {e}", cfg.led_pin))?
            .into_output();
        let button = gpio
            .get(cfg.button_pin)
            .map_err(|e| anyhow!("claim button pin {}: {e}", cfg.button_pin))?
            .into_input_pullup();
        Ok(Self { led, button })
    }
}

impl GpioBackend for RppalGpio {
    fn set_led(&mut self, on: bool) {
        if on {
            self.led.set_high();
        } else {
            self.led.set_low();
        }
    }

    fn toggle_led(&mut self) {
        self.led.toggle();
    }

    fn button_pressed(&mut self) -> bool {
        // Pulled up; the button shorts the pin to ground.
        self.button.is_low()
    }

    fn has_button(&self) -> bool {
        true
    }

    fn ready_countdown(&mut self, delay: Duration) {
        // Six slow blinks, then six fast ones, roughly the configured delay.
        for _ in 0..6 {
            self.toggle_led();
            thread::sleep(delay / 10);
        }
        for _ in 0..6 {
            self.toggle_led();
            thread::sleep(delay / 20);
        }
    }
}
