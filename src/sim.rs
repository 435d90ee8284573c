//! A stand-in ADC for running the tool without acquisition hardware.

use core::convert::Infallible;

use embedded_hal::adc::{Channel, OneShot};

use crate::config::SensorConfig;

/// Simulated ADC whose every channel sees a loop current sweeping up and
/// down between two bounds, as codes of the configured width.
#[derive(Debug, Clone)]
pub struct SweepAdc {
    config: SensorConfig,
    low: f32,
    high: f32,
    steps: u32,
    position: u32,
}

macro_rules! sweep_channels {
    ($($pin:ident => $id:expr),*) => {
        $(
            #[derive(Debug, Clone, Copy, Default)]
            pub struct $pin;

            impl Channel<SweepAdc> for $pin {
                type ID = u8;

                fn channel() -> u8 {
                    $id
                }
            }
        )*
    };
}

sweep_channels!(
    Ain0 => 0, Ain1 => 1, Ain2 => 2, Ain3 => 3,
    Ain4 => 4, Ain5 => 5, Ain6 => 6, Ain7 => 7
);

impl SweepAdc {
    /// Sweeps from `low` to `high` mA and back in `steps` reads each way,
    /// driving the shunt described by `config`.
    pub fn new(config: SensorConfig, low: f32, high: f32, steps: u32) -> Self {
        Self {
            config,
            low,
            high,
            steps: steps.max(1),
            position: 0,
        }
    }

    /// Loop current in mA that the next read will digitize.
    pub fn current(&self) -> f32 {
        let phase = self.position % (2 * self.steps);
        let rising = if phase <= self.steps { phase } else { 2 * self.steps - phase };
        self.low + (self.high - self.low) * rising as f32 / self.steps as f32
    }

    /// Code the converter would report for `current` mA.
    pub fn code(&self, current: f32) -> u32 {
        let bit_width = self.config.bit_width();
        let full_scale = ((1i64 << (bit_width - 1)) - 1) as f32;
        let voltage = current / 1000.0 * self.config.resistor();
        let code = (voltage / self.config.vref() * full_scale).round() as i64;
        let code = code.clamp(-(1i64 << (bit_width - 1)), (1i64 << (bit_width - 1)) - 1);
        let mask = if bit_width == 32 { u32::MAX } else { (1u32 << bit_width) - 1 };
        code as u32 & mask
    }
}

impl<Pin> OneShot<SweepAdc, u32, Pin> for SweepAdc
where
    Pin: Channel<SweepAdc, ID = u8>,
{
    type Error = Infallible;

    fn read(&mut self, _pin: &mut Pin) -> nb::Result<u32, Self::Error> {
        let code = self.code(self.current());
        log::trace!("channel {}: {:.3} mA -> {:#08x}", Pin::channel(), self.current(), code);
        self.position = self.position.wrapping_add(1);
        Ok(code)
    }
}
