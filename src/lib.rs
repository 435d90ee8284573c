//! Pressure readings from a 4-20 mA current-loop transducer.
//!
//! The loop current develops a voltage across a shunt resistor which an
//! ADC digitizes as a two's-complement code. Each code is converted to
//! volts, then to milliamps, clamped to the configured current range, and
//! finally mapped linearly onto `0..=max_pressure` bar.
//!
//! With the `std` feature (on by default) a [`Sampler`] polls a sensor at
//! a fixed interval until cancelled and renders the collected series.
//!
//! # Examples
//!
//! ```
//! use loop_pressure::{PressureSensor, SensorConfig};
//! # use embedded_hal_mock::adc::{Mock, MockChan0, Transaction};
//! #
//! # let expectations: [Transaction<u32>; 1] = [Transaction::read(0, 0)];
//! # let mut adc = Mock::new(&expectations);
//! # let pin = MockChan0 {};
//!
//! let mut sensor = PressureSensor::new(pin, SensorConfig::default());
//!
//! // 0 V is below 4 mA, so the current clamps to 4 mA and reads 0 bar
//! let reading = sensor.read(&mut adc).unwrap();
//! assert_eq!(reading.current, 4.0);
//! assert_eq!(reading.pressure, 0.0);
//! ```
#![cfg_attr(not(any(test, feature = "std")), no_std)]

mod config;
mod convert;
mod preset;
mod reading;
mod sensor;

#[cfg(feature = "std")]
mod plot;
#[cfg(feature = "std")]
mod sampling;
#[cfg(feature = "std")]
pub mod sim;

pub use config::{Builder, ConfigError, CurrentRange, SensorConfig};
pub use convert::{
    clamp_current,
    current_to_pressure,
    raw_to_voltage,
    sign_extend,
    voltage_to_current,
};
pub use preset::RangePreset;
pub use reading::Reading;
pub use sensor::PressureSensor;

#[cfg(feature = "std")]
pub use plot::Plot;
#[cfg(feature = "chart")]
pub use plot::ChartPlot;
#[cfg(feature = "std")]
pub use sampling::{CancelToken, SampleError, Sampler, Series};
