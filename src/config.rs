use core::fmt;

use crate::convert::{clamp_current, current_to_pressure, raw_to_voltage, voltage_to_current};
use crate::reading::Reading;

/// Reasons a [`SensorConfig`] can be rejected before any sampling happens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// The shunt resistance is zero or negative.
    ZeroResistance,
    /// The current range has `min == max`.
    DegenerateRange,
    /// The current range has `min > max`.
    InvertedRange,
    NonPositivePressure,
    NonPositiveReference,
    /// The ADC code width is outside `2..=32` bits.
    BitWidth(u32),
    /// A parameter is NaN or infinite.
    NonFinite,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ZeroResistance => write!(f, "shunt resistance must be greater than zero"),
            Self::DegenerateRange => write!(f, "current range is empty (minimum equals maximum)"),
            Self::InvertedRange => write!(f, "current range minimum exceeds its maximum"),
            Self::NonPositivePressure => write!(f, "full-scale pressure must be greater than zero"),
            Self::NonPositiveReference => write!(f, "reference voltage must be greater than zero"),
            Self::BitWidth(bits) => write!(f, "ADC code width of {} bits is not supported", bits),
            Self::NonFinite => write!(f, "configuration contains a non-finite value"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// A loop current span in milliamps, `min < max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentRange {
    min: f32,
    max: f32,
}

impl CurrentRange {
    /// The conventional full 4-20 mA span.
    pub const FULL: CurrentRange = CurrentRange { min: 4.0, max: 20.0 };

    pub fn new(min: f32, max: f32) -> Result<Self, ConfigError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ConfigError::NonFinite);
        }
        if min == max {
            return Err(ConfigError::DegenerateRange);
        }
        if min > max {
            return Err(ConfigError::InvertedRange);
        }
        Ok(Self { min, max })
    }

    pub(crate) const fn new_unchecked(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn clamp(&self, current: f32) -> f32 {
        clamp_current(current, self.min, self.max)
    }

    pub fn contains(&self, current: f32) -> bool {
        current >= self.min && current <= self.max
    }
}

impl fmt::Display for CurrentRange {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}–{} mA", self.min, self.max)
    }
}

/// Electrical and calibration parameters of one current-loop pressure
/// transducer.
///
/// The same current range both bounds the clamp and defines the span that
/// maps onto `0..=max_pressure`.
///
/// # Examples
///
/// ```
/// use loop_pressure::{CurrentRange, SensorConfig};
///
/// let config = SensorConfig::builder()
///     .resistor(220.0)
///     .range(CurrentRange::new(4.0, 20.0).unwrap())
///     .max_pressure(7.0)
///     .build()
///     .unwrap();
///
/// let reading = config.convert(0x7F_FFFF);
/// assert_eq!(reading.current, 20.0);
/// assert_eq!(reading.pressure, 7.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorConfig {
    vref: f32,
    resistor: f32,
    range: CurrentRange,
    max_pressure: f32,
    bit_width: u32,
}

impl SensorConfig {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn vref(&self) -> f32 {
        self.vref
    }

    pub fn resistor(&self) -> f32 {
        self.resistor
    }

    pub fn range(&self) -> CurrentRange {
        self.range
    }

    pub fn max_pressure(&self) -> f32 {
        self.max_pressure
    }

    pub fn bit_width(&self) -> u32 {
        self.bit_width
    }

    /// Returns a copy of this configuration using another current range.
    pub fn with_range(self, range: CurrentRange) -> Self {
        Self { range, ..self }
    }

    /// Runs a raw ADC code through the whole pipeline: code to volts,
    /// volts to milliamps, clamp, then milliamps to bar.
    pub fn convert(&self, raw: u32) -> Reading {
        let voltage = raw_to_voltage(raw, self.bit_width, self.vref);
        let current_raw = voltage_to_current(voltage, self.resistor);
        let current = self.range.clamp(current_raw);
        let pressure =
            current_to_pressure(current, self.range.min, self.range.max, self.max_pressure);

        Reading {
            raw,
            voltage,
            current_raw,
            current,
            pressure,
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        let builder = Builder::default();
        Self {
            vref: builder.vref,
            resistor: builder.resistor,
            range: builder.range,
            max_pressure: builder.max_pressure,
            bit_width: builder.bit_width,
        }
    }
}

/// Builder for [`SensorConfig`], starting from the reference transducer:
/// 5 V reference, 220 ohm shunt, 4-20 mA, 7 bar full scale, 24-bit codes.
#[derive(Debug, Clone, Copy)]
pub struct Builder {
    vref: f32,
    resistor: f32,
    range: CurrentRange,
    max_pressure: f32,
    bit_width: u32,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            vref: 5.0,
            resistor: 220.0,
            range: CurrentRange::FULL,
            max_pressure: 7.0,
            bit_width: 24,
        }
    }
}

impl Builder {
    /// Reference voltage in volts.
    pub fn vref(mut self, vref: f32) -> Self {
        self.vref = vref;
        self
    }

    /// Shunt resistance in ohms.
    pub fn resistor(mut self, resistor: f32) -> Self {
        self.resistor = resistor;
        self
    }

    pub fn range(mut self, range: CurrentRange) -> Self {
        self.range = range;
        self
    }

    /// Pressure in bar at the top of the current range.
    pub fn max_pressure(mut self, max_pressure: f32) -> Self {
        self.max_pressure = max_pressure;
        self
    }

    /// Width of the ADC's two's-complement codes.
    pub fn bit_width(mut self, bit_width: u32) -> Self {
        self.bit_width = bit_width;
        self
    }

    pub fn build(self) -> Result<SensorConfig, ConfigError> {
        if !self.vref.is_finite() || !self.resistor.is_finite() || !self.max_pressure.is_finite() {
            return Err(ConfigError::NonFinite);
        }
        // re-validated: `new_unchecked` ranges come from the preset table
        let range = CurrentRange::new(self.range.min, self.range.max)?;
        if self.resistor <= 0.0 {
            return Err(ConfigError::ZeroResistance);
        }
        if self.max_pressure <= 0.0 {
            return Err(ConfigError::NonPositivePressure);
        }
        if self.vref <= 0.0 {
            return Err(ConfigError::NonPositiveReference);
        }
        if !(2..=32).contains(&self.bit_width) {
            return Err(ConfigError::BitWidth(self.bit_width));
        }

        Ok(SensorConfig {
            vref: self.vref,
            resistor: self.resistor,
            range,
            max_pressure: self.max_pressure,
            bit_width: self.bit_width,
        })
    }
}
