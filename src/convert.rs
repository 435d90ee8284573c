/// Masks `raw` to `bit_width` bits and sign-extends the result from bit
/// `bit_width - 1`.
///
/// # Panics
///
/// Panics if `bit_width` is outside `2..=32`. [`SensorConfig`] rejects such
/// widths when it is built.
///
/// [`SensorConfig`]: crate::SensorConfig
pub fn sign_extend(raw: u32, bit_width: u32) -> i32 {
    assert!((2..=32).contains(&bit_width), "bit width {} out of range", bit_width);

    let shift = 32 - bit_width;
    ((raw << shift) as i32) >> shift
}

/// Converts a two's-complement ADC code into volts, so that the most
/// positive code maps to `vref` and the most negative one to just below
/// `-vref`.
///
/// # Examples
///
/// ```
/// use loop_pressure::raw_to_voltage;
///
/// assert_eq!(raw_to_voltage(0x7F_FFFF, 24, 5.0), 5.0);
/// assert_eq!(raw_to_voltage(0, 24, 5.0), 0.0);
/// ```
///
/// # Panics
///
/// Panics if `bit_width` is outside `2..=32`, like [`sign_extend`].
pub fn raw_to_voltage(raw: u32, bit_width: u32, vref: f32) -> f32 {
    let code = sign_extend(raw, bit_width);
    let full_scale = ((1u64 << (bit_width - 1)) - 1) as f32;
    code as f32 / full_scale * vref
}

/// Current through the shunt `resistor` (ohms) in milliamps.
pub fn voltage_to_current(voltage: f32, resistor: f32) -> f32 {
    voltage / resistor * 1000.0
}

pub fn clamp_current(current: f32, min: f32, max: f32) -> f32 {
    if current < min {
        min
    } else if current > max {
        max
    } else {
        current
    }
}

/// Maps a current already clamped to `min..=max` onto `0..=max_pressure`.
pub fn current_to_pressure(current: f32, min: f32, max: f32, max_pressure: f32) -> f32 {
    (current - min) / (max - min) * max_pressure
}
