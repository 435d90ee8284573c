use core::fmt;

/// One sample carried through the conversion pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Code as returned by the ADC, before sign extension.
    pub raw: u32,
    /// Volts across the shunt.
    pub voltage: f32,
    /// Loop current in mA, possibly outside the configured range.
    pub current_raw: f32,
    /// Loop current in mA, clamped to the configured range.
    pub current: f32,
    /// Pressure in bar derived from the clamped current.
    pub pressure: f32,
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "V: {:.3} V | I(raw): {:.2} mA | I(clamped): {:.2} mA | P: {:.3} bar",
            self.voltage, self.current_raw, self.current, self.pressure
        )
    }
}
