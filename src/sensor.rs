use embedded_hal::adc::{Channel, OneShot};

use crate::config::SensorConfig;
use crate::reading::Reading;

type Error<Adc, ADC, Pin> = nb::Error<<Adc as OneShot<ADC, u32, Pin>>::Error>;

/// A 4-20 mA pressure transducer wired across a shunt into one ADC channel.
#[derive(Debug)]
pub struct PressureSensor<Pin> {
    pin: Pin,
    config: SensorConfig,
}

impl<Pin> PressureSensor<Pin> {
    /// Returns a sensor reading through `pin` and converting with `config`.
    ///
    /// # Examples
    ///
    /// ```
    /// use loop_pressure::{PressureSensor, SensorConfig};
    /// # use embedded_hal_mock::adc::MockChan0;
    /// #
    /// # let pin = MockChan0 {};
    ///
    /// let sensor = PressureSensor::new(pin, SensorConfig::default());
    /// # let sensor: PressureSensor<MockChan0> = sensor;
    /// ```
    pub fn new<ADC>(pin: Pin, config: SensorConfig) -> Self
    where
        Pin: Channel<ADC>,
    {
        Self { pin, config }
    }

    /// Destroys the sensor and returns the `Pin`.
    pub fn free(self) -> Pin {
        self.pin
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Identifier of the ADC channel this sensor is wired to.
    pub fn channel<ADC>(&self) -> Pin::ID
    where
        Pin: Channel<ADC>,
    {
        Pin::channel()
    }

    /// Returns the code reported by the ADC, untouched.
    pub fn read_raw<Adc, ADC>(&mut self, adc: &mut Adc) -> Result<u32, Error<Adc, ADC, Pin>>
    where
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, u32, Pin>,
    {
        adc.read(&mut self.pin)
    }

    /// Samples the ADC once and converts the code into a [`Reading`].
    ///
    /// Driver failures are returned as-is; `nb::Error::WouldBlock` means
    /// the conversion is not ready yet and the call should be repeated.
    ///
    /// # Examples
    ///
    /// ```
    /// use loop_pressure::{PressureSensor, SensorConfig};
    /// # use embedded_hal_mock::adc::{Mock, MockChan0, Transaction};
    /// #
    /// # let expectations: [Transaction<u32>; 1] = [Transaction::read(0, 0x7F_FFFF)];
    /// # let mut adc = Mock::new(&expectations);
    /// # let pin = MockChan0 {};
    ///
    /// let mut sensor = PressureSensor::new(pin, SensorConfig::default());
    ///
    /// // Full-scale positive code: 5 V over 220 ohm clamps to 20 mA, 7 bar
    /// let reading = sensor.read(&mut adc).unwrap();
    /// assert_eq!(reading.current, 20.0);
    /// assert_eq!(reading.pressure, 7.0);
    /// ```
    pub fn read<Adc, ADC>(&mut self, adc: &mut Adc) -> Result<Reading, Error<Adc, ADC, Pin>>
    where
        Pin: Channel<ADC>,
        Adc: OneShot<ADC, u32, Pin>,
    {
        let raw = self.read_raw(adc)?;
        Ok(self.config.convert(raw))
    }
}
