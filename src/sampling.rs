use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::Duration;

use embedded_hal::adc::{Channel, OneShot};

use crate::plot::Plot;
use crate::reading::Reading;
use crate::sensor::PressureSensor;

/// Shared flag used to stop a [`Sampler`] from another thread or a signal
/// handler.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (cancelled, condvar) = &*self.inner;
        *cancelled.lock().unwrap_or_else(PoisonError::into_inner) = true;
        condvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks for `timeout` or until the token is cancelled, whichever
    /// comes first. Returns `true` if cancelled.
    pub fn wait(&self, timeout: Duration) -> bool {
        let (cancelled, condvar) = &*self.inner;
        let guard = cancelled.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = condvar
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Pressures and the clamped currents they were derived from, in sampling
/// order. Both columns always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pressures: Vec<f32>,
    currents: Vec<f32>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, reading: &Reading) {
        self.pressures.push(reading.pressure);
        self.currents.push(reading.current);
    }

    pub fn len(&self) -> usize {
        self.pressures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressures.is_empty()
    }

    /// Pressures in bar.
    pub fn pressures(&self) -> &[f32] {
        &self.pressures
    }

    /// Clamped currents in mA.
    pub fn currents(&self) -> &[f32] {
        &self.currents
    }

    /// `(current, pressure)` pairs, ready to plot with current on the x axis.
    pub fn points(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.currents.iter().copied().zip(self.pressures.iter().copied())
    }
}

impl<'a> FromIterator<&'a Reading> for Series {
    fn from_iter<I: IntoIterator<Item = &'a Reading>>(readings: I) -> Self {
        let mut series = Series::new();
        for reading in readings {
            series.push(reading);
        }
        series
    }
}

/// Failure that ends a sampling session without a plot.
#[derive(Debug)]
pub enum SampleError<E> {
    /// The ADC driver reported an error.
    Driver(E),
    /// Writing a status line or the plot failed.
    Io(io::Error),
}

impl<E: fmt::Debug> fmt::Display for SampleError<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Driver(error) => write!(f, "ADC read failed: {:?}", error),
            Self::Io(io_error) => write!(f, "output error: {}", io_error),
        }
    }
}

impl<E: fmt::Debug> std::error::Error for SampleError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(io_error) => Some(io_error),
            _ => None,
        }
    }
}

impl<E> From<io::Error> for SampleError<E> {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

/// Polls a [`PressureSensor`] at a fixed interval until its [`CancelToken`]
/// is cancelled, then hands the collected [`Series`] to a [`Plot`].
#[derive(Debug)]
pub struct Sampler<Pin> {
    sensor: PressureSensor<Pin>,
    interval: Duration,
    token: CancelToken,
}

impl<Pin> Sampler<Pin> {
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

    /// Pause between polls of a conversion that is not ready yet.
    const CONVERSION_POLL: Duration = Duration::from_millis(1);

    pub fn new(sensor: PressureSensor<Pin>, token: CancelToken) -> Self {
        Self {
            sensor,
            interval: Self::DEFAULT_INTERVAL,
            token,
        }
    }

    /// Time to wait between the end of one sample and the next read.
    pub fn with_interval(self, interval: Duration) -> Self {
        Self { interval, ..self }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Samples until cancelled, printing one status line per reading to
    /// `out`, then renders the series with `plot` and returns it.
    ///
    /// Cancellation is honoured while a conversion is pending, between
    /// samples, and up to the moment a reading is appended: a sample whose
    /// read or status line completes after cancellation is discarded. A
    /// driver error stops sampling immediately and is returned without
    /// plotting.
    pub fn run<Adc, ADC, W, P>(
        mut self,
        adc: &mut Adc,
        out: &mut W,
        plot: &mut P,
    ) -> Result<Series, SampleError<<Adc as OneShot<ADC, u32, Pin>>::Error>>
    where
        Pin: Channel<ADC>,
        <Pin as Channel<ADC>>::ID: fmt::Debug,
        Adc: OneShot<ADC, u32, Pin>,
        <Adc as OneShot<ADC, u32, Pin>>::Error: fmt::Debug,
        W: Write,
        P: Plot,
    {
        let mut series = Series::new();

        log::info!(
            "sampling channel {:?} every {:?}, range {}",
            self.sensor.channel::<ADC>(),
            self.interval,
            self.sensor.config().range()
        );

        'sampling: while !self.token.is_cancelled() {
            let reading = loop {
                match self.sensor.read::<Adc, ADC>(adc) {
                    Ok(reading) => break reading,
                    Err(nb::Error::WouldBlock) => {
                        if self.token.wait(Self::CONVERSION_POLL) {
                            log::debug!("cancelled while waiting for a conversion");
                            break 'sampling;
                        }
                    }
                    Err(nb::Error::Other(error)) => {
                        log::warn!("ADC read failed after {} samples: {:?}", series.len(), error);
                        return Err(SampleError::Driver(error));
                    }
                }
            };
            if self.token.is_cancelled() {
                log::debug!("discarding sample {} read after cancellation", series.len());
                break;
            }

            log::debug!("sample {}: raw {:#08x}", series.len(), reading.raw);
            writeln!(out, "{}", reading)?;
            if self.token.is_cancelled() {
                log::debug!("discarding sample {} printed after cancellation", series.len());
                break;
            }
            series.push(&reading);

            self.token.wait(self.interval);
        }

        log::info!("sampling stopped after {} samples", series.len());
        out.flush()?;
        plot.render(&series)?;
        Ok(series)
    }
}
