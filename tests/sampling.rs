use std::convert::Infallible;
use std::io::{self, ErrorKind, Write};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use embedded_hal::adc::{Channel, OneShot};
use embedded_hal_mock::{
    adc::{Mock, MockChan0, Transaction},
    MockError,
};

use loop_pressure::{
    CancelToken, CurrentRange, Plot, PressureSensor, SampleError, Sampler, SensorConfig, Series,
};

const FULL_SCALE: u32 = 0x7F_FFFF;

/// ADC replaying a fixed list of codes, optionally cancelling the session
/// from inside a given read.
struct ScriptedAdc {
    codes: Vec<u32>,
    reads: usize,
    busy: usize,
    cancel_on_read: Option<(usize, CancelToken)>,
}

impl ScriptedAdc {
    fn new(codes: Vec<u32>) -> Self {
        Self {
            codes,
            reads: 0,
            busy: 0,
            cancel_on_read: None,
        }
    }

    /// Cancels `token` from inside read number `index`, counting from 0.
    fn cancelling_on_read(self, index: usize, token: &CancelToken) -> Self {
        Self {
            cancel_on_read: Some((index, token.clone())),
            ..self
        }
    }
}

struct Pin;

impl Channel<ScriptedAdc> for Pin {
    type ID = u8;

    fn channel() -> u8 {
        0
    }
}

impl OneShot<ScriptedAdc, u32, Pin> for ScriptedAdc {
    type Error = Infallible;

    fn read(&mut self, _pin: &mut Pin) -> nb::Result<u32, Infallible> {
        if self.busy > 0 {
            self.busy -= 1;
            return Err(nb::Error::WouldBlock);
        }
        if let Some((index, token)) = &self.cancel_on_read {
            if *index == self.reads {
                token.cancel();
            }
        }
        let code = self.codes[self.reads % self.codes.len()];
        self.reads += 1;
        Ok(code)
    }
}

#[derive(Default)]
struct RecordingPlot {
    rendered: Vec<Series>,
}

impl Plot for RecordingPlot {
    fn render(&mut self, series: &Series) -> io::Result<()> {
        self.rendered.push(series.clone());
        Ok(())
    }
}

/// Console sink that cancels the session once it has printed `limit` lines.
struct CancellingOutput {
    text: Vec<u8>,
    limit: usize,
    token: CancelToken,
}

impl CancellingOutput {
    fn new(limit: usize, token: &CancelToken) -> Self {
        Self {
            text: Vec::new(),
            limit,
            token: token.clone(),
        }
    }
}

impl Write for CancellingOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.text.extend_from_slice(buf);
        if self.text.iter().filter(|&&byte| byte == b'\n').count() >= self.limit {
            self.token.cancel();
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn sampler<ADC, P>(pin: P, config: SensorConfig, token: &CancelToken) -> Sampler<P>
where
    P: Channel<ADC>,
{
    Sampler::new(PressureSensor::new(pin, config), token.clone()).with_interval(Duration::ZERO)
}

/// ADC whose conversion never completes.
struct StuckAdc {
    polls: usize,
}

impl OneShot<StuckAdc, u32, StuckPin> for StuckAdc {
    type Error = Infallible;

    fn read(&mut self, _pin: &mut StuckPin) -> nb::Result<u32, Infallible> {
        self.polls += 1;
        Err(nb::Error::WouldBlock)
    }
}

struct StuckPin;

impl Channel<StuckAdc> for StuckPin {
    type ID = u8;

    fn channel() -> u8 {
        0
    }
}

/// Cancels `token` from another thread after `delay`.
fn cancel_after(token: &CancelToken, delay: Duration) -> thread::JoinHandle<()> {
    let token = token.clone();
    thread::spawn(move || {
        thread::sleep(delay);
        token.cancel();
    })
}

#[test]
fn collects_one_sample_per_tick() {
    let token = CancelToken::new();
    let mut adc = ScriptedAdc::new(vec![0, FULL_SCALE]).cancelling_on_read(5, &token);
    let mut out = Vec::new();
    let mut plot = RecordingPlot::default();

    let series = sampler(Pin, SensorConfig::default(), &token)
        .run(&mut adc, &mut out, &mut plot)
        .unwrap();

    assert_eq!(series.len(), 5);
    assert_eq!(series.pressures().len(), series.currents().len());
    assert_eq!(series.pressures(), &[0.0f32, 7.0, 0.0, 7.0, 0.0]);
    assert_eq!(series.currents(), &[4.0f32, 20.0, 4.0, 20.0, 4.0]);
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 5);
    assert_eq!(plot.rendered, vec![series]);
}

#[test]
fn cancellation_while_printing_discards_sample() {
    let token = CancelToken::new();
    let mut adc = ScriptedAdc::new(vec![0, FULL_SCALE]);
    let mut out = CancellingOutput::new(5, &token);
    let mut plot = RecordingPlot::default();

    let series = sampler(Pin, SensorConfig::default(), &token)
        .run(&mut adc, &mut out, &mut plot)
        .unwrap();

    assert_eq!(adc.reads, 5);
    assert_eq!(series.len(), 4);
    assert_eq!(plot.rendered, vec![series]);
}

#[test]
fn prints_status_lines() {
    let token = CancelToken::new();
    let mut adc = ScriptedAdc::new(vec![0, FULL_SCALE]);
    let mut out = CancellingOutput::new(2, &token);

    sampler(Pin, SensorConfig::default(), &token)
        .run(&mut adc, &mut out, &mut RecordingPlot::default())
        .unwrap();

    assert_eq!(
        String::from_utf8(out.text).unwrap(),
        "V: 0.000 V | I(raw): 0.00 mA | I(clamped): 4.00 mA | P: 0.000 bar\n\
         V: 5.000 V | I(raw): 22.73 mA | I(clamped): 20.00 mA | P: 7.000 bar\n"
    );
}

#[test]
fn cancellation_during_read_discards_sample() {
    for cancel_at in 0..4 {
        let token = CancelToken::new();
        let mut adc = ScriptedAdc::new(vec![FULL_SCALE]).cancelling_on_read(cancel_at, &token);
        let mut plot = RecordingPlot::default();

        let series = sampler(Pin, SensorConfig::default(), &token)
            .run(&mut adc, &mut io::sink(), &mut plot)
            .unwrap();

        assert_eq!(series.len(), cancel_at);
        assert_eq!(adc.reads, cancel_at + 1);
        assert_eq!(plot.rendered.len(), 1);
        assert_eq!(plot.rendered[0].len(), cancel_at);
    }
}

#[test]
fn cancelled_before_start() {
    let token = CancelToken::new();
    token.cancel();
    let mut adc = ScriptedAdc::new(vec![0]);
    let mut plot = RecordingPlot::default();

    let series = sampler(Pin, SensorConfig::default(), &token)
        .run(&mut adc, &mut io::sink(), &mut plot)
        .unwrap();

    assert!(series.is_empty());
    assert_eq!(adc.reads, 0);
    assert_eq!(plot.rendered, vec![Series::new()]);
}

#[test]
fn waits_for_conversion() {
    let token = CancelToken::new();
    let mut adc = ScriptedAdc::new(vec![FULL_SCALE]).cancelling_on_read(1, &token);
    adc.busy = 3;

    let series = sampler(Pin, SensorConfig::default(), &token)
        .run(&mut adc, &mut io::sink(), &mut RecordingPlot::default())
        .unwrap();

    assert_eq!(series.pressures(), &[7.0f32]);
    assert_eq!(adc.busy, 0);
}

#[test]
fn uses_configured_range() {
    let token = CancelToken::new();
    // 11 mA across 220 ohm
    let raw = (11.0 * 0.22 / 5.0 * FULL_SCALE as f64).round() as u32;
    let mut adc = ScriptedAdc::new(vec![raw]).cancelling_on_read(1, &token);
    let config = SensorConfig::builder()
        .range(CurrentRange::new(8.0, 14.0).unwrap())
        .max_pressure(10.0)
        .build()
        .unwrap();

    let series = sampler(Pin, config, &token)
        .run(&mut adc, &mut io::sink(), &mut RecordingPlot::default())
        .unwrap();

    assert!((series.currents()[0] - 11.0).abs() < 1e-3);
    assert!((series.pressures()[0] - 5.0).abs() < 1e-3);
}

#[test]
fn driver_error_stops_without_plot() {
    let token = CancelToken::new();
    let mut adc = Mock::new(&[
        Transaction::read(0, 0u32),
        Transaction::read(0, FULL_SCALE),
        Transaction::read(0, 0).with_error(MockError::Io(ErrorKind::TimedOut)),
    ]);
    let mut out = Vec::new();
    let mut plot = RecordingPlot::default();

    let result = sampler(MockChan0 {}, SensorConfig::default(), &token).run(
        &mut adc,
        &mut out,
        &mut plot,
    );

    match result {
        Err(SampleError::Driver(error)) => {
            assert_eq!(error, MockError::Io(ErrorKind::TimedOut))
        }
        other => panic!("expected a driver error, got {:?}", other),
    }
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
    assert!(plot.rendered.is_empty());
    adc.done();
}

#[test]
fn cancel_while_conversion_pending() {
    let token = CancelToken::new();
    let (tx, rx) = mpsc::channel();
    let sampling = {
        let token = token.clone();
        thread::spawn(move || {
            let mut adc = StuckAdc { polls: 0 };
            let mut plot = RecordingPlot::default();
            let result = sampler(StuckPin, SensorConfig::default(), &token).run(
                &mut adc,
                &mut io::sink(),
                &mut plot,
            );
            tx.send((result.map(|series| series.len()).ok(), adc.polls, plot.rendered.len()))
                .unwrap();
        })
    };

    cancel_after(&token, Duration::from_millis(50)).join().unwrap();
    let (samples, polls, plots) = rx.recv_timeout(Duration::from_secs(10)).unwrap();

    assert_eq!(samples, Some(0));
    assert!(polls > 0);
    assert_eq!(plots, 1);
    sampling.join().unwrap();
}

#[test]
fn cancel_during_interval() {
    let token = CancelToken::new();
    let mut adc = ScriptedAdc::new(vec![FULL_SCALE]);
    let mut plot = RecordingPlot::default();
    let canceller = cancel_after(&token, Duration::from_millis(50));

    let started = Instant::now();
    let series = sampler(Pin, SensorConfig::default(), &token)
        .with_interval(Duration::from_secs(60))
        .run(&mut adc, &mut io::sink(), &mut plot)
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(30));
    assert_eq!(series.len(), 1);
    assert_eq!(adc.reads, 1);
    assert_eq!(plot.rendered.len(), 1);
    canceller.join().unwrap();
}
