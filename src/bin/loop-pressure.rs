use std::io::{self, BufRead, Write};

use simple_signal::{self, Signal};

use loop_pressure::sim::{Ain0, SweepAdc};
use loop_pressure::{CancelToken, ChartPlot, PressureSensor, RangePreset, Sampler, SensorConfig};

/// Prompts until the operator picks a valid preset; `None` on end of input.
fn choose_range(
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<Option<RangePreset>> {
    writeln!(output, "Pressure Sensor Current Range:")?;
    for preset in RangePreset::ALL {
        writeln!(output, "  {}. {}", preset.key(), preset)?;
    }

    let mut line = String::new();
    loop {
        write!(output, "Choose range: ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match RangePreset::from_selection(&line) {
            Some(preset) => return Ok(Some(preset)),
            None => writeln!(output, "invalid selection {:?}, enter 1, 2 or 3", line.trim())?,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let stdout = io::stdout();
    let preset = match choose_range(&mut io::stdin().lock(), &mut stdout.lock())? {
        Some(preset) => preset,
        None => return Ok(()),
    };
    let config = SensorConfig::builder().range(preset.range()).build()?;
    log::info!("selected {} ({:?})", preset, config);

    let token = CancelToken::new();
    simple_signal::set_handler(&[Signal::Int, Signal::Term], {
        let token = token.clone();
        move |signals| {
            log::debug!("received {:?}", signals);
            token.cancel();
        }
    });

    // no hardware driver is linked in; sweep slightly past the full loop span
    let mut adc = SweepAdc::new(config, 3.0, 21.0, 24);
    let sensor = PressureSensor::new(Ain0, config);

    println!("\nReading Pressure Sensor. Press Ctrl+C to stop...\n");
    let mut plot = ChartPlot::default();
    let series = Sampler::new(sensor, token).run(&mut adc, &mut stdout.lock(), &mut plot)?;
    println!("\n{} samples plotted to {}", series.len(), plot.path().display());

    Ok(())
}
