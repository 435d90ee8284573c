use std::io;

use crate::sampling::Series;

pub const TITLE: &str = "Pressure vs Current";
pub const X_LABEL: &str = "Current (mA)";
pub const Y_LABEL: &str = "Pressure (bar)";

/// Consumer of a finished session.
pub trait Plot {
    fn render(&mut self, series: &Series) -> io::Result<()>;
}

#[cfg(feature = "chart")]
pub use chart::ChartPlot;

#[cfg(feature = "chart")]
mod chart {
    use std::fmt;
    use std::io;
    use std::path::{Path, PathBuf};

    use plotters::prelude::*;

    use super::{Plot, TITLE, X_LABEL, Y_LABEL};
    use crate::sampling::Series;

    /// Draws pressure against clamped current as an SVG chart: joined
    /// points with circle markers over a labelled mesh.
    #[derive(Debug, Clone)]
    pub struct ChartPlot {
        path: PathBuf,
        size: (u32, u32),
    }

    impl ChartPlot {
        pub const DEFAULT_PATH: &'static str = "pressure_vs_current.svg";

        pub fn new(path: impl Into<PathBuf>) -> Self {
            Self {
                path: path.into(),
                size: (800, 600),
            }
        }

        /// Image size in pixels.
        pub fn with_size(self, width: u32, height: u32) -> Self {
            Self {
                size: (width, height),
                ..self
            }
        }

        pub fn path(&self) -> &Path {
            &self.path
        }
    }

    impl Default for ChartPlot {
        fn default() -> Self {
            Self::new(Self::DEFAULT_PATH)
        }
    }

    fn to_io(error: impl fmt::Display) -> io::Error {
        io::Error::new(io::ErrorKind::Other, error.to_string())
    }

    /// Extent of one axis, widened when all values coincide.
    pub(super) fn extent(values: &[f32]) -> (f32, f32) {
        let (min, max) = values
            .iter()
            .filter(|value| value.is_finite())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), &value| {
                (min.min(value), max.max(value))
            });
        if min > max {
            (0.0, 1.0)
        } else if min == max {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        }
    }

    impl Plot for ChartPlot {
        fn render(&mut self, series: &Series) -> io::Result<()> {
            let (x_min, x_max) = extent(series.currents());
            let (y_min, y_max) = extent(series.pressures());

            let root = SVGBackend::new(&self.path, self.size).into_drawing_area();
            root.fill(&WHITE).map_err(to_io)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(TITLE, ("sans-serif", 24))
                .margin(16)
                .x_label_area_size(40)
                .y_label_area_size(56)
                .build_cartesian_2d(x_min..x_max, y_min..y_max)
                .map_err(to_io)?;
            chart
                .configure_mesh()
                .x_desc(X_LABEL)
                .y_desc(Y_LABEL)
                .draw()
                .map_err(to_io)?;

            chart
                .draw_series(LineSeries::new(series.points(), &GREEN))
                .map_err(to_io)?;
            chart
                .draw_series(series.points().map(|point| Circle::new(point, 4, GREEN.filled())))
                .map_err(to_io)?;

            root.present().map_err(to_io)?;
            log::info!("plotted {} samples to {}", series.len(), self.path.display());
            Ok(())
        }
    }
}
