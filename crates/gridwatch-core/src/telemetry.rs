//! Telemetry envelopes: the reading ranges that go with each line status.
//!
//! A healthy line reads close to nominal (230 V, 15 A, 45 °C). A faulted
//! line reads a voltage collapse, a current surge and overheating. Each
//! quantity is drawn uniformly from `center ± half_width`.

use gridwatch_types::{LineStatus, Telemetry};
use rand::Rng;

/// A symmetric range around a center value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// Midpoint of the range.
    pub center: f64,
    /// Distance from the midpoint to either edge.
    pub half_width: f64,
}

impl Band {
    /// Construct a band.
    pub const fn new(center: f64, half_width: f64) -> Self {
        Self { center, half_width }
    }

    /// Lower edge (inclusive).
    pub fn min(self) -> f64 {
        self.center - self.half_width
    }

    /// Upper edge (inclusive for membership checks).
    pub fn max(self) -> f64 {
        self.center + self.half_width
    }

    /// Whether `value` lies within the band.
    pub fn contains(self, value: f64) -> bool {
        value >= self.min() && value <= self.max()
    }

    /// Draw a value uniformly from the band.
    pub fn sample(self, rng: &mut impl Rng) -> f64 {
        if self.half_width <= 0.0 {
            return self.center;
        }
        self.center + rng.random_range(-self.half_width..self.half_width)
    }
}

/// Voltage, current and temperature bands for one line status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Envelope {
    /// Voltage band in volts.
    pub voltage: Band,
    /// Current band in amperes.
    pub current: Band,
    /// Temperature band in degrees Celsius.
    pub temperature: Band,
}

impl Envelope {
    /// Readings of a healthy line.
    pub const NORMAL: Self = Self {
        voltage: Band::new(230.0, 5.0),
        current: Band::new(15.0, 4.0),
        temperature: Band::new(45.0, 7.5),
    };

    /// Readings of a faulted line.
    pub const FAULT: Self = Self {
        voltage: Band::new(120.0, 50.0),
        current: Band::new(40.0, 10.0),
        temperature: Band::new(80.0, 10.0),
    };

    /// The envelope a line in `status` must read within.
    ///
    /// Offline lines have no envelope.
    pub const fn for_status(status: LineStatus) -> Option<Self> {
        match status {
            LineStatus::Operational => Some(Self::NORMAL),
            LineStatus::Fault => Some(Self::FAULT),
            LineStatus::Offline => None,
        }
    }

    /// Draw one reading from this envelope.
    pub fn sample(&self, rng: &mut impl Rng) -> Telemetry {
        Telemetry {
            voltage: self.voltage.sample(rng),
            current: self.current.sample(rng),
            temperature: self.temperature.sample(rng),
        }
    }

    /// Whether every quantity of `reading` lies inside the envelope.
    pub fn contains(&self, reading: &Telemetry) -> bool {
        self.voltage.contains(reading.voltage)
            && self.current.contains(reading.current)
            && self.temperature.contains(reading.temperature)
    }
}
