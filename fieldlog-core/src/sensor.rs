//! Sensor seam
//!
//! The driver behind this trait handles its own retries and hardware
//! quirks; the core only sees one optional reading per sampling tick.
//! `None` and NaN values both mean "no sample this cycle": they are
//! never buffered and never count toward capacity.

/// One raw sensor reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Temperature in degrees Celsius
    pub temperature: f32,
    /// Relative humidity in percent
    pub humidity: f32,
}

impl SensorReading {
    /// Whether both values are finite numbers
    pub fn is_valid(&self) -> bool {
        self.temperature.is_finite() && self.humidity.is_finite()
    }
}

/// Source of environmental readings
pub trait SensorSource: Send {
    /// Take one reading; `None` when the sensor could not deliver
    fn read(&mut self) -> Option<SensorReading>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_validity() {
        let good = SensorReading {
            temperature: 21.0,
            humidity: 45.0,
        };
        assert!(good.is_valid());

        let nan = SensorReading {
            temperature: f32::NAN,
            humidity: 45.0,
        };
        assert!(!nan.is_valid());

        let inf = SensorReading {
            temperature: 21.0,
            humidity: f32::INFINITY,
        };
        assert!(!inf.is_valid());
    }
}
