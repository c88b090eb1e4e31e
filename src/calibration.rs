//! Factory calibration constants and the integer compensation formulas.
//!
//! The formulas are the 32 bit temperature and 64 bit pressure routines from datasheet
//! section 3.11.3 (Bosch BST-BMP280-DS001).

use crate::register::{CALIBRATION_LEN, DATA_LEN};
use core::fmt;

/// ADC outputs are 20 bit
const ADC_MASK: u32 = 0x000F_FFFF;

/// Trimming parameters `dig_T1..dig_T3`, `dig_P1..dig_P9` read from 0x88..0x9F
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CalibrationParams {
    pub t1: u16,
    pub t2: i16,
    pub t3: i16,
    pub p1: u16,
    pub p2: i16,
    pub p3: i16,
    pub p4: i16,
    pub p5: i16,
    pub p6: i16,
    pub p7: i16,
    pub p8: i16,
    pub p9: i16,
}

impl CalibrationParams {
    /// Every word is stored little endian, LSB at the lower address.
    pub fn from_bytes(bytes: &[u8; CALIBRATION_LEN]) -> Self {
        let u = |i: usize| u16::from_le_bytes([bytes[i], bytes[i + 1]]);
        let s = |i: usize| i16::from_le_bytes([bytes[i], bytes[i + 1]]);

        Self {
            t1: u(0),
            t2: s(2),
            t3: s(4),
            p1: u(6),
            p2: s(8),
            p3: s(10),
            p4: s(12),
            p5: s(14),
            p6: s(16),
            p7: s(18),
            p8: s(20),
            p9: s(22),
        }
    }
}

/// Uncompensated ADC words from one burst read of 0xF7..0xFC
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawSample {
    pub pressure: u32,
    pub temperature: u32,
}

impl RawSample {
    /// `bytes` is press_msb, press_lsb, press_xlsb, temp_msb, temp_lsb, temp_xlsb.
    /// Only bits 7:4 of the xlsb registers carry data.
    pub fn from_bytes(bytes: &[u8; DATA_LEN]) -> Self {
        let word = |msb: u8, lsb: u8, xlsb: u8| {
            ((msb as u32) << 12) | ((lsb as u32) << 4) | ((xlsb as u32) >> 4)
        };

        Self {
            pressure: word(bytes[0], bytes[1], bytes[2]),
            temperature: word(bytes[3], bytes[4], bytes[5]),
        }
    }
}

/// Fine resolution temperature produced by [`compensate_temperature`], consumed by
/// [`compensate_pressure`] for the same sample.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TFine(i32);

impl TFine {
    pub fn value(self) -> i32 {
        self.0
    }
}

/// Compensated temperature and pressure
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Measurement {
    /// Hundredths of a degree Celsius, 2508 = 25.08 °C
    pub temperature: i32,
    /// Pascal as unsigned Q24.8, 25767233 = 25767233 / 256 = 100653.25 Pa
    pub pressure: u32,
}

impl Measurement {
    pub fn temperature_celsius(&self) -> f32 {
        self.temperature as f32 / 100.0
    }

    pub fn pressure_pa(&self) -> f32 {
        self.pressure as f32 / 256.0
    }

    pub fn pressure_hpa(&self) -> f32 {
        self.pressure_pa() / 100.0
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompensationError {
    /// No calibration constants have been loaded
    UninitializedCalibration,
    /// The pressure polynomial has a zero denominator or leaves 64 bit range
    IllFormedCompensation,
    /// Pressure compensation without a preceding temperature compensation for the sample
    SequenceViolation,
}

impl fmt::Display for CompensationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompensationError::UninitializedCalibration => {
                f.write_str("calibration constants not loaded")
            }
            CompensationError::IllFormedCompensation => {
                f.write_str("pressure compensation is undefined for these constants")
            }
            CompensationError::SequenceViolation => {
                f.write_str("pressure compensated without a fresh temperature compensation")
            }
        }
    }
}

/// Returns the temperature in 0.01 °C together with `t_fine`.
pub fn compensate_temperature(raw: u32, params: &CalibrationParams) -> (i32, TFine) {
    let adc = i64::from(raw & ADC_MASK);
    let t1 = i64::from(params.t1);
    let t2 = i64::from(params.t2);
    let t3 = i64::from(params.t3);

    let var1 = (((adc >> 3) - (t1 << 1)) * t2) >> 11;
    let var2 = (((((adc >> 4) - t1) * ((adc >> 4) - t1)) >> 12) * t3) >> 14;

    // |t_fine| < 2^23 for any 20 bit input
    let t_fine = (var1 + var2) as i32;
    let temperature = (t_fine * 5 + 128) >> 8;
    (temperature, TFine(t_fine))
}

fn checked_mul(a: i64, b: i64) -> Result<i64, CompensationError> {
    a.checked_mul(b)
        .ok_or(CompensationError::IllFormedCompensation)
}

/// Returns the pressure in Pa as unsigned Q24.8.
pub fn compensate_pressure(
    raw: u32,
    t_fine: TFine,
    params: &CalibrationParams,
) -> Result<u32, CompensationError> {
    let p1 = i64::from(params.p1);
    let p2 = i64::from(params.p2);
    let p3 = i64::from(params.p3);
    let p4 = i64::from(params.p4);
    let p5 = i64::from(params.p5);
    let p6 = i64::from(params.p6);
    let p7 = i64::from(params.p7);
    let p8 = i64::from(params.p8);
    let p9 = i64::from(params.p9);

    let var1 = i64::from(t_fine.0) - 128_000;
    let mut var2 = var1 * var1 * p6;
    var2 += (var1 * p5) << 17;
    var2 += p4 << 35;
    let var1 = ((var1 * var1 * p3) >> 8) + ((var1 * p2) << 12);
    let var1 = checked_mul((1_i64 << 47) + var1, p1)? >> 33;

    if var1 == 0 {
        return Err(CompensationError::IllFormedCompensation);
    }

    let p = 1_048_576 - i64::from(raw & ADC_MASK);
    let p = checked_mul((p << 31) - var2, 3125)? / var1;
    let var1 = checked_mul(checked_mul(p9, p >> 13)?, p >> 13)? >> 25;
    let var2 = checked_mul(p8, p)? >> 19;
    let p = p
        .checked_add(var1)
        .and_then(|p| p.checked_add(var2))
        .ok_or(CompensationError::IllFormedCompensation)?;
    let p = (p >> 8) + (p7 << 4);

    u32::try_from(p).map_err(|_| CompensationError::IllFormedCompensation)
}

/// Holds the calibration constants of one device and the pending `t_fine`.
///
/// Temperature must be compensated before pressure for every sample: compensating pressure
/// consumes the `t_fine` left by the last temperature compensation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Compensator {
    params: Option<CalibrationParams>,
    t_fine: Option<TFine>,
}

impl Compensator {
    pub const fn new() -> Self {
        Self {
            params: None,
            t_fine: None,
        }
    }

    pub const fn with_params(params: CalibrationParams) -> Self {
        Self {
            params: Some(params),
            t_fine: None,
        }
    }

    /// Replaces the constants and drops any pending `t_fine`
    pub fn set_params(&mut self, params: CalibrationParams) {
        self.params = Some(params);
        self.t_fine = None;
    }

    pub fn clear(&mut self) {
        self.params = None;
        self.t_fine = None;
    }

    pub fn params(&self) -> Option<&CalibrationParams> {
        self.params.as_ref()
    }

    pub fn is_calibrated(&self) -> bool {
        self.params.is_some()
    }

    fn require_params(&self) -> Result<&CalibrationParams, CompensationError> {
        self.params
            .as_ref()
            .ok_or(CompensationError::UninitializedCalibration)
    }

    /// Returns 0.01 °C and remembers `t_fine` for the paired pressure word.
    pub fn compensate_temperature(&mut self, raw: u32) -> Result<i32, CompensationError> {
        let (temperature, t_fine) = compensate_temperature(raw, self.require_params()?);
        self.t_fine = Some(t_fine);
        Ok(temperature)
    }

    /// Returns Pa as Q24.8. Fails with [`CompensationError::SequenceViolation`] unless
    /// [`Self::compensate_temperature`] ran since the previous pressure compensation.
    pub fn compensate_pressure(&mut self, raw: u32) -> Result<u32, CompensationError> {
        let params = *self.require_params()?;
        let t_fine = self
            .t_fine
            .take()
            .ok_or(CompensationError::SequenceViolation)?;
        compensate_pressure(raw, t_fine, &params)
    }

    pub fn compensate(&mut self, sample: RawSample) -> Result<Measurement, CompensationError> {
        let temperature = self.compensate_temperature(sample.temperature)?;
        let pressure = self.compensate_pressure(sample.pressure)?;
        Ok(Measurement {
            temperature,
            pressure,
        })
    }
}
