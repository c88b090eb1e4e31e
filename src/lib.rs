//!
//! BMP280 embedded-hal driver crate
//!
//! A platform agnostic driver to interface with the Bosch BMP280 barometric pressure & temp
//! sensor over I2C or SPI via [embedded-hal].
//!
//! The driver reads the factory trimming parameters once, then turns each burst read of the
//! data registers into a compensated temperature (0.01 °C) and pressure (Pa, Q24.8) using the
//! integer formulas from the datasheet. Temperature is always compensated before pressure,
//! the pressure formula depends on the `t_fine` value it produces.
//!
//! ```
//! # use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
//! # let i2c = I2cMock::new(&[
//! #     I2cTransaction::write_read(0x76, vec![0xD0], vec![0x58]),
//! #     I2cTransaction::write(0x76, vec![0xF5, 0x10]),
//! #     I2cTransaction::write(0x76, vec![0xF4, 0x2F]),
//! #     I2cTransaction::write_read(0x76, vec![0xF3], vec![0x00]),
//! #     I2cTransaction::write_read(0x76, vec![0x88], vec![
//! #         112, 107, 67, 103, 24, 252, 125, 142, 67, 214, 208, 11, 39, 11, 140, 0, 249, 255,
//! #         140, 60, 248, 198, 112, 23,
//! #     ]),
//! #     I2cTransaction::write_read(0x76, vec![0xF7], vec![0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00]),
//! # ]);
//! # let mut mock = i2c.clone();
//! use uf_bmp280::{Address, Config, Preset, BMP280};
//!
//! let config = Config::preset(Preset::HandheldDynamic);
//! let bmp = BMP280::new_i2c(i2c, Address::SdoGnd, &config);
//! let mut bmp = bmp.init()?.read_calibration()?;
//!
//! let measurement = bmp.read()?;
//! assert_eq!(measurement.temperature, 2508);
//! assert_eq!(measurement.pressure, 25767233);
//! # mock.done();
//! # Ok::<(), uf_bmp280::Error<embedded_hal::i2c::ErrorKind>>(())
//! ```
//!
//! [embedded-hal]: https://docs.rs/embedded-hal

#![no_std]

#[macro_use]
mod fmt;

mod bus;
mod calibration;
mod config;
mod device;
mod register;

use ::core::fmt as core_fmt;

pub use bus::{Address, Bus, I2cBus, SpiBus};
pub use calibration::{
    compensate_pressure, compensate_temperature, CalibrationParams, CompensationError,
    Compensator, Measurement, RawSample, TFine,
};
pub use config::{
    encode_filter, encode_measurement, Config, Filter, FilterConfig, MeasurementConfig,
    Oversampling, PowerMode, Preset, StandbyTime,
};
pub use device::{Calibrated, Configured, IsConfigured, Unconfigured, BMP280};
pub use register::{Register, Status, CALIBRATION_LEN, CHIP_ID, DATA_LEN, RESET_COMMAND};

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq)]
pub enum Error<BusError> {
    /// I2C / SPI interface error
    Bus(BusError),
    /// `id` register did not read 0x58
    InvalidChipId(u8),
    /// Calibration requested while NVM data are still being copied
    NvmCopyInProgress,
    /// NVM copy did not finish after reset
    NvmCopyTimeout,
    /// Measurement did not finish within the datasheet maximum
    MeasurementTimeout,
    /// Compensation requested before calibration constants were loaded
    UninitializedCalibration,
    /// Pressure polynomial denominator is zero or leaves 64 bit range
    IllFormedCompensation,
    /// Pressure compensated without a preceding temperature compensation
    SequenceViolation,
}

impl<BusError> From<CompensationError> for Error<BusError> {
    fn from(err: CompensationError) -> Self {
        match err {
            CompensationError::UninitializedCalibration => Error::UninitializedCalibration,
            CompensationError::IllFormedCompensation => Error::IllFormedCompensation,
            CompensationError::SequenceViolation => Error::SequenceViolation,
        }
    }
}

impl<BusError: core_fmt::Debug> core_fmt::Display for Error<BusError> {
    fn fmt(&self, f: &mut core_fmt::Formatter<'_>) -> core_fmt::Result {
        match self {
            Error::Bus(err) => write!(f, "bus error: {err:?}"),
            Error::InvalidChipId(id) => write!(f, "unexpected chip id 0x{id:02X}"),
            Error::NvmCopyInProgress => f.write_str("NVM copy in progress"),
            Error::NvmCopyTimeout => f.write_str("NVM copy did not finish"),
            Error::MeasurementTimeout => f.write_str("measurement did not finish"),
            Error::UninitializedCalibration => {
                core_fmt::Display::fmt(&CompensationError::UninitializedCalibration, f)
            }
            Error::IllFormedCompensation => {
                core_fmt::Display::fmt(&CompensationError::IllFormedCompensation, f)
            }
            Error::SequenceViolation => {
                core_fmt::Display::fmt(&CompensationError::SequenceViolation, f)
            }
        }
    }
}
