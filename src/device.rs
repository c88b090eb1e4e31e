use crate::bus::{Address, Bus, I2cBus, SpiBus};
use crate::calibration::{CalibrationParams, Compensator, Measurement, RawSample};
use crate::config::{Config, FilterConfig, MeasurementConfig, PowerMode};
use crate::register::{Register, Status, CALIBRATION_LEN, CHIP_ID, DATA_LEN, RESET_COMMAND};
use crate::Error;
use core::marker::PhantomData;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use embedded_hal::spi::SpiDevice;

/// Datasheet start-up time after power-on or soft reset
const STARTUP_MS: u32 = 2;
const NVM_POLL_ATTEMPTS: u32 = 10;
const MEASUREMENT_POLL_ATTEMPTS: u32 = 10;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Unconfigured;
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Configured;
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Calibrated;

pub trait IsConfigured {}
impl IsConfigured for Configured {}
impl IsConfigured for Calibrated {}

pub struct BMP280<B, S> {
    bus: B,
    compensator: Compensator,
    config: Config,
    _state: PhantomData<S>,
}

impl<I2C, I2CError> BMP280<I2cBus<I2C>, Unconfigured>
where
    I2C: I2c<Error = I2CError>,
{
    pub fn new_i2c(i2c: I2C, address: Address, config: &Config) -> Self {
        Self::new(I2cBus::new(i2c, address), config)
    }
}

impl<SPI, SPIError> BMP280<SpiBus<SPI>, Unconfigured>
where
    SPI: SpiDevice<Error = SPIError>,
{
    pub fn new_spi(spi: SPI, config: &Config) -> Self {
        Self::new(SpiBus::new(spi), config)
    }
}

impl<I2C, S> BMP280<I2cBus<I2C>, S> {
    pub fn release(self) -> I2C {
        self.bus.release()
    }
}

impl<SPI, S> BMP280<SpiBus<SPI>, S> {
    pub fn release(self) -> SPI {
        self.bus.release()
    }
}

impl<B> BMP280<B, Unconfigured>
where
    B: Bus,
{
    pub fn new(bus: B, config: &Config) -> Self {
        Self {
            bus,
            compensator: Compensator::new(),
            config: *config,
            _state: PhantomData,
        }
    }

    /// Verify the chip ID and write the configuration registers.
    pub fn init(mut self) -> Result<BMP280<B, Configured>, Error<B::Error>> {
        let id = self.chip_id()?;
        if id != CHIP_ID {
            warn!("unexpected chip id {=u8:#x}", id);
            return Err(Error::InvalidChipId(id));
        }
        let config = self.config;
        self.apply_config(&config)?;
        debug!("bmp280 configured");

        Ok(self.into_state())
    }

    /// Soft reset, wait for the NVM copy to finish, configure and read the calibration block.
    pub fn init_and_calibrate<D>(
        mut self,
        delay: &mut D,
    ) -> Result<BMP280<B, Calibrated>, Error<B::Error>>
    where
        D: DelayNs,
    {
        self.write_reg(Register::RESET, RESET_COMMAND)?;
        delay.delay_ms(STARTUP_MS);
        self.wait_nvm_copy(delay)?;

        self.init()?.read_calibration_unchecked()
    }

    fn wait_nvm_copy<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<B::Error>> {
        for _ in 0..NVM_POLL_ATTEMPTS {
            if !self.nvm_copy_in_progress()? {
                return Ok(());
            }
            delay.delay_ms(1);
        }
        Err(Error::NvmCopyTimeout)
    }
}

impl<B> BMP280<B, Configured>
where
    B: Bus,
{
    /// Read the trimming parameters. Fails with [`Error::NvmCopyInProgress`] while the
    /// device is still copying them from NVM to the image registers.
    pub fn read_calibration(mut self) -> Result<BMP280<B, Calibrated>, Error<B::Error>> {
        if self.nvm_copy_in_progress()? {
            return Err(Error::NvmCopyInProgress);
        }

        self.read_calibration_unchecked()
    }

    fn read_calibration_unchecked(mut self) -> Result<BMP280<B, Calibrated>, Error<B::Error>> {
        self.load_calibration()?;
        Ok(self.into_state())
    }
}

impl<B, S> BMP280<B, S>
where
    B: Bus,
{
    /// Configuration last written to the device
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn calibration(&self) -> Option<&CalibrationParams> {
        self.compensator.params()
    }

    /// Returns the `id` register, 0x58 for a BMP280
    pub fn chip_id(&mut self) -> Result<u8, Error<B::Error>> {
        self.read_reg(Register::ID)
    }

    pub fn status(&mut self) -> Result<Status, Error<B::Error>> {
        let status = self.read_reg(Register::STATUS)?;
        Ok(Status::from_bits(status))
    }

    /// Returns true while a conversion is running
    pub fn is_measuring(&mut self) -> Result<bool, Error<B::Error>> {
        Ok(self.status()?.measuring)
    }

    /// Returns true while NVM data are copied to the image registers
    pub fn nvm_copy_in_progress(&mut self) -> Result<bool, Error<B::Error>> {
        Ok(self.status()?.im_update)
    }

    /// Issue a soft reset. Calibration has to be read again afterwards.
    pub fn reset(mut self) -> Result<BMP280<B, Unconfigured>, Error<B::Error>> {
        self.write_reg(Register::RESET, RESET_COMMAND)?;
        self.compensator.clear();
        debug!("bmp280 reset");

        Ok(self.into_state())
    }

    fn load_calibration(&mut self) -> Result<(), Error<B::Error>> {
        let mut bytes = [0u8; CALIBRATION_LEN];
        self.read_many(Register::CALIB_00, &mut bytes)?;
        let params = CalibrationParams::from_bytes(&bytes);
        trace!("calibration t1={=u16} p1={=u16}", params.t1, params.p1);
        self.compensator.set_params(params);
        Ok(())
    }

    /// `config` is written before `ctrl_meas`, writes to `config` may be ignored in normal mode.
    fn apply_config(&mut self, config: &Config) -> Result<(), Error<B::Error>> {
        self.write_reg(Register::CONFIG, config.filter.encode())?;
        self.write_reg(Register::CTRL_MEAS, config.measurement.encode())?;
        self.config = *config;
        Ok(())
    }

    fn write_reg(&mut self, reg: Register, value: u8) -> Result<(), Error<B::Error>> {
        self.bus.write_reg(reg, value).map_err(Error::Bus)
    }

    fn read_reg(&mut self, reg: Register) -> Result<u8, Error<B::Error>> {
        self.bus.read_reg(reg).map_err(Error::Bus)
    }

    fn read_many(&mut self, start: Register, buf: &mut [u8]) -> Result<(), Error<B::Error>> {
        self.bus.read_many(start, buf).map_err(Error::Bus)
    }

    fn into_state<T>(self) -> BMP280<B, T> {
        BMP280 {
            bus: self.bus,
            compensator: self.compensator,
            config: self.config,
            _state: PhantomData,
        }
    }
}

impl<B, S> BMP280<B, S>
where
    B: Bus,
    S: IsConfigured,
{
    pub fn configure(&mut self, config: &Config) -> Result<(), Error<B::Error>> {
        self.apply_config(config)
    }

    pub fn set_measurement(
        &mut self,
        measurement: MeasurementConfig,
    ) -> Result<(), Error<B::Error>> {
        self.write_reg(Register::CTRL_MEAS, measurement.encode())?;
        self.config.measurement = measurement;
        Ok(())
    }

    pub fn set_filter(&mut self, filter: FilterConfig) -> Result<(), Error<B::Error>> {
        self.write_reg(Register::CONFIG, filter.encode())?;
        self.config.filter = filter;
        Ok(())
    }

    pub fn set_power_mode(&mut self, mode: PowerMode) -> Result<(), Error<B::Error>> {
        let measurement = MeasurementConfig {
            mode,
            ..self.config.measurement
        };
        self.set_measurement(measurement)
    }

    /// Read back and decode `ctrl_meas`
    pub fn measurement_config(&mut self) -> Result<MeasurementConfig, Error<B::Error>> {
        Ok(MeasurementConfig::decode(self.read_reg(Register::CTRL_MEAS)?))
    }

    /// Read back and decode `config`
    pub fn filter_config(&mut self) -> Result<FilterConfig, Error<B::Error>> {
        Ok(FilterConfig::decode(self.read_reg(Register::CONFIG)?))
    }

    /// Start a single measurement cycle, the device returns to sleep when done
    pub fn trigger_forced(&mut self) -> Result<(), Error<B::Error>> {
        self.set_power_mode(PowerMode::Forced)
    }

    /// Burst read of the six data registers. Pressure and temperature are read in one
    /// transaction so both words belong to the same conversion.
    pub fn read_raw(&mut self) -> Result<RawSample, Error<B::Error>> {
        let mut bytes = [0u8; DATA_LEN];
        self.read_many(Register::PRESS_MSB, &mut bytes)?;
        let sample = RawSample::from_bytes(&bytes);
        trace!("raw p={=u32} t={=u32}", sample.pressure, sample.temperature);
        Ok(sample)
    }
}

impl<B> BMP280<B, Calibrated>
where
    B: Bus,
{
    /// Read the calibration block again
    pub fn reload_calibration(&mut self) -> Result<(), Error<B::Error>> {
        self.load_calibration()
    }

    /// Read and compensate the latest sample.
    pub fn read(&mut self) -> Result<Measurement, Error<B::Error>> {
        let sample = self.read_raw()?;
        Ok(self.compensator.compensate(sample)?)
    }

    /// Like [`Self::read`], but returns `WouldBlock` while a conversion is running.
    pub fn try_read(&mut self) -> nb::Result<Measurement, Error<B::Error>> {
        if self.is_measuring()? {
            return Err(nb::Error::WouldBlock);
        }
        self.read().map_err(nb::Error::Other)
    }

    /// Temperature in 0.01 °C
    pub fn read_temperature(&mut self) -> Result<i32, Error<B::Error>> {
        let sample = self.read_raw()?;
        Ok(self.compensator.compensate_temperature(sample.temperature)?)
    }

    /// Pressure in Pa as Q24.8. Temperature is compensated from the same burst first.
    pub fn read_pressure(&mut self) -> Result<u32, Error<B::Error>> {
        Ok(self.read()?.pressure)
    }

    /// Trigger a forced measurement, wait for it and return the result.
    pub fn measure_forced<D>(&mut self, delay: &mut D) -> Result<Measurement, Error<B::Error>>
    where
        D: DelayNs,
    {
        self.trigger_forced()?;
        delay.delay_us(self.config.measurement.max_measurement_time_us());

        for _ in 0..MEASUREMENT_POLL_ATTEMPTS {
            if !self.is_measuring()? {
                return self.read();
            }
            delay.delay_ms(1);
        }
        Err(Error::MeasurementTimeout)
    }
}
