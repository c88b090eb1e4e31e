use crate::register::Register;
use embedded_hal::i2c::I2c;
use embedded_hal::spi::{Operation, SpiDevice};

/// Blocking register access to an already initialised bus.
///
/// Reads start at `start` and rely on the device auto-incrementing the register pointer.
pub trait Bus {
    type Error;

    fn write_reg(&mut self, reg: Register, value: u8) -> Result<(), Self::Error>;
    fn read_reg(&mut self, reg: Register) -> Result<u8, Self::Error>;
    fn read_many(&mut self, start: Register, buf: &mut [u8]) -> Result<(), Self::Error>;
}

/// 7-bit I2C slave address, selected by the SDO strap pin
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Address {
    /// SDO tied to GND
    #[default]
    SdoGnd,
    /// SDO tied to VDDIO
    SdoVddio,
    Custom(u8),
}

impl Address {
    pub const fn addr(self) -> u8 {
        match self {
            Address::SdoGnd => 0x76,
            Address::SdoVddio => 0x77,
            Address::Custom(addr) => addr,
        }
    }
}

impl From<u8> for Address {
    fn from(addr: u8) -> Self {
        match addr {
            0x76 => Address::SdoGnd,
            0x77 => Address::SdoVddio,
            other => Address::Custom(other),
        }
    }
}

pub struct I2cBus<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cBus<I2C> {
    pub fn new(i2c: I2C, address: Address) -> Self {
        Self {
            i2c,
            address: address.addr(),
        }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, I2CError> Bus for I2cBus<I2C>
where
    I2C: I2c<Error = I2CError>,
{
    type Error = I2CError;

    fn write_reg(&mut self, reg: Register, value: u8) -> Result<(), Self::Error> {
        let bytes = [reg.addr(), value];
        self.i2c.write(self.address, &bytes)
    }

    fn read_reg(&mut self, reg: Register) -> Result<u8, Self::Error> {
        let mut buffer: [u8; 1] = [0];
        self.i2c
            .write_read(self.address, &[reg.addr()], &mut buffer)?;
        Ok(buffer[0])
    }

    fn read_many(&mut self, start: Register, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.i2c.write_read(self.address, &[start.addr()], buf)
    }
}

/// 4-wire SPI access. In SPI mode only 7 bits of the register address are used,
/// bit 7 selects read (1) or write (0).
pub struct SpiBus<SPI> {
    spi: SPI,
}

const SPI_READ: u8 = 0x80;
const SPI_WRITE_MASK: u8 = 0x7F;

impl<SPI> SpiBus<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI, SPIError> Bus for SpiBus<SPI>
where
    SPI: SpiDevice<Error = SPIError>,
{
    type Error = SPIError;

    fn write_reg(&mut self, reg: Register, value: u8) -> Result<(), Self::Error> {
        self.spi.write(&[reg.addr() & SPI_WRITE_MASK, value])
    }

    fn read_reg(&mut self, reg: Register) -> Result<u8, Self::Error> {
        let mut buffer: [u8; 1] = [0];
        self.read_many(reg, &mut buffer)?;
        Ok(buffer[0])
    }

    fn read_many(&mut self, start: Register, buf: &mut [u8]) -> Result<(), Self::Error> {
        // one transaction so chip select stays asserted across the burst
        self.spi.transaction(&mut [
            Operation::Write(&[start.addr() | SPI_READ]),
            Operation::Read(buf),
        ])
    }
}
