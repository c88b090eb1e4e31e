//! BMP280 register map, see datasheet BST-BMP280-DS001 section 4.2 (Table 18: Memory map)

/// BMP280 chip identification number, read from [`Register::ID`]
pub const CHIP_ID: u8 = 0x58;

/// Writing this value to [`Register::RESET`] runs the complete power-on-reset procedure
pub const RESET_COMMAND: u8 = 0xB6;

/// Size of the factory calibration block starting at [`Register::CALIB_00`]
pub const CALIBRATION_LEN: usize = 24;

/// Size of the pressure + temperature data block starting at [`Register::PRESS_MSB`]
pub const DATA_LEN: usize = 6;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Register(u8);

impl Register {
    /// First byte of the calibration block (dig_T1 LSB). The block ends at 0x9F.
    pub const CALIB_00: Register = Register(0x88);
    pub const ID: Register = Register(0xD0);
    pub const RESET: Register = Register(0xE0);
    /// bit 3: measuring, bit 0: im_update
    pub const STATUS: Register = Register(0xF3);
    /// osrs_t[7:5] osrs_p[4:2] mode[1:0]
    pub const CTRL_MEAS: Register = Register(0xF4);
    /// t_sb[7:5] filter[4:2] spi3w_en[0]
    pub const CONFIG: Register = Register(0xF5);
    pub const PRESS_MSB: Register = Register(0xF7);
    pub const PRESS_LSB: Register = Register(0xF8);
    pub const PRESS_XLSB: Register = Register(0xF9);
    pub const TEMP_MSB: Register = Register(0xFA);
    pub const TEMP_LSB: Register = Register(0xFB);
    pub const TEMP_XLSB: Register = Register(0xFC);

    pub const fn addr(self) -> u8 {
        self.0
    }
}

/// Decoded contents of the `status` register (0xF3)
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Status {
    /// A conversion is running; cleared once the results reach the data registers
    pub measuring: bool,
    /// NVM data are being copied to the image registers (power-on and before every conversion)
    pub im_update: bool,
}

impl Status {
    pub(crate) fn from_bits(status: u8) -> Self {
        Self {
            measuring: (status & (1 << 3)) != 0,
            im_update: (status & 1) != 0,
        }
    }
}
