//! Register field encodings for `ctrl_meas` (0xF4) and `config` (0xF5).
//!
//! See datasheet sections 3.3 - 3.6 and 4.3.4 - 4.3.5.

/// Oversampling setting, used for both `osrs_t` and `osrs_p` (3 bits each)
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Oversampling {
    /// Measurement skipped, output set to 0x80000
    #[default]
    Skip = 0b000,
    X1 = 0b001,
    X2 = 0b010,
    X4 = 0b011,
    X8 = 0b100,
    X16 = 0b101,
}

impl Oversampling {
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Decode a 3 bit field. 0b110 and 0b111 are documented as x16.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Oversampling::Skip,
            0b001 => Oversampling::X1,
            0b010 => Oversampling::X2,
            0b011 => Oversampling::X4,
            0b100 => Oversampling::X8,
            _ => Oversampling::X16,
        }
    }

    /// Number of internal conversions averaged per sample
    pub const fn factor(self) -> u32 {
        match self {
            Oversampling::Skip => 0,
            Oversampling::X1 => 1,
            Oversampling::X2 => 2,
            Oversampling::X4 => 4,
            Oversampling::X8 => 8,
            Oversampling::X16 => 16,
        }
    }
}

/// Power mode, `mode[1:0]` of `ctrl_meas`
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum PowerMode {
    #[default]
    Sleep = 0b00,
    /// One measurement, then back to sleep
    Forced = 0b01,
    /// Measure, wait t_sb, repeat
    Normal = 0b11,
}

impl PowerMode {
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Decode a 2 bit field. Both 0b01 and 0b10 select forced mode.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => PowerMode::Sleep,
            0b11 => PowerMode::Normal,
            _ => PowerMode::Forced,
        }
    }
}

/// Inactive duration between measurements in normal mode, `t_sb[2:0]` of `config`
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum StandbyTime {
    #[default]
    Ms0_5 = 0b000,
    Ms62_5 = 0b001,
    Ms125 = 0b010,
    Ms250 = 0b011,
    Ms500 = 0b100,
    Ms1000 = 0b101,
    Ms2000 = 0b110,
    Ms4000 = 0b111,
}

impl StandbyTime {
    pub const fn bits(self) -> u8 {
        self as u8
    }

    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => StandbyTime::Ms0_5,
            0b001 => StandbyTime::Ms62_5,
            0b010 => StandbyTime::Ms125,
            0b011 => StandbyTime::Ms250,
            0b100 => StandbyTime::Ms500,
            0b101 => StandbyTime::Ms1000,
            0b110 => StandbyTime::Ms2000,
            _ => StandbyTime::Ms4000,
        }
    }

    pub const fn micros(self) -> u32 {
        match self {
            StandbyTime::Ms0_5 => 500,
            StandbyTime::Ms62_5 => 62_500,
            StandbyTime::Ms125 => 125_000,
            StandbyTime::Ms250 => 250_000,
            StandbyTime::Ms500 => 500_000,
            StandbyTime::Ms1000 => 1_000_000,
            StandbyTime::Ms2000 => 2_000_000,
            StandbyTime::Ms4000 => 4_000_000,
        }
    }
}

/// IIR filter coefficient, `filter[2:0]` of `config`
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Filter {
    #[default]
    Off = 0b000,
    X2 = 0b001,
    X4 = 0b010,
    X8 = 0b011,
    X16 = 0b100,
}

impl Filter {
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Decode a 3 bit field, values above 0b100 are treated as x16.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Filter::Off,
            0b001 => Filter::X2,
            0b010 => Filter::X4,
            0b011 => Filter::X8,
            _ => Filter::X16,
        }
    }
}

/// Contents of `ctrl_meas` (0xF4)
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeasurementConfig {
    pub temperature: Oversampling,
    pub pressure: Oversampling,
    pub mode: PowerMode,
}

impl MeasurementConfig {
    pub const fn new(temperature: Oversampling, pressure: Oversampling, mode: PowerMode) -> Self {
        Self {
            temperature,
            pressure,
            mode,
        }
    }

    pub const fn encode(&self) -> u8 {
        encode_measurement(self.temperature, self.pressure, self.mode)
    }

    pub const fn decode(value: u8) -> Self {
        Self {
            temperature: Oversampling::from_bits(value >> 5),
            pressure: Oversampling::from_bits(value >> 2),
            mode: PowerMode::from_bits(value),
        }
    }

    /// Worst case duration of one measurement cycle in microseconds (datasheet 3.8.1)
    pub const fn max_measurement_time_us(&self) -> u32 {
        let pressure = match self.pressure {
            Oversampling::Skip => 0,
            osr => 2300 * osr.factor() + 575,
        };
        1250 + 2300 * self.temperature.factor() + pressure
    }
}

/// Contents of `config` (0xF5)
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterConfig {
    pub standby: StandbyTime,
    pub filter: Filter,
    /// Enables the 3-wire SPI interface
    pub spi3w_enable: bool,
}

impl FilterConfig {
    pub const fn new(standby: StandbyTime, filter: Filter, spi3w_enable: bool) -> Self {
        Self {
            standby,
            filter,
            spi3w_enable,
        }
    }

    pub const fn encode(&self) -> u8 {
        encode_filter(self.standby, self.filter, self.spi3w_enable)
    }

    /// Bit 1 is reserved and ignored.
    pub const fn decode(value: u8) -> Self {
        Self {
            standby: StandbyTime::from_bits(value >> 5),
            filter: Filter::from_bits(value >> 2),
            spi3w_enable: (value & 1) != 0,
        }
    }
}

/// `osrs_t[7:5] | osrs_p[4:2] | mode[1:0]`
pub const fn encode_measurement(
    temperature: Oversampling,
    pressure: Oversampling,
    mode: PowerMode,
) -> u8 {
    (temperature.bits() << 5) | (pressure.bits() << 2) | mode.bits()
}

/// `t_sb[7:5] | filter[4:2] | spi3w_en[0]`
pub const fn encode_filter(standby: StandbyTime, filter: Filter, spi3w_enable: bool) -> u8 {
    (standby.bits() << 5) | (filter.bits() << 2) | (spi3w_enable as u8)
}

/// Recommended settings per use case, datasheet section 3.4 (Table 7)
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    HandheldLowPower,
    HandheldDynamic,
    WeatherMonitoring,
    FloorChangeDetection,
    DropDetection,
    IndoorNavigation,
}

/// Full device configuration. The default is the power-on reset state of both registers.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    pub measurement: MeasurementConfig,
    pub filter: FilterConfig,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preset(preset: Preset) -> Self {
        use Oversampling::*;

        let (temperature, pressure, mode, filter, standby) = match preset {
            Preset::HandheldLowPower => {
                (X2, X16, PowerMode::Normal, Filter::X4, StandbyTime::Ms62_5)
            }
            Preset::HandheldDynamic => {
                (X1, X4, PowerMode::Normal, Filter::X16, StandbyTime::Ms0_5)
            }
            Preset::WeatherMonitoring => {
                (X1, X1, PowerMode::Forced, Filter::Off, StandbyTime::Ms0_5)
            }
            Preset::FloorChangeDetection => {
                (X1, X4, PowerMode::Normal, Filter::X4, StandbyTime::Ms125)
            }
            Preset::DropDetection => (X1, X2, PowerMode::Normal, Filter::Off, StandbyTime::Ms0_5),
            Preset::IndoorNavigation => {
                (X2, X16, PowerMode::Normal, Filter::X16, StandbyTime::Ms0_5)
            }
        };

        Self {
            measurement: MeasurementConfig::new(temperature, pressure, mode),
            filter: FilterConfig::new(standby, filter, false),
        }
    }

    pub fn temperature_oversampling(mut self, osr: Oversampling) -> Self {
        self.measurement.temperature = osr;
        self
    }

    pub fn pressure_oversampling(mut self, osr: Oversampling) -> Self {
        self.measurement.pressure = osr;
        self
    }

    pub fn power_mode(mut self, mode: PowerMode) -> Self {
        self.measurement.mode = mode;
        self
    }

    pub fn standby_time(mut self, standby: StandbyTime) -> Self {
        self.filter.standby = standby;
        self
    }

    pub fn iir_filter(mut self, filter: Filter) -> Self {
        self.filter.filter = filter;
        self
    }

    pub fn spi3w_enable(mut self, enable: bool) -> Self {
        self.filter.spi3w_enable = enable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_measurement_packs_fields() {
        let value = encode_measurement(Oversampling::X2, Oversampling::X4, PowerMode::Normal);
        assert_eq!(value, (0b010 << 5) | (0b011 << 2) | 0b11);
        assert_eq!(value, 0x4F);

        let cfg = MeasurementConfig::new(Oversampling::X2, Oversampling::X4, PowerMode::Normal);
        assert_eq!(cfg.encode(), value);
        assert_eq!(MeasurementConfig::decode(value), cfg);
    }

    #[test]
    fn encode_filter_packs_fields() {
        let value = encode_filter(StandbyTime::Ms1000, Filter::X16, true);
        assert_eq!(value, (0b101 << 5) | (0b100 << 2) | 1);

        let cfg = FilterConfig::new(StandbyTime::Ms1000, Filter::X16, true);
        assert_eq!(cfg.encode(), value);
        assert_eq!(FilterConfig::decode(value), cfg);
    }

    #[test]
    fn every_measurement_setting_decodes_back() {
        let osrs = [
            Oversampling::Skip,
            Oversampling::X1,
            Oversampling::X2,
            Oversampling::X4,
            Oversampling::X8,
            Oversampling::X16,
        ];
        let modes = [PowerMode::Sleep, PowerMode::Forced, PowerMode::Normal];
        for t in osrs {
            for p in osrs {
                for mode in modes {
                    let cfg = MeasurementConfig::new(t, p, mode);
                    assert_eq!(MeasurementConfig::decode(cfg.encode()), cfg);
                }
            }
        }
    }

    #[test]
    fn reserved_patterns_decode() {
        assert_eq!(Oversampling::from_bits(0b110), Oversampling::X16);
        assert_eq!(Oversampling::from_bits(0b111), Oversampling::X16);
        assert_eq!(PowerMode::from_bits(0b10), PowerMode::Forced);
        assert_eq!(Filter::from_bits(0b111), Filter::X16);
        // reserved bit 1 of config is ignored
        assert_eq!(FilterConfig::decode(0b0000_0010), FilterConfig::default());
    }

    #[test]
    fn reset_state_encodes_to_zero() {
        let cfg = Config::new();
        assert_eq!(cfg.measurement.encode(), 0x00);
        assert_eq!(cfg.filter.encode(), 0x00);
    }

    #[test]
    fn presets_follow_datasheet() {
        let weather = Config::preset(Preset::WeatherMonitoring);
        assert_eq!(weather.measurement.encode(), 0b001_001_01);
        assert_eq!(weather.filter.encode(), 0x00);

        let indoor = Config::preset(Preset::IndoorNavigation);
        assert_eq!(indoor.measurement.encode(), 0b010_101_11);
        assert_eq!(indoor.filter.encode(), 0b000_100_00);
    }

    #[test]
    fn builder_setters() {
        let cfg = Config::new()
            .temperature_oversampling(Oversampling::X8)
            .pressure_oversampling(Oversampling::X16)
            .power_mode(PowerMode::Normal)
            .standby_time(StandbyTime::Ms250)
            .iir_filter(Filter::X8)
            .spi3w_enable(true);
        assert_eq!(cfg.measurement.encode(), 0b100_101_11);
        assert_eq!(cfg.filter.encode(), 0b011_011_01);
    }

    #[test]
    fn measurement_time() {
        let ulp = MeasurementConfig::new(Oversampling::X1, Oversampling::X1, PowerMode::Forced);
        assert_eq!(ulp.max_measurement_time_us(), 6425);

        let uhr = MeasurementConfig::new(Oversampling::X2, Oversampling::X16, PowerMode::Forced);
        assert_eq!(uhr.max_measurement_time_us(), 1250 + 4600 + 36800 + 575);

        let temp_only =
            MeasurementConfig::new(Oversampling::X1, Oversampling::Skip, PowerMode::Forced);
        assert_eq!(temp_only.max_measurement_time_us(), 3550);
    }

    #[test]
    fn standby_durations() {
        assert_eq!(StandbyTime::Ms0_5.micros(), 500);
        assert_eq!(StandbyTime::Ms4000.micros(), 4_000_000);
        assert_eq!(StandbyTime::from_bits(StandbyTime::Ms62_5.bits()), StandbyTime::Ms62_5);
    }
}
