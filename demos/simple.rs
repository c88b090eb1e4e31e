use embedded_hal::delay::DelayNs;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
use uf_bmp280::{Address, Config, Preset, Register, BMP280};

const ADDR: u8 = 0x76;

struct NoopDelay;

impl DelayNs for NoopDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

fn main() {
    let config = Config::preset(Preset::WeatherMonitoring);
    let expectations = [
        I2cTransaction::write(ADDR, vec![Register::RESET.addr(), 0xB6]),
        I2cTransaction::write_read(ADDR, vec![Register::STATUS.addr()], vec![0x00]),
        I2cTransaction::write_read(ADDR, vec![Register::ID.addr()], vec![0x58]),
        I2cTransaction::write(ADDR, vec![Register::CONFIG.addr(), 0x00]),
        I2cTransaction::write(ADDR, vec![Register::CTRL_MEAS.addr(), 0x25]),
        I2cTransaction::write_read(
            ADDR,
            vec![Register::CALIB_00.addr()],
            vec![
                112, 107, 67, 103, 24, 252, 125, 142, 67, 214, 208, 11, 39, 11, 140, 0, 249, 255,
                140, 60, 248, 198, 112, 23,
            ],
        ),
        I2cTransaction::write(ADDR, vec![Register::CTRL_MEAS.addr(), 0x25]),
        I2cTransaction::write_read(ADDR, vec![Register::STATUS.addr()], vec![0x00]),
        I2cTransaction::write_read(
            ADDR,
            vec![Register::PRESS_MSB.addr()],
            vec![0x65, 0x5A, 0xC0, 0x7E, 0xED, 0x00],
        ),
    ];

    let mut i2c = I2cMock::new(&expectations);
    let bmp = BMP280::new_i2c(i2c.clone(), Address::SdoGnd, &config);
    let mut delay = NoopDelay;
    let mut bmp = bmp.init_and_calibrate(&mut delay).unwrap();
    let measurement = bmp.measure_forced(&mut delay).unwrap();
    i2c.done();
    println!(
        "Done: {} °C, {} hPa",
        measurement.temperature_celsius(),
        measurement.pressure_hpa()
    )
}
