//! Two-channel SPI ADC sampling and voltage conversion.
//!
//! Supports the MCP3002, MCP3008 and MCP3202 converters. Each model is
//! described by its per-channel command byte sequence (start bit,
//! single-ended mode, channel select, as given in the datasheets) and its
//! bit resolution. A reading transfers the three command bytes and
//! assembles the raw code from the masked tail of the response.

use crate::error::{Error, Result};
use crate::hw::SpiBus;

/// Number of channels sampled.
pub const CHANNEL_COUNT: usize = 2;

/// Wire description of one supported converter model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdcProfile {
    /// Model name as used in the configuration.
    pub name: &'static str,

    /// Command byte sequence per channel.
    pub command_bytes: [[u8; 3]; CHANNEL_COUNT],

    /// Converter bit resolution.
    pub resolution: u32,
}

const PROFILES: &[AdcProfile] = &[
    AdcProfile {
        name: "MCP3002",
        command_bytes: [[0, 104, 0], [0, 120, 0]],
        resolution: 10,
    },
    AdcProfile {
        name: "MCP3008",
        command_bytes: [[1, 128, 0], [1, 144, 0]],
        resolution: 10,
    },
    AdcProfile {
        name: "MCP3202",
        command_bytes: [[1, 160, 0], [1, 224, 0]],
        resolution: 12,
    },
];

impl AdcProfile {
    /// Look up a converter model by name.
    ///
    /// Fails on an unknown model; callers resolve the configured model
    /// before any hardware is opened.
    pub fn by_name(name: &str) -> Result<&'static AdcProfile> {
        PROFILES
            .iter()
            .find(|profile| profile.name == name)
            .ok_or_else(|| Error::UnknownAdcModel(name.to_string()))
    }

    /// Number of distinct output codes.
    pub fn code_count(&self) -> u32 {
        1 << self.resolution
    }

    // The second response byte carries the bits above the low eight; only
    // `resolution - 8` of them are valid.
    fn high_byte_mask(&self) -> u8 {
        ((1u32 << (self.resolution - 8)) - 1) as u8
    }
}

/// ADC channel selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdcChannel {
    Ch0 = 0,
    Ch1 = 1,
}

/// Reads raw codes from the converter and converts them to voltages.
///
/// Owned by the sampling worker while it runs; the bus is never accessed
/// from more than one task.
pub struct VoltageSampler {
    spi: Box<dyn SpiBus>,
    profile: &'static AdcProfile,
    reference_voltage: f64,
    divider_factor: f64,
}

impl VoltageSampler {
    pub fn new(
        spi: Box<dyn SpiBus>,
        profile: &'static AdcProfile,
        reference_voltage: f64,
        divider_factor: f64,
    ) -> Self {
        Self {
            spi,
            profile,
            reference_voltage,
            divider_factor,
        }
    }

    /// Read the raw code of one channel.
    ///
    /// Bus errors are fatal; sampling cannot proceed without the bus, so
    /// there are no retries here.
    pub async fn read_channel(&mut self, channel: AdcChannel) -> Result<u16> {
        let command = self.profile.command_bytes[channel as usize];
        let mut response = [0u8; 3];
        self.spi
            .transfer(&command, &mut response)
            .await
            .map_err(Error::Bus)?;
        Ok((u16::from(response[1] & self.profile.high_byte_mask()) << 8) | u16::from(response[2]))
    }

    /// Convert a raw code to the measured voltage.
    ///
    /// Monotonically non-decreasing in the code; zero maps to 0.0 V.
    pub fn raw_to_voltage(&self, code: u16) -> f64 {
        f64::from(code) * (self.reference_voltage / f64::from(self.profile.code_count()))
            * self.divider_factor
    }

    /// Sample both channels and convert to voltages.
    ///
    /// Channel 0 is read and converted before channel 1 is touched; the
    /// converter shares its sample-and-hold circuitry between channels and
    /// must see strictly sequential access.
    pub async fn sample(&mut self) -> Result<(f64, f64)> {
        let code0 = self.read_channel(AdcChannel::Ch0).await?;
        let v0 = self.raw_to_voltage(code0);
        let code1 = self.read_channel(AdcChannel::Ch1).await?;
        let v1 = self.raw_to_voltage(code1);
        Ok((v0, v1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::mock::{MockSpi, SpiResponse};
    use test_case::test_case;

    fn make_sampler(model: &str) -> (VoltageSampler, MockSpi) {
        let spi = MockSpi::new();
        let handle = MockSpi {
            transfers: spi.transfers.clone(),
            responses: spi.responses.clone(),
        };
        let profile = AdcProfile::by_name(model).unwrap();
        (
            VoltageSampler::new(Box::new(spi), profile, 3.3, 5.0 / 3.0),
            handle,
        )
    }

    #[test_case("MCP3002", [[0, 104, 0], [0, 120, 0]], 10; "mcp3002")]
    #[test_case("MCP3008", [[1, 128, 0], [1, 144, 0]], 10; "mcp3008")]
    #[test_case("MCP3202", [[1, 160, 0], [1, 224, 0]], 12; "mcp3202")]
    fn profile_tables(name: &str, command_bytes: [[u8; 3]; 2], resolution: u32) {
        let profile = AdcProfile::by_name(name).unwrap();
        assert_eq!(profile.command_bytes, command_bytes);
        assert_eq!(profile.resolution, resolution);
    }

    #[test]
    fn unknown_model_fails_fast() {
        let err = AdcProfile::by_name("MCP9999").unwrap_err();
        assert!(matches!(err, Error::UnknownAdcModel(name) if name == "MCP9999"));
    }

    #[test]
    fn voltage_is_monotonic_over_all_codes() {
        let (sampler, _spi) = make_sampler("MCP3202");
        let mut previous = -1.0;
        for code in 0..sampler.profile.code_count() {
            let volts = sampler.raw_to_voltage(code as u16);
            assert!(volts >= previous, "code {code} decreased");
            previous = volts;
        }
    }

    #[test]
    fn voltage_endpoints() {
        let (sampler, _spi) = make_sampler("MCP3002");
        assert_eq!(sampler.raw_to_voltage(0), 0.0);

        let top = sampler.profile.code_count() - 1;
        let expected = 3.3 * (5.0 / 3.0) * f64::from(top) / f64::from(sampler.profile.code_count());
        assert!((sampler.raw_to_voltage(top as u16) - expected).abs() < 1e-9);
    }

    #[test]
    fn mid_scale_code_on_ten_bits() {
        // 512 of 1024 codes at 3.3 V reference through a 5/3 divider.
        let (sampler, _spi) = make_sampler("MCP3002");
        assert!((sampler.raw_to_voltage(512) - 2.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn response_tail_is_masked_to_resolution() {
        // 10-bit models keep two bits of the second byte, 12-bit models four.
        let (mut sampler, spi) = make_sampler("MCP3002");
        spi.responses
            .lock()
            .unwrap()
            .push_back(SpiResponse::Bytes([0, 0xff, 0xaa]));
        assert_eq!(sampler.read_channel(AdcChannel::Ch0).await.unwrap(), 0x3aa);

        let (mut sampler, spi) = make_sampler("MCP3202");
        spi.responses
            .lock()
            .unwrap()
            .push_back(SpiResponse::Bytes([0, 0xff, 0xaa]));
        assert_eq!(sampler.read_channel(AdcChannel::Ch0).await.unwrap(), 0xfaa);
    }

    #[tokio::test]
    async fn sample_reads_channel_zero_first() {
        let (mut sampler, spi) = make_sampler("MCP3002");
        sampler.sample().await.unwrap();
        let transfers = spi.transfers.lock().unwrap();
        assert_eq!(transfers.as_slice(), &[vec![0, 104, 0], vec![0, 120, 0]]);
    }

    #[tokio::test]
    async fn bus_error_propagates() {
        let (mut sampler, spi) = make_sampler("MCP3002");
        spi.responses.lock().unwrap().push_back(SpiResponse::Error);
        let err = sampler.sample().await.unwrap_err();
        assert!(matches!(err, Error::Bus(_)));
    }
}
