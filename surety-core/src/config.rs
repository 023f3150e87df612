//! Configuration for the ledger
//!
//! Every protocol constant is configuration: admission limit, funding
//! minimum, premium cap, payout multiplier, oracle fee, quorum size,
//! and index space. Defaults match the reference deployment.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Airlines admitted without a vote before threshold voting starts
    pub direct_admission_limit: usize,

    /// Minimum escrow an airline must fund to become Funded
    pub min_airline_funding: Decimal,

    /// Maximum insurance premium per policy
    pub max_premium: Decimal,

    /// Credit multiplier applied to the premium at settlement
    pub payout_multiplier: Decimal,

    /// Oracle configuration
    pub oracle: OracleConfig,

    /// Actor mailbox capacity (commands in flight)
    pub mailbox_capacity: usize,

    /// Notification bus capacity per subscriber
    pub event_capacity: usize,

    /// First airline, seeded Registered at ledger construction
    pub genesis_airline: GenesisAirline,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            direct_admission_limit: 4,
            min_airline_funding: Decimal::from(10),
            max_premium: Decimal::ONE,
            payout_multiplier: Decimal::new(15, 1), // 1.5x
            oracle: OracleConfig::default(),
            mailbox_capacity: 256,
            event_capacity: 1024,
            genesis_airline: GenesisAirline::default(),
        }
    }
}

/// Oracle protocol configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Registration fee
    pub registration_fee: Decimal,

    /// Matching reports required to resolve a flight status
    pub quorum: usize,

    /// Index space `[0, N)` requests and oracles draw from
    pub index_space: u8,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            registration_fee: Decimal::ONE,
            quorum: 3,
            index_space: 10,
        }
    }
}

/// First airline seeded at construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenesisAirline {
    /// Display name
    pub name: String,

    /// Address
    pub address: String,
}

impl Default for GenesisAirline {
    fn default() -> Self {
        Self {
            name: "Aurora Airways".to_string(),
            address: "0xA1".to_string(),
        }
    }
}

impl Config {
    /// Load from TOML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load defaults with environment variable overrides
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(quorum) = std::env::var("SURETY_ORACLE_QUORUM") {
            config.oracle.quorum = quorum
                .parse()
                .map_err(|_| crate::Error::Config(format!("Invalid quorum: {}", quorum)))?;
        }

        if let Ok(funding) = std::env::var("SURETY_MIN_FUNDING") {
            config.min_airline_funding = funding
                .parse()
                .map_err(|_| crate::Error::Config(format!("Invalid funding minimum: {}", funding)))?;
        }

        if let Ok(addr) = std::env::var("SURETY_GENESIS_AIRLINE") {
            config.genesis_airline.address = addr;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency
    pub fn validate(&self) -> crate::Result<()> {
        if self.oracle.quorum == 0 {
            return Err(crate::Error::Config("Oracle quorum must be at least 1".to_string()));
        }
        if self.oracle.index_space < 3 {
            // Each oracle needs 3 distinct indices
            return Err(crate::Error::Config(
                "Oracle index space must be at least 3".to_string(),
            ));
        }
        if self.max_premium <= Decimal::ZERO {
            return Err(crate::Error::Config("Max premium must be positive".to_string()));
        }
        if self.payout_multiplier <= Decimal::ZERO {
            return Err(crate::Error::Config("Payout multiplier must be positive".to_string()));
        }
        if self.mailbox_capacity == 0 || self.event_capacity == 0 {
            return Err(crate::Error::Config("Channel capacities must be non-zero".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.direct_admission_limit, 4);
        assert_eq!(config.min_airline_funding, Decimal::from(10));
        assert_eq!(config.oracle.quorum, 3);
        assert_eq!(config.oracle.index_space, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_quorum() {
        let mut config = Config::default();
        config.oracle.quorum = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_tiny_index_space() {
        let mut config = Config::default();
        config.oracle.index_space = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("surety.toml");
        std::fs::write(
            &path,
            r#"
direct_admission_limit = 4
min_airline_funding = "10"
max_premium = "1"
payout_multiplier = "1.5"
mailbox_capacity = 64
event_capacity = 128

[oracle]
registration_fee = "1"
quorum = 5
index_space = 10

[genesis_airline]
name = "Aurora Airways"
address = "0xA1"
"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.oracle.quorum, 5);
        assert_eq!(config.mailbox_capacity, 64);
        assert_eq!(config.payout_multiplier, Decimal::new(15, 1));
    }
}
