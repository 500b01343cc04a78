//! `Preauthentication` configuration: a `Default` impl for the no-file case,
//! `serdeconv::from_toml_file`/`from_toml_str` otherwise.

use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PreauthConfig {
    #[serde(default)]
    pub enable_preauthentication: bool,
    #[serde(default = "default_scan_delay_authenticated_secs")]
    pub scan_delay_authenticated_secs: i64,
    #[serde(default = "default_scan_delay_roam_secs")]
    pub scan_delay_roam_secs: i64,
    #[serde(default = "default_scan_period_secs")]
    pub scan_period_secs: i64,
    #[serde(default = "default_number_of_scans")]
    pub number_of_scans: u32,
}

fn default_scan_delay_authenticated_secs() -> i64 {
    10
}

fn default_scan_delay_roam_secs() -> i64 {
    10
}

fn default_scan_period_secs() -> i64 {
    -1
}

fn default_number_of_scans() -> u32 {
    1
}

impl Default for PreauthConfig {
    fn default() -> PreauthConfig {
        PreauthConfig {
            enable_preauthentication: false,
            scan_delay_authenticated_secs: default_scan_delay_authenticated_secs(),
            scan_delay_roam_secs: default_scan_delay_roam_secs(),
            scan_period_secs: default_scan_period_secs(),
            number_of_scans: default_number_of_scans(),
        }
    }
}

impl PreauthConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<PreauthConfig, serdeconv::Error> {
        serdeconv::from_toml_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let cfg = PreauthConfig::default();
        assert!(!cfg.enable_preauthentication);
        assert_eq!(cfg.scan_delay_authenticated_secs, 10);
        assert_eq!(cfg.scan_delay_roam_secs, 10);
        assert_eq!(cfg.scan_period_secs, -1);
        assert_eq!(cfg.number_of_scans, 1);
    }

    #[test]
    fn roundtrips_through_toml() {
        let cfg = PreauthConfig {
            enable_preauthentication: true,
            scan_delay_authenticated_secs: 5,
            scan_delay_roam_secs: 5,
            scan_period_secs: 30,
            number_of_scans: 3,
        };
        let toml = serdeconv::to_toml_string(&cfg).expect("serialize");
        let parsed: PreauthConfig = serdeconv::from_toml_str(&toml).expect("parse");
        assert_eq!(cfg, parsed);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed: PreauthConfig =
            serdeconv::from_toml_str("EnablePreauthentication = true\n").expect("parse");
        assert!(parsed.enable_preauthentication);
        assert_eq!(parsed.scan_period_secs, -1);
    }
}
