pub mod toml_config;

pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
pub use cli_args::CliConfig;

#[cfg(feature = "cli")]
mod cli_args {
    use super::TomlConfig;
    use crate::domain::model::Address;
    use crate::utils::error::Result;
    use crate::utils::validation::{truncate_chars, Validate, MAX_MUNICIPALITY_NAME_CHARS, MAX_TEXT_CHARS};
    use clap::Parser;
    use std::path::PathBuf;

    #[derive(Debug, Clone, Parser)]
    #[command(name = "hazard-risk")]
    #[command(about = "Natural hazard risk assessment for a Norwegian address")]
    pub struct CliConfig {
        #[arg(long, allow_negative_numbers = true, help = "Latitude (WGS84)")]
        pub lat: f64,

        #[arg(long, allow_negative_numbers = true, help = "Longitude (WGS84)")]
        pub lon: f64,

        #[arg(long, help = "Four-digit municipality number")]
        pub knr: String,

        #[arg(long, default_value = "", help = "Address text")]
        pub text: String,

        #[arg(long, default_value = "", help = "Municipality name")]
        pub kommune: String,

        #[arg(long, default_value = "")]
        pub postnummer: String,

        #[arg(long, default_value = "")]
        pub poststed: String,

        #[arg(long, help = "TOML config file")]
        pub config: Option<PathBuf>,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON")]
        pub json_logs: bool,
    }

    impl CliConfig {
        /// Labels are truncated; coordinates and municipality number are passed as given.
        pub fn to_address(&self) -> Address {
            Address {
                text: truncate_chars(&self.text, MAX_TEXT_CHARS),
                latitude: self.lat,
                longitude: self.lon,
                kommunenummer: self.knr.clone(),
                kommunenavn: truncate_chars(&self.kommune, MAX_MUNICIPALITY_NAME_CHARS),
                postnummer: self.postnummer.clone(),
                poststed: self.poststed.clone(),
            }
        }

        /// The file given with `--config`, or the built-in defaults.
        pub fn load_config(&self) -> Result<TomlConfig> {
            let config = match &self.config {
                Some(path) => {
                    tracing::info!("Loading config from {}", path.display());
                    TomlConfig::from_file(path)?
                }
                None => TomlConfig::default(),
            };
            config.validate()?;
            Ok(config)
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            self.to_address().validate()
        }
    }

}
