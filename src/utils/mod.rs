/// TOML configuration (`folio.toml`) with defaults and validation.
pub mod toml_config;
