use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use std::collections::BTreeMap;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Every section and key is optional; missing values take their defaults.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use link_harvester::config::load_config;
///
/// let config = load_config(Path::new("harvester.toml")).unwrap();
/// println!("Max depth: {}", config.crawl.max_depth);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Parses a custom header list of the form `Name: Value;;Name2: Value2`
///
/// Entries without a colon are ignored; names and values are trimmed. Only
/// the first colon separates name from value, so values may contain colons.
///
/// # Example
///
/// ```
/// use link_harvester::config::parse_header_list;
///
/// let headers = parse_header_list("User-Agent: Bot/1.0;;Accept: text/html");
/// assert_eq!(headers.get("Accept").map(String::as_str), Some("text/html"));
/// ```
pub fn parse_header_list(input: &str) -> BTreeMap<String, String> {
    input
        .split(";;")
        .filter_map(|entry| entry.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}
