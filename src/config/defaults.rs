//! Configuration default values
//!
//! This module contains all the default values for configuration options,
//! making them easily changeable in one central location.

use std::time::Duration;

// Source defaults
pub const DEFAULT_INI_URL: &str =
    "http://user-agent-string.info/rpc/get_data.php?key=free&format=ini";
pub const DEFAULT_INFO_URL: &str = "http://user-agent-string.info";
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// Result cache defaults
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

// Storage defaults
pub const DEFAULT_CACHE_DIR: &str = "./data";
pub const DEFAULT_CACHE_FILE_NAME: &str = "uasparser2_cache";
