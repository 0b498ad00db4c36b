//! URL utilities for logging and error reporting

use regex::Regex;
use url::Url;

/// URL utilities for consistent URL handling
pub struct UrlUtils;

impl UrlUtils {
    /// Mask credentials before a URL is logged or put into an error.
    ///
    /// Covers `user:pass@host` authority credentials and the usual secret
    /// query parameters, including the `key` parameter the signature
    /// download URL carries.
    ///
    /// ```rust
    /// use uas_classifier::utils::url::UrlUtils;
    ///
    /// assert_eq!(
    ///     UrlUtils::obfuscate_credentials("http://example.com/rpc?key=secret&format=ini"),
    ///     "http://example.com/rpc?key=****&format=ini"
    /// );
    /// ```
    pub fn obfuscate_credentials(url: &str) -> String {
        let mut obfuscated = url.to_string();

        if let Ok(parsed) = Url::parse(url)
            && (!parsed.username().is_empty() || parsed.password().is_some())
        {
            let mut new_url = parsed.clone();
            let _ = new_url.set_username("****");
            let _ = new_url.set_password(Some("****"));
            obfuscated = new_url.to_string();
        }

        let sensitive_params = [
            "key", "api_key", "token", "username", "password", "user", "pass", "pwd", "passwd",
        ];

        for param in &sensitive_params {
            let pattern = format!(r"(?i)([?&]{}=)[^&]*", regex::escape(param));
            if let Ok(re) = Regex::new(&pattern) {
                obfuscated = re.replace_all(&obfuscated, "${1}****").to_string();
            }
        }

        obfuscated
    }
}
