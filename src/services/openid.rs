// SPDX-License-Identifier: MIT

//! Parsing and validation of Steam OpenID callback responses.
//!
//! Handles:
//! - Extracting query parameters from the redirect URI
//! - Structural validation of the OpenID response
//! - Steam ID extraction from `openid.claimed_id`
//! - Cancellation / error detection

use crate::error::{AppError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use url::Url;

/// Primary claimed_id pattern: the Steam community OpenID identity URL.
fn claimed_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:https?://)?(?:www\.)?steamcommunity\.com/openid/id/(\d+)")
            .expect("claimed_id pattern is valid")
    })
}

/// Fallback pattern: trailing digits, with an optional trailing slash.
fn trailing_digits_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+)/?$").expect("trailing digits pattern is valid"))
}

/// Trailing-digits match on a claimed_id, used by the verifier where the
/// full community-URL pattern is not required.
pub(crate) fn trailing_digits(claimed_id: &str) -> Option<&str> {
    trailing_digits_pattern()
        .captures(claimed_id)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// OpenID callback parameters with case-insensitive keys.
///
/// Transient: lives only within one authentication attempt.
#[derive(Debug, Clone, Default)]
pub struct CallbackParams {
    params: HashMap<String, String>,
}

impl CallbackParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from key/value pairs; empty keys and empty values are dropped.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.insert(key.as_ref(), value.into());
        }
        params
    }

    pub fn insert(&mut self, key: &str, value: String) {
        if !key.is_empty() && !value.is_empty() {
            self.params.insert(key.to_ascii_lowercase(), value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(&key.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(&key.to_ascii_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Iterate over all parameters, e.g. to re-submit them for verification.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Parse the redirect URI's query string into callback parameters.
///
/// Values are URL-decoded; empty-valued parameters are dropped.
pub fn parse_callback(redirect_uri: &str) -> Result<CallbackParams> {
    let url = Url::parse(redirect_uri)
        .map_err(|e| AppError::MalformedUri(format!("{}: {}", redirect_uri, e)))?;

    let params = CallbackParams::from_pairs(
        url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())),
    );

    tracing::debug!(count = params.len(), "Parsed callback parameters");
    Ok(params)
}

/// Structural check: all required OpenID fields present and mode is `id_res`.
pub fn is_valid_openid_response(params: &CallbackParams) -> bool {
    const REQUIRED: [&str; 3] = ["openid.ns", "openid.mode", "openid.claimed_id"];

    for required in REQUIRED {
        if !params.contains(required) {
            tracing::debug!(parameter = required, "Missing required OpenID parameter");
            return false;
        }
    }

    match params.get("openid.mode") {
        Some("id_res") => true,
        mode => {
            tracing::debug!(?mode, "Unexpected OpenID mode");
            false
        }
    }
}

/// True when the response indicates the user cancelled or Steam errored out.
pub fn was_cancelled(params: &CallbackParams) -> bool {
    matches!(params.get("openid.mode"), Some("cancel") | Some("error"))
}

/// Extract the SteamID64 from `openid.claimed_id`.
///
/// Two ordered match attempts: the full Steam community identity URL first,
/// then a trailing-digits fallback for nonstandard claimed_id formats.
pub fn extract_steam_id(params: &CallbackParams) -> Result<String> {
    if params.is_empty() {
        return Err(AppError::Format(
            "response parameters are empty".to_string(),
        ));
    }

    let claimed_id = params.get("openid.claimed_id").ok_or_else(|| {
        AppError::Format("missing 'openid.claimed_id' in authentication response".to_string())
    })?;

    let captured = claimed_id_pattern()
        .captures(claimed_id)
        .or_else(|| trailing_digits_pattern().captures(claimed_id))
        .and_then(|c| c.get(1))
        .ok_or_else(|| {
            AppError::Format(format!(
                "could not extract Steam ID from claimed_id: {}",
                claimed_id
            ))
        })?;

    let steam_id = captured.as_str();
    if !all_digits(steam_id) {
        return Err(AppError::Format("extracted Steam ID is invalid".to_string()));
    }

    tracing::debug!(steam_id, "Extracted Steam ID from claimed_id");
    Ok(steam_id.to_string())
}

/// Human-readable error message for a failed or cancelled response.
pub fn error_message(params: &CallbackParams) -> String {
    if let Some(error) = params.get("openid.error") {
        return format!("Steam authentication error: {}", error);
    }
    if let Some(error) = params.get("error") {
        return format!("Authentication error: {}", error);
    }
    "Authentication failed. Please try again.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_res_params(claimed_id: &str) -> CallbackParams {
        CallbackParams::from_pairs([
            ("openid.ns", "http://specs.openid.net/auth/2.0"),
            ("openid.mode", "id_res"),
            ("openid.claimed_id", claimed_id),
        ])
    }

    #[test]
    fn test_parse_callback_decodes_query() {
        let params = parse_callback(
            "steamshelf://auth/callback?openid.mode=id_res&openid.claimed_id=https%3A%2F%2Fsteamcommunity.com%2Fopenid%2Fid%2F76561198000000000",
        )
        .unwrap();

        assert_eq!(params.get("openid.mode"), Some("id_res"));
        assert_eq!(
            params.get("openid.claimed_id"),
            Some("https://steamcommunity.com/openid/id/76561198000000000")
        );
    }

    #[test]
    fn test_parse_callback_rejects_garbage() {
        let err = parse_callback("not a uri").unwrap_err();
        assert!(matches!(err, AppError::MalformedUri(_)));
    }

    #[test]
    fn test_parse_callback_drops_empty_values() {
        let params =
            parse_callback("steamshelf://auth/callback?openid.mode=id_res&empty=").unwrap();
        assert_eq!(params.len(), 1);
        assert!(!params.contains("empty"));
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let params = CallbackParams::from_pairs([("OpenID.Mode", "id_res")]);
        assert_eq!(params.get("openid.mode"), Some("id_res"));
        assert_eq!(params.get("OPENID.MODE"), Some("id_res"));
    }

    #[test]
    fn test_valid_openid_response() {
        let params = id_res_params("https://steamcommunity.com/openid/id/76561198000000000");
        assert!(is_valid_openid_response(&params));
    }

    #[test]
    fn test_missing_required_field_is_invalid() {
        for missing in ["openid.ns", "openid.mode", "openid.claimed_id"] {
            let params = CallbackParams::from_pairs(
                [
                    ("openid.ns", "http://specs.openid.net/auth/2.0"),
                    ("openid.mode", "id_res"),
                    ("openid.claimed_id", "https://steamcommunity.com/openid/id/1"),
                ]
                .into_iter()
                .filter(|(k, _)| *k != missing),
            );
            assert!(!is_valid_openid_response(&params), "missing {}", missing);
        }
    }

    #[test]
    fn test_wrong_mode_is_invalid() {
        let mut params = id_res_params("https://steamcommunity.com/openid/id/1");
        params.insert("openid.mode", "checkid_setup".to_string());
        assert!(!is_valid_openid_response(&params));
    }

    #[test]
    fn test_was_cancelled() {
        for (mode, expected) in [("cancel", true), ("error", true), ("id_res", false)] {
            let params = CallbackParams::from_pairs([("openid.mode", mode)]);
            assert_eq!(was_cancelled(&params), expected, "mode {}", mode);
        }
        assert!(!was_cancelled(&CallbackParams::new()));
    }

    #[test]
    fn test_extract_steam_id_from_community_url() {
        let params = id_res_params("https://steamcommunity.com/openid/id/76561198000000000");
        assert_eq!(extract_steam_id(&params).unwrap(), "76561198000000000");
    }

    #[test]
    fn test_extract_steam_id_case_insensitive_host() {
        let params = id_res_params("HTTPS://SteamCommunity.COM/openid/id/76561198012345678");
        assert_eq!(extract_steam_id(&params).unwrap(), "76561198012345678");
    }

    #[test]
    fn test_extract_steam_id_trailing_digits_fallback() {
        let params = id_res_params("https://example.com/identity/76561198087654321/");
        assert_eq!(extract_steam_id(&params).unwrap(), "76561198087654321");
    }

    #[test]
    fn test_extract_steam_id_no_digits_fails() {
        let params = id_res_params("https://steamcommunity.com/openid/id/not-a-number");
        assert!(matches!(
            extract_steam_id(&params).unwrap_err(),
            AppError::Format(_)
        ));
    }

    #[test]
    fn test_extract_steam_id_missing_claimed_id_fails() {
        let params = CallbackParams::from_pairs([("openid.mode", "id_res")]);
        assert!(matches!(
            extract_steam_id(&params).unwrap_err(),
            AppError::Format(_)
        ));
    }

    #[test]
    fn test_error_message_precedence() {
        let params = CallbackParams::from_pairs([
            ("openid.error", "access_denied"),
            ("error", "generic"),
        ]);
        assert_eq!(
            error_message(&params),
            "Steam authentication error: access_denied"
        );

        let params = CallbackParams::from_pairs([("error", "generic")]);
        assert_eq!(error_message(&params), "Authentication error: generic");

        assert_eq!(
            error_message(&CallbackParams::new()),
            "Authentication failed. Please try again."
        );
    }
}
