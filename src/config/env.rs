//! `${ENV_VAR}` reference resolution
//!
//! Credentials and regions in the routing document may point at environment
//! variables. References are resolved when a value is used, not when the
//! document is loaded, so rotating a secret does not require a reload.

use secrecy::SecretString;

/// Resolve a raw configuration value.
///
/// `${NAME}` is replaced by the value of the `NAME` environment variable;
/// anything else is returned as-is. Returns `None` when the result is empty
/// or the variable is unset.
pub fn resolve_env_reference(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let resolved = match env_reference_name(trimmed) {
        Some(name) => std::env::var(name).ok()?,
        None => trimmed.to_string(),
    };

    if resolved.trim().is_empty() {
        None
    } else {
        Some(resolved)
    }
}

/// Same as [`resolve_env_reference`], wrapped for credentials
pub fn resolve_secret(raw: Option<&str>) -> Option<SecretString> {
    raw.and_then(resolve_env_reference)
        .map(SecretString::from)
}

/// Name of the referenced variable when `value` has the form `${NAME}`
pub fn env_reference_name(value: &str) -> Option<&str> {
    let name = value.strip_prefix("${")?.strip_suffix('}')?;
    if name.is_empty() { None } else { Some(name) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_literal_value_passes_through() {
        assert_eq!(
            resolve_env_reference("sk-literal"),
            Some("sk-literal".to_string())
        );
        assert_eq!(resolve_env_reference("   "), None);
    }

    #[test]
    fn test_env_reference_resolved() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("VOXROUTE_TEST_ENV_RESOLVE_KEY", "secret-123");
        }
        assert_eq!(
            resolve_env_reference("${VOXROUTE_TEST_ENV_RESOLVE_KEY}"),
            Some("secret-123".to_string())
        );
        let secret = resolve_secret(Some("${VOXROUTE_TEST_ENV_RESOLVE_KEY}")).unwrap();
        assert_eq!(secret.expose_secret(), "secret-123");
        unsafe {
            std::env::remove_var("VOXROUTE_TEST_ENV_RESOLVE_KEY");
        }
    }

    #[test]
    fn test_unset_reference_is_unresolvable() {
        assert_eq!(
            resolve_env_reference("${VOXROUTE_TEST_ENV_NEVER_SET}"),
            None
        );
        assert!(resolve_secret(None).is_none());
    }

    #[test]
    fn test_reference_name_parsing() {
        assert_eq!(env_reference_name("${OPENAI_KEY}"), Some("OPENAI_KEY"));
        assert_eq!(env_reference_name("${}"), None);
        assert_eq!(env_reference_name("$OPENAI_KEY"), None);
    }
}
