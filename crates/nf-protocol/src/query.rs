//! Query parameter handling for the declared caller identity

/// Query parameter carrying the agent's declared host name
pub const HOST_PARAM: &str = "host";

/// Extract the declared host from decoded query pairs.
///
/// Returns a value only when the `host` parameter appears exactly once
/// with a non-empty value. Repeated `host` parameters have no defined
/// precedence, so they are treated the same as a missing one and the
/// caller falls back to the sender address.
pub fn declared_host<K, V>(pairs: &[(K, V)]) -> Option<&str>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut values = pairs
        .iter()
        .filter(|(key, _)| key.as_ref() == HOST_PARAM)
        .map(|(_, value)| value.as_ref());

    let first = values.next()?;
    if values.next().is_some() || first.is_empty() {
        return None;
    }
    Some(first)
}
