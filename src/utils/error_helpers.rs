//! src/utils/error_helpers.rs

/// Writes `e` followed by every error in its `source` chain.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}

/// Message of an error, or `fallback` when the error renders to nothing.
pub fn message_or(e: &impl std::fmt::Display, fallback: &str) -> String {
    let message = e.to_string();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
