/// Renders an error followed by every error in its `source()` chain, one per paragraph.
///
/// `Debug` for the handler errors delegates here, so the full chain ends up in the logs while
/// `Display` (what the caller sees) stays a single line.
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
