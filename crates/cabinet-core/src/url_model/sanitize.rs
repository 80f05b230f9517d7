//! Filesystem-safe file names.

/// Replaces NUL, `/`, `\` and control characters with `_` and trims
/// surrounding whitespace. Everything else, underscores included, is kept
/// as is so derived names stay recognisable. Names over 255 bytes are
/// shortened in the stem so the extension survives.
pub fn sanitize_filename(name: &str) -> String {
    const NAME_MAX: usize = 255;
    const MAX_EXT: usize = 16;

    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '\0' || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let trimmed = replaced.trim();

    if trimmed.len() <= NAME_MAX {
        return trimmed.to_string();
    }

    // Over the limit: shorten the stem and keep a short extension intact.
    let ext = match trimmed.rfind('.') {
        Some(dot) if dot > 0 && trimmed.len() - dot <= MAX_EXT => &trimmed[dot..],
        _ => "",
    };
    let stem = &trimmed[..trimmed.len() - ext.len()];
    let mut take = NAME_MAX - ext.len();
    while take > 0 && !stem.is_char_boundary(take) {
        take -= 1;
    }
    format!("{}{}", &stem[..take], ext)
}
