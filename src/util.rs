use std::borrow::Cow;

const STACK_UNITS: [(u64, &str, &str); 3] = [
    (64 * 27 * 27, "chest", " of shulker boxes"),
    (64 * 27, "chest", ""),
    (64, "stack", ""),
];

pub fn format_stack_count(count: u64) -> String {
    let mut remaining = count;
    let mut parts = Vec::new();

    for (size, name, suffix) in STACK_UNITS {
        let units = remaining / size;
        remaining %= size;
        if units > 0 {
            let plural = if units > 1 { "s" } else { "" };
            parts.push(format!("{units} {name}{plural}{suffix}"));
        }
    }

    if remaining > 0 || parts.is_empty() {
        parts.push(remaining.to_string());
    }

    parts.join(" and ")
}

/// Drops the namespace from ids such as `minecraft:stick`. Tag ids keep
/// their leading `#`.
pub fn short_name(id: &str) -> Cow<'_, str> {
    let (marker, bare) = match id.strip_prefix('#') {
        Some(rest) => ("#", rest),
        None => ("", id),
    };

    match bare.split_once(':') {
        Some((_, name)) if marker.is_empty() => Cow::Borrowed(name),
        Some((_, name)) => Cow::Owned(format!("{marker}{name}")),
        None => Cow::Borrowed(id),
    }
}
