pub mod hash;

/// Returns the type name without its module path.
///
/// Generic arguments are kept as-is, `a::b::Foo<c::Bar>` becomes `Foo<c::Bar>`.
pub(crate) fn short_type_name(path: &'static str) -> &'static str {
    let end = path.find('<').unwrap_or(path.len());
    match path[..end].rfind("::") {
        Some(pos) => &path[pos + 2..],
        None => path,
    }
}

/// Describes the kind of a JSON value for error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::short_type_name;

    #[test]
    fn short_names() {
        assert_eq!(short_type_name("a::b::Foo"), "Foo");
        assert_eq!(short_type_name("Foo"), "Foo");
        assert_eq!(short_type_name("a::Foo<c::Bar>"), "Foo<c::Bar>");
    }
}
