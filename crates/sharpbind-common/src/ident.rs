//! Identifier helpers shared by the declaration model and the exporters.

use smol_str::SmolStr;

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Turn an arbitrary C++ spelling into a valid identifier.
///
/// Every character that cannot appear in an identifier becomes `_`, runs of
/// `_` are collapsed and leading/trailing underscores are dropped:
/// `std::vector<int>` becomes `std_vector_int`.
pub fn make_id(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|ch| if is_ident_char(ch) { ch } else { '_' })
        .collect();

    replaced
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Replace every non-identifier character of a single scope segment with `_`.
///
/// Unlike [`make_id`] this keeps the length of the segment, so
/// `basic_string<char>` becomes `basic_string_char_`.
pub fn clean_segment(segment: &str) -> String {
    segment
        .chars()
        .map(|ch| if is_ident_char(ch) { ch } else { '_' })
        .collect()
}

/// Split a qualified name on `::`, ignoring separators inside template
/// argument lists.
///
/// `std::map<a::b, c>::iterator` yields `["std", "map<a::b, c>", "iterator"]`.
pub fn split_scope(path: &str) -> Vec<SmolStr> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;
    let mut chars = path.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '<' | '(' => {
                depth += 1;
                current.push(ch);
            }
            '>' | ')' => {
                depth -= 1;
                current.push(ch);
            }
            ':' if depth == 0 && chars.peek() == Some(&':') => {
                chars.next();
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    result.push(SmolStr::new(trimmed));
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        result.push(SmolStr::new(trimmed));
    }

    result
}

/// Join scope segments with `::`.
pub fn join_scope<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join("::")
}

/// Parse comma-separated template arguments, respecting nested templates.
///
/// # Example
/// ```
/// use sharpbind_common::split_template_args;
/// let args = split_template_args("int, std::vector<int>, double");
/// assert_eq!(args, vec!["int", "std::vector<int>", "double"]);
/// ```
pub fn split_template_args(args: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut depth = 0;

    for ch in args.chars() {
        match ch {
            '<' => {
                depth += 1;
                current.push(ch);
            }
            '>' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                let trimmed = current.trim().to_string();
                if !trimmed.is_empty() {
                    result.push(trimmed);
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    let trimmed = current.trim().to_string();
    if !trimmed.is_empty() {
        result.push(trimmed);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_id_collapses_separators() {
        assert_eq!(make_id("std::vector<int>"), "std_vector_int");
        assert_eq!(make_id("ns::Foo< a, b >"), "ns_Foo_a_b");
        assert_eq!(make_id("__internal"), "internal");
        assert_eq!(make_id(""), "");
    }

    #[test]
    fn test_clean_segment_keeps_length() {
        insta::assert_snapshot!(clean_segment("basic_string<char>"), @"basic_string_char_");
        assert_eq!(clean_segment("plain"), "plain");
    }

    #[test]
    fn test_split_scope_respects_templates() {
        assert_eq!(
            split_scope("std::map<a::b, c>::iterator"),
            vec!["std", "map<a::b, c>", "iterator"]
        );
        assert_eq!(split_scope("Foo"), vec!["Foo"]);
        assert!(split_scope("").is_empty());
        assert_eq!(split_scope("::global"), vec!["global"]);
    }

    #[test]
    fn test_split_scope_function_pointer_spelling() {
        assert_eq!(split_scope("void (*)(a::b)"), vec!["void (*)(a::b)"]);
    }

    #[test]
    fn test_join_scope() {
        assert_eq!(join_scope(&["a", "b", "c"]), "a::b::c");
        assert_eq!(join_scope::<&str>(&[]), "");
    }

    #[test]
    fn test_split_template_args_nested() {
        assert_eq!(
            split_template_args("std::pair<int, int>, double"),
            vec!["std::pair<int, int>", "double"]
        );
        assert!(split_template_args("  ").is_empty());
    }
}
