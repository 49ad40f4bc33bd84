//! Human-readable type names.

/// Strip module paths from a `std::any::type_name` string.
///
/// `"alloc::vec::Vec<my_crate::Foo>"` becomes `"Vec<Foo>"`. Used for
/// connector names, component type labels and signature messages.
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut rest = full;
    while let Some(pos) = rest.find("::") {
        out.push_str(&rest[..pos]);
        while out.ends_with(|c: char| c.is_alphanumeric() || c == '_') {
            out.pop();
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::short_type_name;

    #[test]
    fn strips_paths() {
        assert_eq!(short_type_name("alloc::string::String"), "String");
        assert_eq!(short_type_name("i32"), "i32");
    }

    #[test]
    fn strips_paths_inside_generics() {
        assert_eq!(
            short_type_name("montage::connector::Use<dyn my_app::IntProvider>"),
            "Use<dyn IntProvider>"
        );
        assert_eq!(
            short_type_name("(i32, alloc::string::String)"),
            "(i32, String)"
        );
    }
}
