// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Name normalizer applied to every type name read from the type-info
//! chunk when the *needsTypenameUnification* flag (top bit of `primCount`)
//! is clear (spec §3 "Demangling normalizer").

/// Applies, in order: delete `::__1`, rewrite a `Nul` literal suffix
/// (`123ul` -> `123`), collapse `", "` -> `,`, `" >"` -> `>`, `" ["` -> `[`,
/// delete `" *(*)"`.
pub fn demangle(name: &str) -> String {
    let mut s = name.replace("::__1", "");
    s = rewrite_ul_literals(&s);
    s = s.replace(", ", ",");
    s = s.replace(" >", ">");
    s = s.replace(" [", "[");
    s = s.replace(" *(*)", "");
    s
}

/// Rewrites digit runs immediately followed by the literal suffix `ul`
/// (e.g. `123ul`) to just the digits (`123`).
fn rewrite_ul_literals(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if s[i..].starts_with("ul") {
                out.push_str(&s[start..i]);
                i += 2;
                continue;
            }
            out.push_str(&s[start..i]);
            continue;
        }
        out.push(bytes[i] as char);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_libcxx_inline_namespace() {
        assert_eq!(demangle("std::__1::vector<int>"), "std::vector<int>");
    }

    #[test]
    fn rewrites_ul_literal() {
        assert_eq!(demangle("array<int, 123ul>"), "array<int,123>");
    }

    #[test]
    fn collapses_separators() {
        assert_eq!(demangle("vector<int >"), "vector<int>");
        assert_eq!(demangle("int [4]"), "int[4]");
    }

    #[test]
    fn deletes_function_pointer_noise() {
        assert_eq!(demangle("void *(*)(int)"), "void(int)");
    }

    #[test]
    fn leaves_plain_names_untouched() {
        assert_eq!(demangle("RobotPose"), "RobotPose");
    }
}
