/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

//! Line normalisation and column splitting.
//!
//! This is deliberately the lowest layer of the pipeline: it knows nothing
//! about labels, directives or operations, only characters and whitespace.

/// Strips leading whitespace, trailing whitespace, comments, and collapses
/// interior whitespace to single spaces. A leading `;` is copied through
/// unconditionally so that callers can detect a comment-only line by
/// checking the first character of the result.
pub fn clean_line(raw: &str) -> String {
    let trimmed_start = raw.trim_start_matches([' ', '\t']);
    if trimmed_start.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = trimmed_start.chars().collect();
    let mut out = String::with_capacity(chars.len());
    out.push(chars[0]);

    for &ch in &chars[1..] {
        if ch == ';' {
            break;
        }

        let ch = if ch == '\t' { ' ' } else { ch };

        if ch == ' ' {
            let last = out.chars().last().unwrap();
            if last == ' ' || last == ',' || last.is_ascii_digit() {
                continue;
            }
        }

        out.push(ch);
    }

    out.trim_end_matches([' ', '\t', '\r', '\n']).to_string()
}

/// Returns the `index`-th whitespace-delimited token of `line`, or `None`
/// if `line` has fewer than `index + 1` tokens.
pub fn column(line: &str, index: usize) -> Option<&str> {
    line.split(' ').filter(|s| !s.is_empty()).nth(index)
}

/// Returns the `index`-th `delim`-delimited sub-token of `token`.
pub fn subcolumn(token: &str, delim: char, index: usize) -> Option<&str> {
    token.split(delim).filter(|s| !s.is_empty()).nth(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_leading_whitespace() {
        assert_eq!(clean_line("   mov r1, r2 ; move it"), "mov r1,r2");
    }

    #[test]
    fn collapses_interior_whitespace_and_tabs() {
        assert_eq!(clean_line("mov\t\tr1,   r2"), "mov r1,r2");
    }

    #[test]
    fn drops_space_after_comma_and_digit() {
        assert_eq!(clean_line(".data 1, 2, 3"), ".data 1,2,3");
    }

    #[test]
    fn blank_line_is_empty() {
        assert_eq!(clean_line("   \t  "), "");
    }

    #[test]
    fn comment_only_line_keeps_leading_semicolon() {
        let cleaned = clean_line("; a full line comment");
        assert!(cleaned.starts_with(';'));
    }

    #[test]
    fn column_out_of_range_is_none() {
        assert_eq!(column("mov r1,r2", 5), None);
    }

    #[test]
    fn subcolumn_splits_on_comma() {
        let list = "1,2,3";
        assert_eq!(subcolumn(list, ',', 0), Some("1"));
        assert_eq!(subcolumn(list, ',', 2), Some("3"));
        assert_eq!(subcolumn(list, ',', 3), None);
    }
}
