//! SQL statement splitter
//!
//! Splits raw SQL script text into individual executable statements without
//! a full SQL parser. Semicolons inside single-quoted, double-quoted, or
//! backtick-quoted regions are treated as content; line and block comments
//! are stripped. Intentionally simple: no stored procedure bodies and no
//! `DELIMITER` redefinition.

/// Split a SQL script into individual statements.
///
/// Performs a single left-to-right scan over the text. Each returned
/// statement is trimmed and non-empty; statements appear in source order. A
/// trailing statement with no terminating semicolon is still returned.
pub fn split_statements(script: &str) -> Vec<String> {
    // A UTF-8 BOM (possibly repeated by careless editors) must not reach
    // the lexer or the first statement would carry it into the server.
    let script = script.trim_start_matches('\u{feff}');

    let chars: Vec<char> = script.chars().collect();
    let n = chars.len();

    let mut statements: Vec<String> = Vec::new();
    let mut buff = String::new();

    let mut in_single = false;
    let mut in_double = false;
    let mut in_backtick = false;

    let flush = |buff: &mut String, statements: &mut Vec<String>| {
        let stmt = buff.trim();
        if !stmt.is_empty() {
            statements.push(stmt.to_string());
        }
        buff.clear();
    };

    let mut i = 0;
    while i < n {
        let ch = chars[i];
        let nxt = if i + 1 < n { Some(chars[i + 1]) } else { None };
        let quoted = in_single || in_double || in_backtick;

        // Line comment: "-- ..." up to end of line. MySQL only recognizes
        // the double dash as a comment opener when it is followed by
        // whitespace or end of input, so "--x" stays literal content.
        if !quoted && ch == '-' && nxt == Some('-') {
            let nxt2 = if i + 2 < n { Some(chars[i + 2]) } else { None };
            if nxt2.map_or(true, char::is_whitespace) {
                i += 2;
                while i < n && chars[i] != '\r' && chars[i] != '\n' {
                    i += 1;
                }
                continue;
            }
        }

        // Line comment: "# ..." up to end of line.
        if !quoted && ch == '#' {
            i += 1;
            while i < n && chars[i] != '\r' && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        // Block comment: "/* ... */", newlines included. Not nestable: the
        // first "*/" closes it. An unterminated comment runs to end of
        // input.
        if !quoted && ch == '/' && nxt == Some('*') {
            i += 2;
            while i + 1 < n && !(chars[i] == '*' && chars[i + 1] == '/') {
                i += 1;
            }
            i += 2;
            continue;
        }

        // Backslash escape inside a quoted string: copy the escape and the
        // escaped character verbatim so a quote right after a backslash
        // cannot toggle the quoting state.
        if ch == '\\' && (in_single || in_double) {
            if let Some(escaped) = nxt {
                buff.push(ch);
                buff.push(escaped);
                i += 2;
                continue;
            }
        }

        if ch == '\'' && !in_double && !in_backtick {
            in_single = !in_single;
            buff.push(ch);
            i += 1;
            continue;
        }

        if ch == '"' && !in_single && !in_backtick {
            in_double = !in_double;
            buff.push(ch);
            i += 1;
            continue;
        }

        if ch == '`' && !in_single && !in_double {
            in_backtick = !in_backtick;
            buff.push(ch);
            i += 1;
            continue;
        }

        if ch == ';' && !quoted {
            flush(&mut buff, &mut statements);
            i += 1;
            continue;
        }

        buff.push(ch);
        i += 1;
    }

    flush(&mut buff, &mut statements);
    statements
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_two_statements() {
        assert_eq!(
            split_statements("SELECT 1; SELECT 2;"),
            vec!["SELECT 1", "SELECT 2"]
        );
    }

    #[test]
    fn semicolon_inside_single_quotes_is_content() {
        assert_eq!(
            split_statements("INSERT INTO t VALUES ('a;b');"),
            vec!["INSERT INTO t VALUES ('a;b')"]
        );
    }

    #[test]
    fn semicolon_inside_double_quotes_is_content() {
        assert_eq!(
            split_statements("INSERT INTO t VALUES (\"x;y\");"),
            vec!["INSERT INTO t VALUES (\"x;y\")"]
        );
    }

    #[test]
    fn semicolon_inside_backticks_is_content() {
        assert_eq!(
            split_statements("SELECT `weird;name` FROM t;"),
            vec!["SELECT `weird;name` FROM t"]
        );
    }

    #[test]
    fn line_comment_is_stripped() {
        assert_eq!(split_statements("-- comment\nSELECT 1;"), vec!["SELECT 1"]);
    }

    #[test]
    fn hash_comment_is_stripped() {
        assert_eq!(
            split_statements("# comment\nSELECT 1; # trailing\nSELECT 2;"),
            vec!["SELECT 1", "SELECT 2"]
        );
    }

    #[test]
    fn final_statement_without_semicolon_is_flushed() {
        assert_eq!(
            split_statements("SELECT 1; -- trailing, no final semicolon\nSELECT 2"),
            vec!["SELECT 1", "SELECT 2"]
        );
    }

    #[test]
    fn double_dash_inside_quotes_is_not_a_comment() {
        assert_eq!(
            split_statements("SELECT '--not a comment';"),
            vec!["SELECT '--not a comment'"]
        );
    }

    #[test]
    fn double_dash_without_whitespace_is_literal() {
        // Mirrors MySQL's comment rule: "--x" is an expression, not a
        // comment opener.
        assert_eq!(split_statements("SELECT 5--3;"), vec!["SELECT 5--3"]);
    }

    #[test]
    fn double_dash_at_end_of_input_is_a_comment() {
        assert_eq!(split_statements("SELECT 1; --"), vec!["SELECT 1"]);
    }

    #[test]
    fn block_comment_is_stripped() {
        assert_eq!(
            split_statements("/* drop;\n everything */ SELECT 1;"),
            vec!["SELECT 1"]
        );
    }

    #[test]
    fn unterminated_block_comment_consumes_rest_of_input() {
        assert_eq!(
            split_statements("SELECT 1; /* open comment SELECT 2;"),
            vec!["SELECT 1"]
        );
    }

    #[test]
    fn block_comments_do_not_nest() {
        // The first "*/" closes the comment, so the tail is real content.
        assert_eq!(
            split_statements("/* a /* b */ SELECT 1;"),
            vec!["SELECT 1"]
        );
    }

    #[test]
    fn lone_dash_and_slash_are_content() {
        assert_eq!(
            split_statements("SELECT 5 - 3; SELECT 4 / 2;"),
            vec!["SELECT 5 - 3", "SELECT 4 / 2"]
        );
    }

    #[test]
    fn backslash_escaped_quote_does_not_close_string() {
        assert_eq!(
            split_statements(r"INSERT INTO t VALUES ('it\'s; fine');"),
            vec![r"INSERT INTO t VALUES ('it\'s; fine')"]
        );
    }

    #[test]
    fn doubled_single_quote_keeps_semicolon_inside() {
        // Standard SQL '' escaping works out naturally: the quote state
        // toggles twice and the semicolon lands back inside the string.
        assert_eq!(
            split_statements("INSERT INTO t VALUES ('it''s a test; still one');"),
            vec!["INSERT INTO t VALUES ('it''s a test; still one')"]
        );
    }

    #[test]
    fn escape_sequences_are_copied_verbatim() {
        assert_eq!(
            split_statements(r"INSERT INTO t VALUES ('a\\'); SELECT 1;"),
            vec![r"INSERT INTO t VALUES ('a\\')", "SELECT 1"]
        );
    }

    #[test]
    fn empty_and_comment_only_scripts_yield_nothing() {
        assert_eq!(split_statements(""), Vec::<String>::new());
        assert_eq!(split_statements("   \n\t  "), Vec::<String>::new());
        assert_eq!(
            split_statements("-- only\n# comments\n/* here */"),
            Vec::<String>::new()
        );
    }

    #[test]
    fn consecutive_semicolons_produce_no_empty_statements() {
        assert_eq!(split_statements(";;;SELECT 1;;"), vec!["SELECT 1"]);
    }

    #[test]
    fn leading_bom_is_stripped() {
        assert_eq!(
            split_statements("\u{feff}SELECT 1;"),
            vec!["SELECT 1"]
        );
    }

    #[test]
    fn resplitting_joined_output_is_stable() {
        // Comments and blank statements are gone after the first pass, so
        // joining with semicolons and splitting again is a fixed point.
        let script =
            "-- setup\nCREATE TABLE t (id INT); INSERT INTO t VALUES ('a;b'); /* x */ DROP TABLE t";
        let first = split_statements(script);
        let rejoined = format!("{};", first.join(";\n"));
        assert_eq!(split_statements(&rejoined), first);
    }

    #[test]
    fn statements_keep_source_order() {
        let script = "CREATE TABLE a (id INT);\nINSERT INTO a VALUES (1);\nDROP TABLE a;";
        assert_eq!(
            split_statements(script),
            vec![
                "CREATE TABLE a (id INT)",
                "INSERT INTO a VALUES (1)",
                "DROP TABLE a"
            ]
        );
    }

    #[test]
    fn multiline_statement_is_kept_whole() {
        let script = "CREATE TABLE t (\n  id INT, -- key\n  name VARCHAR(50)\n);";
        assert_eq!(
            split_statements(script),
            vec!["CREATE TABLE t (\n  id INT, \n  name VARCHAR(50)\n)"]
        );
    }
}
