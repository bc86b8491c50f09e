//! Repairs for malformed iCalendar text produced by some servers.
//
// Both repairs work on physical lines and never touch folded continuation lines.

use once_cell::sync::Lazy;
use regex::Regex;

static EMPTY_DATE_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:RDATE|EXDATE):$").expect("static pattern compiles"));

/// Make raw iCalendar text safe to parse.
///
/// Removes trailing commas at the end of an unfolded date list and drops `RDATE`/`EXDATE`
/// lines that carry no value. Applying it twice yields the same text as applying it once.
pub fn sanitize(text: &str) -> String {
    let mut current = sanitize_once(text);
    // Removing a line can expose another repairable line, so repeat until stable.
    loop {
        let next = sanitize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn sanitize_once(text: &str) -> String {
    let lines: Vec<(&str, &str)> = text.split_inclusive('\n').map(split_terminator).collect();

    let kept: Vec<(&str, &str)> = lines
        .iter()
        .enumerate()
        .filter(|(i, (content, _))| {
            !(EMPTY_DATE_LIST.is_match(content) && !is_continuation(lines.get(i + 1)))
        })
        .map(|(_, line)| *line)
        .collect();

    let mut out = String::with_capacity(text.len());
    for (i, (content, terminator)) in kept.iter().enumerate() {
        let next_starts_property = kept
            .get(i + 1)
            .is_some_and(|(next, _)| next.chars().next().is_some_and(|c| !c.is_whitespace()));
        if next_starts_property {
            out.push_str(content.trim_end_matches(','));
        } else {
            out.push_str(content);
        }
        out.push_str(terminator);
    }
    out
}

fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}

fn is_continuation(line: Option<&(&str, &str)>) -> bool {
    line.is_some_and(|(content, _)| content.starts_with([' ', '\t']))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("RDATE:\n", "" ; "empty rdate")]
    #[test_case("EXDATE:\r\n", "" ; "empty exdate with crlf")]
    #[test_case("RDATE:20240101T000000Z\n", "RDATE:20240101T000000Z\n" ; "rdate with value")]
    #[test_case("EXDATE:20240101T000000Z,\nSUMMARY:x\n", "EXDATE:20240101T000000Z\nSUMMARY:x\n" ; "trailing comma")]
    #[test_case("EXDATE:20240101T000000Z,\n 20240102T000000Z\n", "EXDATE:20240101T000000Z,\n 20240102T000000Z\n" ; "comma before folded line")]
    #[test_case("EXDATE:20240101T000000Z,\r\nSUMMARY:x\r\n", "EXDATE:20240101T000000Z\r\nSUMMARY:x\r\n" ; "trailing comma with crlf")]
    #[test_case("RDATE:\nEXDATE:\nSUMMARY:x\n", "SUMMARY:x\n" ; "consecutive empty lists")]
    #[test_case("DESCRIPTION:a,\n", "DESCRIPTION:a,\n" ; "comma on last line")]
    fn sanitizes(input: &str, expected: &str) {
        assert_eq!(sanitize(input), expected);
    }

    #[test]
    fn empty_property_before_folded_value_is_kept() {
        let input = "EXDATE:\n 20240101T000000Z\n";
        assert_eq!(sanitize(input), input);
    }

    #[test]
    fn sanitize_is_idempotent() {
        let inputs = [
            "BEGIN:VEVENT\nEXDATE:20240101T000000Z,,\nRDATE:,\nRDATE:\nEND:VEVENT\n",
            "X:a,\n,\nY:b\n",
            "EXDATE:1,\r\n 2,\r\nEXDATE:\r\nZ:3",
            "",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {input:?}");
        }
    }
}
