use itertools::Itertools;

/// Lines containing one of these (case-insensitively) are OCR noise picked up
/// from on-screen consoles and log views.
const DIAGNOSTIC_MARKERS: [&str; 4] = ["debug:", "error:", "warning:", "exception:"];

/// Cleans raw OCR output line by line: strips non-printable characters,
/// collapses whitespace runs, drops empty and diagnostic lines. Relative order
/// of the surviving lines is preserved and the whole pass is idempotent.
pub fn clean_lines(raw: &str) -> Vec<String> {
    raw.lines().filter_map(clean_line).collect()
}

pub fn clean_text(raw: &str) -> String {
    clean_lines(raw).join("\n")
}

fn clean_line(line: &str) -> Option<String> {
    let printable: String = line.chars().filter(|c| !c.is_control()).collect();
    let collapsed = printable.split_whitespace().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    let lowered = collapsed.to_lowercase();
    if DIAGNOSTIC_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        return None;
    }
    Some(collapsed)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(clean_text("Hello   World"), "Hello World");
        assert_eq!(clean_text("\ta \t b  c "), "a b c");
    }

    #[test]
    fn drops_diagnostic_lines_case_insensitively() {
        assert_eq!(clean_lines("Debug: internal state"), Vec::<String>::new());
        assert_eq!(clean_text("Line1\n\nDEBUG: x\nLine2"), "Line1\nLine2");
        assert_eq!(clean_text("ok\nWARNING: disk full\nstill ok"), "ok\nstill ok");
    }

    #[test]
    fn strips_non_printables() {
        assert_eq!(clean_text("he\u{0}llo\u{7} wor\u{1b}ld"), "hello world");
    }

    #[test]
    fn empty_input_yields_no_lines() {
        assert!(clean_lines("").is_empty());
        assert!(clean_lines(" \n\t\n  ").is_empty());
    }

    #[test]
    fn cleanup_is_idempotent() {
        let samples = [
            "Hello   World",
            "Line1\n\nDEBUG: x\nLine2",
            "  spaced \t out \n error: gone \n kept ",
        ];
        for raw in samples {
            let once = clean_text(raw);
            assert_eq!(clean_text(&once), once);
        }
    }
}
