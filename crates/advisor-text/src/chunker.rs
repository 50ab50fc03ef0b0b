//! Greedy line and paragraph chunking.
//!
//! A unit is a whitespace-delimited word, used as a proxy for model tokens.
//! Units are never split: a 300 character identifier still counts as one
//! unit and travels whole.

/// Number of units in `text`.
pub fn count_units(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Splits newline-delimited text into lines of at most `max_units_per_line`
/// units. Blank input lines are dropped and inner whitespace collapses to a
/// single space.
pub fn split_lines(text: &str, max_units_per_line: usize) -> Vec<String> {
    let max = max_units_per_line.max(1);
    let mut lines = Vec::new();

    for raw in text.split('\n') {
        pack(raw.split_whitespace().map(|w| (w, 1)), max, " ", &mut lines);
    }

    lines
}

/// Groups lines into paragraphs of at most `max_units_per_paragraph` units,
/// joined with `\n`. A line that alone exceeds the bound is re-split at
/// unit boundaries first.
pub fn split_paragraphs<S: AsRef<str>>(lines: &[S], max_units_per_paragraph: usize) -> Vec<String> {
    let max = max_units_per_paragraph.max(1);
    let mut pieces: Vec<(String, usize)> = Vec::with_capacity(lines.len());

    for line in lines {
        let line = line.as_ref();
        let units = count_units(line);
        if units == 0 {
            continue;
        }
        if units > max {
            for part in split_lines(line, max) {
                let units = count_units(&part);
                pieces.push((part, units));
            }
        } else {
            pieces.push((line.trim().to_string(), units));
        }
    }

    let mut paragraphs = Vec::new();
    pack(
        pieces.iter().map(|(p, u)| (p.as_str(), *u)),
        max,
        "\n",
        &mut paragraphs,
    );
    paragraphs
}

/// Appends pieces to the current chunk until the next one would push it past
/// `max`, then starts a new chunk. An oversized piece always gets a chunk of
/// its own.
fn pack<'a>(
    pieces: impl Iterator<Item = (&'a str, usize)>,
    max: usize,
    separator: &str,
    out: &mut Vec<String>,
) {
    let mut current = String::new();
    let mut used = 0usize;

    for (piece, units) in pieces {
        if used > 0 && used + units > max {
            out.push(std::mem::take(&mut current));
            used = 0;
        }
        if used > 0 {
            current.push_str(separator);
        }
        current.push_str(piece);
        used += units;
    }

    if used > 0 {
        out.push(current);
    }
}
