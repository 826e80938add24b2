//! Static Helvetica width tables for PDF line wrapping.
//!
//! Widths are in thousandths of an em, from the standard Helvetica and
//! Helvetica-Bold AFM files. Tables cover ASCII 0x20..=0x7E (95 printable
//! characters); index = (char as usize) - 32.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Regular,
    Bold,
}

/// Character-width table for one Helvetica face.
pub struct FontMetricTable {
    widths: [u16; 95],
    /// Width for anything outside ASCII.
    pub fallback_width: u16,
    pub bullet_width: u16,
}

impl FontMetricTable {
    fn char_width(&self, c: char) -> u16 {
        match c as usize {
            code @ 32..=126 => self.widths[code - 32],
            _ if c == '•' => self.bullet_width,
            _ => self.fallback_width,
        }
    }

    /// Rendered width of `s` in points at `size` points.
    pub fn measure(&self, s: &str, size: i64) -> i64 {
        let units: i64 = s.chars().map(|c| i64::from(self.char_width(c))).sum();
        (units * size + 999) / 1000
    }

    /// Greedy word wrap at `max_width` points. A word wider than the line is
    /// broken between characters.
    pub fn wrap(&self, text: &str, size: i64, max_width: i64) -> Vec<String> {
        let space = self.measure(" ", size);
        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_width = 0;

        for word in text.split_whitespace() {
            let word_width = self.measure(word, size);
            if word_width > max_width {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let pieces = self.split_word(word, size, max_width);
                if let Some((last, full)) = pieces.split_last() {
                    lines.extend(full.iter().map(|p| p.to_string()));
                    current = last.to_string();
                    current_width = self.measure(last, size);
                }
                continue;
            }
            if !current.is_empty() && current_width + space + word_width > max_width {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_width += space;
            }
            current.push_str(word);
            current_width += word_width;
        }
        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Splits one word into pieces no wider than `max_width`. Every piece
    /// holds at least one character.
    fn split_word<'w>(&self, word: &'w str, size: i64, max_width: i64) -> Vec<&'w str> {
        let mut pieces = Vec::new();
        let mut start = 0;
        let mut units = 0i64;
        for (i, c) in word.char_indices() {
            let width = i64::from(self.char_width(c));
            if i > start && ((units + width) * size + 999) / 1000 > max_width {
                pieces.push(&word[start..i]);
                start = i;
                units = 0;
            }
            units += width;
        }
        pieces.push(&word[start..]);
        pieces
    }
}

static HELVETICA: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0    1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        278, 278, 584, 584, 584, 556, 1015,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        278, 278, 278, 469, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // {    |    }    ~
        334, 260, 334, 584,
    ],
    fallback_width: 556,
    bullet_width: 350,
};

static HELVETICA_BOLD: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0    1    2    3    4    5    6    7    8    9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        333, 333, 584, 584, 584, 611, 975,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        333, 278, 333, 584, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        // {    |    }    ~
        389, 280, 389, 584,
    ],
    fallback_width: 556,
    bullet_width: 350,
};

pub fn get_metrics(face: Face) -> &'static FontMetricTable {
    match face {
        Face::Regular => &HELVETICA,
        Face::Bold => &HELVETICA_BOLD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_known_word() {
        // R(722) + u(556) + s(500) + t(278) = 2056 → 20.56pt at 10pt, rounded up
        assert_eq!(get_metrics(Face::Regular).measure("Rust", 10), 21);
        assert_eq!(get_metrics(Face::Regular).measure("", 10), 0);
    }

    #[test]
    fn test_bold_is_not_narrower() {
        let text = "Architected distributed caching layer";
        assert!(
            get_metrics(Face::Bold).measure(text, 11) >= get_metrics(Face::Regular).measure(text, 11)
        );
    }

    #[test]
    fn test_wrap_respects_width() {
        let metrics = get_metrics(Face::Regular);
        let text = "word ".repeat(60);
        let lines = metrics.wrap(&text, 11, 200);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(metrics.measure(line, 11) <= 200, "line too wide: {line}");
        }
        assert_eq!(lines.join(" "), text.trim_end());
    }

    #[test]
    fn test_wrap_breaks_overlong_word() {
        let metrics = get_metrics(Face::Regular);
        let text = "see https://github.com/janedoe/billing-service-rewrite now";
        let lines = metrics.wrap(text, 11, 60);
        assert_eq!(lines[0], "see");
        assert!(lines.len() > 3);
        for line in &lines {
            assert!(metrics.measure(line, 11) <= 60, "line too wide: {line}");
        }
        assert_eq!(lines.concat().replace(' ', ""), text.replace(' ', ""));
    }

    #[test]
    fn test_wrap_empty_text_has_no_lines() {
        assert!(get_metrics(Face::Bold).wrap("   ", 11, 100).is_empty());
    }
}
