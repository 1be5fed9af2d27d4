//! Text encoding and measurement for the standard PDF fonts
//!
//! Reports use the base-14 Type1 fonts with WinAnsiEncoding, so strings are
//! mapped onto that code page and measured with the fonts' own metrics.
//! Turkish letters outside the code page are written as their closest
//! ASCII letter.

/// Standard fonts used in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    /// Helvetica
    Regular,

    /// Helvetica-Bold
    Bold,

    /// Times-Roman
    Serif,
}

impl Font {
    /// Resource name the font is registered under on every page
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Serif => "F3",
        }
    }

    /// PostScript name of the font
    pub fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Serif => "Times-Roman",
        }
    }

    /// All fonts, in resource order
    pub const ALL: [Font; 3] = [Font::Regular, Font::Bold, Font::Serif];
}

// Advance widths of ' '..='~' in 1/1000 em
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

/// Replace characters WinAnsiEncoding cannot represent
fn transliterate(c: char) -> char {
    match c {
        'ı' => 'i',
        'İ' => 'I',
        'ş' => 's',
        'Ş' => 'S',
        'ğ' => 'g',
        'Ğ' => 'G',
        'Δ' => 'D',
        other => other,
    }
}

/// Encode a string as WinAnsiEncoding bytes
pub fn encode(text: &str) -> Vec<u8> {
    text.chars()
        .map(transliterate)
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}

/// Width of one encoded byte in 1/1000 em
fn glyph_width(font: Font, byte: u8) -> u16 {
    let table = match font {
        Font::Regular => &HELVETICA,
        Font::Bold => &HELVETICA_BOLD,
        Font::Serif => &TIMES_ROMAN,
    };

    match byte {
        b' '..=b'~' => table[(byte - b' ') as usize],
        // accented capitals and lowercase fall back to a typical letter
        0xc0..=0xdf => table[(b'O' - b' ') as usize],
        0xe0..=0xff => table[(b'o' - b' ') as usize],
        _ => table[(b'n' - b' ') as usize],
    }
}

/// Width of `text` in points at `size`
pub fn text_width(font: Font, size: f64, text: &str) -> f64 {
    let units: u32 = encode(text).iter().map(|b| u32::from(glyph_width(font, *b))).sum();
    f64::from(units) * size / 1000.0
}

/// Break `text` into lines no wider than `width`.
///
/// Words longer than a line are cut at character boundaries. Explicit
/// newlines are kept.
pub fn wrap_text(text: &str, font: Font, size: f64, width: f64) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if text_width(font, size, &candidate) <= width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            // hard-break words that do not fit on a line of their own
            for c in word.chars() {
                current.push(c);
                if text_width(font, size, &current) > width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }
        lines.push(current);
    }

    lines
}
