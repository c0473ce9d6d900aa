use std::collections::HashMap;
use std::sync::OnceLock;

/// Blank Braille cell. Spaces transliterate to it and glyph text wraps on it.
pub const BLANK_CELL: char = '\u{2800}';

const BRAILLE_BLOCK: std::ops::RangeInclusive<u32> = 0x2800..=0x28FF;

// Canonical order matters: the reverse lookup keeps the first key per cell,
// so letters shadow the digits that reuse their glyphs.
const GRADE1_ENTRIES: &[(char, &str)] = &[
    ('a', "⠁"),
    ('b', "⠃"),
    ('c', "⠉"),
    ('d', "⠙"),
    ('e', "⠑"),
    ('f', "⠋"),
    ('g', "⠛"),
    ('h', "⠓"),
    ('i', "⠊"),
    ('j', "⠚"),
    ('k', "⠅"),
    ('l', "⠇"),
    ('m', "⠍"),
    ('n', "⠝"),
    ('o', "⠕"),
    ('p', "⠏"),
    ('q', "⠟"),
    ('r', "⠗"),
    ('s', "⠎"),
    ('t', "⠞"),
    ('u', "⠥"),
    ('v', "⠧"),
    ('w', "⠺"),
    ('x', "⠭"),
    ('y', "⠽"),
    ('z', "⠵"),
    ('0', "⠚"),
    ('1', "⠁"),
    ('2', "⠃"),
    ('3', "⠉"),
    ('4', "⠙"),
    ('5', "⠑"),
    ('6', "⠋"),
    ('7', "⠛"),
    ('8', "⠓"),
    ('9', "⠊"),
    ('.', "⠲"),
    (',', "⠂"),
    (';', "⠆"),
    (':', "⠒"),
    ('!', "⠖"),
    ('?', "⠦"),
    ('"', "⠦"),
    ('\'', "⠄"),
    ('(', "⠐⠣"),
    (')', "⠐⠜"),
    ('-', "⠤"),
    ('/', "⠌"),
    ('+', "⠬"),
    ('=', "⠐⠶"),
    ('*', "⠐⠔"),
    ('&', "⠯"),
    ('%', "⠐⠏"),
    ('#', "⠼"),
    ('@', "⠐⠁"),
    ('$', "⠐⠎"),
    ('€', "⠐⠑"),
    ('£', "⠐⠇"),
    ('¥', "⠐⠽"),
    ('₹', "⠐⠗"),
    (' ', "\u{2800}"),
];

/// Grade-1 symbol table: character to glyph, plus a reverse index over
/// single-cell glyphs.
#[derive(Debug)]
pub struct SymbolTable {
    forward: HashMap<char, &'static str>,
    reverse: HashMap<char, char>,
}

impl SymbolTable {
    fn build() -> Self {
        let mut forward = HashMap::with_capacity(GRADE1_ENTRIES.len());
        let mut reverse = HashMap::new();
        for &(key, glyph) in GRADE1_ENTRIES {
            forward.insert(key, glyph);
            let mut cells = glyph.chars();
            if let (Some(cell), None) = (cells.next(), cells.next()) {
                reverse.entry(cell).or_insert(key);
            }
        }
        Self { forward, reverse }
    }

    /// Glyph for an already-lowercased character, if it is in the alphabet.
    pub fn lookup(&self, ch: char) -> Option<&'static str> {
        self.forward.get(&ch).copied()
    }

    /// First alphabet key (canonical order) whose glyph is exactly `cell`.
    pub fn reverse(&self, cell: char) -> Option<char> {
        self.reverse.get(&cell).copied()
    }

    /// Alphabet keys in canonical order.
    pub fn keys(&self) -> impl Iterator<Item = char> + '_ {
        GRADE1_ENTRIES.iter().map(|(key, _)| *key)
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}

pub fn symbol_table() -> &'static SymbolTable {
    static TABLE: OnceLock<SymbolTable> = OnceLock::new();
    TABLE.get_or_init(SymbolTable::build)
}

pub fn is_braille_cell(ch: char) -> bool {
    BRAILLE_BLOCK.contains(&(ch as u32))
}
