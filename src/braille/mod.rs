//! Grade-1 transliteration: the symbol table, the glyph/ASCII passes, line
//! formatting and source-text counters.

mod metadata;
mod table;
mod transliterate;
mod wrap;

pub use metadata::{Metadata, metadata};
pub use table::{BLANK_CELL, SymbolTable, is_braille_cell, symbol_table};
pub use transliterate::{
    GlyphUnit, Presentation, TransliterationResult, Transliterator, glyph_units, to_ascii,
    to_glyphs,
};
pub use wrap::{DEFAULT_LINE_WIDTH, wrap, wrap_with};
