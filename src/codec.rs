//! Delimited list fields.
//!
//! Multi-valued cells (`artists`, `composers`) are stored as a single text
//! cell with the elements joined by `"; "`. Decoding splits on the bare `;`
//! and trims each piece.
//!
//! # Known limitation
//!
//! Elements are not escaped. A name that itself contains `;` is split into
//! two elements on the next decode, so the round trip is lossy for such
//! input.

/// Separator written between elements.
pub const SEPARATOR: &str = "; ";

/// Character that splits elements when decoding.
pub const SPLIT_CHAR: char = ';';

/// Join a list into a single cell value.
pub fn encode<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Split a cell value into its trimmed elements.
///
/// A blank cell decodes to an empty list.
pub fn decode(cell: &str) -> Vec<String> {
    if cell.trim().is_empty() {
        return Vec::new();
    }
    cell.split(SPLIT_CHAR)
        .map(|piece| piece.trim().to_string())
        .collect()
}

/// Decode a cell that may be absent.
pub fn decode_opt(cell: Option<&str>) -> Vec<String> {
    cell.map(decode).unwrap_or_default()
}
