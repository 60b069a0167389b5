//! Rendering of wrapping types into target-language lexemes.
//!
//! The lexeme grammar is deliberately tiny: `X` for a required named type,
//! `X?` for a nullable one, `Array<...>` per list level with its own `?`
//! when the list itself is nullable. Every distinct wrapping yields a
//! distinct lexeme, so the strings are safe to compare for equality.

use wrapping::{ListWrapping, Wrapping};

pub(crate) fn wrap_type(base: &str, wrapping: &Wrapping) -> String {
    let mut lexeme = if wrapping.inner_is_required() {
        base.to_owned()
    } else {
        format!("{base}?")
    };
    for list in wrapping.list_wrappings() {
        lexeme = match list {
            ListWrapping::RequiredList => format!("Array<{lexeme}>"),
            ListWrapping::NullableList => format!("Array<{lexeme}>?"),
        };
    }
    lexeme
}

/// The `(is_array, is_required, is_list_required)` triple a model field
/// carries alongside its lexeme. For lists, `is_required` reports the item
/// type and `is_list_required` the outermost list.
pub(crate) fn field_flags(wrapping: &Wrapping) -> (bool, bool, bool) {
    (
        wrapping.is_list(),
        wrapping.inner_is_required(),
        wrapping.is_list() && wrapping.is_required(),
    )
}
