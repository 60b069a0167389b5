//! A compact representation for the list and non-null wrapping of a GraphQL
//! type.
//!
//! GraphQL nullability algebra: a named type is nullable unless wrapped in
//! `NonNull`, and every list level is independently nullable. `[[String]]!`,
//! `[String!]!` and `[String]` are all distinct signatures, and a `Wrapping`
//! preserves each level distinctly.
//!
//! Wrappings up to 31 list levels deep fit in a bit-packed word; deeper
//! nesting spills to a boxed list so any valid type remains representable.

use serde::{Deserialize, Serialize};

/// The wrapping of the innermost named type of a GraphQL field type.
///
/// Construct with [`Wrapping::new()`] for the innermost named type, then
/// apply list wrappers innermost-out with [`Wrapping::wrapped_by_nullable_list()`]
/// and [`Wrapping::wrapped_by_required_list()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wrapping(Repr);

/// Invariant: `Small` is the canonical form up to [`MAX_SMALL_DEPTH`]
/// list levels, `Large` is only ever produced beyond it, so derived
/// equality never compares the same wrapping across representations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
enum Repr {
    Small {
        /// Number of list wrappers, innermost first.
        depth: u8,
        /// Bit 0 is set when the innermost named type is required. Bits
        /// `1..=depth` carry one bit per list wrapper, innermost first; a
        /// set bit means the list at that level is itself non-null.
        bits: u32,
    },
    Large {
        inner_is_required: bool,
        /// Innermost first.
        lists: Box<[ListWrapping]>,
    },
}

/// One list level of a [`Wrapping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListWrapping {
    /// `[T]`
    NullableList,
    /// `[T]!`
    RequiredList,
}

const MAX_SMALL_DEPTH: u8 = 31;

impl Wrapping {
    /// A wrapping with no list wrappers. `inner_is_required` corresponds to
    /// `T!` as opposed to `T`.
    pub fn new(inner_is_required: bool) -> Self {
        Wrapping(Repr::Small {
            depth: 0,
            bits: u32::from(inner_is_required),
        })
    }

    /// Shorthand for a required named type (`T!`).
    pub fn required() -> Self {
        Wrapping::new(true)
    }

    /// Shorthand for a nullable named type (`T`).
    pub fn nullable() -> Self {
        Wrapping::new(false)
    }

    /// Wrap in `[...]`.
    pub fn wrapped_by_nullable_list(self) -> Self {
        self.push_list(ListWrapping::NullableList)
    }

    /// Wrap in `[...]!`.
    pub fn wrapped_by_required_list(self) -> Self {
        self.push_list(ListWrapping::RequiredList)
    }

    fn push_list(self, list: ListWrapping) -> Self {
        match self.0 {
            Repr::Small { depth, mut bits } if depth < MAX_SMALL_DEPTH => {
                let depth = depth + 1;
                if list == ListWrapping::RequiredList {
                    bits |= 1 << depth;
                }
                Wrapping(Repr::Small { depth, bits })
            }
            Repr::Small { depth, bits } => {
                let lists = (1..=depth)
                    .map(|level| {
                        if bits >> level & 1 == 1 {
                            ListWrapping::RequiredList
                        } else {
                            ListWrapping::NullableList
                        }
                    })
                    .chain(std::iter::once(list))
                    .collect();
                Wrapping(Repr::Large {
                    inner_is_required: bits & 1 == 1,
                    lists,
                })
            }
            Repr::Large {
                inner_is_required,
                lists,
            } => {
                let mut lists = lists.into_vec();
                lists.push(list);
                Wrapping(Repr::Large {
                    inner_is_required,
                    lists: lists.into_boxed_slice(),
                })
            }
        }
    }

    pub fn is_list(&self) -> bool {
        match &self.0 {
            Repr::Small { depth, .. } => *depth > 0,
            Repr::Large { .. } => true,
        }
    }

    /// Whether the innermost named type is non-null, irrespective of lists.
    pub fn inner_is_required(&self) -> bool {
        match &self.0 {
            Repr::Small { bits, .. } => bits & 1 == 1,
            Repr::Large {
                inner_is_required, ..
            } => *inner_is_required,
        }
    }

    /// Whether the outermost level (list or named type) is non-null.
    pub fn is_required(&self) -> bool {
        match &self.0 {
            Repr::Small { depth, bits } => bits >> depth & 1 == 1,
            Repr::Large { lists, .. } => lists.last() == Some(&ListWrapping::RequiredList),
        }
    }

    /// The list wrappers, innermost first.
    pub fn list_wrappings(&self) -> ListWrappings<'_> {
        ListWrappings(match &self.0 {
            Repr::Small { depth, bits } => ListWrappingsRepr::Small {
                bits: *bits,
                next: 1,
                depth: *depth,
            },
            Repr::Large { lists, .. } => ListWrappingsRepr::Large(lists.iter()),
        })
    }
}

/// Iterator over the list levels of a [`Wrapping`], innermost first.
pub struct ListWrappings<'a>(ListWrappingsRepr<'a>);

enum ListWrappingsRepr<'a> {
    Small { bits: u32, next: u8, depth: u8 },
    Large(std::slice::Iter<'a, ListWrapping>),
}

impl Iterator for ListWrappings<'_> {
    type Item = ListWrapping;

    fn next(&mut self) -> Option<ListWrapping> {
        match &mut self.0 {
            ListWrappingsRepr::Small { bits, next, depth } => {
                if *next > *depth {
                    return None;
                }
                let list = if *bits >> *next & 1 == 1 {
                    ListWrapping::RequiredList
                } else {
                    ListWrapping::NullableList
                };
                *next += 1;
                Some(list)
            }
            ListWrappingsRepr::Large(lists) => lists.next().copied(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = match &self.0 {
            ListWrappingsRepr::Small { next, depth, .. } => usize::from(depth + 1 - next),
            ListWrappingsRepr::Large(lists) => lists.len(),
        };
        (len, Some(len))
    }
}

impl ExactSizeIterator for ListWrappings<'_> {}
