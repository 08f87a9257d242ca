//! Heuristic size extraction for command arguments.
//!
//! Commands take keys and values of wildly different shapes: a key may be a
//! single string, a sequence of keys, or absent; a value may be a payload,
//! a field map, or a slice of pairs. Rather than inspecting concrete types
//! in the interception core, arguments are first classified into an
//! [`Operand`] (an explicit structural category) via [`Measurable`], and
//! [`heuristic_lengths`] derives the length observations from that.
//!
//! The derivation is total: it never fails, and shapes with no meaningful
//! length contribute nothing.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Structural category of a command argument, as seen by the length
/// heuristic. Categories are matched in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    /// No argument (keyless or valueless command).
    None,
    /// Textual data; the payload is its character count.
    Text(usize),
    /// Key-value mapping; the payload is its entry count, not recursed into.
    Map(usize),
    /// Fixed-size collection of elements (list, slice, tuple, set).
    List(Vec<Operand>),
    /// Something with an explicit size but no inspectable structure.
    Sized(usize),
    /// General iterable with no defined size, already materialized.
    Iterable(Vec<Operand>),
    /// No length concept (numbers, flags, opaque objects).
    Opaque,
}

/// Derive the length observations for one operand.
///
/// - `Text`, `Map` and `Sized` yield their single count.
/// - `List` concatenates the recursion over its elements, in order; if that
///   comes up empty but the collection itself is non-empty, the element
///   count stands in.
/// - `Iterable` concatenates the recursion with no fallback.
/// - `None` and `Opaque` yield nothing.
pub fn heuristic_lengths(operand: &Operand) -> Vec<u64> {
    match operand {
        Operand::Text(n) | Operand::Map(n) | Operand::Sized(n) => vec![*n as u64],
        Operand::List(items) => {
            let lengths: Vec<u64> = items.iter().flat_map(heuristic_lengths).collect();
            if lengths.is_empty() && !items.is_empty() {
                vec![items.len() as u64]
            } else {
                lengths
            }
        }
        Operand::Iterable(items) => items.iter().flat_map(heuristic_lengths).collect(),
        Operand::None | Operand::Opaque => Vec::new(),
    }
}

/// Conversion from a concrete argument type into its structural category.
///
/// Implemented for the types that appear as redis-rs command arguments;
/// application types can implement it to opt their own arguments into
/// length recording.
pub trait Measurable {
    fn operand(&self) -> Operand;
}

impl<T: Measurable + ?Sized> Measurable for &T {
    fn operand(&self) -> Operand {
        (**self).operand()
    }
}

impl Measurable for str {
    fn operand(&self) -> Operand {
        Operand::Text(self.chars().count())
    }
}

impl Measurable for String {
    fn operand(&self) -> Operand {
        self.as_str().operand()
    }
}

impl<T: Measurable> Measurable for Option<T> {
    fn operand(&self) -> Operand {
        match self {
            Some(item) => item.operand(),
            None => Operand::None,
        }
    }
}

impl<T: Measurable> Measurable for [T] {
    fn operand(&self) -> Operand {
        Operand::List(self.iter().map(Measurable::operand).collect())
    }
}

impl<T: Measurable> Measurable for Vec<T> {
    fn operand(&self) -> Operand {
        self.as_slice().operand()
    }
}

impl<T: Measurable, const N: usize> Measurable for [T; N] {
    fn operand(&self) -> Operand {
        self.as_slice().operand()
    }
}

impl<A: Measurable, B: Measurable> Measurable for (A, B) {
    fn operand(&self) -> Operand {
        Operand::List(vec![self.0.operand(), self.1.operand()])
    }
}

impl<A: Measurable, B: Measurable, C: Measurable> Measurable for (A, B, C) {
    fn operand(&self) -> Operand {
        Operand::List(vec![self.0.operand(), self.1.operand(), self.2.operand()])
    }
}

impl<K, V, S> Measurable for HashMap<K, V, S> {
    fn operand(&self) -> Operand {
        Operand::Map(self.len())
    }
}

impl<K, V> Measurable for BTreeMap<K, V> {
    fn operand(&self) -> Operand {
        Operand::Map(self.len())
    }
}

impl<T: Measurable, S> Measurable for HashSet<T, S> {
    fn operand(&self) -> Operand {
        Operand::List(self.iter().map(Measurable::operand).collect())
    }
}

impl<T: Measurable> Measurable for BTreeSet<T> {
    fn operand(&self) -> Operand {
        Operand::List(self.iter().map(Measurable::operand).collect())
    }
}

/// Numbers, booleans and unit carry no length.
macro_rules! opaque_measurable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Measurable for $ty {
                fn operand(&self) -> Operand {
                    Operand::Opaque
                }
            }
        )*
    };
}

opaque_measurable!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64, bool, ());
