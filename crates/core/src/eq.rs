//! Payload equality for grammar symbols.
//!
//! Whether two nodes carry "the same symbol" is a caller decision: a payload
//! may hold a symbol id next to bookkeeping that must not take part in the
//! comparison. Everything that compares payloads goes through [`NodeEq`].

/// Decides whether two payloads denote the same grammatical symbol.
pub trait NodeEq<T: ?Sized> {
    fn equal(&self, a: &T, b: &T) -> bool;
}

impl<T: ?Sized, F> NodeEq<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn equal(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}

/// Compares whole payloads with `PartialEq`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayloadEq;

impl<T: PartialEq + ?Sized> NodeEq<T> for PayloadEq {
    fn equal(&self, a: &T, b: &T) -> bool {
        a == b
    }
}

/// Compares a key projected out of each payload.
///
/// ```rust
/// use tsg_core::{ByKey, NodeEq};
///
/// struct Symbol { key: u32, is_root: bool }
///
/// let by_key = ByKey(|s: &Symbol| s.key);
/// assert!(by_key.equal(&Symbol { key: 3, is_root: true }, &Symbol { key: 3, is_root: false }));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ByKey<F>(pub F);

impl<T, K, F> NodeEq<T> for ByKey<F>
where
    F: Fn(&T) -> K,
    K: PartialEq,
{
    fn equal(&self, a: &T, b: &T) -> bool {
        (self.0)(a) == (self.0)(b)
    }
}
