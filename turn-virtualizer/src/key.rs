use core::fmt;

/// An opaque handle to one attached (or stored) turn.
///
/// The engine never inspects a handle; it only moves it between the live sequence and the
/// stored buffer and hands it back to the [`crate::Host`]. Handles are never duplicated: a
/// handle lives in exactly one of the two containers.
pub trait ItemHandle: Clone + PartialEq + fmt::Debug {}
impl<T: Clone + PartialEq + fmt::Debug> ItemHandle for T {}
