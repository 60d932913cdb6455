use num_traits::int::PrimInt;
use num_traits::{FromPrimitive, ToPrimitive};

pub use index_derive::IndexBase;

/// Integer newtype usable as a typed index, derivable with `#[derive(IndexBase)]`
pub trait IndexBase {
    type Type: PrimInt + ToPrimitive + FromPrimitive;

    /// Wrapped integer
    fn get(&self) -> Self::Type;
}

/// Typed index convertible to and from its integer
pub trait Index:
    IndexBase
    + Copy
    + From<<Self as IndexBase>::Type>
    + Into<<Self as IndexBase>::Type>
    + PartialEq
{
    /// All indices below `bound`, ascending
    fn range(bound: <Self as IndexBase>::Type) -> Range<Self> {
        Range {next: num_traits::zero(), end: bound}
    }

    /// Position in an untyped container
    ///
    /// Negative or oversized values map to `usize::MAX`, which no container
    /// accepts as a position.
    fn as_usize(&self) -> usize {
        self.get().to_usize().unwrap_or(usize::MAX)
    }

    /// Element of a slice at this index, if in bounds
    fn of<'a, T>(&self, slice: &'a [T]) -> Option<&'a T> {
        slice.get(self.as_usize())
    }
}

impl<T> Index for T where T: IndexBase
    + Copy
    + From<<Self as IndexBase>::Type>
    + Into<<Self as IndexBase>::Type>
    + PartialEq
{}

/// Ascending range of typed indices
pub struct Range<I: Index> {
    next: <I as IndexBase>::Type,
    end: <I as IndexBase>::Type,
}

impl<I: Index> Iterator for Range<I> {
    type Item = I;

    fn next(&mut self) -> Option<I> {
        if self.next >= self.end {
            return None;
        }
        let value = self.next;
        self.next = value + num_traits::one();
        Some(I::from(value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.next < self.end {
            (self.end - self.next).to_usize().unwrap_or(usize::MAX)
        } else {
            0
        };
        (remaining, Some(remaining))
    }
}
