//! Traits used by the methcov library.
//!

use crate::Position;

/// The [`GenomicPosition`] trait is implemented by single-base records
/// that sit at one position of one sequence (i.e. chromosome).
pub trait GenomicPosition {
    fn seqname(&self) -> &str;
    fn position(&self) -> Position;
}

/// The [`GenericRange`] trait defines common functionality for named
/// sequence ranges, such as catalog regions.
///
/// Unlike half-open BED ranges, these ranges are *inclusive* at both ends.
pub trait GenericRange {
    fn seqname(&self) -> &str;
    fn start(&self) -> Position;
    fn end(&self) -> Position;

    /// The number of basepairs covered, counting both ends.
    fn width(&self) -> Position {
        self.end().saturating_sub(self.start()) + 1
    }

    /// Whether `position` lies on this range's sequence, within
    /// `[start, end]`.
    fn contains<P: GenomicPosition>(&self, position: &P) -> bool {
        let pos = position.position();
        position.seqname() == self.seqname() && self.start() <= pos && pos <= self.end()
    }

    /// Return a tuple version of this range.
    fn as_tuple(&self) -> (&str, Position, Position) {
        (self.seqname(), self.start(), self.end())
    }
}
