use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

/// A lazy arithmetic progression.
///
/// `end` of `None` makes the range unbounded; such ranges are constructible
/// and iterable, but any operation that must observe their length reports a
/// domain error instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RangeValue {
    pub start:     BigInt,
    pub end:       Option<BigInt>,
    pub inclusive: bool,
    pub step:      BigInt,
}

impl RangeValue {
    /// A range as written with `..`/`..=`, stepping towards the end.
    ///
    /// `5..1` counts down; the step is inferred from the endpoints.
    #[must_use]
    pub fn new(start: BigInt, end: Option<BigInt>, inclusive: bool) -> Self {
        let step = match &end {
            Some(end) if *end < start => -BigInt::one(),
            _ => BigInt::one(),
        };

        Self { start, end, inclusive, step }
    }

    /// A range with an explicit step, as built by `range(start, end, step)`.
    /// Callers must reject a zero step.
    #[must_use]
    pub const fn with_step(start: BigInt, end: BigInt, inclusive: bool, step: BigInt) -> Self {
        Self { start, end: Some(end), inclusive, step }
    }

    /// Whether the step matches what [`RangeValue::new`] would infer, i.e.
    /// whether the range is expressible in `..`/`..=` syntax.
    #[must_use]
    pub fn has_inferred_step(&self) -> bool {
        let inferred = match &self.end {
            Some(end) if *end < self.start => -BigInt::one(),
            _ => BigInt::one(),
        };
        self.step == inferred
    }

    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.end.is_none()
    }

    /// The number of elements, or `None` for an unbounded range.
    #[must_use]
    pub fn len(&self) -> Option<BigInt> {
        let end = self.end.as_ref()?;

        // Mirror a descending range so only the ascending case remains.
        let (span, step) = if self.step.is_negative() {
            (&self.start - end, -&self.step)
        } else {
            (end - &self.start, self.step.clone())
        };

        if span.is_negative() {
            return Some(BigInt::zero());
        }
        if self.inclusive {
            return Some(&span / &step + 1);
        }
        // Exclusive: count strictly-before-end steps.
        Some((&span + &step - 1) / &step)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len().is_some_and(|len| len.is_zero())
    }

    #[must_use]
    pub fn iter(&self) -> RangeIter {
        RangeIter { next:      self.start.clone(),
                    end:       self.end.clone(),
                    inclusive: self.inclusive,
                    step:      self.step.clone() }
    }
}

/// Iterates a [`RangeValue`]; never terminates for unbounded ranges.
#[derive(Debug, Clone)]
pub struct RangeIter {
    next:      BigInt,
    end:       Option<BigInt>,
    inclusive: bool,
    step:      BigInt,
}

impl RangeIter {
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.end.is_none()
    }
}

impl Iterator for RangeIter {
    type Item = BigInt;

    fn next(&mut self) -> Option<BigInt> {
        if let Some(end) = &self.end {
            let within = match (self.step.is_negative(), self.inclusive) {
                (false, true) => self.next <= *end,
                (false, false) => self.next < *end,
                (true, true) => self.next >= *end,
                (true, false) => self.next > *end,
            };
            if !within {
                return None;
            }
        }

        let current = self.next.clone();
        self.next += &self.step;
        Some(current)
    }
}
