//! Allowed-point set for one field.
//!
//! An [`Interval`] covers a fixed inclusive domain `[begin, end]` and records,
//! for every integer point in it, whether the schedule allows that point. The
//! nearest allowed neighbour of every point is precomputed when the interval
//! is sealed, so membership and both neighbour queries are O(1) lookups.

/// Queryable allowed/disallowed membership over one field's domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    begin: u32,
    end: u32,
    allowed: Vec<bool>,
    /// `next[i]`: smallest allowed point strictly greater than `begin + i`.
    next: Vec<Option<u32>>,
    /// `previous[i]`: largest allowed point strictly less than `begin + i`.
    previous: Vec<Option<u32>>,
}

impl Interval {
    /// An interval where every point of the domain is allowed.
    pub(crate) fn allowed(begin: u32, end: u32) -> Self {
        Self::from_points(begin, end, vec![true; Self::len_of(begin, end)])
    }

    pub(crate) fn from_points(begin: u32, end: u32, allowed: Vec<bool>) -> Self {
        let mut interval = Self {
            begin,
            end,
            allowed,
            next: Vec::new(),
            previous: Vec::new(),
        };
        interval.seal();
        interval
    }

    /// Callers pass field domains, where `begin <= end` always holds.
    fn len_of(begin: u32, end: u32) -> usize {
        end.saturating_sub(begin) as usize + 1
    }

    /// Rebuilds the neighbour tables from `allowed`.
    fn seal(&mut self) {
        let len = self.allowed.len();
        self.next = vec![None; len];
        self.previous = vec![None; len];

        let mut upcoming = None;
        for i in (0..len).rev() {
            self.next[i] = upcoming;
            if self.allowed[i] {
                upcoming = Some(self.begin + i as u32);
            }
        }

        let mut passed = None;
        for i in 0..len {
            self.previous[i] = passed;
            if self.allowed[i] {
                passed = Some(self.begin + i as u32);
            }
        }
    }

    pub fn begin(&self) -> u32 {
        self.begin
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    fn index(&self, point: i64) -> Option<usize> {
        if point < self.begin as i64 || point > self.end as i64 {
            None
        } else {
            Some((point - self.begin as i64) as usize)
        }
    }

    /// Whether `point` is allowed. Points outside the domain never are.
    pub fn is_allowed(&self, point: i64) -> bool {
        self.index(point).is_some_and(|i| self.allowed[i])
    }

    /// Smallest allowed point strictly greater than `point`.
    ///
    /// Points below the domain resolve to the first allowed point.
    pub fn next_allowed(&self, point: i64) -> Option<u32> {
        if point < self.begin as i64 {
            return self.first_allowed();
        }
        self.index(point).and_then(|i| self.next[i])
    }

    /// Largest allowed point strictly less than `point`.
    ///
    /// Points above the domain resolve to the last allowed point.
    pub fn previous_allowed(&self, point: i64) -> Option<u32> {
        if point > self.end as i64 {
            return self.last_allowed();
        }
        self.index(point).and_then(|i| self.previous[i])
    }

    pub fn first_allowed(&self) -> Option<u32> {
        if self.allowed[0] {
            Some(self.begin)
        } else {
            self.next[0]
        }
    }

    pub fn last_allowed(&self) -> Option<u32> {
        let last = self.allowed.len() - 1;
        if self.allowed[last] {
            Some(self.end)
        } else {
            self.previous[last]
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.allowed.iter().any(|&a| a)
    }

    /// `(point, allowed)` for every point of the domain, in order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, bool)> + '_ {
        (self.begin..=self.end).zip(self.allowed.iter().copied())
    }

    /// Allowed points only, in order.
    pub fn allowed_points(&self) -> impl Iterator<Item = u32> + '_ {
        self.iter().filter_map(|(p, a)| a.then_some(p))
    }
}
