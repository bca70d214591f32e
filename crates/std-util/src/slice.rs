use rand::{seq::SliceRandom, thread_rng};
use std::{cmp::Ordering, collections::HashSet, hash::Hash};

pub trait SliceUtil {
    /// Returns `true` if the slice only contains unique values
    fn is_unique<T>(&self) -> bool
    where
        Self: AsRef<[T]>,
        T: Eq + Hash,
    {
        is_unique(self.as_ref())
    }

    /// Returns `true` if no element orders after its successor
    fn is_sorted_with<T>(&self, compare: impl FnMut(&T, &T) -> Ordering) -> bool
    where
        Self: AsRef<[T]>,
    {
        is_sorted_with(self.as_ref(), compare)
    }

    /// Shuffle the slice
    fn shuffle<T>(&mut self)
    where
        Self: AsMut<[T]>,
    {
        shuffle(self.as_mut())
    }
}

impl<T> SliceUtil for [T] {}

#[macro_export]
macro_rules! assert_unique {
    ($slice:expr) => {{
        use $crate::slice::SliceUtil;
        let slice = &$slice;
        assert!(
            slice.is_unique(),
            "expected `{}` to be unique, but it wasn't; actual={:?}",
            stringify!($slice),
            slice,
        );
    }};
}

#[macro_export]
macro_rules! assert_sorted {
    ($slice:expr) => {
        $crate::assert_sorted!($slice, |a, b| a.cmp(b))
    };
    ($slice:expr, $compare:expr) => {{
        use $crate::slice::SliceUtil;
        let slice = &$slice;
        assert!(
            slice.is_sorted_with($compare),
            "expected `{}` to be sorted; actual={:?}",
            stringify!($slice),
            slice,
        );
    }};
}

#[macro_export]
macro_rules! assert_empty {
    ($slice:expr) => {{
        match &$slice[..] {
            [] => {}
            actual => panic!("expected slice to be empty; actual={:?}", actual),
        }
    }};
}

pub fn is_unique<T: Eq + Hash>(slice: &[T]) -> bool {
    let mut s = HashSet::new();
    slice.iter().all(|el| s.insert(el))
}

pub fn is_sorted_with<T>(slice: &[T], mut compare: impl FnMut(&T, &T) -> Ordering) -> bool {
    slice
        .windows(2)
        .all(|pair| compare(&pair[0], &pair[1]) != Ordering::Greater)
}

pub fn shuffle<T>(slice: &mut [T]) {
    SliceRandom::shuffle(slice, &mut thread_rng());
}
