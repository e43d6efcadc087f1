//! Driving a [`Progress`] across a collection.
//!
//! [`iterate`] walks any [`Collection`], timing the per-item callback and writing one status
//! line per item to a caller-supplied sink:
//!
//! ```text
//! [038/1000, 004%, t/i: 500.00ms, ETA: 08m:01.00s] Working on product 38
//! ```
//!
//! [`each`] and [`find_each`] label items through their `Display` impl. [`iterate`] takes a
//! labelling closure instead, along with a [`ProgressBuilder`] for sample settings and
//! rendering.
//!
//! # Heuristics
//!
//! The tracker variant follows [`Collection::count`]:
//! * If the collection reports a count, a **limited** tracker is created with that total.
//! * Otherwise an **unlimited** tracker is used.
//!
//! [`IterCollection`] adapts a plain [`Iterator`], taking its count from an exact
//! [`Iterator::size_hint`].

use std::{fmt, io::Write, ops::ControlFlow};

use compact_str::{CompactString, format_compact};

use crate::{
    builder::ProgressBuilder,
    error::{Error, Result},
    progress::Progress,
};

/// Named ways of walking a collection.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Method {
    /// Plain item-by-item iteration.
    Each,
    /// Iteration that fetches items in batches behind the scenes, e.g. from a database.
    FindEach,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Each => "each",
            Self::FindEach => "find_each",
        })
    }
}

/// A source of items that [`iterate`] can walk.
pub trait Collection {
    /// The items yielded.
    type Item;

    /// Whether items can be walked with `method`.
    fn supports(&self, method: Method) -> bool;

    /// Number of items, if known up front.
    fn count(&self) -> Option<u64> {
        None
    }

    /// Feeds every item to `visit` using `method`, stopping early on [`ControlFlow::Break`].
    ///
    /// Only called after [`supports`](Self::supports) returned `true` for `method`.
    fn walk(&mut self, method: Method, visit: &mut dyn FnMut(Self::Item) -> ControlFlow<()>);
}

/// [`Collection`] over a plain iterator. Supports [`Method::Each`] only.
pub struct IterCollection<I> {
    iter: I,
}

impl<I> IterCollection<I> {
    /// Creates a new `IterCollection`.
    ///
    /// Note: This is usually constructed via [`ProgressIteratorExt::into_collection`].
    pub const fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<I: Iterator> Collection for IterCollection<I> {
    type Item = I::Item;

    fn supports(&self, method: Method) -> bool {
        method == Method::Each
    }

    fn count(&self) -> Option<u64> {
        self.iter.count_from_size_hint()
    }

    fn walk(&mut self, _method: Method, visit: &mut dyn FnMut(Self::Item) -> ControlFlow<()>) {
        for item in self.iter.by_ref() {
            if visit(item).is_break() {
                break;
            }
        }
    }
}

/// Extension trait to use any Iterator as a [`Collection`].
pub trait ProgressIteratorExt: Sized {
    /// Wraps the iterator in an [`IterCollection`].
    fn into_collection(self) -> IterCollection<Self>;

    /// Internal helper to determine the total from `size_hint`.
    fn count_from_size_hint(&self) -> Option<u64>;
}

impl<I: Iterator> ProgressIteratorExt for I {
    fn into_collection(self) -> IterCollection<Self> {
        IterCollection::new(self)
    }

    fn count_from_size_hint(&self) -> Option<u64> {
        let (lower, upper) = self.size_hint();
        // Only an exact size is trusted as a total.
        match upper {
            Some(u) if u == lower => Some(u as u64),
            _ => None,
        }
    }
}

/// Walks `collection` with `method`, timing `work` for every item.
///
/// The tracker is built from `builder`, so sample settings and a custom formatter carry over.
/// Its total is replaced by [`Collection::count`]. Before each item,
/// `[<progress>] Working on <label>` is written to `sink`, where `<label>` is what `label`
/// returns for the item. `work` receives the item and its zero-based index.
///
/// # Errors
///
/// * [`Error::UnsupportedCollection`] if `collection` cannot be walked with `method`. Nothing
///   is written in that case.
/// * [`Error::InvalidConfiguration`] if the builder's sample settings are invalid.
/// * [`Error::Io`] if writing to `sink` fails; iteration stops at that item.
pub fn iterate<C, W, L, D, F>(
    method: Method,
    mut collection: C,
    sink: &mut W,
    builder: ProgressBuilder,
    mut label: L,
    mut work: F,
) -> Result<Progress>
where
    C: Collection,
    W: Write + ?Sized,
    L: FnMut(&C::Item) -> D,
    D: fmt::Display,
    F: FnMut(C::Item, usize),
{
    if !collection.supports(method) {
        return Err(Error::UnsupportedCollection(method));
    }

    let mut progress = builder.with_total_count(collection.count()).build()?;
    let mut index = 0;
    let mut failure = None;

    collection.walk(method, &mut |item| {
        let text = label(&item);
        let outcome = progress.try_run(|state| {
            writeln!(sink, "[{state}] Working on {text}")?;
            work(item, index);
            Ok::<_, std::io::Error>(())
        });
        index += 1;

        match outcome {
            Ok(()) => ControlFlow::Continue(()),
            Err(err) => {
                failure = Some(err);
                ControlFlow::Break(())
            }
        }
    });

    match failure {
        Some(err) => Err(err.into()),
        None => Ok(progress),
    }
}

/// [`iterate`] with [`Method::Each`], default settings and items labelled by `Display`.
///
/// # Errors
///
/// See [`iterate`].
pub fn each<C, W, F>(collection: C, sink: &mut W, work: F) -> Result<Progress>
where
    C: Collection,
    C::Item: fmt::Display,
    W: Write + ?Sized,
    F: FnMut(C::Item, usize),
{
    iterate_displayed(Method::Each, collection, sink, work)
}

/// [`iterate`] with [`Method::FindEach`], default settings and items labelled by `Display`.
///
/// # Errors
///
/// See [`iterate`].
pub fn find_each<C, W, F>(collection: C, sink: &mut W, work: F) -> Result<Progress>
where
    C: Collection,
    C::Item: fmt::Display,
    W: Write + ?Sized,
    F: FnMut(C::Item, usize),
{
    iterate_displayed(Method::FindEach, collection, sink, work)
}

fn iterate_displayed<C, W, F>(
    method: Method,
    collection: C,
    sink: &mut W,
    work: F,
) -> Result<Progress>
where
    C: Collection,
    C::Item: fmt::Display,
    W: Write + ?Sized,
    F: FnMut(C::Item, usize),
{
    let builder = ProgressBuilder::default();
    iterate(method, collection, sink, builder, display_label, work)
}

fn display_label<T: fmt::Display>(item: &T) -> CompactString {
    format_compact!("{item}")
}

#[cfg(test)]
mod tests {
    use std::{io, ops::ControlFlow};

    use super::{Collection, Method, ProgressIteratorExt as _, each, find_each, iterate};
    use crate::{Error, ProgressBuilder, Sequence, Tracker};

    /// Yields `"test"` a fixed number of times through `find_each`.
    struct Batched {
        remaining: usize,
        counted: bool,
    }

    impl Collection for Batched {
        type Item = &'static str;

        fn supports(&self, method: Method) -> bool {
            method == Method::FindEach
        }

        fn count(&self) -> Option<u64> {
            self.counted.then_some(self.remaining as u64)
        }

        fn walk(
            &mut self,
            _method: Method,
            visit: &mut dyn FnMut(&'static str) -> ControlFlow<()>,
        ) {
            while self.remaining > 0 {
                self.remaining -= 1;
                if visit("test").is_break() {
                    break;
                }
            }
        }
    }

    fn lines(sink: &[u8]) -> Vec<String> {
        String::from_utf8(sink.to_vec())
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    /// Counted Collection
    /// A known count selects the limited tracker and indexes start at zero.
    #[test]
    fn test_iterate_with_count() {
        let mut sink: Vec<u8> = Vec::new();
        let mut results = Vec::new();

        let progress = find_each(
            Batched {
                remaining: 3,
                counted: true,
            },
            &mut sink,
            |item, i| results.push((item, i)),
        )
        .unwrap();

        assert_eq!(results, vec![("test", 0), ("test", 1), ("test", 2)]);
        assert!(matches!(progress.tracker(), Tracker::Limited(_)));
        assert_eq!(progress.current(), 3);

        let lines = lines(&sink);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("[0/3, 000%, t/i: ?s, ETA: ?s]"));
        assert!(lines[2].starts_with("[2/3, 067%"));
        assert!(lines.iter().all(|line| line.ends_with("] Working on test")));
    }

    /// Uncounted Collection
    #[test]
    fn test_iterate_without_count() {
        let mut sink: Vec<u8> = Vec::new();
        let mut results = Vec::new();

        let progress = find_each(
            Batched {
                remaining: 2,
                counted: false,
            },
            &mut sink,
            |item, i| results.push((item, i)),
        )
        .unwrap();

        assert_eq!(results, vec![("test", 0), ("test", 1)]);
        assert!(matches!(progress.tracker(), Tracker::Unlimited(_)));

        let lines = lines(&sink);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("[1, t: "));
        assert!(lines[1].starts_with("[2, t: "));
    }

    /// Unsupported Method
    /// Fails before anything is written or called.
    #[test]
    fn test_iterate_unsupported() {
        let mut sink: Vec<u8> = Vec::new();

        let result = each(
            Batched {
                remaining: 2,
                counted: true,
            },
            &mut sink,
            |_, _| panic!("shouldn't be called"),
        );
        assert!(matches!(
            result,
            Err(Error::UnsupportedCollection(Method::Each))
        ));

        let numbers = vec![1, 2].into_iter().into_collection();
        let result = find_each(numbers, &mut sink, |_, _| panic!("shouldn't be called"));
        assert!(matches!(
            result,
            Err(Error::UnsupportedCollection(Method::FindEach))
        ));
        assert!(sink.is_empty());
    }

    /// Iterator Integration
    /// The total is inferred from an exact size hint.
    #[test]
    fn test_iterator_collection() {
        let mut sink: Vec<u8> = Vec::new();
        let mut seen = Vec::new();

        let numbers = vec![10usize, 20, 30].into_iter().into_collection();
        let progress = each(numbers, &mut sink, |n, i| seen.push(n + i)).unwrap();

        assert_eq!(seen, vec![10, 21, 32]);
        assert_eq!(progress.tracker().total_count(), Some(3));

        let filtered = (0..10).filter(|n| n % 2 == 0).into_collection();
        assert_eq!(filtered.count(), None);
    }

    /// Sink Failure
    /// A failing sink stops iteration and surfaces as an I/O error.
    #[test]
    fn test_iterate_sink_failure() {
        struct Broken;

        impl io::Write for Broken {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("closed"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut calls = 0;
        let result = each((0..5).into_collection(), &mut Broken, |_, _| calls += 1);

        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(calls, 0);
    }

    /// Item Labels
    /// Items without a `Display` impl are described by the label closure.
    #[test]
    fn test_iterate_custom_label() {
        struct Product {
            id: u32,
        }

        let mut sink: Vec<u8> = Vec::new();
        let mut ids = Vec::new();
        let products = vec![Product { id: 7 }, Product { id: 9 }].into_iter();

        let progress = iterate(
            Method::Each,
            products.into_collection(),
            &mut sink,
            ProgressBuilder::default(),
            |product| format!("product {}", product.id),
            |product, i| ids.push((product.id, i)),
        )
        .unwrap();

        assert_eq!(ids, vec![(7, 0), (9, 1)]);
        assert_eq!(progress.current(), 2);

        let lines = lines(&sink);
        assert!(lines[0].starts_with("[0/2, 000%"));
        assert!(lines[0].ends_with("] Working on product 7"));
        assert!(lines[1].ends_with("] Working on product 9"));
    }

    /// Builder Passthrough
    /// Sample settings and a custom formatter reach the tracker that drives the walk.
    #[test]
    fn test_iterate_custom_formatter() {
        let mut sink: Vec<u8> = Vec::new();
        let builder = ProgressBuilder::default()
            .with_formatter(|s| format!("{} done", s.current()))
            .with_min_samples(2)
            .with_max_samples(5);
        let batched = Batched {
            remaining: 3,
            counted: true,
        };

        let progress = iterate(
            Method::FindEach,
            batched,
            &mut sink,
            builder,
            |item| *item,
            |_, _| (),
        )
        .unwrap();

        assert_eq!(
            lines(&sink),
            vec![
                "[0 done] Working on test",
                "[1 done] Working on test",
                "[2 done] Working on test",
            ]
        );
        assert_eq!(progress.tracker().total_count(), Some(3));
        assert_eq!(progress.tracker().max_samples(), 3);
        assert_eq!(progress.to_string(), "3 done");
    }
}
