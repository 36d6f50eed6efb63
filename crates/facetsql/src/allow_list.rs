//! Mapping of client-facing field names to physical column expressions.

use crate::ident::quote_ident;
use crate::value::Kind;
use std::borrow::Cow;

/// Resolves a logical field name to a SQL expression that is safe to
/// interpolate, or refuses it.
pub trait FieldResolver {
    fn resolve<'a>(&'a self, field: &str) -> Option<Cow<'a, str>>;

    /// Value kind compared against `field`; client values are converted to it
    /// before binding.
    fn kind(&self, _field: &str) -> Kind {
        Kind::Any
    }
}

#[derive(Debug, Clone, Copy)]
enum Entries {
    Untyped(&'static [(&'static str, &'static str)]),
    Typed(&'static [(&'static str, &'static str, Kind)]),
}

/// A fixed allow-list of `logical name -> physical expression` pairs.
///
/// Lists are usually declared as constants next to the statement they feed:
///
/// ```ignore
/// const SORTERS: AllowList = AllowList::new(&[
///     ("brand", "b.name"),
///     ("price", "p.price"),
/// ]);
///
/// const FILTERS: AllowList = AllowList::typed(&[
///     ("brand", "p.brand_id", Kind::Int),
///     ("price", "p.price", Kind::Float),
/// ]);
/// ```
///
/// Names that are not listed resolve to nothing; the caller drops the entry.
/// A typed list also fixes the value kind of every field, so a filter value
/// that cannot be converted is dropped instead of failing at bind time.
#[derive(Debug, Clone, Copy)]
pub struct AllowList {
    entries: Entries,
}

impl AllowList {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self {
            entries: Entries::Untyped(entries),
        }
    }

    pub const fn typed(entries: &'static [(&'static str, &'static str, Kind)]) -> Self {
        Self {
            entries: Entries::Typed(entries),
        }
    }

    fn entry(&self, field: &str) -> Option<(&'static str, Kind)> {
        match self.entries {
            Entries::Untyped(entries) => entries
                .iter()
                .find(|(name, _)| *name == field)
                .map(|(_, expr)| (*expr, Kind::Any)),
            Entries::Typed(entries) => entries
                .iter()
                .find(|(name, _, _)| *name == field)
                .map(|(_, expr, kind)| (*expr, *kind)),
        }
    }

    /// Physical expression for `field`, if it is exposed.
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.entry(field).map(|(expr, _)| expr)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entry(field).is_some()
    }

    /// Exposed logical names, in declaration order.
    pub fn names(&self) -> Box<dyn Iterator<Item = &'static str>> {
        match self.entries {
            Entries::Untyped(entries) => Box::new(entries.iter().map(|(name, _)| *name)),
            Entries::Typed(entries) => Box::new(entries.iter().map(|(name, _, _)| *name)),
        }
    }
}

impl FieldResolver for AllowList {
    fn resolve<'a>(&'a self, field: &str) -> Option<Cow<'a, str>> {
        self.get(field).map(Cow::Borrowed)
    }

    fn kind(&self, field: &str) -> Kind {
        self.entry(field).map_or(Kind::Any, |(_, kind)| kind)
    }
}

/// Accepts every field and quotes it as an identifier.
///
/// For callers that expose a whole table and have no per-column mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuotedIdent;

impl FieldResolver for QuotedIdent {
    fn resolve<'a>(&'a self, field: &str) -> Option<Cow<'a, str>> {
        Some(Cow::Owned(quote_ident(field)))
    }
}

impl<R: FieldResolver + ?Sized> FieldResolver for &R {
    fn resolve<'a>(&'a self, field: &str) -> Option<Cow<'a, str>> {
        (**self).resolve(field)
    }

    fn kind(&self, field: &str) -> Kind {
        (**self).kind(field)
    }
}
