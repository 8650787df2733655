use std::{
    collections::HashMap,
    fmt::{Debug, Display},
    hash::Hash,
    num::NonZeroUsize,
};

use crate::symbol::{Interner, Symbol};

// most temp are unnamed, only the registers are named.
// a named temp is its interned register name, so asking for "rbp" twice
// gives back the same temp without any extra bookkeeping.
#[derive(Eq, PartialEq, Copy, Clone, Hash)]
pub enum Temp {
    Named(Symbol),
    Unnamed(NonZeroUsize),
}

#[derive(Eq, PartialEq, Copy, Clone, Hash)]
pub enum Label {
    Named(Symbol),
    Unnamed(NonZeroUsize),
}

impl Temp {
    /// Formats the temp with its register name if it has one.
    pub fn debug_to_string(&self, tm: &TempMap) -> String {
        if let Some(s) = tm.get(self) {
            String::from(s)
        } else {
            format!("{}", self)
        }
    }
}

impl Label {
    pub fn debug_to_string(&self, gen: &dyn Uuids) -> String {
        match self {
            Label::Unnamed(id) => format!(".L{}", id),
            Label::Named(sym) => gen.resolve(sym).unwrap_or("<unknown>").to_string(),
        }
    }
}

/// The mapping of temporary to strings.
/// Used to give the temporaries that denote machine registers their assembly names.
#[derive(Debug, Default, Clone)]
pub struct TempMap(HashMap<Temp, String>);

impl TempMap {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn get(&self, t: &Temp) -> Option<&str> {
        self.0.get(t).map(String::as_str)
    }

    pub fn contains_key(&self, t: &Temp) -> bool {
        self.0.contains_key(t)
    }

    pub fn insert(&mut self, t: Temp, v: impl Into<String>) {
        self.0.insert(t, v.into());
    }
}

/// Source of fresh temporaries and labels.
///
/// There is no process-wide generator. Each compilation owns one and threads it
/// through as `&mut dyn Uuids`, so two compilations in one process never share ids.
pub trait Uuids {
    fn resolve(&self, s: &Symbol) -> Option<&str>;

    fn new_unnamed_temp(&mut self) -> Temp;

    // registers are temporaries too. the association from name to temp is
    // remembered by the interner, so the same name always yields the same temp.
    fn named_temp(&mut self, name: &str) -> Temp;

    fn new_unnamed_label(&mut self) -> Label;

    fn named_label(&mut self, s: &str) -> Label;
}

pub struct UuidsImpl {
    next_id: NonZeroUsize,
    pool: Interner,
}

impl UuidsImpl {
    pub fn new() -> Self {
        Self {
            next_id: NonZeroUsize::MIN,
            pool: Interner::new(),
        }
    }

    // temps and labels share the counter. running out of ids is fatal.
    fn next(&mut self) -> NonZeroUsize {
        let id = self.next_id;
        self.next_id = id
            .checked_add(1)
            .expect("temporary/label counter overflowed");
        id
    }
}

impl Default for UuidsImpl {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Temp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Temp::Named(s) => f.write_fmt(format_args!("named_tmp{}", s.to_usize())),
            Temp::Unnamed(id) => f.write_fmt(format_args!("t{}", id)),
        }
    }
}

impl Debug for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Named(s) => f.write_fmt(format_args!("named_label{}", s.to_usize())),
            Label::Unnamed(id) => f.write_fmt(format_args!(".L{}", id)),
        }
    }
}

impl Display for Temp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Temp::Named(sym) => write!(f, "nt_sym_{}", sym.to_usize()),
            Temp::Unnamed(id) => write!(f, "t{}", id),
        }
    }
}

impl Uuids for UuidsImpl {
    #[inline]
    fn resolve(&self, s: &Symbol) -> Option<&str> {
        self.pool.resolve(s)
    }

    fn named_temp(&mut self, name: &str) -> Temp {
        Temp::Named(self.pool.intern(name))
    }

    fn new_unnamed_temp(&mut self) -> Temp {
        Temp::Unnamed(self.next())
    }

    fn new_unnamed_label(&mut self) -> Label {
        Label::Unnamed(self.next())
    }

    fn named_label(&mut self, s: &str) -> Label {
        Label::Named(self.pool.intern(s))
    }
}

pub mod test_helpers {
    use super::*;

    pub fn new_unnamed_temp(s: usize) -> Temp {
        Temp::Unnamed(NonZeroUsize::new(s).expect("temp ids start at 1"))
    }

    pub fn new_unnamed_label(s: usize) -> Label {
        Label::Unnamed(NonZeroUsize::new(s).expect("label ids start at 1"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_temp_multiple_call_return_same() {
        let mut gen = UuidsImpl::new();
        let t1 = gen.named_temp("rax");
        let t2 = gen.named_temp("rax");
        assert_eq!(t1, t2);
        assert!(matches!(t1, Temp::Named(..)));
        assert_ne!(t1, gen.named_temp("rbx"));
    }

    #[test]
    fn unnamed_temps_are_fresh_and_increasing() {
        let mut gen = UuidsImpl::new();
        let a = gen.new_unnamed_temp();
        let l = gen.new_unnamed_label();
        let b = gen.new_unnamed_temp();
        assert_eq!(a, test_helpers::new_unnamed_temp(1));
        assert_eq!(l, test_helpers::new_unnamed_label(2));
        assert_eq!(b, test_helpers::new_unnamed_temp(3));
    }

    #[test]
    fn temp_map_falls_back_to_temp_name() {
        let mut gen = UuidsImpl::new();
        let rbp = gen.named_temp("rbp");
        let t = gen.new_unnamed_temp();
        let mut tm = TempMap::new();
        tm.insert(rbp, "rbp");
        assert_eq!("rbp", rbp.debug_to_string(&tm));
        assert_eq!("t1", t.debug_to_string(&tm));
    }

    #[test]
    fn label_to_string() {
        let mut gen = UuidsImpl::new();
        let main = gen.named_label("tigermain");
        let l = gen.new_unnamed_label();
        assert_eq!("tigermain", main.debug_to_string(&gen));
        assert_eq!(".L1", l.debug_to_string(&gen));
    }
}
