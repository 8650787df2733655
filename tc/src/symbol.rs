use string_interner::{DefaultBackend, DefaultSymbol, StringInterner};

/// Interned name of a label or a physical register.
#[derive(Eq, PartialEq, Hash, Copy, Clone, Debug)]
pub struct Symbol(DefaultSymbol);

impl Symbol {
    #[inline]
    pub fn to_usize(&self) -> usize {
        string_interner::Symbol::to_usize(self.0)
    }
}

pub struct Interner(StringInterner<DefaultBackend<DefaultSymbol>>);

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl Interner {
    pub fn new() -> Self {
        Interner(StringInterner::new())
    }

    #[inline]
    pub fn intern(&mut self, name: &str) -> Symbol {
        Symbol(self.0.get_or_intern(name))
    }

    #[inline]
    pub fn resolve(&self, s: &Symbol) -> Option<&str> {
        self.0.resolve(s.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_gives_back_existing_symbol() {
        let mut i = Interner::new();
        let s1 = i.intern("rbp");
        let s2 = i.intern("rbp");
        assert_eq!(s1, s2);
        assert_ne!(s1, i.intern("rsp"));
    }

    #[test]
    fn resolve_gives_back_name() {
        let mut i = Interner::new();
        let s = i.intern("rsp");
        assert_eq!(Some("rsp"), i.resolve(&s));
    }
}
