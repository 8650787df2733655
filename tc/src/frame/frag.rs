use log::trace;

use crate::{frame::Frame, ir::IrStm, temp::Label};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frag {
    Proc {
        // the output of proc_entry_exit1
        body: IrStm,
        // the frame is frozen once it is attached to its body.
        frame: Frame,
    },
    // represents static strings
    String(Label, String),
}

impl Frag {
    pub fn label(&self) -> Label {
        match self {
            Frag::Proc { frame, .. } => frame.name(),
            Frag::String(label, _) => *label,
        }
    }
}

/// Everything the translator produced for one compilation, in the order it was
/// produced. Emission walks it front to back, so the output is reproducible.
#[derive(Debug, Default)]
pub struct Fragments(Vec<Frag>);

impl Fragments {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, frag: Frag) {
        trace!("fragment #{}: {:?}", self.0.len(), frag.label());
        self.0.push(frag);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Frag> {
        self.0.iter()
    }

    /// Hands every fragment over in insertion order and leaves the collector empty.
    pub fn drain(&mut self) -> Vec<Frag> {
        std::mem::take(&mut self.0)
    }
}

impl IntoIterator for Fragments {
    type Item = Frag;
    type IntoIter = std::vec::IntoIter<Frag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Fragments {
    type Item = &'a Frag;
    type IntoIter = std::slice::Iter<'a, Frag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
