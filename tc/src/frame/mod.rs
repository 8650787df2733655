pub mod access;
pub mod frag;
pub mod registers;
pub mod target;
pub mod x86_64;

pub use access::{allocate_formals, Access};
pub use frag::{Frag, Fragments};
pub use registers::{RegisterCatalog, RegisterRole};
pub use target::{RegisterTable, Target};

use log::{debug, trace};

use crate::{
    assem::Instr,
    error::{FrameError, Result},
    ir::{helpers::*, IrExp, IrStm},
    temp::{Label, Uuids},
};

pub type Escapes = bool;

/// The activation record of one procedure.
///
/// Formals are placed once, when the frame is created. Afterwards the only
/// mutation is `alloc_local`, while the procedure body is being translated.
/// Frames are not synchronized: translate independent procedures on
/// different threads with their own frames and fragment collectors, sharing
/// only the [`RegisterCatalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    name: Label,
    formals: Vec<Access>,
    // number of escaping locals, i.e. frame slots below the frame pointer.
    num_locals: usize,
    word_size: i64,
    register_formals: usize,
}

impl Frame {
    pub fn new(name: Label, escapes: &[Escapes], target: &Target, gen: &mut dyn Uuids) -> Self {
        let formals = allocate_formals(escapes, target, gen);
        debug!(
            "new frame {:?}: {} formals, {} in registers",
            name,
            formals.len(),
            formals.iter().filter(|a| !a.is_in_frame()).count()
        );
        Self {
            name,
            formals,
            num_locals: 0,
            word_size: target.word_size(),
            register_formals: target.max_register_formals(),
        }
    }

    /// Like [`Frame::new`], but checks the escape flags against the number of
    /// formals the declaration has (static link included).
    pub fn for_declaration(
        name: Label,
        escapes: &[Escapes],
        arity: usize,
        target: &Target,
        gen: &mut dyn Uuids,
    ) -> Result<Self> {
        if escapes.len() != arity {
            return Err(FrameError::FormalCountMismatch {
                name: name.debug_to_string(gen),
                expected: arity,
                found: escapes.len(),
            });
        }
        Ok(Self::new(name, escapes, target, gen))
    }

    #[inline]
    pub fn name(&self) -> Label {
        self.name
    }

    pub fn formals(&self) -> &[Access] {
        &self.formals
    }

    /// Escaping locals get the next slot below the frame pointer; the others a
    /// fresh temporary, which leaves the frame size alone.
    pub fn alloc_local(&mut self, escapes: Escapes, gen: &mut dyn Uuids) -> Access {
        if escapes {
            self.num_locals += 1;
            let slot = access::local_slot(self.num_locals, self.word_size);
            trace!("{:?}: local slot {:?}", self.name, slot);
            slot
        } else {
            let t = gen.new_unnamed_temp();
            trace!("{:?}: local in {:?}", self.name, t);
            Access::InReg(t)
        }
    }

    #[inline]
    pub fn local_count(&self) -> usize {
        self.num_locals
    }

    #[inline]
    pub fn word_size(&self) -> i64 {
        self.word_size
    }

    /// The argument register budget the formals were laid out with.
    #[inline]
    pub fn register_formals(&self) -> usize {
        self.register_formals
    }

    /// Bytes taken by escaping locals.
    pub fn locals_size(&self) -> i64 {
        self.num_locals as i64 * self.word_size
    }
}

/// A call to a function that follows the C calling convention, e.g. the runtime.
pub fn external_call(name: Label, args: Vec<IrExp>) -> IrExp {
    Call(IrExp::Name(name), args)
}

/// A procedure after the last entry/exit step. The prologue and epilogue are
/// final assembly text; the body still refers to temporaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proc {
    pub prologue: String,
    pub body: Vec<Instr>,
    pub epilogue: String,
}

impl Proc {
    pub fn render(&self, catalog: &RegisterCatalog, gen: &dyn Uuids) -> String {
        let mut out = self.prologue.clone();
        for instr in self.body.iter() {
            let line = instr.format(catalog.temp_map(), gen);
            // the exit sink has no text.
            if line.is_empty() {
                continue;
            }
            out.push_str("\n\t");
            out.push_str(&line);
        }
        out.push('\n');
        out.push_str(&self.epilogue);
        out
    }
}

/// What a backend has to do to turn a translated body into a procedure that
/// honours the calling convention.
pub trait ProcEntryExit {
    /// The view shift. Moves every argument from where the caller put it to
    /// where the frame says the formal lives, evaluates `body` into the return
    /// value register, and keeps callee-saved registers intact.
    fn proc_entry_exit1(&self, frame: &Frame, body: IrExp, gen: &mut dyn Uuids) -> IrStm;

    /// Appends a sink instruction that keeps the special and callee-saved
    /// registers live at the end of the procedure.
    fn proc_entry_exit2(&self, instrs: &mut Vec<Instr>);

    /// Wraps the body in the prologue and epilogue.
    fn proc_entry_exit3(&self, frame: &Frame, instrs: Vec<Instr>, gen: &dyn Uuids) -> Proc;

    /// The data directives for a string literal.
    fn string(&self, label: Label, val: &str, gen: &dyn Uuids) -> String;
}
