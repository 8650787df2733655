use itertools::Itertools;

use crate::{
    assem::{Dst, Instr, Src},
    frame::{Frame, Proc, ProcEntryExit, RegisterCatalog, Target},
    ir::{helpers::*, make_seq, IrExp, IrStm},
    temp::{self, Label, Uuids},
};

/// AT&T syntax x86-64 entry/exit code.
///
/// Every argument position has a home slot at `(1 + i) * word` above the
/// frame pointer, so a formal that arrives in a register but escapes is
/// spilled to its own slot rather than to a fresh local.
#[derive(Debug)]
pub struct X86_64<'a> {
    catalog: &'a RegisterCatalog,
    word_size: i64,
    stack_alignment: i64,
}

impl<'a> X86_64<'a> {
    pub fn new(target: &Target, catalog: &'a RegisterCatalog) -> Self {
        Self {
            catalog,
            word_size: target.word_size(),
            stack_alignment: target.stack_alignment(),
        }
    }

    fn reg(&self, t: temp::Temp) -> &str {
        // the catalog names every register this backend emits by itself.
        self.catalog.name_of(t).unwrap_or("<unbound>")
    }

    /// General callee-saved registers the body overwrites. A move of a register
    /// onto itself, which is what a coalesced save/restore pair turns into,
    /// does not count.
    fn written_callee_saves(&self, instrs: &[Instr]) -> Vec<temp::Temp> {
        let written = instrs
            .iter()
            .flat_map(|i| match i {
                Instr::Move { dst, src, .. } if dst == src => vec![],
                other => other.get_dests(),
            })
            .collect::<Vec<_>>();
        self.catalog
            .general_callee_saves()
            .filter(|c| written.contains(c))
            .collect()
    }

    /// Bytes to subtract from the stack pointer so that the locals fit and the
    /// stack is still aligned once `pushes` registers are pushed after it.
    fn frame_allocation(&self, frame: &Frame, pushes: usize) -> i64 {
        let pushed = pushes as i64 * self.word_size;
        let needed = frame.locals_size() + pushed;
        let aligned = (needed + self.stack_alignment - 1) / self.stack_alignment * self.stack_alignment;
        aligned - pushed
    }
}

impl<'a> ProcEntryExit for X86_64<'a> {
    fn proc_entry_exit1(&self, frame: &Frame, body: IrExp, gen: &mut dyn Uuids) -> IrStm {
        debug_assert_eq!(
            frame.register_formals(),
            self.catalog.args().len(),
            "frame {:?} was laid out for a different number of argument registers",
            frame.name()
        );
        let fp = IrExp::Temp(self.catalog.fp());
        let mut moves = Vec::new();

        // callee-saves go through fresh temps, so the register allocator can
        // either coalesce the moves away or spill them.
        let saved = self
            .catalog
            .general_callee_saves()
            .map(|c| (c, gen.new_unnamed_temp()))
            .collect::<Vec<_>>();
        for (c, t) in saved.iter() {
            moves.push(Move(IrExp::Temp(*t), IrExp::Temp(*c)));
        }

        // arguments past the register budget are already in their home slot.
        for (formal, arg) in frame.formals().iter().zip(self.catalog.args()) {
            moves.push(Move(formal.exp(fp.clone()), IrExp::Temp(*arg)));
        }

        moves.push(Move(IrExp::Temp(self.catalog.rv()), body));

        for (c, t) in saved.iter().rev() {
            moves.push(Move(IrExp::Temp(*c), IrExp::Temp(*t)));
        }
        make_seq(moves)
    }

    fn proc_entry_exit2(&self, instrs: &mut Vec<Instr>) {
        let live = self
            .catalog
            .special()
            .iter()
            .chain(self.catalog.callee_saves())
            .copied()
            .unique()
            .collect();
        instrs.push(Instr::Oper {
            assem: "".into(),
            src: Src(live),
            dst: Dst::empty(),
            jump: vec![],
        });
    }

    fn proc_entry_exit3(&self, frame: &Frame, instrs: Vec<Instr>, gen: &dyn Uuids) -> Proc {
        let name = frame.name().debug_to_string(gen);
        let fp = self.reg(self.catalog.fp());
        let sp = self.reg(self.catalog.sp());
        let pushes = self.written_callee_saves(&instrs);
        let allocation = self.frame_allocation(frame, pushes.len());

        let mut prologue = format!(
            "\t.globl {name}\n\t.type {name}, @function\n{name}:\n\tpushq %{fp}\n\tmovq %{sp}, %{fp}"
        );
        if allocation > 0 {
            prologue.push_str(&format!("\n\tsubq ${}, %{}", allocation, sp));
        }
        for r in pushes.iter() {
            prologue.push_str(&format!("\n\tpushq %{}", self.reg(*r)));
        }

        let mut epilogue = format!(".{}_epilogue:", name);
        for r in pushes.iter().rev() {
            epilogue.push_str(&format!("\n\tpopq %{}", self.reg(*r)));
        }
        epilogue.push_str("\n\tleave\n\tret");

        Proc {
            prologue,
            body: instrs,
            epilogue,
        }
    }

    fn string(&self, label: Label, val: &str, gen: &dyn Uuids) -> String {
        let mut escaped = String::with_capacity(val.len());
        for b in val.bytes() {
            match b {
                b'"' => escaped.push_str("\\\""),
                b'\\' => escaped.push_str("\\\\"),
                b'\n' => escaped.push_str("\\n"),
                b'\t' => escaped.push_str("\\t"),
                0x20..=0x7e => escaped.push(b as char),
                _ => escaped.push_str(&format!("\\{:03o}", b)),
            }
        }
        format!(
            "{}:\n\t.long {}\n\t.string \"{}\"",
            label.debug_to_string(gen),
            val.len(),
            escaped
        )
    }
}
