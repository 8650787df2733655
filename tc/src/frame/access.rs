use crate::{
    frame::{target::Target, Escapes},
    ir::{helpers::*, IrBinop, IrExp},
    temp::{Temp, Uuids},
};

/// Where a formal or a local lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Access {
    // FP + offset
    InFrame(i64),
    // An abstract register
    InReg(Temp),
}

impl Access {
    /// The expression reading (or, under a `Move`, writing) the variable, given
    /// an expression for the frame pointer of the frame it lives in.
    pub fn exp(&self, fp: IrExp) -> IrExp {
        match self {
            Access::InFrame(offset) => Mem(Binop(IrBinop::Plus, fp, IrExp::Const(*offset))),
            Access::InReg(t) => IrExp::Temp(*t),
        }
    }

    #[inline]
    pub fn is_in_frame(&self) -> bool {
        matches!(self, Access::InFrame(..))
    }

    pub fn offset(&self) -> Option<i64> {
        match self {
            Access::InFrame(offset) => Some(*offset),
            Access::InReg(..) => None,
        }
    }
}

/// Decides where each formal lives, in declaration order.
///
/// Formal `i` (counting from 1, the static link being formal 1) gets a fresh
/// temporary if it does not escape and `i` is within the argument register
/// budget. Otherwise it lives at `(1 + i) * word` above the frame pointer: the
/// stack slot for position `i`, one word past the return address. Positions
/// are counted for every formal, register-resident or not.
pub fn allocate_formals(escapes: &[Escapes], target: &Target, gen: &mut dyn Uuids) -> Vec<Access> {
    let k = target.max_register_formals();
    let word = target.word_size();
    escapes
        .iter()
        .zip(1..)
        .map(|(escape, i)| {
            if i <= k && !*escape {
                Access::InReg(gen.new_unnamed_temp())
            } else {
                Access::InFrame((1 + i as i64) * word)
            }
        })
        .collect()
}

/// The slot of the `count`-th escaping local, `count` starting at 1.
#[inline]
pub(crate) fn local_slot(count: usize, word: i64) -> Access {
    Access::InFrame(-(count as i64) * word)
}
