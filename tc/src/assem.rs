use crate::temp::{self, TempMap, Uuids};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Src(pub Vec<temp::Temp>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dst(pub Vec<temp::Temp>);

impl Dst {
    pub fn empty() -> Self {
        Dst(vec![])
    }
}

impl Src {
    pub fn empty() -> Self {
        Src(vec![])
    }
}

/// Abstract assembly, before registers are assigned.
///
/// Templates refer to operands positionally: `'S0` is the first source,
/// `'D0` the first destination, `'J0` the first jump target. `'L` in a
/// label template is the label itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    Oper {
        assem: String,
        // everything the instruction clobbers, even if the template never mentions it.
        dst: Dst,
        // everything the instruction depends on, even if the template never mentions it.
        src: Src,
        jump: Vec<temp::Label>,
    },
    Label {
        assem: String,
        lab: temp::Label,
    },
    Move {
        assem: String,
        dst: temp::Temp,
        src: temp::Temp,
    },
}

impl Instr {
    pub fn get_sources(&self) -> Vec<temp::Temp> {
        match self {
            Instr::Oper { src, .. } => src.0.clone(),
            Instr::Move { src, .. } => vec![*src],
            Instr::Label { .. } => vec![],
        }
    }

    pub fn get_dests(&self) -> Vec<temp::Temp> {
        match self {
            Instr::Oper { dst, .. } => dst.0.clone(),
            Instr::Move { dst, .. } => vec![*dst],
            Instr::Label { .. } => vec![],
        }
    }

    /// Fills in the template. Temps with an entry in `tm` print as that register,
    /// everything else prints as the temp itself.
    pub fn format(&self, tm: &TempMap, gen: &dyn Uuids) -> String {
        match self {
            Instr::Oper {
                assem,
                dst,
                src,
                jump,
            } => substitute(assem, &src.0, &dst.0, jump, tm, gen),
            Instr::Move { assem, dst, src } => substitute(assem, &[*src], &[*dst], &[], tm, gen),
            Instr::Label { assem, lab } => assem.replace("'L", &lab.debug_to_string(gen)),
        }
    }
}

fn substitute(
    assem: &str,
    src: &[temp::Temp],
    dst: &[temp::Temp],
    jump: &[temp::Label],
    tm: &TempMap,
    gen: &dyn Uuids,
) -> String {
    let mut out = String::with_capacity(assem.len());
    let mut chars = assem.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\'' {
            out.push(c);
            continue;
        }
        let kind = match chars.peek() {
            Some(&k) if matches!(k, 'S' | 'D' | 'J') => k,
            _ => {
                out.push(c);
                continue;
            }
        };
        chars.next();
        let mut digits = String::new();
        while let Some(d) = chars.peek().filter(|d| d.is_ascii_digit()) {
            digits.push(*d);
            chars.next();
        }
        let idx = match digits.parse::<usize>() {
            Ok(idx) => idx,
            Err(_) => {
                // not an operand reference after all.
                out.push(c);
                out.push(kind);
                continue;
            }
        };
        let operand = match kind {
            'S' => src.get(idx).map(|t| t.debug_to_string(tm)),
            'D' => dst.get(idx).map(|t| t.debug_to_string(tm)),
            _ => jump.get(idx).map(|l| l.debug_to_string(gen)),
        };
        match operand {
            Some(s) => out.push_str(&s),
            // keep the placeholder so the broken template is visible in the output.
            None => out.push_str(&format!("'{}{}", kind, idx)),
        }
    }
    out
}
