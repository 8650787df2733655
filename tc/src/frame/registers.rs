use itertools::Itertools;
use log::debug;
use strum_macros::{Display, EnumIter};

use crate::{
    frame::target::Target,
    temp::{Temp, TempMap, Uuids},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum RegisterRole {
    #[strum(serialize = "special")]
    Special,
    #[strum(serialize = "argument")]
    Argument,
    #[strum(serialize = "callee-saved")]
    CalleeSaved,
    #[strum(serialize = "caller-saved")]
    CallerSaved,
}

/// The physical registers of a target, grouped by calling-convention role.
///
/// Built once per compilation from a [`Target`] and only read afterwards, so
/// concurrent compilations can share one by reference.
#[derive(Debug, Clone)]
pub struct RegisterCatalog {
    fp: Temp,
    sp: Temp,
    rv: Temp,
    special: Vec<Temp>,
    args: Vec<Temp>,
    callee_saves: Vec<Temp>,
    caller_saves: Vec<Temp>,
    names: TempMap,
}

impl RegisterCatalog {
    pub fn new(target: &Target, gen: &mut dyn Uuids) -> Self {
        let table = target.registers();
        let mut names = TempMap::new();
        let mut bind = |name: &str| {
            let t = gen.named_temp(name);
            names.insert(t, name);
            t
        };

        let fp = bind(&table.frame_pointer);
        let sp = bind(&table.stack_pointer);
        let rv = bind(&table.return_value);
        let args = table.arguments.iter().map(|r| bind(r)).collect::<Vec<_>>();
        let general_callee_saves = table.callee_saved.iter().map(|r| bind(r)).collect::<Vec<_>>();
        let scratch = table.scratch.iter().map(|r| bind(r)).collect::<Vec<_>>();

        let callee_saves = [sp, fp]
            .into_iter()
            .chain(general_callee_saves)
            .collect::<Vec<_>>();
        let caller_saves = [rv]
            .into_iter()
            .chain(scratch)
            .chain(args.iter().copied())
            .collect::<Vec<_>>();

        debug!(
            "register catalog: {} argument, {} callee-saved, {} caller-saved registers",
            args.len(),
            callee_saves.len(),
            caller_saves.len()
        );

        Self {
            fp,
            sp,
            rv,
            special: vec![fp, sp, rv],
            args,
            callee_saves,
            caller_saves,
            names,
        }
    }

    #[inline]
    pub fn fp(&self) -> Temp {
        self.fp
    }

    #[inline]
    pub fn sp(&self) -> Temp {
        self.sp
    }

    #[inline]
    pub fn rv(&self) -> Temp {
        self.rv
    }

    /// Frame pointer, stack pointer, return value.
    pub fn special(&self) -> &[Temp] {
        &self.special
    }

    /// Argument registers in calling order.
    pub fn args(&self) -> &[Temp] {
        &self.args
    }

    /// Stack pointer and frame pointer first, then the general callee-saved registers.
    pub fn callee_saves(&self) -> &[Temp] {
        &self.callee_saves
    }

    /// The callee-saved registers a procedure body may actually use, i.e.
    /// without the stack and frame pointer.
    pub fn general_callee_saves(&self) -> impl Iterator<Item = Temp> + '_ {
        self.callee_saves
            .iter()
            .copied()
            .filter(move |t| *t != self.sp && *t != self.fp)
    }

    /// Return value, scratch registers, then the argument registers.
    pub fn caller_saves(&self) -> &[Temp] {
        &self.caller_saves
    }

    /// Caller-saved followed by callee-saved. Not deduplicated.
    pub fn all_registers(&self) -> Vec<Temp> {
        self.caller_saves
            .iter()
            .chain(self.callee_saves.iter())
            .copied()
            .collect()
    }

    /// Every physical register once, in `all_registers` order.
    pub fn unique_registers(&self) -> Vec<Temp> {
        self.all_registers().into_iter().unique().collect()
    }

    /// The canonical name of `t`, if `t` is a physical register of this target.
    pub fn name_of(&self, t: Temp) -> Option<&str> {
        self.names.get(&t)
    }

    /// The register name, or the temp's own name if it is not a register.
    pub fn display(&self, t: Temp) -> String {
        t.debug_to_string(&self.names)
    }

    #[inline]
    pub fn is_physical(&self, t: Temp) -> bool {
        self.names.contains_key(&t)
    }

    pub fn temp_map(&self) -> &TempMap {
        &self.names
    }

    /// All roles `t` plays. The return value register is both special and caller-saved.
    pub fn roles_of(&self, t: Temp) -> Vec<RegisterRole> {
        let mut roles = Vec::new();
        if self.special.contains(&t) {
            roles.push(RegisterRole::Special);
        }
        if self.args.contains(&t) {
            roles.push(RegisterRole::Argument);
        }
        if self.callee_saves.contains(&t) {
            roles.push(RegisterRole::CalleeSaved);
        }
        if self.caller_saves.contains(&t) {
            roles.push(RegisterRole::CallerSaved);
        }
        roles
    }

    pub fn by_role(&self, role: RegisterRole) -> &[Temp] {
        match role {
            RegisterRole::Special => self.special(),
            RegisterRole::Argument => self.args(),
            RegisterRole::CalleeSaved => self.callee_saves(),
            RegisterRole::CallerSaved => self.caller_saves(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use strum::IntoEnumIterator;

    use super::*;
    use crate::temp::UuidsImpl;

    fn catalog() -> (RegisterCatalog, UuidsImpl) {
        let mut gen = UuidsImpl::new();
        let c = RegisterCatalog::new(&Target::x86_64(), &mut gen);
        (c, gen)
    }

    fn names(c: &RegisterCatalog, ts: &[Temp]) -> Vec<String> {
        ts.iter()
            .map(|t| c.name_of(*t).unwrap().to_string())
            .collect()
    }

    #[test]
    fn argument_registers_in_calling_order() {
        let (c, _) = catalog();
        assert_eq!(
            vec!["rdi", "rsi", "rdx", "rcx", "r8", "r9"],
            names(&c, c.args())
        );
    }

    #[test]
    fn categories() {
        let (c, _) = catalog();
        assert_eq!(vec!["rbp", "rsp", "rax"], names(&c, c.special()));
        assert_eq!(
            vec!["rsp", "rbp", "rbx", "r12", "r13", "r14", "r15"],
            names(&c, c.callee_saves())
        );
        assert_eq!(
            vec!["rax", "r10", "r11", "rdi", "rsi", "rdx", "rcx", "r8", "r9"],
            names(&c, c.caller_saves())
        );
        assert_eq!(
            c.caller_saves().len() + c.callee_saves().len(),
            c.all_registers().len()
        );
        assert_eq!(16, c.unique_registers().len());
    }

    #[test]
    fn special_is_subset_of_callee_saved_and_rv() {
        let (c, _) = catalog();
        let allowed: HashSet<Temp> = c
            .callee_saves()
            .iter()
            .copied()
            .chain([c.rv()])
            .collect();
        assert!(c.special().iter().all(|t| allowed.contains(t)));
    }

    #[test]
    fn return_value_is_dual_classified() {
        let (c, _) = catalog();
        assert_eq!(
            vec![RegisterRole::Special, RegisterRole::CallerSaved],
            c.roles_of(c.rv())
        );
        assert_eq!("caller-saved", RegisterRole::CallerSaved.to_string());
    }

    #[test]
    fn caller_and_callee_saves_are_disjoint() {
        let (c, _) = catalog();
        let callee: HashSet<_> = c.callee_saves().iter().collect();
        let both: Vec<_> = c
            .caller_saves()
            .iter()
            .filter(|t| callee.contains(t))
            .collect();
        assert!(both.is_empty());
    }

    #[test]
    fn name_of_unbound_temp() {
        let (c, mut gen) = catalog();
        let t = gen.new_unnamed_temp();
        assert_eq!(None, c.name_of(t));
        assert!(!c.is_physical(t));
        assert_eq!("t1", c.display(t));
        assert_eq!("rax", c.display(c.rv()));
        assert_eq!(Some("rbp"), c.name_of(c.fp()));
        assert_eq!(Some("rsp"), c.name_of(c.sp()));
    }

    #[test]
    fn same_registers_for_second_catalog_on_same_generator() {
        let mut gen = UuidsImpl::new();
        let a = RegisterCatalog::new(&Target::x86_64(), &mut gen);
        let b = RegisterCatalog::new(&Target::x86_64(), &mut gen);
        assert_eq!(a.all_registers(), b.all_registers());
    }

    #[test]
    fn general_callee_saves_skip_pointers() {
        let (c, _) = catalog();
        let general: Vec<Temp> = c.general_callee_saves().collect();
        assert_eq!(vec!["rbx", "r12", "r13", "r14", "r15"], names(&c, &general));
    }

    #[test]
    fn by_role_covers_every_role() {
        let (c, _) = catalog();
        for role in RegisterRole::iter() {
            assert!(!c.by_role(role).is_empty(), "{} is empty", role);
            for t in c.by_role(role) {
                assert!(c.roles_of(*t).contains(&role));
            }
        }
    }
}
