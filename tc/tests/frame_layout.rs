use std::collections::HashSet;

use tiger_frame::{
    frame::{
        target::MAX_WORD_SIZE, x86_64::X86_64, Access, Escapes, Frag, Fragments, Frame, ProcEntryExit, RegisterCatalog,
        Target,
    },
    ir::{helpers::*, IrBinop, IrExp, IrStm},
    FrameError, Uuids, UuidsImpl,
};

/// Every escape-flag combination of length `n`.
fn all_escapes(n: usize) -> impl Iterator<Item = Vec<Escapes>> {
    (0..1u32 << n).map(move |bits| (0..n).map(|i| bits & (1 << i) != 0).collect())
}

#[test]
fn formals_keep_order_and_register_budget() {
    let target = Target::x86_64();
    for n in 0..=9 {
        for escapes in all_escapes(n) {
            let mut gen = UuidsImpl::new();
            let name = gen.named_label("f");
            let frame = Frame::new(name, &escapes, &target, &mut gen);
            let formals = frame.formals();
            assert_eq!(n, formals.len());
            assert!(formals.iter().filter(|a| !a.is_in_frame()).count() <= 6);

            let mut offsets = HashSet::new();
            for (i, (access, escape)) in formals.iter().zip(escapes.iter()).enumerate() {
                let position = i as i64 + 1;
                match access {
                    Access::InReg(..) => {
                        assert!(!escape, "escaping formal {} in a register", position);
                        assert!(position <= 6);
                    }
                    Access::InFrame(offset) => {
                        assert!(*escape || position > 6);
                        assert_eq!((1 + position) * 8, *offset);
                        assert!(offsets.insert(*offset));
                    }
                }
            }
        }
    }
}

#[test]
fn two_non_escaping_formals_in_registers() {
    let mut gen = UuidsImpl::new();
    let name = gen.named_label("f");
    let frame = Frame::new(name, &[false, false], &Target::x86_64(), &mut gen);
    assert!(matches!(
        frame.formals(),
        [Access::InReg(a), Access::InReg(b)] if a != b
    ));
}

#[test]
fn locals_from_fresh_frame() {
    let mut gen = UuidsImpl::new();
    let name = gen.named_label("f");
    let mut frame = Frame::new(name, &[], &Target::x86_64(), &mut gen);
    assert!(frame.formals().is_empty());
    assert_eq!(0, frame.local_count());

    assert_eq!(Access::InFrame(-8), frame.alloc_local(true, &mut gen));
    assert_eq!(Access::InFrame(-16), frame.alloc_local(true, &mut gen));
    assert_eq!(2, frame.local_count());
    assert!(matches!(frame.alloc_local(false, &mut gen), Access::InReg(..)));
    assert_eq!(2, frame.local_count());
}

#[test]
fn escaping_local_offsets_are_unique_and_decreasing() {
    let mut gen = UuidsImpl::new();
    let name = gen.named_label("f");
    let mut frame = Frame::new(name, &[true], &Target::x86_64(), &mut gen);
    let mut last = 0;
    for i in 0..50 {
        match frame.alloc_local(i % 3 != 0, &mut gen) {
            Access::InFrame(offset) => {
                assert!(offset < last);
                assert_eq!(0, offset % 8);
                last = offset;
            }
            Access::InReg(..) => assert_eq!(0, i % 3),
        }
    }
    assert_eq!(-last / 8, frame.local_count() as i64);
}

#[test]
fn catalog_shape() {
    let mut gen = UuidsImpl::new();
    let target = Target::x86_64();
    let catalog = RegisterCatalog::new(&target, &mut gen);
    assert_eq!(target.max_register_formals(), catalog.args().len());

    let mut allowed: HashSet<_> = catalog.callee_saves().iter().copied().collect();
    allowed.insert(catalog.rv());
    assert!(catalog.special().iter().all(|t| allowed.contains(t)));
    assert!(catalog.caller_saves().contains(&catalog.rv()));
    assert!(catalog.special().contains(&catalog.rv()));
}

#[test]
fn catalog_follows_target() {
    let mut gen = UuidsImpl::new();
    let target = Target::x86_64()
        .with_argument_registers(["rdi", "rsi", "rdx"])
        .unwrap();
    let catalog = RegisterCatalog::new(&target, &mut gen);
    assert_eq!(3, catalog.args().len());

    let name = gen.named_label("f");
    let frame = Frame::new(name, &[false; 4], &target, &mut gen);
    assert_eq!(Access::InFrame(40), frame.formals()[3]);
}

#[test]
fn fragments_come_back_in_order() {
    let mut gen = UuidsImpl::new();
    let target = Target::x86_64();
    let mut fragments = Fragments::new();
    let mut labels = Vec::new();
    for i in 0..10 {
        let frag = if i % 3 == 0 {
            Frag::String(gen.new_unnamed_label(), "x".repeat(i))
        } else {
            let name = gen.named_label(&format!("p{}", i));
            Frag::Proc {
                body: Exp(IrExp::Const(i as i64)),
                frame: Frame::new(name, &[true], &target, &mut gen),
            }
        };
        labels.push(frag.label());
        fragments.push(frag);
    }
    let drained = fragments.drain();
    assert_eq!(labels, drained.iter().map(Frag::label).collect::<Vec<_>>());
}

#[test]
fn access_expressions() {
    let mut gen = UuidsImpl::new();
    let p = IrExp::Temp(gen.named_temp("rbp"));
    assert_eq!(
        IrExp::Mem(Box::new(IrExp::Binop(
            IrBinop::Plus,
            Box::new(p.clone()),
            Box::new(IrExp::Const(24))
        ))),
        Access::InFrame(24).exp(p.clone())
    );
    let t = gen.new_unnamed_temp();
    assert_eq!(IrExp::Temp(t), Access::InReg(t).exp(p));
}

#[test]
fn configuration_errors_fail_fast() {
    assert_eq!(
        Err(FrameError::InvalidWordSize(-4)),
        Target::x86_64().with_word_size(-4)
    );
    assert_eq!(
        Err(FrameError::NoArgumentRegisters),
        Target::x86_64().with_argument_registers(Vec::<&str>::new())
    );
    assert!(matches!(
        Target::x86_64().with_word_size(i64::MAX),
        Err(FrameError::WordSizeTooLarge { .. })
    ));

    let mut gen = UuidsImpl::new();
    let name = gen.named_label("f");
    assert!(matches!(
        Frame::for_declaration(name, &[true], 2, &Target::x86_64(), &mut gen),
        Err(FrameError::FormalCountMismatch {
            expected: 2,
            found: 1,
            ..
        })
    ));
}

#[test]
fn largest_word_size_lays_out_without_overflow() {
    let mut gen = UuidsImpl::new();
    let target = Target::x86_64().with_word_size(MAX_WORD_SIZE).unwrap();
    let name = gen.named_label("f");
    let mut frame = Frame::new(name, &[true; 9], &target, &mut gen);
    assert_eq!(Access::InFrame(10 * MAX_WORD_SIZE), frame.formals()[8]);
    assert_eq!(
        Access::InFrame(-MAX_WORD_SIZE),
        frame.alloc_local(true, &mut gen)
    );
}

#[test]
fn whole_procedure() {
    let mut gen = UuidsImpl::new();
    let target = Target::x86_64();
    let catalog = RegisterCatalog::new(&target, &mut gen);
    let backend = X86_64::new(&target, &catalog);

    let name = gen.named_label("fact");
    let mut frame = Frame::new(name, &[true, false], &target, &mut gen);
    let local = frame.alloc_local(true, &mut gen);
    let fp = IrExp::Temp(catalog.fp());
    let body = Eseq(
        Move(local.exp(fp.clone()), IrExp::Const(1)),
        local.exp(fp),
    );

    let shifted = backend.proc_entry_exit1(&frame, body, &mut gen);
    let stms = shifted.clone().flatten();
    // the escaping static link lands in its home slot.
    assert!(stms.contains(&Move(
        Mem(Binop(IrBinop::Plus, IrExp::Temp(catalog.fp()), IrExp::Const(16))),
        IrExp::Temp(catalog.args()[0])
    )));
    assert!(stms
        .iter()
        .any(|s| matches!(s, IrStm::Move(dst, _) if **dst == IrExp::Temp(catalog.rv()))));

    let mut fragments = Fragments::new();
    fragments.push(Frag::Proc {
        body: shifted,
        frame,
    });
    let frag = fragments.drain().pop().unwrap();
    let frame = match frag {
        Frag::Proc { frame, .. } => frame,
        Frag::String(..) => unreachable!(),
    };

    let mut instrs = Vec::new();
    backend.proc_entry_exit2(&mut instrs);
    let proc = backend.proc_entry_exit3(&frame, instrs, &gen);
    let text = proc.render(&catalog, &gen);
    assert!(text.starts_with("\t.globl fact\n"));
    assert!(text.contains("fact:\n\tpushq %rbp\n\tmovq %rsp, %rbp\n\tsubq $16, %rsp"));
    assert!(text.ends_with(".fact_epilogue:\n\tleave\n\tret"));
}
