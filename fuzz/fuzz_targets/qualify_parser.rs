#![no_main]

use libfuzzer_sys::fuzz_target;
use sysqual::action::DecisionsOnly;
use sysqual::call::SyscallStop;
use sysqual::engine::EngineBuilder;
use sysqual::syscalls::Personalities;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    // Each line is one clause; parsing and dispatch must never panic
    let mut builder = EngineBuilder::new(Personalities::native());
    for clause in input.lines() {
        let _ = builder.qualify(clause);
    }
    let mut engine = builder.finish();
    for number in [0u64, 2, 41, 257, 1024, u64::MAX] {
        let mut call = SyscallStop::new(0, number).with_args([u64::MAX, 1, 2, 3, 4, 5]);
        engine.filter_syscall(&mut call, &mut DecisionsOnly);
    }
});
