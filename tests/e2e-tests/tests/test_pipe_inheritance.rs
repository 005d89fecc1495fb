//! Pipes created on one thread never leak into children spawned on another.
#![cfg(target_os = "linux")]

use e2e_tests::run_captured;
use osex_spawn::ArgList;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn count_child_fds() -> String {
    let args = ArgList::new(["-c", "ls /proc/self/fd | wc -l"]);
    let run = run_captured("sh", args, None).unwrap();
    assert_eq!(run.code, 0);
    run.stdout.trim().to_string()
}

#[test]
fn test_concurrent_pipes_are_not_inherited() {
    let baseline = count_child_fds();

    let stop = Arc::new(AtomicBool::new(false));
    let churn = {
        let stop = stop.clone();
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                let ends = osex_os::pipe().unwrap();
                drop(ends);
            }
        })
    };

    let leaked = (0..200)
        .map(|_| count_child_fds())
        .filter(|count| *count != baseline)
        .count();

    stop.store(true, Ordering::Relaxed);
    churn.join().unwrap();

    assert_eq!(leaked, 0, "children saw extra descriptors (baseline {})", baseline);
}
