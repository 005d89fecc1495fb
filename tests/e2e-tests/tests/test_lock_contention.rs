//! Record locks are visible across processes.

use e2e_tests::run_testexe;
use osex_common::LockMode;
use osex_spawn::ArgList;
use std::fs::OpenOptions;

#[test]
fn test_write_lock_blocks_other_process_until_unlocked() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("locked.dat");
    std::fs::write(&path, b"data").unwrap();
    let file = OpenOptions::new().read(true).write(true).open(&path).unwrap();
    let try_lock = || {
        let args = ArgList::new(["--try-lock".to_string(), path.to_string_lossy().into_owned()]);
        run_testexe(args, None).unwrap().stdout
    };

    osex_os::lock(&file, LockMode::Write, 0, 0).unwrap();
    assert_eq!(try_lock(), "busy\n");

    osex_os::unlock(&file, 0, 0).unwrap();
    assert_eq!(try_lock(), "locked\n");
}
