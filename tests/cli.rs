use contagio::Snapshot;
use std::{fs, fs::File, io::BufReader, path::PathBuf, process::Command};

#[test]
fn basic_workflow() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("basic_workflow");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir_all(&test_dir).expect("failed to create test directory");

    let config_path = test_dir.join("config.txt");
    let config_contents = String::new()
        + "dimensions 100 100\n"
        + "exposuredistance 20\n"
        + "incubation 1\n"
        + "sickness 1\n"
        + "recover 0.9\n"
        + "grid 3 3\n"
        + "initialsick 1\n"
        + "initialimmune 1\n"
        + "secondsperday 0.05\n"
        + "seed 11\n";

    fs::write(&config_path, config_contents).expect("failed to write config file");

    fn run_bin(args: &[&str]) {
        let bin = PathBuf::from(env!("CARGO_BIN_EXE_contagio"));

        let output = Command::new(bin)
            .args(args)
            .output()
            .expect("failed to execute command");

        let stdout_str =
            std::str::from_utf8(&output.stdout).expect("failed to convert stdout to string");
        let stderr_str =
            std::str::from_utf8(&output.stderr).expect("failed to convert stderr to string");

        assert!(
            output.status.success(),
            "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
        );
    }

    let config_str = config_path
        .to_str()
        .expect("failed to convert config path to string");
    let trajectory_path = test_dir.join("trajectory.msgpack");
    let trajectory_str = trajectory_path
        .to_str()
        .expect("failed to convert trajectory path to string");

    run_bin(&["--config", config_str, "check"]);

    run_bin(&[
        "--config",
        config_str,
        "run",
        "--days",
        "3",
        "--trajectory",
        trajectory_str,
    ]);

    // The trajectory holds one counters snapshot per simulated day.
    let file = File::open(&trajectory_path).expect("failed to open trajectory file");
    let mut reader = BufReader::new(file);
    for day in 0..3 {
        let snapshot: Snapshot =
            rmp_serde::decode::from_read(&mut reader).expect("failed to decode snapshot");
        assert_eq!(snapshot.day, day);
        assert_eq!(snapshot.total(), 9);
    }

    fs::remove_dir_all(&test_dir).ok();
}
