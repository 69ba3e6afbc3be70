use std::{
    io::Write,
    path::Path,
    process::{Command, Output, Stdio},
};

/// Runner of the josec binary.
pub(super) struct JosecCli;

impl JosecCli {
    fn command() -> Command {
        let mut cmd = escargot::CargoBuild::new()
            .package("josec-cli")
            .bin("josec")
            .target_dir("./target/")
            .run()
            .unwrap()
            .command();
        cmd.env(
            "RUST_LOG",
            std::env::var("RUST_LOG").unwrap_or("warn".into()),
        );
        cmd
    }

    fn output(args: &[&str], stdin: Option<&[u8]>) -> Output {
        let mut child = Self::command()
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();

        let mut pipe = child.stdin.take().unwrap();
        if let Some(data) = stdin {
            pipe.write_all(data).unwrap();
        }
        drop(pipe);

        child.wait_with_output().unwrap()
    }

    /// Run any josec cmd, expecting it to succeed, returning its stdout.
    pub(super) fn run(args: &[&str]) -> Vec<u8> {
        Self::run_with_stdin(args, b"")
    }

    /// Run any josec cmd with the given stdin, expecting it to succeed.
    pub(super) fn run_with_stdin(args: &[&str], stdin: &[u8]) -> Vec<u8> {
        let output = Self::output(args, Some(stdin));
        assert!(
            output.status.success(),
            "josec {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        output.stdout
    }

    /// Run any josec cmd as [`Self::run`], decoding stdout as utf-8.
    pub(super) fn run_str(args: &[&str]) -> String {
        String::from_utf8(Self::run(args)).unwrap()
    }

    /// Run any josec cmd, expecting it to fail, returning its stderr.
    pub(super) fn fail(args: &[&str]) -> String {
        let output = Self::output(args, None);
        assert!(!output.status.success(), "josec {args:?} succeeded");
        assert_eq!(output.status.code(), Some(1));
        String::from_utf8(output.stderr).unwrap()
    }
}

/// Path as an argument.
pub(super) fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}
