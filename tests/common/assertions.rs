//! Custom assertion macros with descriptive failure messages.

/// Assert that output (stdout or stderr) contains expected pattern.
#[macro_export]
macro_rules! assert_output_contains {
    ($result:expr, $pattern:expr) => {
        assert!(
            $result.stdout.contains($pattern) || $result.stderr.contains($pattern),
            "Expected output to contain '{}'\n\
             stdout:\n{}\n\
             stderr:\n{}",
            $pattern,
            $result.stdout,
            $result.stderr
        );
    };
}

/// Assert that output does NOT contain a pattern.
#[macro_export]
macro_rules! assert_output_not_contains {
    ($result:expr, $pattern:expr) => {
        assert!(
            !$result.stdout.contains($pattern) && !$result.stderr.contains($pattern),
            "Expected output to NOT contain '{}'\n\
             stdout:\n{}\n\
             stderr:\n{}",
            $pattern,
            $result.stdout,
            $result.stderr
        );
    };
}

/// Assert that a file under the working directory holds exactly these bytes.
#[macro_export]
macro_rules! assert_file_matches {
    ($env:expr, $path:expr, $expected:expr) => {
        let actual = $env.read_file($path);
        assert!(
            actual == $expected,
            "File '{}' content mismatch: {} bytes on disk, {} expected.\n\
             Files found:\n  {}",
            $path,
            actual.len(),
            $expected.len(),
            $crate::common::list_all_files($env.work_dir.path()).join("\n  ")
        );
    };
}

/// Assert that a path does not exist under the working directory.
#[macro_export]
macro_rules! assert_not_copied {
    ($env:expr, $path:expr) => {
        let full_path = $env.path($path);
        assert!(
            !full_path.exists(),
            "Expected '{}' to NOT exist, but it does.\n\
             Work dir: {:?}",
            $path,
            $env.work_dir.path()
        );
    };
}
