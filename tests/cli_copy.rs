mod common;

use common::{patterned_bytes, TestEnv};

#[test]
fn copy_single_file_creates_destination() {
    let env = TestEnv::new();
    let payload = patterned_bytes(4096);
    env.write_file("src.bin", &payload);

    let result = env.run(&[
        "copy",
        "src.bin",
        "dst.bin",
        "--cache-file",
        env.cache_file().to_str().unwrap(),
    ]);

    assert!(result.is_success(), "copy failed: {}", result.combined_output());
    assert_file_matches!(env, "dst.bin", payload);
    assert_output_contains!(result, "Copy Results");
}

#[test]
fn copy_file_into_existing_directory_uses_source_name() {
    let env = TestEnv::new();
    let payload = patterned_bytes(100);
    env.write_file("src.bin", &payload);
    std::fs::create_dir_all(env.path("out")).unwrap();

    let result = env.run(&[
        "copy",
        "src.bin",
        "out",
        "--cache-file",
        env.cache_file().to_str().unwrap(),
    ]);

    assert!(result.is_success(), "copy failed: {}", result.combined_output());
    assert_file_matches!(env, "out/src.bin", payload);
}

#[test]
fn copy_directory_preserves_tree_and_hidden_files() {
    let env = TestEnv::new();
    env.write_file("tree/a.bin", &patterned_bytes(50));
    env.write_file("tree/nested/deep/b.bin", &patterned_bytes(80));
    env.write_file("tree/.hidden", b"dotfile");

    let result = env.run(&[
        "copy",
        "tree",
        "mirror",
        "--cache-file",
        env.cache_file().to_str().unwrap(),
    ]);

    assert!(result.is_success(), "copy failed: {}", result.combined_output());
    assert_file_matches!(env, "mirror/a.bin", patterned_bytes(50));
    assert_file_matches!(env, "mirror/nested/deep/b.bin", patterned_bytes(80));
    assert_file_matches!(env, "mirror/.hidden", b"dotfile".to_vec());
}

#[test]
fn copy_missing_source_fails() {
    let env = TestEnv::new();
    let result = env.run(&["copy", "no-such-file", "dst.bin"]);

    assert!(!result.is_success());
    assert_output_contains!(result, "no-such-file");
}

#[test]
fn copy_new_only_leaves_existing_files_alone() {
    let env = TestEnv::new();
    let full = patterned_bytes(1000);
    env.write_file("tree/partial.bin", &full);
    env.write_file("mirror/partial.bin", &full[..200]);
    env.write_file("tree/fresh.bin", &patterned_bytes(40));

    let result = env.run(&[
        "copy",
        "tree",
        "mirror",
        "--new-only",
        "--cache-file",
        env.cache_file().to_str().unwrap(),
    ]);

    assert!(result.is_success(), "copy failed: {}", result.combined_output());
    assert_file_matches!(env, "mirror/fresh.bin", patterned_bytes(40));
    assert_file_matches!(env, "mirror/partial.bin", full[..200].to_vec());
}

#[test]
fn copy_verify_succeeds_on_clean_transfer() {
    let env = TestEnv::new();
    let payload = patterned_bytes(2048);
    env.write_file("src.bin", &payload);

    let result = env.run(&[
        "copy",
        "src.bin",
        "dst.bin",
        "--verify",
        "--cache-file",
        env.cache_file().to_str().unwrap(),
    ]);

    assert!(result.is_success(), "copy failed: {}", result.combined_output());
    assert_file_matches!(env, "dst.bin", payload);
}

#[test]
fn copy_rejects_zero_block_size() {
    let env = TestEnv::new();
    env.write_file("src.bin", b"data");

    let result = env.run(&["copy", "src.bin", "dst.bin", "--block-size", "0"]);

    assert!(!result.is_success());
    assert_output_contains!(result, "block-size");
}
