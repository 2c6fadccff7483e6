//! End-to-end tests for the recipe binary

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;
use recipe_test_utils::{TestRecipe, fixtures};

/// Get a Command for the recipe binary, isolated from the user's profiles
fn recipe_cmd(project: &TestRecipe) -> Command {
    let mut cmd = Command::cargo_bin("recipe").expect("Failed to find recipe binary");
    cmd.current_dir(project.root())
        .env("RECIPE_CONFIG_DIR", project.config_dir())
        .env_remove("RUST_LOG");
    cmd
}

const LINUX_GCC: [&str; 7] = [
    "resolve",
    "--os",
    "Linux",
    "--compiler",
    "gcc",
    "--build-type",
    "Release",
];

fn plan_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("resolve should print JSON")
}

// ============================================================================
// resolve
// ============================================================================

#[test]
fn test_resolve_prints_json_plan() {
    let project = TestRecipe::with_manifest(fixtures::OPENCV);

    let output = recipe_cmd(&project)
        .args(LINUX_GCC)
        .args(["--set", "shared=true", "--jobs", "4"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let plan = plan_json(&output);
    assert_eq!(plan["package"], "opencv");
    assert_eq!(plan["options"]["shared"], true);
    assert!(plan["options"].get("fPIC").is_none());
    assert_eq!(plan["options"]["BUILD_opencv_dnn"], false);
    assert_eq!(plan["variables"]["BUILD_SHARED_LIBS"], "ON");
    assert_eq!(plan["variables"]["CMAKE_BUILD_PARALLEL_LEVEL"], "4");
    assert_eq!(plan["parallel_level"], 4);
}

#[test]
fn test_resolve_is_byte_identical_across_runs() {
    let project = TestRecipe::with_manifest(fixtures::APP);
    let run = || {
        recipe_cmd(&project)
            .args(LINUX_GCC)
            .args(["--cppstd", "14", "--jobs", "2", "--format", "toml"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };

    let first = run();
    assert!(!first.is_empty());
    assert_eq!(first, run());
}

#[test]
fn test_resolve_with_profile_rewrites_libcxx() {
    let project = TestRecipe::with_manifest(fixtures::ONNXRUNTIME);
    let profile = project.write_profile("linux-gcc.toml", fixtures::LINUX_GCC_PROFILE);

    let output = recipe_cmd(&project)
        .arg("resolve")
        .arg("--profile")
        .arg(&profile)
        .args(["--libcxx", "libstdc++"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let plan = plan_json(&output);
    assert_eq!(plan["settings"]["compiler.libcxx"], "libstdc++11");
    assert_eq!(plan["adjustments"][0], "gcc-libstdcxx11");
    assert_eq!(plan["requires"][0]["name"], "onnxruntime");
}

#[test]
fn test_resolve_uses_global_default_profile() {
    let project = TestRecipe::with_manifest(fixtures::OPENCV);
    project.write_default_profile(fixtures::WINDOWS_MSVC_PROFILE);

    let output = recipe_cmd(&project)
        .arg("resolve")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let plan = plan_json(&output);
    assert_eq!(plan["settings"]["os"], "Windows");
    assert_eq!(plan["options"]["shared"], true);
    assert_eq!(plan["package_info"]["system_libs"][0], "ws2_32");
}

#[test]
fn test_resolve_cmake_format() {
    let project = TestRecipe::with_manifest(fixtures::OPENCV);

    recipe_cmd(&project)
        .args(LINUX_GCC)
        .args(["--format", "cmake", "--set", "with_cuda=ON"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-DWITH_CUDA=ON"))
        .stdout(predicate::str::contains("-DCMAKE_BUILD_TYPE=Release"))
        .stdout(predicate::str::contains("-DBUILD_TESTS=OFF"));
}

#[test]
fn test_resolve_writes_output_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let manifest = temp.child("opencv.toml");
    manifest.write_str(fixtures::OPENCV).unwrap();
    let plan = temp.child("plan.yaml");

    let project = TestRecipe::new();
    recipe_cmd(&project)
        .args(LINUX_GCC)
        .arg("--manifest")
        .arg(manifest.path())
        .args(["--format", "yaml", "--output"])
        .arg(plan.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Wrote yaml plan"));

    plan.assert(predicate::path::exists());
    plan.assert(predicate::str::contains("package: opencv"));
}

#[test]
fn test_resolve_output_into_missing_directory() {
    let project = TestRecipe::with_manifest(fixtures::OPENCV);
    let target = project.path("missing/plan.json");

    recipe_cmd(&project)
        .args(LINUX_GCC)
        .arg("--output")
        .arg(&target)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}

// ============================================================================
// Exit codes
// ============================================================================

#[test]
fn test_invalid_option_value_exits_3() {
    let project = TestRecipe::with_manifest(fixtures::OPENCV);

    recipe_cmd(&project)
        .args(LINUX_GCC)
        .args(["--set", "shared=maybe"])
        .assert()
        .code(3)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("shared"))
        .stderr(predicate::str::contains("maybe"));
}

#[test]
fn test_unknown_option_exits_4() {
    let project = TestRecipe::with_manifest(fixtures::OPENCV);

    recipe_cmd(&project)
        .args(LINUX_GCC)
        .args(["--set", "wth_cuda=true"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("unknown option 'wth_cuda'"));
}

#[test]
fn test_rule_cycle_exits_5() {
    let project = TestRecipe::with_manifest(
        r#"
[package]
name = "cyclic"
version = "0.1.0"

[options.a]
domain = "bool"
default = true

[[rules]]
name = "self-loop"
when = { options = { a = true } }
set = { a = false }
"#,
    );

    recipe_cmd(&project)
        .args(LINUX_GCC)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("self-loop"));

    recipe_cmd(&project).arg("check").assert().code(5);
}

#[test]
fn test_missing_manifest_exits_6() {
    let project = TestRecipe::new();

    recipe_cmd(&project)
        .args(LINUX_GCC)
        .assert()
        .code(6)
        .stderr(predicate::str::contains("recipe not found"));
}

#[test]
fn test_missing_setting_exits_7() {
    let project = TestRecipe::with_manifest(fixtures::OPENCV);

    recipe_cmd(&project)
        .args(["resolve", "--compiler", "gcc", "--build-type", "Release"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("missing required setting 'os'"));
}

#[test]
fn test_unparseable_setting_exits_7() {
    let project = TestRecipe::with_manifest(fixtures::OPENCV);

    recipe_cmd(&project)
        .args(["resolve", "--os", "Plan9", "--compiler", "gcc"])
        .args(["--build-type", "Release"])
        .assert()
        .code(7);
}

#[test]
fn test_malformed_override_exits_8() {
    let project = TestRecipe::with_manifest(fixtures::OPENCV);

    recipe_cmd(&project)
        .args(LINUX_GCC)
        .args(["--set", "shared"])
        .assert()
        .code(8)
        .stderr(predicate::str::contains("malformed override"));
}

#[test]
fn test_unknown_format_is_usage_error() {
    let project = TestRecipe::with_manifest(fixtures::OPENCV);

    recipe_cmd(&project)
        .args(LINUX_GCC)
        .args(["--format", "xml"])
        .assert()
        .code(2);
}

#[test]
fn test_missing_profile_exits_1() {
    let project = TestRecipe::with_manifest(fixtures::OPENCV);

    recipe_cmd(&project)
        .args(["resolve", "--profile", "nowhere.toml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("profile not found"));
}

#[test]
fn test_broken_profile_exits_1() {
    let project = TestRecipe::with_manifest(fixtures::OPENCV);
    let profile = project.write_profile("broken.toml", "[settings]\nos = = \n");

    recipe_cmd(&project)
        .arg("resolve")
        .arg("--profile")
        .arg(&profile)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to parse profile"))
        .stderr(predicate::str::contains("failed to parse recipe").not());
}

// ============================================================================
// options / check / completions
// ============================================================================

#[test]
fn test_options_lists_declared_options() {
    let project = TestRecipe::with_manifest(fixtures::APP);

    recipe_cmd(&project)
        .arg("options")
        .assert()
        .success()
        .stdout(predicate::str::contains("opencv-image-processing"))
        .stdout(predicate::str::contains("opencv_version"))
        .stdout(predicate::str::contains("4.12.0"))
        .stdout(predicate::str::contains("Total:"));
}

#[test]
fn test_options_json() {
    let project = TestRecipe::with_manifest(fixtures::OPENCV);

    let output = recipe_cmd(&project)
        .args(["options", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let options: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(options["minimal_build"]["domain"], "bool");
    assert_eq!(options["minimal_build"]["default"], true);
    assert_eq!(options["shared"]["variable"], "BUILD_SHARED_LIBS");
}

#[test]
fn test_check_valid_recipe() {
    let project = TestRecipe::with_manifest(fixtures::OPENCV);

    recipe_cmd(&project)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("opencv"))
        .stdout(predicate::str::contains("4 rules"));
}

#[test]
fn test_check_invalid_default_exits_3() {
    let project = TestRecipe::with_manifest(
        "[package]\nname = \"demo\"\nversion = \"1.0.0\"\n\n[options.shared]\ndomain = \"bool\"\ndefault = \"maybe\"\n",
    );

    recipe_cmd(&project).arg("check").assert().code(3);
}

#[test]
fn test_completions_bash() {
    let project = TestRecipe::new();

    recipe_cmd(&project)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("recipe"));
}

#[test]
fn test_no_command_shows_hint() {
    let project = TestRecipe::new();

    recipe_cmd(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("recipe --help"));
}
