//! Fixture recipes and profiles, embedded at compile time.
//!
//! Each recipe encodes one variant of the recipes the resolver was modelled
//! on: a from-source library with a minimal build switch, a wrapper that
//! rewrites the gcc standard library, and an application with an enumerated
//! version option.

/// OpenCV from source: `shared`, `fPIC`, `minimal_build` and module switches.
pub const OPENCV: &str = include_str!("../../../test-fixtures/recipes/opencv.toml");

/// ONNX Runtime wrapper: one requirement and the gcc `libstdc++11` adjustment.
pub const ONNXRUNTIME: &str = include_str!("../../../test-fixtures/recipes/onnxruntime.toml");

/// Application recipe: `opencv_version` domain, `min_cppstd = 17`, and
/// OS-conditional build requirements.
pub const APP: &str = include_str!("../../../test-fixtures/recipes/app.toml");

/// Linux/gcc profile declaring the legacy `libstdc++` ABI and C++14.
pub const LINUX_GCC_PROFILE: &str = include_str!("../../../test-fixtures/profiles/linux-gcc.toml");

/// Windows/msvc profile that also sets `shared = true`.
pub const WINDOWS_MSVC_PROFILE: &str =
    include_str!("../../../test-fixtures/profiles/windows-msvc.toml");

/// Every module switch the opencv recipe forces off for a minimal build.
pub const OPENCV_MINIMAL_FLAGS: [&str; 19] = [
    "BUILD_EXAMPLES",
    "BUILD_TESTS",
    "BUILD_PERF_TESTS",
    "BUILD_DOCS",
    "BUILD_opencv_apps",
    "BUILD_opencv_python2",
    "BUILD_opencv_python3",
    "BUILD_opencv_java",
    "BUILD_opencv_calib3d",
    "BUILD_opencv_dnn",
    "BUILD_opencv_features2d",
    "BUILD_opencv_flann",
    "BUILD_opencv_gapi",
    "BUILD_opencv_ml",
    "BUILD_opencv_objdetect",
    "BUILD_opencv_photo",
    "BUILD_opencv_stitching",
    "BUILD_opencv_video",
    "BUILD_opencv_videoio",
];
