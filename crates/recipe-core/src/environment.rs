//! Target environment: operating system, compiler and build type
//!
//! The environment is what the recipe is being resolved *for*. It is read by
//! rule conditions and rewritten by [`crate::adjust`] before rules run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Target operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
    Linux,
    Windows,
    Macos,
    FreeBSD,
    Android,
    Ios,
}

impl Os {
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Linux => "Linux",
            Os::Windows => "Windows",
            Os::Macos => "Macos",
            Os::FreeBSD => "FreeBSD",
            Os::Android => "Android",
            Os::Ios => "iOS",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Os {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(Os::Linux),
            "windows" | "win32" => Ok(Os::Windows),
            "macos" | "darwin" => Ok(Os::Macos),
            "freebsd" => Ok(Os::FreeBSD),
            "android" => Ok(Os::Android),
            "ios" => Ok(Os::Ios),
            _ => Err(Error::InvalidSetting {
                name: "os".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// CMake build type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildType {
    Debug,
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
            BuildType::RelWithDebInfo => "RelWithDebInfo",
            BuildType::MinSizeRel => "MinSizeRel",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(BuildType::Debug),
            "release" => Ok(BuildType::Release),
            "relwithdebinfo" => Ok(BuildType::RelWithDebInfo),
            "minsizerel" => Ok(BuildType::MinSizeRel),
            _ => Err(Error::InvalidSetting {
                name: "build_type".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Serde through `Display`/`FromStr`, so recipes, profiles and flags share
/// the same case-insensitive spelling
macro_rules! serde_via_str {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

serde_via_str!(Os);
serde_via_str!(BuildType);

/// C++ language standard, e.g. `17` or `gnu17`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CppStd {
    /// GNU extensions enabled (`gnu17` vs `17`)
    pub gnu: bool,
    /// Two-digit standard number as written (`98`, `11`, ..., `23`)
    pub number: u16,
}

impl CppStd {
    const KNOWN: [u16; 7] = [98, 11, 14, 17, 20, 23, 26];

    /// Publication year, for ordering (`98` predates `11`)
    pub fn year(&self) -> u16 {
        if self.number >= 90 {
            1900 + self.number
        } else {
            2000 + self.number
        }
    }

    /// Same extension flag, different standard number
    pub fn with_number(self, number: u16) -> Self {
        Self {
            gnu: self.gnu,
            number,
        }
    }
}

impl PartialOrd for CppStd {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CppStd {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.year()
            .cmp(&other.year())
            .then(self.gnu.cmp(&other.gnu))
    }
}

impl fmt::Display for CppStd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.gnu {
            write!(f, "gnu{}", self.number)
        } else {
            write!(f, "{}", self.number)
        }
    }
}

impl FromStr for CppStd {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidSetting {
            name: "compiler.cppstd".to_string(),
            value: s.to_string(),
        };
        let trimmed = s.trim();
        let (gnu, digits) = match trimmed.strip_prefix("gnu") {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let number: u16 = digits.parse().map_err(|_| invalid())?;
        if !Self::KNOWN.contains(&number) {
            return Err(invalid());
        }
        Ok(Self { gnu, number })
    }
}

impl Serialize for CppStd {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CppStd {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = crate::value::OptionValue::deserialize(deserializer)?;
        raw.to_string().parse().map_err(serde::de::Error::custom)
    }
}

/// Setting keys that can be rewritten by environment adjustments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettingKey {
    #[serde(rename = "compiler.libcxx")]
    LibCxx,
    #[serde(rename = "compiler.cppstd")]
    CppStd,
    #[serde(rename = "compiler.version")]
    CompilerVersion,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::LibCxx => "compiler.libcxx",
            SettingKey::CppStd => "compiler.cppstd",
            SettingKey::CompilerVersion => "compiler.version",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The environment a recipe is resolved for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub os: Os,
    pub arch: String,
    pub build_type: BuildType,
    /// Compiler id (`gcc`, `clang`, `msvc`, `apple-clang`, ...)
    pub compiler: String,
    #[serde(
        rename = "compiler.version",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub compiler_version: Option<String>,
    #[serde(
        rename = "compiler.libcxx",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub libcxx: Option<String>,
    #[serde(
        rename = "compiler.cppstd",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub cppstd: Option<CppStd>,
}

impl Environment {
    pub fn new(os: Os, compiler: impl Into<String>, build_type: BuildType) -> Self {
        Self {
            os,
            arch: host_arch(),
            build_type,
            compiler: compiler.into().to_ascii_lowercase(),
            compiler_version: None,
            libcxx: None,
            cppstd: None,
        }
    }

    pub fn with_arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = arch.into();
        self
    }

    pub fn with_libcxx(mut self, libcxx: impl Into<String>) -> Self {
        self.libcxx = Some(libcxx.into());
        self
    }

    pub fn with_cppstd(mut self, cppstd: CppStd) -> Self {
        self.cppstd = Some(cppstd);
        self
    }

    pub fn with_compiler_version(mut self, version: impl Into<String>) -> Self {
        self.compiler_version = Some(version.into());
        self
    }

    /// Current textual value of an adjustable setting
    pub fn setting(&self, key: SettingKey) -> Option<String> {
        match key {
            SettingKey::LibCxx => self.libcxx.clone(),
            SettingKey::CppStd => self.cppstd.map(|c| c.to_string()),
            SettingKey::CompilerVersion => self.compiler_version.clone(),
        }
    }

    /// Overwrite an adjustable setting from its textual form
    pub fn set_setting(&mut self, key: SettingKey, value: &str) -> Result<()> {
        match key {
            SettingKey::LibCxx => self.libcxx = Some(value.to_string()),
            SettingKey::CppStd => self.cppstd = Some(value.parse()?),
            SettingKey::CompilerVersion => self.compiler_version = Some(value.to_string()),
        }
        Ok(())
    }
}

/// Host architecture using the recipe naming scheme
pub fn host_arch() -> String {
    match std::env::consts::ARCH {
        "aarch64" => "armv8".to_string(),
        "x86" => "x86".to_string(),
        "arm" => "armv7".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_parse_is_case_insensitive() {
        assert_eq!("linux".parse::<Os>().unwrap(), Os::Linux);
        assert_eq!("Windows".parse::<Os>().unwrap(), Os::Windows);
        assert!("plan9".parse::<Os>().is_err());
    }

    #[test]
    fn test_os_and_build_type_deserialize_any_case() {
        #[derive(Deserialize)]
        struct Holder {
            os: Os,
            build_type: BuildType,
        }

        let holder: Holder = toml::from_str("os = \"linux\"\nbuild_type = \"release\"").unwrap();
        assert_eq!(holder.os, Os::Linux);
        assert_eq!(holder.build_type, BuildType::Release);
        assert!(toml::from_str::<Holder>("os = \"plan9\"\nbuild_type = \"Debug\"").is_err());
        assert_eq!(serde_json::to_string(&Os::Ios).unwrap(), "\"iOS\"");
    }

    #[test]
    fn test_build_type_parse() {
        assert_eq!("Release".parse::<BuildType>().unwrap(), BuildType::Release);
        assert_eq!(
            "relwithdebinfo".parse::<BuildType>().unwrap(),
            BuildType::RelWithDebInfo
        );
        assert!("Fast".parse::<BuildType>().is_err());
    }

    #[test]
    fn test_cppstd_ordering() {
        let cpp98: CppStd = "98".parse().unwrap();
        let cpp11: CppStd = "11".parse().unwrap();
        let gnu17: CppStd = "gnu17".parse().unwrap();
        let cpp20: CppStd = "20".parse().unwrap();

        assert!(cpp98 < cpp11);
        assert!(cpp11 < gnu17);
        assert!(gnu17 < cpp20);
        assert_eq!(gnu17.to_string(), "gnu17");
        assert!("18".parse::<CppStd>().is_err());
    }

    #[test]
    fn test_set_setting_validates_cppstd() {
        let mut env = Environment::new(Os::Linux, "gcc", BuildType::Release);
        env.set_setting(SettingKey::CppStd, "17").unwrap();
        assert_eq!(env.setting(SettingKey::CppStd).as_deref(), Some("17"));
        assert!(env.set_setting(SettingKey::CppStd, "seventeen").is_err());
    }

    #[test]
    fn test_compiler_id_is_lowercased() {
        let env = Environment::new(Os::Linux, "GCC", BuildType::Debug);
        assert_eq!(env.compiler, "gcc");
    }
}
