//! The shared flag vocabulary and its projection onto a toolchain family.

use serde::{Deserialize, Serialize};

/// Toolchain family a tagged flag or a tool belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Family {
    /// gcc/clang command-line syntax.
    Gnu,
    /// MSVC cl/link syntax.
    Msc,
    /// The embeddable Tiny C Compiler (gnu-like syntax, reduced set).
    Tcc,
}

/// A compiler or linker flag, either universal or family-specific.
///
/// Order of flags is significant and preserved end-to-end: projection,
/// direct execution and every generator backend see the same sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flag {
    /// Applies under every toolchain family.
    Plain(String),
    /// Applies only under the named family; dropped everywhere else.
    Tagged {
        /// Family the flag is restricted to.
        family: Family,
        /// The flag text, without any tag marker.
        text: String,
    },
}

impl Flag {
    /// Convenience constructor for a plain flag.
    pub fn plain(text: impl Into<String>) -> Self {
        Flag::Plain(text.into())
    }

    /// Convenience constructor for a family-tagged flag.
    pub fn tagged(family: Family, text: impl Into<String>) -> Self {
        Flag::Tagged {
            family,
            text: text.into(),
        }
    }
}

/// Resolve a mixed flag list into concrete arguments for `family`.
///
/// Plain flags are kept as-is; tagged flags are kept (tag stripped) when
/// their family matches and dropped otherwise. Relative order of survivors
/// is preserved, so the output is never longer than the input.
pub fn project_flags(family: Family, flags: &[Flag]) -> Vec<String> {
    flags
        .iter()
        .filter_map(|flag| match flag {
            Flag::Plain(text) => Some(text.clone()),
            Flag::Tagged { family: f, text } if *f == family => Some(text.clone()),
            Flag::Tagged { .. } => None,
        })
        .collect()
}

/// Optimization level consumed from the validated configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptLevel {
    /// No optimization flag at all.
    Off,
    /// Numeric level 0 through 4 (4 clamps to the family maximum).
    Level(u8),
    /// Optimize for size.
    Size,
}

impl OptLevel {
    /// Render the level for a family, or `None` when no flag applies.
    pub fn render(&self, family: Family) -> Option<String> {
        match (self, family) {
            (OptLevel::Off, _) => None,
            (OptLevel::Level(n), Family::Gnu | Family::Tcc) => {
                // gcc/clang top out at -O3.
                Some(format!("-O{}", (*n).min(3)))
            }
            (OptLevel::Level(0), Family::Msc) => Some("/Od".to_string()),
            (OptLevel::Level(1), Family::Msc) => Some("/O1".to_string()),
            (OptLevel::Level(_), Family::Msc) => Some("/O2".to_string()),
            (OptLevel::Size, Family::Gnu | Family::Tcc) => Some("-Os".to_string()),
            (OptLevel::Size, Family::Msc) => Some("/O1".to_string()),
        }
    }
}

/// Debug mode consumed from the validated configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DebugMode {
    /// No debug instrumentation.
    Off,
    /// Full debug build: symbols plus assertions enabled.
    Full,
    /// Debug symbols only, optimizations untouched.
    Symbols,
    /// Address/UB sanitizers (gnu family only).
    Sanitize,
    /// Symbols suitable for callgrind profiling.
    Callgrind,
    /// Assertions enabled, no symbols.
    Asserts,
}

impl DebugMode {
    /// Whether debug symbols are emitted.
    pub fn wants_symbols(&self) -> bool {
        matches!(
            self,
            DebugMode::Full | DebugMode::Symbols | DebugMode::Sanitize | DebugMode::Callgrind
        )
    }

    /// Whether C `assert()` stays live (NDEBUG is not defined).
    pub fn wants_asserts(&self) -> bool {
        matches!(self, DebugMode::Full | DebugMode::Asserts)
    }

    /// Compiler flags implied by this mode for a family.
    pub fn render(&self, family: Family) -> Vec<String> {
        let mut out = Vec::new();
        if self.wants_symbols() {
            match family {
                Family::Gnu | Family::Tcc => out.push("-g".to_string()),
                Family::Msc => out.push("/Zi".to_string()),
            }
        }
        if *self == DebugMode::Sanitize && family == Family::Gnu {
            out.push("-fsanitize=address,undefined".to_string());
        }
        out
    }
}
