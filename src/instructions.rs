//! The instruction wire format (spec.md §3, §6) and the `LayoutKind` tagged
//! union every detector resolves to.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One instruction in the emitted plan. Destinations are always relative to
/// the game root; `source` (for `Copy`) is always one of the input paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Instruction {
    Copy { source: String, destination: String },
    GenerateFile {
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
        destination: String,
    },
    Mkdir { destination: String },
}

impl Instruction {
    pub fn copy(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Instruction::Copy { source: source.into(), destination: destination.into() }
    }

    pub fn generate_file(data: impl Into<Vec<u8>>, destination: impl Into<String>) -> Self {
        Instruction::GenerateFile { data: data.into(), destination: destination.into() }
    }

    pub fn mkdir(destination: impl Into<String>) -> Self {
        Instruction::Mkdir { destination: destination.into() }
    }

    pub fn destination(&self) -> &str {
        match self {
            Instruction::Copy { destination, .. } => destination,
            Instruction::GenerateFile { destination, .. } => destination,
            Instruction::Mkdir { destination } => destination,
        }
    }
}

mod base64_bytes {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    // Minimal base64 codec — the wire format only needs to move small
    // generated files (synthesized info.json) so a dependency-free
    // implementation keeps the instruction model self-contained.
    const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        encode(bytes).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        decode(&s).map_err(serde::de::Error::custom)
    }

    fn encode(bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len().div_ceil(3) * 4);
        for chunk in bytes.chunks(3) {
            let b0 = chunk[0];
            let b1 = *chunk.get(1).unwrap_or(&0);
            let b2 = *chunk.get(2).unwrap_or(&0);
            let n = (b0 as u32) << 16 | (b1 as u32) << 8 | b2 as u32;
            out.push(ALPHABET[(n >> 18 & 0x3f) as usize] as char);
            out.push(ALPHABET[(n >> 12 & 0x3f) as usize] as char);
            out.push(if chunk.len() > 1 { ALPHABET[(n >> 6 & 0x3f) as usize] as char } else { '=' });
            out.push(if chunk.len() > 2 { ALPHABET[(n & 0x3f) as usize] as char } else { '=' });
        }
        out
    }

    fn decode(s: &str) -> Result<Vec<u8>, String> {
        let clean: Vec<u8> = s.bytes().filter(|b| *b != b'=').collect();
        let mut out = Vec::new();
        for chunk in clean.chunks(4) {
            let mut vals = [0u32; 4];
            for (i, &b) in chunk.iter().enumerate() {
                vals[i] = ALPHABET
                    .iter()
                    .position(|&c| c == b)
                    .ok_or_else(|| format!("invalid base64 byte: {b}"))? as u32;
            }
            let n = vals[0] << 18 | vals[1] << 12 | vals[2] << 6 | vals[3];
            out.push((n >> 16 & 0xff) as u8);
            if chunk.len() > 2 {
                out.push((n >> 8 & 0xff) as u8);
            }
            if chunk.len() > 3 {
                out.push((n & 0xff) as u8);
            }
        }
        Ok(out)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn round_trips() {
            for input in [b"".as_slice(), b"a", b"ab", b"abc", b"{\"name\":\"X\"}"] {
                assert_eq!(decode(&encode(input)).unwrap(), input);
            }
        }
    }
}

/// Mutually-exclusive disambiguated sub-layouts, one set per mod type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedscriptLayout {
    Canon,
    Basedir,
    Toplevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Red4ExtLayout {
    Canon,
    Basedir,
    Modnamed,
    Toplevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchiveLayout {
    Canon,
    Heritage,
    Other,
    Xl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IniLayout {
    Reshade,
    Ini,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TweakXlLayout {
    Canon,
    Basedir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RedModLayout {
    Canon,
    Named,
    Toplevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreFramework {
    Cet,
    Redscript,
    Red4Ext,
    CsvMerge,
    TweakXl,
    WolvenKitCli,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoInstructionsReason {
    NoMatch,
    Invalid,
}

/// The discriminated layout the pipeline settled on for a given archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum LayoutKind {
    Cet,
    Redscript(RedscriptLayout),
    Red4Ext(Red4ExtLayout),
    Archive(ArchiveLayout),
    Ini(IniLayout),
    Json,
    TweakXl(TweakXlLayout),
    RedMod(RedModLayout),
    RedModTransformedArchive,
    Core(CoreFramework),
    MultiType,
    Fallback,
    NoInstructions(NoInstructionsReason),
}

/// The value returned by a successful `layout(ctx, tree)` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instructions {
    pub kind: LayoutKind,
    pub instructions: Vec<Instruction>,
}

impl Instructions {
    pub fn new(kind: LayoutKind, instructions: Vec<Instruction>) -> Self {
        let mut result = Self { kind, instructions };
        result.dedup_by_destination();
        result
    }

    pub fn no_match() -> Self {
        Self { kind: LayoutKind::NoInstructions(NoInstructionsReason::NoMatch), instructions: Vec::new() }
    }

    pub fn invalid() -> Self {
        Self { kind: LayoutKind::NoInstructions(NoInstructionsReason::Invalid), instructions: Vec::new() }
    }

    pub fn is_match(&self) -> bool {
        !matches!(self.kind, LayoutKind::NoInstructions(_))
    }

    /// Remove later instructions whose destination was already claimed by
    /// an earlier one — spec.md §3's "no two copy instructions share a
    /// destination" invariant, enforced here rather than trusted of every
    /// detector.
    fn dedup_by_destination(&mut self) {
        let mut seen = BTreeSet::new();
        self.instructions.retain(|i| seen.insert(i.destination().to_string()));
    }

    /// Merge several layouts' instructions into one, deduplicating by
    /// destination. Used by the MultiType composer (spec.md §4.12).
    pub fn merge(kind: LayoutKind, parts: impl IntoIterator<Item = Instructions>) -> Self {
        let mut all = Vec::new();
        for part in parts {
            all.extend(part.instructions);
        }
        Self::new(kind, all)
    }

    /// `true` if any two instructions collide on destination and disagree
    /// about what goes there — used by MultiType to detect real conflicts
    /// rather than the common case of two detectors independently emitting
    /// the identical passthrough copy for a shared file (spec.md §4.12).
    pub fn has_destination_conflict(parts: &[Instructions]) -> bool {
        let mut seen: std::collections::BTreeMap<String, &Instruction> = std::collections::BTreeMap::new();
        for part in parts {
            for instr in &part.instructions {
                match seen.get(instr.destination()) {
                    Some(existing) if *existing != instr => return true,
                    Some(_) => {}
                    None => {
                        seen.insert(instr.destination().to_string(), instr);
                    }
                }
            }
        }
        false
    }
}
