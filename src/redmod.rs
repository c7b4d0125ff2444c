//! REDmodEngine — spec.md §4.10 (validate/install REDmod modules) and §4.11
//! (archive-only autoconversion), plus the `info.json` schema types shared
//! by both.

use serde::{Deserialize, Serialize};

use crate::context::InstallContext;
use crate::detectors::offer_fallback_or_abort;
use crate::error::{InstallError, InstallResult};
use crate::file_tree::FileTree;
use crate::host::{HostApi, Notification};
use crate::instructions::{Instruction, Instructions, LayoutKind, RedModLayout};
use crate::layout::*;
use crate::path_match::{self, ext_in, join, prefix_of};

/// `info.json`'s `version` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedModVersion {
    pub v: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedModCustomSound {
    #[serde(rename = "type")]
    pub sound_type: String,
}

/// Parsed, schema-validated `info.json` contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedModInfo {
    pub name: String,
    pub version: RedModVersion,
    #[serde(rename = "customSounds", skip_serializing_if = "Option::is_none")]
    pub custom_sounds: Option<Vec<RedModCustomSound>>,
}

impl RedModInfo {
    /// Parse and schema-validate `info.json` bytes.
    pub fn parse(bytes: &[u8]) -> InstallResult<Self> {
        let info: RedModInfo = serde_json::from_slice(bytes)
            .map_err(|e| InstallError::Validation(format!("invalid info.json: {e}")))?;
        if info.name.trim().is_empty() {
            return Err(InstallError::Validation("info.json: \"name\" must be non-empty".into()));
        }
        if info.version.v.trim().is_empty() {
            return Err(InstallError::Validation("info.json: \"version.v\" must be non-empty".into()));
        }
        Ok(info)
    }

    fn sounds_required(&self) -> bool {
        match &self.custom_sounds {
            None => false,
            Some(sounds) if sounds.is_empty() => false,
            Some(sounds) => !sounds.iter().all(|s| s.sound_type == "mod_skip"),
        }
    }
}

/// Which of the three mutually-exclusive REDmod layouts are present, and
/// the module root path(s) each implies.
#[derive(Debug, Default)]
struct Presence {
    /// Immediate subdirs of `mods\` that each look like a module.
    canon: Vec<String>,
    /// A single non-`mods` root subdirectory that looks like a module.
    named: Option<String>,
    /// The tree root itself looks like a module.
    toplevel: bool,
}

fn looks_like_module_dir(tree: &FileTree, dir: &str) -> bool {
    tree.dir_with_some_in(dir, |p| path_match::basename_eq(p, "info.json"))
        && REDMOD_SUBTYPE_DIRS.iter().any(|sub| tree.dir_in_tree(&join(dir, sub)))
}

fn presence(tree: &FileTree) -> Presence {
    let mut p = Presence::default();

    if tree.dir_in_tree(REDMOD_BASE) {
        p.canon = tree
            .subdirs_in(REDMOD_BASE)
            .into_iter()
            .filter(|dir| looks_like_module_dir(tree, dir))
            .collect();
    }

    for root_dir in tree.subdirs_in("") {
        if root_dir.eq_ignore_ascii_case(REDMOD_BASE) {
            continue;
        }
        if looks_like_module_dir(tree, &root_dir) {
            p.named = Some(root_dir);
            break;
        }
    }

    p.toplevel = looks_like_module_dir(tree, "");

    p
}

/// `true` iff at least one of the three layouts holds (spec.md §4.10 detect
/// contract).
pub fn detect(tree: &FileTree) -> bool {
    let p = presence(tree);
    !p.canon.is_empty() || p.named.is_some() || p.toplevel
}

fn family_count(p: &Presence) -> usize {
    (!p.canon.is_empty()) as usize + p.named.is_some() as usize + p.toplevel as usize
}

/// `true` iff the tree's REDmod Canon layout is present on its own — the
/// only REDmod shape MultiType is allowed to compose with other subtypes
/// (spec.md §4.12).
pub(crate) fn canon_present(tree: &FileTree) -> bool {
    !presence(tree).canon.is_empty()
}

/// Resolve the exactly-one disambiguation rule shared by every detector
/// family (spec.md §4.3). Returns the chosen layout and its module roots,
/// or `None` for NoMatch or for "more than one family present".
fn resolve_layout(p: &Presence) -> Option<(RedModLayout, Vec<String>)> {
    if !p.canon.is_empty() {
        Some((RedModLayout::Canon, p.canon.clone()))
    } else if let Some(named) = &p.named {
        Some((RedModLayout::Named, vec![named.clone()]))
    } else if p.toplevel {
        Some((RedModLayout::Toplevel, vec![String::new()]))
    } else {
        None
    }
}

/// Install just the REDmod Canon modules present in `tree`, ignoring the
/// Named/Toplevel families and the exactly-one disambiguation entirely —
/// the shape MultiType composes with other subtypes (spec.md §4.12).
pub(crate) fn canon_layout(tree: &FileTree, ctx: &InstallContext) -> InstallResult<Instructions> {
    let roots = presence(tree).canon;
    if roots.is_empty() {
        return Ok(Instructions::no_match());
    }
    let mut all = Vec::new();
    for root in &roots {
        all.extend(install_single_module(tree, root, ctx)?);
    }
    Ok(Instructions::new(LayoutKind::RedMod(RedModLayout::Canon), all))
}

/// Install every module found in `tree`, flattening their instructions.
pub fn layout(tree: &FileTree, ctx: &InstallContext) -> InstallResult<Instructions> {
    let p = presence(tree);

    if family_count(&p) > 1 {
        if offer_fallback_or_abort(
            ctx,
            "Multiple REDmod layouts detected",
            "This archive matches more than one REDmod module layout. Install using the Fallback installer instead, or cancel?",
        ) {
            return crate::detectors::fallback::layout(tree, ctx);
        }
        return Err(InstallError::Conflict("multiple mutually-exclusive REDmod layouts present".into()));
    }

    let Some((kind, roots)) = resolve_layout(&p) else {
        return Ok(Instructions::no_match());
    };

    let mut all = Vec::new();
    for root in &roots {
        all.extend(install_single_module(tree, root, ctx)?);
    }

    Ok(Instructions::new(LayoutKind::RedMod(kind), all))
}

fn install_single_module(tree: &FileTree, module_root: &str, ctx: &InstallContext) -> InstallResult<Vec<Instruction>> {
    let info_json_path = join(module_root, "info.json");
    let bytes = ctx.host.read_file(&ctx.on_disk(&info_json_path))?;
    let info = RedModInfo::parse(&bytes)?;

    let dest_root = join(REDMOD_BASE, &info.name);
    let mut instructions = vec![Instruction::copy(info_json_path.clone(), join(&dest_root, "info.json"))];

    instructions.extend(install_archives(ctx.host, tree, module_root, &dest_root)?);
    instructions.extend(install_custom_sounds(tree, module_root, &dest_root, &info)?);
    instructions.extend(install_scripts(tree, module_root, &dest_root)?);
    instructions.extend(install_tweaks(tree, module_root, &dest_root)?);
    instructions.extend(install_extra_files(tree, module_root, &dest_root, &info_json_path));

    instructions.push(Instruction::mkdir(join(&dest_root, REDMOD_MODDED_SCRIPTS_DIR)));

    Ok(instructions)
}

fn relocate_all(tree: &FileTree, src_dir: &str, dest_dir: &str, filter: impl Fn(&str) -> bool) -> Vec<Instruction> {
    tree.files_under(src_dir, filter)
        .into_iter()
        .filter_map(|file| {
            let rel = path_match::strip_prefix(src_dir, &file)?;
            Some(Instruction::copy(file.clone(), join(dest_dir, rel)))
        })
        .collect()
}

fn install_archives(
    host: &dyn HostApi,
    tree: &FileTree,
    module_root: &str,
    dest_root: &str,
) -> InstallResult<Vec<Instruction>> {
    let src_dir = join(module_root, "archives");
    if !tree.dir_in_tree(&src_dir) {
        return Ok(Vec::new());
    }

    let files = tree.files_under(&src_dir, |p| ext_in(p, &[ARCHIVE_EXT, XL_EXT]));

    let nested = files.iter().any(|f| {
        path_match::strip_prefix(&src_dir, f).map(|rel| rel.contains(path_match::SEP)).unwrap_or(false)
    });
    if nested {
        host.send_notification(Notification::warning(
            "REDmod archives nested",
            "Archive files were found in nested subdirectories under archives\\; they were installed as-is.",
        ));
    }

    let archive_siblings = tree.files_in(&src_dir, |p| ext_in(p, &[ARCHIVE_EXT])).len();
    if archive_siblings > 1 {
        host.send_notification(Notification::warning(
            "Multiple .archive files",
            "More than one .archive file was found directly under archives\\.",
        ));
    }

    Ok(relocate_all(tree, &src_dir, &join(dest_root, "archives"), |p| ext_in(p, &[ARCHIVE_EXT, XL_EXT])))
}

fn install_custom_sounds(
    tree: &FileTree,
    module_root: &str,
    dest_root: &str,
    info: &RedModInfo,
) -> InstallResult<Vec<Instruction>> {
    let src_dir = join(module_root, "customSounds");
    let present = tree.dir_with_some_under(&src_dir, |p| ext_in(p, REDMOD_SOUND_EXTS));
    let required = info.sounds_required();

    if required && !present {
        return Err(InstallError::Validation(
            "info.json declares customSounds but no sound files were found under customSounds\\".into(),
        ));
    }
    if !required && present {
        return Err(InstallError::Validation(
            "sound files found under customSounds\\ but info.json does not declare them".into(),
        ));
    }

    Ok(relocate_all(tree, &src_dir, &join(dest_root, "customSounds"), |p| ext_in(p, REDMOD_SOUND_EXTS)))
}

fn install_scripts(tree: &FileTree, module_root: &str, dest_root: &str) -> InstallResult<Vec<Instruction>> {
    let src_dir = join(module_root, "scripts");
    if !tree.dir_in_tree(&src_dir) {
        return Ok(Vec::new());
    }

    let files = tree.files_under(&src_dir, |_| true);
    for file in &files {
        let rel = path_match::strip_prefix(&src_dir, file).unwrap_or(file);
        let first_segment = rel.split(path_match::SEP).next().unwrap_or("");
        let is_nested = rel.contains(path_match::SEP);
        if !is_nested || !REDMOD_SCRIPTS_SUBDIRS.contains(&first_segment) {
            return Err(InstallError::Validation(format!(
                "scripts\\{rel} is outside the whitelisted script subdirectories"
            )));
        }
    }

    Ok(relocate_all(tree, &src_dir, &join(dest_root, "scripts"), |_| true))
}

fn install_tweaks(tree: &FileTree, module_root: &str, dest_root: &str) -> InstallResult<Vec<Instruction>> {
    let src_dir = join(module_root, "tweaks");
    if !tree.dir_in_tree(&src_dir) {
        return Ok(Vec::new());
    }

    let allowed_dir = join(&src_dir, REDMOD_TWEAKS_SUBDIR);
    for file in tree.files_under(&src_dir, |_| true) {
        if !prefix_of(&allowed_dir, &file) {
            return Err(InstallError::Validation(format!(
                "{file} is outside the whitelisted tweaks\\{REDMOD_TWEAKS_SUBDIR}\\ subdirectory"
            )));
        }
    }

    Ok(relocate_all(tree, &src_dir, &join(dest_root, "tweaks"), |_| true))
}

fn install_extra_files(tree: &FileTree, module_root: &str, dest_root: &str, info_json_path: &str) -> Vec<Instruction> {
    let recognized_dirs: Vec<String> = REDMOD_SUBTYPE_DIRS.iter().map(|d| join(module_root, d)).collect();

    tree.files_under(module_root, |p| p != info_json_path && !recognized_dirs.iter().any(|d| prefix_of(d, p)))
        .into_iter()
        .filter_map(|file| {
            let rel = path_match::strip_prefix(module_root, &file)?;
            Some(Instruction::copy(file.clone(), join(dest_root, rel)))
        })
        .collect()
}

/// §4.11 REDmod autoconversion: rewrite a canonical (non-XL) archive-only
/// mod into a synthesized REDmod module.
pub fn autoconvert(
    host: &dyn HostApi,
    archive_instructions: &Instructions,
    mod_name: &str,
    mod_version_v: &str,
) -> Instructions {
    let tagged_name = format!("{mod_name}{AUTOCONVERT_SUFFIX}");
    let dest_root = join(REDMOD_BASE, &tagged_name);

    let info = RedModInfo {
        name: tagged_name.clone(),
        version: RedModVersion { v: mod_version_v.to_string() },
        custom_sounds: None,
    };
    let info_bytes = serde_json::to_vec_pretty(&info).expect("RedModInfo always serializes");

    let mut instructions = vec![Instruction::generate_file(info_bytes, join(&dest_root, "info.json"))];

    for instr in &archive_instructions.instructions {
        if let Instruction::Copy { source, destination } = instr {
            if let Some(rel) = path_match::strip_prefix(ARCHIVE_MOD_PREFIX, destination) {
                instructions.push(Instruction::copy(source.clone(), join(&join(&dest_root, "archives"), rel)));
                continue;
            }
            instructions.push(instr.clone());
        } else {
            instructions.push(instr.clone());
        }
    }

    instructions.push(Instruction::mkdir(join(&dest_root, REDMOD_MODDED_SCRIPTS_DIR)));

    host.send_notification(Notification::info(
        "Mod autoconverted to REDmod",
        format!("\"{mod_name}\" was not in REDmod form and has been autoconverted to \"{tagged_name}\"."),
    ));

    Instructions::new(LayoutKind::RedModTransformedArchive, instructions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Features, ModInfo, ModVersion};
    use crate::host::RecordingHost;

    fn info_bytes(name: &str, version: &str) -> Vec<u8> {
        format!(r#"{{"name":"{name}","version":{{"v":"{version}"}}}}"#).into_bytes()
    }

    fn test_mod_info() -> ModInfo {
        ModInfo {
            name: "MyMod".into(),
            version: ModVersion { v: "1.0".into() },
            installing_dir: crate::context::InstallingDir { path_on_disk: "staging".into() },
        }
    }

    fn test_ctx<'a>(host: &'a dyn HostApi, mod_info: &'a ModInfo, features: &'a Features) -> InstallContext<'a> {
        InstallContext { host, staging_dir: std::path::Path::new("staging"), mod_info, features }
    }

    #[test]
    fn parses_minimal_info_json() {
        let info = RedModInfo::parse(&info_bytes("MyMod", "1.0")).unwrap();
        assert_eq!(info.name, "MyMod");
        assert_eq!(info.version.v, "1.0");
        assert!(!info.sounds_required());
    }

    #[test]
    fn rejects_empty_name() {
        let err = RedModInfo::parse(&info_bytes("", "1.0")).unwrap_err();
        assert!(matches!(err, InstallError::Validation(_)));
    }

    #[test]
    fn all_mod_skip_sounds_are_not_required() {
        let bytes = br#"{"name":"M","version":{"v":"1"},"customSounds":[{"type":"mod_skip"}]}"#;
        let info = RedModInfo::parse(bytes).unwrap();
        assert!(!info.sounds_required());
    }

    #[test]
    fn declared_non_skip_sounds_are_required() {
        let bytes = br#"{"name":"M","version":{"v":"1"},"customSounds":[{"type":"voice"}]}"#;
        let info = RedModInfo::parse(bytes).unwrap();
        assert!(info.sounds_required());
    }

    #[test]
    fn canonical_module_install_produces_expected_instructions() {
        let tree = FileTree::from_paths([
            "mods\\MyMod\\info.json",
            "mods\\MyMod\\archives\\a.archive",
        ]);
        let host = RecordingHost::new().with_file(
            std::path::Path::new("staging").join("mods").join("MyMod").join("info.json").to_str().unwrap(),
            info_bytes("MyMod", "1.0"),
        );
        let (mod_info, features) = (test_mod_info(), Features::default());
        let result = layout(&tree, &test_ctx(&host, &mod_info, &features)).unwrap();
        assert_eq!(result.kind, LayoutKind::RedMod(RedModLayout::Canon));
        assert!(result
            .instructions
            .contains(&Instruction::copy("mods\\MyMod\\info.json", "mods\\MyMod\\info.json")));
        assert!(result.instructions.contains(&Instruction::copy(
            "mods\\MyMod\\archives\\a.archive",
            "mods\\MyMod\\archives\\a.archive"
        )));
        assert!(result.instructions.iter().any(|i| matches!(i, Instruction::Mkdir { destination } if destination == "mods\\MyMod\\scripts\\modded")));
    }

    #[test]
    fn scripts_outside_whitelist_are_rejected() {
        let tree = FileTree::from_paths(["mods\\MyMod\\info.json", "mods\\MyMod\\scripts\\loose.reds"]);
        let host = RecordingHost::new().with_file(
            std::path::Path::new("staging").join("mods").join("MyMod").join("info.json").to_str().unwrap(),
            info_bytes("MyMod", "1.0"),
        );
        let (mod_info, features) = (test_mod_info(), Features::default());
        let err = layout(&tree, &test_ctx(&host, &mod_info, &features)).unwrap_err();
        assert!(matches!(err, InstallError::Validation(_)));
    }

    #[test]
    fn autoconvert_rewrites_archive_destinations() {
        let archive = Instructions::new(
            LayoutKind::Archive(crate::instructions::ArchiveLayout::Canon),
            vec![Instruction::copy("X.archive", "archive\\pc\\mod\\X.archive")],
        );
        let host = RecordingHost::new();
        let converted = autoconvert(&host, &archive, "X", "1.0");
        assert_eq!(converted.kind, LayoutKind::RedModTransformedArchive);
        assert!(converted
            .instructions
            .iter()
            .any(|i| i.destination() == "mods\\X_autoconverted\\archives\\X.archive"));
        assert!(converted
            .instructions
            .iter()
            .any(|i| i.destination() == "mods\\X_autoconverted\\info.json"));
        assert_eq!(host.notifications.borrow().len(), 1);
    }
}
