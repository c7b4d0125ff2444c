//! Canonical destination prefixes, extensions, and known-file tables shared
//! by every layout detector. Values here are bit-exact with spec.md §6's
//! canonical destination prefix table.

/// `archive\pc\mod\`
pub const ARCHIVE_MOD_PREFIX: &str = "archive\\pc\\mod";
/// `archive\pc\patch\` — Heritage layout, rewritten to [`ARCHIVE_MOD_PREFIX`].
pub const ARCHIVE_PATCH_PREFIX: &str = "archive\\pc\\patch";

/// `bin\x64\plugins\cyber_engine_tweaks\mods\`
pub const CET_MODS_PREFIX: &str = "bin\\x64\\plugins\\cyber_engine_tweaks\\mods";
/// `bin\x64\`
pub const BIN_X64_PREFIX: &str = "bin\\x64";
/// The one reserved CET global config file under `bin\x64\`.
pub const CET_GLOBAL_INI: &str = "global.ini";

/// `r6\scripts\`
pub const REDSCRIPT_PREFIX: &str = "r6\\scripts";
/// `r6\config\settings\`
pub const R6_SETTINGS_PREFIX: &str = "r6\\config\\settings";

/// `red4ext\plugins\`
pub const RED4EXT_PREFIX: &str = "red4ext\\plugins";

/// `engine\config\platform\pc\`
pub const INI_CONFIG_PREFIX: &str = "engine\\config\\platform\\pc";

/// `mods\` — REDmod base directory.
pub const REDMOD_BASE: &str = "mods";

/// `.reds` source file extension for Redscript.
pub const REDS_EXT: &str = "reds";
/// `.lua` source files for CET.
pub const LUA_EXT: &str = "lua";
/// The file that marks a CET mod directory.
pub const CET_INIT_FILE: &str = "init.lua";
/// `.dll` extension for Red4Ext plugins.
pub const DLL_EXT: &str = "dll";
/// `.archive` — packed content archive.
pub const ARCHIVE_EXT: &str = "archive";
/// `.xl` — ArchiveXL companion file.
pub const XL_EXT: &str = "xl";
/// `.ini` config files (engine config or Reshade).
pub const INI_EXT: &str = "ini";
/// `.json` config/data files.
pub const JSON_EXT: &str = "json";
/// `.yaml`/`.yml` — TweakXL tweak definitions.
pub const TWEAK_EXTS: &[&str] = &["yaml", "yml"];

/// DLL basenames that must never be overridden by a mod — found in the
/// game's own runtime, never legitimately shipped by a Red4Ext mod.
pub const RED4EXT_FORBIDDEN_DLLS: &[&str] = &[
    "clrcompression.dll",
    "clrjit.dll",
    "coreclr.dll",
    "hostfxr.dll",
    "hostpolicy.dll",
    "mscordaccore.dll",
    "mscordbi.dll",
    "red4ext.dll",
];

/// Basename -> canonical destination (relative to game root) for JSON files
/// the JSON installer recognizes outside `r6\config\settings\`.
pub const KNOWN_JSON_FILES: &[(&str, &str)] = &[
    ("giweights.json", "engine\\config\\giweights.json"),
    ("bumpersSettings.json", "engine\\config\\bumpersSettings.json"),
    ("placeablesInfo.json", "engine\\config\\placeablesInfo.json"),
];

/// `options.json`'s own required canonical basename (validated against
/// [`R6_SETTINGS_PREFIX`] rather than [`KNOWN_JSON_FILES`]).
pub const OPTIONS_JSON: &str = "options.json";

/// Sidecar file extensions the JSON installer lets ride along in place.
pub const JSON_SIDECAR_EXTS: &[&str] = &["txt", "md"];

/// Whitelisted subdirectory names directly under a REDmod module's
/// `scripts\` directory.
pub const REDMOD_SCRIPTS_SUBDIRS: &[&str] = &["exec", "modules"];

/// The single whitelisted subdirectory directly under a REDmod module's
/// `tweaks\` directory.
pub const REDMOD_TWEAKS_SUBDIR: &str = "core";

/// Recognized audio file extensions under a REDmod module's
/// `customSounds\` directory.
pub const REDMOD_SOUND_EXTS: &[&str] = &["wav", "mp3", "ogg", "opus"];

/// Subtype directory names that make a directory a recognized REDmod
/// module root (at least one must be present, alongside `info.json`).
pub const REDMOD_SUBTYPE_DIRS: &[&str] = &["archives", "customSounds", "scripts", "tweaks"];

/// Relative path (within a REDmod module) to the script compiler's modded
/// scripts output directory; a `mkdir` instruction targets this so the
/// compiler has somewhere to write even when a module ships no scripts.
pub const REDMOD_MODDED_SCRIPTS_DIR: &str = "scripts\\modded";

/// Marker appended to an autoconverted archive-only mod's name.
pub const AUTOCONVERT_SUFFIX: &str = "_autoconverted";

/// `reshade-shaders` directory name, relocated under `bin\x64\` verbatim.
pub const RESHADE_SHADERS_DIR: &str = "reshade-shaders";
