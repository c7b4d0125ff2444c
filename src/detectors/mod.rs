//! One module per mod-kind detector (spec.md §4.3's common `detect`/`layout`
//! contract), plus the small pieces of shared behavior every disambiguating
//! detector needs: the "more than one mutually-exclusive layout present"
//! dialog, and the relocation name synthesized from the staging directory.

pub mod archive;
pub mod cet;
pub mod core;
pub mod fallback;
pub mod ini;
pub mod json;
pub mod multitype;
pub mod red4ext;
pub mod redscript;
pub mod tweakxl;

use crate::context::InstallContext;
use crate::host::DialogSeverity;

/// Surface the exactly-one-layout-violation dialog (spec.md §4.3) and
/// report whether the user chose to fall back rather than abort.
pub(crate) fn offer_fallback_or_abort(ctx: &InstallContext, title: &str, body: &str) -> bool {
    ctx.host.show_dialog(DialogSeverity::Warning, title, body, &["Fallback", "Abort"]) == "Fallback"
}

/// The mod name a Basedir/Toplevel detector synthesizes when relocating
/// loose files into a named directory — spec.md §4.5's synthesis rule:
/// `basename(destinationPath)` with a trailing `.installing` suffix
/// stripped. `destinationPath` is the host's staging directory.
pub(crate) fn synthesized_mod_name(ctx: &InstallContext) -> String {
    let raw = ctx.staging_dir.file_name().and_then(|n| n.to_str()).unwrap_or("Mod");
    raw.strip_suffix(".installing").unwrap_or(raw).to_string()
}
