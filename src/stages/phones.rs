use std::path::Path;

use tracing::debug;

use crate::error::PrepResult;
use crate::io::write_manifest;
use crate::models::CorpusVariant;

/// Emit the static phone inventory files: `phones.txt` (phone to display
/// symbol), `silences.txt` (one symbol per line) and `variants.txt` (one
/// space-joined grouping per line). These come straight from the variant
/// configuration and have no data dependency.
pub fn emit_phone_inventory(
    variant: &CorpusVariant,
    phones_file: &Path,
    silences_file: &Path,
    variants_file: &Path,
) -> PrepResult<()> {
    let mut phones = String::new();
    for (phone, display) in variant.phones {
        phones.push_str(&format!("{phone} {display}\n"));
    }
    write_manifest(phones_file, &phones)?;

    let mut silences = String::new();
    for sil in variant.silences {
        silences.push_str(sil);
        silences.push('\n');
    }
    write_manifest(silences_file, &silences)?;

    let mut variants = String::new();
    for group in variant.variants {
        variants.push_str(&group.join(" "));
        variants.push('\n');
    }
    write_manifest(variants_file, &variants)?;

    debug!("wrote phone inventory for variant {}", variant.name);
    Ok(())
}
