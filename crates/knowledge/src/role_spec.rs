//! The auto-generated role specification digest.
//!
//! A markdown rendering of the full persona table, kept as a synthetic
//! project document so the orchestrator persona can delegate with accurate
//! knowledge of every role's remit. Regenerated whenever a persona changes.

use cortex_core::persona::PersonaSet;
use std::fmt::Write;

/// Reserved document id for the digest. Uploads never collide with this
/// because generated ids are numeric.
pub const ROLE_SPEC_ID: &str = "default-role-specs";

/// Display name of the digest document.
pub const ROLE_SPEC_NAME: &str = "role_specialisation.md";

/// Type tag of the digest document.
pub const ROLE_SPEC_TYPE: &str = "text/markdown";

/// Render the digest for the current persona set.
///
/// Output is deterministic for a given set; the sync path relies on
/// content equality to detect no-op regenerations.
pub fn render(personas: &PersonaSet) -> String {
    let mut out = String::from(
        "# Cortex Data Nexus - Role Specifications\n\n\
         > **Auto-Generated**: This context is dynamically synced with your Role Settings.\n\n",
    );
    let sections: Vec<String> = personas
        .iter()
        .map(|p| {
            let mut s = String::new();
            // write! to a String cannot fail.
            let _ = write!(
                s,
                "## {}\n**Title:** {}\n**Description:** {}\n**System Instruction:**\n```text\n{}\n```\n",
                p.name, p.title, p.description, p.system_instruction
            );
            s
        })
        .collect();
    out.push_str(&sections.join("\n"));
    out.push('\n');
    out
}
