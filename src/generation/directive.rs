//! Identity-preservation wrapper applied to every instruction

/// Fixed rules appended after the caller's instruction.
pub const IDENTITY_DIRECTIVE: &str = "**CRITICAL INSTRUCTIONS:**
1.  **PRESERVE IDENTITY:** The final image must be of the **exact same person**. Do NOT alter their facial features, bone structure, skin tone, eye color, or unique characteristics.
2.  **EDIT, DO NOT REPLACE:** You are only changing the background, lighting, and clothing to match the style request. You are NOT generating a new person. The result must be a photorealistic edit of the original individual.";

const PREAMBLE: &str = "You are an expert headshot photographer. Your task is to edit the provided selfie into a professional headshot.";

/// Wrap `instruction` verbatim between the preamble and the identity rules.
pub fn compose(instruction: &str) -> String {
    format!(
        "{PREAMBLE}\nStyle request: \"{instruction}\"\n\n{IDENTITY_DIRECTIVE}"
    )
}
