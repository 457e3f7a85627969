// src/templates/codec.rs
//
// Transcoding for single-character-array payloads (in-place array problems).
// An input like `["h","e","l","l","o"]` is collapsed to the flat string
// `hello` before it is handed to the user's program, and flat program output
// is expanded back to array form before comparison. Both directions must stay
// symmetric or comparisons silently fail.

/// Parses a payload as a JSON array of single-character strings.
/// Returns `None` for anything else, including arrays with a multi-character
/// element. An empty array is not a char array: `[]` means an empty list of
/// whatever the payload's element type is, and must keep its literal form
/// through both stdin encoding and output comparison.
pub fn as_char_array(payload: &str) -> Option<Vec<String>> {
    let values: Vec<String> = serde_json::from_str(payload.trim()).ok()?;
    if !values.is_empty() && values.iter().all(|v| v.chars().count() == 1) {
        Some(values)
    } else {
        None
    }
}

/// Collapses a character array into its flat string form.
pub fn encode_char_array(chars: &[String]) -> String {
    chars.concat()
}

/// Expands flat output back into the character-array representation.
pub fn decode_char_array(flat: &str) -> Vec<String> {
    flat.chars().map(|c| c.to_string()).collect()
}
