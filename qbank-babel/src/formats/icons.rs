//! Shared icon mapping for tree visualization formats

/// Get the Unicode icon for a node of the inspection tree
///
/// Category nodes use `"Category"`, questions their Moodle type name, answers
/// `"Right"` or `"Wrong"`.
pub fn get_icon(node_type: &str) -> &'static str {
    match node_type {
        "Bank" => "⧉",
        "Category" => "§",
        "description" => "¶",
        "essay" => "✎",
        "truefalse" => "⊤",
        "numerical" | "calculated" | "calculatedmulti" => "#",
        "multichoice" => "☰",
        "shortanswer" => "…",
        "match" | "randomsamatch" => "⇄",
        "gapselect" | "ddwtos" => "▭",
        "cloze" => "{",
        "ddimageortext" | "ddmarker" => "⌖",
        "problem" => "⧈",
        "Right" => "✓",
        "Wrong" => "✗",
        "Partial" => "±",
        _ => "○",
    }
}
