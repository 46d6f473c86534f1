//! Complex-script detection by Unicode block

/// Scripts that need shaping before they can be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComplexScript {
    Devanagari,
    Bengali,
    Tamil,
    Telugu,
    Kannada,
    Malayalam,
    Thai,
}

/// Unicode blocks, in code point order
const SCRIPT_BLOCKS: [(ComplexScript, char, char); 7] = [
    (ComplexScript::Devanagari, '\u{0900}', '\u{097F}'),
    (ComplexScript::Bengali, '\u{0980}', '\u{09FF}'),
    (ComplexScript::Tamil, '\u{0B80}', '\u{0BFF}'),
    (ComplexScript::Telugu, '\u{0C00}', '\u{0C7F}'),
    (ComplexScript::Kannada, '\u{0C80}', '\u{0CFF}'),
    (ComplexScript::Malayalam, '\u{0D00}', '\u{0D7F}'),
    (ComplexScript::Thai, '\u{0E00}', '\u{0E7F}'),
];

impl ComplexScript {
    /// First and last code point of the script's block
    pub fn block(self) -> (char, char) {
        SCRIPT_BLOCKS
            .iter()
            .find(|(script, _, _)| *script == self)
            .map(|(_, start, end)| (*start, *end))
            .unwrap_or(('\u{0}', '\u{0}'))
    }

    /// Whether `c` belongs to this script's block
    pub fn contains(self, c: char) -> bool {
        let (start, end) = self.block();
        (start..=end).contains(&c)
    }

    /// OpenType script tag
    pub fn tag(self) -> &'static str {
        match self {
            ComplexScript::Devanagari => "deva",
            ComplexScript::Bengali => "beng",
            ComplexScript::Tamil => "taml",
            ComplexScript::Telugu => "telu",
            ComplexScript::Kannada => "knda",
            ComplexScript::Malayalam => "mlym",
            ComplexScript::Thai => "thai",
        }
    }
}

/// Complex script a character belongs to, if any
pub fn script_of(c: char) -> Option<ComplexScript> {
    if (c as u32) < 0x0900 {
        return None;
    }
    SCRIPT_BLOCKS
        .iter()
        .find(|(_, start, end)| (*start..=*end).contains(&c))
        .map(|(script, _, _)| *script)
}

/// Check if a character is in the Tamil block (U+0B80–U+0BFF)
pub fn is_tamil_char(c: char) -> bool {
    ComplexScript::Tamil.contains(c)
}

/// Check if text contains any Tamil characters
pub fn contains_tamil(text: &str) -> bool {
    text.chars().any(is_tamil_char)
}

/// First complex script found in the text
pub fn detect_complex_script(text: &str) -> Option<ComplexScript> {
    text.chars().find_map(script_of)
}

/// Check if text contains any character that needs shaping
pub fn contains_complex_script(text: &str) -> bool {
    detect_complex_script(text).is_some()
}

/// Distinct complex scripts in order of first appearance
pub fn scripts_in(text: &str) -> Vec<ComplexScript> {
    let mut scripts = Vec::new();
    for script in text.chars().filter_map(script_of) {
        if !scripts.contains(&script) {
            scripts.push(script);
        }
    }
    scripts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_tamil_char() {
        assert!(is_tamil_char('அ'));
        assert!(is_tamil_char('\u{0B80}'));
        assert!(is_tamil_char('\u{0BFF}'));
        assert!(is_tamil_char('்'));
        assert!(!is_tamil_char('\u{0B7F}'));
        assert!(!is_tamil_char('\u{0C00}'));
        assert!(!is_tamil_char('A'));
    }

    #[test]
    fn test_detect_complex_script() {
        assert_eq!(detect_complex_script("Hello"), None);
        assert_eq!(detect_complex_script("ஜான்"), Some(ComplexScript::Tamil));
        assert_eq!(
            detect_complex_script("Rev. ஜான் Paul"),
            Some(ComplexScript::Tamil)
        );
        assert_eq!(detect_complex_script("नमस्ते"), Some(ComplexScript::Devanagari));
        assert_eq!(detect_complex_script("สวัสดี"), Some(ComplexScript::Thai));
    }

    #[test]
    fn test_contains_complex_script() {
        assert!(!contains_complex_script(""));
        assert!(!contains_complex_script("Café 123"));
        assert!(contains_complex_script("12 தெரு"));
        assert!(contains_tamil("12 தெரு"));
        assert!(!contains_tamil("नमस्ते"));
    }

    #[test]
    fn test_scripts_in() {
        assert_eq!(scripts_in("abc"), vec![]);
        assert_eq!(
            scripts_in("தமிழ் and हिन्दी and தமிழ்"),
            vec![ComplexScript::Tamil, ComplexScript::Devanagari]
        );
    }

    #[test]
    fn test_blocks_and_tags() {
        assert_eq!(ComplexScript::Tamil.block(), ('\u{0B80}', '\u{0BFF}'));
        assert_eq!(ComplexScript::Tamil.tag(), "taml");
        assert!(ComplexScript::Malayalam.contains('\u{0D05}'));
    }
}
