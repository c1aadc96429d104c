use phf::phf_map;

use crate::attribute::{Meaning, SemanticFont as F, SemanticRole as R, SemanticType as T};

/// U+2062, the operator inserted between juxtaposed operands.
pub const INVISIBLE_TIMES: &str = "\u{2062}";
/// U+2063, the separator inserted between the parts of a two-token differential.
pub const INVISIBLE_COMMA: &str = "\u{2063}";
/// U+2061, the marker placed between a function and its argument.
pub const FUNCTION_APPLICATION: &str = "\u{2061}";

/// Maps a token's text to its default meaning.
///
/// Implementations must be deterministic: the same text always yields the same triple.
/// Unknown text maps to [`Meaning::default`], i.e. unknown type, role and font.
pub trait SymbolClassifier {
    fn classify(&self, text: &str) -> Meaning;

    fn invisible_times(&self) -> &str {
        INVISIBLE_TIMES
    }

    fn invisible_comma(&self) -> &str {
        INVISIBLE_COMMA
    }

    fn function_application(&self) -> &str {
        FUNCTION_APPLICATION
    }

    /// Whether `ch` can open a differential such as `dx`.
    fn is_character_d(&self, ch: char) -> bool {
        is_character_d(ch)
    }
}

/// The built-in symbol table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolTable;

impl SymbolClassifier for SymbolTable {
    fn classify(&self, text: &str) -> Meaning {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => classify_char(ch).unwrap_or_default(),
            (Some(_), Some(_)) => FUNCTION_NAMES.get(text).copied().unwrap_or_default(),
            _ => Meaning::default(),
        }
    }
}

pub fn is_character_d(ch: char) -> bool {
    match ch {
        'd' | 'ⅆ' | 'ｄ' => true,
        // Every alphabet in the Mathematical Alphanumeric Symbols block has `d` at offset 29.
        '\u{1D400}'..='\u{1D6A3}' => (ch as u32 - 0x1D400) % 52 == 29,
        _ => false,
    }
}

const PREFIX_FUNC: Meaning = Meaning::new(T::Function, R::PrefixFunc, F::Normal);
const LIMIT_FUNC: Meaning = Meaning::new(T::Function, R::LimFunc, F::Normal);

static FUNCTION_NAMES: phf::Map<&'static str, Meaning> = phf_map! {
    "arccos" => PREFIX_FUNC,
    "arccosh" => PREFIX_FUNC,
    "arccot" => PREFIX_FUNC,
    "arccoth" => PREFIX_FUNC,
    "arccsc" => PREFIX_FUNC,
    "arccsch" => PREFIX_FUNC,
    "arcsec" => PREFIX_FUNC,
    "arcsech" => PREFIX_FUNC,
    "arcsin" => PREFIX_FUNC,
    "arcsinh" => PREFIX_FUNC,
    "arctan" => PREFIX_FUNC,
    "arctanh" => PREFIX_FUNC,
    "arg" => PREFIX_FUNC,
    "cos" => PREFIX_FUNC,
    "cosh" => PREFIX_FUNC,
    "cot" => PREFIX_FUNC,
    "coth" => PREFIX_FUNC,
    "csc" => PREFIX_FUNC,
    "csch" => PREFIX_FUNC,
    "deg" => PREFIX_FUNC,
    "det" => PREFIX_FUNC,
    "dim" => PREFIX_FUNC,
    "erf" => PREFIX_FUNC,
    "exp" => PREFIX_FUNC,
    "gcd" => PREFIX_FUNC,
    "hom" => PREFIX_FUNC,
    "ker" => PREFIX_FUNC,
    "lcm" => PREFIX_FUNC,
    "lg" => PREFIX_FUNC,
    "ln" => PREFIX_FUNC,
    "log" => PREFIX_FUNC,
    "Pr" => PREFIX_FUNC,
    "sec" => PREFIX_FUNC,
    "sech" => PREFIX_FUNC,
    "sgn" => PREFIX_FUNC,
    "sin" => PREFIX_FUNC,
    "sinh" => PREFIX_FUNC,
    "tan" => PREFIX_FUNC,
    "tanh" => PREFIX_FUNC,
    "inf" => LIMIT_FUNC,
    "injlim" => LIMIT_FUNC,
    "lim" => LIMIT_FUNC,
    "liminf" => LIMIT_FUNC,
    "limsup" => LIMIT_FUNC,
    "max" => LIMIT_FUNC,
    "min" => LIMIT_FUNC,
    "projlim" => LIMIT_FUNC,
    "sup" => LIMIT_FUNC,
};

const LATIN_ALPHABETS: [F; 13] = [
    F::Bold,
    F::Italic,
    F::BoldItalic,
    F::Script,
    F::BoldScript,
    F::Fraktur,
    F::DoubleStruck,
    F::BoldFraktur,
    F::SansSerif,
    F::SansSerifBold,
    F::SansSerifItalic,
    F::SansSerifBoldItalic,
    F::Monospace,
];

const GREEK_ALPHABETS: [F; 5] = [
    F::Bold,
    F::Italic,
    F::BoldItalic,
    F::SansSerifBold,
    F::SansSerifBoldItalic,
];

const DIGIT_SETS: [F; 5] = [
    F::Bold,
    F::DoubleStruck,
    F::SansSerif,
    F::SansSerifBold,
    F::Monospace,
];

/// Classifies a character from the Mathematical Alphanumeric Symbols block (U+1D400–U+1D7FF).
fn math_alphanumeric(ch: char) -> Option<Meaning> {
    let cp = ch as u32;
    match cp {
        0x1D400..=0x1D6A3 => {
            let font = *LATIN_ALPHABETS.get(((cp - 0x1D400) / 52) as usize)?;
            Some(Meaning::new(T::Identifier, R::LatinLetter, font))
        }
        // Dotless i and j.
        0x1D6A4 | 0x1D6A5 => Some(Meaning::new(T::Identifier, R::LatinLetter, F::Italic)),
        0x1D6A8..=0x1D7C9 => {
            let font = *GREEK_ALPHABETS.get(((cp - 0x1D6A8) / 58) as usize)?;
            Some(Meaning::new(T::Identifier, R::GreekLetter, font))
        }
        0x1D7CE..=0x1D7FF => {
            let font = *DIGIT_SETS.get(((cp - 0x1D7CE) / 10) as usize)?;
            Some(Meaning::new(T::Number, R::Integer, font))
        }
        _ => None,
    }
}

fn classify_char(ch: char) -> Option<Meaning> {
    let (node_type, role, font) = match ch {
        // Punctuation
        ',' | '\u{2063}' | '﹐' | '，' | '︐' => (T::Punctuation, R::Comma, F::Unknown),
        ':' | '∶' | '︓' | '：' | '﹕' => (T::Punctuation, R::Colon, F::Unknown),
        '…' | '⋮' | '⋯' | '⋰' | '⋱' | '︙' => (T::Punctuation, R::Ellipsis, F::Unknown),
        '.' | '﹒' | '．' => (T::Punctuation, R::FullStop, F::Unknown),
        '‐' | '‑' | '‒' | '–' | '—' | '―' | '﹘' => (T::Punctuation, R::Dash, F::Unknown),
        '\'' | '′' | '″' | '‴' | '‵' | '‶' | '‷' | '⁗' | 'ʹ' | 'ʺ' => {
            (T::Punctuation, R::Prime, F::Unknown)
        }
        '!' | '"' | '#' | '%' | '&' | ';' | '?' | '@' | '\\' | '¡' | '§' | '¶' | '¿' | '‗'
        | '†' | '‡' | '•' | '‣' | '․' | '‥' | '‧' | '‰' | '‱' | '‸' | '※' | '‼' | '‽' | '⁁'
        | '⁂' | '⁃' | '⁇' | '⁈' | '⁉' => (T::Punctuation, R::Unknown, F::Unknown),

        // Fences
        '(' | '[' | '{' | '⟨' | '〈' | '⌈' | '⌊' | '⟦' | '⦃' | '⁅' | '❨' | '｛' | '（' | '［'
        | '⟮' | '⦅' => (T::Fence, R::Open, F::Unknown),
        ')' | ']' | '}' | '⟩' | '〉' | '⌉' | '⌋' | '⟧' | '⦄' | '⁆' | '❩' | '｝' | '）' | '］'
        | '⟯' | '⦆' => (T::Fence, R::Close, F::Unknown),
        '⎴' | '⏜' | '⏞' | '⏠' => (T::Fence, R::Top, F::Unknown),
        '⎵' | '⏝' | '⏟' | '⏡' => (T::Fence, R::Bottom, F::Unknown),
        '|' | '‖' | '¦' | '∣' | '⏐' | '⎸' | '⎹' | '∥' | '❘' | '｜' | '￤' | '︱' | '︲' => {
            (T::Fence, R::Neutral, F::Unknown)
        }

        // Operators
        '+' | '±' | '∓' | '∔' | '∧' | '∨' | '∩' | '∪' | '⊌' | '⊍' | '⊎' | '⊓' | '⊔' | '⊕'
        | '⊝' | '⊞' | '⊻' | '⊼' | '⋄' | '⋎' | '⋏' | '⋒' | '⋓' | '＋' | '﹢' | '\u{2064}' => {
            (T::Operator, R::Addition, F::Unknown)
        }
        '*' | '×' | '·' | '∗' | '∘' | '∙' | '≀' | '⊗' | '⊙' | '⊚' | '⊛' | '⊠' | '⊡' | '⋅'
        | '⋆' | '⋇' | '⋈' | '⋉' | '⋊' | '⋋' | '⋌' | '○' | '\u{2062}' => {
            (T::Operator, R::Multiplication, F::Unknown)
        }
        '-' | '⁒' | '⁻' | '₋' | '−' | '∖' | '∸' | '⊖' | '⊟' | '➖' | '⨩' | '⨪' | '⨫' | '⨬'
        | '⨺' | '⩁' | '﹣' | '－' => (T::Operator, R::Subtraction, F::Unknown),
        '/' | '÷' | '⁄' | '∕' | '⊘' | '⟌' | '⦼' | '⨸' => (T::Operator, R::Division, F::Unknown),
        '\u{2061}' => (T::Operator, R::Application, F::Unknown),

        // Relations
        '=' | '~' | '∼' | '∽' | '≃' | '≅' | '≈' | '≊' | '≋' | '≌' | '≍' | '≎' | '≏' | '≐'
        | '≑' | '≒' | '≓' | '≔' | '≕' | '≜' | '≝' | '≟' | '≡' | '＝' | '﹦' => {
            (T::Relation, R::Equality, F::Unknown)
        }
        '<' | '>' | '≠' | '≤' | '≥' | '≦' | '≧' | '≨' | '≩' | '≪' | '≫' | '≮' | '≯' | '≰'
        | '≱' | '≲' | '≳' | '≺' | '≻' | '≼' | '≽' | '≁' | '≄' | '≇' | '≉' | '≢' | '⩽' | '⩾' => {
            (T::Relation, R::Inequality, F::Unknown)
        }
        '∈' | '∉' | '∋' | '∌' | '⊂' | '⊃' | '⊄' | '⊅' | '⊆' | '⊇' | '⊊' | '⊋' => {
            (T::Relation, R::Element, F::Unknown)
        }
        '←' | '↑' | '→' | '↓' | '↔' | '↕' | '↦' | '⇐' | '⇑' | '⇒' | '⇓' | '⇔' | '⟵' | '⟶'
        | '⟷' | '⟸' | '⟹' | '⟺' | '⟼' => (T::Relation, R::Arrow, F::Unknown),

        // Large operators
        '∑' | '∏' | '∐' | '⋀' | '⋁' | '⋂' | '⋃' | '⨀' | '⨁' | '⨂' | '⨃' | '⨄' | '⨅' | '⨆'
        | '⨉' | '⅀' | '⫿' => (T::LargeOp, R::Sum, F::Unknown),
        '∫' | '∬' | '∭' | '∮' | '∯' | '∰' | '∱' | '∲' | '∳' | '⨌'..='⨜' => {
            (T::LargeOp, R::Integral, F::Unknown)
        }

        // Letters
        'a'..='z' | 'A'..='Z' | 'ı' | 'ȷ' | 'ℎ' => (T::Identifier, R::LatinLetter, F::Italic),
        'α'..='ω' | 'ϐ' | 'ϑ' | 'ϕ' | 'ϖ' | 'ϰ' | 'ϱ' | 'ϵ' => {
            (T::Identifier, R::GreekLetter, F::Italic)
        }
        'Α'..='Ω' => (T::Identifier, R::GreekLetter, F::Normal),
        'ℵ' | 'ℶ' | 'ℷ' | 'ℸ' | 'ℏ' | 'ℓ' | '℘' => (T::Identifier, R::OtherLetter, F::Normal),
        'ⅆ' | 'ⅇ' | 'ⅈ' | 'ⅉ' | 'ℂ' | 'ℍ' | 'ℕ' | 'ℙ' | 'ℚ' | 'ℝ' | 'ℤ' => {
            (T::Identifier, R::LatinLetter, F::DoubleStruck)
        }
        'ℬ' | 'ℰ' | 'ℱ' | 'ℋ' | 'ℐ' | 'ℒ' | 'ℳ' | 'ℛ' | 'ℯ' | 'ℊ' | 'ℴ' => {
            (T::Identifier, R::LatinLetter, F::Script)
        }
        'ℭ' | 'ℌ' | 'ℑ' | 'ℜ' | 'ℨ' => (T::Identifier, R::LatinLetter, F::Fraktur),
        'Ａ'..='Ｚ' | 'ａ'..='ｚ' => (T::Identifier, R::LatinLetter, F::FullWidth),

        // Numbers
        '0'..='9' => (T::Number, R::Integer, F::Normal),
        '０'..='９' => (T::Number, R::Integer, F::FullWidth),

        '\u{1D400}'..='\u{1D7FF}' => return math_alphanumeric(ch),
        _ => return None,
    };
    Some(Meaning::new(node_type, role, font))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Meaning {
        SymbolTable.classify(text)
    }

    #[test]
    fn letters_and_digits() {
        assert_eq!(
            classify("x"),
            Meaning::new(T::Identifier, R::LatinLetter, F::Italic)
        );
        assert_eq!(
            classify("Γ"),
            Meaning::new(T::Identifier, R::GreekLetter, F::Normal)
        );
        assert_eq!(
            classify("β"),
            Meaning::new(T::Identifier, R::GreekLetter, F::Italic)
        );
        assert_eq!(classify("7"), Meaning::new(T::Number, R::Integer, F::Normal));
    }

    #[test]
    fn operators_and_relations() {
        assert_eq!(classify("+").role, R::Addition);
        assert_eq!(classify("−").role, R::Subtraction);
        assert_eq!(classify(INVISIBLE_TIMES).role, R::Multiplication);
        assert_eq!(classify("=").node_type, T::Relation);
        assert_eq!(classify("≤").role, R::Inequality);
        assert_eq!(
            classify(FUNCTION_APPLICATION),
            Meaning::new(T::Operator, R::Application, F::Unknown)
        );
    }

    #[test]
    fn fences_and_punctuation() {
        assert_eq!(classify("(").role, R::Open);
        assert_eq!(classify("]").role, R::Close);
        assert_eq!(classify("|").role, R::Neutral);
        assert_eq!(classify(",").role, R::Comma);
        assert_eq!(classify(INVISIBLE_COMMA).role, R::Comma);
        assert_eq!(classify("…").role, R::Ellipsis);
    }

    #[test]
    fn large_operators_and_functions() {
        assert_eq!(classify("∑"), Meaning::new(T::LargeOp, R::Sum, F::Unknown));
        assert_eq!(classify("∫").role, R::Integral);
        assert_eq!(classify("sin"), PREFIX_FUNC);
        assert_eq!(classify("lim"), LIMIT_FUNC);
    }

    #[test]
    fn math_alphanumerics() {
        assert_eq!(classify("𝐱").font, F::Bold);
        assert_eq!(classify("𝑥").font, F::Italic);
        assert_eq!(classify("𝔄").font, F::Fraktur);
        assert_eq!(classify("𝚡").font, F::Monospace);
        assert_eq!(
            classify("𝛂"),
            Meaning::new(T::Identifier, R::GreekLetter, F::Bold)
        );
        assert_eq!(classify("𝟙"), Meaning::new(T::Number, R::Integer, F::DoubleStruck));
    }

    #[test]
    fn unknown_text() {
        assert_eq!(classify(""), Meaning::default());
        assert_eq!(classify("xyz"), Meaning::default());
        assert_eq!(classify("☃"), Meaning::default());
    }

    #[test]
    fn differential_characters() {
        for ch in ['d', 'ⅆ', 'ｄ', '𝐝', '𝑑', '𝒹', '𝓭', '𝔡', '𝕕', '𝖉', '𝖽', '𝗱', '𝘥', '𝚍'] {
            assert!(is_character_d(ch), "{ch:?}");
        }
        assert!(!is_character_d('D'));
        assert!(!is_character_d('𝐞'));
    }
}
