//! OCR language table and language detection (whatlang).

use serde::Serialize;
use tracing::debug;

/// A supported OCR language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

const LANGUAGES: &[(&str, &str)] = &[
    // Major
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("zh", "Chinese (Simplified)"),
    ("zh-tw", "Chinese (Traditional)"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("th", "Thai"),
    ("vi", "Vietnamese"),
    ("id", "Indonesian"),
    ("ms", "Malay"),
    ("tl", "Filipino/Tagalog"),
    // European
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("uk", "Ukrainian"),
    ("cs", "Czech"),
    ("el", "Greek"),
    ("hu", "Hungarian"),
    ("ro", "Romanian"),
    ("sv", "Swedish"),
    ("da", "Danish"),
    ("fi", "Finnish"),
    ("no", "Norwegian"),
    ("tr", "Turkish"),
    ("he", "Hebrew"),
    // South Asian
    ("bn", "Bengali"),
    ("ta", "Tamil"),
    ("te", "Telugu"),
    ("mr", "Marathi"),
    ("gu", "Gujarati"),
    ("kn", "Kannada"),
    ("ml", "Malayalam"),
    ("pa", "Punjabi"),
    ("ur", "Urdu"),
    // Others
    ("fa", "Persian/Farsi"),
    ("sw", "Swahili"),
    ("am", "Amharic"),
    ("my", "Burmese"),
    ("km", "Khmer"),
    ("lo", "Lao"),
    ("ne", "Nepali"),
    ("si", "Sinhala"),
];

const RTL_LANGUAGES: &[&str] = &["ar", "he", "fa", "ur"];

/// Language returned when detection has nothing to go on.
pub const DEFAULT_LANGUAGE: &str = "en";

/// All supported languages, sorted by display name.
pub fn supported_languages() -> Vec<Language> {
    let mut langs: Vec<Language> = LANGUAGES
        .iter()
        .map(|&(code, name)| Language { code, name })
        .collect();
    langs.sort_by_key(|l| l.name);
    langs
}

/// Display name for a code, or the code itself when unknown.
pub fn language_name(code: &str) -> &str {
    LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

pub fn is_supported(code: &str) -> bool {
    LANGUAGES.iter().any(|(c, _)| *c == code)
}

pub fn is_rtl_language(code: &str) -> bool {
    RTL_LANGUAGES.contains(&code)
}

// ── Detection ────────────────────────────────────────────────────────────────

/// Table code for a whatlang (ISO 639-3) code, when the table has one.
fn table_code(iso639_3: &str) -> Option<&'static str> {
    let code = match iso639_3 {
        "eng" => "en",
        "spa" => "es",
        "fra" => "fr",
        "deu" => "de",
        "ita" => "it",
        "por" => "pt",
        "rus" => "ru",
        "cmn" => "zh",
        "jpn" => "ja",
        "kor" => "ko",
        "ara" => "ar",
        "hin" => "hi",
        "tha" => "th",
        "vie" => "vi",
        "ind" => "id",
        "tgl" => "tl",
        "nld" => "nl",
        "pol" => "pl",
        "ukr" => "uk",
        "ces" => "cs",
        "ell" => "el",
        "hun" => "hu",
        "ron" => "ro",
        "swe" => "sv",
        "dan" => "da",
        "fin" => "fi",
        "nob" => "no",
        "tur" => "tr",
        "heb" => "he",
        "ben" => "bn",
        "tam" => "ta",
        "tel" => "te",
        "mar" => "mr",
        "guj" => "gu",
        "kan" => "kn",
        "mal" => "ml",
        "pan" => "pa",
        "urd" => "ur",
        "pes" => "fa",
        "amh" => "am",
        "mya" => "my",
        "khm" => "km",
        "nep" => "ne",
        "sin" => "si",
        _ => return None,
    };
    Some(code)
}

/// Best-guess language code for `text`.
///
/// Uses whatlang's trigram model and maps the result onto the table.
/// Languages outside the table, and text with nothing to go on, yield
/// [`DEFAULT_LANGUAGE`].
pub fn detect_language(text: &str) -> &'static str {
    let Some(info) = whatlang::detect(text) else {
        return DEFAULT_LANGUAGE;
    };
    let detected = info.lang().code();
    match table_code(detected) {
        Some(code) => code,
        None => {
            debug!("Detected language '{}' is not in the table", detected);
            DEFAULT_LANGUAGE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_by_name() {
        let langs = supported_languages();
        assert_eq!(langs.len(), LANGUAGES.len());
        assert!(langs.windows(2).all(|w| w[0].name <= w[1].name));
        assert_eq!(langs[0].name, "Amharic");
    }

    #[test]
    fn names() {
        assert_eq!(language_name("de"), "German");
        assert_eq!(language_name("zh-tw"), "Chinese (Traditional)");
        assert_eq!(language_name("xx"), "xx");
        assert!(is_supported("sw"));
        assert!(!is_supported("xx"));
    }

    #[test]
    fn rtl() {
        for code in ["ar", "he", "fa", "ur"] {
            assert!(is_rtl_language(code), "{code}");
        }
        assert!(!is_rtl_language("en"));
        assert!(!is_rtl_language("hi"));
    }

    #[test]
    fn detects_non_latin_scripts() {
        let cases = [
            ("Я очень люблю читать книги по вечерам, потому что это помогает мне расслабиться после работы.", "ru"),
            ("Η Ελλάδα είναι μια όμορφη χώρα με πολλά νησιά, μεγάλη ιστορία και πολύ καλό φαγητό.", "el"),
            ("مرحبا، اسمي أحمد وأنا أعيش في مدينة القاهرة مع عائلتي الكبيرة منذ سنوات طويلة.", "ar"),
            ("这是一个关于语言检测的简单测试，我们希望它能够正确地识别中文。", "zh"),
            ("これは言語検出のための簡単なテストです。日本語を正しく認識できるでしょうか。", "ja"),
            ("안녕하세요, 저는 서울에 살고 있으며 매일 아침 공원에서 산책을 합니다.", "ko"),
            ("สวัสดีครับ ผมชื่อสมชาย และผมอาศัยอยู่ที่กรุงเทพมหานครกับครอบครัวของผม", "th"),
        ];
        for (text, code) in cases {
            assert_eq!(detect_language(text), code, "{text}");
        }
    }

    #[test]
    fn detects_latin_languages() {
        let cases = [
            ("The cat sat on the mat and looked at the dog while the children were playing in the garden.", "en"),
            ("El perro y el gato juegan en el jardín mientras los niños comen helado en la playa con sus padres.", "es"),
            ("Le chat est dans la maison avec les enfants et ils regardent la télévision pendant que leurs parents travaillent.", "fr"),
            ("Der Hund und die Katze spielen im Garten, während die Kinder noch in der Schule sind und lernen.", "de"),
            ("Wczoraj wieczorem poszliśmy z przyjaciółmi do kina, a potem zjedliśmy bardzo dobrą kolację w restauracji.", "pl"),
            ("Jag tycker mycket om att läsa böcker på kvällarna eftersom det hjälper mig att slappna av efter jobbet.", "sv"),
            ("Dün akşam arkadaşlarımla birlikte sinemaya gittik ve sonra güzel bir restoranda akşam yemeği yedik.", "tr"),
        ];
        for (text, code) in cases {
            assert_eq!(detect_language(text), code, "{text}");
        }
    }

    #[test]
    fn mixed_scripts_are_deterministic() {
        let first = detect_language("ab ав");
        for _ in 0..20 {
            assert_eq!(detect_language("ab ав"), first);
        }
    }

    #[test]
    fn table_codes_are_supported() {
        for iso in ["eng", "cmn", "pes", "nob", "ukr", "heb", "urd"] {
            let code = table_code(iso).unwrap();
            assert!(is_supported(code), "{iso} -> {code}");
        }
        assert_eq!(table_code("epo"), None);
    }

    #[test]
    fn defaults_to_english() {
        assert_eq!(detect_language(""), "en");
        assert_eq!(detect_language("12345 !!!"), "en");
    }
}
