// src/language/transliterate.rs
//
// Rule-based Arabic -> Latin transliteration.
//
// Produces a searchable Latin form of a title, one table lookup per
// character. This is romanization, not translation: short vowels are not
// reconstructed, diacritics and the tatweel are dropped, and anything
// outside the table (Latin letters, digits, punctuation) passes through
// unchanged.

/// Transliterate a title into a searchable Latin form.
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match romanize(ch) {
            Some(latin) => out.push_str(latin),
            None => out.push(ch),
        }
    }
    out
}

/// Table entry for a single Arabic character, `None` for pass-through.
fn romanize(ch: char) -> Option<&'static str> {
    let latin = match ch {
        // Hamza and hamza carriers
        '\u{0621}' => "",   // ء
        '\u{0622}' => "a",  // آ
        '\u{0623}' => "a",  // أ
        '\u{0624}' => "w",  // ؤ
        '\u{0625}' => "i",  // إ
        '\u{0626}' => "y",  // ئ

        // Letters
        '\u{0627}' => "a",  // ا
        '\u{0628}' => "b",  // ب
        '\u{0629}' => "h",  // ة
        '\u{062A}' => "t",  // ت
        '\u{062B}' => "th", // ث
        '\u{062C}' => "j",  // ج
        '\u{062D}' => "h",  // ح
        '\u{062E}' => "kh", // خ
        '\u{062F}' => "d",  // د
        '\u{0630}' => "dh", // ذ
        '\u{0631}' => "r",  // ر
        '\u{0632}' => "z",  // ز
        '\u{0633}' => "s",  // س
        '\u{0634}' => "sh", // ش
        '\u{0635}' => "s",  // ص
        '\u{0636}' => "d",  // ض
        '\u{0637}' => "t",  // ط
        '\u{0638}' => "z",  // ظ
        '\u{0639}' => "a",  // ع
        '\u{063A}' => "gh", // غ
        '\u{0641}' => "f",  // ف
        '\u{0642}' => "q",  // ق
        '\u{0643}' => "k",  // ك
        '\u{0644}' => "l",  // ل
        '\u{0645}' => "m",  // م
        '\u{0646}' => "n",  // ن
        '\u{0647}' => "h",  // ه
        '\u{0648}' => "w",  // و
        '\u{0649}' => "a",  // ى
        '\u{064A}' => "y",  // ي

        // Persian additions seen in regional catalogs
        '\u{067E}' => "p",  // پ
        '\u{0686}' => "ch", // چ
        '\u{0698}' => "zh", // ژ
        '\u{06AF}' => "g",  // گ
        '\u{06A9}' => "k",  // ک
        '\u{06CC}' => "y",  // ی

        // Tatweel and short-vowel diacritics carry no letter
        '\u{0640}' => "",
        '\u{064B}'..='\u{0652}' => "",

        // Arabic-Indic digits
        '\u{0660}' => "0",
        '\u{0661}' => "1",
        '\u{0662}' => "2",
        '\u{0663}' => "3",
        '\u{0664}' => "4",
        '\u{0665}' => "5",
        '\u{0666}' => "6",
        '\u{0667}' => "7",
        '\u{0668}' => "8",
        '\u{0669}' => "9",

        _ => return None,
    };
    Some(latin)
}
