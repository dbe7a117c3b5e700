//! Arabic text normalization shared by the corpus scan and query handling

/// Normalize Arabic text for matching: removes tashkeel and Quranic annotation
/// marks, folds hamza/alif/ya/ha variants to one letter each.
///
/// Every output character is outside the folded set, so the function is
/// idempotent.
pub fn normalize_arabic(text: &str) -> String {
    text.chars()
        .filter_map(|c| {
            match c {
                // Tashkeel, superscript alif, tatweel
                '\u{0610}'..='\u{061A}' | '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{0640}' => None,
                // Quranic annotation marks (small high letters, pause marks)
                '\u{06D6}'..='\u{06DC}' | '\u{06DF}'..='\u{06E8}' | '\u{06EA}'..='\u{06ED}' => None,
                // Alif variants, including wasla
                'أ' | 'إ' | 'آ' | 'ٱ' | 'ٲ' | 'ٳ' => Some('ا'),
                'ؤ' => Some('و'),
                'ئ' | 'ى' => Some('ي'),
                'ة' | 'ۃ' | 'ۀ' | 'ە' => Some('ه'),
                'ک' | 'گ' | 'ڭ' => Some('ك'),
                'ی' | 'ے' => Some('ي'),
                'ٹ' => Some('ت'),
                'پ' => Some('ب'),
                'چ' => Some('ج'),
                'ژ' => Some('ز'),
                'ڤ' => Some('ف'),
                'ڨ' => Some('ق'),
                _ => Some(c),
            }
        })
        .collect()
}

/// Arabic letters (diacritics excluded), including the extended block used by
/// Uthmani orthography. U+06D4 is the Urdu full stop, not a letter.
pub fn is_arabic_letter(c: char) -> bool {
    matches!(
        c,
        '\u{0621}'..='\u{063F}' | '\u{0641}'..='\u{064A}' | '\u{0671}'..='\u{06D3}' | '\u{06D5}'
    )
}

/// Clean a raw user query: keep Arabic letters (and the marks `normalize_arabic`
/// will drop anyway), turn everything else into word breaks, collapse
/// whitespace runs, then normalize.
///
/// Returns an empty string for queries with no Arabic letters.
pub fn clean_query(query: &str) -> String {
    let letters_only: String = query
        .chars()
        .map(|c| if is_arabic_letter(c) { c } else if is_mark(c) { '\u{0640}' } else { ' ' })
        .collect();

    normalize_arabic(&letters_only)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split text into words on whitespace, the way verse text is tokenized for
/// alignment with morphology data.
pub fn split_words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

// Marks inside a word must not split it; they are mapped to tatweel which
// normalization removes.
fn is_mark(c: char) -> bool {
    matches!(
        c,
        '\u{0610}'..='\u{061A}'
            | '\u{064B}'..='\u{065F}'
            | '\u{0670}'
            | '\u{0640}'
            | '\u{06D6}'..='\u{06DC}'
            | '\u{06DF}'..='\u{06E8}'
            | '\u{06EA}'..='\u{06ED}'
    )
}
