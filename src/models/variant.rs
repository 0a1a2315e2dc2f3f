//! Corpus variant registry.
//!
//! Each variant bundles the file-selection predicates and the static phone
//! inventory for one sub-style of the Wall Street Journal distribution. The
//! variant is chosen by name at preparator construction time.

/// IPA transcription of the CMU phone set, in inventory order.
pub const CMU_PHONES: &[(&str, &str)] = &[
    ("IY", "iː"),
    ("IH", "ɪ"),
    ("EH", "ɛ"),
    ("EY", "eɪ"),
    ("AE", "æ"),
    ("AA", "ɑː"),
    ("AW", "aʊ"),
    ("AY", "aɪ"),
    ("AH", "ʌ"),
    ("AO", "ɔː"),
    ("OY", "ɔɪ"),
    ("OW", "oʊ"),
    ("UH", "ʊ"),
    ("UW", "uː"),
    ("ER", "ɝ"),
    ("JH", "ʤ"),
    ("CH", "ʧ"),
    ("B", "b"),
    ("D", "d"),
    ("G", "g"),
    ("P", "p"),
    ("T", "t"),
    ("K", "k"),
    ("S", "s"),
    ("SH", "ʃ"),
    ("Z", "z"),
    ("ZH", "ʒ"),
    ("F", "f"),
    ("TH", "θ"),
    ("V", "v"),
    ("DH", "ð"),
    ("M", "m"),
    ("N", "n"),
    ("NG", "ŋ"),
    ("L", "l"),
    ("R", "r"),
    ("W", "w"),
    ("Y", "j"),
    ("HH", "h"),
];

/// Static configuration for one corpus sub-style.
#[derive(Debug, Clone)]
pub struct CorpusVariant {
    /// Registry key, also used to name the default output directory
    pub name: &'static str,
    /// Directory names under which relevant files are nested; `None` keeps
    /// every directory
    pub directory_patterns: Option<&'static [&'static str]>,
    /// Required 4th character of the file name, distinguishing common read
    /// speech ('c') from spontaneous ('s'); `None` keeps every file
    pub file_pattern: Option<char>,
    /// Length of the utterance-id prefix identifying the speaker
    pub speaker_prefix_len: usize,
    /// Phone symbol to IPA display mapping
    pub phones: &'static [(&'static str, &'static str)],
    /// Silence symbols
    pub silences: &'static [&'static str],
    /// Phone variant groupings (e.g. lexical stress variants)
    pub variants: &'static [&'static [&'static str]],
}

/// Entire corpus, no directory or file restriction.
pub static FULL: CorpusVariant = CorpusVariant {
    name: "full",
    directory_patterns: None,
    file_pattern: None,
    speaker_prefix_len: 3,
    phones: CMU_PHONES,
    silences: &["NSN"],
    variants: &[],
};

/// Journalist read speech: speaker-independent training data, common read.
pub static JOURNALIST_READ: CorpusVariant = CorpusVariant {
    name: "journalist-read",
    directory_patterns: Some(&["si_tr_j"]),
    file_pattern: Some('c'),
    speaker_prefix_len: 3,
    phones: CMU_PHONES,
    silences: &["NSN"],
    variants: &[],
};

/// Spontaneous journalist dictation, no/unspecified verbal punctuation.
pub static JOURNALIST_SPONTANEOUS: CorpusVariant = CorpusVariant {
    name: "journalist-spontaneous",
    directory_patterns: Some(&["si_tr_jd"]),
    file_pattern: Some('s'),
    speaker_prefix_len: 3,
    phones: CMU_PHONES,
    silences: &["NSN"],
    variants: &[],
};

/// Main read speech: standard and long-sample subjects, speaker-independent
/// and speaker-dependent.
pub static MAIN_READ: CorpusVariant = CorpusVariant {
    name: "main-read",
    directory_patterns: Some(&["si_tr_s", "si_tr_l", "sd_tr_s", "sd_tr_l"]),
    file_pattern: Some('c'),
    speaker_prefix_len: 3,
    phones: CMU_PHONES,
    silences: &["NSN"],
    variants: &[],
};

static ALL_VARIANTS: [&CorpusVariant; 4] = [
    &FULL,
    &JOURNALIST_READ,
    &JOURNALIST_SPONTANEOUS,
    &MAIN_READ,
];

/// All registered variants, default first.
pub fn all_variants() -> &'static [&'static CorpusVariant] {
    &ALL_VARIANTS
}

/// Look up a variant by its registry name.
pub fn variant_by_name(name: &str) -> Option<&'static CorpusVariant> {
    all_variants().iter().copied().find(|v| v.name == name)
}

impl CorpusVariant {
    /// Whether a directory name selects files nested below it.
    pub fn matches_directory(&self, dir_name: &str) -> bool {
        match self.directory_patterns {
            None => true,
            Some(patterns) => patterns.contains(&dir_name),
        }
    }

    /// Whether a file name passes the extension and fixed-offset character
    /// predicates.
    pub fn matches_file(&self, file_name: &str, extension: &str) -> bool {
        if !file_name.ends_with(extension) {
            return false;
        }
        match self.file_pattern {
            None => true,
            Some(c) => file_name.chars().nth(3) == Some(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        assert_eq!(variant_by_name("main-read").unwrap().name, "main-read");
        assert_eq!(variant_by_name("full").unwrap().name, "full");
        assert!(variant_by_name("nonexistent").is_none());
    }

    #[test]
    fn test_directory_predicate() {
        let v = variant_by_name("main-read").unwrap();
        assert!(v.matches_directory("si_tr_s"));
        assert!(v.matches_directory("sd_tr_l"));
        assert!(!v.matches_directory("si_tr_j"));

        // unrestricted variant keeps everything
        assert!(FULL.matches_directory("anything"));
    }

    #[test]
    fn test_file_predicate() {
        let v = variant_by_name("journalist-read").unwrap();
        // 4th character must be 'c'
        assert!(v.matches_file("4k0c0301.dot", ".dot"));
        assert!(!v.matches_file("4k0s0301.dot", ".dot"));
        assert!(!v.matches_file("4k0c0301.wv1", ".dot"));

        assert!(FULL.matches_file("4k0s0301.dot", ".dot"));
    }

    #[test]
    fn test_phone_inventory_is_complete_cmu_set() {
        assert_eq!(CMU_PHONES.len(), 39);
        assert!(CMU_PHONES.iter().any(|(p, _)| *p == "HH"));
    }
}
