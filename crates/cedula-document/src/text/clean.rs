// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR text cleaning and line validation for cedula text.
//
// Cleaning keeps Latin word characters, the Spanish accented letters,
// whitespace, periods and hyphens, collapses horizontal whitespace, and drops
// lines that look like OCR artifacts or leaked pipeline diagnostics.

use cedula_core::config::PipelineConfig;
use cedula_core::error::{CedulaError, Result};
use regex::RegexSet;

/// Accented letters that count as word characters besides `[A-Za-z0-9_]`.
const SPANISH_LETTERS: &str = "áéíóúñÁÉÍÓÚÑ";

/// Lines shorter than this (in characters) are dropped.
const MIN_LINE_CHARS: usize = 3;

/// A line made only of at least this many digits is an artifact, not an ID.
const DIGIT_RUN_ARTIFACT: usize = 15;

/// Maximum share of symbol characters in a kept line.
const MAX_SYMBOL_RATIO: f64 = 0.3;

/// Word character: base Latin letters, digits, underscore, or a Spanish
/// accented letter.
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || SPANISH_LETTERS.contains(c)
}

/// Deterministic cleaner for combined OCR output.
#[derive(Debug, Clone)]
pub struct TextCleaner {
    noise: RegexSet,
}

impl TextCleaner {
    /// Build a cleaner from noise regular expressions. Patterns are matched
    /// against the lowercased line.
    pub fn new<S: AsRef<str>>(noise_patterns: &[S]) -> Result<Self> {
        let noise = RegexSet::new(noise_patterns.iter().map(AsRef::as_ref))
            .map_err(|err| CedulaError::Config(format!("invalid noise pattern: {}", err)))?;
        Ok(Self { noise })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::new(&config.noise_patterns)
    }

    /// Clean raw OCR text.
    ///
    /// 1. Every character that is not a word character, whitespace, `.` or
    ///    `-` becomes a space.
    /// 2. Runs of whitespace other than newlines collapse to one space.
    /// 3. Lines are trimmed, filtered through [`is_valid_line`](Self::is_valid_line)
    ///    and re-joined with `\n`.
    ///
    /// Cleaning is idempotent.
    pub fn clean(&self, raw: &str) -> String {
        let filtered: String = raw
            .chars()
            .map(|c| {
                if is_word_char(c) || c.is_whitespace() || c == '.' || c == '-' {
                    c
                } else {
                    ' '
                }
            })
            .collect();

        let collapsed = collapse_horizontal_whitespace(&filtered);

        collapsed
            .split('\n')
            .map(str::trim)
            .filter(|line| self.is_valid_line(line))
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

    /// Whether a (trimmed) line plausibly belongs to the document.
    ///
    /// Rejects lines under three characters, lines made only of 15 or more
    /// digits, lines where more than 30% of the characters are symbols, and
    /// lines whose lowercase form matches a noise pattern.
    pub fn is_valid_line(&self, line: &str) -> bool {
        let line = line.trim();
        let char_count = line.chars().count();
        if char_count < MIN_LINE_CHARS {
            return false;
        }

        if char_count >= DIGIT_RUN_ARTIFACT && line.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }

        let symbols = line
            .chars()
            .filter(|&c| !is_word_char(c) && !c.is_whitespace())
            .count();
        if symbols as f64 > char_count as f64 * MAX_SYMBOL_RATIO {
            return false;
        }

        !self.noise.is_match(&line.to_lowercase())
    }
}

fn collapse_horizontal_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if c != '\n' && c.is_whitespace() {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cedula_core::config::default_noise_patterns;

    fn cleaner() -> TextCleaner {
        TextCleaner::new(&default_noise_patterns()).unwrap()
    }

    #[test]
    fn empty_input_cleans_to_empty() {
        assert_eq!(cleaner().clean(""), "");
    }

    #[test]
    fn short_lines_are_rejected() {
        let c = cleaner();
        assert!(!c.is_valid_line("ab"));
        assert!(c.is_valid_line("abc"));
        assert!(!c.is_valid_line("  ñ  "));
    }

    #[test]
    fn long_digit_runs_are_rejected() {
        let c = cleaner();
        assert!(!c.is_valid_line("123456789012345"));
        assert!(!c.is_valid_line("12345678901234567890"));
        assert!(c.is_valid_line("12345678901234"));
        assert!(c.is_valid_line("1234567890123456 A"));
    }

    #[test]
    fn symbol_heavy_lines_are_rejected() {
        let c = cleaner();
        assert!(!c.is_valid_line("..--..--AB"));
        assert!(c.is_valid_line("1.041.970.336"));
    }

    #[test]
    fn noise_patterns_match_case_insensitively() {
        let c = cleaner();
        assert!(!c.is_valid_line("Imagen Redimensionada"));
        assert!(!c.is_valid_line("TESSERACT OPEN SOURCE"));
        assert!(!c.is_valid_line("C Program Files Tesseract-OCR"));
        assert!(!c.is_valid_line("visite www registraduria gov co"));
        assert!(!c.is_valid_line("EXTRAYENDO TEXTO DE LA CÉDULA"));
        assert!(!c.is_valid_line("Texto Extraído correctamente"));
        assert!(c.is_valid_line("REPUBLICA DE COLOMBIA"));
    }

    #[test]
    fn accented_spanish_letters_survive() {
        let cleaned = cleaner().clean("NÚÑEZ ACOSTA\nJOSÉ MARÍA");
        assert_eq!(cleaned, "NÚÑEZ ACOSTA\nJOSÉ MARÍA");
    }

    #[test]
    fn symbols_become_spaces_and_runs_collapse() {
        let cleaned = cleaner().clean("NOMBRES:\t\tLUZ | DEISY\r\n");
        assert_eq!(cleaned, "NOMBRES LUZ DEISY");
    }

    #[test]
    fn newlines_still_separate_lines() {
        let raw = "REPUBLICA DE COLOMBIA\n\n\nIDENTIFICACION PERSONAL\n  1.041.970.336  ";
        assert_eq!(
            cleaner().clean(raw),
            "REPUBLICA DE COLOMBIA\nIDENTIFICACION PERSONAL\n1.041.970.336"
        );
    }

    #[test]
    fn typical_ocr_output_is_filtered() {
        let raw = "REPUBLICA DE COLOMBIA\n\
                   ~~ ^^ %%\n\
                   CEDULA DE CIUDADANIA\n\
                   NUMERO 1.041.970.336\n\
                   999999999999999999\n\
                   Imagen procesada y guardada\n\
                   RAMOS OCHOA\n\
                   Fl\n\
                   LUZ DEISY";
        assert_eq!(
            cleaner().clean(raw),
            "REPUBLICA DE COLOMBIA\nCEDULA DE CIUDADANIA\nNUMERO 1.041.970.336\nRAMOS OCHOA\nLUZ DEISY"
        );
    }

    #[test]
    fn cleaning_is_idempotent() {
        let c = cleaner();
        let samples = [
            "",
            "  a  \n b ",
            "APELLIDOS:  RAMOS\tOCHOA\n\n***\nFECHA DE NACIMIENTO 12-MAR-1985",
            "123456789012345\n12345678901234\nwww.example.com\n--- . --- .",
            "«ÑANDÚ»  ü ç ¿qué?\r\nLÍNEA   válida",
        ];
        for raw in samples {
            let once = c.clean(raw);
            assert_eq!(c.clean(&once), once, "not idempotent for {raw:?}");
        }
    }

    #[test]
    fn custom_noise_table_replaces_defaults() {
        let c = TextCleaner::new(&["registraduria"]).unwrap();
        assert!(!c.is_valid_line("REGISTRADURIA NACIONAL"));
        assert!(c.is_valid_line("Imagen Redimensionada"));
    }

    #[test]
    fn invalid_noise_pattern_is_a_config_error() {
        let err = TextCleaner::new(&["(unclosed"]).unwrap_err();
        assert!(matches!(err, CedulaError::Config(_)));
    }
}
